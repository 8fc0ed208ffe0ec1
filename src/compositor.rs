// compositor.rs — applies a resolved view to the scene and the index readout

use crate::assets::ImageSet;
use crate::mapper::ResolvedView;
use glam::{DVec3, Mat4, Vec3};
use image::RgbaImage;

/// Where the observer stands and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    pub position: DVec3,
    pub look_at: DVec3,
}

impl Viewpoint {
    /// Right-handed view matrix with +Z up, the way the image plane is laid out.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(
            self.position.as_vec3(),
            self.look_at.as_vec3(),
            Vec3::Z,
        )
    }
}

/// Fixed orbit the observer is nudged along by the offset angle.
///
/// The image plane stands upright at `(0, 0, elevation)`; the observer sits at
/// `radius` from the Z axis, at the same height, looking at the plane center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub center_angle: f64,
    pub radius: f64,
    pub elevation: f64,
}

impl CameraRig {
    pub fn target(&self) -> DVec3 {
        DVec3::new(0.0, 0.0, self.elevation)
    }

    pub fn viewpoint(&self, offset_angle: f64) -> Viewpoint {
        let angle = self.center_angle + offset_angle;
        let (sin, cos) = angle.sin_cos();
        Viewpoint {
            position: DVec3::new(self.radius * cos, self.radius * sin, self.elevation),
            look_at: self.target(),
        }
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            center_angle: 1.5 * std::f64::consts::PI,
            radius: 10.0,
            elevation: 256.0,
        }
    }
}

/// The display collaborator the compositor drives.
pub trait Scene {
    type Surface;

    /// Build a drawable for one image. Not yet visible.
    fn make_surface(&mut self, image: &RgbaImage) -> Self::Surface;
    fn attach(&mut self, surface: &Self::Surface);
    /// Remove a surface from the scene and release it.
    fn detach(&mut self, surface: Self::Surface);
    fn set_viewpoint(&mut self, viewpoint: &Viewpoint);
    fn set_readout(&mut self, text: &str);
}

/// Owns the single displayed surface and the current viewpoint.
pub struct ViewCompositor<S: Scene> {
    images: ImageSet,
    rig: CameraRig,
    current: Option<S::Surface>,
    shown: Option<ResolvedView>,
    viewpoint: Viewpoint,
}

impl<S: Scene> ViewCompositor<S> {
    pub fn new(images: ImageSet, rig: CameraRig) -> Self {
        let viewpoint = rig.viewpoint(0.0);
        Self {
            images,
            rig,
            current: None,
            shown: None,
            viewpoint,
        }
    }

    pub fn shown(&self) -> Option<ResolvedView> {
        self.shown
    }

    pub fn viewpoint(&self) -> &Viewpoint {
        &self.viewpoint
    }

    pub fn has_surface(&self) -> bool {
        self.current.is_some()
    }

    /// Swap in the surface for `view.image_index` and move the observer by
    /// `view.offset_angle`. The previous surface is always destroyed, even when
    /// the index did not change.
    pub fn apply(&mut self, scene: &mut S, view: ResolvedView) {
        let Some(image) = self.images.get(view.image_index) else {
            log::warn!(
                "image index {} out of range for {} images",
                view.image_index,
                self.images.len()
            );
            return;
        };
        if let Some(old) = self.current.take() {
            scene.detach(old);
        }
        let surface = scene.make_surface(image);
        scene.attach(&surface);
        self.current = Some(surface);

        self.viewpoint = self.rig.viewpoint(view.offset_angle);
        scene.set_viewpoint(&self.viewpoint);
        scene.set_readout(&view.image_index.to_string());
        self.shown = Some(view);

        log::trace!(
            "view {} offset {:.4} camera ({:.3}, {:.3})",
            view.image_index,
            view.offset_angle,
            self.viewpoint.position.x,
            self.viewpoint.position.y
        );
    }

    /// Detach the surface, if any. Used when a new image set replaces this one.
    pub fn clear(&mut self, scene: &mut S) {
        if let Some(old) = self.current.take() {
            scene.detach(old);
        }
        self.shown = None;
    }
}
