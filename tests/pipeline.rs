// End-to-end: pointer events through the viewer state into a recording scene.

use approx::assert_abs_diff_eq;
use image::{Rgba, RgbaImage};
use std::f64::consts::TAU;
use turntable_viewer::assets::ImageSet;
use turntable_viewer::compositor::{CameraRig, Scene, ViewCompositor, Viewpoint};
use turntable_viewer::input::{InteractionRegion, PointerEvent};
use turntable_viewer::mapper::OffsetPolicy;
use turntable_viewer::viewer::ViewerState;

#[derive(Default)]
struct Screen {
    attached: Option<u8>,
    live_surfaces: usize,
    viewpoint: Option<Viewpoint>,
    readout: String,
}

impl Scene for Screen {
    type Surface = u8;

    fn make_surface(&mut self, image: &RgbaImage) -> u8 {
        self.live_surfaces += 1;
        image.get_pixel(0, 0)[0]
    }

    fn attach(&mut self, surface: &u8) {
        assert!(self.attached.is_none(), "two surfaces attached");
        self.attached = Some(*surface);
    }

    fn detach(&mut self, surface: u8) {
        assert_eq!(self.attached, Some(surface));
        self.attached = None;
        self.live_surfaces -= 1;
    }

    fn set_viewpoint(&mut self, viewpoint: &Viewpoint) {
        self.viewpoint = Some(*viewpoint);
    }

    fn set_readout(&mut self, text: &str) {
        self.readout = text.to_string();
    }
}

fn ring(count: u8) -> ImageSet {
    ImageSet::new(
        (0..count)
            .map(|i| RgbaImage::from_pixel(1, 1, Rgba([i, 0, 0, 255])))
            .collect(),
    )
    .unwrap()
}

struct Harness {
    state: ViewerState,
    compositor: ViewCompositor<Screen>,
    screen: Screen,
    region: InteractionRegion,
}

impl Harness {
    fn new(count: u8) -> Self {
        let images = ring(count);
        let state = ViewerState::new(images.len(), 0.008, OffsetPolicy::Centered);
        let mut compositor = ViewCompositor::new(images, CameraRig::default());
        let mut screen = Screen::default();
        compositor.apply(&mut screen, state.resolved());
        Self {
            state,
            compositor,
            screen,
            region: InteractionRegion::from_size(1280.0, 720.0),
        }
    }

    fn send(&mut self, event: PointerEvent) {
        let (state, view) = self.state.on_pointer(event, &self.region);
        self.state = state;
        if let Some(view) = view {
            self.compositor.apply(&mut self.screen, view);
        }
    }

    fn drag(&mut self, from: f64, to: f64, steps: usize) {
        self.send(PointerEvent::Press { x: from, y: 300.0 });
        for i in 1..=steps {
            let x = from + (to - from) * i as f64 / steps as f64;
            self.send(PointerEvent::Move { x, y: 300.0 });
        }
        self.send(PointerEvent::Release);
    }
}

#[test]
fn initial_view_shows_the_first_image_head_on() {
    let h = Harness::new(36);
    assert_eq!(h.screen.attached, Some(0));
    assert_eq!(h.screen.readout, "0");
    let vp = h.screen.viewpoint.unwrap();
    assert_abs_diff_eq!(vp.position.x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(vp.position.y, -10.0, epsilon = 1e-9);
}

#[test]
fn dragging_left_by_one_slot_shows_the_next_image() {
    let mut h = Harness::new(36);
    let slot_px = (TAU / 36.0) / 0.008;
    h.drag(800.0, 800.0 - slot_px, 8);
    assert_eq!(h.screen.attached, Some(1));
    assert_eq!(h.screen.readout, "1");
    assert_eq!(h.screen.live_surfaces, 1);
}

#[test]
fn dragging_right_wraps_to_the_last_image() {
    let mut h = Harness::new(36);
    let slot_px = (TAU / 36.0) / 0.008;
    h.drag(400.0, 400.0 + 2.0 * slot_px, 5);
    assert_eq!(h.screen.attached, Some(34));
    assert_eq!(h.screen.readout, "34");
}

#[test]
fn a_full_turn_in_several_sessions_comes_back_around() {
    let mut h = Harness::new(36);
    let turn_px = TAU / 0.008;
    for _ in 0..4 {
        h.drag(1100.0, 1100.0 - turn_px / 4.0, 20);
    }
    assert_eq!(h.screen.attached, Some(0));
    let vp = h.screen.viewpoint.unwrap();
    assert_abs_diff_eq!(vp.position.y, -10.0, epsilon = 1e-6);
}

#[test]
fn hover_without_a_press_does_nothing() {
    let mut h = Harness::new(36);
    for x in [10.0, 300.0, 900.0] {
        h.send(PointerEvent::Move { x, y: 100.0 });
    }
    assert_eq!(h.screen.readout, "0");
    assert_eq!(h.state.rotation.angle(), 0.0);
}

#[test]
fn offset_nudges_the_observer_within_a_slot() {
    let mut h = Harness::new(36);
    // a quarter slot to the left of image 0's center
    let px = (TAU / 36.0) * 0.25 / 0.008;
    h.drag(600.0, 600.0 - px, 3);
    assert_eq!(h.screen.attached, Some(0));
    let vp = h.screen.viewpoint.unwrap();
    assert!(vp.position.x > 0.0);
    assert_abs_diff_eq!(vp.position.truncate().length(), 10.0, epsilon = 1e-9);
}
