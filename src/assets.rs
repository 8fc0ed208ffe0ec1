// assets.rs — image set and title label, loaded off the event-loop thread
//
// Startup runs as two gated stages, LoadLabel then LoadImageSet. Each stage
// runs on its own worker thread and reports through a channel; the event loop
// polls the pipeline and enforces a per-stage deadline.

use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use image::io::Reader as ImageReader;
use image::{imageops, Rgba, RgbaImage};
use rayon::prelude::*;
use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("{resource}: no result after {after:?}")]
    Timeout { resource: String, after: Duration },
    #[error("{resource}: {source}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{resource}: {source}")]
    Decode {
        resource: String,
        #[source]
        source: image::ImageError,
    },
    #[error("no images in {}", dir.display())]
    EmptyImageSet { dir: PathBuf },
    #[error("no usable font for the title label")]
    FontNotFound,
    #[error("{resource}: loader stopped without a result")]
    WorkerLost { resource: String },
}

/// Ordered, non-empty, immutable set of display-ready images.
#[derive(Debug, Clone)]
pub struct ImageSet {
    images: Vec<RgbaImage>,
}

impl ImageSet {
    pub fn new(images: Vec<RgbaImage>) -> Option<Self> {
        if images.is_empty() {
            None
        } else {
            Some(Self { images })
        }
    }

    pub fn len(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.images.len()).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn get(&self, index: usize) -> Option<&RgbaImage> {
        self.images.get(index)
    }
}

/// Offscreen canvas every image is fit into before it becomes a texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
    pub background: Rgba<u8>,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 512,
            background: Rgba([255, 255, 255, 255]),
        }
    }
}

/// Scale `img` as large as fits, centered, on a canvas filled with the background.
pub fn fit_to_canvas(img: &RgbaImage, canvas: &CanvasSpec) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(canvas.width, canvas.height, canvas.background);
    let (img_w, img_h) = img.dimensions();
    if img_w == 0 || img_h == 0 || canvas.width == 0 || canvas.height == 0 {
        return out;
    }

    let (cw, ch) = (canvas.width as f64, canvas.height as f64);
    let (iw, ih) = (img_w as f64, img_h as f64);
    let (scale, x, y) = if ch / cw > ih / iw {
        let scale = cw / iw;
        (scale, 0.0, (ch - ih * scale) / 2.0)
    } else {
        let scale = ch / ih;
        (scale, (cw - iw * scale) / 2.0, 0.0)
    };

    let new_w = ((iw * scale).round() as u32).clamp(1, canvas.width);
    let new_h = ((ih * scale).round() as u32).clamp(1, canvas.height);
    let scaled = if (new_w, new_h) == (img_w, img_h) {
        img.clone()
    } else {
        imageops::resize(img, new_w, new_h, imageops::FilterType::Triangle)
    };
    imageops::overlay(&mut out, &scaled, x.round() as i64, y.round() as i64);
    out
}

fn sort_key(path: &Path) -> (u64, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    // numbered captures (1.jpg, 2.jpg, ...) first, in numeric order
    let number = stem.parse::<u64>().unwrap_or(u64::MAX);
    (number, stem)
}

/// Image files directly inside `dir`, in capture order.
pub fn list_image_files(dir: &Path) -> Result<Vec<PathBuf>, AssetLoadError> {
    let io_err = |source| AssetLoadError::Io {
        resource: dir.display().to_string(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if is_image && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by_cached_key(|p| sort_key(p));
    Ok(files)
}

pub fn decode_image(path: &Path) -> Result<RgbaImage, AssetLoadError> {
    let resource = path.display().to_string();
    let file = File::open(path).map_err(|source| AssetLoadError::Io {
        resource: resource.clone(),
        source,
    })?;
    let reader = BufReader::new(file);

    ImageReader::new(reader)
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(|mut r| {
            r.no_limits();
            r.decode()
        })
        .map(|img| img.to_rgba8())
        .map_err(|source| AssetLoadError::Decode { resource, source })
}

/// Decode every image in `dir` on the rayon pool and fit each to the canvas.
/// All of them must succeed; otherwise one of the failures is returned.
pub fn load_image_set(dir: &Path, canvas: &CanvasSpec) -> Result<ImageSet, AssetLoadError> {
    let files = list_image_files(dir)?;
    if files.is_empty() {
        return Err(AssetLoadError::EmptyImageSet {
            dir: dir.to_path_buf(),
        });
    }

    let images = files
        .par_iter()
        .map(|path| -> Result<RgbaImage, AssetLoadError> {
            let img = decode_image(path)?;
            log::debug!("decoded {} ({}x{})", path.display(), img.width(), img.height());
            Ok(fit_to_canvas(&img, canvas))
        })
        .collect::<Result<Vec<_>, AssetLoadError>>()?;
    log::info!(
        "{}",
        crate::i18n::tr_with(
            "log.image_set_loaded",
            &[
                ("count", images.len().to_string()),
                ("dir", dir.display().to_string())
            ]
        )
    );
    ImageSet::new(images).ok_or_else(|| AssetLoadError::EmptyImageSet {
        dir: dir.to_path_buf(),
    })
}

/// Rasterize one line of text; glyph coverage becomes alpha over `color`.
pub fn render_label(font: &FontArc, text: &str, px: f32, color: [u8; 3]) -> RgbaImage {
    let scale = PxScale::from(px);
    let scaled = font.as_scaled(scale);
    let ascent = scaled.ascent();

    let mut glyphs = Vec::new();
    let mut caret = 0.0f32;
    let mut previous = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, id);
        }
        glyphs.push(id.with_scale_and_position(scale, point(caret, ascent)));
        caret += scaled.h_advance(id);
        previous = Some(id);
    }

    let width = caret.ceil().max(1.0) as u32;
    let height = (ascent - scaled.descent()).ceil().max(1.0) as u32;
    let mut out = RgbaImage::from_pixel(width, height, Rgba([color[0], color[1], color[2], 0]));

    for glyph in glyphs {
        let Some(outlined) = font.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|x, y, coverage| {
            let px_x = bounds.min.x as i64 + x as i64;
            let px_y = bounds.min.y as i64 + y as i64;
            if px_x < 0 || px_y < 0 || px_x >= width as i64 || px_y >= height as i64 {
                return;
            }
            let pixel = out.get_pixel_mut(px_x as u32, px_y as u32);
            let alpha = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            pixel[3] = pixel[3].max(alpha);
        });
    }
    out
}

/// Title label stage. `None` text means no label and an immediate success.
pub fn load_label(
    text: Option<&str>,
    font_path: Option<&Path>,
) -> Result<Option<RgbaImage>, AssetLoadError> {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return Ok(None);
    };
    let (path, bytes) = crate::fonts::find_font(font_path).ok_or(AssetLoadError::FontNotFound)?;
    let font = FontArc::try_from_vec(bytes).map_err(|_| AssetLoadError::FontNotFound)?;
    log::info!(
        "{}",
        crate::i18n::tr_with("font.using", &[("path", path.display().to_string())])
    );
    Ok(Some(render_label(&font, text, 64.0, [0x00, 0xff, 0xff])))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Label,
    ImageSet,
}

pub struct LoadedAssets {
    pub label: Option<RgbaImage>,
    pub images: ImageSet,
}

pub type Job<T> = Box<dyn FnOnce() -> Result<T, AssetLoadError> + Send + 'static>;

struct Pending<T> {
    rx: Receiver<Result<T, AssetLoadError>>,
    resource: &'static str,
    started: Instant,
    timeout: Duration,
}

impl<T: Send + 'static> Pending<T> {
    fn spawn(resource: &'static str, job: Job<T>, timeout: Duration) -> Self {
        let (tx, rx) = channel();
        let spawned = thread::Builder::new()
            .name(format!("load-{resource}"))
            .spawn(move || {
                // the receiver is gone once the stage timed out; nothing to report to
                let _ = tx.send(job());
            });
        if let Err(e) = spawned {
            log::error!("failed to spawn {resource} loader: {e}");
        }
        Self {
            rx,
            resource,
            started: Instant::now(),
            timeout,
        }
    }

    fn poll(&self, now: Instant) -> Option<Result<T, AssetLoadError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) if now.duration_since(self.started) >= self.timeout => {
                Some(Err(AssetLoadError::Timeout {
                    resource: self.resource.to_string(),
                    after: self.timeout,
                }))
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(AssetLoadError::WorkerLost {
                resource: self.resource.to_string(),
            })),
        }
    }
}

enum PipelineState {
    Label {
        pending: Pending<Option<RgbaImage>>,
        images: Job<ImageSet>,
    },
    Images {
        label: Option<RgbaImage>,
        pending: Pending<ImageSet>,
    },
    Finished,
}

/// `LoadLabel → LoadImageSet → Ready`, each stage bounded by `timeout`.
pub struct LoadPipeline {
    state: PipelineState,
    timeout: Duration,
}

impl LoadPipeline {
    pub fn start(label: Job<Option<RgbaImage>>, images: Job<ImageSet>, timeout: Duration) -> Self {
        log::info!("{}", crate::i18n::tr("log.loading_label"));
        Self {
            state: PipelineState::Label {
                pending: Pending::spawn("label", label, timeout),
                images,
            },
            timeout,
        }
    }

    /// Pipeline for a capture directory, with the label text and font from config.
    pub fn for_directory(
        dir: PathBuf,
        canvas: CanvasSpec,
        label_text: Option<String>,
        font_path: Option<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self::start(
            Box::new(move || load_label(label_text.as_deref(), font_path.as_deref())),
            Box::new(move || load_image_set(&dir, &canvas)),
            timeout,
        )
    }

    pub fn stage(&self) -> Option<LoadStage> {
        match self.state {
            PipelineState::Label { .. } => Some(LoadStage::Label),
            PipelineState::Images { .. } => Some(LoadStage::ImageSet),
            PipelineState::Finished => None,
        }
    }

    /// Advance if the current stage has finished or run out of time.
    /// Yields the final outcome exactly once.
    pub fn poll(&mut self, now: Instant) -> Option<Result<LoadedAssets, AssetLoadError>> {
        match std::mem::replace(&mut self.state, PipelineState::Finished) {
            PipelineState::Label { pending, images } => match pending.poll(now) {
                None => {
                    self.state = PipelineState::Label { pending, images };
                    None
                }
                Some(Ok(label)) => {
                    log::info!("{}", crate::i18n::tr("log.loading_images"));
                    self.state = PipelineState::Images {
                        label,
                        pending: Pending::spawn("image set", images, self.timeout),
                    };
                    None
                }
                Some(Err(e)) => Some(Err(e)),
            },
            PipelineState::Images { label, pending } => match pending.poll(now) {
                None => {
                    self.state = PipelineState::Images { label, pending };
                    None
                }
                Some(result) => Some(result.map(|images| LoadedAssets { label, images })),
            },
            PipelineState::Finished => None,
        }
    }
}
