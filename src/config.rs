// config.rs — viewer settings
//
// Sources, later ones win:
// - built-in defaults
// - JSON file: --config <file>, else turntable.json next to the exe, else ./turntable.json
// - env: TURNTABLE_IMAGES
// - CLI: --images <dir>
//
// The UI language is resolved separately by `resolve_lang` (CLI --lang, env
// TURNTABLE_LANG, default en).

use crate::accumulator::DEFAULT_SENSITIVITY;
use crate::assets::CanvasSpec;
use crate::compositor::CameraRig;
use crate::mapper::OffsetPolicy;
use image::Rgba;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = "turntable.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{field} must be {expected}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub images_dir: Option<PathBuf>,
    /// Radians per pixel of horizontal drag.
    pub sensitivity: f64,
    pub camera_distance: f64,
    /// Observer direction for a zero offset, radians.
    pub center_angle: f64,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// World-space width of the image plane; height follows the canvas aspect.
    pub plane_width: f64,
    pub offset_policy: OffsetPolicy,
    pub load_timeout_secs: u64,
    pub label_text: Option<String>,
    pub font_path: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            images_dir: None,
            sensitivity: DEFAULT_SENSITIVITY,
            camera_distance: 10.0,
            center_angle: 1.5 * std::f64::consts::PI,
            canvas_width: 1024,
            canvas_height: 512,
            plane_width: 10.0,
            offset_policy: OffsetPolicy::default(),
            load_timeout_secs: 30,
            label_text: Some("Pseudo Image Interpolation".to_string()),
            font_path: None,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let config: ViewerConfig = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(path, &text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sensitivity.is_finite() && self.sensitivity > 0.0) {
            return Err(ConfigError::Invalid {
                field: "sensitivity",
                expected: "a positive number",
            });
        }
        if !(self.camera_distance.is_finite() && self.camera_distance > 0.0) {
            return Err(ConfigError::Invalid {
                field: "camera_distance",
                expected: "a positive number",
            });
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::Invalid {
                field: "canvas_width/canvas_height",
                expected: "non-zero",
            });
        }
        if !(self.plane_width.is_finite() && self.plane_width > 0.0) {
            return Err(ConfigError::Invalid {
                field: "plane_width",
                expected: "a positive number",
            });
        }
        if self.load_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "load_timeout_secs",
                expected: "at least 1",
            });
        }
        Ok(())
    }

    pub fn canvas(&self) -> CanvasSpec {
        CanvasSpec {
            width: self.canvas_width,
            height: self.canvas_height,
            background: Rgba([255, 255, 255, 255]),
        }
    }

    /// The plane is centered half a canvas height above the origin, and the
    /// observer orbits at that height.
    pub fn camera_rig(&self) -> CameraRig {
        CameraRig {
            center_angle: self.center_angle,
            radius: self.camera_distance,
            elevation: self.canvas_height as f64 / 2.0,
        }
    }

    pub fn plane_height(&self) -> f64 {
        self.plane_width * self.canvas_height as f64 / self.canvas_width as f64
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }
}

/// Flags understood on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub images: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub lang: Option<String>,
}

impl CliArgs {
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut out = CliArgs::default();
        let mut it = args.into_iter();
        while let Some(a) = it.next() {
            match a.as_str() {
                "--images" => out.images = it.next().map(PathBuf::from),
                "--config" => out.config = it.next().map(PathBuf::from),
                "--lang" => out.lang = it.next(),
                _ => {}
            }
        }
        out
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::args().skip(1))
    }
}

/// Resolve a path relative to the executable's directory, then the working directory.
pub fn locate(relative: &Path) -> Option<PathBuf> {
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(relative)));
    beside_exe
        .into_iter()
        .chain(std::iter::once(relative.to_path_buf()))
        .find(|p| p.exists())
}

/// Resolve the effective config. A broken file is logged and replaced by defaults.
pub fn load(cli: &CliArgs) -> ViewerConfig {
    let path = cli
        .config
        .clone()
        .or_else(|| locate(Path::new(CONFIG_FILE)));
    let mut config = match path {
        Some(path) => match ViewerConfig::from_file(&path) {
            Ok(c) => {
                log::info!("config: {}", path.display());
                c
            }
            Err(e) => {
                log::warn!("{e}; using defaults");
                ViewerConfig::default()
            }
        },
        None => ViewerConfig::default(),
    };

    if let Ok(v) = std::env::var("TURNTABLE_IMAGES") {
        if !v.trim().is_empty() {
            config.images_dir = Some(PathBuf::from(v));
        }
    }
    if let Some(dir) = &cli.images {
        config.images_dir = Some(dir.clone());
    }
    config
}

/// Choose the UI language from CLI/env.
pub fn resolve_lang(cli: &CliArgs) -> String {
    if let Some(lang) = &cli.lang {
        return lang.clone();
    }

    if let Ok(v) = std::env::var("TURNTABLE_LANG") {
        if !v.trim().is_empty() {
            return v;
        }
    }

    crate::i18n::FALLBACK_LANG.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_object_gives_defaults() {
        let c = ViewerConfig::from_json(Path::new("t.json"), "{}").unwrap();
        assert_eq!(c, ViewerConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_its_fields() {
        let c = ViewerConfig::from_json(
            Path::new("t.json"),
            r#"{ "sensitivity": 0.01, "offset_policy": "raw", "images_dir": "captures" }"#,
        )
        .unwrap();
        assert_abs_diff_eq!(c.sensitivity, 0.01);
        assert_eq!(c.offset_policy, OffsetPolicy::Raw);
        assert_eq!(c.images_dir, Some(PathBuf::from("captures")));
        assert_eq!(c.canvas_width, 1024);
    }

    #[test]
    fn rejects_non_positive_sensitivity() {
        let err = ViewerConfig::from_json(Path::new("t.json"), r#"{ "sensitivity": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "sensitivity", .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ViewerConfig::from_json(Path::new("t.json"), "{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "load_timeout_secs": 5 }"#).unwrap();
        let c = ViewerConfig::from_file(&path).unwrap();
        assert_eq!(c.load_timeout(), Duration::from_secs(5));
        assert!(matches!(
            ViewerConfig::from_file(&dir.path().join("missing.json")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn cli_flags_are_picked_up() {
        let cli = CliArgs::parse(args(&["--lang", "fr", "--images", "/tmp/shots", "--bogus"]));
        assert_eq!(cli.lang.as_deref(), Some("fr"));
        assert_eq!(cli.images, Some(PathBuf::from("/tmp/shots")));
        assert_eq!(cli.config, None);
    }

    #[test]
    fn cli_images_beat_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(&path, r#"{ "images_dir": "from-file" }"#).unwrap();
        let cli = CliArgs {
            images: Some(PathBuf::from("from-cli")),
            config: Some(path),
            lang: None,
        };
        assert_eq!(load(&cli).images_dir, Some(PathBuf::from("from-cli")));
    }

    #[test]
    fn locate_finds_paths_relative_to_the_working_dir() {
        assert_eq!(locate(Path::new("Cargo.toml")), Some(PathBuf::from("Cargo.toml")));
        assert_eq!(locate(Path::new("no/such/file.json")), None);
    }

    #[test]
    fn rig_and_plane_follow_the_canvas() {
        let c = ViewerConfig::default();
        let rig = c.camera_rig();
        assert_abs_diff_eq!(rig.elevation, 256.0);
        assert_abs_diff_eq!(rig.radius, 10.0);
        assert_abs_diff_eq!(c.plane_height(), 5.0);
    }
}
