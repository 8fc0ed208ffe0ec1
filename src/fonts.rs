// fonts.rs — runtime font discovery shared by the UI and the title label
//
// Search order: system font directories first, then ./assets next to the
// executable or in the working directory. Only files ab_glyph can parse are
// accepted; .ttc support is patchy, so .ttf/.otf come first in each list.

use std::path::{Path, PathBuf};

const ASSET_FILES: [&str; 6] = [
    "NotoSans-Regular.ttf",
    "NotoSans-Regular.otf",
    "DejaVuSans.ttf",
    "NotoSansSC-Regular.otf",
    "NotoSansSC-Regular.ttf",
    "NotoSansCJK-Regular.ttc",
];

fn try_load_font_from_path(path: &Path) -> Option<Vec<u8>> {
    let bytes = std::fs::read(path).ok()?;
    if ab_glyph::FontArc::try_from_vec(bytes.clone()).is_ok() {
        Some(bytes)
    } else {
        None
    }
}

pub fn font_candidates() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();

    if cfg!(windows) {
        let win_fonts = PathBuf::from(r"C:\Windows\Fonts");
        for f in ["segoeui.ttf", "arial.ttf", "tahoma.ttf", "msyh.ttf", "simhei.ttf", "malgun.ttf"] {
            candidates.push(win_fonts.join(f));
        }
    } else if cfg!(target_os = "macos") {
        for p in [
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
            "/Library/Fonts/NotoSansSC-Regular.otf",
            "/System/Library/Fonts/Helvetica.ttc",
            "/System/Library/Fonts/PingFang.ttc",
        ] {
            candidates.push(PathBuf::from(p));
        }
        if let Ok(home) = std::env::var("HOME") {
            let home = PathBuf::from(home);
            candidates.push(home.join("Library/Fonts/NotoSans-Regular.ttf"));
            candidates.push(home.join("Library/Fonts/NotoSansSC-Regular.otf"));
        }
    } else if cfg!(unix) {
        for p in [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
            "/usr/share/fonts/opentype/noto/NotoSansSC-Regular.otf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
        ] {
            candidates.push(PathBuf::from(p));
        }
        if let Ok(home) = std::env::var("HOME") {
            let home = PathBuf::from(home);
            for p in [
                ".local/share/fonts/NotoSans-Regular.ttf",
                ".local/share/fonts/DejaVuSans.ttf",
                ".fonts/NotoSans-Regular.ttf",
                ".fonts/DejaVuSans.ttf",
            ] {
                candidates.push(home.join(p));
            }
        }
    }

    for f in ASSET_FILES {
        if let Some(p) = crate::config::locate(&PathBuf::from("assets").join(f)) {
            candidates.push(p);
        }
    }

    candidates
}

/// First parseable font, trying `preferred` before the search list.
pub fn find_font(preferred: Option<&Path>) -> Option<(PathBuf, Vec<u8>)> {
    let mut candidates = Vec::new();
    if let Some(p) = preferred {
        candidates.push(p.to_path_buf());
    }
    candidates.extend(font_candidates());

    candidates
        .into_iter()
        .find_map(|p| try_load_font_from_path(&p).map(|bytes| (p, bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();
        assert!(try_load_font_from_path(&bogus).is_none());
        assert!(try_load_font_from_path(&dir.path().join("missing.ttf")).is_none());
    }

    /// A real font to use as a fixture: one of the faces egui bundles.
    fn bundled_font_bytes() -> Vec<u8> {
        let defs = egui::FontDefinitions::default();
        let data = defs
            .font_data
            .values()
            .next()
            .expect("egui ships default fonts");
        data.font.to_vec()
    }

    #[test]
    fn preferred_path_wins_over_the_search_list() {
        let dir = tempfile::tempdir().unwrap();
        let preferred = dir.path().join("preferred.ttf");
        std::fs::write(&preferred, bundled_font_bytes()).unwrap();
        assert!(try_load_font_from_path(&preferred).is_some());

        let (path, bytes) = find_font(Some(&preferred)).unwrap();
        assert_eq!(path, preferred);
        assert_eq!(bytes, bundled_font_bytes());
    }

    #[test]
    fn unusable_preferred_path_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.ttf");
        std::fs::write(&bogus, b"not a font").unwrap();
        if let Some((path, _)) = find_font(Some(&bogus)) {
            assert_ne!(path, bogus);
        }
    }
}
