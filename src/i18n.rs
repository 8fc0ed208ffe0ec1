// i18n.rs — runtime string tables
//
// - Strings live in either:
//   A) assets/i18n/<lang>.json
//   B) assets/i18n.json (single file, format: { "<lang>": { "key": "value" } })
// - Lookup order: selected lang -> en -> the key itself
// - tr("key") / tr_with("key", [("name", "...")]) with {name} placeholders
//
// Language selection lives in config::resolve_lang (--lang, TURNTABLE_LANG).

use crate::config::locate;
use once_cell::sync::OnceCell;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

pub const FALLBACK_LANG: &str = "en";

type Table = HashMap<String, String>;

#[derive(Debug, Clone, Default)]
struct Catalog {
    lang: String,
    primary: Table,
    fallback: Table,
}

impl Catalog {
    fn lookup(&self, key: &str) -> Option<&String> {
        self.primary.get(key).or_else(|| self.fallback.get(key))
    }
}

static CATALOG: OnceCell<RwLock<Catalog>> = OnceCell::new();

fn parse_table(text: &str) -> Option<Table> {
    serde_json::from_str(text).ok()
}

fn parse_multi_lang(text: &str, lang: &str) -> Option<Table> {
    let mut all: HashMap<String, Table> = serde_json::from_str(text).ok()?;
    all.remove(lang)
}

fn read(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

fn load_table(lang: &str) -> Table {
    let per_lang = PathBuf::from("assets").join("i18n").join(format!("{lang}.json"));
    if let Some(table) = locate(&per_lang).and_then(|p| read(&p)).and_then(|t| parse_table(&t)) {
        return table;
    }

    let combined = PathBuf::from("assets").join("i18n.json");
    locate(&combined)
        .and_then(|p| read(&p))
        .and_then(|t| parse_multi_lang(&t, lang))
        .unwrap_or_else(|| {
            log::debug!("no strings for language {lang}");
            Table::new()
        })
}

/// Load `lang`. Safe to call again; later calls replace the active tables.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();
    let primary = load_table(&lang);
    let fallback = if lang == FALLBACK_LANG {
        Table::new()
    } else {
        load_table(FALLBACK_LANG)
    };
    let catalog = Catalog {
        lang,
        primary,
        fallback,
    };
    log::debug!(
        "language {}: {} strings, {} fallback",
        catalog.lang,
        catalog.primary.len(),
        catalog.fallback.len()
    );

    match CATALOG.get() {
        Some(lock) => {
            if let Ok(mut w) = lock.write() {
                *w = catalog;
            }
        }
        None => {
            let _ = CATALOG.set(RwLock::new(catalog));
        }
    }
}

/// Localized text for `key`; the key itself when no table has it.
pub fn tr(key: &str) -> String {
    CATALOG
        .get()
        .and_then(|l| l.read().ok())
        .and_then(|c| c.lookup(key).cloned())
        .unwrap_or_else(|| key.to_string())
}

/// Localized text with `{name}` placeholders filled in. Unknown placeholders stay as-is.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    let mut s = tr(key);
    for (k, v) in args {
        s = s.replace(&format!("{{{k}}}"), v);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_falls_back_to_the_key() {
        assert_eq!(tr("no.such.key"), "no.such.key");
    }

    #[test]
    fn placeholders_are_substituted_and_unknown_ones_kept() {
        let s = tr_with("{a} and {b}", &[("a", "1".to_string())]);
        assert_eq!(s, "1 and {b}");
    }

    #[test]
    fn multi_lang_file_selects_one_language() {
        let text = r#"{ "en": { "k": "hello" }, "fr": { "k": "bonjour" } }"#;
        let fr = parse_multi_lang(text, "fr").unwrap();
        assert_eq!(fr.get("k").map(String::as_str), Some("bonjour"));
        assert!(parse_multi_lang(text, "de").is_none());
    }

    #[test]
    fn primary_table_wins_over_fallback() {
        let catalog = Catalog {
            lang: "fr".into(),
            primary: parse_table(r#"{ "a": "un" }"#).unwrap(),
            fallback: parse_table(r#"{ "a": "one", "b": "two" }"#).unwrap(),
        };
        assert_eq!(catalog.lookup("a").map(String::as_str), Some("un"));
        assert_eq!(catalog.lookup("b").map(String::as_str), Some("two"));
        assert!(catalog.lookup("c").is_none());
    }
}
