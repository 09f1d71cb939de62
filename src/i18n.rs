// i18n.rs
//
// Lightweight runtime i18n, table embedded at build time:
// - assets/i18n.json, format: { "<lang>": { "key": "value" } }
// - Load order: selected lang -> fallback zh-Hans
// - Lookup: tr("key") / tr_with("key", [("name", "...")]) with {name} placeholders
//
// Language selection:
// - CLI: --lang <code> (e.g. en, zh-Hans)
// - Env: MULTIVIEW_LANG
// - Default: zh-Hans

use once_cell::sync::OnceCell;
use std::{collections::HashMap, sync::RwLock};

const FALLBACK_LANG: &str = "zh-Hans";
const TABLE_JSON: &str = include_str!("../assets/i18n.json");

#[derive(Debug, Clone)]
struct I18n {
    lang: String,
    map: HashMap<String, String>,
    fallback_map: HashMap<String, String>,
}

static I18N: OnceCell<RwLock<I18n>> = OnceCell::new();

fn load_lang(lang: &str) -> HashMap<String, String> {
    let all: HashMap<String, HashMap<String, String>> =
        serde_json::from_str(TABLE_JSON).unwrap_or_default();
    all.get(lang).cloned().unwrap_or_default()
}

/// Initialize global i18n. Safe to call multiple times; later calls overwrite current lang maps.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();
    let map = load_lang(&lang);
    let fallback_map = if lang == FALLBACK_LANG {
        map.clone()
    } else {
        load_lang(FALLBACK_LANG)
    };

    let i = I18n {
        lang,
        map,
        fallback_map,
    };

    if let Some(lock) = I18N.get() {
        if let Ok(mut w) = lock.write() {
            *w = i;
        }
    } else {
        let _ = I18N.set(RwLock::new(i));
    }
}

fn get_locked() -> Option<std::sync::RwLockReadGuard<'static, I18n>> {
    I18N.get().and_then(|l| l.read().ok())
}

/// Currently selected language code (for the generated document's lang attribute).
pub fn lang() -> String {
    get_locked()
        .map(|i| i.lang.clone())
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
}

/// Get localized text by key. If key missing, returns key itself.
pub fn tr(key: &str) -> String {
    let Some(i) = get_locked() else {
        return key.to_string();
    };

    if let Some(v) = i.map.get(key) {
        return v.clone();
    }
    if let Some(v) = i.fallback_map.get(key) {
        return v.clone();
    }
    key.to_string()
}

/// Get localized text and substitute `{name}` placeholders.
/// Any placeholder not provided is kept as-is.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    let mut s = tr(key);
    for (k, v) in args {
        let placeholder = format!("{{{}}}", k);
        s = s.replace(&placeholder, v);
    }
    s
}

/// Choose language from CLI/env.
pub fn resolve_lang_from_args() -> String {
    // CLI: --lang <code>
    let mut it = std::env::args();
    while let Some(a) = it.next() {
        if a == "--lang" {
            if let Some(v) = it.next() {
                return v;
            }
        }
    }

    // Env: MULTIVIEW_LANG
    if let Ok(v) = std::env::var("MULTIVIEW_LANG") {
        if !v.trim().is_empty() {
            return v;
        }
    }

    FALLBACK_LANG.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_parses_and_covers_both_langs() {
        let all: HashMap<String, HashMap<String, String>> =
            serde_json::from_str(TABLE_JSON).unwrap();
        let zh = all.get("zh-Hans").unwrap();
        let en = all.get("en").unwrap();
        // 两种语言的键集合一致
        for key in zh.keys() {
            assert!(en.contains_key(key), "missing en key: {}", key);
        }
        for key in en.keys() {
            assert!(zh.contains_key(key), "missing zh-Hans key: {}", key);
        }
    }

    #[test]
    fn missing_key_falls_back_to_key() {
        assert_eq!(tr("definitely.not.a.key"), "definitely.not.a.key");
    }

    #[test]
    fn placeholders_are_substituted() {
        let s = tr_with("definitely.not.a.key {n}", &[("n", "7".to_string())]);
        assert_eq!(s, "definitely.not.a.key 7");
    }
}
