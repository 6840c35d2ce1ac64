//! Internationalization (i18n) for UVMapEdit.
//!
//! Key→string tables are embedded at compile time from `locales/*.txt`.
//! `t!("key")` looks up the current language, falls back to English, then to
//! the key itself.

use std::collections::HashMap;
use std::sync::Mutex;

static I18N: Mutex<Option<I18nState>> = Mutex::new(None);

struct I18nState {
    current_lang: String,
    /// lang_code → (key → translated_string)
    translations: HashMap<String, HashMap<String, String>>,
}

/// Supported languages: (code, native_name)
pub const LANGUAGES: &[(&str, &str)] = &[("en", "English"), ("fr", "Français")];

/// Load the embedded tables. Call once at startup; starts in English.
pub fn init() {
    let mut translations = HashMap::new();
    translations.insert("en".to_string(), parse_translations(include_str!("../locales/en.txt")));
    translations.insert("fr".to_string(), parse_translations(include_str!("../locales/fr.txt")));

    if let Ok(mut guard) = I18N.lock() {
        *guard = Some(I18nState {
            current_lang: "en".to_string(),
            translations,
        });
    }
}

/// Set the active language. Unknown codes fall back to "en".
pub fn set_language(code: &str) {
    if let Ok(mut guard) = I18N.lock()
        && let Some(ref mut state) = *guard
    {
        state.current_lang = if state.translations.contains_key(code) {
            code.to_string()
        } else {
            "en".to_string()
        };
    }
}

pub fn current_language() -> String {
    if let Ok(guard) = I18N.lock()
        && let Some(ref state) = *guard
    {
        return state.current_lang.clone();
    }
    "en".to_string()
}

pub fn translate(key: &str) -> String {
    if let Ok(guard) = I18N.lock()
        && let Some(ref state) = *guard
    {
        for lang in [state.current_lang.as_str(), "en"] {
            if let Some(val) = state.translations.get(lang).and_then(|m| m.get(key)) {
                return val.clone();
            }
        }
    }
    key.to_string()
}

/// Best supported language for the environment's locale variables, else "en".
pub fn detect_system_language() -> String {
    for var in &["LC_ALL", "LC_MESSAGES", "LANG", "LANGUAGE"] {
        if let Ok(val) = std::env::var(var)
            && let Some(lang) = match_system_locale(&val)
        {
            return lang;
        }
    }
    "en".to_string()
}

/// Map "fr_CA.UTF-8", "en-GB", "fr@euro" … onto a supported code.
fn match_system_locale(locale: &str) -> Option<String> {
    let normalized = locale.to_lowercase().replace('_', "-");
    let lang_part = normalized.split(['.', '@']).next().unwrap_or(&normalized);
    let primary = lang_part.split('-').next().unwrap_or(lang_part);

    LANGUAGES
        .iter()
        .find(|(code, _)| code.to_lowercase() == lang_part || *code == primary)
        .map(|(code, _)| code.to_string())
}

/// One `key=value` per line; `#` comments and blank lines ignored.
fn parse_translations(data: &str) -> HashMap<String, String> {
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

/// Translation macro. Usage: `t!("button.upload_map")` or
/// `t!("notice.exported", path = p.display())`
#[macro_export]
macro_rules! t {
    ($key:expr) => {
        $crate::i18n::translate($key)
    };
    ($key:expr, $($name:ident = $val:expr),+ $(,)?) => {{
        let mut s = $crate::i18n::translate($key);
        $(
            s = s.replace(concat!("{", stringify!($name), "}"), &format!("{}", $val));
        )+
        s
    }};
}
