//! crates/learning_assistant_core/src/language.rs
//!
//! The twelve UI languages and the script-membership test used to decide
//! whether generated text needs a translation pass.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    English,
    Spanish,
    Hindi,
    Arabic,
    Chinese,
    Portuguese,
    French,
    Indonesian,
    Vietnamese,
    Turkish,
    Japanese,
    Russian,
}

impl Language {
    pub const ALL: [Language; 12] = [
        Language::English,
        Language::Spanish,
        Language::Hindi,
        Language::Arabic,
        Language::Chinese,
        Language::Portuguese,
        Language::French,
        Language::Indonesian,
        Language::Vietnamese,
        Language::Turkish,
        Language::Japanese,
        Language::Russian,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::Hindi => "hi",
            Language::Arabic => "ar",
            Language::Chinese => "zh",
            Language::Portuguese => "pt",
            Language::French => "fr",
            Language::Indonesian => "id",
            Language::Vietnamese => "vi",
            Language::Turkish => "tr",
            Language::Japanese => "ja",
            Language::Russian => "ru",
        }
    }

    /// Native label shown in the language picker.
    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Español",
            Language::Hindi => "हिंदी",
            Language::Arabic => "العربية",
            Language::Chinese => "中文 (简体)",
            Language::Portuguese => "Português (BR)",
            Language::French => "Français",
            Language::Indonesian => "Bahasa Indonesia",
            Language::Vietnamese => "Tiếng Việt",
            Language::Turkish => "Türkçe",
            Language::Japanese => "日本語",
            Language::Russian => "Русский",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Arabic)
    }

    /// Locale handed to the device speech engines.
    pub fn speech_locale(&self) -> &'static str {
        match self {
            Language::Hindi => "hi-IN",
            _ => "en-US",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("unsupported language code '{}'", s))
    }
}

fn is_japanese(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{30FF}' | '\u{31F0}'..='\u{31FF}' | '\u{4E00}'..='\u{9FAF}')
}

fn is_arabic(c: char) -> bool {
    matches!(c, '\u{0600}'..='\u{06FF}')
}

fn is_devanagari(c: char) -> bool {
    matches!(c, '\u{0900}'..='\u{097F}')
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{04FF}')
}

fn is_han(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}')
}

/// Returns the character test for languages with a distinctive script.
fn script_test(code: &str) -> Option<fn(char) -> bool> {
    match code {
        "ja" => Some(is_japanese),
        "ar" => Some(is_arabic),
        "hi" => Some(is_devanagari),
        "ru" => Some(is_cyrillic),
        "zh" => Some(is_han),
        _ => None,
    }
}

/// True when `text` is non-empty, the language has a script test, and no
/// character of `text` passes it.
pub fn needs_translation(text: &str, language_code: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    match script_test(&language_code.trim().to_ascii_lowercase()) {
        Some(test) => !text.chars().any(test),
        None => false,
    }
}
