use serde::Serialize;

use crate::error::{Result, SubgenError};

/// Code of the catalog entry that means "keep the transcription language".
pub const ORIGINAL_CODE: &str = "original";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

impl Language {
    /// True for the sentinel entry that skips translation.
    pub fn is_original(&self) -> bool {
        self.code == ORIGINAL_CODE
    }
}

pub static LANGUAGES: &[Language] = &[
    Language { code: ORIGINAL_CODE, name: "Original language" },
    Language { code: "en", name: "English" },
    Language { code: "es", name: "Spanish" },
    Language { code: "fr", name: "French" },
    Language { code: "de", name: "German" },
    Language { code: "it", name: "Italian" },
    Language { code: "pt", name: "Portuguese" },
    Language { code: "ja", name: "Japanese" },
    Language { code: "ko", name: "Korean" },
    Language { code: "zh-CN", name: "Chinese (Simplified)" },
    Language { code: "ru", name: "Russian" },
    Language { code: "ar", name: "Arabic" },
    Language { code: "hi", name: "Hindi" },
];

/// The default selection: no translation.
pub fn original() -> &'static Language {
    &LANGUAGES[0]
}

/// Look a language up by code, ignoring ASCII case.
pub fn find(code: &str) -> Result<&'static Language> {
    let code = code.trim();
    LANGUAGES
        .iter()
        .find(|lang| lang.code.eq_ignore_ascii_case(code))
        .ok_or_else(|| SubgenError::UnknownLanguage(code.to_string()))
}
