//! Language tag registry.
//!
//! The engine speaks NLLB-style tags (`eng_Latn`, `kor_Hang`, ...) at its
//! translation boundary and short ISO codes (`en`, `ko`, ...) at its
//! recognition boundary. This module maps between the two.

/// Supported languages: (detector/ASR code, translation tag).
const LANGUAGES: &[(&str, &str)] = &[
    ("en", "eng_Latn"),
    ("ko", "kor_Hang"),
    ("ja", "jpn_Jpan"),
    ("zh", "cmn_Hans"),
    ("de", "deu_Latn"),
    ("fr", "fra_Latn"),
    ("es", "spa_Latn"),
    ("ru", "rus_Cyrl"),
    ("pt", "por_Latn"),
    ("it", "ita_Latn"),
    ("vi", "vie_Latn"),
    ("th", "tha_Thai"),
    ("id", "ind_Latn"),
    ("nl", "nld_Latn"),
    ("tr", "tur_Latn"),
    ("ar", "ara_Arab"),
    ("hi", "hin_Deva"),
];

/// Maps a translation tag to the ASR language code.
///
/// Unknown tags fall back to English, mirroring the translation side's
/// default.
pub fn asr_code_for_tag(tag: &str) -> &'static str {
    LANGUAGES
        .iter()
        .find(|(_, t)| *t == tag)
        .map(|(code, _)| *code)
        .unwrap_or("en")
}

/// Maps an ASR/detector language code to the translation tag.
pub fn tag_for_code(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, tag)| *tag)
}

/// Returns true if the tag is one of the supported translation tags.
pub fn is_known_tag(tag: &str) -> bool {
    LANGUAGES.iter().any(|(_, t)| *t == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asr_code_for_known_tags() {
        assert_eq!(asr_code_for_tag("eng_Latn"), "en");
        assert_eq!(asr_code_for_tag("kor_Hang"), "ko");
        assert_eq!(asr_code_for_tag("cmn_Hans"), "zh");
    }

    #[test]
    fn test_asr_code_falls_back_to_english() {
        assert_eq!(asr_code_for_tag("xxx_Yyyy"), "en");
    }

    #[test]
    fn test_tag_for_code() {
        assert_eq!(tag_for_code("ja"), Some("jpn_Jpan"));
        assert_eq!(tag_for_code("ar"), Some("ara_Arab"));
        assert_eq!(tag_for_code("xx"), None);
    }

    #[test]
    fn test_mapping_is_bijective() {
        for (code, tag) in LANGUAGES {
            assert_eq!(tag_for_code(code), Some(*tag));
            assert_eq!(asr_code_for_tag(tag), *code);
        }
    }

    #[test]
    fn test_is_known_tag() {
        assert!(is_known_tag("rus_Cyrl"));
        assert!(!is_known_tag("auto"));
    }
}
