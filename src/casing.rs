//! Casing transfer (C12): map a dictionary word's letters to mirror the
//! casing class of the original (possibly differently-cased) query
//! string (spec.md §4.5).

use crate::types::CasingClass;

/// Classify `source`'s casing. Non-alphabetic characters are ignored when
/// deciding between all-upper/all-lower/title; a string with no letters
/// at all classifies as all-lower (an identity transform).
pub fn classify(source: &str) -> CasingClass {
    let letters: Vec<char> = source.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return CasingClass::AllLower;
    }
    if letters.iter().all(|c| c.is_uppercase()) {
        return CasingClass::AllUpper;
    }
    if letters.iter().all(|c| c.is_lowercase()) {
        return CasingClass::AllLower;
    }
    let mut chars = source.chars();
    if let Some(first) = chars.next() {
        if first.is_uppercase() {
            let rest_is_lower = chars.clone().filter(|c| c.is_alphabetic()).all(|c| c.is_lowercase());
            if rest_is_lower {
                return CasingClass::Title;
            }
        }
    }
    CasingClass::Mixed(source.chars().map(|c| c.is_uppercase()).collect())
}

/// Map `target`'s letters onto `source`'s casing class.
///
/// Applying this twice in a row is idempotent: the second application
/// re-derives the same casing class from `source` and re-applies it to an
/// already-conforming string, producing no change.
pub fn transfer_case(source: &str, target: &str) -> String {
    match classify(source) {
        CasingClass::AllUpper => target.to_uppercase(),
        CasingClass::AllLower => target.to_lowercase(),
        CasingClass::Title => {
            let mut chars = target.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        }
        CasingClass::Mixed(flags) => target
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if *flags.get(i).unwrap_or(&false) {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_upper_source() {
        assert_eq!(transfer_case("HELO", "hello"), "HELLO");
    }

    #[test]
    fn all_lower_source() {
        assert_eq!(transfer_case("helo", "HELLO"), "hello");
    }

    #[test]
    fn title_case_source() {
        assert_eq!(transfer_case("Helo", "hello"), "Hello");
    }

    #[test]
    fn mixed_case_source() {
        assert_eq!(transfer_case("HeLo", "hello"), "HeLlo");
    }

    #[test]
    fn mixed_case_padded_to_target_length() {
        // source shorter than target: positions past the end of the flag
        // vector default to lowercase
        assert_eq!(transfer_case("HeL", "hello"), "HeLlo");
    }

    #[test]
    fn non_letter_source_position_is_lowercase_in_target() {
        // position 1 ('3') is not a letter, so target position 1 ('o') stays lowercase
        assert_eq!(transfer_case("H3Lo", "four"), "FoUr");
    }

    #[test]
    fn idempotent() {
        let source = "HeLo";
        let target = "hello";
        let once = transfer_case(source, target);
        let twice = transfer_case(source, &once);
        assert_eq!(once, twice);
    }
}
