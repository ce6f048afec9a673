//! Flowering annotation parsing
//!
//! Annotations are community tags such as "Flowering", "Flower Budding" or
//! "flowers|fruits". Several values may share one field.

use crate::config::FloweringVocabulary;

const VALUE_SEPARATORS: [char; 3] = ['|', ';', ','];

/// Whether an annotation marks the observation as flowering
///
/// Exclude tokens win over include tokens within the same value.
pub fn is_flowering(annotation: Option<&str>, vocabulary: &FloweringVocabulary) -> bool {
    let Some(raw) = annotation else {
        return false;
    };

    raw.split(|c| VALUE_SEPARATORS.contains(&c))
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .any(|value| {
            let excluded = vocabulary
                .exclude
                .iter()
                .any(|token| value.contains(&token.to_lowercase()));
            !excluded
                && vocabulary
                    .include
                    .iter()
                    .any(|token| value.contains(&token.to_lowercase()))
        })
}
