//! Taxonomic normalization
//!
//! Collapses infraspecific names to species level so every variety and
//! subspecies is counted under its parent species.

use smallvec::SmallVec;

const INFRASPECIFIC_MARKERS: [&str; 8] = [
    "var.", "var", "subsp.", "subsp", "ssp.", "ssp", "f.", "forma",
];

const HYBRID_MARKERS: [&str; 2] = ["×", "x"];

/// Species-level binomial for a record
///
/// Prefers the Darwin Core `species` column when filled; otherwise keeps genus
/// and epithet from the scientific name, dropping infraspecific parts and
/// authorship. Returns `None` for names above species rank.
pub fn species_name(scientific_name: Option<&str>, species_column: Option<&str>) -> Option<String> {
    if let Some(species) = species_column {
        if let Some(name) = collapse_to_species(species) {
            return Some(name);
        }
    }

    scientific_name.and_then(collapse_to_species)
}

/// Reduce a (possibly infraspecific, possibly authored) name to "Genus epithet"
pub fn collapse_to_species(raw: &str) -> Option<String> {
    let tokens: SmallVec<[&str; 6]> = raw.split_whitespace().collect();
    let genus = tokens.first()?;

    if !genus.chars().next().map_or(false, |c| c.is_alphabetic()) {
        return None;
    }

    let mut rest = tokens[1..].iter().copied();
    let mut second = rest.next()?;
    let mut hybrid = false;

    if HYBRID_MARKERS.contains(&second) {
        hybrid = true;
        second = rest.next()?;
    }

    if !is_epithet(second) {
        return None;
    }

    let genus = capitalize(genus);
    let epithet = second.to_lowercase();

    Some(if hybrid {
        format!("{} × {}", genus, epithet)
    } else {
        format!("{} {}", genus, epithet)
    })
}

/// Genus of a species-level name
pub fn genus_of(species: &str) -> &str {
    species.split_whitespace().next().unwrap_or("")
}

/// Join key: trimmed, lowercased, internal whitespace collapsed
pub fn normalize_key(name: &str) -> String {
    name.split_whitespace()
        .map(|t| t.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_epithet(token: &str) -> bool {
    // Authorship ("L.", "(Michx.)") and rank markers are not epithets
    !INFRASPECIFIC_MARKERS.contains(&token.to_lowercase().as_str())
        && token.chars().next().map_or(false, |c| c.is_lowercase())
        && token.chars().all(|c| c.is_alphabetic() || c == '-')
}

fn capitalize(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_infraspecific() {
        assert_eq!(
            collapse_to_species("Acer saccharum var. nigrum"),
            Some("Acer saccharum".to_string())
        );
        assert_eq!(
            collapse_to_species("Viola sororia subsp. affinis (Leconte) Gil-Ekblad"),
            Some("Viola sororia".to_string())
        );
        assert_eq!(
            collapse_to_species("Trillium erectum L."),
            Some("Trillium erectum".to_string())
        );
    }

    #[test]
    fn test_case_is_normalized() {
        assert_eq!(
            collapse_to_species("  QUERCUS   alba "),
            Some("Quercus alba".to_string())
        );
    }

    #[test]
    fn test_hybrids_keep_marker() {
        assert_eq!(
            collapse_to_species("Quercus × bebbiana C.K.Schneid."),
            Some("Quercus × bebbiana".to_string())
        );
        assert_eq!(
            collapse_to_species("Quercus x bebbiana"),
            Some("Quercus × bebbiana".to_string())
        );
    }

    #[test]
    fn test_genus_only_is_rejected() {
        assert_eq!(collapse_to_species("Carex"), None);
        assert_eq!(collapse_to_species("Carex L."), None);
        assert_eq!(collapse_to_species(""), None);
        assert_eq!(collapse_to_species("   "), None);
    }

    #[test]
    fn test_species_column_preferred() {
        assert_eq!(
            species_name(Some("Acer rubrum var. trilobum"), Some("Acer rubrum")),
            Some("Acer rubrum".to_string())
        );
        assert_eq!(
            species_name(Some("Acer rubrum var. trilobum"), Some("")),
            Some("Acer rubrum".to_string())
        );
        assert_eq!(species_name(None, None), None);
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Acer   Rubrum "), "acer rubrum");
        assert_eq!(genus_of("Acer rubrum"), "Acer");
    }
}
