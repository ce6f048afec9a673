//! Vernacular name handling utility
//!
//! Picks one common name out of the several a name service may return and
//! formats species labels for the reports.

/// Get formatted display name for a species
///
/// Returns: "Scientific name (Common name)" or just "Scientific name"
pub fn get_display_name(scientific_name: &str, common_name: Option<&str>) -> String {
    match common_name.map(str::trim).filter(|c| !c.is_empty()) {
        Some(common) => format!("{} ({})", scientific_name, common),
        None => scientific_name.to_string(),
    }
}

/// Choose the preferred name from candidates
///
/// Logic:
/// - Candidates may themselves hold ';' or '|' separated lists
/// - Trim, drop empties, compare case-insensitively
/// - First alphabetical wins
pub fn pick_first_alphabetical<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let separators = [';', '|'];
    let mut names: Vec<&str> = candidates
        .into_iter()
        .flat_map(|raw| raw.split(move |c| separators.contains(&c)))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    if names.is_empty() {
        return None;
    }

    names.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b)));
    names.first().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_first_alphabetical() {
        assert_eq!(
            pick_first_alphabetical(["Silver Maple; River Maple; White Maple"]),
            Some("River Maple".to_string())
        );
        assert_eq!(
            pick_first_alphabetical(["  b_name  ", " a_name "]),
            Some("a_name".to_string())
        );
        assert_eq!(
            pick_first_alphabetical(["red maple", "Swamp Maple"]),
            Some("red maple".to_string())
        );
        assert_eq!(pick_first_alphabetical(["single_name"]), Some("single_name".to_string()));
        assert_eq!(pick_first_alphabetical([""]), None);
        assert_eq!(pick_first_alphabetical(["   ;   "]), None);
        assert_eq!(pick_first_alphabetical(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_get_display_name() {
        assert_eq!(
            get_display_name("Acer saccharinum", Some("Silver Maple")),
            "Acer saccharinum (Silver Maple)"
        );
        assert_eq!(get_display_name("Acer saccharinum", Some("  ")), "Acer saccharinum");
        assert_eq!(get_display_name("Acer saccharinum", None), "Acer saccharinum");
    }
}
