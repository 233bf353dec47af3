use std::collections::HashMap;
use std::sync::OnceLock;

static CITY_KEY_MAP: OnceLock<HashMap<String, &'static str>> = OnceLock::new();

/// Names with their own rows in the reference table.
const CANONICAL_CITIES: &[&str] = &[
    "Toronto",
    "Markham",
    "Richmond Hill",
    "Vaughan",
    "Scarborough",
    "Mississauga",
    "Brampton",
    "Pickering",
    "Ajax",
];

/// Sub-regions priced off a neighbouring market's data.
const CITY_ALIASES: &[(&str, &str)] = &[
    // Former boroughs inside the Toronto market
    ("Etobicoke", "Toronto"),
    ("North York", "Toronto"),
    // High-value 905 region tracking Markham/Richmond Hill
    ("Oakville", "Markham"),
];

/// Maps a city name to the key its market data is filed under. Unknown names
/// come back untouched.
pub fn normalize(city: &str) -> &str {
    match city_key_map().get(&lookup_key(city)) {
        Some(&key) => key,
        None => city,
    }
}

pub fn is_known(city: &str) -> bool {
    city_key_map().contains_key(&lookup_key(city))
}

fn city_key_map() -> &'static HashMap<String, &'static str> {
    CITY_KEY_MAP.get_or_init(|| {
        CANONICAL_CITIES
            .iter()
            .map(|city| (*city, *city))
            .chain(CITY_ALIASES.iter().copied())
            .map(|(name, key)| (lookup_key(name), key))
            .collect()
    })
}

fn lookup_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::domain::CITIES;
    use crate::valuation::reference::PsfTable;

    #[test]
    fn aliases_map_to_data_source_city() {
        assert_eq!(normalize("Etobicoke"), "Toronto");
        assert_eq!(normalize("North York"), "Toronto");
        assert_eq!(normalize("Oakville"), "Markham");
        assert_eq!(normalize("Ajax"), "Ajax");
    }

    #[test]
    fn lookup_ignores_case_and_spacing() {
        assert_eq!(normalize("  richmond   HILL "), "Richmond Hill");
        assert_eq!(normalize("north york"), "Toronto");
    }

    #[test]
    fn unknown_city_passes_through() {
        assert_eq!(normalize("Barrie"), "Barrie");
        assert!(!is_known("Barrie"));
    }

    #[test]
    fn normalization_is_idempotent() {
        for city in CITIES.iter().copied().chain(["Barrie", " oakville "]) {
            let once = normalize(city);
            assert_eq!(normalize(once), once, "{city} not idempotent");
        }
    }

    #[test]
    fn every_form_city_has_detailed_data() {
        let table = PsfTable::reference();
        for city in CITIES {
            assert!(
                table.detailed(2024, normalize(city)).is_some(),
                "{city} has no detailed market data"
            );
        }
    }
}
