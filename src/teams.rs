use std::collections::HashMap;

use once_cell::sync::Lazy;

/// The 32 NFL franchises as (abbreviation, full name).
pub const TEAMS: [(&str, &str); 32] = [
    ("ARI", "Arizona Cardinals"),
    ("ATL", "Atlanta Falcons"),
    ("BAL", "Baltimore Ravens"),
    ("BUF", "Buffalo Bills"),
    ("CAR", "Carolina Panthers"),
    ("CHI", "Chicago Bears"),
    ("CIN", "Cincinnati Bengals"),
    ("CLE", "Cleveland Browns"),
    ("DAL", "Dallas Cowboys"),
    ("DEN", "Denver Broncos"),
    ("DET", "Detroit Lions"),
    ("GB", "Green Bay Packers"),
    ("HOU", "Houston Texans"),
    ("IND", "Indianapolis Colts"),
    ("JAX", "Jacksonville Jaguars"),
    ("KC", "Kansas City Chiefs"),
    ("LAC", "Los Angeles Chargers"),
    ("LAR", "Los Angeles Rams"),
    ("LV", "Las Vegas Raiders"),
    ("MIA", "Miami Dolphins"),
    ("MIN", "Minnesota Vikings"),
    ("NE", "New England Patriots"),
    ("NO", "New Orleans Saints"),
    ("NYG", "New York Giants"),
    ("NYJ", "New York Jets"),
    ("PHI", "Philadelphia Eagles"),
    ("PIT", "Pittsburgh Steelers"),
    ("SEA", "Seattle Seahawks"),
    ("SF", "San Francisco 49ers"),
    ("TB", "Tampa Bay Buccaneers"),
    ("TEN", "Tennessee Titans"),
    ("WAS", "Washington Commanders"),
];

static BY_ABBR: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| TEAMS.iter().copied().collect());

pub fn team_name(abbr: &str) -> Option<&'static str> {
    BY_ABBR.get(normalize_abbr(abbr).as_str()).copied()
}

pub fn is_known_team(abbr: &str) -> bool {
    BY_ABBR.contains_key(normalize_abbr(abbr).as_str())
}

pub fn all_abbrs() -> Vec<&'static str> {
    TEAMS.iter().map(|(abbr, _)| *abbr).collect()
}

pub fn normalize_abbr(raw: &str) -> String {
    raw.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_all_32_franchises() {
        assert_eq!(TEAMS.len(), 32);
        assert_eq!(all_abbrs().len(), 32);
    }

    #[test]
    fn lookup_is_case_and_whitespace_insensitive() {
        assert_eq!(team_name(" kc "), Some("Kansas City Chiefs"));
        assert_eq!(team_name("GB"), Some("Green Bay Packers"));
        assert!(team_name("XYZ").is_none());
    }
}
