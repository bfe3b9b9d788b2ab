/// Team codes and their Stats API ids, grouped by division.
pub const TEAMS: [(&str, u32); 30] = [
    // AL East
    ("BAL", 110),
    ("BOS", 111),
    ("NYY", 147),
    ("TB", 139),
    ("TOR", 141),
    // AL Central
    ("CWS", 145),
    ("CLE", 114),
    ("DET", 116),
    ("KC", 118),
    ("MIN", 142),
    // AL West
    ("HOU", 117),
    ("LAA", 108),
    ("OAK", 133),
    ("SEA", 136),
    ("TEX", 140),
    // NL East
    ("ATL", 144),
    ("MIA", 146),
    ("NYM", 121),
    ("PHI", 143),
    ("WSH", 120),
    // NL Central
    ("CHC", 112),
    ("CIN", 113),
    ("MIL", 158),
    ("PIT", 134),
    ("STL", 138),
    // NL West
    ("ARI", 109),
    ("COL", 115),
    ("LAD", 119),
    ("SD", 135),
    ("SF", 137),
];

/// Spellings the API uses that differ from the table above.
const ALIASES: [(&str, &str); 2] = [("AZ", "ARI"), ("WAS", "WSH")];

/// Resolve a team code (case-insensitive) to its numeric id.
pub fn team_id(code: &str) -> Option<u32> {
    let code = code.trim().to_ascii_uppercase();
    let code = ALIASES
        .iter()
        .find(|(alias, _)| *alias == code)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(code.as_str());
    TEAMS.iter().find(|(c, _)| *c == code).map(|(_, id)| *id)
}

/// Resolve a numeric id back to the canonical team code.
pub fn team_code(id: u32) -> Option<&'static str> {
    TEAMS.iter().find(|(_, i)| *i == id).map(|(c, _)| *c)
}
