/// A panel colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREY: Rgb = Rgb(0x66, 0x66, 0x66);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);

    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Perceived brightness, 0..=255.
    pub fn luma(self) -> u8 {
        let Rgb(r, g, b) = self;
        ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
    }

    pub fn scaled(self, brightness: f32) -> Self {
        let k = brightness.clamp(0.0, 1.0);
        let scale = |c: u8| (c as f32 * k).round() as u8;
        Rgb(scale(self.0), scale(self.1), scale(self.2))
    }
}

// Anything darker than this vanishes on an unlit panel.
const MIN_LUMA: u8 = 40;

const TEAM_COLORS: [(&str, u32, u32); 31] = [
    ("BAL", 0xDF4601, 0x000000),
    ("BOS", 0xBD3039, 0x0C2340),
    ("NYY", 0x003087, 0xC4CED4),
    ("TB", 0x092C5C, 0x8FBCE6),
    ("TOR", 0x134A8E, 0xE8291C),
    ("CWS", 0x000000, 0xC4CED4),
    ("CLE", 0xE31937, 0x00295D),
    ("DET", 0x0C2340, 0xFA4616),
    ("KC", 0x004687, 0xBD9B60),
    ("MIN", 0x002B5C, 0xD31145),
    ("HOU", 0xEB6E1F, 0x002D62),
    ("LAA", 0xBA0021, 0x003263),
    ("OAK", 0x003831, 0xEFB21E),
    ("SEA", 0x0C2C56, 0x005C5C),
    ("TEX", 0xC0111F, 0x003278),
    ("ATL", 0xCE1141, 0x13274F),
    ("MIA", 0x00A3E0, 0xEF3340),
    ("NYM", 0xFF5910, 0x002D72),
    ("PHI", 0xE81828, 0x002D72),
    ("WSH", 0xAB0003, 0x11225B),
    ("CHC", 0x0E3386, 0xCC3433),
    ("CIN", 0xC6011F, 0x000000),
    ("MIL", 0x0A2351, 0xB6922E),
    ("PIT", 0x000000, 0xFDB827),
    ("STL", 0xC41E3A, 0x0C2340),
    ("ARI", 0xA71930, 0x000000),
    ("COL", 0x333366, 0xC4CED4),
    ("LAD", 0x005A9C, 0xA5ACAF),
    ("SD", 0x2F241D, 0xFFC425),
    ("SF", 0xFD5A1E, 0x000000),
    ("MLB", 0x002D72, 0xE4002B),
];

/// Primary and secondary colours; white on black for unknown codes.
pub fn team_colors(code: &str) -> (Rgb, Rgb) {
    TEAM_COLORS
        .iter()
        .find(|(c, _, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, p, s)| (Rgb::from_hex(*p), Rgb::from_hex(*s)))
        .unwrap_or((Rgb::WHITE, Rgb::BLACK))
}

/// Colour for a team's name on the panel: primary, else secondary, else white.
pub fn team_text_color(code: &str) -> Rgb {
    let (primary, secondary) = team_colors(code);
    if primary.luma() >= MIN_LUMA {
        primary
    } else if secondary.luma() >= MIN_LUMA {
        secondary
    } else {
        Rgb::WHITE
    }
}

/// Colour for a detailed game state such as "In Progress" or "Postponed".
pub fn game_state_color(detailed_state: &str) -> Rgb {
    let state = detailed_state.to_ascii_lowercase();
    if state.contains("progress") || state.contains("live") {
        Rgb::from_hex(0x00FF00)
    } else if state.contains("final") || state.contains("game over") || state.contains("completed") {
        Rgb::from_hex(0x666666)
    } else if state.contains("delay") {
        Rgb::from_hex(0xFFFF00)
    } else if state.contains("postponed") || state.contains("cancel") {
        Rgb::from_hex(0xFF0000)
    } else if state.contains("suspended") {
        Rgb::from_hex(0xFF00FF)
    } else if state.contains("pre-game") || state.contains("warmup") {
        Rgb::from_hex(0x00FFFF)
    } else {
        Rgb::from_hex(0x2222FF)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_unpacks_channels() {
        assert_eq!(Rgb::from_hex(0xCE1141), Rgb(0xCE, 0x11, 0x41));
    }

    #[test]
    fn dark_primaries_fall_back() {
        assert_eq!(team_text_color("ATL"), Rgb::from_hex(0xCE1141));
        assert_eq!(team_text_color("PIT"), Rgb::from_hex(0xFDB827));
        assert_eq!(team_text_color("cws"), Rgb::from_hex(0xC4CED4));
        assert_eq!(team_text_color("ZZZ"), Rgb::WHITE);
    }

    #[test]
    fn every_team_in_the_id_table_has_colours() {
        for (code, _) in mlb_api::teams::TEAMS {
            assert_ne!(team_colors(code), (Rgb::WHITE, Rgb::BLACK), "{code}");
        }
    }

    #[test]
    fn game_states_map_to_colours() {
        assert_eq!(game_state_color("In Progress"), Rgb(0, 255, 0));
        assert_eq!(game_state_color("Game Over"), Rgb::GREY);
        assert_eq!(game_state_color("Delayed Start: Rain"), Rgb::YELLOW);
        assert_eq!(game_state_color("Postponed"), Rgb::RED);
        assert_eq!(game_state_color("Suspended"), Rgb(255, 0, 255));
        assert_eq!(game_state_color("Pre-Game"), Rgb(0, 255, 255));
        assert_eq!(game_state_color("Scheduled"), Rgb(0x22, 0x22, 0xFF));
    }

    #[test]
    fn brightness_scales_channels() {
        assert_eq!(Rgb(200, 100, 0).scaled(0.5), Rgb(100, 50, 0));
        assert_eq!(Rgb(200, 100, 0).scaled(2.0), Rgb(200, 100, 0));
    }
}
