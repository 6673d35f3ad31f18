use std::collections::HashMap;

use once_cell::sync::Lazy;

// Offsets follow the row order of the leaguedashteamstats feed (alphabetical by TEAM_NAME).
const TEAMS: &[(&str, usize)] = &[
    ("Atlanta Hawks", 0),
    ("Boston Celtics", 1),
    ("Brooklyn Nets", 2),
    ("Charlotte Hornets", 3),
    ("Chicago Bulls", 4),
    ("Cleveland Cavaliers", 5),
    ("Dallas Mavericks", 6),
    ("Denver Nuggets", 7),
    ("Detroit Pistons", 8),
    ("Golden State Warriors", 9),
    ("Houston Rockets", 10),
    ("Indiana Pacers", 11),
    ("LA Clippers", 12),
    ("Los Angeles Clippers", 12),
    ("Los Angeles Lakers", 13),
    ("Memphis Grizzlies", 14),
    ("Miami Heat", 15),
    ("Milwaukee Bucks", 16),
    ("Minnesota Timberwolves", 17),
    ("New Orleans Pelicans", 18),
    ("New York Knicks", 19),
    ("Oklahoma City Thunder", 20),
    ("Orlando Magic", 21),
    ("Philadelphia 76ers", 22),
    ("Phoenix Suns", 23),
    ("Portland Trail Blazers", 24),
    ("Sacramento Kings", 25),
    ("San Antonio Spurs", 26),
    ("Toronto Raptors", 27),
    ("Utah Jazz", 28),
    ("Washington Wizards", 29),
];

static TEAM_INDEX: Lazy<HashMap<&'static str, usize>> =
    Lazy::new(|| TEAMS.iter().copied().collect());

pub fn team_index() -> &'static HashMap<&'static str, usize> {
    &TEAM_INDEX
}

pub fn team_offset(name: &str) -> Option<usize> {
    TEAM_INDEX.get(name).copied()
}
