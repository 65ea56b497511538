// src/strength.rs

use std::collections::BTreeMap;
use std::fmt;

use crate::dataset::MatchTable;

pub const STRENGTH_COLUMNS: [&str; 5] = ["Team", "Matches", "Goals Scored", "Goals Conceded", "Wins"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Venue {
    Home,
    Away,
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Home => f.write_str("home"),
            Venue::Away => f.write_str("away"),
        }
    }
}

/// Per-team averages over the matches a team played at one venue.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamStrength {
    pub team: String,
    pub matches: usize,
    pub goals_scored: f64,
    pub goals_conceded: f64,
    pub wins: usize,
}

#[derive(Default)]
struct Tally {
    matches: usize,
    scored: u64,
    conceded: u64,
    wins: usize,
}

/// Group played matches by the team at `venue`. Records without goals are
/// ignored. Sorted by team name.
pub fn team_strength(played: &MatchTable, venue: Venue) -> Vec<TeamStrength> {
    let mut by_team: BTreeMap<&str, Tally> = BTreeMap::new();

    for rec in played {
        let Some((home, away)) = rec.goals() else {
            continue;
        };
        let (team, scored, conceded) = match venue {
            Venue::Home => (rec.home_team.as_str(), home, away),
            Venue::Away => (rec.away_team.as_str(), away, home),
        };
        let t = by_team.entry(team).or_default();
        t.matches += 1;
        t.scored += u64::from(scored);
        t.conceded += u64::from(conceded);
        if scored > conceded {
            t.wins += 1;
        }
    }

    by_team
        .into_iter()
        .map(|(team, t)| TeamStrength {
            team: team.to_string(),
            matches: t.matches,
            goals_scored: t.scored as f64 / t.matches as f64,
            goals_conceded: t.conceded as f64 / t.matches as f64,
            wins: t.wins,
        })
        .collect()
}

pub fn home_strength(played: &MatchTable) -> Vec<TeamStrength> {
    team_strength(played, Venue::Home)
}

pub fn away_strength(played: &MatchTable) -> Vec<TeamStrength> {
    team_strength(played, Venue::Away)
}
