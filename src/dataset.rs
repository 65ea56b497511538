// src/dataset.rs

/// Column headers of the raw table, in output order.
pub const RAW_COLUMNS: [&str; 8] = [
    "Matchweek",
    "Date",
    "Home Team",
    "Home XG",
    "Score",
    "Away XG",
    "Away Team",
    "Match Report",
];

/// Column headers of the played / unplayed tables, in output order.
pub const MATCH_COLUMNS: [&str; 9] = [
    "Matchweek",
    "Date",
    "Home Team",
    "Home XG",
    "Away XG",
    "Away Team",
    "Match Report",
    "Home Goals",
    "Away Goals",
];

/// One table row as it appears on the page, after carry-forward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMatchRow {
    pub matchweek: String,
    pub date: String,
    pub home_team: String,
    pub home_xg: String,
    pub score: String,
    pub away_xg: String,
    pub away_team: String,
    pub match_report: String,
}

impl RawMatchRow {
    /// Build from fields in [`RAW_COLUMNS`] order.
    pub fn from_fields(fields: [&str; 8]) -> Self {
        let [matchweek, date, home_team, home_xg, score, away_xg, away_team, match_report] =
            fields.map(str::to_string);
        Self {
            matchweek,
            date,
            home_team,
            home_xg,
            score,
            away_xg,
            away_team,
            match_report,
        }
    }

    pub fn fields(&self) -> [&str; 8] {
        [
            self.matchweek.as_str(),
            self.date.as_str(),
            self.home_team.as_str(),
            self.home_xg.as_str(),
            self.score.as_str(),
            self.away_xg.as_str(),
            self.away_team.as_str(),
            self.match_report.as_str(),
        ]
    }

    pub fn is_blank(&self) -> bool {
        self.fields().iter().all(|f| f.trim().is_empty())
    }
}

/// Column-aligned raw table. Every column has the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDataset {
    columns: [Vec<String>; 8],
}

impl RawDataset {
    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(header, values)` pairs in [`RAW_COLUMNS`] order.
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, &[String])> + '_ {
        RAW_COLUMNS
            .iter()
            .copied()
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    pub fn column(&self, name: &str) -> Option<&[String]> {
        RAW_COLUMNS
            .iter()
            .position(|c| *c == name)
            .map(|i| self.columns[i].as_slice())
    }

    pub fn row(&self, index: usize) -> Option<RawMatchRow> {
        if index >= self.len() {
            return None;
        }
        let [matchweek, date, home_team, home_xg, score, away_xg, away_team, match_report] =
            std::array::from_fn(|c| self.columns[c][index].clone());
        Some(RawMatchRow {
            matchweek,
            date,
            home_team,
            home_xg,
            score,
            away_xg,
            away_team,
            match_report,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = RawMatchRow> + '_ {
        (0..self.len()).filter_map(|i| self.row(i))
    }

    fn push(&mut self, row: RawMatchRow) {
        let RawMatchRow {
            matchweek,
            date,
            home_team,
            home_xg,
            score,
            away_xg,
            away_team,
            match_report,
        } = row;
        let values = [
            matchweek,
            date,
            home_team,
            home_xg,
            score,
            away_xg,
            away_team,
            match_report,
        ];
        for (col, value) in self.columns.iter_mut().zip(values) {
            col.push(value);
        }
    }

    /// Panics if the columns have drifted apart; that can only be a bug here.
    fn assert_aligned(&self) {
        let len = self.len();
        for (name, values) in self.columns() {
            assert_eq!(
                values.len(),
                len,
                "raw column `{name}` has {} values, expected {len}",
                values.len()
            );
        }
    }
}

impl FromIterator<RawMatchRow> for RawDataset {
    fn from_iter<I: IntoIterator<Item = RawMatchRow>>(iter: I) -> Self {
        assemble(iter)
    }
}

/// Accumulate extracted rows into a [`RawDataset`], preserving order.
pub fn assemble<I: IntoIterator<Item = RawMatchRow>>(rows: I) -> RawDataset {
    let mut ds = RawDataset::default();
    for row in rows {
        ds.push(row);
    }
    ds.assert_aligned();
    ds
}

/// A cleaned, typed fixture. Goals are present iff the match was played.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    pub matchweek: i64,
    pub date: String,
    pub home_team: String,
    pub home_xg: Option<f64>,
    pub away_xg: Option<f64>,
    pub away_team: String,
    pub match_report: String,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
}

impl MatchRecord {
    pub fn is_played(&self) -> bool {
        self.home_goals.is_some() && self.away_goals.is_some()
    }

    pub fn goals(&self) -> Option<(u32, u32)> {
        Some((self.home_goals?, self.away_goals?))
    }
}

/// An ordered set of typed fixtures (the played or the unplayed table).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchTable {
    pub records: Vec<MatchRecord>,
}

impl MatchTable {
    pub fn new(records: Vec<MatchRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a MatchTable {
    type Item = &'a MatchRecord;
    type IntoIter = std::slice::Iter<'a, MatchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
