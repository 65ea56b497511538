// src/clean.rs

use tracing::{debug, info, instrument};

use crate::dataset::{MatchRecord, MatchTable, RawDataset, RawMatchRow};
use crate::error::{Error, Result};

/// Separator between home and away goals on the live page (U+2013 EN DASH).
pub const DEFAULT_SCORE_SEPARATOR: char = '\u{2013}';

/// Cleaner output: every kept row lands in exactly one of the two tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub played: MatchTable,
    pub unplayed: MatchTable,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.played.len() + self.unplayed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Types the raw table and splits it into played / unplayed fixtures.
#[derive(Debug, Clone, Copy)]
pub struct Cleaner {
    separator: char,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(DEFAULT_SCORE_SEPARATOR)
    }
}

impl Cleaner {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Steps, each over the whole table before the next starts:
    /// 1. drop all-blank rows
    /// 2. coerce matchweek and xG
    /// 3. partition on `score`
    /// 4. split scores of played rows into goals
    ///
    /// The first failure aborts; no row is skipped silently. Row numbers in
    /// errors are positions in `raw`.
    #[instrument(level = "debug", skip_all, fields(rows = raw.len()))]
    pub fn clean(&self, raw: &RawDataset) -> Result<Partition> {
        let rows: Vec<(usize, RawMatchRow)> = raw
            .rows()
            .enumerate()
            .filter(|(_, r)| !r.is_blank())
            .collect();
        if rows.len() < raw.len() {
            debug!(dropped = raw.len() - rows.len(), "dropped blank rows");
        }

        let mut typed = Vec::with_capacity(rows.len());
        for (index, row) in &rows {
            typed.push(coerce(*index, row)?);
        }

        let mut played = Vec::new();
        let mut unplayed = Vec::new();
        for ((index, row), record) in rows.iter().zip(typed) {
            if row.score.trim().is_empty() {
                unplayed.push(record);
            } else {
                played.push((*index, row.score.as_str(), record));
            }
        }

        let played = played
            .into_iter()
            .map(|(index, score, mut record)| -> Result<MatchRecord> {
                let (home, away) = self.split_score(score).ok_or_else(|| Error::ScoreFormat {
                    row: index,
                    value: score.to_string(),
                    separator: self.separator,
                })?;
                record.home_goals = Some(home);
                record.away_goals = Some(away);
                Ok(record)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            played = played.len(),
            unplayed = unplayed.len(),
            "cleaned fixtures"
        );
        Ok(Partition {
            played: MatchTable::new(played),
            unplayed: MatchTable::new(unplayed),
        })
    }

    /// `"2–1"` → `(2, 1)`. Exactly two non-negative integer parts, each
    /// trimmed; anything else is `None`.
    pub fn split_score(&self, score: &str) -> Option<(u32, u32)> {
        let mut parts = score.trim().split(self.separator);
        let home = parts.next()?;
        let away = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Some((parse_goals(home)?, parse_goals(away)?))
    }
}

fn parse_goals(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn coerce(index: usize, row: &RawMatchRow) -> Result<MatchRecord> {
    Ok(MatchRecord {
        matchweek: parse_matchweek(index, &row.matchweek)?,
        date: row.date.clone(),
        home_team: row.home_team.clone(),
        home_xg: parse_xg(index, "Home XG", &row.home_xg)?,
        away_xg: parse_xg(index, "Away XG", &row.away_xg)?,
        away_team: row.away_team.clone(),
        match_report: row.match_report.clone(),
        home_goals: None,
        away_goals: None,
    })
}

fn parse_matchweek(row: usize, value: &str) -> Result<i64> {
    value.trim().parse().map_err(|_| Error::TypeCoercion {
        row,
        column: "Matchweek",
        value: value.to_string(),
        target: "integer",
    })
}

/// Blank xG is a missing estimate, not an error.
fn parse_xg(row: usize, column: &'static str, value: &str) -> Result<Option<f64>> {
    let v = value.trim();
    if v.is_empty() {
        return Ok(None);
    }
    v.parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
        .map(Some)
        .ok_or_else(|| Error::TypeCoercion {
            row,
            column,
            value: value.to_string(),
            target: "number",
        })
}
