// src/pipeline.rs

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{path::Path, time::Instant};
use tracing::{error, info, instrument};

use crate::{
    clean::{Cleaner, Partition},
    config::{Config, SourceConfig},
    dataset::{assemble, RawDataset},
    extract::Extractor,
    fetch::{Document, Fetcher},
    store,
    strength::{team_strength, Venue},
};

/// Row counts of one finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub source: String,
    pub raw_rows: usize,
    pub played: usize,
    pub unplayed: usize,
}

/// Extract → assemble → clean over an already fetched page.
pub fn process_document(
    document: &Document,
    extractor: &Extractor,
    cleaner: &Cleaner,
) -> crate::error::Result<(RawDataset, Partition)> {
    let raw = assemble(extractor.extract(document)?);
    let partition = cleaner.clean(&raw)?;
    Ok((raw, partition))
}

/// One full run for a source: fetch, extract, assemble, persist raw, clean,
/// persist played / unplayed, and optionally the strength tables.
#[instrument(level = "info", skip_all, fields(source = %source.name))]
pub fn run_source(source: &SourceConfig, config: &Config) -> Result<RunSummary> {
    let start = Instant::now();

    // ─── 1) fetch ───────────────────────────────────────────────────
    let fetcher = Fetcher::new(config.fetch.timeout(), config.fetch.user_agent.as_deref())
        .context("building http client")?;
    let document = fetcher
        .fetch(&source.url)
        .with_context(|| format!("fetching {}", source.url))?;

    // ─── 2) extract + assemble → raw table ──────────────────────────
    let raw = assemble(
        Extractor::new()
            .extract(&document)
            .context("extracting fixture table")?,
    );
    store::write_raw(&source.raw_data_path, &raw)?;
    info!(rows = raw.len(), path = %source.raw_data_path.display(), "saved raw table");

    // ─── 3) clean → played / unplayed ───────────────────────────────
    let partition = Cleaner::new(config.clean.score_separator)
        .clean(&raw)
        .context("cleaning raw table")?;
    store::write_matches(&source.played_path, &partition.played)?;
    store::write_matches(&source.unplayed_path, &partition.unplayed)?;

    // ─── 4) optional strength tables ────────────────────────────────
    if let Some(dir) = &source.strength_dir {
        write_strength_tables(dir, &partition)?;
    }

    info!(
        played = partition.played.len(),
        unplayed = partition.unplayed.len(),
        elapsed = ?start.elapsed(),
        "run complete"
    );
    Ok(RunSummary {
        source: source.name.clone(),
        raw_rows: raw.len(),
        played: partition.played.len(),
        unplayed: partition.unplayed.len(),
    })
}

/// Writes `home_strength.csv` and `away_strength.csv` under `dir`.
pub fn write_strength_tables(dir: &Path, partition: &Partition) -> Result<()> {
    for venue in [Venue::Home, Venue::Away] {
        let table = team_strength(&partition.played, venue);
        let path = dir.join(format!("{venue}_strength.csv"));
        store::write_strength(&path, &table)?;
        info!(%venue, teams = table.len(), path = %path.display(), "saved strength table");
    }
    Ok(())
}

/// Run every configured source independently in parallel. Failures are
/// logged per source and returned alongside the successes.
pub fn run_all(config: &Config) -> Vec<(String, Result<RunSummary>)> {
    config
        .sources
        .par_iter()
        .map(|source| {
            let result = run_source(source, config);
            if let Err(e) = &result {
                error!(source = %source.name, "run failed: {:#}", e);
            }
            (source.name.clone(), result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use url::Url;

    const PAGE: &str = r#"<html><body><table class="stats_table">
<thead><tr><th data-stat="gameweek">Wk</th><th data-stat="date">Date</th><th data-stat="home_team">Home</th>
<th data-stat="home_xg">xG</th><th data-stat="score">Score</th><th data-stat="away_xg">xG</th>
<th data-stat="away_team">Away</th><th data-stat="match_report">Match Report</th></tr></thead>
<tbody>
<tr><th data-stat="gameweek">3</th><td data-stat="date">2024-08-31</td><td data-stat="home_team">Arsenal</td>
<td data-stat="home_xg">1.2</td><td data-stat="score">1–1</td><td data-stat="away_xg">0.7</td>
<td data-stat="away_team">Brighton</td><td data-stat="match_report"><a href="/en/matches/a1">Match Report</a></td></tr>
<tr><th data-stat="gameweek"></th><td data-stat="date"></td><td data-stat="home_team">Brentford</td>
<td data-stat="home_xg">2.0</td><td data-stat="score">2–1</td><td data-stat="away_xg">1.1</td>
<td data-stat="away_team">Southampton</td><td data-stat="match_report"><a href="/en/matches/a2">Match Report</a></td></tr>
<tr><th data-stat="gameweek"></th><td data-stat="date">2024-09-01</td><td data-stat="home_team">Man Utd</td>
<td data-stat="home_xg">1.3</td><td data-stat="score">0–3</td><td data-stat="away_xg">2.8</td>
<td data-stat="away_team">Liverpool</td><td data-stat="match_report"><a href="/en/matches/a3">Match Report</a></td></tr>
<tr><th data-stat="gameweek">4</th><td data-stat="date">2024-09-14</td><td data-stat="home_team">Chelsea</td>
<td data-stat="home_xg"></td><td data-stat="score"></td><td data-stat="away_xg"></td>
<td data-stat="away_team">Bournemouth</td><td data-stat="match_report"></td></tr>
</tbody></table></body></html>"#;

    fn document(body: &str) -> Document {
        Document::new(Url::parse("https://example.com/schedule").unwrap(), body)
    }

    fn process(body: &str) -> crate::error::Result<(RawDataset, Partition)> {
        process_document(&document(body), &Extractor::new(), &Cleaner::default())
    }

    #[test]
    fn carried_matchweeks_become_integers() {
        let (raw, out) = process(PAGE).unwrap();
        assert_eq!(raw.column("Matchweek").unwrap(), ["3", "3", "3", "4"]);
        let weeks: Vec<i64> = out
            .played
            .iter()
            .chain(out.unplayed.iter())
            .map(|r| r.matchweek)
            .collect();
        assert_eq!(weeks, [3, 3, 3, 4]);
    }

    #[test]
    fn page_splits_into_played_and_unplayed() {
        let (raw, out) = process(PAGE).unwrap();
        assert_eq!(out.played.len() + out.unplayed.len(), raw.len());
        assert_eq!(out.played.len(), 3);

        let goals: Vec<_> = out.played.iter().filter_map(|r| r.goals()).collect();
        assert_eq!(goals, [(1, 1), (2, 1), (0, 3)]);
        assert_eq!(out.played.records[1].date, "2024-08-31");
        assert_eq!(out.played.records[2].match_report, "/en/matches/a3");

        let pending = &out.unplayed.records[0];
        assert_eq!(pending.home_team, "Chelsea");
        assert_eq!((pending.home_xg, pending.goals()), (None, None));
    }

    #[test]
    fn empty_markup_row_does_not_become_a_fixture() {
        let empty = r#"<tr><th data-stat="gameweek"></th><td data-stat="date"></td><td data-stat="home_team"></td>
<td data-stat="home_xg"></td><td data-stat="score"></td><td data-stat="away_xg"></td>
<td data-stat="away_team"></td><td data-stat="match_report"></td></tr>"#;
        let page = PAGE.replace("</tbody>", &format!("{empty}</tbody>"));
        let (raw, out) = process(&page).unwrap();
        assert_eq!(raw.len(), 4);
        assert_eq!(out.unplayed.len(), 1);
        assert!(out
            .played
            .iter()
            .chain(out.unplayed.iter())
            .all(|r| !r.home_team.is_empty() && !r.away_team.is_empty()));
    }

    #[test]
    fn missing_table_produces_nothing() {
        assert!(matches!(
            process("<html><body>maintenance</body></html>"),
            Err(Error::TableNotFound)
        ));
    }

    #[test]
    fn run_source_reports_invalid_url_without_writing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let yaml = format!(
            "sources:\n  - name: broken\n    url: not-a-url\n    raw_data_path: {d}/raw.csv\n    played_path: {d}/played.csv\n    unplayed_path: {d}/unplayed.csv\n",
            d = dir.path().display()
        );
        let config = Config::from_yaml(&yaml)?;

        let results = run_all(&config);
        assert_eq!(results.len(), 1);
        let err = results[0].1.as_ref().unwrap_err();
        assert!(
            matches!(err.downcast_ref::<Error>(), Some(Error::InvalidUrl { .. })),
            "{err:#}"
        );
        assert!(!dir.path().join("raw.csv").exists());
        Ok(())
    }

    #[test]
    fn strength_tables_land_in_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (_, out) = process(PAGE)?;
        write_strength_tables(dir.path(), &out)?;

        let home = std::fs::read_to_string(dir.path().join("home_strength.csv"))?;
        assert!(home.lines().any(|l| l == "Brentford,1,2.0,1.0,1"), "{home}");
        let away = std::fs::read_to_string(dir.path().join("away_strength.csv"))?;
        assert!(away.lines().any(|l| l == "Liverpool,1,3.0,0.0,1"), "{away}");
        Ok(())
    }
}
