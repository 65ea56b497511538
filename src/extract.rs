// src/extract.rs

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument, trace};

use crate::dataset::RawMatchRow;
use crate::error::{Error, Result};
use crate::fetch::Document;

// `data-stat` keys of the cells we read.
pub const DATA_STAT_GAMEWEEK: &str = "gameweek";
pub const DATA_STAT_DATE: &str = "date";
pub const DATA_STAT_HOME_TEAM: &str = "home_team";
pub const DATA_STAT_HOME_XG: &str = "home_xg";
pub const DATA_STAT_SCORE: &str = "score";
pub const DATA_STAT_AWAY_XG: &str = "away_xg";
pub const DATA_STAT_AWAY_TEAM: &str = "away_team";
pub const DATA_STAT_MATCH_REPORT: &str = "match_report";

/// A required cell: its field name (for errors) and compiled selector.
struct Cell {
    field: &'static str,
    selector: Selector,
}

impl Cell {
    fn td(field: &'static str) -> Self {
        Self {
            field,
            selector: stat_selector("td", field),
        }
    }
}

fn stat_selector(tag: &str, stat: &str) -> Selector {
    Selector::parse(&format!(r#"{tag}[data-stat="{stat}"]"#))
        .expect("data-stat selector should parse")
}

/// Pulls fixture rows out of the first `<table>` of a page.
///
/// Selectors are compiled once per instance; extraction state (the
/// carry-forward values) lives only inside a single [`Extractor::extract`] call.
pub struct Extractor {
    table: Selector,
    row: Selector,
    link: Selector,
    gameweek: Selector,
    date: Selector,
    home_team: Cell,
    home_xg: Cell,
    score: Cell,
    away_xg: Cell,
    away_team: Cell,
    match_report: Cell,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            table: Selector::parse("table").expect("table selector should parse"),
            row: Selector::parse("tr").expect("row selector should parse"),
            link: Selector::parse("a[href]").expect("link selector should parse"),
            gameweek: stat_selector("th", DATA_STAT_GAMEWEEK),
            date: stat_selector("td", DATA_STAT_DATE),
            home_team: Cell::td(DATA_STAT_HOME_TEAM),
            home_xg: Cell::td(DATA_STAT_HOME_XG),
            score: Cell::td(DATA_STAT_SCORE),
            away_xg: Cell::td(DATA_STAT_AWAY_XG),
            away_team: Cell::td(DATA_STAT_AWAY_TEAM),
            match_report: Cell::td(DATA_STAT_MATCH_REPORT),
        }
    }

    #[instrument(level = "debug", skip_all, fields(url = %document.url()))]
    pub fn extract(&self, document: &Document) -> Result<Vec<RawMatchRow>> {
        self.extract_html(document.body())
    }

    /// Extract rows from raw HTML. All-or-nothing: the first bad row aborts.
    pub fn extract_html(&self, html: &str) -> Result<Vec<RawMatchRow>> {
        let doc = Html::parse_document(html);
        let table = doc.select(&self.table).next().ok_or(Error::TableNotFound)?;
        debug!("found table");

        let mut last_matchweek = String::new();
        let mut last_date = String::new();
        let mut rows = Vec::new();

        // first <tr> is the header
        for tr in table.select(&self.row).skip(1) {
            if is_layout_row(&tr) {
                trace!("skipping layout row");
                continue;
            }
            let index = rows.len();
            let required = |cell: &Cell| {
                tr.select(&cell.selector).next().ok_or(Error::Parse {
                    row: index,
                    field: cell.field,
                })
            };

            let matchweek = self.optional_text(&tr, &self.gameweek);
            let date = self.optional_text(&tr, &self.date);
            let home_team = cell_text(required(&self.home_team)?);
            let home_xg = cell_text(required(&self.home_xg)?);
            let score = cell_text(required(&self.score)?);
            let away_xg = cell_text(required(&self.away_xg)?);
            let away_team = cell_text(required(&self.away_team)?);
            let match_report = required(&self.match_report)?
                .select(&self.link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| href.trim().to_string())
                .unwrap_or_default();

            let row = RawMatchRow {
                matchweek,
                date,
                home_team,
                home_xg,
                score,
                away_xg,
                away_team,
                match_report,
            };
            // judged before carry-forward fills the grouping cells
            if row.is_blank() {
                trace!("skipping blank row");
                continue;
            }
            for (value, cell) in [(&row.home_team, &self.home_team), (&row.away_team, &self.away_team)] {
                if value.is_empty() {
                    return Err(Error::BlankField {
                        row: index,
                        field: cell.field,
                    });
                }
            }

            let row = RawMatchRow {
                matchweek: carry_forward(&mut last_matchweek, row.matchweek),
                date: carry_forward(&mut last_date, row.date),
                ..row
            };
            trace!(
                row = index,
                matchweek = %row.matchweek,
                home_team = %row.home_team,
                away_team = %row.away_team,
                score = %row.score,
                "row"
            );
            rows.push(row);
        }

        info!(rows = rows.len(), "extracted fixture rows");
        Ok(rows)
    }

    fn optional_text(&self, tr: &ElementRef<'_>, selector: &Selector) -> String {
        tr.select(selector).next().map(cell_text).unwrap_or_default()
    }
}

/// Blank values inherit the last non-blank one seen in this pass.
fn carry_forward(last: &mut String, read: String) -> String {
    if read.is_empty() {
        last.clone()
    } else {
        *last = read.clone();
        read
    }
}

fn cell_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Repeated in-body header rows and spacer rows carry no fixture.
fn is_layout_row(tr: &ElementRef<'_>) -> bool {
    tr.value()
        .classes()
        .any(|c| c == "thead" || c == "spacer")
}
