// src/store.rs

use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, ArrayRef, Float64Array, Int64Array, StringArray},
    csv::{ReaderBuilder, WriterBuilder},
    datatypes::{DataType, Field, Schema, SchemaRef},
    record_batch::RecordBatch,
};
use parquet::{
    arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter},
    basic::Compression,
    file::properties::WriterProperties,
};
use std::{
    fs::{self, File},
    path::Path,
    sync::Arc,
};
use tracing::{debug, info};

use crate::dataset::{assemble, MatchRecord, MatchTable, RawDataset, RawMatchRow, MATCH_COLUMNS, RAW_COLUMNS};
use crate::strength::{TeamStrength, STRENGTH_COLUMNS};

/// Every raw column is a string.
pub fn raw_schema() -> SchemaRef {
    Arc::new(Schema::new(
        RAW_COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ))
}

/// Played / unplayed layout. Only `Matchweek` is non-nullable.
pub fn match_schema() -> SchemaRef {
    let types = [
        DataType::Int64,
        DataType::Utf8,
        DataType::Utf8,
        DataType::Float64,
        DataType::Float64,
        DataType::Utf8,
        DataType::Utf8,
        DataType::Int64,
        DataType::Int64,
    ];
    Arc::new(Schema::new(
        MATCH_COLUMNS
            .iter()
            .zip(types)
            .map(|(name, ty)| Field::new(*name, ty, *name != "Matchweek"))
            .collect::<Vec<_>>(),
    ))
}

pub fn strength_schema() -> SchemaRef {
    let types = [
        DataType::Utf8,
        DataType::Int64,
        DataType::Float64,
        DataType::Float64,
        DataType::Int64,
    ];
    Arc::new(Schema::new(
        STRENGTH_COLUMNS
            .iter()
            .zip(types)
            .map(|(name, ty)| Field::new(*name, ty, false))
            .collect::<Vec<_>>(),
    ))
}

pub fn raw_to_batch(ds: &RawDataset) -> Result<RecordBatch> {
    let cols: Vec<ArrayRef> = ds
        .columns()
        .map(|(_, values)| Arc::new(StringArray::from_iter_values(values)) as ArrayRef)
        .collect();
    RecordBatch::try_new(raw_schema(), cols).context("building raw record batch")
}

pub fn matches_to_batch(table: &MatchTable) -> Result<RecordBatch> {
    let recs = &table.records;
    let strings = |f: fn(&MatchRecord) -> &str| {
        Arc::new(StringArray::from_iter_values(recs.iter().map(f))) as ArrayRef
    };
    let floats = |f: fn(&MatchRecord) -> Option<f64>| {
        Arc::new(recs.iter().map(f).collect::<Float64Array>()) as ArrayRef
    };
    let goals = |f: fn(&MatchRecord) -> Option<u32>| {
        Arc::new(
            recs.iter()
                .map(|r| f(r).map(i64::from))
                .collect::<Int64Array>(),
        ) as ArrayRef
    };

    let cols = vec![
        Arc::new(Int64Array::from_iter_values(recs.iter().map(|r| r.matchweek))) as ArrayRef,
        strings(|r| r.date.as_str()),
        strings(|r| r.home_team.as_str()),
        floats(|r| r.home_xg),
        floats(|r| r.away_xg),
        strings(|r| r.away_team.as_str()),
        strings(|r| r.match_report.as_str()),
        goals(|r| r.home_goals),
        goals(|r| r.away_goals),
    ];
    RecordBatch::try_new(match_schema(), cols).context("building match record batch")
}

pub fn strength_to_batch(rows: &[TeamStrength]) -> Result<RecordBatch> {
    let cols: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|s| &s.team))) as ArrayRef,
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|s| s.matches as i64))) as ArrayRef,
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|s| s.goals_scored))) as ArrayRef,
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|s| s.goals_conceded))) as ArrayRef,
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|s| s.wins as i64))) as ArrayRef,
    ];
    RecordBatch::try_new(strength_schema(), cols).context("building strength record batch")
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("missing column `{}`", name))?
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| anyhow!("column `{}` has unexpected type", name))
}

fn str_at(arr: &StringArray, i: usize) -> &str {
    if arr.is_null(i) {
        ""
    } else {
        arr.value(i)
    }
}

fn opt_at<T: arrow::datatypes::ArrowPrimitiveType>(
    arr: &arrow::array::PrimitiveArray<T>,
    i: usize,
) -> Option<T::Native> {
    (!arr.is_null(i)).then(|| arr.value(i))
}

/// Rebuild a raw table. Null cells become blank strings.
pub fn raw_from_batches(batches: &[RecordBatch]) -> Result<RawDataset> {
    let mut rows = Vec::new();
    for batch in batches {
        let cols = RAW_COLUMNS
            .iter()
            .map(|name| column::<StringArray>(batch, name))
            .collect::<Result<Vec<_>>>()?;
        for i in 0..batch.num_rows() {
            let fields: [&str; 8] = std::array::from_fn(|c| str_at(cols[c], i));
            rows.push(RawMatchRow::from_fields(fields));
        }
    }
    Ok(assemble(rows))
}

pub fn matches_from_batches(batches: &[RecordBatch]) -> Result<MatchTable> {
    let mut records = Vec::new();
    for batch in batches {
        let matchweek = column::<Int64Array>(batch, "Matchweek")?;
        let date = column::<StringArray>(batch, "Date")?;
        let home_team = column::<StringArray>(batch, "Home Team")?;
        let home_xg = column::<Float64Array>(batch, "Home XG")?;
        let away_xg = column::<Float64Array>(batch, "Away XG")?;
        let away_team = column::<StringArray>(batch, "Away Team")?;
        let report = column::<StringArray>(batch, "Match Report")?;
        let home_goals = column::<Int64Array>(batch, "Home Goals")?;
        let away_goals = column::<Int64Array>(batch, "Away Goals")?;

        let goals = |arr: &Int64Array, i: usize| -> Result<Option<u32>> {
            opt_at(arr, i)
                .map(|g| u32::try_from(g).with_context(|| format!("row {}: negative goal count {}", i, g)))
                .transpose()
        };

        for i in 0..batch.num_rows() {
            records.push(MatchRecord {
                matchweek: matchweek
                    .is_valid(i)
                    .then(|| matchweek.value(i))
                    .with_context(|| format!("row {}: missing matchweek", i))?,
                date: str_at(date, i).to_string(),
                home_team: str_at(home_team, i).to_string(),
                home_xg: opt_at(home_xg, i),
                away_xg: opt_at(away_xg, i),
                away_team: str_at(away_team, i).to_string(),
                match_report: str_at(report, i).to_string(),
                home_goals: goals(home_goals, i)?,
                away_goals: goals(away_goals, i)?,
            });
        }
    }
    Ok(MatchTable::new(records))
}

fn is_parquet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"))
}

/// Write `batch` to `path`: Parquet (Snappy) for `.parquet`, CSV with a
/// header row otherwise. Parent directories are created.
pub fn write_table(path: &Path, batch: &RecordBatch) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;

    if is_parquet(path) {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
            .context("creating Arrow writer")?;
        writer.write(batch).context("writing parquet batch")?;
        writer.close().context("closing parquet writer")?;
    } else {
        let mut writer = WriterBuilder::new().with_header(true).build(file);
        writer
            .write(batch)
            .with_context(|| format!("writing csv {:?}", path))?;
    }

    info!(path = %path.display(), rows = batch.num_rows(), "wrote table");
    Ok(())
}

/// Read a table written by [`write_table`]. `schema` drives CSV parsing;
/// Parquet files carry their own.
pub fn read_table(path: &Path, schema: SchemaRef) -> Result<Vec<RecordBatch>> {
    let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
    let decoded = if is_parquet(path) {
        ParquetRecordBatchReaderBuilder::try_new(file)
            .with_context(|| format!("reading parquet metadata {:?}", path))?
            .build()?
            .collect::<Result<Vec<_>, _>>()
    } else {
        ReaderBuilder::new(schema)
            .with_header(true)
            .build(file)
            .with_context(|| format!("opening csv reader {:?}", path))?
            .collect::<Result<Vec<_>, _>>()
    };
    let batches = decoded.with_context(|| format!("decoding {:?}", path))?;

    debug!(path = %path.display(), batches = batches.len(), "read table");
    Ok(batches)
}

pub fn write_raw(path: &Path, ds: &RawDataset) -> Result<()> {
    write_table(path, &raw_to_batch(ds)?)
}

pub fn write_matches(path: &Path, table: &MatchTable) -> Result<()> {
    write_table(path, &matches_to_batch(table)?)
}

pub fn write_strength(path: &Path, rows: &[TeamStrength]) -> Result<()> {
    write_table(path, &strength_to_batch(rows)?)
}

pub fn read_raw(path: &Path) -> Result<RawDataset> {
    raw_from_batches(&read_table(path, raw_schema())?)
}

pub fn read_matches(path: &Path) -> Result<MatchTable> {
    matches_from_batches(&read_table(path, match_schema())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::Cleaner;
    use tempfile::tempdir;

    fn raw() -> RawDataset {
        assemble(vec![
            RawMatchRow::from_fields(["1", "2024-08-16", "Man Utd", "2.4", "1–0", "0.4", "Fulham", "/en/matches/1"]),
            RawMatchRow::from_fields(["1", "2024-08-17", "Ipswich", "", "", "", "Liverpool", ""]),
        ])
    }

    #[test]
    fn match_batch_has_no_score_column() -> Result<()> {
        let out = Cleaner::default().clean(&raw())?;
        for table in [&out.played, &out.unplayed] {
            let batch = matches_to_batch(table)?;
            let names: Vec<_> = batch.schema().fields().iter().map(|f| f.name().clone()).collect();
            assert_eq!(names, MATCH_COLUMNS);
            assert!(batch.column_by_name("Score").is_none());
        }
        Ok(())
    }

    #[test]
    fn unplayed_goals_are_null_in_batch() -> Result<()> {
        let out = Cleaner::default().clean(&raw())?;
        let batch = matches_to_batch(&out.unplayed)?;
        let goals = column::<Int64Array>(&batch, "Home Goals")?;
        assert_eq!(goals.null_count(), 1);
        let xg = column::<Float64Array>(&batch, "Away XG")?;
        assert!(xg.is_null(0));
        Ok(())
    }

    #[test]
    fn raw_csv_round_trip_keeps_blanks_and_en_dash() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/raw.csv");
        write_raw(&path, &raw())?;

        let text = fs::read_to_string(&path)?;
        assert!(text.starts_with("Matchweek,Date,Home Team,Home XG,Score,Away XG,Away Team,Match Report"));
        assert!(text.contains("1–0"));

        assert_eq!(read_raw(&path)?, raw());
        Ok(())
    }

    #[test]
    fn played_tables_round_trip_as_csv_and_parquet() -> Result<()> {
        let dir = tempdir()?;
        let out = Cleaner::default().clean(&raw())?;
        for name in ["played.csv", "played.parquet"] {
            let path = dir.path().join(name);
            write_matches(&path, &out.played)?;
            assert_eq!(read_matches(&path)?, out.played, "{name}");
        }
        let path = dir.path().join("unplayed.parquet");
        write_matches(&path, &out.unplayed)?;
        assert_eq!(read_matches(&path)?, out.unplayed);
        Ok(())
    }

    #[test]
    fn strength_table_is_written_with_header() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("home.csv");
        let rows = vec![TeamStrength {
            team: "Arsenal".into(),
            matches: 2,
            goals_scored: 1.5,
            goals_conceded: 0.5,
            wins: 1,
        }];
        write_strength(&path, &rows)?;
        let text = fs::read_to_string(&path)?;
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Team,Matches,Goals Scored,Goals Conceded,Wins"));
        assert_eq!(lines.next(), Some("Arsenal,2,1.5,0.5,1"));
        Ok(())
    }

    #[test]
    fn reading_wrong_layout_fails() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("raw.parquet");
        write_raw(&path, &raw())?;
        assert!(read_matches(&path).is_err());
        Ok(())
    }
}
