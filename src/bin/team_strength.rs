//! Home and away strength tables from a saved played table.
//!
//! usage: team_strength <played> <out_dir>

use anyhow::{bail, Result};
use fixture_scraper::{init_logging, pipeline, store, Partition};
use std::{env, path::PathBuf};
use tracing::info;

fn main() -> Result<()> {
    init_logging();

    let mut args = env::args().skip(1);
    let (Some(played_path), Some(out_dir), None) = (args.next(), args.next(), args.next()) else {
        bail!("usage: team_strength <played> <out_dir>");
    };
    let played_path = PathBuf::from(played_path);
    let out_dir = PathBuf::from(out_dir);

    let played = store::read_matches(&played_path)?;
    info!(matches = played.len(), path = %played_path.display(), "loaded played table");

    let partition = Partition {
        played,
        ..Default::default()
    };
    pipeline::write_strength_tables(&out_dir, &partition)?;
    info!(dir = %out_dir.display(), "wrote strength tables");
    Ok(())
}
