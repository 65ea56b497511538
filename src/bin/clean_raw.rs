//! Re-run cleaning on a saved raw table.
//!
//! usage: clean_raw <raw> <played> <unplayed> [separator]

use anyhow::{bail, Context, Result};
use fixture_scraper::{init_logging, store, Cleaner, DEFAULT_SCORE_SEPARATOR};
use std::{env, path::PathBuf};
use tracing::info;

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    if !(3..=4).contains(&args.len()) {
        bail!("usage: clean_raw <raw> <played> <unplayed> [separator]");
    }
    let separator = match args.get(3) {
        Some(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => bail!("separator must be a single character, got {:?}", s),
            }
        }
        None => DEFAULT_SCORE_SEPARATOR,
    };
    let [raw_path, played_path, unplayed_path] =
        [&args[0], &args[1], &args[2]].map(PathBuf::from);

    let raw = store::read_raw(&raw_path)?;
    info!(rows = raw.len(), path = %raw_path.display(), "loaded raw table");

    let out = Cleaner::new(separator)
        .clean(&raw)
        .with_context(|| format!("cleaning {:?}", raw_path))?;
    store::write_matches(&played_path, &out.played)?;
    store::write_matches(&unplayed_path, &out.unplayed)?;

    info!(
        played = out.played.len(),
        unplayed = out.unplayed.len(),
        "done"
    );
    Ok(())
}
