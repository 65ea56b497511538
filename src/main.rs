use anyhow::{bail, Result};
use fixture_scraper::{
    config::{self, Config},
    init_logging, pipeline,
};
use std::time::Instant;
use tracing::{error, info};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    init_logging();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let path = config::config_path(std::env::args().nth(1));
    let config = Config::load(&path)?;
    info!(
        path = %path.display(),
        sources = config.sources.len(),
        "loaded config"
    );

    // ─── 3) run every source ─────────────────────────────────────────
    let start = Instant::now();
    let results = pipeline::run_all(&config);

    let mut failed = Vec::new();
    for (name, result) in &results {
        match result {
            Ok(s) => info!(
                source = %name,
                raw = s.raw_rows,
                played = s.played,
                unplayed = s.unplayed,
                "ok"
            ),
            Err(e) => {
                error!(source = %name, "{:?}", e);
                failed.push(name.as_str());
            }
        }
    }

    info!(elapsed = ?start.elapsed(), "all done");
    if !failed.is_empty() {
        bail!("{} of {} sources failed: {}", failed.len(), results.len(), failed.join(", "));
    }
    Ok(())
}
