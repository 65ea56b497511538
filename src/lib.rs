//! Scrape a fixtures / results table and split it into typed played and
//! unplayed datasets.

pub mod clean;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod store;
pub mod strength;

pub use clean::{Cleaner, Partition, DEFAULT_SCORE_SEPARATOR};
pub use dataset::{assemble, MatchRecord, MatchTable, RawDataset, RawMatchRow};
pub use error::{Error, Result};
pub use extract::Extractor;
pub use fetch::{Document, Fetcher};

/// Install the fmt subscriber shared by all binaries. `RUST_LOG` takes
/// precedence; `LOG_LEVEL` adds a directive on top.
pub fn init_logging() {
    use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

    let mut env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Some(directive) = std::env::var("LOG_LEVEL").ok().and_then(|l| l.parse::<Directive>().ok()) {
        env = env.add_directive(directive);
    }
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
}
