use anyhow::Result;
use bm25_cli::{build_engine, render, Args};
use clap::Parser;
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let args = Args::parse();
    let engine = build_engine(&args)?;

    let query = args.query_text();
    let start = Instant::now();
    let hits = engine.search(&query);
    let took_s = start.elapsed().as_secs_f64();
    tracing::info!(query = %query, hits = hits.len(), took_s, "query complete");

    print!("{}", render(&query, &hits, took_s, args.format)?);
    Ok(())
}
