// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! lockstep - decentralized mutual exclusion simulator
//!
//! Runs N peer processes against one shared counter using Lamport clocks,
//! per-sender causal delivery, and request/ack/release coordination, then
//! verifies that the counter equals the configured write total.

use anyhow::Result;
use clap::Parser;
use lockstep_engine::{SimConfig, Simulation};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "lockstep",
    version,
    about = "Decentralized mutual exclusion over Lamport clocks"
)]
struct Cli {
    /// Number of peer processes (default 3)
    #[arg(long, short = 'n')]
    processes: Option<u32>,

    /// Resource writes per process (default 1)
    #[arg(long, short = 'w')]
    writes: Option<u32>,

    /// Milliseconds the exclusive section holds the resource (default 20)
    #[arg(long)]
    hold_ms: Option<u64>,

    /// Upper bound in milliseconds on random think time before each
    /// request (default 0: deterministic)
    #[arg(long)]
    jitter_ms: Option<u64>,

    /// Load settings from a TOML file; flags override file values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print events matching a pattern ("access:*", "**") as JSON lines
    #[arg(long, value_name = "PATTERN")]
    trace_events: Option<String>,

    /// Fail unless the final counter equals this value (defaults to the
    /// write total implied by the configuration)
    #[arg(long)]
    expect: Option<u64>,
}

impl Cli {
    fn into_config(self) -> Result<(SimConfig, Option<String>, Option<u64>)> {
        let mut config = match &self.config {
            Some(path) => SimConfig::from_toml_file(path)?,
            None => SimConfig::default(),
        };
        if let Some(processes) = self.processes {
            config.processes = processes;
        }
        if let Some(writes) = self.writes {
            config.writes = writes;
        }
        if let Some(hold_ms) = self.hold_ms {
            config.hold = Duration::from_millis(hold_ms);
        }
        if let Some(jitter_ms) = self.jitter_ms {
            config.jitter = Duration::from_millis(jitter_ms);
        }
        Ok((config, self.trace_events, self.expect))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    let (config, trace_events, expect) = Cli::parse().into_config()?;
    let simulation = Simulation::new(config)?;

    // the printer drains until every publisher is gone, so awaiting it
    // after the run flushes all traced events before the summary
    let printer = trace_events.as_deref().map(|pattern| {
        let mut events = simulation.bus().subscribe("cli", &[pattern]);
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(error) => tracing::warn!(%error, "unprintable event"),
                }
            }
        })
    });

    let report = simulation.run().await?;
    if let Some(printer) = printer {
        printer.await?;
    }

    println!("final count: {}", report.final_count);
    println!("expected:    {}", report.expected);
    for (id, grants) in &report.grants {
        println!("  process {id}: {grants} grants");
    }

    let expected = expect.unwrap_or(report.expected);
    if report.final_count != expected {
        anyhow::bail!(
            "counter mismatch: got {}, expected {}",
            report.final_count,
            expected
        );
    }
    if report.peak_occupancy > 1 {
        anyhow::bail!(
            "exclusion violated: peak occupancy {}",
            report.peak_occupancy
        );
    }
    Ok(())
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
