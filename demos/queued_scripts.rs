//! # Example: queued_scripts
//!
//! Submits two shell scripts five times each. Runs of the same script are queued
//! behind each other, while the two scripts run side by side. Expect roughly
//! 10 seconds total (5 × 2s for the slower script), not 15.
//!
//! ## Flow
//! ```text
//! submit(bash short.sh) ×5 ──► Worker "bash …/short.sh" ──► 5 × 1s, one at a time
//! submit(bash long.sh)  ×5 ──► Worker "bash …/long.sh"  ──► 5 × 2s, one at a time
//!                                         │
//!                          last worker retired ──► wait_idle() returns
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=keyvisor=debug cargo run --example queued_scripts --features logging
//! ```

use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::Context;
use keyvisor::{CommandAction, Config, Dispatcher, LogWriter};
use tracing_subscriber::EnvFilter;

const SHORT: &str = "#!/bin/bash\n\necho begin >&2\nsleep 1\necho end >&2\n";
const LONG: &str = "#!/bin/bash\n\necho begin >&2\nsleep 2\necho end >&2\n";

/// Removes the scratch directory on every exit path.
struct ScratchDir(PathBuf);

impl ScratchDir {
    fn create() -> anyhow::Result<Self> {
        let dir = std::env::temp_dir().join(format!("keyvisor-demo-{}", std::process::id()));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating scratch dir {}", dir.display()))?;
        Ok(Self(dir))
    }

    fn write(&self, name: &str, body: &str) -> anyhow::Result<PathBuf> {
        let path = self.0.join(name);
        std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keyvisor=info")),
        )
        .init();

    let scratch = ScratchDir::create()?;
    let short = scratch.write("short.sh", SHORT)?;
    let long = scratch.write("long.sh", LONG)?;

    let dispatcher = Dispatcher::builder(Config::default())
        .with_subscriber(Arc::new(LogWriter::new()))
        .build();
    let mut errors = dispatcher
        .take_errors()
        .context("error stream already taken")?;

    let started = Instant::now();
    for script in [&short, &long] {
        for _ in 0..5 {
            let cmd = CommandAction::new("bash").arg(script.display().to_string());
            dispatcher.submit(cmd.into());
        }
    }
    println!("active keys: {:?}", dispatcher.active_keys());

    let generation = dispatcher.wait_idle().await;
    println!(
        "drained (generation {generation}) after {:.1}s",
        started.elapsed().as_secs_f64()
    );

    while let Some(failure) = errors.try_recv() {
        eprintln!("failed: {failure}");
    }
    Ok(())
}
