//! One-shot batch submission tool for the agent gateway.
//!
//! Submits a file for batch processing, polls the returned status URL until
//! the job terminates, and prints the result URL. Ctrl+C stops polling and
//! leaves the job running server-side.
//!
//! # Usage
//!
//! ```bash
//! parlance-batch --agent spl queries.csv
//! parlance-batch --url http://gateway.example.com/ --poll-interval 10 sources.csv
//! ```

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use parlance::{Agent, BatchOutcome, DEFAULT_POLL_INTERVAL, Gateway, submit_and_track};

/// Command-line arguments for the parlance-batch tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
struct BatchArgs {
    /// Gateway base URL.
    #[arrrg(optional, "Gateway base URL (default: PARLANCE_URL or local)", "URL")]
    url: Option<String>,

    /// Agent to submit to.
    #[arrrg(optional, "Agent to submit to: doc, spl, or dmgen (default: doc)", "AGENT")]
    agent: Option<String>,

    /// Batch poll interval in seconds.
    #[arrrg(optional, "Seconds between batch status polls (default: 5)", "SECONDS")]
    poll_interval: Option<u64>,
}

/// Main entry point for the parlance-batch tool.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, free) = BatchArgs::from_command_line_relaxed("parlance-batch [OPTIONS] FILE");
    let Some(file) = free.first() else {
        eprintln!("usage: parlance-batch [OPTIONS] FILE");
        std::process::exit(64);
    };

    let agent = match &args.agent {
        Some(selector) => selector.parse::<Agent>()?,
        None => Agent::DocIngestion,
    };
    let poll_interval = args
        .poll_interval
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_POLL_INTERVAL);

    let gateway = Gateway::new(args.url.clone())?;
    let mut tracker = submit_and_track(&gateway, agent, Path::new(file), poll_interval).await?;
    println!("Batch job started for {} (agent: {})", file, agent.name());
    println!("Polling {} every {}s", tracker.status_url(), poll_interval.as_secs());

    // Ctrl+C stops polling; the job itself keeps running server-side.
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    loop {
        if interrupted.load(Ordering::Relaxed) {
            tracker.stop();
            println!("Polling stopped; the job may still complete server-side.");
            std::process::exit(130);
        }
        match tracker.try_outcome() {
            Some(BatchOutcome::Completed { result_url }) => {
                let href = gateway
                    .resolve(&result_url)
                    .map(|url| url.to_string())
                    .unwrap_or(result_url);
                println!("Batch completed: {}", href);
                return Ok(());
            }
            Some(BatchOutcome::Failed { message }) => {
                eprintln!("Batch failed: {}", message);
                std::process::exit(1);
            }
            None => {
                if tracker.is_finished() && tracker.is_stopped() {
                    std::process::exit(130);
                }
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
        }
    }
}
