//! Site-Mirror main entry point
//!
//! This is the command-line interface for the Site-Mirror website mirroring engine.

use anyhow::Context;
use clap::Parser;
use site_mirror::config::{load_config, Config};
use site_mirror::crawler::REPORT_TARGET;
use site_mirror::logging::RunLog;
use site_mirror::{Crawler, RunState, StartParams};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Site-Mirror: a recursive website mirroring tool
///
/// Site-Mirror downloads every resource of a website reachable from its home
/// page into a directory named after the site's host.
#[derive(Parser, Debug)]
#[command(name = "site-mirror")]
#[command(version)]
#[command(about = "Recursively mirrors a website to local storage", long_about = None)]
struct Cli {
    /// Site to mirror; addresses are read from the prompt when omitted
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Replace an existing output directory without asking
    #[arg(long)]
    overwrite: bool,

    /// Retries for failed requests (overrides the configuration)
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

type Prompt = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    let crawler = Crawler::from_config(config)?;
    setup_logging(cli.verbose, cli.quiet, crawler.run_log());

    let mut prompt = BufReader::new(tokio::io::stdin()).lines();

    match cli.url.clone() {
        Some(url) => {
            let state = mirror(&crawler, &cli, url, &mut prompt).await?;
            if state != RunState::Complete {
                anyhow::bail!("Mirroring did not complete: {}", state);
            }
        }
        None => prompt_loop(&crawler, &cli, &mut prompt).await?,
    }

    Ok(())
}

/// Sets up the console and run-log subscribers based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, run_log: RunLog) {
    let console_filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        let level = match verbose {
            0 => "site_mirror=info,warn",
            1 => "site_mirror=debug,info",
            2 => "site_mirror=trace,debug",
            _ => "trace",
        };
        // The full report goes to the run log only
        EnvFilter::new(format!("{},{}=off", level, REPORT_TARGET))
    };

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(console_filter);

    let file = fmt::layer()
        .with_writer(run_log)
        .with_ansi(false)
        .with_target(false)
        .with_filter(EnvFilter::new("site_mirror=debug,warn"));

    tracing_subscriber::registry().with(console).with(file).init();
}

/// Reads site addresses until end of input
async fn prompt_loop(crawler: &Crawler, cli: &Cli, prompt: &mut Prompt) -> anyhow::Result<()> {
    loop {
        print!("Site address: ");
        std::io::stdout().flush()?;

        let Some(line) = prompt.next_line().await? else {
            println!();
            return Ok(());
        };
        let url = line.trim();
        if url.is_empty() {
            continue;
        }

        mirror(crawler, cli, url.to_string(), prompt).await?;
    }
}

/// Mirrors one site, asking before an existing directory is replaced
async fn mirror(
    crawler: &Crawler,
    cli: &Cli,
    url: String,
    prompt: &mut Prompt,
) -> anyhow::Result<RunState> {
    let mut params = StartParams::new(url).replace_output_dir(cli.overwrite);
    if let Some(max_retries) = cli.max_retries {
        params = params.max_retries(max_retries);
    }

    loop {
        crawler.start(params.clone())?;
        let state = watch_progress(crawler).await;
        print_outcome(crawler, state);

        if state == RunState::OutputDirExist
            && !params.replace_output_dir
            && confirm("Overwrite? (y/n): ", prompt).await?
        {
            params = params.replace_output_dir(true);
            continue;
        }
        return Ok(state);
    }
}

/// Prints the in-progress report until the run ends
async fn watch_progress(crawler: &Crawler) -> RunState {
    let interval = Duration::from_millis(crawler.config().report.interval);
    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately
    ticker.tick().await;

    let finished = crawler.wait();
    tokio::pin!(finished);

    loop {
        tokio::select! {
            state = &mut finished => return state,
            _ = ticker.tick() => {
                if crawler.current_state() == RunState::Scanning {
                    println!("{}\n", crawler.snapshot_report(false));
                }
            }
        }
    }
}

fn print_outcome(crawler: &Crawler, state: RunState) {
    match state {
        RunState::Complete => {
            println!("{}", crawler.snapshot_report(false));
            if let Some(dir) = crawler.output_directory() {
                println!("Saved to: {}", dir.display());
            }
        }
        _ if state.is_error() => match crawler.last_error() {
            Some(error) => eprintln!("{}: {}", state, error),
            None => eprintln!("{}", state),
        },
        _ => println!("{}", state),
    }
}

async fn confirm(question: &str, prompt: &mut Prompt) -> anyhow::Result<bool> {
    loop {
        print!("{}", question);
        std::io::stdout().flush()?;

        let Some(answer) = prompt.next_line().await? else {
            return Ok(false);
        };
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => continue,
        }
    }
}
