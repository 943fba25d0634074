use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use url::Url;
use webmirror_engine::{Mirror, MirrorJob, MirrorSummary};

const QUIT: &str = "q";

pub fn print_banner() {
    println!("{}", "═".repeat(60).bright_blue().bold());
    println!("{}", "  WEBMIRROR".bright_white().bold());
    println!("{}", "  mirror a website into a browsable local tree".dimmed());
    println!("{}", "═".repeat(60).bright_blue().bold());
}

/// Validate one seed token. Only http(s) seeds are accepted; anything
/// else is reported and skipped by the caller.
pub fn parse_seed_token(token: &str) -> Result<Url, String> {
    if !token.starts_with("http://") && !token.starts_with("https://") {
        return Err(format!("not an http(s) URL: '{}'", token));
    }
    Url::parse(token).map_err(|e| format!("invalid URL '{}': {}", token, e))
}

/// Directory name for one mirrored site: the URL-encoded seed, giving
/// the `<directory>/<urlencoded-seed>/<local paths>` output layout.
pub fn seed_directory_name(seed: &Url) -> String {
    url::form_urlencoded::byte_serialize(seed.as_str().as_bytes()).collect()
}

/// Assemble a MirrorJob from the parsed CLI flags for one seed URL.
pub fn build_job(args: &ArgMatches, base_dir: &Path, seed: Url) -> MirrorJob {
    let root = base_dir.join(seed_directory_name(&seed));
    let mut job = MirrorJob::new(root, seed)
        .with_retry_count(*args.get_one::<usize>("retries").unwrap())
        .with_workers(*args.get_one::<usize>("threads").unwrap())
        .with_fallback_charset(args.get_one::<String>("charset").unwrap())
        .with_hyperlinks(!args.get_flag("no-hyperlinks"))
        .with_images(!args.get_flag("no-images"))
        .with_multimedia(!args.get_flag("no-multimedia"));
    if let Some(agent) = args.get_one::<String>("user-agent") {
        job = job.with_user_agent(agent);
    }
    job
}

/// Human-readable report for one finished job.
pub fn generate_mirror_report(summary: &MirrorSummary) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Seed: {}\n", summary.seed));
    report.push_str(&format!(
        "  Finished: {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    report.push_str(&format!("  Pages mirrored: {}\n", summary.pages_mirrored()));
    report.push_str(&format!("  Resources stored: {}\n", summary.resources_stored));
    report.push_str(&format!("  Resources reused: {}\n", summary.resources_reused));
    report.push_str(&format!("  Resources failed: {}\n", summary.resources_failed));
    report.push_str(&format!(
        "  Cross-origin skipped: {}\n",
        summary.cross_origin_skipped
    ));
    report.push_str(&format!("  Output: {}\n", summary.root.display()));

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Pages:\n");
    for page in &summary.pages {
        report.push_str(&format!(
            "  {} -> {} ({} rewritten, {} failed)\n",
            page.url, page.local_path, page.references_rewritten, page.references_failed
        ));
    }

    report
}

/// Run one mirror job with a progress spinner and print its report.
async fn run_job(job: MirrorJob, output: Option<&PathBuf>, quiet: bool) -> Result<()> {
    let spinner = if quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting mirror...");
        Some(pb)
    };

    let mut mirror = Mirror::new(job);
    if let Some(pb) = spinner.clone() {
        let downloads = Arc::new(AtomicUsize::new(0));
        mirror = mirror.with_progress_callback(Arc::new(move |url: String| {
            let count = downloads.fetch_add(1, Ordering::Relaxed) + 1;
            pb.set_message(format!("{} downloads, fetching {}", count, url));
            pb.tick();
        }));
    }

    let result = mirror.run().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let summary = result.context("mirror failed")?;
    println!("{} Mirror complete!\n", "✓".green().bold());
    print!("{}", generate_mirror_report(&summary));

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&summary).context("failed to serialize summary")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        println!("\nJSON summary written to {}", path.display());
    }

    Ok(())
}

pub async fn handle_mirror(args: &ArgMatches, quiet: bool) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let directory = args.get_one::<String>("directory").unwrap();
    let expanded = shellexpand::tilde(directory);
    let base_dir = PathBuf::from(expanded.as_ref());
    let output = args.get_one::<PathBuf>("output");

    if let Some(url) = args.get_one::<Url>("url") {
        if !matches!(url.scheme(), "http" | "https") {
            eprintln!("{} not an http(s) URL: '{}'", "✗".red().bold(), url);
            std::process::exit(1);
        }
        let job = build_job(args, &base_dir, url.clone());
        if let Err(e) = run_job(job, output, quiet).await {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(1);
        }
    } else {
        run_interactive(args, &base_dir, output, quiet).await;
    }
}

/// Read whitespace-delimited seed URLs from stdin until the quit
/// sentinel or end of stream. A failed job is reported and the loop
/// moves on; closed or interrupted input ends the session cleanly.
async fn run_interactive(args: &ArgMatches, base_dir: &Path, output: Option<&PathBuf>, quiet: bool) {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    'outer: loop {
        println!(
            "{}",
            format!("Enter a website to mirror ('{}' to quit):", QUIT).bright_cyan()
        );
        let Some(Ok(line)) = lines.next() else {
            break;
        };
        for token in line.split_whitespace() {
            if token == QUIT {
                println!("'{}' received, exiting", QUIT);
                break 'outer;
            }
            match parse_seed_token(token) {
                Ok(seed) => {
                    let job = build_job(args, base_dir, seed);
                    if let Err(e) = run_job(job, output, quiet).await {
                        eprintln!("{} {:#}", "✗".red().bold(), e);
                    }
                }
                Err(message) => eprintln!("{} {}", "✗".red().bold(), message),
            }
        }
    }
}
