use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{CommandFactory, Parser};
use serde_json::json;
use simg_thumbs::batch::{run_batch, BatchReport, ItemStatus};
use simg_thumbs::config::ThumbnailConfig;
use simg_thumbs::error_codes::{
    find_coded_error, CodedError, CodedErrorKind, BATCH_FAILURES, MISSING_MODE,
};
use simg_thumbs::event::{EventDescriptor, RawEventFields};
use simg_thumbs::frontmatter::parse_list_value;
use simg_thumbs::image_backend::Credentials;
use simg_thumbs::sink::OutputSink;
use simg_thumbs::thumbnail::{GenerationOutcome, GenerationStrategy, ThumbnailComposer};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "simg-thumbs", version)]
#[command(about = "Generate 1280x720 event thumbnails for the SIMG website")]
struct Cli {
    /// Process every markdown event file.
    #[arg(long, conflicts_with = "title")]
    all: bool,
    /// Extra content language to include with --all (repeatable).
    #[arg(long = "lang", requires = "all")]
    languages: Vec<String>,

    /// Generate a single thumbnail for this title.
    #[arg(long)]
    title: Option<String>,
    #[arg(long, requires = "title")]
    date: Option<String>,
    #[arg(long = "type", requires = "title")]
    event_type: Option<String>,
    /// Comma-separated tag list.
    #[arg(long, requires = "title")]
    tags: Option<String>,
    #[arg(long = "meeting-link", requires = "title")]
    meeting_link: Option<String>,
    #[arg(long, requires = "title")]
    time: Option<String>,
    #[arg(long, requires = "title")]
    location: Option<String>,

    #[arg(long = "events-dir")]
    events_dir: Option<PathBuf>,
    #[arg(long = "output-dir")]
    output_dir: Option<PathBuf>,
    /// YAML settings file.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long = "remote-timeout-seconds", value_parser = clap::value_parser!(u64).range(1..))]
    remote_timeout_seconds: Option<u64>,
    /// Ignore image API credentials and always render locally.
    #[arg(long = "local-only", default_value_t = false)]
    local_only: bool,
    /// Print a machine-readable report on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Exit non-zero when any event in a batch fails.
    #[arg(long, default_value_t = false)]
    strict: bool,
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

enum Mode {
    All,
    Single(RawEventFields),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        git = option_env!("SIMG_THUMBS_GIT_HASH").unwrap_or("unknown"),
        "starting simg-thumbs"
    );

    let json_output = cli.json;
    match run(cli).await {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(error) => process::exit(report_error(&error, json_output)),
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "simg_thumbs=debug"
    } else {
        "simg_thumbs=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Returns the exit code for outcomes that were already reported on stdout.
async fn run(cli: Cli) -> Result<i32> {
    let mode = select_mode(&cli)?;
    let config = load_config(&cli)?;

    let credentials = if cli.local_only {
        None
    } else {
        Credentials::from_env()
    };
    let strategy = GenerationStrategy::from_credentials(
        credentials,
        &config.remote_endpoint,
        config.remote_timeout(),
    )?;
    if !strategy.is_remote() {
        info!("image API credentials not set, using local SVG renderer");
    }
    let composer = ThumbnailComposer::new(strategy, OutputSink::new(&config.output_dir));
    let today = Local::now().date_naive();

    match mode {
        Mode::Single(raw) => {
            let descriptor = EventDescriptor::from_raw(raw, today);
            let outcome = composer.compose(&descriptor).await?;
            print_outcome(&outcome, cli.json)?;
            Ok(0)
        }
        Mode::All => {
            let report = run_batch(&composer, &config.events_dir, &config.languages, today)
                .await
                .context("batch generation failed")?;
            let failed = report.counts().failed;
            let strict_failure = (cli.strict && failed > 0).then(|| {
                CodedError::batch(BATCH_FAILURES, format!("{failed} event(s) failed"))
                    .with_details(json!({ "failed": failed }))
            });
            print_report(&report, cli.json, strict_failure.as_ref())?;
            match strict_failure {
                Some(error) => {
                    eprintln!("error: {}", error.message);
                    Ok(error.exit_code())
                }
                None => Ok(0),
            }
        }
    }
}

fn select_mode(cli: &Cli) -> Result<Mode> {
    if cli.all {
        return Ok(Mode::All);
    }
    let Some(title) = cli.title.clone() else {
        return Err(anyhow!(CodedError::usage(
            MISSING_MODE,
            "pass --all to process every event file or --title <TITLE> for a single event",
        )));
    };
    Ok(Mode::Single(RawEventFields {
        title,
        date: cli.date.clone(),
        event_type: cli.event_type.clone(),
        tags: cli
            .tags
            .as_deref()
            .map(parse_list_value)
            .unwrap_or_default(),
        meeting_link: cli.meeting_link.clone(),
        time: cli.time.clone(),
        location: cli.location.clone(),
    }))
}

fn load_config(cli: &Cli) -> Result<ThumbnailConfig> {
    let mut config = match &cli.config {
        Some(path) => ThumbnailConfig::load(path)?,
        None => ThumbnailConfig::default(),
    };
    config.apply_env();
    if let Some(dir) = &cli.events_dir {
        config.events_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(seconds) = cli.remote_timeout_seconds {
        config.remote_timeout_seconds = seconds;
    }
    config.add_languages(&cli.languages);
    debug!(?config, "resolved configuration");
    Ok(config)
}

fn print_outcome(outcome: &GenerationOutcome, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }
    match outcome {
        GenerationOutcome::Skipped { pinned, .. } => {
            println!("Skipped: {} already exists", pinned.display());
        }
        GenerationOutcome::Written { path, .. } => println!("Wrote {}", path.display()),
    }
    Ok(())
}

fn print_report(
    report: &BatchReport,
    json_output: bool,
    strict_failure: Option<&CodedError>,
) -> Result<()> {
    let counts = report.counts();
    if json_output {
        let mut value = json!({
            "ok": counts.failed == 0,
            "counts": counts,
            "items": report.items,
        });
        // stdout carries exactly one JSON document, strict failure included.
        if let Some(error) = strict_failure {
            value["error"] = serde_json::to_value(error.envelope().error)?;
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for item in &report.items {
        if let ItemStatus::Failed(message) = &item.status {
            eprintln!("failed: {}: {message}", item.file.display());
        }
    }
    println!(
        "Done: {} written, {} skipped, {} without frontmatter, {} failed",
        counts.written, counts.skipped, counts.no_frontmatter, counts.failed
    );
    Ok(())
}

fn report_error(error: &anyhow::Error, json_output: bool) -> i32 {
    let Some(coded) = find_coded_error(error) else {
        if json_output {
            let value = json!({
                "ok": false,
                "error": { "code": "INTERNAL", "message": format!("{error:#}") },
            });
            println!("{value}");
        }
        eprintln!("error: {error:#}");
        return 1;
    };

    if json_output {
        match serde_json::to_string(&coded.envelope()) {
            Ok(envelope) => println!("{envelope}"),
            Err(_) => eprintln!("error: failed to encode error envelope"),
        }
    }
    eprintln!("error: {}", coded.message);
    if coded.kind == CodedErrorKind::Usage {
        eprintln!("{}", Cli::command().render_usage());
    }
    coded.exit_code()
}
