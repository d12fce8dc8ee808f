use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use metaforensics_core::{
    compare_dates, normalize_str, AnalysisPolicy, Analyzer, MetaValue, MetadataRecord, Severity,
    Status, DEFAULT_TOLERANCE_SECS,
};
use metaforensics_runtime::{BatchReport, FileAnalysis, ForensicRuntime, NamedRecord, RuntimeConfig};

#[derive(Parser, Debug)]
#[command(
    name = "metaforensics",
    version,
    about = "Detect tampering, backdating and stripping in extracted file metadata"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one metadata record (a JSON object)
    Analyze {
        file: PathBuf,

        #[command(flatten)]
        run: RunArgs,

        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Analyze several metadata records
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        run: RunArgs,

        /// Records analyzed at once
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Normalize a date value the way the checks see it
    NormalizeDate { value: String },

    /// Compare two date values
    CompareDates {
        first: String,

        second: String,

        /// Allowed difference in seconds
        #[arg(long, default_value_t = DEFAULT_TOLERANCE_SECS)]
        tolerance: u64,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Analysis policy (YAML or JSON)
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Runtime configuration (YAML or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Judge future dates against this instant instead of the current time
    #[arg(long)]
    now: Option<String>,

    /// Wall-clock budget per record, e.g. "10s" or "500ms"
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

struct Style {
    bold: &'static str,
    dim: &'static str,
    red: &'static str,
    green: &'static str,
    yellow: &'static str,
    reset: &'static str,
}

const COLOR: Style = Style {
    bold: "\x1b[1m",
    dim: "\x1b[2m",
    red: "\x1b[31m",
    green: "\x1b[32m",
    yellow: "\x1b[33m",
    reset: "\x1b[0m",
};

const PLAIN: Style = Style {
    bold: "",
    dim: "",
    red: "",
    green: "",
    yellow: "",
    reset: "",
};

fn style() -> &'static Style {
    if std::env::var_os("NO_COLOR").is_some() {
        &PLAIN
    } else {
        &COLOR
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let res = match cli.cmd {
        Commands::Analyze { file, run, format } => run_analyze(&file, &run, format).await,
        Commands::Batch {
            files,
            run,
            concurrency,
        } => run_batch(&files, &run, concurrency).await,
        Commands::NormalizeDate { value } => run_normalize(&value),
        Commands::CompareDates {
            first,
            second,
            tolerance,
        } => run_compare(&first, &second, tolerance),
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let s = style();
            eprintln!(
                "{}{red}error:{reset} {:#}",
                s.bold,
                e,
                red = s.red,
                reset = s.reset
            );
            ExitCode::from(1)
        }
    }
}

fn build_runtime(run: &RunArgs, concurrency: Option<usize>) -> anyhow::Result<ForensicRuntime> {
    let policy = match &run.policy {
        Some(path) => AnalysisPolicy::from_file(path)
            .with_context(|| format!("failed to load policy {}", path.display()))?,
        None => AnalysisPolicy::default(),
    };

    let mut config = match &run.config {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("failed to load runtime config {}", path.display()))?,
        None => RuntimeConfig::default(),
    };

    if let Some(timeout) = run.timeout {
        if timeout.is_zero() {
            return Err(anyhow!("--timeout must be greater than zero"));
        }
        config.analysis_timeout = timeout;
    }
    if let Some(raw) = &run.now {
        config.frozen_now = Some(parse_now(raw)?);
    }
    if let Some(n) = concurrency {
        if n == 0 {
            return Err(anyhow!("--concurrency must be at least 1"));
        }
        config.max_concurrency = n;
    }

    Ok(ForensicRuntime::with_analyzer(Analyzer::new(policy), config))
}

fn parse_now(raw: &str) -> anyhow::Result<NaiveDateTime> {
    normalize_str(raw).ok_or_else(|| anyhow!("--now: unparseable date '{}'", raw))
}

fn load_record(path: &Path) -> anyhow::Result<NamedRecord> {
    let record = MetadataRecord::from_json_file(path)
        .with_context(|| format!("failed to read metadata record {}", path.display()))?;

    let filename = record
        .text("filename")
        .map(str::to_string)
        .or_else(|| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| path.display().to_string());

    Ok(NamedRecord::new(filename, record))
}

async fn run_analyze(file: &Path, run: &RunArgs, format: OutputFormat) -> anyhow::Result<()> {
    let runtime = build_runtime(run, None)?;
    let named = load_record(file)?;

    let report = runtime.analyze(named.record.clone()).await;
    let analysis = FileAnalysis::new(named.filename, &named.record, report);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
        OutputFormat::Text => print_text(&analysis),
    }

    Ok(())
}

async fn run_batch(
    files: &[PathBuf],
    run: &RunArgs,
    concurrency: Option<usize>,
) -> anyhow::Result<()> {
    let runtime = build_runtime(run, concurrency)?;

    let mut batch = BatchReport::new();
    let mut records = Vec::with_capacity(files.len());

    for path in files {
        match load_record(path) {
            Ok(named) => records.push(named),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable record");
                batch.record_failure(path.display().to_string(), format!("{:#}", e));
            }
        }
    }

    runtime.extend_batch(&mut batch, records).await;

    println!("{}", serde_json::to_string_pretty(&batch)?);
    Ok(())
}

fn run_normalize(value: &str) -> anyhow::Result<()> {
    match normalize_str(value) {
        Some(dt) => println!("{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        None => println!("unparseable"),
    }
    Ok(())
}

fn run_compare(first: &str, second: &str, tolerance: u64) -> anyhow::Result<()> {
    let first = MetaValue::from(first);
    let second = MetaValue::from(second);
    let comparison = compare_dates(Some(&first), Some(&second), tolerance);

    println!("{}", serde_json::to_string_pretty(&comparison)?);
    Ok(())
}

fn status_color(status: Status) -> &'static str {
    let s = style();
    match status {
        Status::Clean => s.green,
        Status::Caution => s.yellow,
        Status::Suspicious | Status::Error => s.red,
    }
}

fn severity_color(sev: Severity) -> &'static str {
    let s = style();
    match sev {
        Severity::High => s.red,
        Severity::Medium => s.yellow,
        Severity::Low | Severity::Unrecognized => s.dim,
    }
}

fn print_text(analysis: &FileAnalysis) {
    let s = style();
    let report = &analysis.forensic_flags;
    let status = report.summary.status;

    println!(
        "\n  {bold}{}{reset}  {dim}{}{reset}\n",
        analysis.filename,
        analysis.file_type,
        bold = s.bold,
        dim = s.dim,
        reset = s.reset,
    );
    println!(
        "  {dim}status      {reset}{bold}{color}{}{reset}",
        status.to_string().to_uppercase(),
        dim = s.dim,
        bold = s.bold,
        color = status_color(status),
        reset = s.reset,
    );
    println!(
        "  {dim}risk_score  {reset}{bold}{}{reset}",
        report.risk_score,
        dim = s.dim,
        bold = s.bold,
        reset = s.reset,
    );
    let b = report.severity_breakdown;
    println!(
        "  {dim}flags       {reset}{} {dim}(high {}, medium {}, low {}){reset}",
        report.total_flags,
        b.high,
        b.medium,
        b.low,
        dim = s.dim,
        reset = s.reset,
    );

    if !report.flags.is_empty() {
        println!();
    }
    for flag in &report.flags {
        println!(
            "  {color}{:<7}{reset} {:<20} {}",
            flag.severity.to_string().to_uppercase(),
            flag.flag.as_str(),
            flag.message,
            color = severity_color(flag.severity),
            reset = s.reset,
        );
    }

    for (key, value) in &analysis.errors {
        println!(
            "  {yellow}extraction error{reset} {}: {}",
            key,
            value,
            yellow = s.yellow,
            reset = s.reset,
        );
    }

    println!("\n  {dim}{}{reset}\n", report.summary.message, dim = s.dim, reset = s.reset);
}
