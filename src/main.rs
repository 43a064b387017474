//! CLI entry point for `mailtriage`.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Args, CommandFactory, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use mailtriage::config::Config;
use mailtriage::export::{self, ExportFormat};
use mailtriage::ingest::{self, InputFormat, LoadOptions};
use mailtriage::model::email::{EnrichedEmail, RawEmail};
use mailtriage::triage::stats::top_products;
use mailtriage::triage::{enrich_batch_with, TriageOptions, TriageStats};

#[derive(Parser)]
#[command(
    name = "mailtriage",
    version,
    about = "Rule-based triage for support email",
    long_about = "Reads support emails from a CSV export, an MBOX mailbox or .eml files, \
labels each one with sentiment and priority, extracts contacts, product and requirements, \
drafts a reply, and prints the queue urgent-first."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Which records to read and keep; shared by every command that triages.
#[derive(Args)]
struct Selection {
    /// CSV file, MBOX file, .eml file, or directory of .eml files
    path: PathBuf,
    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    input_format: InputFormat,
    /// Read only the last N records
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
    /// Keep emails that do not look support-related
    #[arg(long)]
    all: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Triage emails and print the ranked queue
    Triage {
        #[command(flatten)]
        selection: Selection,
        /// Print contacts, requirements and the draft reply for each email
        #[arg(long)]
        details: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show queue analytics
    Stats {
        #[command(flatten)]
        selection: Selection,
        #[arg(long)]
        json: bool,
    },
    /// Export the ranked queue
    Export {
        #[command(flatten)]
        selection: Selection,
        /// Output format (defaults to the output extension, then the config)
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Show the configuration file path and effective settings
    Config {
        /// Write a default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = mailtriage::config::load_config();

    // Configure logging: stderr + optional log file
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Triage {
            selection,
            details,
            json,
        } => cmd_triage(&selection, details, json, &config),
        Commands::Stats { selection, json } => cmd_stats(&selection, json, &config),
        Commands::Export {
            selection,
            format,
            output,
        } => cmd_export(&selection, format, &output, &config),
        Commands::Config { init } => cmd_config(init, &config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    // Try to set up file logging
    let log_dir = mailtriage::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailtriage.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailtriage", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Load records, showing a progress bar while a mailbox is split.
fn load_records(
    path: &Path,
    format: InputFormat,
    limit: Option<usize>,
    config: &Config,
) -> anyhow::Result<Vec<RawEmail>> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }

    let options = LoadOptions {
        limit: limit.or(config.ingest.max_messages),
        max_message_size: config.ingest.max_message_size,
    };

    if format.resolve(path) != InputFormat::Mbox {
        return Ok(ingest::load(path, format, &options)?);
    }

    let file_size = std::fs::metadata(path)?.len();
    let pb = ProgressBar::new(file_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Reading mailbox [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let records = ingest::load_with_progress(
        path,
        format,
        &options,
        Some(&|current, total| {
            pb.set_length(total);
            pb.set_position(current);
        }),
    );
    pb.finish_and_clear();
    Ok(records?)
}

/// Load the selected records and rank them. Returns the loaded count too.
fn triage_selection(
    selection: &Selection,
    config: &Config,
) -> anyhow::Result<(usize, Vec<EnrichedEmail>)> {
    let records = load_records(
        &selection.path,
        selection.input_format,
        selection.limit,
        config,
    )?;
    let options = TriageOptions {
        support_only: !selection.all,
        ..config.triage_options()
    };
    Ok((records.len(), enrich_batch_with(&records, &options)))
}

/// Triage a file and print the ranked queue.
fn cmd_triage(selection: &Selection, details: bool, json: bool, config: &Config) -> anyhow::Result<()> {
    let (loaded, emails) = triage_selection(selection, config)?;

    if json {
        println!("{}", export::json::to_json(&emails)?);
    } else if details {
        print!("{}", export::text::render_report(&emails));
    } else {
        print_queue_table(&emails, loaded, &config.general.date_format);
    }

    Ok(())
}

/// Show analytics for a file.
fn cmd_stats(selection: &Selection, json: bool, config: &Config) -> anyhow::Result<()> {
    let start = Instant::now();
    let (loaded, emails) = triage_selection(selection, config)?;
    let elapsed = start.elapsed();

    let path = selection.path.as_path();
    let input_size = input_size(path);
    let stats = TriageStats::from_batch(&emails);

    if json {
        print_stats_json(path, input_size, loaded, &stats, &emails, elapsed)?;
    } else {
        print_stats_table(path, input_size, loaded, &stats, &emails, elapsed);
    }

    Ok(())
}

/// Export the ranked queue.
fn cmd_export(
    selection: &Selection,
    format: Option<ExportFormat>,
    output: &Path,
    config: &Config,
) -> anyhow::Result<()> {
    let format = match format.or_else(|| ExportFormat::from_path(output)) {
        Some(format) => format,
        None => ExportFormat::from_name(&config.export.default_format)?,
    };

    let (_, emails) = triage_selection(selection, config)?;

    match format {
        ExportFormat::Csv => export::csv::export_csv(&emails, output, config.export.csv_separator)?,
        ExportFormat::Json => export::json::export_json(&emails, output)?,
        ExportFormat::Txt => export::text::export_text(&emails, output)?,
    }

    println!(
        "  Exported {} email(s) as {:?} to {}",
        emails.len(),
        format,
        output.display()
    );
    Ok(())
}

/// Print the config path and effective settings; optionally write defaults.
fn cmd_config(init: bool, config: &Config) -> anyhow::Result<()> {
    let path = mailtriage::config::config_file_path();

    if init {
        match &path {
            Some(p) if p.exists() => println!("  Config already exists: {}", p.display()),
            _ => {
                mailtriage::config::save_config(&Config::default())?;
                if let Some(p) = &path {
                    println!("  Wrote default config to {}", p.display());
                }
            }
        }
        return Ok(());
    }

    match &path {
        Some(p) => println!("# {}", p.display()),
        None => println!("# (no config directory)"),
    }
    println!("# log file: {}", mailtriage::config::log_file_path(config).display());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

/// File size, or the summed size of the files in a directory.
fn input_size(path: &Path) -> u64 {
    if path.is_dir() {
        std::fs::read_dir(path)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok()?.metadata().ok())
                    .filter(|m| m.is_file())
                    .map(|m| m.len())
                    .sum()
            })
            .unwrap_or(0)
    } else {
        std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
    }
}

fn format_date(email: &EnrichedEmail, date_format: &str) -> String {
    use chrono::format::{Item, StrftimeItems};

    // chrono panics when displaying an invalid format string
    let date_format = if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
        "%Y-%m-%d %H:%M"
    } else {
        date_format
    };

    match email.recency() {
        Some(date) => date.format(date_format).to_string(),
        None => email.raw.date.clone().unwrap_or_else(|| "-".to_string()),
    }
}

/// Print the ranked queue as a human-readable table.
fn print_queue_table(emails: &[EnrichedEmail], loaded: usize, date_format: &str) {
    println!();
    println!(
        "  {} support email(s) of {} loaded, {} urgent",
        emails.len(),
        loaded,
        emails.iter().filter(|e| e.is_urgent()).count()
    );
    println!();

    if emails.is_empty() {
        return;
    }

    println!(
        "  {:<4} {:<10} {:<9} {:<17} {:<25} {:<40} {:<15}",
        "#", "Priority", "Sentiment", "Date", "From", "Subject", "Product"
    );
    println!("  {}", "-".repeat(126));

    for (i, email) in emails.iter().enumerate() {
        let date: String = format_date(email, date_format).chars().take(17).collect();
        let from: String = email.raw.sender.chars().take(24).collect();
        let subject: String = email.raw.subject.chars().take(39).collect();
        let product: String = email.product.chars().take(15).collect();

        println!(
            "  {:<4} {:<10} {:<9} {:<17} {:<25} {:<40} {:<15}",
            i + 1,
            email.priority.as_str(),
            email.sentiment.as_str(),
            date,
            from,
            subject,
            product
        );
    }
    println!();
}

/// Print analytics in a human-readable table.
fn print_stats_table(
    path: &Path,
    input_size: u64,
    loaded: usize,
    stats: &TriageStats,
    emails: &[EnrichedEmail],
    elapsed: Duration,
) {
    use humansize::{format_size, BINARY};

    println!();
    println!("  {:<20} {}", "Input", path.display());
    println!("  {:<20} {}", "Input size", format_size(input_size, BINARY));
    println!("  {:<20} {}", "Records loaded", loaded);
    println!("  {:<20} {}", "Support emails", stats.total);
    println!(
        "  {:<20} {} ({:.1}%)",
        "Urgent",
        stats.urgent,
        percent(stats.urgent, stats.total)
    );
    println!("  {:<20} {}", "Positive", stats.positive);
    println!("  {:<20} {}", "Negative", stats.negative);

    if let Some((min, max)) = stats.date_range {
        println!(
            "  {:<20} {} to {}",
            "Date range",
            min.format("%Y-%m-%d"),
            max.format("%Y-%m-%d")
        );
    }
    if stats.undated > 0 {
        println!("  {:<20} {}", "Undated", stats.undated);
    }
    println!("  {:<20} {:.2?}", "Processing time", elapsed);

    print_distribution("Sentiment", &stats.sentiment_distribution(), stats.total);
    print_distribution("Priority", &stats.priority_distribution(), stats.total);

    let top = top_products(emails, 10);
    if !top.is_empty() {
        println!();
        println!("  Top products:");
        for (product, count) in &top {
            println!("    {count:>6}  {product}");
        }
    }
    println!();
}

fn print_distribution(title: &str, buckets: &[(&str, usize)], total: usize) {
    if buckets.is_empty() {
        return;
    }
    println!();
    println!("  {title}:");
    for (label, count) in buckets {
        println!("    {count:>6}  {label:<12} {:>5.1}%", percent(*count, total));
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Print analytics as JSON.
fn print_stats_json(
    path: &Path,
    input_size: u64,
    loaded: usize,
    stats: &TriageStats,
    emails: &[EnrichedEmail],
    elapsed: Duration,
) -> anyhow::Result<()> {
    let date_range = stats.date_range.map(|(min, max)| {
        serde_json::json!({
            "oldest": min.to_rfc3339(),
            "newest": max.to_rfc3339(),
        })
    });

    let distribution = |buckets: Vec<(&str, usize)>| -> Vec<serde_json::Value> {
        buckets
            .into_iter()
            .map(|(label, count)| serde_json::json!({ "label": label, "count": count }))
            .collect()
    };

    let top_json: Vec<serde_json::Value> = top_products(emails, 10)
        .iter()
        .map(|(product, count)| {
            serde_json::json!({
                "product": product,
                "count": count,
            })
        })
        .collect();

    let output = serde_json::json!({
        "input": path.to_string_lossy(),
        "input_size": input_size,
        "records_loaded": loaded,
        "support_emails": stats.total,
        "urgent": stats.urgent,
        "not_urgent": stats.not_urgent,
        "positive": stats.positive,
        "negative": stats.negative,
        "neutral": stats.neutral,
        "undated": stats.undated,
        "date_range": date_range,
        "sentiment_distribution": distribution(stats.sentiment_distribution()),
        "priority_distribution": distribution(stats.priority_distribution()),
        "top_products": top_json,
        "processing_time_ms": elapsed.as_millis(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_stats_and_export_share_selection_flags() {
        let cli = Cli::try_parse_from(["mailtriage", "stats", "in.mbox", "--limit", "5", "--all"])
            .unwrap();
        let Commands::Stats { selection, .. } = cli.command else {
            panic!("expected stats");
        };
        assert_eq!(selection.limit, Some(5));
        assert!(selection.all);

        let cli = Cli::try_parse_from([
            "mailtriage", "export", "in.csv", "-o", "out.json", "--limit", "2", "--all",
            "--input-format", "csv",
        ])
        .unwrap();
        let Commands::Export { selection, output, .. } = cli.command else {
            panic!("expected export");
        };
        assert_eq!(selection.limit, Some(2));
        assert!(selection.all);
        assert_eq!(selection.input_format, InputFormat::Csv);
        assert_eq!(output, PathBuf::from("out.json"));
    }

    #[test]
    fn test_selection_defaults() {
        let cli = Cli::try_parse_from(["mailtriage", "triage", "inbox"]).unwrap();
        let Commands::Triage { selection, .. } = cli.command else {
            panic!("expected triage");
        };
        assert_eq!(selection.limit, None);
        assert!(!selection.all);
        assert_eq!(selection.input_format, InputFormat::Auto);
    }
}
