//! CLI entry point for the landing page metrics tool.
//!
//! Loads the page's `data.json`, derives the secondary marketplace rating and
//! the cross-marketplace KPI totals, and writes the augmented document for
//! the page templates.

use anyhow::Result;
use chrono::{Datelike, Utc};
use clap::{Args, Parser, Subcommand};
use landing_metrics::{
    config::MarketLayout,
    derived::{AugmentedDocument, compute_derived, stamp_year},
    document::field_number,
    fetch::{BasicClient, load_document},
    output::{TotalsSnapshot, append_snapshot, log_totals, write_document},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "landing_metrics")]
#[command(about = "Derives rating and KPI totals for the landing page data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the augmented document for the page templates
    Derive {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL", default_value = "data.json")]
        source: String,

        /// File to write the augmented JSON to (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Do not set the `year` convenience field
        #[arg(long, default_value_t = false)]
        no_year: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },
    /// Log KPI totals and optionally append them to a CSV history
    Totals {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL", default_value = "data.json")]
        source: String,

        /// CSV file to append a totals snapshot to
        #[arg(long)]
        history: Option<String>,

        #[command(flatten)]
        layout: LayoutArgs,
    },
}

/// Overrides for the `LANDING_*` environment layout.
#[derive(Args)]
struct LayoutArgs {
    /// Document key of the primary marketplace section
    #[arg(long)]
    primary_key: Option<String>,

    /// Document key of the secondary marketplace section
    #[arg(long)]
    secondary_key: Option<String>,

    /// Label of the primary marketplace
    #[arg(long)]
    primary_label: Option<String>,

    /// Label of the secondary marketplace
    #[arg(long)]
    secondary_label: Option<String>,
}

impl LayoutArgs {
    fn resolve(self) -> MarketLayout {
        let mut layout = MarketLayout::from_env();
        if let Some(v) = self.primary_key {
            layout.primary_key = v;
        }
        if let Some(v) = self.secondary_key {
            layout.secondary_key = v;
        }
        if let Some(v) = self.primary_label {
            layout.primary_label = v;
        }
        if let Some(v) = self.secondary_label {
            layout.secondary_label = v;
        }
        layout
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/landing_metrics.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("landing_metrics.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Derive {
            source,
            output,
            no_year,
            layout,
        } => {
            let layout = layout.resolve();
            let augmented = augment(&source, &layout).await?;
            log_totals(&augmented);

            let mut doc = augmented.into_value();
            if !no_year {
                stamp_year(&mut doc, Utc::now().year());
            }
            write_document(output.as_deref(), &doc)?;
        }
        Commands::Totals {
            source,
            history,
            layout,
        } => {
            let layout = layout.resolve();
            let augmented = augment(&source, &layout).await?;
            log_totals(&augmented);

            if let Some(history) = history {
                let secondary = augmented.document.get(&layout.secondary_key);
                let snapshot = TotalsSnapshot::from_totals(&source, &augmented.totals)
                    .with_secondary_rating(
                        field_number(secondary, "rating"),
                        field_number(secondary, "reviews_total"),
                    );
                append_snapshot(&history, &snapshot)?;
                info!(history = %history, "Totals snapshot appended");
            }
        }
    }

    Ok(())
}

/// Loads the document at `source` and runs the derivation over it.
#[tracing::instrument(skip(layout))]
async fn augment(source: &str, layout: &MarketLayout) -> Result<AugmentedDocument> {
    let client = BasicClient::new()?;
    let doc = load_document(&client, source).await?;
    Ok(compute_derived(doc, layout))
}
