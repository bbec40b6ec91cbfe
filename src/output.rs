//! Output for augmented documents and KPI totals.
//!
//! Supports writing the augmented JSON, logging totals, and CSV append of
//! totals snapshots.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::derived::{AugmentedDocument, TotalMetrics};

/// One row of the KPI history CSV.
#[derive(Debug, Default, Serialize)]
pub struct TotalsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub market_note: String,
    pub orders_total: Option<f64>,
    pub orders_delivered: Option<f64>,
    pub gmv_rub: Option<f64>,
    pub payout_rub: Option<f64>,
    pub secondary_rating: Option<f64>,
    pub secondary_reviews_total: Option<f64>,
}

impl TotalsSnapshot {
    pub fn from_totals(source: &str, totals: &TotalMetrics) -> Self {
        TotalsSnapshot {
            timestamp: Utc::now(),
            source: source.to_string(),
            market_note: totals.market_note.clone(),
            orders_total: totals.orders_total,
            orders_delivered: totals.orders_delivered,
            gmv_rub: totals.gmv_rub,
            payout_rub: totals.payout_rub,
            ..Default::default()
        }
    }

    /// Records the secondary rating as it reads after derivation.
    pub fn with_secondary_rating(mut self, rating: Option<f64>, reviews_total: Option<f64>) -> Self {
        self.secondary_rating = rating;
        self.secondary_reviews_total = reviews_total;
        self
    }
}

/// Writes `doc` as pretty JSON to `path`, or to stdout when `path` is `None`.
pub fn write_document(path: Option<&str>, doc: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(doc)?;
    match path {
        Some(path) => {
            std::fs::write(path, text + "\n").with_context(|| format!("failed to write {path}"))?;
            info!(path, "Augmented document written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}")?;
        }
    }
    Ok(())
}

/// Logs the totals and derived rating of an augmented document.
pub fn log_totals(augmented: &AugmentedDocument) {
    let t = &augmented.totals;
    info!(
        market_note = %t.market_note,
        orders_total = t.orders_total,
        orders_delivered = t.orders_delivered,
        gmv_rub = t.gmv_rub,
        payout_rub = t.payout_rub,
        "KPI totals"
    );

    if augmented.derived.is_empty() {
        debug!("Secondary rating taken from document as is");
    } else {
        info!(
            rating = augmented.derived.rating,
            reviews_total = augmented.derived.reviews_total,
            "Secondary rating derived from SKU ratings"
        );
    }
}

/// Appends a [`TotalsSnapshot`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_snapshot(path: &str, snapshot: &TotalsSnapshot) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV snapshot");

    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("failed to open {path}"))?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(snapshot)?;
    writer.flush()?;

    Ok(())
}
