//! Derived metrics for the landing page document.
//!
//! Two values are derived from the raw document:
//! - the secondary marketplace's aggregate rating and review count, rolled
//!   up from per-SKU ratings when the document does not state them, and
//! - `total_metrics`, the headline KPIs summed across both marketplaces.
//!
//! Nothing here fails. Missing or malformed fields are treated as absent.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::MarketLayout;
use crate::document::{coerce_number, field_number, get_path, get_path_mut, number_value};

/// Headline KPIs summed across marketplaces, in output order.
pub const KPI_KEYS: [&str; 4] = ["orders_total", "orders_delivered", "gmv_rub", "payout_rub"];

/// A per-SKU rating that qualifies for the weighted rollup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkuRating {
    pub rating: f64,
    pub reviews: f64,
}

/// Fields filled in on the secondary section. Each is `Some` only if the
/// document lacked a finite value for it and the rollup had data.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DerivedRating {
    pub rating: Option<f64>,
    pub reviews_total: Option<f64>,
}

impl DerivedRating {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none() && self.reviews_total.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TotalMetrics {
    pub market_note: String,
    pub orders_total: Option<f64>,
    pub orders_delivered: Option<f64>,
    pub gmv_rub: Option<f64>,
    pub payout_rub: Option<f64>,
}

impl TotalMetrics {
    /// Returns the total for one of [`KPI_KEYS`].
    pub fn get(&self, key: &str) -> Option<f64> {
        match key {
            "orders_total" => self.orders_total,
            "orders_delivered" => self.orders_delivered,
            "gmv_rub" => self.gmv_rub,
            "payout_rub" => self.payout_rub,
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: Option<f64>) {
        match key {
            "orders_total" => self.orders_total = value,
            "orders_delivered" => self.orders_delivered = value,
            "gmv_rub" => self.gmv_rub = value,
            "payout_rub" => self.payout_rub = value,
            _ => {}
        }
    }

    /// JSON form attached to the document; absent totals become `null`.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("market_note".into(), Value::String(self.market_note.clone()));
        for key in KPI_KEYS {
            let v = self.get(key).map(number_value).unwrap_or(Value::Null);
            map.insert(key.into(), v);
        }
        Value::Object(map)
    }
}

/// The document after derivation, plus what was derived.
#[derive(Debug, Clone)]
pub struct AugmentedDocument {
    pub document: Value,
    pub derived: DerivedRating,
    pub totals: TotalMetrics,
}

impl AugmentedDocument {
    pub fn into_value(self) -> Value {
        self.document
    }
}

/// Rounds to one decimal place, half away from zero.
///
/// Works on the exact decimal expansion of `x`, so `4.25` gives `4.3` while
/// `1.45` (stored as `1.4499…`) gives `1.4`.
pub fn round1(x: f64) -> f64 {
    Decimal::from_f64_retain(x)
        .map(|d| d.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.checked_mul(Decimal::TEN))
        .and_then(|tenths| tenths.to_i64())
        .map(|tenths| tenths as f64 / 10.0)
        .unwrap_or_else(|| (x * 10.0).round() / 10.0)
}

/// Collects the qualifying entries of `sku_ratings`: both fields finite
/// after coercion and `reviews > 0`. A `null` rating coerces to `0` and
/// still counts. Accepts an object keyed by SKU or a plain list.
pub fn sku_entries(secondary: Option<&Value>) -> Vec<SkuRating> {
    let entries: Vec<&Value> = match secondary.and_then(|s| get_path(s, "sku_ratings")) {
        Some(Value::Object(map)) => map.values().collect(),
        Some(Value::Array(items)) => items.iter().collect(),
        _ => return Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| {
            let rating = entry.get("rating").and_then(coerce_number)?;
            let reviews = entry.get("reviews").and_then(coerce_number)?;
            (reviews > 0.0).then_some(SkuRating { rating, reviews })
        })
        .collect()
}

/// Returns `(total_reviews, weighted_average)` or `None` for an empty list.
pub fn weighted_rating(entries: &[SkuRating]) -> Option<(f64, f64)> {
    if entries.is_empty() {
        return None;
    }
    let total_reviews: f64 = entries.iter().map(|e| e.reviews).sum();
    let weighted: f64 = entries.iter().map(|e| e.rating * e.reviews).sum();
    Some((total_reviews, weighted / total_reviews))
}

/// Rolls up SKU ratings for whichever of `rating` / `reviews_total` the
/// secondary section is missing. Only a JSON number counts as stated, so a
/// string such as `"4.7"` is replaced.
pub fn derive_rating(secondary: Option<&Value>) -> DerivedRating {
    let has_rating = field_number(secondary, "rating").is_some();
    let has_reviews = field_number(secondary, "reviews_total").is_some();
    if has_rating && has_reviews {
        return DerivedRating::default();
    }

    let entries = sku_entries(secondary);
    let Some((total_reviews, average)) = weighted_rating(&entries) else {
        return DerivedRating::default();
    };

    debug!(
        sku_count = entries.len(),
        total_reviews, average, "Rolled up SKU ratings"
    );

    DerivedRating {
        rating: (!has_rating).then(|| round1(average)),
        reviews_total: (!has_reviews).then_some(total_reviews),
    }
}

/// Sums [`KPI_KEYS`] across both sections.
pub fn compute_totals(
    primary: Option<&Value>,
    secondary: Option<&Value>,
    layout: &MarketLayout,
) -> TotalMetrics {
    let has_secondary = KPI_KEYS
        .iter()
        .any(|key| field_number(secondary, key).is_some());

    let mut totals = TotalMetrics {
        market_note: if has_secondary {
            layout.combined_label()
        } else {
            layout.primary_label.clone()
        },
        orders_total: None,
        orders_delivered: None,
        gmv_rub: None,
        payout_rub: None,
    };

    for key in KPI_KEYS {
        let total = match (field_number(primary, key), field_number(secondary, key)) {
            (None, None) => None,
            (p, s) => Some(p.unwrap_or(0.0) + s.unwrap_or(0.0)),
        };
        totals.set(key, total);
    }

    totals
}

/// Fills in the secondary rating fields and attaches `total_metrics`.
///
/// Existing finite values are kept and the primary section is untouched.
/// `total_metrics` is always recomputed from the two sections, so applying
/// this twice gives the same result as applying it once. A document whose
/// root is not an object is returned as is. Section keys may be dotted
/// paths into nested objects.
pub fn compute_derived(mut doc: Value, layout: &MarketLayout) -> AugmentedDocument {
    let derived = derive_rating(get_path(&doc, &layout.secondary_key));

    if !derived.is_empty() {
        if let Some(secondary) =
            get_path_mut(&mut doc, &layout.secondary_key).and_then(Value::as_object_mut)
        {
            if let Some(reviews_total) = derived.reviews_total {
                secondary.insert("reviews_total".into(), number_value(reviews_total));
            }
            if let Some(rating) = derived.rating {
                secondary.insert("rating".into(), number_value(rating));
            }
        }
    }

    let totals = compute_totals(
        get_path(&doc, &layout.primary_key),
        get_path(&doc, &layout.secondary_key),
        layout,
    );
    debug!(market_note = %totals.market_note, "Computed KPI totals");

    if let Some(root) = doc.as_object_mut() {
        root.insert("total_metrics".into(), totals.to_value());
    }

    AugmentedDocument {
        document: doc,
        derived,
        totals,
    }
}

/// Sets the `year` convenience field read by the page footer.
pub fn stamp_year(doc: &mut Value, year: i32) {
    if let Some(root) = doc.as_object_mut() {
        root.insert("year".into(), Value::from(year));
    }
}
