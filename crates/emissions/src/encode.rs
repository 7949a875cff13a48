use foundation::math::StableF64;
use serde::Serialize;
use tracing::debug;

use crate::aggregate::Rollups;
use crate::format::format_thousands;
use crate::lookup::CountryLookup;
use crate::record::CountryCode;

pub const MIN_POINT_SIZE: f64 = 0.05;
pub const MAX_POINT_SIZE: f64 = 0.35;

/// Four-band step palette over the normalised total.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBand {
    /// `[0, 0.25)`
    Green,
    /// `[0.25, 0.5)`
    Yellow,
    /// `[0.5, 0.75)`
    Orange,
    /// `[0.75, 1.0]`
    Red,
}

impl ColorBand {
    pub fn for_normalized(normalized: f64) -> Self {
        if normalized < 0.25 {
            Self::Green
        } else if normalized < 0.5 {
            Self::Yellow
        } else if normalized < 0.75 {
            Self::Orange
        } else {
            Self::Red
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Self::Green => "#4caf50",
            Self::Yellow => "#ffeb3b",
            Self::Orange => "#ff9800",
            Self::Red => "#f44336",
        }
    }

    /// Linear RGB in `[0, 1]`, for vertex colours.
    pub fn rgb(self) -> [f32; 3] {
        match self {
            Self::Green => [0.298, 0.686, 0.314],
            Self::Yellow => [1.0, 0.922, 0.231],
            Self::Orange => [1.0, 0.596, 0.0],
            Self::Red => [0.957, 0.263, 0.212],
        }
    }
}

/// `total / max`, guarded so an all-zero batch maps to 0 instead of NaN.
pub fn normalize(total: f64, max_total: f64) -> f64 {
    if max_total <= 0.0 || !max_total.is_finite() {
        return 0.0;
    }
    (total / max_total).clamp(0.0, 1.0)
}

pub fn point_size(normalized: f64) -> f64 {
    (MIN_POINT_SIZE + normalized * 0.3).clamp(MIN_POINT_SIZE, MAX_POINT_SIZE)
}

/// One drawable country marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPoint {
    pub country: CountryCode,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub total_emissions: f64,
    pub record_count: usize,
    pub normalized: f64,
    pub size: f64,
    pub color: ColorBand,
    pub label_markup: String,
}

pub fn label_markup(name: &str, code: &CountryCode, total: f64, record_count: usize) -> String {
    let noun = if record_count == 1 { "record" } else { "records" };
    format!(
        "<b>{name}</b> ({code})<br/>Total: {} t<br/>{record_count} {noun}",
        format_thousands(total)
    )
}

/// Projects rollups into render points, one per country, in country-code order.
///
/// The whole set is rebuilt per call; an empty batch yields no points.
pub fn encode(rollups: &Rollups, lookup: &CountryLookup) -> Vec<RenderPoint> {
    let Some(max_total) = rollups
        .values()
        .map(|r| StableF64(r.total_emissions()))
        .max()
        .map(|m| m.0)
    else {
        return Vec::new();
    };

    let points: Vec<RenderPoint> = rollups
        .values()
        .map(|rollup| {
            let coord = lookup.resolve(rollup.country());
            let normalized = normalize(rollup.total_emissions(), max_total);
            RenderPoint {
                country: rollup.country().clone(),
                label_markup: label_markup(
                    &coord.name,
                    rollup.country(),
                    rollup.total_emissions(),
                    rollup.record_count(),
                ),
                name: coord.name,
                lat: coord.lat,
                lng: coord.lng,
                total_emissions: rollup.total_emissions(),
                record_count: rollup.record_count(),
                normalized,
                size: point_size(normalized),
                color: ColorBand::for_normalized(normalized),
            }
        })
        .collect();

    debug!(points = points.len(), max_total, "encoded render points");
    points
}
