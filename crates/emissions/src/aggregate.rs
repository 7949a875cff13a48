use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::AggregateError;
use crate::record::{CountryCode, EmissionRecord};

/// Per-country rollup of one input batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRollup {
    country: CountryCode,
    total_emissions: f64,
    record_count: usize,
}

impl CountryRollup {
    pub fn country(&self) -> &CountryCode {
        &self.country
    }

    pub fn total_emissions(&self) -> f64 {
        self.total_emissions
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }
}

/// Rollups keyed by country code, in code order.
pub type Rollups = BTreeMap<CountryCode, CountryRollup>;

/// Reduces a batch to one rollup per distinct country code.
///
/// Totals accumulate in input order so results are reproducible. A record with
/// a negative or non-finite amount fails the whole batch, as does a country
/// total that overflows.
pub fn aggregate<'a, I>(records: I) -> Result<Rollups, AggregateError>
where
    I: IntoIterator<Item = &'a EmissionRecord>,
{
    let mut out = Rollups::new();
    let mut seen = 0usize;
    for (index, record) in records.into_iter().enumerate() {
        seen += 1;
        record
            .check_emissions()
            .map_err(|source| AggregateError::InvalidRecord {
                index,
                country: record.country.to_string(),
                source,
            })?;

        let rollup = out
            .entry(record.country.clone())
            .or_insert_with(|| CountryRollup {
                country: record.country.clone(),
                total_emissions: 0.0,
                record_count: 0,
            });
        rollup.total_emissions += record.emissions;
        rollup.record_count += 1;
        if !rollup.total_emissions.is_finite() {
            return Err(AggregateError::TotalOverflow {
                index,
                country: record.country.to_string(),
            });
        }
    }

    debug!(records = seen, countries = out.len(), "aggregated emission batch");
    Ok(out)
}

/// Sum of `emissions` over a batch; zero when empty.
pub fn total_emissions<'a, I>(records: I) -> f64
where
    I: IntoIterator<Item = &'a EmissionRecord>,
{
    records.into_iter().map(|r| r.emissions).sum()
}
