use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("invalid country code {0:?}: expected two ASCII letters")]
    InvalidCountryCode(String),

    #[error("emissions must be finite and non-negative, got {0}")]
    InvalidEmissions(f64),

    #[error("year {year} outside 1900..={current_year}")]
    YearOutOfRange { year: u16, current_year: u16 },

    #[error("unknown emission type {0:?}")]
    UnknownEmissionType(String),

    #[error("unknown activity sector {0:?}")]
    UnknownActivity(String),

    #[error("unknown ordering field {0:?}")]
    UnknownOrderingField(String),

    #[error("malformed record payload: {0}")]
    Decode(String),
}

/// Aggregation only fails on data that would corrupt the visual encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    #[error("record #{index} ({country}) rejected: {source}")]
    InvalidRecord {
        index: usize,
        country: String,
        #[source]
        source: RecordError,
    },

    #[error("total for {country} overflowed at record #{index}")]
    TotalOverflow { index: usize, country: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("lookup entry {code:?} has out-of-range coordinates ({lat}, {lng})")]
    OutOfRange { code: String, lat: f64, lng: f64 },

    #[error("lookup entry rejected: {0}")]
    InvalidCode(#[from] RecordError),

    #[error("malformed lookup table: {0}")]
    Decode(String),
}
