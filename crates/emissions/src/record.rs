use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RecordError;
use crate::format::format_thousands;

/// Earliest year accepted by the emissions API.
pub const MIN_YEAR: u16 = 1900;

/// ISO 3166-1 alpha-2 country code, normalised to uppercase.
///
/// Parsing is case-insensitive and trims surrounding whitespace, so `" us"`
/// and `"US"` name the same country.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        let trimmed = raw.trim();
        if trimmed.len() != 2 || !trimmed.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(RecordError::InvalidCountryCode(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CountryCode {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CountryCode {
    type Error = RecordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

/// Greenhouse gas classes (IPCC classification).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EmissionType {
    #[serde(rename = "CO2")]
    Co2,
    #[serde(rename = "CH4")]
    Ch4,
    #[serde(rename = "N2O")]
    N2o,
    #[serde(rename = "F_GASES")]
    FGases,
}

impl EmissionType {
    pub const ALL: [EmissionType; 4] = [Self::Co2, Self::Ch4, Self::N2o, Self::FGases];

    pub fn code(self) -> &'static str {
        match self {
            Self::Co2 => "CO2",
            Self::Ch4 => "CH4",
            Self::N2o => "N2O",
            Self::FGases => "F_GASES",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Co2 => "Carbon Dioxide",
            Self::Ch4 => "Methane",
            Self::N2o => "Nitrous Oxide",
            Self::FGases => "Fluorinated Gases",
        }
    }
}

impl FromStr for EmissionType {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RecordError::UnknownEmissionType(s.to_string()))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivitySector {
    Energy,
    Transport,
    Industry,
    Agriculture,
    Waste,
    Residential,
    Commercial,
    AirTravel,
    Maritime,
    Other,
}

impl ActivitySector {
    pub const ALL: [ActivitySector; 10] = [
        Self::Energy,
        Self::Transport,
        Self::Industry,
        Self::Agriculture,
        Self::Waste,
        Self::Residential,
        Self::Commercial,
        Self::AirTravel,
        Self::Maritime,
        Self::Other,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Energy => "ENERGY",
            Self::Transport => "TRANSPORT",
            Self::Industry => "INDUSTRY",
            Self::Agriculture => "AGRICULTURE",
            Self::Waste => "WASTE",
            Self::Residential => "RESIDENTIAL",
            Self::Commercial => "COMMERCIAL",
            Self::AirTravel => "AIR_TRAVEL",
            Self::Maritime => "MARITIME",
            Self::Other => "OTHER",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Energy => "Energy Production",
            Self::Transport => "Transportation",
            Self::Industry => "Industrial Processes",
            Self::Agriculture => "Agriculture",
            Self::Waste => "Waste Management",
            Self::Residential => "Residential",
            Self::Commercial => "Commercial",
            Self::AirTravel => "Air Travel",
            Self::Maritime => "Maritime Transport",
            Self::Other => "Other",
        }
    }
}

impl FromStr for ActivitySector {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RecordError::UnknownActivity(s.to_string()))
    }
}

/// One emission row as served by the emissions API.
///
/// Owned by the data layer; the globe only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub year: u16,
    /// Metric tons. The API serialises decimals as strings.
    #[serde(deserialize_with = "decimal_or_number")]
    pub emissions: f64,
    pub emission_type: EmissionType,
    pub country: CountryCode,
    pub activity: ActivitySector,
}

impl EmissionRecord {
    pub fn new(
        country: CountryCode,
        emissions: f64,
        year: u16,
        emission_type: EmissionType,
        activity: ActivitySector,
    ) -> Self {
        Self {
            id: None,
            year,
            emissions,
            emission_type,
            country,
            activity,
        }
    }

    pub fn emissions_in_kilotons(&self) -> f64 {
        self.emissions / 1000.0
    }

    pub fn emissions_in_megatons(&self) -> f64 {
        self.emissions / 1_000_000.0
    }

    /// Checks the amount alone; this is what aggregation depends on.
    pub fn check_emissions(&self) -> Result<(), RecordError> {
        if !self.emissions.is_finite() || self.emissions < 0.0 {
            return Err(RecordError::InvalidEmissions(self.emissions));
        }
        Ok(())
    }

    /// Full field validation, mirroring the API's model validators.
    ///
    /// `current_year` is supplied by the caller to keep this deterministic.
    pub fn validate(&self, current_year: u16) -> Result<(), RecordError> {
        self.check_emissions()?;
        if self.year < MIN_YEAR || self.year > current_year {
            return Err(RecordError::YearOutOfRange {
                year: self.year,
                current_year,
            });
        }
        Ok(())
    }
}

/// `US - Carbon Dioxide (2020): 1,000.50 MT`
impl fmt::Display for EmissionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} ({}): {} MT",
            self.country,
            self.emission_type.display_name(),
            self.year,
            format_thousands(self.emissions)
        )
    }
}

fn decimal_or_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("emissions {s:?}: {e}"))),
    }
}

/// A page of the paginated list endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecordPage {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<EmissionRecord>,
}

/// Decodes either a list page (`{count, results, ..}`) or a bare JSON array.
pub fn decode_records(json: &str) -> Result<Vec<EmissionRecord>, RecordError> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Payload {
        Page(RecordPage),
        List(Vec<EmissionRecord>),
    }

    let payload: Payload =
        serde_json::from_str(json).map_err(|e| RecordError::Decode(e.to_string()))?;
    Ok(match payload {
        Payload::Page(page) => page.results,
        Payload::List(records) => records,
    })
}
