use std::collections::BTreeMap;

use foundation::math::LatLng;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;
use crate::record::CountryCode;

/// Where a country is drawn, and what it is called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

impl GeoCoordinate {
    pub fn new(lat: f64, lng: f64, name: impl Into<String>) -> Self {
        Self {
            lat,
            lng,
            name: name.into(),
        }
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// Static country-code → coordinate table.
///
/// Unknown codes never fail: they resolve to the origin, named by the code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryLookup {
    entries: BTreeMap<CountryCode, GeoCoordinate>,
}

impl CountryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<I>(entries: I) -> Result<Self, LookupError>
    where
        I: IntoIterator<Item = (CountryCode, GeoCoordinate)>,
    {
        let mut lookup = Self::new();
        for (code, coord) in entries {
            lookup.insert(code, coord)?;
        }
        Ok(lookup)
    }

    /// Parses `{"US": {"lat": .., "lng": .., "name": ..}, ..}`.
    pub fn from_json_str(json: &str) -> Result<Self, LookupError> {
        let raw: BTreeMap<String, GeoCoordinate> =
            serde_json::from_str(json).map_err(|e| LookupError::Decode(e.to_string()))?;
        let mut lookup = Self::new();
        for (code, coord) in raw {
            lookup.insert(CountryCode::parse(&code)?, coord)?;
        }
        Ok(lookup)
    }

    /// Approximate centroids for commonly reported countries.
    pub fn builtin() -> Self {
        let entries = BUILTIN.iter().filter_map(|(code, lat, lng, name)| {
            let code = CountryCode::parse(code).ok()?;
            Some((code, GeoCoordinate::new(*lat, *lng, *name)))
        });
        Self {
            entries: entries.collect(),
        }
    }

    pub fn insert(&mut self, code: CountryCode, coord: GeoCoordinate) -> Result<(), LookupError> {
        if !coord.lat_lng().is_valid() {
            return Err(LookupError::OutOfRange {
                code: code.to_string(),
                lat: coord.lat,
                lng: coord.lng,
            });
        }
        self.entries.insert(code, coord);
        Ok(())
    }

    pub fn get(&self, code: &CountryCode) -> Option<&GeoCoordinate> {
        self.entries.get(code)
    }

    pub fn resolve(&self, code: &CountryCode) -> GeoCoordinate {
        self.entries
            .get(code)
            .cloned()
            .unwrap_or_else(|| GeoCoordinate::new(0.0, 0.0, code.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const BUILTIN: &[(&str, f64, f64, &str)] = &[
    ("AE", 23.4, 53.8, "United Arab Emirates"),
    ("AR", -38.4, -63.6, "Argentina"),
    ("AT", 47.5, 14.6, "Austria"),
    ("AU", -25.3, 133.8, "Australia"),
    ("BD", 23.7, 90.4, "Bangladesh"),
    ("BE", 50.5, 4.5, "Belgium"),
    ("BR", -14.2, -51.9, "Brazil"),
    ("CA", 56.1, -106.3, "Canada"),
    ("CH", 46.8, 8.2, "Switzerland"),
    ("CL", -35.7, -71.5, "Chile"),
    ("CN", 35.9, 104.2, "China"),
    ("CO", 4.6, -74.3, "Colombia"),
    ("CZ", 49.8, 15.5, "Czechia"),
    ("DE", 51.2, 10.5, "Germany"),
    ("DK", 56.3, 9.5, "Denmark"),
    ("DZ", 28.0, 1.7, "Algeria"),
    ("EG", 26.8, 30.8, "Egypt"),
    ("ES", 40.5, -3.7, "Spain"),
    ("ET", 9.1, 40.5, "Ethiopia"),
    ("FI", 61.9, 25.7, "Finland"),
    ("FR", 46.2, 2.2, "France"),
    ("GB", 55.4, -3.4, "United Kingdom"),
    ("GR", 39.1, 21.8, "Greece"),
    ("HU", 47.2, 19.5, "Hungary"),
    ("ID", -0.8, 113.9, "Indonesia"),
    ("IE", 53.4, -8.2, "Ireland"),
    ("IL", 31.0, 34.9, "Israel"),
    ("IN", 20.6, 79.0, "India"),
    ("IQ", 33.2, 43.7, "Iraq"),
    ("IR", 32.4, 53.7, "Iran"),
    ("IT", 41.9, 12.6, "Italy"),
    ("JP", 36.2, 138.3, "Japan"),
    ("KE", 0.0, 37.9, "Kenya"),
    ("KR", 35.9, 127.8, "South Korea"),
    ("KZ", 48.0, 66.9, "Kazakhstan"),
    ("MA", 31.8, -7.1, "Morocco"),
    ("MX", 23.6, -102.6, "Mexico"),
    ("MY", 4.2, 102.0, "Malaysia"),
    ("NG", 9.1, 8.7, "Nigeria"),
    ("NL", 52.1, 5.3, "Netherlands"),
    ("NO", 60.5, 8.5, "Norway"),
    ("NZ", -40.9, 174.9, "New Zealand"),
    ("PE", -9.2, -75.0, "Peru"),
    ("PH", 12.9, 121.8, "Philippines"),
    ("PK", 30.4, 69.3, "Pakistan"),
    ("PL", 51.9, 19.1, "Poland"),
    ("PT", 39.4, -8.2, "Portugal"),
    ("QA", 25.4, 51.2, "Qatar"),
    ("RO", 45.9, 25.0, "Romania"),
    ("RU", 61.5, 105.3, "Russia"),
    ("SA", 23.9, 45.1, "Saudi Arabia"),
    ("SE", 60.1, 18.6, "Sweden"),
    ("SG", 1.4, 103.8, "Singapore"),
    ("TH", 15.9, 101.0, "Thailand"),
    ("TR", 39.0, 35.2, "Turkey"),
    ("TW", 23.7, 121.0, "Taiwan"),
    ("UA", 48.4, 31.2, "Ukraine"),
    ("US", 37.1, -95.7, "United States"),
    ("UZ", 41.4, 64.6, "Uzbekistan"),
    ("VE", 6.4, -66.6, "Venezuela"),
    ("VN", 14.1, 108.3, "Vietnam"),
    ("ZA", -30.6, 22.9, "South Africa"),
];
