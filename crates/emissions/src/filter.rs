use std::cmp::Ordering;

use foundation::math::stable_total_cmp_f64;

use crate::error::RecordError;
use crate::record::{ActivitySector, CountryCode, EmissionRecord, EmissionType};

/// Client-side equivalent of the list endpoint's filter set.
///
/// Every populated field narrows the batch; an empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub year: Option<u16>,
    pub year_gte: Option<u16>,
    pub year_lte: Option<u16>,
    pub country: Option<CountryCode>,
    pub countries: Vec<CountryCode>,
    pub emission_types: Vec<EmissionType>,
    pub activities: Vec<ActivitySector>,
    pub emissions_gte: Option<f64>,
    pub emissions_lte: Option<f64>,
    /// Case-insensitive substring over the country code and the activity.
    pub search: Option<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records from the last `years` years, counted back from `current_year`.
    pub fn recent(years: u16, current_year: u16) -> Self {
        Self {
            year_gte: Some(current_year.saturating_sub(years)),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, record: &EmissionRecord) -> bool {
        if self.year.is_some_and(|y| record.year != y) {
            return false;
        }
        if self.year_gte.is_some_and(|y| record.year < y) {
            return false;
        }
        if self.year_lte.is_some_and(|y| record.year > y) {
            return false;
        }
        if self.country.as_ref().is_some_and(|c| record.country != *c) {
            return false;
        }
        if !self.countries.is_empty() && !self.countries.contains(&record.country) {
            return false;
        }
        if !self.emission_types.is_empty() && !self.emission_types.contains(&record.emission_type) {
            return false;
        }
        if !self.activities.is_empty() && !self.activities.contains(&record.activity) {
            return false;
        }
        if self.emissions_gte.is_some_and(|v| record.emissions < v) {
            return false;
        }
        if self.emissions_lte.is_some_and(|v| record.emissions > v) {
            return false;
        }
        if let Some(term) = self.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            if !search_hit(record, &term.to_ascii_lowercase()) {
                return false;
            }
        }
        true
    }

    /// Order-preserving filter over a batch.
    pub fn apply<'a>(&self, records: &'a [EmissionRecord]) -> Vec<&'a EmissionRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    pub fn apply_owned(&self, records: &[EmissionRecord]) -> Vec<EmissionRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

fn search_hit(record: &EmissionRecord, needle: &str) -> bool {
    [
        record.country.as_str(),
        record.activity.code(),
        record.activity.display_name(),
    ]
    .iter()
    .any(|hay| hay.to_ascii_lowercase().contains(needle))
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OrderField {
    Year,
    Emissions,
    Country,
    EmissionType,
    Activity,
}

impl OrderField {
    fn compare(self, a: &EmissionRecord, b: &EmissionRecord) -> Ordering {
        match self {
            Self::Year => a.year.cmp(&b.year),
            Self::Emissions => stable_total_cmp_f64(a.emissions, b.emissions),
            Self::Country => a.country.as_str().cmp(b.country.as_str()),
            Self::EmissionType => a.emission_type.code().cmp(b.emission_type.code()),
            Self::Activity => a.activity.code().cmp(b.activity.code()),
        }
    }
}

/// Sort keys in priority order; `-field` sorts descending.
///
/// The default is newest year first, then country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOrdering {
    keys: Vec<(OrderField, bool)>,
}

impl Default for RecordOrdering {
    fn default() -> Self {
        Self {
            keys: vec![(OrderField::Year, true), (OrderField::Country, false)],
        }
    }
}

impl RecordOrdering {
    /// Parses `"-year,country"`. An empty string yields the default.
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        let mut keys = Vec::new();
        for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (descending, name) = match item.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, item),
            };
            let field = match name.to_ascii_lowercase().as_str() {
                "year" => OrderField::Year,
                "emissions" => OrderField::Emissions,
                "country" => OrderField::Country,
                "emission_type" => OrderField::EmissionType,
                "activity" => OrderField::Activity,
                _ => return Err(RecordError::UnknownOrderingField(item.to_string())),
            };
            keys.push((field, descending));
        }
        if keys.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self { keys })
    }

    pub fn compare(&self, a: &EmissionRecord, b: &EmissionRecord) -> Ordering {
        for &(field, descending) in &self.keys {
            let ord = field.compare(a, b);
            let ord = if descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Stable: ties keep their input order.
    pub fn sort(&self, records: &mut [EmissionRecord]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

/// Parses a comma separated country list (`"US, gb,DE"`); blank items are skipped.
pub fn parse_country_list(raw: &str) -> Result<Vec<CountryCode>, RecordError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(CountryCode::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{RecordFilter, RecordOrdering, parse_country_list};
    use crate::error::RecordError;
    use crate::record::{ActivitySector, CountryCode, EmissionRecord, EmissionType};
    use pretty_assertions::assert_eq;

    fn rec(country: &str, emissions: f64, year: u16, t: EmissionType, a: ActivitySector) -> EmissionRecord {
        EmissionRecord::new(CountryCode::parse(country).unwrap(), emissions, year, t, a)
    }

    fn batch() -> Vec<EmissionRecord> {
        vec![
            rec("US", 1000.5, 2020, EmissionType::Co2, ActivitySector::Energy),
            rec("GB", 2000.75, 2021, EmissionType::Ch4, ActivitySector::Transport),
            rec("US", 1500.25, 2019, EmissionType::Co2, ActivitySector::Industry),
        ]
    }

    fn countries(records: &[&EmissionRecord]) -> Vec<String> {
        records.iter().map(|r| r.country.to_string()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything_in_order() {
        let records = batch();
        let f = RecordFilter::new();
        assert!(f.is_empty());
        assert_eq!(countries(&f.apply(&records)), vec!["US", "GB", "US"]);
    }

    #[test]
    fn year_range_and_type() {
        let records = batch();
        let f = RecordFilter {
            year_gte: Some(2020),
            emission_types: vec![EmissionType::Co2],
            ..RecordFilter::default()
        };
        let out = f.apply(&records);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].year, 2020);
    }

    #[test]
    fn country_list_and_emission_bounds() {
        let records = batch();
        let f = RecordFilter {
            countries: parse_country_list("us, gb").unwrap(),
            emissions_gte: Some(1200.0),
            emissions_lte: Some(1600.0),
            ..RecordFilter::default()
        };
        let out = f.apply_owned(&records);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].emissions, 1500.25);
    }

    #[test]
    fn exact_country_and_activity() {
        let records = batch();
        let f = RecordFilter {
            country: Some(CountryCode::parse("gb").unwrap()),
            activities: vec![ActivitySector::Energy],
            ..RecordFilter::default()
        };
        assert!(f.apply(&records).is_empty());
    }

    #[test]
    fn country_list_parsing() {
        let list = parse_country_list("US,,de , ").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].as_str(), "DE");
        assert!(parse_country_list("US,XYZ").is_err());
    }

    #[test]
    fn search_matches_country_or_activity() {
        let records = batch();
        let by_country = RecordFilter {
            search: Some("gb".into()),
            ..RecordFilter::default()
        };
        assert_eq!(countries(&by_country.apply(&records)), vec!["GB"]);

        let by_activity = RecordFilter {
            search: Some("industrial".into()),
            ..RecordFilter::default()
        };
        let out = by_activity.apply(&records);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].year, 2019);

        let blank = RecordFilter {
            search: Some("  ".into()),
            ..RecordFilter::default()
        };
        assert_eq!(blank.apply(&records).len(), 3);

        let miss = RecordFilter {
            search: Some("methane".into()),
            ..RecordFilter::default()
        };
        assert!(miss.apply(&records).is_empty());
    }

    #[test]
    fn recent_counts_back_from_the_given_year() {
        let records = batch();
        let f = RecordFilter::recent(1, 2021);
        assert_eq!(f.year_gte, Some(2020));
        assert_eq!(countries(&f.apply(&records)), vec!["US", "GB"]);
        assert_eq!(RecordFilter::recent(5000, 2021).year_gte, Some(0));
    }

    #[test]
    fn default_ordering_is_newest_then_country() {
        let mut records = batch();
        records.push(rec("DE", 10.0, 2021, EmissionType::N2o, ActivitySector::Waste));
        RecordOrdering::default().sort(&mut records);
        let keys: Vec<_> = records.iter().map(|r| (r.year, r.country.to_string())).collect();
        assert_eq!(
            keys,
            vec![
                (2021, "DE".to_string()),
                (2021, "GB".to_string()),
                (2020, "US".to_string()),
                (2019, "US".to_string()),
            ]
        );
    }

    #[test]
    fn ordering_parses_direction_and_rejects_unknown_fields() {
        let mut records = batch();
        RecordOrdering::parse("-emissions").unwrap().sort(&mut records);
        let amounts: Vec<f64> = records.iter().map(|r| r.emissions).collect();
        assert_eq!(amounts, vec![2000.75, 1500.25, 1000.5]);

        assert_eq!(RecordOrdering::parse(" ").unwrap(), RecordOrdering::default());
        assert_eq!(
            RecordOrdering::parse("year,-created_at"),
            Err(RecordError::UnknownOrderingField("-created_at".into()))
        );
    }
}
