//! Country dataset in the REST-countries JSON layout.
//!
//! Only the fields the globe needs are read; everything else in a record is
//! ignored.

use scene::prefabs::marker::MarkerSpec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("country dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryName {
    pub common: String,
}

/// Either a head count or a hand-written label such as `"300mil"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Population {
    Count(u64),
    Label(String),
}

impl Population {
    pub fn count(&self) -> Option<u64> {
        match self {
            Population::Count(n) => Some(*n),
            Population::Label(_) => None,
        }
    }

    /// Tooltip text: counts get thousands separators, labels pass through.
    pub fn display(&self) -> String {
        match self {
            Population::Count(n) => format_population(*n),
            Population::Label(label) => label.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryRecord {
    pub name: CountryName,
    /// `[lat, lng]` in degrees. Some territories ship an empty list.
    #[serde(default)]
    pub latlng: Vec<f64>,
    pub population: Population,
}

impl CountryRecord {
    /// `None` when the record has no usable coordinates.
    pub fn marker_spec(&self) -> Option<MarkerSpec> {
        let [lat, lng, ..] = self.latlng[..] else {
            return None;
        };
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        Some(MarkerSpec {
            lat_deg: lat,
            lon_deg: lng,
            country: self.name.common.clone(),
            population: self.population.count(),
            population_label: self.population.display(),
        })
    }
}

/// Formats a head count with `,` thousands separators.
pub fn format_population(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn parse_countries(json: &str) -> Result<Vec<CountryRecord>, DatasetError> {
    let records: Vec<CountryRecord> = serde_json::from_str(json)?;
    debug!(count = records.len(), "parsed country dataset");
    Ok(records)
}

/// Marker specs for every record with coordinates, in dataset order.
pub fn marker_specs(records: &[CountryRecord]) -> Vec<MarkerSpec> {
    records
        .iter()
        .filter_map(|record| {
            let spec = record.marker_spec();
            if spec.is_none() {
                warn!(country = %record.name.common, "skipping country without coordinates");
            }
            spec
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{DatasetError, Population, format_population, marker_specs, parse_countries};
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"[
        {"name": {"common": "Peru", "official": "Republic of Peru"},
         "latlng": [-10.0, -76.0], "population": 32971846, "region": "Americas"},
        {"name": {"common": "Bouvet Island"}, "latlng": [], "population": 0},
        {"name": {"common": "Mexico"}, "latlng": [23.6345, -102.5528], "population": "300mil"}
    ]"#;

    #[test]
    fn formats_thousands() {
        assert_eq!(format_population(0), "0");
        assert_eq!(format_population(999), "999");
        assert_eq!(format_population(1000), "1,000");
        assert_eq!(format_population(32_971_846), "32,971,846");
        assert_eq!(format_population(1_402_112_000), "1,402,112,000");
    }

    #[test]
    fn parses_counts_and_labels() {
        let records = parse_countries(SAMPLE).expect("parse");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].population, Population::Count(32_971_846));
        assert_eq!(records[2].population, Population::Label("300mil".to_string()));
    }

    #[test]
    fn records_without_coordinates_are_skipped() {
        let records = parse_countries(SAMPLE).expect("parse");
        let specs = marker_specs(&records);
        assert_eq!(specs.len(), 2);

        assert_eq!(specs[0].country, "Peru");
        assert_eq!(specs[0].lat_deg, -10.0);
        assert_eq!(specs[0].lon_deg, -76.0);
        assert_eq!(specs[0].population, Some(32_971_846));
        assert_eq!(specs[0].population_label, "32,971,846");

        assert_eq!(specs[1].population, None);
        assert_eq!(specs[1].population_label, "300mil");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_countries("{not json").expect_err("must fail");
        assert!(matches!(err, DatasetError::Parse(_)));
        assert!(err.to_string().starts_with("country dataset is not valid JSON"));
    }
}
