use csv::ByteRecord;
use serde::Serialize;
use std::borrow::Cow;
use std::path::Path;

use crate::errors::{ZhiError, ZhiResult};
use crate::growth::growth_rate;

// Fixed field positions of a dataset row:
// RegionID,SizeRank,RegionName,RegionType,StateName,State,City,Metro,CountyName,<months...>
pub const ZIP_CODE_FIELD: usize = 2;
pub const STATE_FIELD: usize = 5;
pub const CITY_FIELD: usize = 6;
pub const COUNTY_FIELD: usize = 8;
pub const FIRST_VALUE_FIELD: usize = 9;

/// Value history of one zip code within one dataset file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Name of the dataset file the record was read from
    pub dataset: String,
    pub zip_code: u64,
    pub city: String,
    pub state: String,
    pub county: String,
    /// Chronological monthly values, zero where no data was available
    pub values: Vec<f64>,
    /// Compound annual growth rate over the aligned window, in percent
    pub growth_rate: f64,
    /// Length of the aligned window, in years
    pub years: f64,
}

/// A decoded row plus the number of monthly values that had to be read as zero
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub record: Record,
    pub tolerated_values: usize,
}

impl Record {
    /// Builds a record and derives its growth rate and years from `values`.
    ///
    /// `values` is expected to be non-empty; rows without any monthly column
    /// are rejected by [`Record::parse_row`] before they get here.
    pub fn new(
        dataset: impl Into<String>,
        zip_code: u64,
        city: impl Into<String>,
        state: impl Into<String>,
        county: impl Into<String>,
        values: Vec<f64>,
    ) -> Self {
        let growth = growth_rate(&values);
        Self {
            dataset: dataset.into(),
            zip_code,
            city: city.into(),
            state: state.into(),
            county: county.into(),
            values,
            growth_rate: growth.rate,
            years: growth.years,
        }
    }

    /// The most recent monthly value, used as the current price
    pub fn latest_value(&self) -> f64 {
        self.values.last().copied().unwrap_or(f64::NAN)
    }

    /// Decodes one dataset row.
    ///
    /// A zip code that is not an unsigned integer, or a row too short to hold
    /// a single monthly value, is fatal. Monthly values that do not parse are
    /// read as `0.0` and counted in [`ParsedRow::tolerated_values`]. Text
    /// fields are decoded lossily.
    pub fn parse_row(
        row: &ByteRecord,
        dataset: &str,
        path: &Path,
        line_number: usize,
    ) -> ZhiResult<ParsedRow> {
        if row.len() <= FIRST_VALUE_FIELD {
            return Err(ZhiError::malformed_record(
                path,
                line_number,
                format!(
                    "expected at least {} fields, found {}",
                    FIRST_VALUE_FIELD + 1,
                    row.len()
                ),
            ));
        }

        let raw_zip_code = text(&row[ZIP_CODE_FIELD]);
        let zip_code = raw_zip_code
            .parse::<u64>()
            .map_err(|_| ZhiError::invalid_zip_code(path, line_number, raw_zip_code.as_ref()))?;

        let mut tolerated_values = 0;
        let values = row
            .iter()
            .skip(FIRST_VALUE_FIELD)
            .map(|field| {
                std::str::from_utf8(field)
                    .ok()
                    .and_then(|value| value.parse::<f64>().ok())
                    .unwrap_or_else(|| {
                        tolerated_values += 1;
                        0.0
                    })
            })
            .collect();

        let record = Record::new(
            dataset,
            zip_code,
            text(&row[CITY_FIELD]),
            text(&row[STATE_FIELD]),
            text(&row[COUNTY_FIELD]),
            values,
        );

        Ok(ParsedRow {
            record,
            tolerated_values,
        })
    }
}

fn text(field: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(field)
}
