//! CSV reading for banding/encounter exports.

use std::io::Read;
use std::path::Path;

use bandtrack_core::RawCaptureRecord;
use serde::Deserialize;

use crate::error::IngestError;

pub const COL_TAG: &str = "original_band";
pub const COL_SPECIES: &str = "species_scientific_name_banding";
pub const COL_BANDING_LAT: &str = "lat_dd_banding";
pub const COL_BANDING_LON: &str = "lon_dd_banding";
pub const COL_BANDING_DATE: &str = "event_date_banding";
pub const COL_BANDING_LABEL: &str = "iso_subdivision_banding";
pub const COL_RECAPTURE_LAT: &str = "lat_dd_recap_enc";
pub const COL_RECAPTURE_LON: &str = "lon_dd_recap_enc";
pub const COL_RECAPTURE_DATE: &str = "event_date_recap_enc";
pub const COL_RECAPTURE_LABEL: &str = "iso_subdivision_recap_enc";

/// Columns that must be present in the header. Date and label columns are optional.
const REQUIRED_COLUMNS: &[&str] = &[
    COL_TAG,
    COL_SPECIES,
    COL_BANDING_LAT,
    COL_BANDING_LON,
    COL_RECAPTURE_LAT,
    COL_RECAPTURE_LON,
];

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "original_band", default)]
    tag: Option<String>,
    #[serde(rename = "species_scientific_name_banding", default)]
    species: Option<String>,
    #[serde(
        rename = "lat_dd_banding",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    banding_lat: Option<f64>,
    #[serde(
        rename = "lon_dd_banding",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    banding_lon: Option<f64>,
    #[serde(rename = "event_date_banding", default)]
    banding_date: Option<String>,
    #[serde(rename = "iso_subdivision_banding", default)]
    banding_label: Option<String>,
    #[serde(
        rename = "lat_dd_recap_enc",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    recapture_lat: Option<f64>,
    #[serde(
        rename = "lon_dd_recap_enc",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    recapture_lon: Option<f64>,
    #[serde(rename = "event_date_recap_enc", default)]
    recapture_date: Option<String>,
    #[serde(rename = "iso_subdivision_recap_enc", default)]
    recapture_label: Option<String>,
}

impl From<CsvRow> for RawCaptureRecord {
    fn from(row: CsvRow) -> Self {
        Self {
            tag_id: row.tag,
            species: row.species,
            banding_lat: row.banding_lat,
            banding_lon: row.banding_lon,
            banding_date: row.banding_date,
            banding_label: row.banding_label,
            recapture_lat: row.recapture_lat,
            recapture_lon: row.recapture_lon,
            recapture_date: row.recapture_date,
            recapture_label: row.recapture_label,
        }
    }
}

/// Parsed rows of one CSV file.
#[derive(Debug, Default)]
pub struct CsvLoad {
    pub records: Vec<RawCaptureRecord>,
    /// Rows that could not be decoded at all; logged and skipped.
    pub malformed_rows: usize,
}

/// Read capture records from any CSV source with a header row.
///
/// Unparseable coordinates decode as missing. Rows that fail to decode are
/// counted in [`CsvLoad::malformed_rows`] rather than failing the read.
///
/// # Errors
///
/// Returns [`IngestError::MissingColumn`] if a required column is absent, or
/// [`IngestError::Csv`] if the header itself cannot be read.
pub fn read_records<R: Read>(source: R) -> Result<CsvLoad, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|col| !headers.iter().any(|h| h == **col))
    {
        return Err(IngestError::MissingColumn((*missing).to_string()));
    }

    let mut load = CsvLoad::default();
    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        match row {
            Ok(row) => load.records.push(row.into()),
            Err(e) => {
                // +2: one for the header, one for 1-based line numbers.
                tracing::warn!(line = index + 2, error = %e, "skipping malformed CSV row");
                load.malformed_rows += 1;
            }
        }
    }

    tracing::debug!(
        records = load.records.len(),
        malformed = load.malformed_rows,
        "read capture records"
    );
    Ok(load)
}

/// Read capture records from a CSV file on disk.
///
/// # Errors
///
/// Returns [`IngestError::Io`] if the file cannot be opened, otherwise the
/// errors of [`read_records`].
pub fn load_records(path: &Path) -> Result<CsvLoad, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    read_records(file)
}
