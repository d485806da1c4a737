//! CSV ingestion of supply-chain orders into shipment records using Polars

use std::path::Path;

use polars::prelude::*;

use crate::error::FlowError;
use crate::record::ShipmentRecord;

/// Column names of the order dataset
#[derive(Debug, Clone)]
pub struct ColumnNames {
    pub order_id: String,
    pub src_lat: String,
    pub src_lon: String,
    pub dst_lat: String,
    pub dst_lon: String,
    pub customer_country: String,
    pub order_country: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            order_id: "order_id".to_string(),
            src_lat: "latitude_src".to_string(),
            src_lon: "longitude_src".to_string(),
            dst_lat: "latitude_dest".to_string(),
            dst_lon: "longitude_dest".to_string(),
            customer_country: "customer_country".to_string(),
            order_country: "order_country".to_string(),
        }
    }
}

impl ColumnNames {
    fn coordinates(&self) -> [&str; 4] {
        [
            self.src_lat.as_str(),
            self.src_lon.as_str(),
            self.dst_lat.as_str(),
            self.dst_lon.as_str(),
        ]
    }

    fn countries(&self) -> [&str; 2] {
        [self.customer_country.as_str(), self.order_country.as_str()]
    }
}

/// Load shipment records from a CSV file
///
/// # Arguments
/// * `file_path` - Path to the CSV file
/// * `columns` - Column layout (default: the supply-chain export layout)
///
/// # Returns
/// * One `ShipmentRecord` per row, in file order
pub fn load_shipments(
    file_path: impl AsRef<Path>,
    columns: &ColumnNames,
) -> crate::Result<Vec<ShipmentRecord>> {
    // The export is latin-1; lossy decoding keeps the numeric columns intact.
    // No schema inference: every column is read as String and parsed per cell
    // below, so one bad value only nulls that cell.
    let df = LazyCsvReader::new(file_path.as_ref())
        .with_has_header(true)
        .with_encoding(CsvEncoding::LossyUtf8)
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect()?;

    records_from_frame(&df, columns)
}

/// Convert an already loaded frame into shipment records
pub fn records_from_frame(
    df: &DataFrame,
    columns: &ColumnNames,
) -> crate::Result<Vec<ShipmentRecord>> {
    check_layout(df, columns)?;

    let n_rows = df.height();
    let order_ids = string_column(df, &columns.order_id, n_rows)?;
    let src_lat = float_column(df, &columns.src_lat, n_rows)?;
    let src_lon = float_column(df, &columns.src_lon, n_rows)?;
    let dst_lat = float_column(df, &columns.dst_lat, n_rows)?;
    let dst_lon = float_column(df, &columns.dst_lon, n_rows)?;
    let customer = string_column(df, &columns.customer_country, n_rows)?;
    let order = string_column(df, &columns.order_country, n_rows)?;

    let mut records = Vec::with_capacity(n_rows);
    for i in 0..n_rows {
        records.push(ShipmentRecord {
            order_id: order_ids[i].clone(),
            src_lat: src_lat[i],
            src_lon: src_lon[i],
            dst_lat: dst_lat[i],
            dst_lon: dst_lon[i],
            customer_country: customer[i].clone(),
            order_country: order[i].clone(),
        });
    }
    Ok(records)
}

/// Either the full coordinate set or the full country pair must exist
fn check_layout(df: &DataFrame, columns: &ColumnNames) -> Result<(), FlowError> {
    let has = |name: &str| df.column(name).is_ok();
    let coordinates = columns.coordinates();
    let countries = columns.countries();

    if coordinates.iter().all(|&c| has(c)) || countries.iter().all(|&c| has(c)) {
        return Ok(());
    }
    Err(FlowError::MissingFields(format!(
        "need coordinate columns {coordinates:?} or country columns {countries:?}"
    )))
}

/// Float values of a column, unparseable cells as null; all null if absent
fn float_column(df: &DataFrame, name: &str, n_rows: usize) -> crate::Result<Vec<Option<f64>>> {
    let Ok(series) = df.column(name) else {
        return Ok(vec![None; n_rows]);
    };
    let values = series
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .collect();
    Ok(values)
}

fn string_column(df: &DataFrame, name: &str, n_rows: usize) -> crate::Result<Vec<Option<String>>> {
    let Ok(series) = df.column(name) else {
        return Ok(vec![None; n_rows]);
    };
    let values = series
        .cast(&DataType::String)?
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_owned))
        .collect();
    Ok(values)
}
