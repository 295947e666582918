use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
};
use arrow::datatypes::DataType;
use ndarray::{Array1, Array2};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular regression dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat numeric columns (recommended)
/// * `.json`    – `[{ "CRIM": 0.006, ..., "PRICE": 24.0 }, ...]`
/// * `.csv`     – header row, numeric cells
///
/// `target_column` names the target; when `None` the last column is used.
pub fn load_file(path: &Path, target_column: Option<&str>) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    table
        .into_dataset(target_column)
        .with_context(|| format!("building dataset from {}", path.display()))
}

// ---------------------------------------------------------------------------
// Column-oriented intermediate table
// ---------------------------------------------------------------------------

/// Parsed columns before the target is split off.
#[derive(Debug, Default)]
struct Table {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Table {
    fn with_names(names: Vec<String>) -> Self {
        let columns = vec![Vec::new(); names.len()];
        Table { names, columns }
    }

    fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    fn into_dataset(mut self, target_column: Option<&str>) -> Result<Dataset> {
        if self.names.len() < 2 {
            bail!(
                "Need at least one feature column and a target column, found {} column(s)",
                self.names.len()
            );
        }
        let target_idx = match target_column {
            Some(name) => self
                .names
                .iter()
                .position(|n| n == name)
                .with_context(|| format!("Target column '{name}' not found"))?,
            None => self.names.len() - 1,
        };

        let target_name = self.names.remove(target_idx);
        let targets = Array1::from_vec(self.columns.remove(target_idx));
        let n_rows = targets.len();
        let n_features = self.names.len();

        let mut features = Array2::<f64>::zeros((n_rows, n_features));
        for (c, column) in self.columns.iter().enumerate() {
            if column.len() != n_rows {
                bail!(
                    "Column '{}' has {} values but the target has {n_rows}",
                    self.names[c],
                    column.len()
                );
            }
            for (r, &v) in column.iter().enumerate() {
                features[[r, c]] = v;
            }
        }

        Ok(Dataset::new(features, targets, self.names, target_name)?)
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "CRIM": 0.00632, "ZN": 18.0, "CHAS": 0, "PRICE": 24.0 },
///   ...
/// ]
/// ```
///
/// Column order follows the keys of the first record.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let Some(first) = records.first() else {
        return Ok(Table::default());
    };
    let names: Vec<String> = first
        .as_object()
        .context("Row 0 is not a JSON object")?
        .keys()
        .cloned()
        .collect();
    let mut table = Table::with_names(names);

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for (c, name) in table.names.iter().enumerate() {
            let value = obj
                .get(name)
                .with_context(|| format!("Row {i}: missing '{name}'"))?;
            table.columns[c].push(json_to_f64(value, i, name)?);
        }
    }

    Ok(table)
}

fn json_to_f64(val: &JsonValue, row: usize, col: &str) -> Result<f64> {
    match val {
        JsonValue::Number(n) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .with_context(|| format!("Row {row}, {col}: number out of range")),
        JsonValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => bail!("Row {row}, {col}: expected a number, got {other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every cell numeric.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = Table::with_names(headers);

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != table.names.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, found {}",
                table.names.len(),
                record.len()
            );
        }
        for (c, cell) in record.iter().enumerate() {
            let value = parse_cell(cell)
                .with_context(|| format!("CSV row {row_no}, {}: '{cell}' is not a number", table.names[c]))?;
            table.columns[c].push(value);
        }
    }

    Ok(table)
}

/// `NaN` and `inf` parse as floats but are not usable cell values.
fn parse_cell(s: &str) -> Option<f64> {
    let s = s.trim();
    match s {
        "true" => Some(1.0),
        "false" => Some(0.0),
        _ => s.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat numeric columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = Table::with_names(names);

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let offset = table.n_rows();
        for (c, name) in table.names.iter().enumerate() {
            let col = batch.column(c);
            for row in 0..batch.num_rows() {
                let value = extract_f64(col, row)
                    .with_context(|| format!("Row {}: failed to read '{name}'", offset + row))?;
                table.columns[c].push(value);
            }
        }
    }

    Ok(table)
}

// -- Parquet / Arrow helpers --

/// Read one numeric cell of an Arrow column.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in numeric column");
    }
    let value = match col.data_type() {
        DataType::Float64 => downcast::<Float64Array>(col)?.value(row),
        DataType::Float32 => downcast::<Float32Array>(col)?.value(row) as f64,
        DataType::Int64 => downcast::<Int64Array>(col)?.value(row) as f64,
        DataType::Int32 => downcast::<Int32Array>(col)?.value(row) as f64,
        DataType::Boolean => {
            if downcast::<BooleanArray>(col)?.value(row) {
                1.0
            } else {
                0.0
            }
        }
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    if !value.is_finite() {
        bail!("non-finite value {value}");
    }
    Ok(value)
}

fn downcast<T: 'static>(col: &Arc<dyn Array>) -> Result<&T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("unexpected array type {:?}", col.data_type()))
}
