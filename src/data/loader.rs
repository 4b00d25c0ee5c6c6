use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeListArray, ListArray,
};
use arrow::datatypes::DataType;
use ndarray::ArrayD;
use ndarray_npy::{ReadNpyError, ReadNpyExt, ReadableElement};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::NdValues;
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a result array from a file and squeeze it to one dimension.
/// Dispatch by extension.
///
/// Supported formats:
/// * `.npy`     – NumPy array (f64, f32, i64 or i32), any shape
/// * `.csv`     – numeric table, optional header row
/// * `.json`    – number or (nested) array of numbers
/// * `.parquet` – a single-row `y` list column, or the first numeric column
pub fn load_array(path: &Path) -> Result<Vec<f64>> {
    let nd = load_nd(path).with_context(|| format!("loading {}", path.display()))?;
    let values = nd
        .squeeze()
        .with_context(|| format!("loading {}", path.display()))?;
    log::info!("Loaded {} values from {}", values.len(), path.display());
    Ok(values)
}

fn load_nd(path: &Path) -> Result<NdValues> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "npy" => load_npy(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    }
}

// ---------------------------------------------------------------------------
// NPY loader
// ---------------------------------------------------------------------------

/// Results saved with `np.save` are usually float64, but float32 and integer
/// arrays show up too; try each dtype until the header matches.
fn load_npy(path: &Path) -> Result<NdValues> {
    if let Some(nd) = read_npy_as::<f64>(path, |v| v)? {
        return Ok(nd);
    }
    if let Some(nd) = read_npy_as::<f32>(path, f64::from)? {
        return Ok(nd);
    }
    if let Some(nd) = read_npy_as::<i64>(path, |v| v as f64)? {
        return Ok(nd);
    }
    if let Some(nd) = read_npy_as::<i32>(path, f64::from)? {
        return Ok(nd);
    }
    Err(LoadError::UnsupportedDtype.into())
}

/// Returns `Ok(None)` when the file's dtype is not `T`.
fn read_npy_as<T>(path: &Path, to_f64: impl Fn(T) -> f64) -> Result<Option<NdValues>>
where
    T: ReadableElement + Copy,
{
    let file = File::open(path).context("opening npy file")?;
    match ArrayD::<T>::read_npy(file) {
        Ok(arr) => Ok(Some(NdValues {
            shape: arr.shape().to_vec(),
            values: arr.iter().map(|&v| to_f64(v)).collect(),
        })),
        Err(ReadNpyError::WrongDescriptor(_)) => Ok(None),
        Err(e) => Err(e).context("parsing npy file"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: a rectangular numeric table, e.g. one value per line or one
/// row of comma-separated values. A first row that does not parse as numbers
/// is treated as a header and skipped.
fn load_csv(path: &Path) -> Result<NdValues> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    let mut values = Vec::new();
    let mut n_rows = 0usize;
    let mut n_cols = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let parsed: Result<Vec<f64>> = record
            .iter()
            .enumerate()
            .map(|(j, tok)| {
                tok.parse::<f64>()
                    .with_context(|| format!("Row {row_no}, column {j}: '{tok}' is not a number"))
            })
            .collect();

        let row = match parsed {
            Ok(row) => row,
            Err(_) if row_no == 0 => {
                log::debug!("Skipping CSV header row in {}", path.display());
                continue;
            }
            Err(e) => return Err(e),
        };

        n_cols = row.len();
        n_rows += 1;
        values.extend(row);
    }

    Ok(NdValues {
        shape: vec![n_rows, n_cols],
        values,
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON: a number, or arrays of numbers nested to any depth, the
/// way `json.dump(arr.tolist(), f)` writes them. `null` reads as NaN.
fn load_json(path: &Path) -> Result<NdValues> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let mut shape = Vec::new();
    let mut cur = &root;
    while let JsonValue::Array(items) = cur {
        shape.push(items.len());
        match items.first() {
            Some(first) => cur = first,
            None => break,
        }
    }

    let mut values = Vec::new();
    flatten_json(&root, &shape, 0, &mut values)?;
    Ok(NdValues { shape, values })
}

fn flatten_json(val: &JsonValue, shape: &[usize], depth: usize, out: &mut Vec<f64>) -> Result<()> {
    match val {
        JsonValue::Array(items) => {
            if shape.get(depth) != Some(&items.len()) {
                bail!(LoadError::Ragged(depth));
            }
            for item in items {
                flatten_json(item, shape, depth + 1, out)?;
            }
        }
        JsonValue::Number(n) => {
            if depth != shape.len() {
                bail!(LoadError::Ragged(depth));
            }
            out.push(n.as_f64().with_context(|| format!("{n} is not representable as f64"))?);
        }
        JsonValue::Null => {
            if depth != shape.len() {
                bail!(LoadError::Ragged(depth));
            }
            out.push(f64::NAN);
        }
        other => bail!("Expected a number, found {other}"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding one result array.
///
/// Two layouts are accepted:
/// - a `y` column of type List<Float64> / LargeList<Float64> with one row
///   per curve (must squeeze to a single curve)
/// - otherwise the first Float64/Float32/Int64/Int32 column, concatenated
///   across record batches
fn load_parquet(path: &Path) -> Result<NdValues> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut column: Vec<f64> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let y_list = schema.index_of("y").ok().filter(|&idx| {
            matches!(
                schema.field(idx).data_type(),
                DataType::List(_) | DataType::LargeList(_)
            )
        });

        if let Some(y_idx) = y_list {
            let y_col = batch.column(y_idx);
            for row in 0..batch.num_rows() {
                let y = extract_f64_list(y_col, row)
                    .with_context(|| format!("Row {row}: failed to read 'y'"))?;
                rows.push(y);
            }
            continue;
        }

        let idx = schema
            .fields()
            .iter()
            .position(|f| is_numeric(f.data_type()))
            .context("Parquet file has no numeric column")?;
        column.extend(extract_f64_column(batch.column(idx))?);
    }

    if rows.is_empty() {
        return Ok(NdValues::flat(column));
    }

    if rows.len() != 1 {
        bail!(LoadError::ListRows(rows.len()));
    }
    let values = rows.concat();
    Ok(NdValues {
        shape: vec![1, values.len()],
        values,
    })
}

// -- Parquet / Arrow helpers --

fn is_numeric(dt: &DataType) -> bool {
    matches!(
        dt,
        DataType::Float64 | DataType::Float32 | DataType::Int64 | DataType::Int32
    )
}

/// Extract a whole primitive numeric column; nulls become NaN.
fn extract_f64_column(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.iter().map(|v| v.map_or(f64::NAN, |i| i as f64)).collect())
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
    } else {
        bail!("Unsupported column type {:?}", col.data_type())
    }
}

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    extract_f64_column(&values_array)
}
