//! Parquet encoding of cached datasets
//!
//! Each dataset kind has a fixed Arrow schema. Entry metadata (write time,
//! kind, schema version) lives in the Parquet key-value footer so it can be
//! read without decoding any rows.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use parquet::file::reader::ChunkReader;

use super::DatasetKind;
use crate::models::{Compound, LapRecord, QualifyingRow, ResultRow, SessionData, WeatherSample};

/// Schema version - increment to invalidate every existing entry
pub const SCHEMA_VERSION: u32 = 1;

const META_WRITTEN_AT: &str = "paddock.written_at";
const META_KIND: &str = "paddock.kind";
const META_SCHEMA_VERSION: &str = "paddock.schema_version";

type Result<T> = std::result::Result<T, String>;

/// A typed table for one dataset kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Results(Vec<ResultRow>),
    Laps(Vec<LapRecord>),
    Qualifying(Vec<QualifyingRow>),
    Weather(Vec<WeatherSample>),
}

impl Dataset {
    pub fn kind(&self) -> DatasetKind {
        match self {
            Dataset::Results(_) => DatasetKind::Results,
            Dataset::Laps(_) => DatasetKind::Laps,
            Dataset::Qualifying(_) => DatasetKind::Qualifying,
            Dataset::Weather(_) => DatasetKind::Weather,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Dataset::Results(rows) => rows.len(),
            Dataset::Laps(rows) => rows.len(),
            Dataset::Qualifying(rows) => rows.len(),
            Dataset::Weather(rows) => rows.len(),
        }
    }

    /// Copy one dataset out of a normalized session.
    pub fn from_session(data: &SessionData, kind: DatasetKind) -> Self {
        match kind {
            DatasetKind::Results => Dataset::Results(data.results.clone()),
            DatasetKind::Laps => Dataset::Laps(data.laps.clone()),
            DatasetKind::Qualifying => Dataset::Qualifying(data.qualifying.clone()),
            DatasetKind::Weather => Dataset::Weather(data.weather.clone()),
        }
    }

    /// Move this dataset into its slot of a session.
    pub fn install(self, data: &mut SessionData) {
        match self {
            Dataset::Results(rows) => data.results = rows,
            Dataset::Laps(rows) => data.laps = rows,
            Dataset::Qualifying(rows) => data.qualifying = rows,
            Dataset::Weather(rows) => data.weather = rows,
        }
    }

    fn to_batch(&self) -> Result<RecordBatch> {
        match self {
            Dataset::Results(rows) => batch_of(rows),
            Dataset::Laps(rows) => batch_of(rows),
            Dataset::Qualifying(rows) => batch_of(rows),
            Dataset::Weather(rows) => batch_of(rows),
        }
    }

    fn empty(kind: DatasetKind) -> Self {
        match kind {
            DatasetKind::Results => Dataset::Results(Vec::new()),
            DatasetKind::Laps => Dataset::Laps(Vec::new()),
            DatasetKind::Qualifying => Dataset::Qualifying(Vec::new()),
            DatasetKind::Weather => Dataset::Weather(Vec::new()),
        }
    }

    fn extend_from_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        match self {
            Dataset::Results(rows) => rows.extend(ResultRow::from_batch(batch)?),
            Dataset::Laps(rows) => rows.extend(LapRecord::from_batch(batch)?),
            Dataset::Qualifying(rows) => rows.extend(QualifyingRow::from_batch(batch)?),
            Dataset::Weather(rows) => rows.extend(WeatherSample::from_batch(batch)?),
        }
        Ok(())
    }
}

/// Footer metadata of an entry file.
#[derive(Debug, Clone)]
pub struct EntryMeta {
    pub kind: DatasetKind,
    pub written_at: DateTime<Utc>,
    pub rows: usize,
}

/// Encode `dataset` as Snappy-compressed Parquet.
pub fn write_dataset<W: Write + Send>(
    out: W,
    dataset: &Dataset,
    written_at: DateTime<Utc>,
) -> Result<()> {
    let batch = dataset.to_batch()?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_key_value_metadata(Some(vec![
            KeyValue::new(META_WRITTEN_AT.to_string(), written_at.to_rfc3339()),
            KeyValue::new(META_KIND.to_string(), dataset.kind().as_str().to_string()),
            KeyValue::new(META_SCHEMA_VERSION.to_string(), SCHEMA_VERSION.to_string()),
        ]))
        .build();

    let mut writer =
        ArrowWriter::try_new(out, batch.schema(), Some(props)).map_err(|e| e.to_string())?;
    writer.write(&batch).map_err(|e| e.to_string())?;
    writer.close().map_err(|e| e.to_string())?;
    Ok(())
}

/// Read only the footer metadata of an entry.
pub fn read_meta<R: ChunkReader + 'static>(input: R) -> Result<EntryMeta> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(input).map_err(|e| e.to_string())?;
    meta_of(&builder)
}

/// Decode an entry, checking it holds the expected kind.
pub fn read_dataset<R: ChunkReader + 'static>(
    input: R,
    expected: DatasetKind,
) -> Result<(Dataset, EntryMeta)> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(input).map_err(|e| e.to_string())?;
    let meta = meta_of(&builder)?;
    if meta.kind != expected {
        return Err(format!(
            "entry holds {} data, expected {}",
            meta.kind, expected
        ));
    }

    let reader = builder.build().map_err(|e| e.to_string())?;
    let mut dataset = Dataset::empty(expected);
    for batch in reader {
        let batch = batch.map_err(|e| e.to_string())?;
        dataset.extend_from_batch(&batch)?;
    }

    if dataset.len() != meta.rows {
        return Err(format!(
            "decoded {} rows, footer declares {}",
            dataset.len(),
            meta.rows
        ));
    }
    Ok((dataset, meta))
}

fn meta_of<R: ChunkReader + 'static>(
    builder: &ParquetRecordBatchReaderBuilder<R>,
) -> Result<EntryMeta> {
    let file_meta = builder.metadata().file_metadata();
    let lookup = |key: &str| -> Option<String> {
        file_meta
            .key_value_metadata()?
            .iter()
            .find(|kv| kv.key == key)
            .and_then(|kv| kv.value.clone())
    };

    let version = lookup(META_SCHEMA_VERSION).ok_or("missing schema version")?;
    if version != SCHEMA_VERSION.to_string() {
        return Err(format!(
            "schema version {} != {}",
            version, SCHEMA_VERSION
        ));
    }

    let kind = match lookup(META_KIND).as_deref() {
        Some("results") => DatasetKind::Results,
        Some("laps") => DatasetKind::Laps,
        Some("qualifying") => DatasetKind::Qualifying,
        Some("weather") => DatasetKind::Weather,
        other => return Err(format!("unknown dataset kind {:?}", other)),
    };

    let written_at = lookup(META_WRITTEN_AT)
        .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or("missing or malformed write timestamp")?;

    Ok(EntryMeta {
        kind,
        written_at,
        rows: file_meta.num_rows().max(0) as usize,
    })
}

// ============================================================================
// Row <-> column mapping
// ============================================================================

trait Columnar: Sized {
    fn schema() -> Schema;
    fn columns(rows: &[Self]) -> Vec<ArrayRef>;
    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>>;
}

fn batch_of<T: Columnar>(rows: &[T]) -> Result<RecordBatch> {
    RecordBatch::try_new(Arc::new(T::schema()), T::columns(rows)).map_err(|e| e.to_string())
}

fn column<'a, A: Array + 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a A> {
    batch
        .column_by_name(name)
        .ok_or_else(|| format!("missing column '{}'", name))?
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| format!("column '{}' has unexpected type", name))
}

fn strings<'a>(values: impl Iterator<Item = Option<&'a str>>) -> ArrayRef {
    Arc::new(StringArray::from(values.collect::<Vec<_>>()))
}

fn millis(values: impl Iterator<Item = Option<Duration>>) -> ArrayRef {
    Arc::new(Int64Array::from(
        values
            .map(|d| d.map(|d| d.as_millis() as i64))
            .collect::<Vec<_>>(),
    ))
}

fn opt_string(a: &StringArray, i: usize) -> Option<String> {
    a.is_valid(i).then(|| a.value(i).to_string())
}

fn opt_u32(a: &UInt32Array, i: usize) -> Option<u32> {
    a.is_valid(i).then(|| a.value(i))
}

fn opt_f64(a: &Float64Array, i: usize) -> Option<f64> {
    a.is_valid(i).then(|| a.value(i))
}

fn opt_bool(a: &BooleanArray, i: usize) -> Option<bool> {
    a.is_valid(i).then(|| a.value(i))
}

fn opt_millis(a: &Int64Array, i: usize) -> Option<Duration> {
    a.is_valid(i)
        .then(|| Duration::from_millis(a.value(i).max(0) as u64))
}

fn required_string(a: &StringArray, i: usize, name: &str) -> Result<String> {
    opt_string(a, i).ok_or_else(|| format!("null in required column '{}'", name))
}

impl Columnar for LapRecord {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("driver", DataType::Utf8, false),
            Field::new("lap_number", DataType::UInt32, false),
            Field::new("lap_time_ms", DataType::Int64, true),
            Field::new("compound", DataType::Utf8, true),
            Field::new("tyre_life", DataType::UInt32, true),
            Field::new("stint", DataType::UInt32, true),
            Field::new("pit_in", DataType::Boolean, false),
            Field::new("pit_out", DataType::Boolean, false),
            Field::new("position", DataType::UInt32, true),
        ])
    }

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            strings(rows.iter().map(|r| Some(r.driver.as_str()))),
            Arc::new(UInt32Array::from(
                rows.iter().map(|r| r.lap_number).collect::<Vec<_>>(),
            )),
            millis(rows.iter().map(|r| r.lap_time)),
            strings(rows.iter().map(|r| r.compound.map(|c| c.as_str()))),
            Arc::new(UInt32Array::from(
                rows.iter().map(|r| r.tyre_life).collect::<Vec<_>>(),
            )),
            Arc::new(UInt32Array::from(
                rows.iter().map(|r| r.stint).collect::<Vec<_>>(),
            )),
            Arc::new(BooleanArray::from(
                rows.iter().map(|r| r.pit_in).collect::<Vec<_>>(),
            )),
            Arc::new(BooleanArray::from(
                rows.iter().map(|r| r.pit_out).collect::<Vec<_>>(),
            )),
            Arc::new(UInt32Array::from(
                rows.iter().map(|r| r.position).collect::<Vec<_>>(),
            )),
        ]
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let driver = column::<StringArray>(batch, "driver")?;
        let lap_number = column::<UInt32Array>(batch, "lap_number")?;
        let lap_time = column::<Int64Array>(batch, "lap_time_ms")?;
        let compound = column::<StringArray>(batch, "compound")?;
        let tyre_life = column::<UInt32Array>(batch, "tyre_life")?;
        let stint = column::<UInt32Array>(batch, "stint")?;
        let pit_in = column::<BooleanArray>(batch, "pit_in")?;
        let pit_out = column::<BooleanArray>(batch, "pit_out")?;
        let position = column::<UInt32Array>(batch, "position")?;

        (0..batch.num_rows())
            .map(|i| -> Result<LapRecord> {
                Ok(LapRecord {
                    driver: required_string(driver, i, "driver")?,
                    lap_number: opt_u32(lap_number, i).ok_or("null lap number")?,
                    lap_time: opt_millis(lap_time, i),
                    compound: opt_string(compound, i).and_then(|c| Compound::parse(&c)),
                    tyre_life: opt_u32(tyre_life, i),
                    stint: opt_u32(stint, i),
                    pit_in: opt_bool(pit_in, i).unwrap_or(false),
                    pit_out: opt_bool(pit_out, i).unwrap_or(false),
                    position: opt_u32(position, i),
                })
            })
            .collect()
    }
}

impl Columnar for ResultRow {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("driver", DataType::Utf8, false),
            Field::new("driver_number", DataType::Utf8, true),
            Field::new("full_name", DataType::Utf8, true),
            Field::new("team", DataType::Utf8, true),
            Field::new("position", DataType::UInt32, true),
            Field::new("grid_position", DataType::UInt32, true),
            Field::new("status", DataType::Utf8, true),
            Field::new("points", DataType::Float64, true),
        ])
    }

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            strings(rows.iter().map(|r| Some(r.driver.as_str()))),
            strings(rows.iter().map(|r| r.driver_number.as_deref())),
            strings(rows.iter().map(|r| r.full_name.as_deref())),
            strings(rows.iter().map(|r| r.team.as_deref())),
            Arc::new(UInt32Array::from(
                rows.iter().map(|r| r.position).collect::<Vec<_>>(),
            )),
            Arc::new(UInt32Array::from(
                rows.iter().map(|r| r.grid_position).collect::<Vec<_>>(),
            )),
            strings(rows.iter().map(|r| r.status.as_deref())),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.points).collect::<Vec<_>>(),
            )),
        ]
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let driver = column::<StringArray>(batch, "driver")?;
        let driver_number = column::<StringArray>(batch, "driver_number")?;
        let full_name = column::<StringArray>(batch, "full_name")?;
        let team = column::<StringArray>(batch, "team")?;
        let position = column::<UInt32Array>(batch, "position")?;
        let grid_position = column::<UInt32Array>(batch, "grid_position")?;
        let status = column::<StringArray>(batch, "status")?;
        let points = column::<Float64Array>(batch, "points")?;

        (0..batch.num_rows())
            .map(|i| -> Result<ResultRow> {
                Ok(ResultRow {
                    driver: required_string(driver, i, "driver")?,
                    driver_number: opt_string(driver_number, i),
                    full_name: opt_string(full_name, i),
                    team: opt_string(team, i),
                    position: opt_u32(position, i),
                    grid_position: opt_u32(grid_position, i),
                    status: opt_string(status, i),
                    points: opt_f64(points, i),
                })
            })
            .collect()
    }
}

impl Columnar for QualifyingRow {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("driver", DataType::Utf8, false),
            Field::new("position", DataType::UInt32, true),
            Field::new("q1_ms", DataType::Int64, true),
            Field::new("q2_ms", DataType::Int64, true),
            Field::new("q3_ms", DataType::Int64, true),
        ])
    }

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            strings(rows.iter().map(|r| Some(r.driver.as_str()))),
            Arc::new(UInt32Array::from(
                rows.iter().map(|r| r.position).collect::<Vec<_>>(),
            )),
            millis(rows.iter().map(|r| r.q1)),
            millis(rows.iter().map(|r| r.q2)),
            millis(rows.iter().map(|r| r.q3)),
        ]
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let driver = column::<StringArray>(batch, "driver")?;
        let position = column::<UInt32Array>(batch, "position")?;
        let q1 = column::<Int64Array>(batch, "q1_ms")?;
        let q2 = column::<Int64Array>(batch, "q2_ms")?;
        let q3 = column::<Int64Array>(batch, "q3_ms")?;

        (0..batch.num_rows())
            .map(|i| -> Result<QualifyingRow> {
                Ok(QualifyingRow {
                    driver: required_string(driver, i, "driver")?,
                    position: opt_u32(position, i),
                    q1: opt_millis(q1, i),
                    q2: opt_millis(q2, i),
                    q3: opt_millis(q3, i),
                })
            })
            .collect()
    }
}

impl Columnar for WeatherSample {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("session_time_ms", DataType::Int64, true),
            Field::new("air_temp", DataType::Float64, true),
            Field::new("track_temp", DataType::Float64, true),
            Field::new("wind_speed", DataType::Float64, true),
            Field::new("rainfall", DataType::Boolean, true),
        ])
    }

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            millis(rows.iter().map(|r| r.session_time)),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.air_temp).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.track_temp).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.wind_speed).collect::<Vec<_>>(),
            )),
            Arc::new(BooleanArray::from(
                rows.iter().map(|r| r.rainfall).collect::<Vec<_>>(),
            )),
        ]
    }

    fn from_batch(batch: &RecordBatch) -> Result<Vec<Self>> {
        let session_time = column::<Int64Array>(batch, "session_time_ms")?;
        let air_temp = column::<Float64Array>(batch, "air_temp")?;
        let track_temp = column::<Float64Array>(batch, "track_temp")?;
        let wind_speed = column::<Float64Array>(batch, "wind_speed")?;
        let rainfall = column::<BooleanArray>(batch, "rainfall")?;

        Ok((0..batch.num_rows())
            .map(|i| WeatherSample {
                session_time: opt_millis(session_time, i),
                air_temp: opt_f64(air_temp, i),
                track_temp: opt_f64(track_temp, i),
                wind_speed: opt_f64(wind_speed, i),
                rainfall: opt_bool(rainfall, i),
            })
            .collect())
    }
}
