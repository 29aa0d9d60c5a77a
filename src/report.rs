//! Writing a run's time series to disk and reading it back.
//!
//! Two formats are supported:
//! * CSV, one row per day with one column per [`Field`](crate::Field), for spreadsheets and
//!   plotting tools. See [`write_csv`] / [`read_csv`].
//! * JSON, the complete [`TimeSeries`] including its seed and parameters, so a finished run
//!   can be reloaded later. See [`save_json`] / [`load_json`].
//!
//! Output locations are described by [`ReportOptions`]: a directory, a file name prefix and
//! whether existing files may be replaced.
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::Writer;
use log::{info, trace};

use crate::error::EpiError;
use crate::time_series::{DayRecord, TimeSeries};

#[derive(Clone, Debug)]
pub struct ReportOptions {
    pub directory: PathBuf,
    pub file_prefix: String,
    pub overwrite: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            directory: PathBuf::from("."),
            file_prefix: String::new(),
            overwrite: false,
        }
    }
}

impl ReportOptions {
    #[must_use]
    pub fn new() -> ReportOptions {
        ReportOptions::default()
    }

    /// Sets the directory reports are written to. Created on first write if missing.
    pub fn directory(&mut self, directory: PathBuf) -> &mut ReportOptions {
        self.directory = directory;
        self
    }

    /// Sets a prefix prepended to every report file name.
    pub fn file_prefix(&mut self, file_prefix: &str) -> &mut ReportOptions {
        self.file_prefix = file_prefix.to_string();
        self
    }

    /// Whether existing report files may be replaced.
    pub fn overwrite(&mut self, overwrite: bool) -> &mut ReportOptions {
        self.overwrite = overwrite;
        self
    }

    /// Full path of the report called `name` with the given extension.
    #[must_use]
    pub fn path_for(&self, name: &str, extension: &str) -> PathBuf {
        self.directory
            .join(format!("{}{}.{}", self.file_prefix, name, extension))
    }
}

// Checks that the path is valid. Creates the file and all parent directories if
// they do not exist. Returns the file if successful.
fn generate_validate_filepath(
    path: &Path,
    extension: &str,
    overwrite: bool,
) -> Result<File, EpiError> {
    if path.extension().and_then(OsStr::to_str) != Some(extension) {
        return Err(EpiError::ReportError(format!(
            "report output files must have the `.{extension}` extension: {}",
            path.display()
        )));
    }
    if !overwrite && path.exists() {
        return Err(EpiError::ReportError(format!(
            "file already exists: {}. Please set `overwrite` to true in the report options \
             or use a different output directory or file prefix.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

/// Writes one CSV row per day to `<directory>/<prefix><name>.csv` and returns the path.
///
/// # Errors
///
/// Returns an `EpiError` if the file exists and `overwrite` is off, or on any I/O or CSV
/// failure.
pub fn write_csv(
    time_series: &TimeSeries,
    options: &ReportOptions,
    name: &str,
) -> Result<PathBuf, EpiError> {
    let path = options.path_for(name, "csv");
    let file = generate_validate_filepath(&path, "csv", options.overwrite)?;
    let mut writer = Writer::from_writer(file);
    for record in time_series.to_table() {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!("wrote {} days to {}", time_series.len(), path.display());
    Ok(path)
}

/// Reads the rows of a CSV written by [`write_csv`].
///
/// # Errors
///
/// Returns an `EpiError` if the file cannot be opened or a row does not parse.
pub fn read_csv(path: &Path) -> Result<Vec<DayRecord>, EpiError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: DayRecord = result?;
        records.push(record);
    }
    trace!("read {} days from {}", records.len(), path.display());
    Ok(records)
}

/// Saves the whole time series, seed and parameters included, to
/// `<directory>/<prefix><name>.json` and returns the path.
///
/// # Errors
///
/// Returns an `EpiError` if the file exists and `overwrite` is off, or on any I/O or
/// serialization failure.
pub fn save_json(
    time_series: &TimeSeries,
    options: &ReportOptions,
    name: &str,
) -> Result<PathBuf, EpiError> {
    let path = options.path_for(name, "json");
    let file = generate_validate_filepath(&path, "json", options.overwrite)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, time_series)?;
    writer.flush()?;
    info!("saved simulation to {}", path.display());
    Ok(path)
}

/// Loads a time series saved by [`save_json`].
///
/// # Errors
///
/// Returns an `EpiError` if the file cannot be read or is not a saved time series.
pub fn load_json(path: &Path) -> Result<TimeSeries, EpiError> {
    let file = File::open(path)?;
    let time_series: TimeSeries = serde_json::from_reader(BufReader::new(file))?;
    trace!("loaded {} days from {}", time_series.len(), path.display());
    Ok(time_series)
}
