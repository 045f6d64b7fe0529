//! Append-only CSV log of measurement records

use crate::error::{AppError, Result};
use crate::models::MeasurementRecord;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// CSV file the scheduler appends to.
///
/// The file is opened per write and closed again; nothing is held between
/// cycles. Each row goes out as a single write followed by flush and sync, so
/// a shutdown can never leave half a row behind.
#[derive(Debug, Clone)]
pub struct CsvLog {
    path: PathBuf,
}

impl CsvLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the header if the file is missing or empty.
    ///
    /// Returns `true` when a header was written. A non-empty file is left
    /// untouched whatever its first line is.
    pub fn ensure_header(&self) -> Result<bool> {
        let needs_header = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                return Err(AppError::io(format!("Cannot inspect {}: {}", self.path.display(), e)));
            }
        };

        if !needs_header {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::io(format!("Cannot create directory {}: {}", parent.display(), e))
            })?;
        }

        let mut file = self.open_append()?;
        self.write_line(&mut file, &MeasurementRecord::csv_header())?;
        Ok(true)
    }

    /// Append one data row, writing the header first if the file vanished.
    ///
    /// A last line left without its newline (killed writer, full disk, hand
    /// edit) is terminated first so the new row starts on its own line.
    pub fn append(&self, record: &MeasurementRecord) -> Result<()> {
        self.ensure_header()?;
        let mut file = self.open_append()?;
        let terminated = ends_with_newline(&mut file)
            .map_err(|e| AppError::io(format!("Cannot read {}: {}", self.path.display(), e)))?;

        let row = record.to_csv_row();
        if terminated {
            self.write_line(&mut file, &row)
        } else {
            self.write_line(&mut file, &format!("\n{}", row))
        }
    }

    fn open_append(&self) -> Result<File> {
        OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| AppError::io(format!("Cannot open {}: {}", self.path.display(), e)))
    }

    fn write_line(&self, file: &mut File, line: &str) -> Result<()> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        file.write_all(buf.as_bytes())
            .and_then(|_| file.flush())
            .and_then(|_| file.sync_data())
            .map_err(|e| AppError::io(format!("Cannot write to {}: {}", self.path.display(), e)))
    }
}

/// True for an empty file or one whose last byte is `\n`
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
