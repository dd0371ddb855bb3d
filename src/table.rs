use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::appointment::{reason_or_default, Appointment, NewAppointment, Status, SHEET_COLUMNS};
use crate::error::{StorageError, TableError};
use crate::sheet::{csv_to_rows, rows_to_csv};
use crate::storage::{read_text_file, write_text_file};
use crate::validate::{validate, validate_slot};

/// Ordered appointment collection backed by a sheet file.
///
/// Rows are addressed by position. Every mutation rewrites the whole file;
/// a mutation whose write fails is undone in memory.
#[derive(Debug)]
pub struct AppointmentTable {
    path: PathBuf,
    rows: Vec<Appointment>,
}

impl AppointmentTable {
    /// Reads the sheet at `path`, creating a header-only sheet if it is missing.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        if !path.exists() {
            let table = Self {
                path,
                rows: Vec::new(),
            };
            table.persist()?;
            info!(path = %table.path.display(), "created empty appointment sheet");
            return Ok(table);
        }
        let raw = read_text_file(path.as_path())?;
        let rows = decode_rows(path.as_path(), raw.as_str())?;
        debug!(path = %path.display(), rows = rows.len(), "loaded appointment sheet");
        Ok(Self { path, rows })
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    pub fn all(&self) -> &[Appointment] {
        self.rows.as_slice()
    }

    pub fn get(&self, index: usize) -> Option<&Appointment> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn add(&mut self, record: NewAppointment) -> Result<usize, TableError> {
        validate(
            record.patient.as_str(),
            record.date.as_str(),
            record.time.as_str(),
        )?;
        self.rows.push(Appointment {
            patient: record.patient.trim().to_string(),
            date: record.date.trim().to_string(),
            time: record.time.trim().to_string(),
            reason: reason_or_default(record.reason.as_str()),
            status: Status::Scheduled,
        });
        let index = self.rows.len() - 1;
        if let Err(err) = self.persist() {
            self.rows.pop();
            return Err(err.into());
        }
        info!(index, "appointment scheduled");
        Ok(index)
    }

    /// Moves the appointment at `index`. A blank or absent `reason` keeps
    /// the current one.
    pub fn reschedule(
        &mut self,
        index: usize,
        date: &str,
        time: &str,
        reason: Option<&str>,
    ) -> Result<(), TableError> {
        self.check_index(index)?;
        validate_slot(date, time)?;
        let previous = self.rows[index].clone();
        let row = &mut self.rows[index];
        row.date = date.trim().to_string();
        row.time = time.trim().to_string();
        if let Some(reason) = reason.map(str::trim).filter(|value| !value.is_empty()) {
            row.reason = reason.to_string();
        }
        row.status = Status::Rescheduled;
        if let Err(err) = self.persist() {
            self.rows[index] = previous;
            return Err(err.into());
        }
        info!(index, "appointment rescheduled");
        Ok(())
    }

    pub fn delete(&mut self, index: usize) -> Result<Appointment, TableError> {
        self.check_index(index)?;
        let removed = self.rows.remove(index);
        if let Err(err) = self.persist() {
            self.rows.insert(index, removed);
            return Err(err.into());
        }
        info!(index, remaining = self.rows.len(), "appointment deleted");
        Ok(removed)
    }

    /// Overwrites the sheet with the full collection.
    pub fn persist(&self) -> Result<(), StorageError> {
        let cells: Vec<Vec<&str>> = self.rows.iter().map(Appointment::to_cells).collect();
        let content = rows_to_csv(&SHEET_COLUMNS, cells.as_slice());
        write_text_file(self.path.as_path(), content.as_str())?;
        debug!(
            path = %self.path.display(),
            rows = self.rows.len(),
            bytes = content.len(),
            "appointment sheet written"
        );
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), TableError> {
        if index >= self.rows.len() {
            return Err(TableError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(())
    }
}

fn decode_rows(path: &Path, raw: &str) -> Result<Vec<Appointment>, StorageError> {
    let corrupt = |line: usize, reason: String| StorageError::Corrupt {
        path: path.to_path_buf(),
        line,
        reason,
    };
    // Spreadsheet programs may prepend a byte-order mark when saving.
    let raw = raw.trim_start_matches('\u{feff}');
    let mut rows = csv_to_rows(raw).map_err(|err| corrupt(err.line, err.reason))?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let header = rows.remove(0);
    let header_cells: Vec<&str> = header.cells.iter().map(|cell| cell.trim()).collect();
    if header_cells != SHEET_COLUMNS {
        return Err(corrupt(
            header.line,
            format!("expected header {}", SHEET_COLUMNS.join(",")),
        ));
    }

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if row.cells.len() > SHEET_COLUMNS.len() {
            return Err(corrupt(
                row.line,
                format!("expected {} cells, found {}", SHEET_COLUMNS.len(), row.cells.len()),
            ));
        }
        let mut cells = row.cells;
        cells.resize(SHEET_COLUMNS.len(), String::new());
        let Some(status) = Status::parse(cells[4].as_str()) else {
            return Err(corrupt(row.line, format!("unknown status {:?}", cells[4])));
        };
        let mut cells = cells.into_iter();
        out.push(Appointment {
            patient: cells.next().unwrap_or_default(),
            date: cells.next().unwrap_or_default(),
            time: cells.next().unwrap_or_default(),
            reason: cells.next().unwrap_or_default(),
            status,
        });
    }
    Ok(out)
}
