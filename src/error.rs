use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Patient,
    Date,
    Time,
    Username,
    Password,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Patient => "Patient",
            Field::Date => "Date",
            Field::Time => "Time",
            Field::Username => "Username",
            Field::Password => "Password",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Fill in all required fields ({0} is empty)")]
    MissingField(Field),
    #[error("Incorrect date format. Use YYYY-MM-DD")]
    BadDateFormat,
    #[error("Incorrect time format. Use HH:MM or H:MM AM/PM (e.g. 14:30, 2:30 PM, 4:00 AM)")]
    BadTimeFormat,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} line {line}: {reason}", path.display())]
    Corrupt {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no appointment at row {index} (table has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Fill in all fields ({0} is empty)")]
    MissingField(Field),
    #[error("Invalid credentials")]
    AuthenticationFailed,
    #[error("Select an appointment first")]
    NoSelection,
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
