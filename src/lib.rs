pub mod appointment;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod session;
pub mod sheet;
pub mod shell;
pub mod storage;
pub mod table;
pub mod validate;

pub use appointment::{Appointment, NewAppointment, Status, DEFAULT_REASON};
pub use credentials::{hash_password, CredentialStore};
pub use error::{Field, SessionError, StorageError, TableError, ValidationError};
pub use session::{AppointmentForm, Desk, Session};
pub use shell::Shell;
pub use storage::StoragePaths;
pub use table::AppointmentTable;
pub use validate::{validate, validate_slot};
