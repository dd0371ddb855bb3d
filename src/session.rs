use chrono::Local;
use tracing::{info, warn};

use crate::appointment::{Appointment, NewAppointment};
use crate::credentials::CredentialStore;
use crate::error::{Field, SessionError, TableError};
use crate::storage::StoragePaths;
use crate::table::AppointmentTable;

/// Entry point before login: knows where files live and checks credentials.
#[derive(Debug, Clone)]
pub struct Desk {
    paths: StoragePaths,
    credentials: CredentialStore,
}

impl Desk {
    /// A credential store that cannot be seeded is kept anyway; every login
    /// then fails instead of the process exiting.
    pub fn open(paths: StoragePaths) -> Self {
        let credentials = match CredentialStore::open(paths.users()) {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, "could not seed credential store");
                CredentialStore::new(paths.users())
            }
        };
        Self { paths, credentials }
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn login(&self, username: &str, password: &str) -> Result<Session, SessionError> {
        if username.trim().is_empty() {
            return Err(SessionError::MissingField(Field::Username));
        }
        if password.is_empty() {
            return Err(SessionError::MissingField(Field::Password));
        }
        let Some(display_name) = self.credentials.verify(username, password) else {
            warn!(username, "login rejected");
            return Err(SessionError::AuthenticationFailed);
        };
        let table = AppointmentTable::load(self.paths.appointments())?;
        info!(username, rows = table.len(), "session started");
        Ok(Session::new(display_name, table))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentForm {
    pub patient: String,
    pub date: String,
    pub time: String,
    pub reason: String,
}

impl AppointmentForm {
    /// A cleared form: every field empty except today's date.
    pub fn blank() -> Self {
        let mut form = Self::default();
        form.clear();
        form
    }

    pub fn clear(&mut self) {
        self.patient.clear();
        self.time.clear();
        self.reason.clear();
        self.date = Local::now().date_naive().format("%Y-%m-%d").to_string();
    }

    pub fn populate(&mut self, record: &Appointment) {
        self.patient = record.patient.clone();
        self.date = record.date.clone();
        self.time = record.time.clone();
        self.reason = record.reason.clone();
    }

    fn to_new_appointment(&self) -> NewAppointment {
        NewAppointment::new(
            self.patient.as_str(),
            self.date.as_str(),
            self.time.as_str(),
            self.reason.as_str(),
        )
    }
}

/// Logged-in state. Created by [`Desk::login`]; dropping it logs out.
#[derive(Debug)]
pub struct Session {
    display_name: String,
    table: AppointmentTable,
    form: AppointmentForm,
    selection: Option<usize>,
}

impl Session {
    fn new(display_name: String, table: AppointmentTable) -> Self {
        Self {
            display_name,
            table,
            form: AppointmentForm::blank(),
            selection: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    pub fn appointments(&self) -> &[Appointment] {
        self.table.all()
    }

    pub fn form(&self) -> &AppointmentForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut AppointmentForm {
        &mut self.form
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    /// Selects a row and copies it into the form.
    pub fn select(&mut self, index: usize) -> Result<(), SessionError> {
        let Some(record) = self.table.get(index) else {
            return Err(TableError::IndexOutOfRange {
                index,
                len: self.table.len(),
            }
            .into());
        };
        self.form.populate(record);
        self.selection = Some(index);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.form.clear();
        self.selection = None;
    }

    pub fn schedule(&mut self) -> Result<usize, SessionError> {
        let outcome = self.table.add(self.form.to_new_appointment());
        self.settle(outcome)
    }

    pub fn reschedule(&mut self) -> Result<usize, SessionError> {
        let index = self.selection.ok_or(SessionError::NoSelection)?;
        let outcome = self.table.reschedule(
            index,
            self.form.date.as_str(),
            self.form.time.as_str(),
            Some(self.form.reason.as_str()),
        );
        self.settle(outcome.map(|()| index))
    }

    /// Deletes the selected row. The caller is responsible for confirming.
    pub fn delete(&mut self) -> Result<Appointment, SessionError> {
        let index = self.selection.ok_or(SessionError::NoSelection)?;
        let outcome = self.table.delete(index);
        self.settle(outcome)
    }

    /// Clears the form after success. A storage failure drops the selection
    /// so the row has to be picked again; validation failures keep both.
    fn settle<T>(&mut self, outcome: Result<T, TableError>) -> Result<T, SessionError> {
        match outcome {
            Ok(value) => {
                self.clear();
                Ok(value)
            }
            Err(err) => {
                if matches!(err, TableError::Storage(_)) {
                    self.selection = None;
                }
                Err(err.into())
            }
        }
    }

    pub fn logout(self) {
        info!(user = self.display_name.as_str(), "session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::Status;
    use crate::error::{StorageError, ValidationError};

    fn desk() -> (tempfile::TempDir, Desk) {
        let temp = tempfile::tempdir().unwrap();
        let desk = Desk::open(StoragePaths::new(temp.path()));
        (temp, desk)
    }

    fn fill(session: &mut Session, patient: &str, date: &str, time: &str, reason: &str) {
        let form = session.form_mut();
        form.patient = patient.to_string();
        form.date = date.to_string();
        form.time = time.to_string();
        form.reason = reason.to_string();
    }

    #[test]
    fn login_checks_fields_and_credentials() {
        let (_temp, desk) = desk();
        assert!(matches!(
            desk.login("", "x"),
            Err(SessionError::MissingField(Field::Username))
        ));
        assert!(matches!(
            desk.login("admin", ""),
            Err(SessionError::MissingField(Field::Password))
        ));
        assert!(matches!(
            desk.login("admin", "wrong"),
            Err(SessionError::AuthenticationFailed)
        ));
        let session = desk.login("admin", "admin123").unwrap();
        assert_eq!(session.display_name(), "Administrator");
        assert!(session.appointments().is_empty());
        assert!(desk.paths().appointments().exists());
    }

    #[test]
    fn cleared_form_defaults_to_today() {
        let form = AppointmentForm::blank();
        assert!(form.patient.is_empty());
        assert!(crate::validate::parse_date(form.date.as_str()).is_some());
    }

    #[test]
    fn actions_without_selection_are_rejected() {
        let (_temp, desk) = desk();
        let mut session = desk.login("doctor", "doctor123").unwrap();
        assert!(matches!(session.reschedule(), Err(SessionError::NoSelection)));
        assert!(matches!(session.delete(), Err(SessionError::NoSelection)));
    }

    #[test]
    fn schedule_select_reschedule_delete() {
        let (_temp, desk) = desk();
        let mut session = desk.login("admin", "admin123").unwrap();

        fill(&mut session, "Ana Torres", "2024-01-15", "2:30 PM", "");
        assert_eq!(session.schedule().unwrap(), 0);
        assert_eq!(session.form().patient, "");
        fill(&mut session, "Luis Rojas", "2024-01-16", "10:00", "Labs");
        assert_eq!(session.schedule().unwrap(), 1);

        session.select(0).unwrap();
        assert_eq!(session.form().patient, "Ana Torres");
        assert_eq!(session.form().reason, "General consultation");
        session.form_mut().time = "16:00".to_string();
        assert_eq!(session.reschedule().unwrap(), 0);
        assert_eq!(session.selection(), None);
        assert_eq!(session.appointments()[0].time, "16:00");
        assert_eq!(session.appointments()[0].status, Status::Rescheduled);

        session.select(0).unwrap();
        let removed = session.delete().unwrap();
        assert_eq!(removed.patient, "Ana Torres");
        assert_eq!(session.appointments().len(), 1);
        assert_eq!(session.appointments()[0].patient, "Luis Rojas");
        session.logout();

        let reopened = desk.login("admin", "admin123").unwrap();
        assert_eq!(reopened.appointments().len(), 1);
    }

    #[test]
    fn validation_errors_keep_the_form() {
        let (_temp, desk) = desk();
        let mut session = desk.login("admin", "admin123").unwrap();
        fill(&mut session, "Ana", "2024-01-15", "4:00", "");
        let err = session.schedule().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Table(TableError::Validation(ValidationError::BadTimeFormat))
        ));
        assert_eq!(session.form().time, "4:00");
    }

    #[test]
    fn username_is_verified_as_entered() {
        let (_temp, desk) = desk();
        assert!(matches!(
            desk.login(" admin", "admin123"),
            Err(SessionError::AuthenticationFailed)
        ));
        assert!(matches!(
            desk.login("   ", "admin123"),
            Err(SessionError::MissingField(Field::Username))
        ));
    }

    #[test]
    fn failed_write_drops_selection_and_keeps_rows() {
        let (_temp, desk) = desk();
        let mut session = desk.login("admin", "admin123").unwrap();
        for patient in ["Ana", "Luis", "Marta"] {
            fill(&mut session, patient, "2024-01-15", "14:30", "");
            session.schedule().unwrap();
        }
        let sheet = desk.paths().appointments();
        std::fs::remove_file(sheet.as_path()).unwrap();
        std::fs::create_dir(sheet.as_path()).unwrap();

        session.select(0).unwrap();
        let err = session.delete().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Table(TableError::Storage(StorageError::Write { .. }))
        ));
        assert_eq!(session.selection(), None);
        assert_eq!(session.appointments().len(), 3);
        assert!(matches!(session.delete(), Err(SessionError::NoSelection)));

        session.select(1).unwrap();
        session.form_mut().time = "16:00".to_string();
        assert!(session.reschedule().is_err());
        assert_eq!(session.selection(), None);
        assert_eq!(session.appointments()[1].time, "14:30");
        assert_eq!(session.appointments()[1].status, Status::Scheduled);

        fill(&mut session, "Pedro", "2024-01-16", "10:00", "");
        assert!(session.schedule().is_err());
        assert_eq!(session.appointments().len(), 3);
        assert_eq!(session.form().patient, "Pedro");

        std::fs::remove_dir(sheet.as_path()).unwrap();
        assert_eq!(session.schedule().unwrap(), 3);
        session.select(0).unwrap();
        assert_eq!(session.delete().unwrap().patient, "Ana");

        let names: Vec<String> = AppointmentTable::load(sheet)
            .unwrap()
            .all()
            .iter()
            .map(|row| row.patient.clone())
            .collect();
        assert_eq!(names, vec!["Luis", "Marta", "Pedro"]);
    }

    #[test]
    fn select_out_of_range_is_rejected() {
        let (_temp, desk) = desk();
        let mut session = desk.login("admin", "admin123").unwrap();
        assert!(matches!(
            session.select(0),
            Err(SessionError::Table(TableError::IndexOutOfRange { index: 0, len: 0 }))
        ));
    }
}
