pub const DEFAULT_REASON: &str = "General consultation";
pub const SHEET_COLUMNS: [&str; 5] = ["Patient", "Date", "Time", "Reason", "Status"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Scheduled,
    Rescheduled,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Scheduled => "Scheduled",
            Status::Rescheduled => "Rescheduled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Some(Status::Scheduled),
            "rescheduled" => Some(Status::Rescheduled),
            _ => None,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub patient: String,
    pub date: String,
    pub time: String,
    pub reason: String,
    pub status: Status,
}

impl Appointment {
    pub fn to_cells(&self) -> Vec<&str> {
        vec![
            self.patient.as_str(),
            self.date.as_str(),
            self.time.as_str(),
            self.reason.as_str(),
            self.status.as_str(),
        ]
    }
}

/// Input for scheduling; status is always assigned by the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAppointment {
    pub patient: String,
    pub date: String,
    pub time: String,
    pub reason: String,
}

impl NewAppointment {
    pub fn new(patient: &str, date: &str, time: &str, reason: &str) -> Self {
        Self {
            patient: patient.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub fn reason_or_default(reason: &str) -> String {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        DEFAULT_REASON.to_string()
    } else {
        trimmed.to_string()
    }
}
