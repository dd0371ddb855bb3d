//! Line-oriented front end: a login screen followed by the appointment
//! screen. Reads commands from any `BufRead` so it can be scripted.

use std::io::{self, BufRead, Write};

use crate::appointment::{Appointment, SHEET_COLUMNS};
use crate::session::{Desk, Session};

const HELP: &str = "\
Commands:
  list                   show all appointments
  select <row>           load a row into the form
  form                   show the form
  set <field> <value>    field is patient, date, time or reason
  schedule               add the form as a new appointment
  reschedule             move the selected appointment to the form's date/time
  delete                 delete the selected appointment
  clear                  clear the form and selection
  logout                 return to the login screen
  quit                   exit";

enum Flow {
    Logout,
    Quit,
}

pub struct Shell<R, W> {
    desk: Desk,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(desk: Desk, input: R, output: W) -> Self {
        Self {
            desk,
            input,
            output,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn run(&mut self) -> io::Result<()> {
        loop {
            let Some(session) = self.login_screen()? else {
                return Ok(());
            };
            match self.main_screen(session)? {
                Flow::Logout => continue,
                Flow::Quit => return Ok(()),
            }
        }
    }

    fn login_screen(&mut self) -> io::Result<Option<Session>> {
        writeln!(self.output, "== Medical Appointment System ==")?;
        writeln!(self.output, "Test users: admin / admin123, doctor / doctor123")?;
        loop {
            let Some(username) = self.prompt("Username: ")? else {
                return Ok(None);
            };
            if username.trim() == "quit" {
                return Ok(None);
            }
            let Some(password) = self.prompt("Password: ")? else {
                return Ok(None);
            };
            match self.desk.login(username.as_str(), password.as_str()) {
                Ok(session) => {
                    writeln!(self.output, "Welcome, {}", session.display_name())?;
                    return Ok(Some(session));
                }
                Err(err) => self.notice("Error", err.to_string().as_str())?,
            }
        }
    }

    fn main_screen(&mut self, mut session: Session) -> io::Result<Flow> {
        self.render_table(&session)?;
        loop {
            let prompt = format!("[{}]> ", session.display_name());
            let Some(line) = self.prompt(prompt.as_str())? else {
                session.logout();
                return Ok(Flow::Quit);
            };
            let line = line.trim();
            let (command, rest) = match line.split_once(char::is_whitespace) {
                Some((command, rest)) => (command, rest.trim()),
                None => (line, ""),
            };
            match command {
                "" => {}
                "help" => writeln!(self.output, "{HELP}")?,
                "list" => self.render_table(&session)?,
                "form" => self.render_form(&session)?,
                "select" => self.select(&mut session, rest)?,
                "set" => self.set_field(&mut session, rest)?,
                "schedule" => match session.schedule() {
                    Ok(_) => {
                        self.notice("Success", "Appointment scheduled")?;
                        self.render_table(&session)?;
                    }
                    Err(err) => self.notice("Error", err.to_string().as_str())?,
                },
                "reschedule" => match session.reschedule() {
                    Ok(_) => {
                        self.notice("Success", "Appointment rescheduled")?;
                        self.render_table(&session)?;
                    }
                    Err(err) => self.notice("Warning", err.to_string().as_str())?,
                },
                "delete" => self.delete(&mut session)?,
                "clear" => {
                    session.clear();
                    self.render_form(&session)?;
                }
                "logout" => {
                    if self.confirm("Log out?")? {
                        session.logout();
                        return Ok(Flow::Logout);
                    }
                }
                "quit" | "exit" => {
                    session.logout();
                    return Ok(Flow::Quit);
                }
                other => {
                    let message = format!("Unknown command {other:?}; type help");
                    self.notice("Error", message.as_str())?;
                }
            }
        }
    }

    fn select(&mut self, session: &mut Session, arg: &str) -> io::Result<()> {
        let row = match arg.parse::<usize>() {
            Ok(value) if value >= 1 => value,
            _ => return self.notice("Error", "Usage: select <row number>"),
        };
        match session.select(row - 1) {
            Ok(()) => self.render_form(session),
            Err(err) => self.notice("Error", err.to_string().as_str()),
        }
    }

    fn set_field(&mut self, session: &mut Session, arg: &str) -> io::Result<()> {
        let (field, value) = match arg.split_once(char::is_whitespace) {
            Some((field, value)) => (field, value.trim()),
            None => (arg, ""),
        };
        let form = session.form_mut();
        let slot = match field {
            "patient" => &mut form.patient,
            "date" => &mut form.date,
            "time" => &mut form.time,
            "reason" => &mut form.reason,
            _ => return self.notice("Error", "Usage: set <patient|date|time|reason> <value>"),
        };
        *slot = value.to_string();
        Ok(())
    }

    fn delete(&mut self, session: &mut Session) -> io::Result<()> {
        let Some(record) = session.selection().and_then(|index| session.appointments().get(index))
        else {
            return self.notice("Warning", "Select an appointment to delete");
        };
        let question = format!(
            "Delete the appointment of {} on {} at {}?",
            record.patient, record.date, record.time
        );
        if !self.confirm(question.as_str())? {
            return Ok(());
        }
        match session.delete() {
            Ok(_) => {
                self.notice("Success", "Appointment deleted")?;
                self.render_table(session)
            }
            Err(err) => self.notice("Error", err.to_string().as_str()),
        }
    }

    fn render_table(&mut self, session: &Session) -> io::Result<()> {
        let rows = session.appointments();
        let mut widths: Vec<usize> = SHEET_COLUMNS.iter().map(|col| col.chars().count()).collect();
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(display_cells(row)) {
                *width = (*width).max(cell.chars().count());
            }
        }
        let number_width = rows.len().to_string().len().max(1);

        let header: Vec<String> = SHEET_COLUMNS.iter().map(|col| col.to_string()).collect();
        writeln!(
            self.output,
            "{:>number_width$}  {}",
            "#",
            pad_cells(header.as_slice(), widths.as_slice())
        )?;
        for (index, row) in rows.iter().enumerate() {
            let cells = display_cells(row);
            writeln!(
                self.output,
                "{:>number_width$}  {}",
                index + 1,
                pad_cells(cells.as_slice(), widths.as_slice())
            )?;
        }
        if rows.is_empty() {
            writeln!(self.output, "(no appointments)")?;
        }
        Ok(())
    }

    fn render_form(&mut self, session: &Session) -> io::Result<()> {
        let form = session.form();
        let selected = match session.selection() {
            Some(index) => format!("row {}", index + 1),
            None => "none".to_string(),
        };
        writeln!(self.output, "Patient: {}", form.patient)?;
        writeln!(self.output, "Date:    {}", form.date)?;
        writeln!(self.output, "Time:    {}", form.time)?;
        writeln!(self.output, "Reason:  {}", form.reason)?;
        writeln!(self.output, "Selected: {selected}")?;
        Ok(())
    }

    fn notice(&mut self, kind: &str, message: &str) -> io::Result<()> {
        writeln!(self.output, "{kind}: {message}")
    }

    fn confirm(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.prompt(format!("{question} [y/N] ").as_str())?;
        Ok(matches!(
            answer.as_deref().map(str::trim),
            Some("y") | Some("Y") | Some("yes")
        ))
    }

    /// `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }
}

fn display_cells(row: &Appointment) -> Vec<String> {
    row.to_cells()
        .into_iter()
        .map(|cell| cell.replace(['\r', '\n'], " "))
        .collect()
}

fn pad_cells(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;

    fn run_script(root: &std::path::Path, script: &str) -> String {
        let desk = Desk::open(StoragePaths::new(root));
        let mut shell = Shell::new(desk, script.as_bytes(), Vec::new());
        shell.run().unwrap();
        String::from_utf8(shell.into_output()).unwrap()
    }

    #[test]
    fn rejects_bad_credentials_then_logs_in() {
        let temp = tempfile::tempdir().unwrap();
        let out = run_script(temp.path(), "admin\nnope\nadmin\nadmin123\nquit\n");
        assert!(out.contains("Error: Invalid credentials"));
        assert!(out.contains("Welcome, Administrator"));
        assert!(out.contains("(no appointments)"));
    }

    #[test]
    fn delete_requires_confirmation() {
        let temp = tempfile::tempdir().unwrap();
        let script = "\
doctor
doctor123
set patient Ana Torres
set date 2024-01-15
set time 2:30 PM
schedule
select 1
delete
n
list
select 1
delete
y
quit
";
        let out = run_script(temp.path(), script);
        assert!(out.contains("Success: Appointment scheduled"));
        assert_eq!(out.matches("Success: Appointment deleted").count(), 1);
        assert!(out.contains("1  Ana Torres  2024-01-15  2:30 PM  General consultation  Scheduled"));
        assert_eq!(
            out.matches("Delete the appointment of Ana Torres on 2024-01-15 at 2:30 PM? [y/N] ")
                .count(),
            2
        );
        assert!(out.ends_with("(no appointments)\n[Dr. García]> "));
    }

    #[test]
    fn reports_missing_selection_and_unknown_commands() {
        let temp = tempfile::tempdir().unwrap();
        let out = run_script(temp.path(), "admin\nadmin123\nreschedule\ndelete\nfrobnicate\n");
        assert!(out.contains("Warning: Select an appointment first"));
        assert!(out.contains("Warning: Select an appointment to delete"));
        assert!(out.contains("Error: Unknown command \"frobnicate\""));
    }

    #[test]
    fn logout_returns_to_login_screen() {
        let temp = tempfile::tempdir().unwrap();
        let out = run_script(temp.path(), "admin\nadmin123\nlogout\ny\nquit\n");
        assert_eq!(out.matches("== Medical Appointment System ==").count(), 2);
    }
}
