//! Comma-separated sheet encoding used for the appointment file.
//!
//! Cells that a spreadsheet would evaluate as a formula are written with a
//! leading `'` and restored on read, so the file can be opened in a
//! spreadsheet program without executing anything and still round-trips.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub line: usize,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetError {
    pub line: usize,
    pub reason: String,
}

fn should_neutralize_csv(value: &str) -> bool {
    matches!(
        value.trim_start().chars().next(),
        Some('=') | Some('+') | Some('-') | Some('@') | Some('\'')
    )
}

fn neutralize_csv_formula(value: &str) -> String {
    if should_neutralize_csv(value) {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

fn restore_csv_formula(value: String) -> String {
    match value.strip_prefix('\'') {
        Some(rest) => rest.to_string(),
        None => value,
    }
}

fn csv_escape(value: &str) -> String {
    let safe = neutralize_csv_formula(value);
    if safe.contains(',') || safe.contains('"') || safe.contains('\n') || safe.contains('\r') {
        format!("\"{}\"", safe.replace('"', "\"\""))
    } else {
        safe
    }
}

fn row_to_line<S: AsRef<str>>(cells: &[S]) -> String {
    cells
        .iter()
        .map(|cell| csv_escape(cell.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn rows_to_csv<H: AsRef<str>, S: AsRef<str>>(columns: &[H], rows: &[Vec<S>]) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(rows.len() + 1);
    lines.push(row_to_line(columns));
    for row in rows {
        lines.push(row_to_line(row.as_slice()));
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Splits sheet text into rows. Blank lines are skipped; `line` is the
/// 1-based line on which each row starts.
pub fn csv_to_rows(text: &str) -> Result<Vec<SheetRow>, SheetError> {
    let mut rows = Vec::new();
    let mut cells: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut row_has_content = false;
    let mut line = 1;
    let mut row_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        cell.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                '\n' => {
                    line += 1;
                    cell.push(ch);
                }
                _ => cell.push(ch),
            }
            continue;
        }

        match ch {
            '"' if cell.is_empty() => {
                in_quotes = true;
                row_has_content = true;
            }
            ',' => {
                cells.push(restore_csv_formula(std::mem::take(&mut cell)));
                row_has_content = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\r' | '\n' => {
                if row_has_content {
                    cells.push(restore_csv_formula(std::mem::take(&mut cell)));
                    rows.push(SheetRow {
                        line: row_line,
                        cells: std::mem::take(&mut cells),
                    });
                }
                row_has_content = false;
                line += 1;
                row_line = line;
            }
            _ => {
                cell.push(ch);
                row_has_content = true;
            }
        }
    }

    if in_quotes {
        return Err(SheetError {
            line: row_line,
            reason: "unterminated quoted cell".to_string(),
        });
    }
    if row_has_content {
        cells.push(restore_csv_formula(cell));
        rows.push(SheetRow {
            line: row_line,
            cells,
        });
    }
    Ok(rows)
}
