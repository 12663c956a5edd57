//! Student records and roster file ingestion.
//!
//! The roster is a delimited text export: the first line is a numbering row
//! and is skipped, the second line carries the column headings. Headings are
//! normalized (trimmed, uppercased) and the `FIRST NAME`, `LAST NAME` and
//! `SEX` columns are required.

use eyre::{Result, eyre};
use log::debug;

use crate::pronouns::Gender;

/// One student being written up.
#[derive(Debug, Clone)]
pub struct Student {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    /// Selected comment templates, in presentation order.
    pub comments: Vec<String>,
}

impl Student {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, gender: Gender) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            gender,
            comments: Vec::new(),
        }
    }

    /// Pop the comment at `from` and reinsert it at `to` (both 0-based).
    /// Returns false without touching anything when either index is invalid.
    pub fn move_comment(&mut self, from: usize, to: usize) -> bool {
        if from >= self.comments.len() || to >= self.comments.len() {
            return false;
        }
        let comment = self.comments.remove(from);
        self.comments.insert(to, comment);
        true
    }
}

/// Parse roster content into students, in roster order.
pub fn parse_roster(content: &str) -> Result<Vec<Student>> {
    let mut lines = content.lines();
    lines.next(); // numbering row
    let header = lines.next().ok_or_else(|| eyre!("roster has no header row"))?;

    let columns: Vec<String> = split_fields(header)
        .iter()
        .map(|c| c.trim().to_uppercase())
        .collect();
    let first_idx = column_index(&columns, "FIRST NAME")?;
    let last_idx = column_index(&columns, "LAST NAME")?;
    let sex_idx = column_index(&columns, "SEX")?;

    let mut students = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_fields(line);
        let cell = |idx: usize| fields.get(idx).map(|f| f.trim()).unwrap_or("");
        students.push(Student::new(
            cell(first_idx),
            cell(last_idx),
            Gender::from_sex_field(cell(sex_idx)),
        ));
    }

    debug!("parsed {} students from roster", students.len());
    Ok(students)
}

fn column_index(columns: &[String], name: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| c == name)
        .ok_or_else(|| eyre!("roster is missing a '{name}' column"))
}

/// Split one comma-delimited line, honoring double-quoted fields.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}
