//! Writing finalized comments to the report file.

use std::fs;
use std::path::Path;

use eyre::{Context, Result};
use log::info;

use crate::compose;
use crate::roster::Student;

/// One report entry: `FIRSTNAME LASTNAME` uppercased, the finalized
/// paragraph, then a blank separator line.
pub fn render_entry(student: &Student) -> String {
    format!(
        "{} {}\n{}\n\n",
        student.first_name.to_uppercase(),
        student.last_name.to_uppercase(),
        compose::finalize(student)
    )
}

/// Rewrite the report file with the given entries plus, optionally, the
/// student currently being edited.
pub fn save(path: &Path, done: &[String], current: Option<&Student>) -> Result<()> {
    let mut out = String::new();
    for entry in done {
        out.push_str(entry);
    }
    if let Some(student) = current {
        out.push_str(&render_entry(student));
    }
    fs::write(path, out).context(format!("Failed to write report file: {}", path.display()))?;
    info!(
        "saved {} report entries to {}",
        done.len() + current.is_some() as usize,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pronouns::Gender;
    use tempfile::TempDir;

    #[test]
    fn test_render_entry_format() {
        let mut s = Student::new("sam", "Smith", Gender::Male);
        s.comments = vec!["XE works hard.".into()];
        assert_eq!(render_entry(&s), "SAM SMITH\nHe works hard.\n\n");
    }

    #[test]
    fn test_save_appends_current() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("reports.txt");

        let mut a = Student::new("Ada", "Jones", Gender::Female);
        a.comments = vec!["NAME did well.".into()];
        let mut b = Student::new("Kim", "Lee", Gender::Neutral);
        b.comments = vec!["XE improved.".into()];

        save(&path, &[render_entry(&a)], Some(&b)).unwrap();

        let got = fs::read_to_string(&path).unwrap();
        assert_eq!(got, "ADA JONES\nAda did well.\n\nKIM LEE\nThey improved.\n\n");
    }

    #[test]
    fn test_save_rewrites_whole_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("reports.txt");
        fs::write(&path, "stale content").unwrap();

        save(&path, &[], None).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
