//! Rendering a student's selected comments.
//!
//! Both renderers are pure projections of `student.comments`; pronoun
//! counters run across the whole list, so name substitution stays periodic
//! over the full paragraph rather than resetting per comment.

use crate::pronouns;
use crate::roster::Student;

/// Indexed preview for the editing session: one `[n]` tagged line per
/// comment, pronoun-resolved for the student.
pub fn preview(student: &Student) -> String {
    if student.comments.is_empty() {
        return String::new();
    }
    let tagged: Vec<String> = student
        .comments
        .iter()
        .enumerate()
        .map(|(i, c)| format!("[{}] {}", i + 1, c))
        .collect();
    pronouns::resolve(&tagged.join("\n"), student.gender, &student.first_name)
}

/// Final paragraph for the report file: comments joined by single spaces,
/// pronoun-resolved and capitalized.
pub fn finalize(student: &Student) -> String {
    pronouns::resolve(
        &student.comments.join(" "),
        student.gender,
        &student.first_name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pronouns::Gender;

    fn student_with(comments: &[&str]) -> Student {
        let mut s = Student::new("sam", "Smith", Gender::Male);
        s.comments = comments.iter().map(|c| c.to_string()).collect();
        s
    }

    #[test]
    fn test_preview_tags_positions() {
        let s = student_with(&["XE works hard.", "NAME is improving."]);
        let got = preview(&s);
        assert_eq!(got, "[1] he works hard.\n[2] Sam is improving.");
    }

    #[test]
    fn test_preview_empty() {
        assert_eq!(preview(&student_with(&[])), "");
    }

    #[test]
    fn test_finalize_joins_with_spaces() {
        let s = student_with(&["XE works hard.", "XIS effort shows."]);
        assert_eq!(finalize(&s), "He works hard. His effort shows.");
    }

    #[test]
    fn test_finalize_counters_span_comments() {
        // third XE overall renders as the name even though it sits in the
        // third comment
        let s = student_with(&["XE reads.", "XE writes.", "XE listens."]);
        assert_eq!(finalize(&s), "He reads. He writes. Sam listens.");
    }

    #[test]
    fn test_neither_render_mutates_student() {
        let s = student_with(&["XE works."]);
        let before = s.comments.clone();
        let _ = preview(&s);
        let _ = finalize(&s);
        assert_eq!(s.comments, before);
    }
}
