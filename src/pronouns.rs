//! Pronoun and name substitution for comment templates.
//!
//! Templates carry four placeholder markers: `XE` (subject), `XIM` (object),
//! `XIS` (possessive) and `NAME` (the student's name). [`resolve`] replaces
//! them for a given [`Gender`] and name, then applies sentence capitalization.
//!
//! To keep long runs of pronouns readable, every third occurrence of a marker
//! type renders as the student's name instead of the pronoun. The per-type
//! counters reset whenever a literal `NAME` marker appears in the text.

use regex::Regex;
use std::sync::OnceLock;

/// How often a pronoun marker renders as the name instead (every Nth occurrence).
pub const NAME_PERIOD: usize = 3;

/// Gender used to pick pronoun forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Neutral,
}

impl Gender {
    /// Derive a gender from a roster `SEX` field: first character, uppercased.
    /// Anything other than `M` or `F` is treated as neutral.
    pub fn from_sex_field(field: &str) -> Self {
        match field.trim().chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('M') => Gender::Male,
            Some('F') => Gender::Female,
            _ => Gender::Neutral,
        }
    }

    /// Subject pronoun (`XE`).
    pub fn subject(self) -> &'static str {
        match self {
            Gender::Male => "he",
            Gender::Female => "she",
            Gender::Neutral => "they",
        }
    }

    /// Object pronoun (`XIM`).
    pub fn object(self) -> &'static str {
        match self {
            Gender::Male => "him",
            Gender::Female => "her",
            Gender::Neutral => "them",
        }
    }

    /// Possessive pronoun (`XIS`).
    pub fn possessive(self) -> &'static str {
        match self {
            Gender::Male => "his",
            Gender::Female => "her",
            Gender::Neutral => "their",
        }
    }

    /// Short display label, e.g. `he/him`.
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "he/him",
            Gender::Female => "she/her",
            Gender::Neutral => "they/them",
        }
    }
}

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(NAME|XIS|XIM|XE)\b").expect("marker pattern is valid"))
}

/// Replace all placeholder markers in `text` and capitalize sentence starts.
///
/// Pure and deterministic; an empty input comes back empty.
pub fn resolve(text: &str, gender: Gender, name: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    capitalize_sentences(&substitute(text, gender, name))
}

/// The substitution pass: a single left-to-right scan over marker occurrences.
///
/// Per-type counters decide the periodic name substitution; they all reset on
/// a literal `NAME` marker. Replacements are not rescanned.
fn substitute(text: &str, gender: Gender, name: &str) -> String {
    let display_name = capitalize_first(name);
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    // occurrence counts per marker type: XE, XIM, XIS
    let mut counts = [0usize; 3];

    for m in marker_regex().find_iter(text) {
        out.push_str(&text[last..m.start()]);
        last = m.end();

        match m.as_str() {
            "NAME" => {
                counts = [0; 3];
                out.push_str(&display_name);
            }
            "XE" => {
                counts[0] += 1;
                if counts[0] % NAME_PERIOD == 0 {
                    out.push_str(&display_name);
                } else {
                    out.push_str(gender.subject());
                }
            }
            "XIM" => {
                counts[1] += 1;
                if counts[1] % NAME_PERIOD == 0 {
                    out.push_str(&display_name);
                } else {
                    out.push_str(gender.object());
                }
            }
            "XIS" => {
                counts[2] += 1;
                if counts[2] % NAME_PERIOD == 0 {
                    out.push_str(&display_name);
                    out.push_str("'s");
                } else {
                    out.push_str(gender.possessive());
                }
            }
            _ => unreachable!("marker regex only matches the four markers"),
        }
    }

    out.push_str(&text[last..]);
    out
}

/// Uppercase the first character of the string and of any word that follows
/// whitespace preceded by `.`, `?`, `!` or `)`. Everything else is untouched.
fn capitalize_sentences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = true; // capitalize the next word start
    let mut boundary = false; // last non-whitespace char ended a sentence

    for ch in text.chars() {
        if ch.is_whitespace() {
            if boundary {
                pending = true;
                boundary = false;
            }
            out.push(ch);
            continue;
        }
        if pending {
            out.extend(ch.to_uppercase());
            pending = false;
        } else {
            out.push(ch);
        }
        boundary = matches!(ch, '.' | '?' | '!' | ')');
    }

    out
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
