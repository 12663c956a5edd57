//! markbook - interactive report card comment generator
//!
//! Assembles free-text report-card comments per student from a library of
//! reusable, categorized templates, substituting pronouns and the student's
//! name into each one.
//!
//! # Template file format
//!
//! ```text
//! a template before any header lands in GENERAL
//! #EFFORT
//! XE works hard and applies XIM to every task.
//! #MATH
//! NAME has mastered XIS number facts.
//! ```
//!
//! `XE`/`XIM`/`XIS` are the subject/object/possessive pronoun markers and
//! `NAME` is the student's name. The file is rewritten in place on edits,
//! with a `_bu` backup taken first.
//!
//! # Modules
//!
//! - [`pronouns`] - pronoun/name substitution and sentence capitalization
//! - [`store`] - category-indexed template store over the backing file
//! - [`compose`] - preview and final rendering of a student's comments
//! - [`session`] - interactive per-student editing state machine
//! - [`roster`] - student records and roster ingestion
//! - [`report`] - report file output
//! - [`config`], [`cli`] - configuration and command line

pub mod cli;
pub mod compose;
pub mod config;
pub mod pronouns;
pub mod report;
pub mod roster;
pub mod session;
pub mod store;

pub use compose::{finalize, preview};
pub use pronouns::{Gender, NAME_PERIOD, resolve};
pub use roster::{Student, parse_roster};
pub use session::{Console, Outcome, Session, TermConsole};
pub use store::{BACKUP_SUFFIX, Category, IMPLICIT_CATEGORY, StoreError, TemplateStore};
