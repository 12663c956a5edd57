//! Interactive per-student editing session.
//!
//! A small state machine: `Browsing` picks a category or a global action,
//! `CategoryOpen` picks a template or a category-local action. Bad input is
//! never fatal; the current prompt is simply shown again.

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::compose;
use crate::pronouns::Gender;
use crate::roster::Student;
use crate::store::TemplateStore;

/// Where session I/O goes. The binary wraps rustyline and stdout; tests
/// drive the machine with a scripted console instead.
pub trait Console {
    fn write_line(&mut self, line: &str);

    /// Read one line of input. `None` means end of input (Ctrl+D).
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Rustyline-backed console for the terminal.
pub struct TermConsole {
    editor: DefaultEditor,
}

impl TermConsole {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl Console for TermConsole {
    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }

    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = self.editor.add_history_entry(line.trim());
                    }
                    return Ok(Some(line));
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C - show the prompt again
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(err) => return Err(eyre::eyre!("Readline error: {}", err)),
            }
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Move on to the next student.
    Next,
    /// Stop editing entirely.
    Quit,
}

#[derive(Clone, Copy)]
enum State {
    Browsing,
    CategoryOpen(usize),
}

/// Drives the editing workflow for one student at a time over a shared
/// template store.
pub struct Session<'a, C: Console> {
    store: &'a mut TemplateStore,
    console: &'a mut C,
}

impl<'a, C: Console> Session<'a, C> {
    pub fn new(store: &'a mut TemplateStore, console: &'a mut C) -> Self {
        Self { store, console }
    }

    /// Run the session for `student`. `save` is called with the student on
    /// every save command (`s`, `x`, `q`) and must persist all finished
    /// reports plus this one.
    pub fn run(
        &mut self,
        student: &mut Student,
        mut save: impl FnMut(&Student) -> Result<()>,
    ) -> Result<Outcome> {
        let mut state = State::Browsing;

        loop {
            match state {
                State::Browsing => {
                    self.show_overview(student);
                    let Some(input) = self.console.read_line("> ")? else {
                        save(student)?;
                        return Ok(Outcome::Quit);
                    };
                    let input = input.trim().to_lowercase();

                    match input.as_str() {
                        "" => continue,
                        "c" => self.custom_comment(student)?,
                        "g" => self.change_gender(student)?,
                        "n" => self.change_name(student)?,
                        "r" => self.remove_comment(student)?,
                        "m" => self.move_comment(student)?,
                        "s" => {
                            save(student)?;
                            self.console.write_line(&format!("{} Saved.", "✓".green()));
                        }
                        "x" => {
                            save(student)?;
                            return Ok(Outcome::Next);
                        }
                        "q" => {
                            save(student)?;
                            return Ok(Outcome::Quit);
                        }
                        other => match other.parse::<usize>() {
                            Ok(n) if n >= 1 && n <= self.store.categories().len() => {
                                state = State::CategoryOpen(n - 1);
                            }
                            Ok(n) => self.error(&format!("No category numbered {n}.")),
                            Err(_) => self.error(&format!("Unrecognized command: {other}")),
                        },
                    }
                }
                State::CategoryOpen(idx) => {
                    self.show_category(idx);
                    let Some(input) = self.console.read_line("> ")? else {
                        save(student)?;
                        return Ok(Outcome::Quit);
                    };
                    let input = input.trim().to_lowercase();

                    match input.as_str() {
                        "" => continue,
                        "b" => state = State::Browsing,
                        "a" => {
                            self.add_template(student, idx)?;
                            state = State::Browsing;
                        }
                        "r" => {
                            self.remove_template(idx)?;
                            state = State::Browsing;
                        }
                        other => match other.parse::<usize>() {
                            Ok(n) => {
                                let cat = &self.store.categories()[idx];
                                if n >= 1 && n <= cat.templates.len() {
                                    student.comments.push(cat.templates[n - 1].clone());
                                    self.console
                                        .write_line(&format!("{} Comment added.", "✓".green()));
                                    state = State::Browsing;
                                } else {
                                    self.error(&format!("No template numbered {n}."));
                                }
                            }
                            Err(_) => self.error(&format!("Unrecognized command: {other}")),
                        },
                    }
                }
            }
        }
    }

    fn show_overview(&mut self, student: &Student) {
        self.console.write_line("");
        self.console.write_line(&format!(
            "{} ({})",
            format!("=== {} {} ===", student.first_name, student.last_name)
                .bright_cyan()
                .bold(),
            student.gender.label()
        ));

        let rendered = compose::preview(student);
        if rendered.is_empty() {
            self.console.write_line(&"No comments yet.".dimmed().to_string());
        } else {
            self.console.write_line(&rendered);
        }

        self.console.write_line("");
        self.console.write_line(&"Categories:".bright_cyan().to_string());
        for (i, cat) in self.store.categories().iter().enumerate() {
            self.console
                .write_line(&format!("  {}. {} ({})", i + 1, cat.name, cat.templates.len()));
        }
        self.console.write_line(&format!(
            "Commands: {} open category | {} custom | {} remove | {} move | {} gender | {} name | {} save | {} next | {} quit",
            "#".yellow(),
            "c".yellow(),
            "r".yellow(),
            "m".yellow(),
            "g".yellow(),
            "n".yellow(),
            "s".yellow(),
            "x".yellow(),
            "q".yellow(),
        ));
    }

    fn show_category(&mut self, idx: usize) {
        let cat = &self.store.categories()[idx];
        self.console.write_line("");
        self.console
            .write_line(&format!("--- {} ---", cat.name).bright_cyan().to_string());
        if cat.templates.is_empty() {
            self.console
                .write_line(&"No templates in this category.".dimmed().to_string());
        }
        let lines: Vec<String> = cat
            .templates
            .iter()
            .enumerate()
            .map(|(i, t)| format!("  {}. {}", i + 1, t))
            .collect();
        for line in lines {
            self.console.write_line(&line);
        }
        self.console.write_line(&format!(
            "Commands: {} pick template | {} add template | {} remove template | {} back",
            "#".yellow(),
            "a".yellow(),
            "r".yellow(),
            "b".yellow(),
        ));
    }

    /// Free-text comment for this student only. No category means there is
    /// nothing to persist to the template store.
    fn custom_comment(&mut self, student: &mut Student) -> Result<()> {
        self.new_comment(student, None)
    }

    /// Prompt for comment text and append it to the student. With a category
    /// given, offer to persist the text to the library as well; a declined or
    /// failed library write still leaves the student's comment in place.
    fn new_comment(&mut self, student: &mut Student, category: Option<usize>) -> Result<()> {
        let prompt = if category.is_some() {
            "New template text: "
        } else {
            "Comment text: "
        };
        let Some(text) = self.console.read_line(prompt)? else {
            return Ok(());
        };
        let text = text.trim().to_string();
        if text.is_empty() {
            self.console.write_line(&"Cancelled.".dimmed().to_string());
            return Ok(());
        }

        student.comments.push(text.clone());
        self.console
            .write_line(&format!("{} Comment added.", "✓".green()));

        let Some(idx) = category else {
            return Ok(());
        };
        let name = self.store.categories()[idx].name.clone();
        if self.confirm(&format!("Save to library under '{name}'? [y/N]: "))? {
            match self.store.insert(&name, &text) {
                Ok(()) => self
                    .console
                    .write_line(&format!("{} Saved to '{}'.", "✓".green(), name)),
                Err(err) => self.error(&format!("Not saved to library: {err}")),
            }
        }
        Ok(())
    }

    fn change_gender(&mut self, student: &mut Student) -> Result<()> {
        let Some(input) = self.console.read_line("Gender (m/f/n): ")? else {
            return Ok(());
        };
        if input.trim().is_empty() {
            return Ok(());
        }
        student.gender = Gender::from_sex_field(&input);
        self.console
            .write_line(&format!("{} Now using {}.", "✓".green(), student.gender.label()));
        Ok(())
    }

    fn change_name(&mut self, student: &mut Student) -> Result<()> {
        let Some(input) = self.console.read_line("First name: ")? else {
            return Ok(());
        };
        let name = input.trim();
        if name.is_empty() {
            return Ok(());
        }
        student.first_name = name.to_string();
        self.console
            .write_line(&format!("{} Renamed to {}.", "✓".green(), student.first_name));
        Ok(())
    }

    fn remove_comment(&mut self, student: &mut Student) -> Result<()> {
        if student.comments.is_empty() {
            self.error("No comments to remove.");
            return Ok(());
        }
        let Some(input) = self
            .console
            .read_line("Remove which comment (number, or 'a' for all): ")?
        else {
            return Ok(());
        };
        let input = input.trim().to_lowercase();
        if input == "a" {
            student.comments.clear();
            self.console
                .write_line(&format!("{} All comments removed.", "✓".green()));
            return Ok(());
        }
        match input.parse::<usize>() {
            Ok(n) if n >= 1 && n <= student.comments.len() => {
                student.comments.remove(n - 1);
                self.console
                    .write_line(&format!("{} Comment {} removed.", "✓".green(), n));
            }
            _ => self.error("That is not a comment number."),
        }
        Ok(())
    }

    fn move_comment(&mut self, student: &mut Student) -> Result<()> {
        if student.comments.len() < 2 {
            self.error("Nothing to reorder.");
            return Ok(());
        }
        let Some(from) = self.read_index("Move which comment: ", student.comments.len())? else {
            return Ok(());
        };
        let Some(to) = self.read_index("To which position: ", student.comments.len())? else {
            return Ok(());
        };
        student.move_comment(from, to);
        self.console
            .write_line(&format!("{} Moved to position {}.", "✓".green(), to + 1));
        Ok(())
    }

    /// Prompt for a 1-based index up to `len`; `None` for cancel/bad input.
    fn read_index(&mut self, prompt: &str, len: usize) -> Result<Option<usize>> {
        let Some(input) = self.console.read_line(prompt)? else {
            return Ok(None);
        };
        match input.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= len => Ok(Some(n - 1)),
            _ => {
                self.error("That is not a comment number.");
                Ok(None)
            }
        }
    }

    /// New template bound to the open category.
    fn add_template(&mut self, student: &mut Student, idx: usize) -> Result<()> {
        self.new_comment(student, Some(idx))
    }

    fn remove_template(&mut self, idx: usize) -> Result<()> {
        let cat = &self.store.categories()[idx];
        let category = cat.name.clone();
        if cat.templates.is_empty() {
            self.error("No templates to remove.");
            return Ok(());
        }
        let len = cat.templates.len();
        let Some(input) = self.console.read_line("Remove which template: ")? else {
            return Ok(());
        };
        let template = match input.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= len => self.store.categories()[idx].templates[n - 1].clone(),
            _ => {
                self.error("That is not a template number.");
                return Ok(());
            }
        };
        if !self.confirm(&format!("Delete '{template}' from the library? [y/N]: "))? {
            self.console.write_line(&"Kept.".dimmed().to_string());
            return Ok(());
        }
        match self.store.remove(&category, &template) {
            Ok(()) => self
                .console
                .write_line(&format!("{} Template removed.", "✓".green())),
            Err(err) => self.error(&format!("Not removed: {err}")),
        }
        Ok(())
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let Some(input) = self.console.read_line(prompt)? else {
            return Ok(false);
        };
        let input = input.trim().to_lowercase();
        Ok(input == "y" || input == "yes")
    }

    fn error(&mut self, msg: &str) {
        self.console
            .write_line(&format!("{} {}", "!".red(), msg));
    }
}
