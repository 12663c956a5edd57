use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use markbook::cli::Cli;
use markbook::config::Config;
use markbook::session::{Console, Outcome, Session, TermConsole};
use markbook::store::TemplateStore;
use markbook::{report, roster};

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env().filter_level(level).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    println!("{}", "**** Report Card Comment Generator ****".bright_cyan().bold());

    let mut console = TermConsole::new()?;

    let Some(roster_path) = locate_file(
        &mut console,
        "Student data file path: ",
        cli.roster.as_deref(),
        None,
    )?
    else {
        println!("Goodbye!");
        return Ok(());
    };
    let roster_content =
        fs::read_to_string(&roster_path).context("Failed to read roster file")?;
    let mut students = roster::parse_roster(&roster_content)?;
    println!("{} students found.", students.len());
    if students.is_empty() {
        return Ok(());
    }

    let Some(comments_path) = locate_file(
        &mut console,
        "Comment file path, or [Enter] for default: ",
        cli.comments.as_deref(),
        Some(&config.comments_file),
    )?
    else {
        println!("Goodbye!");
        return Ok(());
    };
    let mut store =
        TemplateStore::load(&comments_path).context("Failed to load comment templates")?;

    let output_path = cli.output.unwrap_or_else(|| config.output_file.clone());

    let total = students.len();
    let mut entries: Vec<String> = Vec::new();
    let mut quit = false;

    for (idx, student) in students.iter_mut().enumerate() {
        if quit {
            break;
        }
        info!("editing student {}/{}", idx + 1, total);
        let outcome = {
            let done = &entries;
            let out = output_path.as_path();
            Session::new(&mut store, &mut console)
                .run(student, |current| report::save(out, done, Some(current)))?
        };
        entries.push(report::render_entry(student));
        if outcome == Outcome::Quit {
            quit = true;
        }
    }

    report::save(&output_path, &entries, None)?;
    println!(
        "{} Reports written to {}",
        "✓".green(),
        output_path.display()
    );
    println!("Goodbye!");
    Ok(())
}

/// Resolve a file path from the CLI flag or by prompting, retrying until the
/// file exists. `None` means the user bailed out with Ctrl+D.
fn locate_file(
    console: &mut TermConsole,
    prompt: &str,
    from_cli: Option<&Path>,
    default: Option<&Path>,
) -> Result<Option<PathBuf>> {
    if let Some(path) = from_cli {
        if path.exists() {
            return Ok(Some(path.to_path_buf()));
        }
        println!("{} {}", "File not found:".red(), path.display());
    }

    loop {
        let Some(line) = console.read_line(prompt)? else {
            return Ok(None);
        };
        let line = line.trim();
        let path = if line.is_empty() {
            match default {
                Some(d) => d.to_path_buf(),
                None => continue,
            }
        } else {
            expand_home(line)
        };
        if path.exists() {
            return Ok(Some(path));
        }
        println!("File not found... try again?");
    }
}

/// Expand a leading `~` to the home directory, echoing the resolved path.
fn expand_home(input: &str) -> PathBuf {
    if let Some(rest) = input.strip_prefix('~')
        && let Some(home) = dirs::home_dir()
    {
        let path = home.join(rest.trim_start_matches('/'));
        println!("Looking for: {}", path.display());
        return path;
    }
    PathBuf::from(input)
}
