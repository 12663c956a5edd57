//! Category-indexed template store backed by a line-oriented text file.
//!
//! File grammar: a line starting with `#` opens a category (name = rest of
//! the line, trimmed); following non-blank lines are that category's
//! templates. Content before the first header lands in an implicit `GENERAL`
//! category. Blank lines are skipped and never close a category.
//!
//! The file is the source of truth. Mutations copy it to a `<name>_bu`
//! backup, rewrite it whole, and only then update the in-memory view, so a
//! failed write never desyncs the two. Untouched lines are carried over
//! byte-for-byte; the file is never re-parsed after a mutation.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

/// Name of the implicit category for templates before the first header.
pub const IMPLICIT_CATEGORY: &str = "GENERAL";

/// Suffix appended to the template file name for the pre-rewrite backup.
pub const BACKUP_SUFFIX: &str = "_bu";

/// Errors from template store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no category named '{0}'")]
    CategoryNotFound(String),

    #[error("no template '{template}' in category '{category}'")]
    TemplateNotFound { category: String, template: String },
}

/// A named, ordered group of templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub templates: Vec<String>,
}

/// Parse template file content into categories, preserving the order in
/// which categories and templates first appear.
pub fn parse(content: &str) -> Vec<Category> {
    let mut categories: Vec<Category> = Vec::new();
    let mut current: Option<Category> = None;

    for raw in content.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix('#') {
            if let Some(done) = current.take() {
                categories.push(done);
            }
            current = Some(Category {
                name: rest.trim().to_string(),
                templates: Vec::new(),
            });
        } else {
            let cat = current.get_or_insert_with(|| Category {
                name: IMPLICIT_CATEGORY.to_string(),
                templates: Vec::new(),
            });
            cat.templates.push(line.to_string());
        }
    }
    if let Some(done) = current {
        categories.push(done);
    }

    categories
}

/// The template store: parsed categories plus the backing file path.
pub struct TemplateStore {
    path: PathBuf,
    categories: Vec<Category>,
}

impl TemplateStore {
    /// Load and parse the template file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let categories = parse(&content);
        debug!("loaded {} categories from {}", categories.len(), path.display());
        Ok(Self { path, categories })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the backup written before every rewrite: `<file>_bu`.
    pub fn backup_path(&self) -> PathBuf {
        let mut os = self.path.clone().into_os_string();
        os.push(BACKUP_SUFFIX);
        PathBuf::from(os)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Case-insensitive category lookup.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    fn category_mut(&mut self, name: &str) -> Option<&mut Category> {
        self.categories
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Append `template` to `category`, in the file and then in memory.
    ///
    /// The new line goes at the end of the category's block: just before the
    /// next `#` header, or at end of file when the category is last. The
    /// implicit GENERAL block (no header of its own) ends at the first
    /// header. A category missing from the file entirely gets a fresh
    /// `#` header plus the line at end of file, so a reparse of the file
    /// always agrees with the in-memory store.
    pub fn insert(&mut self, category: &str, template: &str) -> Result<(), StoreError> {
        let template = template.trim();
        let want_general = category.trim().eq_ignore_ascii_case(IMPLICIT_CATEGORY);
        let content = self.read_live()?;
        let mut lines = split_keep_ends(&content);
        let new_line = format!("{template}\n");

        match find_header(&lines, category) {
            Some(header_idx) => {
                let insert_at = next_header(&lines, header_idx + 1).unwrap_or(lines.len());
                if insert_at == lines.len() {
                    ensure_trailing_newline(&mut lines);
                }
                lines.insert(insert_at, new_line);
            }
            None if want_general => {
                // headerless GENERAL block: top of file up to the first header
                let insert_at = next_header(&lines, 0).unwrap_or(lines.len());
                if insert_at == lines.len() {
                    ensure_trailing_newline(&mut lines);
                }
                lines.insert(insert_at, new_line);
            }
            None => {
                warn!(
                    "no '#{}' header in {}; appending a new category at end of file",
                    category,
                    self.path.display()
                );
                ensure_trailing_newline(&mut lines);
                lines.push(format!("#{}\n", category.trim()));
                lines.push(new_line);
            }
        }

        self.rewrite(lines.concat())?;

        if let Some(cat) = self.category_mut(category) {
            cat.templates.push(template.to_string());
        } else if want_general {
            // a new headerless block at the top of the file parses first
            self.categories.insert(
                0,
                Category {
                    name: IMPLICIT_CATEGORY.to_string(),
                    templates: vec![template.to_string()],
                },
            );
        } else {
            self.categories.push(Category {
                name: category.trim().to_string(),
                templates: vec![template.to_string()],
            });
        }
        info!("added template to '{}' in {}", category, self.path.display());
        Ok(())
    }

    /// Remove the first trim-equal match of `template` from `category`, in
    /// the file and then in memory. Confirmation is the caller's job.
    pub fn remove(&mut self, category: &str, template: &str) -> Result<(), StoreError> {
        let want = template.trim();
        let cat_idx = self
            .categories
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(category.trim()))
            .ok_or_else(|| StoreError::CategoryNotFound(category.to_string()))?;
        let mem_idx = self.categories[cat_idx]
            .templates
            .iter()
            .position(|t| t.trim() == want)
            .ok_or_else(|| StoreError::TemplateNotFound {
                category: category.to_string(),
                template: template.to_string(),
            })?;

        let content = self.read_live()?;
        let mut lines = split_keep_ends(&content);
        let (start, end) = block_bounds(&lines, category).ok_or_else(|| {
            StoreError::CategoryNotFound(category.to_string())
        })?;
        let line_idx = lines[start..end]
            .iter()
            .position(|l| l.trim() == want)
            .map(|rel| start + rel)
            .ok_or_else(|| StoreError::TemplateNotFound {
                category: category.to_string(),
                template: template.to_string(),
            })?;
        lines.remove(line_idx);

        self.rewrite(lines.concat())?;

        self.categories[cat_idx].templates.remove(mem_idx);
        info!(
            "removed template from '{}' in {}",
            category,
            self.path.display()
        );
        Ok(())
    }

    fn read_live(&self) -> Result<String, StoreError> {
        fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Back up the live file, then replace its content.
    fn rewrite(&self, content: String) -> Result<(), StoreError> {
        let backup = self.backup_path();
        fs::copy(&self.path, &backup).map_err(|source| StoreError::Io {
            path: backup.clone(),
            source,
        })?;
        debug!("backed up {} to {}", self.path.display(), backup.display());
        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Split into lines that keep their terminators, so untouched lines are
/// written back byte-for-byte.
fn split_keep_ends(content: &str) -> Vec<String> {
    content.split_inclusive('\n').map(str::to_string).collect()
}

fn is_header(line: &str) -> bool {
    line.trim().starts_with('#')
}

fn find_header(lines: &[String], category: &str) -> Option<usize> {
    let want = category.trim();
    lines.iter().position(|l| {
        l.trim()
            .strip_prefix('#')
            .is_some_and(|rest| rest.trim().eq_ignore_ascii_case(want))
    })
}

fn next_header(lines: &[String], from: usize) -> Option<usize> {
    lines[from..].iter().position(|l| is_header(l)).map(|p| from + p)
}

/// Line range of a category's block, header excluded. The implicit GENERAL
/// category (no header of its own) spans from the top of the file to the
/// first header.
fn block_bounds(lines: &[String], category: &str) -> Option<(usize, usize)> {
    if let Some(h) = find_header(lines, category) {
        let end = next_header(lines, h + 1).unwrap_or(lines.len());
        return Some((h + 1, end));
    }
    if category.trim().eq_ignore_ascii_case(IMPLICIT_CATEGORY) {
        let end = next_header(lines, 0).unwrap_or(lines.len());
        return Some((0, end));
    }
    None
}

fn ensure_trailing_newline(lines: &mut [String]) {
    if let Some(last) = lines.last_mut()
        && !last.ends_with('\n')
    {
        last.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with(content: &str) -> (TempDir, TemplateStore) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("comments.txt");
        fs::write(&path, content).unwrap();
        let store = TemplateStore::load(&path).unwrap();
        (temp, store)
    }

    #[test]
    fn test_parse_implicit_general_category() {
        let cats = parse("line1\n#CATA\nfoo\nbar\n#CATB\nbaz");
        assert_eq!(cats.len(), 3);
        assert_eq!(cats[0].name, "GENERAL");
        assert_eq!(cats[0].templates, vec!["line1"]);
        assert_eq!(cats[1].name, "CATA");
        assert_eq!(cats[1].templates, vec!["foo", "bar"]);
        assert_eq!(cats[2].name, "CATB");
        assert_eq!(cats[2].templates, vec!["baz"]);
    }

    #[test]
    fn test_parse_blank_lines_do_not_close_category() {
        let cats = parse("#CATA\nfoo\n\n\nbar\n");
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].templates, vec!["foo", "bar"]);
    }

    #[test]
    fn test_parse_header_names_are_trimmed() {
        let cats = parse("#  Openers  \nfoo\n");
        assert_eq!(cats[0].name, "Openers");
    }

    #[test]
    fn test_parse_empty_content() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_parse_keeps_empty_categories() {
        let cats = parse("#CATA\n#CATB\nfoo\n");
        assert_eq!(cats.len(), 2);
        assert!(cats[0].templates.is_empty());
        assert_eq!(cats[1].templates, vec!["foo"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let (_t, store) = store_with("#CATA\nfoo\n");
        assert!(store.category("cata").is_some());
        assert!(store.category("CATB").is_none());
    }

    #[test]
    fn test_insert_before_next_header() {
        let (_t, mut store) = store_with("#CATA\nfoo\n#CATB\nbaz\n");
        store.insert("CATA", "new one").unwrap();

        let on_disk = fs::read_to_string(store.path()).unwrap();
        assert_eq!(on_disk, "#CATA\nfoo\nnew one\n#CATB\nbaz\n");
        assert_eq!(store.category("CATA").unwrap().templates, vec!["foo", "new one"]);
        // other categories untouched
        assert_eq!(store.category("CATB").unwrap().templates, vec!["baz"]);
    }

    #[test]
    fn test_insert_into_last_category_appends_at_eof() {
        let (_t, mut store) = store_with("#CATA\nfoo\n#CATB\nbaz");
        store.insert("CATB", "tail").unwrap();

        let on_disk = fs::read_to_string(store.path()).unwrap();
        assert_eq!(on_disk, "#CATA\nfoo\n#CATB\nbaz\ntail\n");
    }

    #[test]
    fn test_insert_writes_backup_of_pre_mutation_content() {
        let before = "#CATA\nfoo\n";
        let (_t, mut store) = store_with(before);
        store.insert("CATA", "bar").unwrap();

        let backup = fs::read_to_string(store.backup_path()).unwrap();
        assert_eq!(backup, before);
    }

    #[test]
    fn test_insert_matches_reparse() {
        let (_t, mut store) = store_with("top\n#CATA\nfoo\n\n#CATB\nbaz\n");
        store.insert("CATA", "bar").unwrap();

        let reparsed = parse(&fs::read_to_string(store.path()).unwrap());
        assert_eq!(reparsed, store.categories());
    }

    #[test]
    fn test_insert_into_implicit_general_stays_in_its_block() {
        let (_t, mut store) = store_with("loose line\n#CATA\nfoo\n");
        store.insert("GENERAL", "new one").unwrap();

        let on_disk = fs::read_to_string(store.path()).unwrap();
        assert_eq!(on_disk, "loose line\nnew one\n#CATA\nfoo\n");
        assert_eq!(
            store.category("GENERAL").unwrap().templates,
            vec!["loose line", "new one"]
        );
        assert_eq!(store.category("CATA").unwrap().templates, vec!["foo"]);
        assert_eq!(parse(&on_disk), store.categories());
    }

    #[test]
    fn test_insert_general_into_file_without_general_block() {
        let (_t, mut store) = store_with("#CATA\nfoo\n");
        store.insert("GENERAL", "first").unwrap();

        let on_disk = fs::read_to_string(store.path()).unwrap();
        assert_eq!(on_disk, "first\n#CATA\nfoo\n");
        // the headerless block parses first, and memory matches
        assert_eq!(parse(&on_disk), store.categories());
        assert_eq!(store.categories()[0].name, "GENERAL");
    }

    #[test]
    fn test_insert_unknown_category_appends_header_at_eof() {
        let (_t, mut store) = store_with("#CATA\nfoo\n");
        store.insert("NEW", "orphan").unwrap();

        let on_disk = fs::read_to_string(store.path()).unwrap();
        assert_eq!(on_disk, "#CATA\nfoo\n#NEW\norphan\n");
        assert_eq!(store.category("NEW").unwrap().templates, vec!["orphan"]);
        assert_eq!(parse(&on_disk), store.categories());
    }

    #[test]
    fn test_insert_preserves_blank_lines_elsewhere() {
        let (_t, mut store) = store_with("#CATA\n\nfoo\n\n#CATB\n\nbaz\n");
        store.insert("CATB", "new").unwrap();

        let on_disk = fs::read_to_string(store.path()).unwrap();
        assert_eq!(on_disk, "#CATA\n\nfoo\n\n#CATB\n\nbaz\nnew\n");
    }

    #[test]
    fn test_remove_first_match_only() {
        let (_t, mut store) = store_with("#CATA\ndup\nother\ndup\n");
        store.remove("CATA", "dup").unwrap();

        let on_disk = fs::read_to_string(store.path()).unwrap();
        assert_eq!(on_disk, "#CATA\nother\ndup\n");
        assert_eq!(store.category("CATA").unwrap().templates, vec!["other", "dup"]);
    }

    #[test]
    fn test_remove_is_trim_insensitive() {
        let (_t, mut store) = store_with("#CATA\n  padded  \n");
        store.remove("CATA", "padded").unwrap();
        assert!(store.category("CATA").unwrap().templates.is_empty());
    }

    #[test]
    fn test_remove_from_implicit_general() {
        let (_t, mut store) = store_with("loose line\n#CATA\nfoo\n");
        store.remove("GENERAL", "loose line").unwrap();

        let on_disk = fs::read_to_string(store.path()).unwrap();
        assert_eq!(on_disk, "#CATA\nfoo\n");
    }

    #[test]
    fn test_remove_missing_template_is_error() {
        let (_t, mut store) = store_with("#CATA\nfoo\n");
        let err = store.remove("CATA", "nope").unwrap_err();
        assert!(matches!(err, StoreError::TemplateNotFound { .. }));
        // nothing changed
        assert_eq!(store.category("CATA").unwrap().templates, vec!["foo"]);
    }

    #[test]
    fn test_remove_missing_category_is_error() {
        let (_t, mut store) = store_with("#CATA\nfoo\n");
        let err = store.remove("NOPE", "foo").unwrap_err();
        assert!(matches!(err, StoreError::CategoryNotFound(_)));
    }

    #[test]
    fn test_remove_writes_backup() {
        let before = "#CATA\nfoo\nbar\n";
        let (_t, mut store) = store_with(before);
        store.remove("CATA", "foo").unwrap();
        assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), before);
    }

    #[test]
    fn test_failed_rewrite_leaves_memory_untouched() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("comments.txt");
        fs::write(&path, "#CATA\nfoo\n").unwrap();
        let mut store = TemplateStore::load(&path).unwrap();

        // delete the backing file so the rewrite's backup copy fails
        fs::remove_file(&path).unwrap();
        assert!(store.insert("CATA", "bar").is_err());
        assert_eq!(store.category("CATA").unwrap().templates, vec!["foo"]);
    }

    #[test]
    fn test_mutation_round_trip() {
        let (_t, mut store) = store_with("#CATA\nfoo\n#CATB\nbaz\n");
        store.insert("CATA", "bar").unwrap();
        store.insert("CATB", "qux").unwrap();
        store.remove("CATA", "foo").unwrap();

        let reparsed = parse(&fs::read_to_string(store.path()).unwrap());
        assert_eq!(reparsed, store.categories());
        assert_eq!(store.category("CATA").unwrap().templates, vec!["bar"]);
        assert_eq!(store.category("CATB").unwrap().templates, vec!["baz", "qux"]);
    }

    #[test]
    fn test_backup_path_appends_suffix() {
        let (_t, store) = store_with("#CATA\nfoo\n");
        let name = store.backup_path();
        assert!(name.to_string_lossy().ends_with("comments.txt_bu"));
    }
}
