//! File discovery: extension-filtered recursive scan with glob excludes
//!
//! Discovery output is sorted so a run over the same tree always visits
//! files in the same order.

use crate::config::PathConfig;
use crate::domain::findings::{LintError, LintResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct PathFilter {
    extensions: Vec<String>,
    exclude: Vec<glob::Pattern>,
}

impl PathFilter {
    pub fn new(extensions: Vec<String>, exclude_patterns: &[String]) -> LintResult<Self> {
        let exclude = exclude_patterns
            .iter()
            .map(|pattern| {
                glob::Pattern::new(pattern).map_err(|e| {
                    LintError::config(format!("invalid exclude pattern '{pattern}': {e}"))
                })
            })
            .collect::<LintResult<Vec<_>>>()?;

        Ok(Self { extensions, exclude })
    }

    pub fn from_config(paths: &PathConfig) -> LintResult<Self> {
        Self::new(paths.extensions.clone(), &paths.exclude)
    }

    /// Add an extra exclude pattern (CLI `--exclude`)
    pub fn add_exclude(&mut self, pattern: &str) -> LintResult<()> {
        let compiled = glob::Pattern::new(pattern)
            .map_err(|e| LintError::config(format!("invalid exclude pattern '{pattern}': {e}")))?;
        self.exclude.push(compiled);
        Ok(())
    }

    /// Whether a path has one of the configured script extensions
    pub fn is_script(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.iter().any(|pattern| pattern.matches_path(path))
    }

    pub fn should_lint(&self, path: &Path) -> bool {
        self.is_script(path) && !self.is_excluded(path)
    }

    /// All lintable files under `root`, sorted
    pub fn find_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.should_lint(path))
            .collect();

        files.sort();
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathConfig;
    use std::fs;
    use tempfile::TempDir;

    fn default_filter() -> PathFilter {
        PathFilter::from_config(&PathConfig::default()).unwrap()
    }

    #[test]
    fn test_extension_filtering() {
        let filter = default_filter();
        assert!(filter.is_script(Path::new("analysis/clean.R")));
        assert!(filter.is_script(Path::new("analysis/clean.r")));
        assert!(!filter.is_script(Path::new("README.md")));
        assert!(!filter.is_script(Path::new("data/raw.csv")));
    }

    #[test]
    fn test_exclude_patterns() {
        let filter = default_filter();
        assert!(filter.is_excluded(Path::new("project/renv/activate.R")));
        assert!(!filter.is_excluded(Path::new("project/analysis/clean.R")));
    }

    #[test]
    fn test_find_files_is_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("analysis")).unwrap();
        fs::create_dir_all(root.join("renv")).unwrap();
        fs::write(root.join("analysis/b.R"), "x <- 1\n").unwrap();
        fs::write(root.join("analysis/a.R"), "x <- 1\n").unwrap();
        fs::write(root.join("analysis/notes.md"), "notes").unwrap();
        fs::write(root.join("renv/activate.R"), "x <- 1\n").unwrap();

        let files = default_filter().find_files(root);
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("analysis/a.R"));
        assert!(files[1].ends_with("analysis/b.R"));
    }

    #[test]
    fn test_invalid_glob_is_a_config_error() {
        let result = PathFilter::new(vec!["R".to_string()], &["[".to_string()]);
        assert!(matches!(result, Err(LintError::Config { .. })));
    }

    #[test]
    fn test_added_exclude_applies() {
        let mut filter = default_filter();
        filter.add_exclude("**/scratch/**").unwrap();
        assert!(filter.is_excluded(Path::new("analysis/scratch/tmp.R")));
    }
}
