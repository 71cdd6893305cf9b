use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// File scanner for package directories.
///
/// A package is a single directory: its source files are the `.rs` files directly inside it.
/// Sub-directories are separate packages, discovered by [`FileScanner::sub_packages`].
///
/// # Example
///
/// ```no_run
/// use openapi_from_annotations::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./src/models"));
/// let result = scanner.package_files().unwrap();
/// println!("Found {} source files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of a directory scan.
///
/// Contains the discovered source files and any warnings encountered during scanning.
pub struct ScanResult {
    /// Paths of the package's `.rs` files, sorted by file name
    pub rust_files: Vec<PathBuf>,
    /// Warning messages for entries that could not be read
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Collects the source files of the package rooted at this directory.
    ///
    /// Only files directly inside the directory are returned. Hidden files and files whose
    /// name ends in `_test.rs` are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn package_files(&self) -> Result<ScanResult> {
        fs::read_dir(&self.root_path).with_context(|| {
            format!("Failed to read package directory: {}", self.root_path.display())
        })?;

        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_package_source(entry.path()) {
                        rust_files.push(entry.path().to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!(
            "Found {} source files in {}",
            rust_files.len(),
            self.root_path.display()
        );

        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }

    /// Expands `package_id` (located at this scanner's directory) into itself plus the ids of
    /// every directory below it.
    ///
    /// The `target` directory and hidden directories are skipped. Ids are returned in
    /// discovery order, the package itself first.
    pub fn sub_packages(&self, package_id: &str) -> Vec<String> {
        let mut packages = vec![package_id.to_string()];

        for entry in WalkDir::new(&self.root_path)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_skipped_dir(e))
        {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => {
                    let Ok(relative) = entry.path().strip_prefix(&self.root_path) else {
                        continue;
                    };
                    let suffix: Vec<String> = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy().to_string())
                        .collect();
                    packages.push(format!("{}/{}", package_id, suffix.join("/")));
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to access path: {}", e),
            }
        }

        packages
    }
}

fn is_package_source(path: &Path) -> bool {
    let Some(file_name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    !file_name.starts_with('.')
        && file_name.ends_with(".rs")
        && !file_name.ends_with("_test.rs")
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    let file_name = entry.file_name().to_string_lossy();
    entry.file_type().is_dir() && (file_name.starts_with('.') || file_name == "target")
}
