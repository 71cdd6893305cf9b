use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Parser turning package source files into syntax trees.
///
/// Plain `//` comments are dropped by `syn`; annotations are therefore read from doc comments
/// (`///` and `//!`), which `syn` keeps as `#[doc = "..."]` attributes.
///
/// # Example
///
/// ```no_run
/// use openapi_from_annotations::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/handlers/pets.rs")).unwrap();
/// println!("Parsed {} items", parsed.syntax_tree.items.len());
/// ```
pub struct AstParser;

/// A parsed source file.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed syntax tree
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Reads and parses a single source file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not contain valid Rust syntax.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let syntax_tree = syn::parse_file(&content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Parses every file, keeping going past failures.
    ///
    /// One result is returned per input path, in input order. Failures are logged as warnings
    /// so a package with one broken file still yields its other declarations.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).map_err(|e| {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                    e
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

/// Comment lines carried by the doc attributes in `attrs`, in source order.
///
/// Each `///` line yields one entry with its text exactly as written after the slashes. Block
/// doc comments are split on newlines.
pub fn doc_comment_lines(attrs: &[syn::Attribute]) -> Vec<String> {
    let mut lines = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }
        let syn::Meta::NameValue(name_value) = &attr.meta else {
            continue;
        };
        if let syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(text),
            ..
        }) = &name_value.value
        {
            lines.extend(text.value().lines().map(str::to_string));
        }
    }
    lines
}

/// Comment lines of a declaration joined into a single description.
///
/// Lines are trimmed and blank lines dropped; `None` if nothing is left.
pub fn doc_description(attrs: &[syn::Attribute]) -> Option<String> {
    let text: Vec<String> = doc_comment_lines(attrs)
        .iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text.join(" "))
    }
}
