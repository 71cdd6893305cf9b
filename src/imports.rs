//! Import graph: which packages a name written in a package can refer to.

use crate::source::ImportDecl;
use log::debug;
use regex::Regex;
use std::collections::HashMap;

const IGNORED_CRATES: [&str; 3] = ["std", "core", "alloc"];

/// Splits a package id into its path segments; the root package has none.
pub fn package_segments(package: &str) -> Vec<&str> {
    package.split('/').filter(|s| !s.is_empty()).collect()
}

/// Normalises a module path as written in source to a package id.
///
/// A leading `crate` is dropped, `self` stands for `current_package` and each `super` for its
/// parent. Paths into `std`, `core` and `alloc` yield `None`, as does a `super` above the root.
pub fn normalize_package_path<S: AsRef<str>>(
    segments: &[S],
    current_package: &str,
) -> Option<String> {
    let mut resolved: Vec<String> = Vec::new();
    let mut rest = segments.iter().map(|s| s.as_ref()).peekable();

    match rest.peek().copied() {
        Some(first) if IGNORED_CRATES.contains(&first) => return None,
        Some("crate") => {
            rest.next();
        }
        Some("self") | Some("super") => {
            resolved = package_segments(current_package)
                .into_iter()
                .map(str::to_string)
                .collect();
            if rest.peek() == Some(&"self") {
                rest.next();
            }
            while rest.peek() == Some(&"super") {
                rest.next();
                resolved.pop()?;
            }
        }
        _ => {}
    }

    resolved.extend(rest.map(str::to_string));
    Some(resolved.join("/"))
}

/// Alias to candidate package ids for one package.
///
/// The alias is the `as` name when given, else the last path segment. Several imports may
/// share an alias; candidates are kept in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportMap {
    aliases: HashMap<String, Vec<String>>,
}

impl ImportMap {
    /// Builds the map for `current_package` from its flattened imports.
    ///
    /// Imports whose normalised package id matches `ignore` are left out.
    pub fn build(imports: &[ImportDecl], current_package: &str, ignore: Option<&Regex>) -> Self {
        let mut aliases: HashMap<String, Vec<String>> = HashMap::new();

        for import in imports {
            let Some(alias) = import.visible_name() else {
                continue;
            };
            let Some(package) = normalize_package_path(&import.path, current_package) else {
                continue;
            };
            if package.is_empty() {
                continue;
            }
            if ignore.is_some_and(|re| re.is_match(&package)) {
                debug!("Ignoring import {} in {}", package, current_package);
                continue;
            }

            let candidates = aliases.entry(alias.to_string()).or_default();
            if !candidates.contains(&package) {
                candidates.push(package);
            }
        }

        ImportMap { aliases }
    }

    /// Candidate package ids for `alias`, empty when nothing is imported under that name.
    pub fn candidates(&self, alias: &str) -> &[String] {
        self.aliases.get(alias).map(Vec::as_slice).unwrap_or(&[])
    }
}
