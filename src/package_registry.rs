//! Package resolution and caching.
//!
//! [`PackageRegistry`] maps logical package ids to canonical locations and memoizes the parsed
//! declarations per location, so a package is read at most once per run however many ids
//! (or symlinks) lead to it. Import maps are cached per package id.

use crate::error::ResolveError;
use crate::imports::{package_segments, ImportMap};
use crate::parser::AstParser;
use crate::scanner::FileScanner;
use crate::source::PackageSource;
use anyhow::Result;
use log::debug;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Where package declarations come from.
pub trait SourceProvider {
    /// Canonical location of `package`, or `None` if no search root contains it
    fn locate(&self, package: &str) -> Option<PathBuf>;

    /// Reads the declarations stored at `location`
    fn load(&self, location: &Path) -> Result<PackageSource>;
}

/// Provider reading package directories below a list of search roots.
///
/// Roots are tried in order; the first one containing the package directory wins.
pub struct FsSourceProvider {
    roots: Vec<PathBuf>,
}

impl FsSourceProvider {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl SourceProvider for FsSourceProvider {
    fn locate(&self, package: &str) -> Option<PathBuf> {
        self.roots.iter().find_map(|root| {
            let mut dir = root.clone();
            dir.extend(package_segments(package));
            if !dir.is_dir() {
                return None;
            }
            Some(fs::canonicalize(&dir).unwrap_or(dir))
        })
    }

    fn load(&self, location: &Path) -> Result<PackageSource> {
        let scan = FileScanner::new(location.to_path_buf()).package_files()?;
        let parsed: Vec<_> = AstParser::parse_files(&scan.rust_files)
            .into_iter()
            .filter_map(Result::ok)
            .collect();
        Ok(PackageSource::from_files(location.to_path_buf(), &parsed))
    }
}

/// Run-scoped cache of package locations, declarations and import maps.
pub struct PackageRegistry {
    provider: Box<dyn SourceProvider>,
    ignore: Option<Regex>,
    locations: HashMap<String, Option<PathBuf>>,
    packages: HashMap<PathBuf, Rc<PackageSource>>,
    import_maps: HashMap<String, Rc<ImportMap>>,
}

impl PackageRegistry {
    /// `ignore` filters imports out of every import map built by this registry.
    pub fn new(provider: Box<dyn SourceProvider>, ignore: Option<Regex>) -> Self {
        Self {
            provider,
            ignore,
            locations: HashMap::new(),
            packages: HashMap::new(),
            import_maps: HashMap::new(),
        }
    }

    /// Canonical location of `package`, memoized by id (misses included).
    pub fn resolve(&mut self, package: &str) -> Result<PathBuf, ResolveError> {
        let provider = &self.provider;
        let location = self
            .locations
            .entry(package.to_string())
            .or_insert_with(|| {
                let location = provider.locate(package);
                match &location {
                    Some(path) => debug!("Package {} located at {}", package, path.display()),
                    None => debug!("Can not find package {}", package),
                }
                location
            })
            .clone();

        location.ok_or_else(|| ResolveError::PackageNotFound {
            package: package.to_string(),
        })
    }

    /// Declarations stored at `location`, parsed on first request.
    pub fn declarations_of(
        &mut self,
        package: &str,
        location: &Path,
    ) -> Result<Rc<PackageSource>, ResolveError> {
        if let Some(source) = self.packages.get(location) {
            return Ok(Rc::clone(source));
        }

        let source = self
            .provider
            .load(location)
            .map_err(|e| ResolveError::LoadFailed {
                package: package.to_string(),
                message: format!("{:#}", e),
            })?;
        debug!(
            "Loaded package {}: {} types, {} functions",
            package,
            source.types.len(),
            source.functions.len()
        );

        let source = Rc::new(source);
        self.packages
            .insert(location.to_path_buf(), Rc::clone(&source));
        Ok(source)
    }

    /// Resolves `package` and returns its declarations.
    pub fn package(&mut self, package: &str) -> Result<Rc<PackageSource>, ResolveError> {
        let location = self.resolve(package)?;
        self.declarations_of(package, &location)
    }

    /// Import map of `package`, built once per id.
    pub fn import_map(&mut self, package: &str) -> Result<Rc<ImportMap>, ResolveError> {
        if let Some(map) = self.import_maps.get(package) {
            return Ok(Rc::clone(map));
        }

        let source = self.package(package)?;
        let map = Rc::new(ImportMap::build(
            &source.imports,
            package,
            self.ignore.as_ref(),
        ));
        self.import_maps
            .insert(package.to_string(), Rc::clone(&map));
        Ok(map)
    }
}
