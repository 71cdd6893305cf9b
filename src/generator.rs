//! End-to-end generation: from search roots and package ids to a Swagger document.

use crate::annotation::InfoBlock;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::openapi_builder::{OpenApiBuilder, SwaggerDocument};
use crate::package_registry::{FsSourceProvider, PackageRegistry};
use crate::parser::{doc_comment_lines, AstParser};
use crate::scanner::FileScanner;
use crate::source::FunctionDecl;
use crate::type_resolver::TypeResolver;
use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Programmatic configuration of a run.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// Directories packages are looked up in, in order
    pub roots: Vec<PathBuf>,
    /// API packages to document; each includes its sub-packages
    pub packages: Vec<String>,
    /// File whose doc comments carry the document-level info block
    pub main_file: Option<PathBuf>,
    /// Only methods of `impl` blocks whose type name matches are documented
    pub controller: Option<Regex>,
    /// Imports whose package id matches are never followed
    pub ignore: Option<Regex>,
}

/// Output of a run: the (possibly partial) document and everything that went wrong.
#[derive(Debug)]
pub struct Generation {
    pub document: SwaggerDocument,
    pub diagnostics: Vec<Diagnostic>,
}

impl Generation {
    pub fn resolution_errors(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Resolution)
            .count()
    }
}

/// Runs the whole pipeline.
///
/// # Errors
///
/// Fails only on environment errors: a search root or the main file that can not be read.
/// Everything else is reported through [`Generation::diagnostics`].
pub fn generate(config: &GeneratorConfig) -> Result<Generation> {
    for root in &config.roots {
        let metadata = fs::metadata(root)
            .with_context(|| format!("Search root does not exist: {}", root.display()))?;
        if !metadata.is_dir() {
            bail!("Search root is not a directory: {}", root.display());
        }
    }

    let mut builder = OpenApiBuilder::new();
    if let Some(main_file) = &config.main_file {
        builder = builder.with_info(read_info_block(main_file)?);
    }

    let provider = FsSourceProvider::new(config.roots.clone());
    let registry = PackageRegistry::new(Box::new(provider), config.ignore.clone());
    let mut resolver = TypeResolver::new(registry);
    let mut diagnostics = Vec::new();

    let packages = expand_packages(&mut resolver, &config.packages, &mut diagnostics);
    info!("Documenting {} packages", packages.len());

    let mut documented = 0;
    for package in &packages {
        let source = match resolver.registry_mut().package(package) {
            Ok(source) => source,
            Err(e) => {
                warn!("{}", e);
                diagnostics.push(Diagnostic::resolution(package, None, &e));
                continue;
            }
        };

        for function in &source.functions {
            if function.doc_lines.is_empty()
                || !is_controller(config.controller.as_ref(), function)
            {
                continue;
            }
            debug!("Processing {}::{}", package, function.qualified_name());
            diagnostics.extend(builder.add_declaration(&mut resolver, package, function));
            documented += 1;
        }
    }

    let document = builder.build(resolver);
    info!(
        "Processed {} declarations: {} paths, {} definitions, {} diagnostics",
        documented,
        document.paths.len(),
        document.definitions.len(),
        diagnostics.len()
    );

    Ok(Generation {
        document,
        diagnostics,
    })
}

/// Normalises a package id given on the command line (`api::v1`, `api/v1/`, `api.v1`).
pub fn normalize_package_id(package: &str) -> String {
    package
        .trim()
        .split(['/', '.', ':'])
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Each requested package followed by its sub-packages, without duplicates.
fn expand_packages(
    resolver: &mut TypeResolver,
    requested: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<String> {
    let mut packages: Vec<String> = Vec::new();

    for package in requested {
        let package = normalize_package_id(package);
        let location = match resolver.registry_mut().resolve(&package) {
            Ok(location) => location,
            Err(e) => {
                diagnostics.push(Diagnostic::resolution(&package, None, &e));
                continue;
            }
        };

        for sub_package in FileScanner::new(location).sub_packages(&package) {
            if !packages.contains(&sub_package) {
                packages.push(sub_package);
            }
        }
    }

    packages
}

fn is_controller(controller: Option<&Regex>, function: &FunctionDecl) -> bool {
    match controller {
        None => true,
        Some(pattern) => function
            .receiver
            .as_deref()
            .is_some_and(|receiver| pattern.is_match(receiver)),
    }
}

/// Reads the document-level info block from the inner doc comments of `path` and the outer
/// doc comments of its top-level items.
pub fn read_info_block(path: &Path) -> Result<InfoBlock> {
    let parsed = AstParser::parse_file(path)
        .with_context(|| format!("Failed to read main file: {}", path.display()))?;

    let mut lines = doc_comment_lines(&parsed.syntax_tree.attrs);
    for item in &parsed.syntax_tree.items {
        lines.extend(doc_comment_lines(item_attrs(item)));
    }

    Ok(InfoBlock::from_lines(&lines))
}

fn item_attrs(item: &syn::Item) -> &[syn::Attribute] {
    match item {
        syn::Item::Const(item) => &item.attrs,
        syn::Item::Enum(item) => &item.attrs,
        syn::Item::ExternCrate(item) => &item.attrs,
        syn::Item::Fn(item) => &item.attrs,
        syn::Item::Impl(item) => &item.attrs,
        syn::Item::Macro(item) => &item.attrs,
        syn::Item::Mod(item) => &item.attrs,
        syn::Item::Static(item) => &item.attrs,
        syn::Item::Struct(item) => &item.attrs,
        syn::Item::Trait(item) => &item.attrs,
        syn::Item::Type(item) => &item.attrs,
        syn::Item::Union(item) => &item.attrs,
        syn::Item::Use(item) => &item.attrs,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::HttpMethod;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        fs::create_dir_all(file_path.parent().unwrap()).unwrap();
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    fn create_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        create_temp_file(
            &dir,
            "main.rs",
            r#"
            //! @title Petstore
            //! @version 0.3.0

            /// @basePath /api
            mod handlers;
            "#,
        );
        create_temp_file(&dir, "models/pet.rs", "pub struct Pet { pub id: i64 }");
        create_temp_file(
            &dir,
            "handlers/pets.rs",
            r#"
            use crate::models;

            pub struct PetController;

            impl PetController {
                /// @router /pets [get]
                /// @success 200 {array} models.Pet "pets"
                pub fn list(&self) {}
            }

            /// @router /health [get]
            pub fn health() {}
            "#,
        );
        create_temp_file(
            &dir,
            "handlers/admin/stats.rs",
            r#"
            /// @router /admin/stats [get]
            /// @success 200 {object} Missing "stats"
            pub fn stats() {}
            "#,
        );
        dir
    }

    fn config(dir: &TempDir) -> GeneratorConfig {
        GeneratorConfig {
            roots: vec![dir.path().to_path_buf()],
            packages: vec!["handlers".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_includes_sub_packages() {
        let dir = create_project();
        let generation = generate(&config(&dir)).unwrap();

        let paths: Vec<&String> = generation.document.paths.keys().collect();
        assert_eq!(paths, vec!["/admin/stats", "/health", "/pets"]);
        assert!(generation.document.definitions.contains_key("models.Pet"));
        assert_eq!(generation.resolution_errors(), 1);
        assert_eq!(generation.diagnostics[0].package, "handlers/admin");
    }

    #[test]
    fn test_controller_filter() {
        let dir = create_project();
        let mut config = config(&dir);
        config.controller = Some(Regex::new("Controller$").unwrap());

        let generation = generate(&config).unwrap();

        let paths: Vec<&String> = generation.document.paths.keys().collect();
        assert_eq!(paths, vec!["/pets"]);
        let list = generation.document.paths["/pets"].slot(HttpMethod::Get).unwrap();
        assert_eq!(list.operation_id.as_deref(), Some("PetController.list"));
    }

    #[test]
    fn test_main_file_info_block() {
        let dir = create_project();
        let mut config = config(&dir);
        config.main_file = Some(dir.path().join("main.rs"));

        let document = generate(&config).unwrap().document;
        assert_eq!(document.info.title, "Petstore");
        assert_eq!(document.info.version, "0.3.0");
        assert_eq!(document.base_path.as_deref(), Some("/api"));
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let config = GeneratorConfig {
            roots: vec![PathBuf::from("/nonexistent/search/root")],
            packages: vec!["handlers".to_string()],
            ..Default::default()
        };

        let err = generate(&config).unwrap_err();
        assert!(err.to_string().contains("Search root does not exist"));
    }

    #[test]
    fn test_missing_package_is_a_diagnostic() {
        let dir = create_project();
        let mut config = config(&dir);
        config.packages = vec!["nowhere".to_string(), "handlers::admin".to_string()];

        let generation = generate(&config).unwrap();
        assert_eq!(generation.document.paths.len(), 1);
        assert_eq!(generation.diagnostics[0].package, "nowhere");
        assert!(generation.diagnostics[0].message.contains("can not find package"));
    }

    #[test]
    fn test_normalize_package_id() {
        assert_eq!(normalize_package_id("api::v1"), "api/v1");
        assert_eq!(normalize_package_id(" /api/v1/ "), "api/v1");
        assert_eq!(normalize_package_id("api.v1"), "api/v1");
    }
}
