//! OpenAPI from annotations - Swagger 2.0 documents from annotated Rust sources.
//!
//! Handler functions describe their endpoints in doc comments (`@router`, `@param`,
//! `@success`, ...). The types those annotations name are looked up across packages
//! (directories under a search root), following `use` declarations, and turned into
//! schema definitions keyed by their canonical id.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Lists the source files of a package and its sub-packages
//! 2. [`parser`] - Parses source files into syntax trees and reads doc comments
//! 3. [`source`] - Collects the declarations of a package (types, functions, imports)
//! 4. [`imports`] - Maps import aliases to package ids
//! 5. [`package_registry`] - Locates and caches packages for the duration of a run
//! 6. [`type_expr`] - Type expressions as written in fields and annotations
//! 7. [`type_resolver`] - Resolves type expressions into schemas and definitions
//! 8. [`annotation`] - Parses annotation lines and the document info block
//! 9. [`openapi_builder`] - Assembles operations, paths and tags into the document
//! 10. [`serializer`] - Serializes the document to JSON or YAML
//! 11. [`generator`] - Runs the whole pipeline
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_annotations::{
//!     generator::{generate, GeneratorConfig},
//!     serializer::serialize_json,
//! };
//! use std::path::PathBuf;
//!
//! let config = GeneratorConfig {
//!     roots: vec![PathBuf::from("./src")],
//!     packages: vec!["handlers".to_string()],
//!     ..Default::default()
//! };
//! let generation = generate(&config).unwrap();
//! for diagnostic in &generation.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! println!("{}", serialize_json(&generation.document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod annotation;
pub mod cli;
pub mod error;
pub mod generator;
pub mod imports;
pub mod openapi_builder;
pub mod package_registry;
pub mod parser;
pub mod scanner;
pub mod schema;
pub mod serializer;
pub mod source;
pub mod type_expr;
pub mod type_resolver;
