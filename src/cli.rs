use crate::error::DiagnosticKind;
use crate::generator::{generate, GeneratorConfig};
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use regex::Regex;
use std::path::PathBuf;

/// OpenAPI from annotations - Generate a Swagger 2.0 document from annotated doc comments
#[derive(Parser, Debug)]
#[command(name = "openapi-from-annotations")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// API packages to document (directories relative to a search root, e.g. `handlers/v1`)
    #[arg(
        short = 'p',
        long = "package",
        value_name = "PACKAGE",
        value_delimiter = ',',
        required = true
    )]
    pub packages: Vec<String>,

    /// Search roots packages are looked up in, in order
    #[arg(
        short = 'r',
        long = "root",
        value_name = "DIR",
        env = "OPENAPI_SOURCE_PATH",
        value_delimiter = ':',
        default_value = "."
    )]
    pub roots: Vec<PathBuf>,

    /// File whose doc comments carry the document-level info (@title, @version, ...)
    #[arg(short = 'm', long = "main-file", value_name = "FILE")]
    pub main_file: Option<PathBuf>,

    /// Output format (json or yaml)
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Only document methods of impl blocks whose type name matches this regex
    #[arg(short = 'c', long = "controller", value_name = "REGEX")]
    pub controller: Option<String>,

    /// Never follow imports whose package id matches this regex
    #[arg(short = 'i', long = "ignore", value_name = "REGEX")]
    pub ignore: Option<String>,

    /// Fail when any referenced type can not be resolved
    #[arg(long = "strict")]
    pub strict: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    for root in &args.roots {
        if !root.exists() {
            anyhow::bail!("Search root does not exist: {}", root.display());
        }
        if !root.is_dir() {
            anyhow::bail!("Search root is not a directory: {}", root.display());
        }
    }

    if let Some(ref main_file) = args.main_file {
        if !main_file.is_file() {
            anyhow::bail!("Main file does not exist: {}", main_file.display());
        }
    }

    info!("Search roots: {:?}", args.roots);
    info!("Packages: {}", args.packages.join(", "));
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Turns the arguments into a generator configuration, compiling the filter patterns
pub fn generator_config(args: &CliArgs) -> Result<GeneratorConfig> {
    Ok(GeneratorConfig {
        roots: args.roots.clone(),
        packages: args.packages.clone(),
        main_file: args.main_file.clone(),
        controller: compile_pattern(args.controller.as_deref(), "--controller")?,
        ignore: compile_pattern(args.ignore.as_deref(), "--ignore")?,
    })
}

fn compile_pattern(pattern: Option<&str>, flag: &str) -> Result<Option<Regex>> {
    pattern
        .map(|p| Regex::new(p).with_context(|| format!("Invalid {} pattern: {}", flag, p)))
        .transpose()
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting Swagger document generation...");
    let config = generator_config(&args)?;

    let generation = generate(&config)?;
    for diagnostic in &generation.diagnostics {
        warn!("{}", diagnostic);
    }

    let resolution_errors = generation.resolution_errors();
    if args.strict && resolution_errors > 0 {
        anyhow::bail!(
            "{} type references could not be resolved (see warnings above)",
            resolution_errors
        );
    }

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&generation.document)?,
        OutputFormat::Json => serialize_json(&generation.document)?,
    };

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote Swagger document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    let grammar_errors = generation
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::Grammar)
        .count();
    info!("Generation complete!");
    info!("Summary:");
    info!("  - Paths: {}", generation.document.paths.len());
    info!("  - Definitions: {}", generation.document.definitions.len());
    info!("  - Skipped annotation lines: {}", grammar_errors);
    info!("  - Unresolved type references: {}", resolution_errors);

    Ok(())
}
