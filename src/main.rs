//! OpenAPI from annotations - Command-line tool for generating Swagger 2.0 documents.
//!
//! Reads `@router`, `@param`, `@success` and friends from the doc comments of handler
//! functions, resolves the types they mention across packages and prints the document.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-annotations -p <PACKAGE>[,<PACKAGE>...] [OPTIONS]
//! ```
//!
//! # Examples
//!
//! Document the `handlers` package found under `./src`:
//! ```bash
//! openapi-from-annotations -r ./src -p handlers -m ./src/main.rs -o swagger.json
//! ```
//!
//! Generate YAML, only from methods of `*Controller` types:
//! ```bash
//! openapi-from-annotations -p handlers -c 'Controller$' -f yaml
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_annotations::cli;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists, validate afterwards
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("OpenAPI from annotations starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Swagger document generation completed successfully");

    Ok(())
}
