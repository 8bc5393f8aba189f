// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

mod commands;

use clap::{Parser, Subcommand};
use jsonshape::RegistryConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jsonshape")]
#[command(about = "JSON-Schema export and JSON normalisation for type catalogs")]
#[command(version)]
struct Cli {
    /// Registry configuration (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema of a type plus every named schema it references
    Schema {
        /// Type catalog (.json or .toml)
        #[arg(long, value_name = "FILE")]
        catalog: PathBuf,

        /// Root type, e.g. `Page<Person>`
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        type_key: String,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Decode a JSON document as a type and re-encode it
    Normalize {
        /// Type catalog (.json or .toml)
        #[arg(long, value_name = "FILE")]
        catalog: PathBuf,

        /// Document type, e.g. `List<Person>`
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        type_key: String,

        /// Input JSON file (stdin if omitted)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Resolve every non-generic catalog type and report failures
    Check {
        /// Type catalog (.json or .toml)
        #[arg(long, value_name = "FILE")]
        catalog: PathBuf,
    },

    /// Write an example registry configuration
    GenConfig {
        /// Output TOML file
        #[arg(short, long, value_name = "FILE", default_value = "jsonshape.toml")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RegistryConfig::from_file(path)?,
        None => RegistryConfig::default(),
    };
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .format_timestamp_millis()
    .try_init();

    match cli.command {
        Commands::Schema {
            catalog,
            type_key,
            output,
        } => {
            let document = commands::schema(&catalog, &type_key, config)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, document)?;
                    println!("[OK] Schema written to {}", path.display());
                }
                None => println!("{}", document),
            }
        }
        Commands::Normalize {
            catalog,
            type_key,
            input,
        } => {
            let raw = match input {
                Some(path) => std::fs::read_to_string(path)?,
                None => std::io::read_to_string(std::io::stdin())?,
            };
            println!("{}", commands::normalize(&catalog, &type_key, &raw, config)?);
        }
        Commands::Check { catalog } => {
            let report = commands::check(&catalog, config)?;
            for line in &report.lines {
                println!("{}", line);
            }
            if report.failures > 0 {
                anyhow::bail!("{} type(s) cannot be resolved", report.failures);
            }
            println!("[OK] {} type(s) resolved", report.resolved);
        }
        Commands::GenConfig { output } => {
            commands::gen_config(&output)?;
            println!("[OK] Example configuration written to {}", output.display());
        }
    }

    Ok(())
}
