//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod gallery;
mod info;
mod mix;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{debug, error};

use crate::config::{load_config, merge_cli_overrides, CliOverrides, MixConfig};
use crate::logging::{init_logging, LogConfig, LogFormat};
use crate::models::{Category, EntryId};
use crate::studio::Studio;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Swatchmix - Mix colors, animals, gems and more into named creations
#[derive(Parser)]
#[command(name = "swx")]
#[command(about = "Swatchmix - Pick items, mix them, name the result and keep it in a gallery")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (default: nearest swatchmix.toml, then the XDG config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the galleries (overrides [storage] dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Seconds to wait for the generator (overrides [generator] timeout_secs)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List categories with their selection bounds and how they mix
    Categories,

    /// List the items a category can mix
    Palette {
        #[arg(value_enum)]
        category: Category,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Blend colors and print the result with its emoji
    Blend {
        /// Colors in any CSS notation (#hex, rgb(), hsl(), names)
        #[arg(required = true)]
        colors: Vec<String>,
    },

    /// Select items, mix them, and optionally save the result
    Mix {
        #[arg(value_enum)]
        category: Category,

        /// Item ids from `swx palette <category>`
        #[arg(required = true)]
        ids: Vec<String>,

        /// Save the result to the gallery under this name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List saved entries
    Gallery {
        #[arg(value_enum)]
        category: Category,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a saved entry by id
    Delete {
        #[arg(value_enum)]
        category: Category,

        /// Entry id as shown by `swx gallery`
        id: EntryId,
    },

    /// Render saved color swatches to a PNG strip
    Render {
        #[arg(value_enum)]
        category: Category,

        /// Output file or directory (default: {category}_swatches.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Side of each swatch in pixels
        #[arg(long, default_value = "32", value_parser = clap::value_parser!(u32).range(1..=512))]
        cell: u32,
    },
}

impl GlobalArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides { data_dir: self.data_dir.clone(), timeout_secs: self.timeout }
    }

    fn log_config(&self) -> LogConfig {
        let config = LogConfig::from_verbosity(self.verbose);
        if self.log_json {
            config.with_format(LogFormat::Json)
        } else {
            config
        }
    }
}

/// Load the configuration named by the global flags.
pub(crate) fn load_settings(global: &GlobalArgs) -> Result<MixConfig, ExitCode> {
    match load_config(global.config.as_deref()) {
        Ok(mut config) => {
            merge_cli_overrides(&mut config, &global.overrides());
            debug!(dir = %config.storage.dir.display(), "settings resolved");
            Ok(config)
        }
        Err(e) => {
            error!(error = %e, "config rejected");
            eprintln!("Error: {}", e);
            Err(ExitCode::from(EXIT_INVALID_ARGS))
        }
    }
}

/// Open the studio over the configured galleries.
pub(crate) fn open_studio(global: &GlobalArgs) -> Result<Studio, ExitCode> {
    let config = load_settings(global)?;
    Studio::open(&config).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Build the async runtime used for generator calls.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, ExitCode> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|e| {
        eprintln!("Error: cannot start async runtime: {}", e);
        ExitCode::from(EXIT_ERROR)
    })
}

/// Collapse the `Result<ExitCode, ExitCode>` produced by the helpers above.
pub(crate) fn finish(result: Result<ExitCode, ExitCode>) -> ExitCode {
    result.unwrap_or_else(|code| code)
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.global.log_config()) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    match cli.command {
        Commands::Categories => info::run_categories(&cli.global),
        Commands::Palette { category, json } => info::run_palette(&cli.global, category, json),
        Commands::Blend { colors } => info::run_blend(&colors),
        Commands::Mix { category, ids, name } => {
            mix::run_mix(&cli.global, category, &ids, name.as_deref())
        }
        Commands::Gallery { category, json } => gallery::run_gallery(&cli.global, category, json),
        Commands::Delete { category, id } => gallery::run_delete(&cli.global, category, id),
        Commands::Render { category, output, cell } => {
            gallery::run_render(&cli.global, category, output.as_deref(), cell)
        }
    }
}
