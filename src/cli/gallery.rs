//! Gallery command implementations (gallery, delete, render)

use std::path::Path;
use std::process::ExitCode;

use crate::models::{Artifact, Category, EntryId};
use crate::output::{save_png, swatch_output_path};
use crate::renderer::render_swatches;

use super::{finish, open_studio, GlobalArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the gallery command
pub fn run_gallery(global: &GlobalArgs, category: Category, json: bool) -> ExitCode {
    finish(open_studio(global).map(|studio| {
        let entries = studio.engine(category).gallery().list();

        if json {
            return match serde_json::to_string_pretty(entries) {
                Ok(out) => {
                    println!("{}", out);
                    ExitCode::from(EXIT_SUCCESS)
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(EXIT_ERROR)
                }
            };
        }

        if entries.is_empty() {
            println!("No saved {} entries yet.", category);
            return ExitCode::from(EXIT_SUCCESS);
        }

        println!("{} gallery ({} saved):", category.title(), entries.len());
        for entry in entries {
            let detail = match &entry.artifact {
                Some(Artifact::Emoji { .. }) | None => String::new(),
                Some(artifact) => artifact.reference(),
            };
            println!(
                "  #{:<4} {}  {}  {}",
                entry.id,
                entry.display_asset(category),
                entry.name,
                detail
            );
        }
        ExitCode::from(EXIT_SUCCESS)
    }))
}

/// Execute the delete command
pub fn run_delete(global: &GlobalArgs, category: Category, id: EntryId) -> ExitCode {
    finish(open_studio(global).map(|mut studio| {
        let code = match studio.delete(category, id) {
            Ok(Some(entry)) => {
                println!("Deleted #{} \"{}\"", entry.id, entry.name);
                ExitCode::from(EXIT_SUCCESS)
            }
            Ok(None) => {
                eprintln!("Error: no entry #{} in the {} gallery", id, category);
                ExitCode::from(EXIT_INVALID_ARGS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
        studio.shutdown();
        code
    }))
}

/// Execute the render command
pub fn run_render(global: &GlobalArgs, category: Category, output: Option<&Path>, cell: u32) -> ExitCode {
    finish(open_studio(global).map(|studio| {
        let entries = studio.engine(category).gallery().list();
        if entries.is_empty() {
            eprintln!("Error: the {} gallery is empty, nothing to render", category);
            return ExitCode::from(EXIT_ERROR);
        }

        let image = render_swatches(entries, cell);
        let path = swatch_output_path(category, output);
        match save_png(&image, &path) {
            Ok(()) => {
                println!("Saved: {}", path.display());
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: Failed to save '{}': {}", path.display(), e);
                ExitCode::from(EXIT_ERROR)
            }
        }
    }))
}
