//! Mix command implementation

use std::process::ExitCode;

use tracing::info;

use crate::emoji::color_to_emoji;
use crate::engine::MixerError;
use crate::models::{Artifact, Category};
use crate::selection::Toggle;
use crate::studio::Studio;

use super::{finish, open_studio, runtime, GlobalArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the mix command: select `ids`, combine, and save if `name` is given.
pub fn run_mix(global: &GlobalArgs, category: Category, ids: &[String], name: Option<&str>) -> ExitCode {
    finish(open_studio(global).map(|mut studio| {
        let code = mix_into(&mut studio, category, ids, name);
        studio.shutdown();
        code
    }))
}

fn mix_into(studio: &mut Studio, category: Category, ids: &[String], name: Option<&str>) -> ExitCode {
    for id in ids {
        match studio.toggle(category, id) {
            Ok(Toggle::Added) => {}
            // Repeating an id on the command line deselects it
            Ok(Toggle::Removed) => {
                eprintln!("Error: '{}' was given twice", id);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                if matches!(e, MixerError::UnknownItem { .. }) {
                    eprintln!("Run `swx palette {}` to see what can be mixed.", category);
                }
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        }
    }

    let rt = match runtime() {
        Ok(rt) => rt,
        Err(code) => return code,
    };
    let artifact = match rt.block_on(studio.combine(category)) {
        Ok(artifact) => artifact,
        Err(e @ MixerError::NotReady { .. }) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match &artifact {
        Artifact::Color { value } => println!("{} {}", color_to_emoji(*value), value),
        Artifact::Image { url } => println!("{}", url),
        Artifact::Emoji { value } => println!("{}", value),
    }

    let Some(name) = name else {
        return ExitCode::from(EXIT_SUCCESS);
    };
    match studio.save(category, name) {
        Ok(entry) => {
            info!(category = %category, id = %entry.id, "saved from command line");
            println!("Saved #{} \"{}\" to the {} gallery", entry.id, entry.name, category);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e @ MixerError::EmptyName) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_INVALID_ARGS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
