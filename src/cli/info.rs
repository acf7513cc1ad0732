//! Info command implementations (categories, palette, blend)

use std::process::ExitCode;

use crate::catalog::{builtin, ItemCatalog};
use crate::color::{blend_colors, parse_color};
use crate::emoji::color_to_emoji;
use crate::engine::CombineStrategy;
use crate::models::{CatalogItem, Category};

use super::{finish, load_settings, open_studio, GlobalArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the categories command
pub fn run_categories(global: &GlobalArgs) -> ExitCode {
    finish(load_settings(global).map(|config| {
        println!("{:<10} {:<18} {:<8} MIXES BY", "CATEGORY", "TITLE", "PICK");
        for category in Category::ALL {
            let mixer = config.mixer_config(category);
            let bounds = match mixer.max_select {
                Some(max) if max == mixer.min_select => format!("{}", max),
                Some(max) => format!("{}-{}", mixer.min_select, max),
                None => format!("{}+", mixer.min_select),
            };
            let how = match mixer.strategy {
                CombineStrategy::Blend => "blending",
                CombineStrategy::Generate(_) => "generator",
            };
            println!("{:<10} {:<18} {:<8} {}", category.key(), category.title(), bounds, how);
        }
        ExitCode::from(EXIT_SUCCESS)
    }))
}

/// Execute the palette command
///
/// The creation palette depends on saved galleries, so it goes through the
/// studio; every other palette is static.
pub fn run_palette(global: &GlobalArgs, category: Category, json: bool) -> ExitCode {
    let items: Vec<CatalogItem> = if category.is_composite() {
        match open_studio(global) {
            Ok(studio) => studio.engine(category).catalog().items().to_vec(),
            Err(code) => return code,
        }
    } else {
        match load_settings(global) {
            Ok(config) => builtin(category, &config.palette.extra_colors).items().to_vec(),
            Err(code) => return code,
        }
    };

    if json {
        return match serde_json::to_string_pretty(&items) {
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

    if items.is_empty() {
        println!("The {} palette is empty.", category.title());
        if category.is_composite() {
            println!("Save something in another mixer first.");
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    println!("{} ({} items):", category.title(), items.len());
    for item in &items {
        if item.label == item.id {
            println!("  {}  {}", item.asset, item.id);
        } else {
            println!("  {}  {}  ({})", item.asset, item.id, item.label);
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the blend command
///
/// Unlike the color mixer, arguments are not limited to the palette. A color
/// that cannot be parsed is an argument error here rather than being
/// treated as black.
pub fn run_blend(colors: &[String]) -> ExitCode {
    for color in colors {
        if let Err(e) = parse_color(color) {
            eprintln!("Error: '{}': {}", color, e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    }

    let blended = blend_colors(colors);
    println!("{} {}", color_to_emoji(blended), blended);
    ExitCode::from(EXIT_SUCCESS)
}
