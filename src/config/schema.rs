//! Configuration schema types for `swatchmix.toml`
//!
//! Every section is optional; an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::color::parse_color;
use crate::engine::{CombineStrategy, MixerConfig};
use crate::generator::{PromptTemplate, ITEMS_PLACEHOLDER};
use crate::models::Category;

/// Where galleries are kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per category
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".swatchmix")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { dir: default_storage_dir() }
    }
}

/// External image generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Program to run per request; generation is unavailable when unset
    #[serde(default)]
    pub command: Option<String>,
    /// Arguments; `{prompt}`, `{aspect}` and `{category}` are substituted
    #[serde(default = "default_generator_args")]
    pub args: Vec<String>,
    /// Seconds to wait before treating a request as failed
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_generator_args() -> Vec<String> {
    vec!["{prompt}".to_string()]
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { command: None, args: default_generator_args(), timeout_secs: default_timeout_secs() }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Color palette additions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaletteConfig {
    /// Extra swatches appended to the built-in color palette
    #[serde(default)]
    pub extra_colors: Vec<String>,
}

/// Per-category overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryConfig {
    #[serde(default)]
    pub min_select: Option<usize>,
    #[serde(default)]
    pub max_select: Option<usize>,
    /// Prompt template; must contain `{items}`
    #[serde(default)]
    pub prompt: Option<String>,
    /// Separator between item phrases in the prompt
    #[serde(default)]
    pub joiner: Option<String>,
}

/// Root configuration structure for `swatchmix.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
    /// Keyed by category name (`color`, `animal`, ...)
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryConfig>,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "categories.animal.prompt")
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "swatchmix.toml: '{}' {}", self.field, self.message)
    }
}

impl MixConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: String, message: &str| {
            errors.push(ConfigValidationError { field, message: message.to_string() });
        };

        if self.generator.timeout_secs == 0 {
            push("generator.timeout_secs".into(), "must be a positive integer");
        }
        if matches!(&self.generator.command, Some(c) if c.trim().is_empty()) {
            push("generator.command".into(), "must not be empty");
        }

        for (i, color) in self.palette.extra_colors.iter().enumerate() {
            if parse_color(color).is_err() {
                push(format!("palette.extra_colors[{}]", i), "is not a recognized color");
            }
        }

        for (name, overrides) in &self.categories {
            let Ok(category) = name.parse::<Category>() else {
                push(format!("categories.{}", name), "is not a known category");
                continue;
            };
            let defaults = MixerConfig::for_category(category);
            let min = overrides.min_select.unwrap_or(defaults.min_select);
            let max = overrides.max_select.or(defaults.max_select);

            if min == 0 {
                push(format!("categories.{}.min_select", name), "must be at least 1");
            }
            if matches!(max, Some(max) if max < min) {
                push(format!("categories.{}.max_select", name), "must not be less than min_select");
            }
            if let Some(prompt) = &overrides.prompt {
                if category == Category::Color {
                    push(format!("categories.{}.prompt", name), "colors are blended, not generated");
                } else if !prompt.contains(ITEMS_PLACEHOLDER) {
                    push(format!("categories.{}.prompt", name), "must contain {items}");
                }
            }
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Engine settings for a category: built-in defaults with any
    /// `[categories.<name>]` overrides applied.
    pub fn mixer_config(&self, category: Category) -> MixerConfig {
        let mut config = MixerConfig::for_category(category);
        let Some(overrides) = self.categories.get(category.key()) else {
            return config;
        };

        if let Some(min) = overrides.min_select {
            config.min_select = min;
        }
        if overrides.max_select.is_some() {
            config.max_select = overrides.max_select;
        }
        if let CombineStrategy::Generate(template) = &mut config.strategy {
            if let Some(prompt) = &overrides.prompt {
                template.format = prompt.clone();
            }
            if let Some(joiner) = &overrides.joiner {
                template.joiner = joiner.clone();
            }
        }
        config
    }

    /// Prompt template in effect for a category, if it is generated.
    pub fn prompt_template(&self, category: Category) -> Option<PromptTemplate> {
        match self.mixer_config(category).strategy {
            CombineStrategy::Generate(template) => Some(template),
            CombineStrategy::Blend => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_valid() {
        let config: MixConfig = toml::from_str("").unwrap();
        assert!(config.is_valid());
        assert_eq!(config.storage.dir, PathBuf::from(".swatchmix"));
        assert_eq!(config.generator.timeout(), Duration::from_secs(60));
        assert_eq!(config.generator.args, vec!["{prompt}"]);
    }

    #[test]
    fn test_overrides_apply() {
        let config: MixConfig = toml::from_str(
            r#"
[categories.animal]
min_select = 3
max_select = 4
joiner = " + "

[categories.color]
max_select = 5
"#,
        )
        .unwrap();
        assert!(config.is_valid(), "{:?}", config.validate());

        let animal = config.mixer_config(Category::Animal);
        assert_eq!((animal.min_select, animal.max_select), (3, Some(4)));
        assert_eq!(config.prompt_template(Category::Animal).unwrap().joiner, " + ");

        let color = config.mixer_config(Category::Color);
        assert_eq!((color.min_select, color.max_select), (2, Some(5)));
        assert_eq!(color.strategy, CombineStrategy::Blend);

        assert_eq!(config.mixer_config(Category::Gem), MixerConfig::for_category(Category::Gem));
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let config: MixConfig = toml::from_str(
            r##"
[generator]
timeout_secs = 0

[palette]
extra_colors = ["#12345", "red"]

[categories.dragon]
min_select = 1

[categories.food]
min_select = 0

[categories.gem]
min_select = 3
max_select = 2
prompt = "no placeholder"
"##,
        )
        .unwrap();

        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "generator.timeout_secs",
                "palette.extra_colors[0]",
                "categories.dragon",
                "categories.food.min_select",
                "categories.gem.max_select",
                "categories.gem.prompt",
            ]
        );
    }

    #[test]
    fn test_color_prompt_rejected() {
        let mut config = MixConfig::default();
        config.categories.insert(
            "color".into(),
            CategoryConfig { prompt: Some("{items}".into()), ..Default::default() },
        );
        assert_eq!(config.validate()[0].field, "categories.color.prompt");
    }
}
