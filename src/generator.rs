//! External artifact generation
//!
//! Every category except color delegates combination to an
//! [`ArtifactGenerator`]: something slow and unreliable outside the process
//! that turns a natural-language prompt into an image reference. The engine
//! only sees the trait; which service sits behind it is an integration
//! concern.

use std::fmt;
use std::process::Stdio;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::models::{Artifact, Category};

/// Error type for generation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// No generator is configured for this process
    #[error("no artifact generator is configured")]
    Unavailable,
    /// The generator finished but produced nothing usable
    #[error("the generator returned no result")]
    NoResult,
    /// The generator did not answer within the configured timeout
    #[error("the generator did not respond within {0} seconds")]
    TimedOut(u64),
    /// The generator reported a failure
    #[error("generation failed: {0}")]
    Failed(String),
}

/// Output image shape requested from the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    /// 1:1
    #[default]
    Square,
    /// 2:3, used for posters
    Portrait,
}

impl AspectRatio {
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "2:3",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placeholder replaced by the joined item phrases.
pub const ITEMS_PLACEHOLDER: &str = "{items}";

/// How a category turns selected phrases into a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Prompt text containing `{items}`.
    pub format: String,
    /// Separator placed between phrases.
    pub joiner: String,
    pub aspect: AspectRatio,
}

impl PromptTemplate {
    pub fn new(format: impl Into<String>, joiner: impl Into<String>, aspect: AspectRatio) -> Self {
        Self { format: format.into(), joiner: joiner.into(), aspect }
    }

    /// Default template for a generated category. `None` for color, which
    /// is blended locally.
    pub fn for_category(category: Category) -> Option<Self> {
        use AspectRatio::{Portrait, Square};

        let template = match category {
            Category::Color => return None,
            Category::Animal => Self::new(
                "A cute cartoon drawing of a {items} hybrid animal, simple background, children's book style",
                " mixed with ",
                Square,
            ),
            Category::Cartoon => Self::new(
                "A cartoon character that is a mix of {items}, colorful, expressive, clean line art",
                " and ",
                Square,
            ),
            Category::Movie => Self::new(
                "A dramatic movie poster for a film that mashes up {items}, cinematic lighting, bold title text",
                " meets ",
                Portrait,
            ),
            Category::Sequel => Self::new(
                "A movie poster for the sequel {items}, epic scale, cinematic, bold title text",
                ": ",
                Portrait,
            ),
            Category::Gem => Self::new(
                "A sparkling fantasy gemstone fusing {items}, faceted, glowing, dark velvet background",
                " and ",
                Square,
            ),
            Category::Food => Self::new(
                "A delicious dish that combines {items}, food photography, top-down view",
                " with ",
                Square,
            ),
            Category::Magic => Self::new(
                "A magical item forged from {items}, fantasy illustration, glowing runes",
                " and ",
                Square,
            ),
            Category::Creation => Self::new(
                "A whimsical illustration combining {items}, vibrant, imaginative, storybook style",
                ", ",
                Square,
            ),
        };
        Some(template)
    }

    /// Substitute the joined phrases for `{items}`.
    ///
    /// ```
    /// use swatchmix::generator::PromptTemplate;
    /// use swatchmix::models::Category;
    ///
    /// let t = PromptTemplate::for_category(Category::Animal).unwrap();
    /// assert!(t.render(&["Dog", "Fish"]).starts_with("A cute cartoon drawing of a Dog mixed with Fish hybrid"));
    /// ```
    pub fn render<S: AsRef<str>>(&self, phrases: &[S]) -> String {
        let joined = phrases.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(&self.joiner);
        self.format.replace(ITEMS_PLACEHOLDER, &joined)
    }
}

/// Everything a generator needs for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub category: Category,
    pub prompt: String,
    pub aspect: AspectRatio,
    /// Catalog ids the prompt was built from.
    pub source_ids: Vec<String>,
}

/// Produces an artifact from a prompt. May fail; may be slow.
#[async_trait]
pub trait ArtifactGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Artifact, GenerationError>;
}

/// Generator used when nothing is configured. Always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableGenerator;

#[async_trait]
impl ArtifactGenerator for UnavailableGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<Artifact, GenerationError> {
        Err(GenerationError::Unavailable)
    }
}

/// Runs an external program per request.
///
/// Arguments may contain `{prompt}`, `{aspect}` and `{category}`. The first
/// non-empty line the program prints to stdout is taken as the image
/// reference. A non-zero exit status or empty output is a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    fn expand_args(&self, request: &GenerationRequest) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{prompt}", &request.prompt)
                    .replace("{aspect}", request.aspect.as_str())
                    .replace("{category}", request.category.key())
            })
            .collect()
    }
}

#[async_trait]
impl ArtifactGenerator for CommandGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Artifact, GenerationError> {
        let args = self.expand_args(request);
        debug!(program = %self.program, category = %request.category, "running generator command");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| GenerationError::Failed(format!("cannot run '{}': {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, stderr = %stderr.trim(), "generator command failed");
            return Err(GenerationError::Failed(format!("'{}' exited with {}", self.program, output.status)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(Artifact::image)
            .ok_or(GenerationError::NoResult)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            category: Category::Movie,
            prompt: "a poster".to_string(),
            aspect: AspectRatio::Portrait,
            source_ids: vec!["Western".to_string()],
        }
    }

    #[test]
    fn test_animal_prompt_matches_joiner() {
        let t = PromptTemplate::for_category(Category::Animal).unwrap();
        assert_eq!(
            t.render(&["Dog", "Cat", "Owl"]),
            "A cute cartoon drawing of a Dog mixed with Cat mixed with Owl hybrid animal, simple background, children's book style"
        );
        assert_eq!(t.aspect, AspectRatio::Square);
    }

    #[test]
    fn test_posters_are_portrait() {
        for category in [Category::Movie, Category::Sequel] {
            assert_eq!(PromptTemplate::for_category(category).unwrap().aspect, AspectRatio::Portrait);
        }
        assert!(PromptTemplate::for_category(Category::Color).is_none());
    }

    #[test]
    fn test_every_template_has_placeholder() {
        for category in Category::ALL {
            if let Some(t) = PromptTemplate::for_category(category) {
                assert!(t.format.contains(ITEMS_PLACEHOLDER), "{}", category);
            }
        }
    }

    #[test]
    fn test_expand_args() {
        let g = CommandGenerator::new(
            "gen",
            vec!["--prompt={prompt}".into(), "{aspect}".into(), "{category}".into()],
        );
        assert_eq!(g.expand_args(&request()), vec!["--prompt=a poster", "2:3", "movie"]);
    }

    #[tokio::test]
    async fn test_unavailable_always_fails() {
        let result = UnavailableGenerator.generate(&request()).await;
        assert_eq!(result, Err(GenerationError::Unavailable));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_first_line_is_reference() {
        let g = CommandGenerator::new("sh", vec!["-c".into(), "echo; echo https://img.test/{category}.png".into()]);
        let artifact = g.generate(&request()).await.unwrap();
        assert_eq!(artifact, Artifact::image("https://img.test/movie.png"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_failure_and_empty_output() {
        let failing = CommandGenerator::new("sh", vec!["-c".into(), "exit 3".into()]);
        assert!(matches!(failing.generate(&request()).await, Err(GenerationError::Failed(_))));

        let silent = CommandGenerator::new("sh", vec!["-c".into(), "true".into()]);
        assert_eq!(silent.generate(&request()).await, Err(GenerationError::NoResult));
    }
}
