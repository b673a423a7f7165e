//! Product insight generation
//!
//! Produces a short marketing blurb for a product through an external text
//! generator. Generation never fails from the caller's point of view: missing
//! credentials, generator errors and empty output all map to fixed fallback
//! strings.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use thiserror::Error;
use tracing::{debug, error};

use crate::catalogue::Product;

/// Returned when no generator is configured or the credential is missing
pub const FALLBACK_NOT_CONFIGURED: &str = "API Key not configured. Unable to generate insight.";

/// Returned when the generator fails
pub const FALLBACK_UNAVAILABLE: &str = "Currently unable to generate AI insight.";

/// Returned when the generator succeeds with empty output
pub const FALLBACK_EMPTY: &str = "No insight available.";

/// Default environment variable holding the generator credential
pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";

/// Default retailer named in the prompt
pub const DEFAULT_RETAILER: &str = "the local hardware store";

/// Insight generation error types
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("Generator not found: {0}")]
    GeneratorNotFound(String),

    #[error("Generator failed: {0}")]
    GeneratorFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InsightError>;

/// A text generation backend
pub trait TextGenerator {
    /// Generate text for a prompt
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Generator backed by an external command.
///
/// The prompt is written to the command's stdin and its stdout is the
/// generated text. The command inherits the environment, so it can read
/// its own credential.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Resolve the program on `PATH`
    pub fn resolve(&self) -> Result<PathBuf> {
        which::which(&self.program).map_err(|_| InsightError::GeneratorNotFound(self.program.clone()))
    }
}

impl TextGenerator for CommandGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        let program = self.resolve()?;

        let mut child = Command::new(&program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // A generator may exit without reading its input, the exit status decides
            if let Err(e) = stdin.write_all(prompt.as_bytes()) {
                if e.kind() != ErrorKind::BrokenPipe {
                    abort(&mut child);
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InsightError::GeneratorFailed(format!(
                "{} exited with {}: {}",
                program.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Kill a generator we are giving up on and reap it
fn abort(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!(error = %e, "generator already exited");
    }
    let _ = child.wait();
}

/// Build the sales pitch prompt for a product
pub fn build_prompt(product: &Product, retailer: &str) -> String {
    let price_line = match product.original_price {
        Some(orig) => format!("Price: ${:.2} (On Sale from ${:.2})", product.price, orig),
        None => format!("Price: ${:.2}", product.price),
    };

    format!(
        "You are a helpful retail assistant for {retailer}.\n\
         Write a short, catchy, 2-sentence sales pitch for the following product.\n\
         Focus on value and utility.\n\
         \n\
         Product: {name}\n\
         Brand: {brand}\n\
         {price_line}\n\
         Description: {description}\n",
        name = product.name,
        brand = product.brand,
        description = product.description,
    )
}

/// Insight generation with soft failure
pub struct InsightService<G> {
    generator: Option<G>,
    retailer: String,
}

impl<G: TextGenerator> InsightService<G> {
    pub fn new(generator: Option<G>, retailer: impl Into<String>) -> Self {
        Self {
            generator,
            retailer: retailer.into(),
        }
    }

    /// Enable `generator` only when the credential variable `key_var` is set
    pub fn from_env(generator: G, key_var: &str, retailer: impl Into<String>) -> Self {
        let has_key = std::env::var(key_var).is_ok_and(|v| !v.trim().is_empty());
        if !has_key {
            debug!(key_var, "credential not set, insight generation disabled");
        }
        Self::new(has_key.then_some(generator), retailer)
    }

    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// Generate the insight text for a product
    pub fn generate_insight(&self, product: &Product) -> String {
        let Some(generator) = &self.generator else {
            return FALLBACK_NOT_CONFIGURED.to_string();
        };

        let prompt = build_prompt(product, &self.retailer);
        match generator.generate(&prompt) {
            Ok(text) if text.trim().is_empty() => FALLBACK_EMPTY.to_string(),
            Ok(text) => text,
            Err(e) => {
                error!(product = %product.id, error = %e, "error generating insight");
                FALLBACK_UNAVAILABLE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGenerator(Result<String>);

    impl TextGenerator for FixedGenerator {
        fn generate(&self, _prompt: &str) -> Result<String> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(InsightError::GeneratorFailed(e.to_string())),
            }
        }
    }

    fn product(original_price: Option<f64>) -> Product {
        Product {
            id: "p5".to_string(),
            name: "Barbecue".to_string(),
            brand: "Dyna-Glo".to_string(),
            sku: "6421-161".to_string(),
            price: 169.97,
            original_price,
            description: "3 burners.".to_string(),
            image_url: "bbq.jpg".to_string(),
            category: "Outdoor".to_string(),
            rating: 4.6,
        }
    }

    #[test]
    fn test_build_prompt_with_sale() {
        let prompt = build_prompt(&product(Some(249.99)), "Main Street Hardware");
        assert!(prompt.contains("retail assistant for Main Street Hardware"));
        assert!(prompt.contains("Product: Barbecue"));
        assert!(prompt.contains("Brand: Dyna-Glo"));
        assert!(prompt.contains("Price: $169.97 (On Sale from $249.99)"));
        assert!(prompt.contains("Description: 3 burners."));
    }

    #[test]
    fn test_build_prompt_without_sale() {
        let prompt = build_prompt(&product(None), DEFAULT_RETAILER);
        assert!(prompt.contains("Price: $169.97\n"));
        assert!(!prompt.contains("On Sale"));
    }

    #[test]
    fn test_not_configured() {
        let service: InsightService<FixedGenerator> = InsightService::new(None, DEFAULT_RETAILER);
        assert!(!service.is_enabled());
        assert_eq!(service.generate_insight(&product(None)), FALLBACK_NOT_CONFIGURED);
    }

    #[test]
    fn test_generator_text_returned() {
        let service = InsightService::new(
            Some(FixedGenerator(Ok("Grill like a pro.".to_string()))),
            DEFAULT_RETAILER,
        );
        assert_eq!(service.generate_insight(&product(None)), "Grill like a pro.");
    }

    #[test]
    fn test_generator_empty_output() {
        let service = InsightService::new(Some(FixedGenerator(Ok("  \n".to_string()))), DEFAULT_RETAILER);
        assert_eq!(service.generate_insight(&product(None)), FALLBACK_EMPTY);
    }

    #[test]
    fn test_generator_failure_is_soft() {
        let service = InsightService::new(
            Some(FixedGenerator(Err(InsightError::GeneratorFailed(
                "quota exceeded".to_string(),
            )))),
            DEFAULT_RETAILER,
        );
        assert_eq!(service.generate_insight(&product(None)), FALLBACK_UNAVAILABLE);
    }

    #[test]
    fn test_from_env_missing_key() {
        let service = InsightService::from_env(
            FixedGenerator(Ok("unused".to_string())),
            "FLYER_HOTSPOTS_TEST_KEY_THAT_IS_NEVER_SET",
            DEFAULT_RETAILER,
        );
        assert!(!service.is_enabled());
        assert_eq!(service.generate_insight(&product(None)), FALLBACK_NOT_CONFIGURED);
    }

    #[test]
    fn test_command_generator_not_found() {
        let generator = CommandGenerator::new("flyer-hotspots-no-such-generator", Vec::new());
        let result = generator.generate("prompt");
        assert!(matches!(result, Err(InsightError::GeneratorNotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_generator_echoes_stdin() {
        let generator = CommandGenerator::new("cat", Vec::new());
        let text = generator.generate("  hello flyer  \n").unwrap();
        assert_eq!(text, "hello flyer");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_generator_nonzero_exit() {
        let generator = CommandGenerator::new("false", Vec::new());
        let result = generator.generate("prompt");
        assert!(matches!(result, Err(InsightError::GeneratorFailed(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_abort_reaps_generator() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        abort(&mut child);
        let status = child.try_wait().unwrap().expect("child reaped");
        assert!(!status.success());
    }
}
