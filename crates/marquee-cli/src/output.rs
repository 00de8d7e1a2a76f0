//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output (the response body as-is)
//! - JSON output (--json flag), shaped like a gateway proxy response
//! - Quiet mode for scripting (--quiet flag)

use marquee_core::Response;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in JSON mode
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a handler response
    pub fn print_response(&self, response: &Response) {
        if let Some(text) = self.render_response(response) {
            print!("{}", text);
        }
    }

    fn render_response(&self, response: &Response) -> Option<String> {
        match self.format {
            OutputFormat::Human => {
                let mut text = response.body.clone();
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                Some(text)
            }
            OutputFormat::Json => Some(format!(
                "{}\n",
                serde_json::json!({
                    "statusCode": response.status_code,
                    "body": response.body,
                })
            )),
            OutputFormat::Quiet => None,
        }
    }

    /// Print a success message (not in quiet mode)
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => println!("{}", serde_json::json!({ "message": message })),
            OutputFormat::Quiet => {}
        }
    }
}
