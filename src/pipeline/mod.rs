//! Audit pipeline
//!
//! Runs uploaded code through a fixed sequence of LLM stages: five narrow
//! analyses, a merge into one structured report, and a fixer pass that
//! produces corrected code. Stages run sequentially; every call goes
//! through the rotating client, and an all-keys-exhausted error aborts the
//! file with its type intact so batch drivers can stop cleanly.

pub mod prompts;

use crate::client::{CompletionBackend, RotatingClient};
use crate::error::Result;

/// The narrow analysis dimensions, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Style,
    Types,
    Security,
    Complexity,
    Documentation,
}

impl Stage {
    /// All analysis stages, in execution order
    pub const ALL: [Stage; 5] = [
        Stage::Style,
        Stage::Types,
        Stage::Security,
        Stage::Complexity,
        Stage::Documentation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Style => "style",
            Stage::Types => "type",
            Stage::Security => "security",
            Stage::Complexity => "complexity",
            Stage::Documentation => "documentation",
        }
    }

    fn instructions(&self) -> &'static str {
        match self {
            Stage::Style => prompts::STYLE,
            Stage::Types => prompts::TYPES,
            Stage::Security => prompts::SECURITY,
            Stage::Complexity => prompts::COMPLEXITY,
            Stage::Documentation => prompts::DOCUMENTATION,
        }
    }

    /// Build the full prompt for this stage over `code`
    pub fn prompt(&self, code: &str) -> String {
        prompts::analysis(self.instructions(), code)
    }
}

/// Completed review of one file
#[derive(Debug, Clone)]
pub struct FileReview {
    /// Merged audit report
    pub report: String,

    /// Corrected version of the code
    pub fixed_code: String,
}

/// Run the full audit pipeline over one file's contents
pub async fn review_code<B: CompletionBackend>(
    client: &mut RotatingClient<B>,
    code: &str,
) -> Result<FileReview> {
    let mut sections: Vec<(&'static str, String)> = Vec::with_capacity(Stage::ALL.len());

    for stage in Stage::ALL {
        tracing::debug!(stage = stage.name(), "running analysis stage");
        let output = client.invoke(&stage.prompt(code)).await?;
        sections.push((stage.name(), output));
    }

    let borrowed: Vec<(&str, &str)> = sections
        .iter()
        .map(|(name, body)| (*name, body.as_str()))
        .collect();

    let report = client.invoke(&prompts::report(&borrowed)).await?;
    let fixed_code = client.invoke(&prompts::fixer(code, &report)).await?;

    Ok(FileReview { report, fixed_code })
}
