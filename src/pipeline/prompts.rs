//! Prompt builders for the audit stages.

/// Prompt for one analysis stage
pub fn analysis(stage_instructions: &str, code: &str) -> String {
    format!("{stage_instructions}\n\nCode:\n{code}\n")
}

pub const STYLE: &str = "\
You are a professional static code style analyzer.

Perform style linting on this Python/SQL code:
- PEP8 compliance
- Naming conventions
- Formatting and indentation
- Readability issues";

pub const TYPES: &str = "\
Perform static type analysis.

Check:
- Type mismatches
- Missing type hints (Python)
- SQL datatype problems
- Logical type inconsistencies";

pub const SECURITY: &str = "\
Perform static security analysis.

Check for:
- SQL injection
- Hardcoded credentials
- Unsafe eval/exec
- Input validation issues
- Deserialization risks
- Injection vulnerabilities";

pub const COMPLEXITY: &str = "\
Analyze code complexity.

Check:
- Cyclomatic complexity
- Deep nesting
- Long functions
- Duplicate logic
- Maintainability issues";

pub const DOCUMENTATION: &str = "\
Review documentation quality.

Check:
- Missing docstrings
- Missing comments
- Poor function explanations
- API documentation gaps";

/// Prompt merging the stage reports into one audit report
pub fn report(sections: &[(&str, &str)]) -> String {
    let mut prompt = String::from("Create a professional structured code audit report.\n");

    for (title, body) in sections {
        prompt.push_str(&format!("\n{} ANALYSIS:\n{}\n", title.to_uppercase(), body));
    }

    prompt.push_str(
        "\nGenerate:\n\
         1. Executive Summary\n\
         2. Detailed Findings\n\
         3. Risk Severity (Low/Medium/High)\n\
         4. Actionable Recommendations\n",
    );

    prompt
}

/// Prompt producing corrected code from the original plus the audit report
pub fn fixer(code: &str, report: &str) -> String {
    format!(
        "You are a senior software engineer.\n\n\
         Fix the following code based on the audit report.\n\n\
         ORIGINAL CODE:\n{code}\n\n\
         AUDIT REPORT:\n{report}\n\n\
         Return ONLY the improved corrected code."
    )
}
