//! Plantillas de prompt para el análisis de código y el resumen del proyecto.

use crate::models::FileSummary;

const CODE_ANALYSIS_TEMPLATE: &str = r#"
You are a code analysis assistant. Analyze the following {language} code and return ONLY a valid JSON object with the following structure.
Do NOT include any additional commentary or formatting like markdown.

Field guide:
- "file_summary": one-line summary of what the file does (include both technical and business-level insights if possible).
- "methods": key methods only, each with "method_name", "signature" (full method signature), "description" and an optional cyclomatic "complexity" estimate.
- "mocks": list any mocks used.
- "assertions": list any assertions used.
- "noteworthy": boilerplate code, code quality issues (long methods, duplication, etc.), spelling mistakes in identifiers or comments, security concerns (weak encryption, SQL injection, hardcoded secrets), performance bottlenecks and refactoring suggestions.

JSON schema of the expected object:
{schema}

Code:
{code}
"#;

const PROJECT_SUMMARY_TEMPLATE: &str = r#"
You are given summaries of several source files in a software project.
Based on these, generate a high-level overview of the project including:
- Its primary purpose
- Its core components
- Testing strategy or mocks/assertions usage
- Anything noteworthy

Summaries:
{summaries}
"#;

/// Prompt para analizar un chunk de código escrito en `language`.
pub fn code_analysis_prompt(language: &str, code: &str) -> String {
    CODE_ANALYSIS_TEMPLATE
        .replace("{language}", language)
        .replace("{schema}", &summary_schema())
        .replace("{code}", code)
}

/// Prompt de síntesis a partir de los resúmenes serializados de cada fichero.
pub fn project_summary_prompt(summaries: &str) -> String {
    PROJECT_SUMMARY_TEMPLATE.replace("{summaries}", summaries)
}

fn summary_schema() -> String {
    let schema = schemars::schema_for!(FileSummary);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
