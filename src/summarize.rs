//! Orquestación del análisis: fichero → chunks → LLM → JSON → resumen
//! fusionado, y síntesis final del proyecto.

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::{
    chunking::TextSplitter,
    complexity::ComplexityAnalyzer,
    extract::{self, JsonObject},
    llm::ModelInvoker,
    merge,
    models::{FileAnalysis, FileSummary, FunctionComplexity},
    prompts,
};

/// Marca que sustituye al resumen del proyecto cuando la llamada al LLM falla.
pub const PROJECT_SUMMARY_ERROR: &str = "[Project Summary Error]";

const PREVIEW_CHARS: usize = 500;

pub struct Summarizer<M, C> {
    model: M,
    analyzer: C,
    splitter: TextSplitter,
}

impl<M: ModelInvoker, C: ComplexityAnalyzer> Summarizer<M, C> {
    pub fn new(model: M, analyzer: C, splitter: TextSplitter) -> Self {
        Self {
            model,
            analyzer,
            splitter,
        }
    }

    /// Analiza un fichero completo. Nunca falla: los chunks cuya llamada al
    /// LLM falla se omiten y cualquier error al fusionar o medir deja la
    /// descripción y la complejidad vacías.
    pub async fn analyze_file(&self, code: &str, language: &str, path: &str) -> FileAnalysis {
        let chunks = self.splitter.split(code);
        let total = chunks.len();
        let mut raw_outputs = Vec::with_capacity(total);

        for (i, chunk) in chunks.iter().enumerate() {
            info!("Resumiendo chunk {}/{} de {}...", i + 1, total, path);
            debug!("Vista previa del chunk:\n{}...", preview(chunk));

            let prompt = prompts::code_analysis_prompt(language, chunk);
            match self.model.invoke(&prompt).await {
                Ok(output) => {
                    debug!("Respuesta del LLM:\n{output}");
                    raw_outputs.push(output);
                }
                Err(e) => warn!("Fallo resumiendo el chunk {}/{} de {}: {e:#}", i + 1, total, path),
            }
        }

        let objects = extract::extract_json_objects(&raw_outputs);
        debug!(
            "{} objetos JSON extraídos de {} respuestas para {}",
            objects.len(),
            raw_outputs.len(),
            path
        );

        let (description, complexity) = match self.merge_and_measure(objects, code, language) {
            Ok(result) => result,
            Err(e) => {
                error!("Error fusionando resúmenes o calculando complejidad de {path}: {e:#}");
                (FileSummary::default(), Vec::new())
            }
        };

        FileAnalysis {
            path: path.to_string(),
            description,
            complexity,
        }
    }

    fn merge_and_measure(
        &self,
        objects: Vec<JsonObject>,
        code: &str,
        language: &str,
    ) -> Result<(FileSummary, Vec<FunctionComplexity>)> {
        let description = merge::merge_chunk_summaries(objects)?;
        debug!("Resumen fusionado: {description:?}");
        let complexity = self.analyzer.compute(code, language);
        Ok((description, complexity))
    }

    /// Pide al LLM una visión general del proyecto. Si la llamada falla se
    /// devuelve una marca de error en lugar del resumen.
    pub async fn summarize_project(&self, descriptions: &[FileSummary]) -> String {
        let payload = match serde_json::to_string_pretty(descriptions) {
            Ok(payload) => payload,
            Err(e) => return format!("{PROJECT_SUMMARY_ERROR}: {e}"),
        };

        let prompt = prompts::project_summary_prompt(&payload);
        match self.model.invoke(&prompt).await {
            Ok(summary) => summary.trim().to_string(),
            Err(e) => {
                error!("Error generando el resumen del proyecto: {e:#}");
                format!("{PROJECT_SUMMARY_ERROR}: {e}")
            }
        }
    }
}

fn preview(chunk: &str) -> String {
    chunk.chars().take(PREVIEW_CHARS).collect()
}
