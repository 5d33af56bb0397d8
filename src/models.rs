//! Modelos de dominio: resumen por fichero, métricas de complejidad e informes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Método descrito por el modelo. Dos entradas con el mismo
/// `(method_name, signature)` se consideran el mismo método.
///
/// Los valores se guardan tal como llegan: el modelo no siempre respeta el
/// esquema y una descripción en forma de lista no debe invalidar el fichero.
/// Las claves no previstas se conservan en `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MethodSummary {
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub method_name: Option<Value>,
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub signature: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub description: Option<Value>,
    /// Estimación libre del modelo (número o texto).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Value>,
    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: Map<String, Value>,
}

/// Descripción estructurada de un fichero, fusionada a partir de sus chunks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FileSummary {
    #[serde(default)]
    pub file_summary: String,
    #[serde(default)]
    pub methods: Vec<MethodSummary>,
    #[serde(default)]
    pub mocks: Vec<String>,
    #[serde(default)]
    pub assertions: Vec<String>,
    #[serde(default)]
    pub noteworthy: Vec<String>,
}

/// Complejidad ciclomática de una función.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionComplexity {
    pub name: String,
    pub complexity: u32,
}

/// Resultado del análisis de un fichero del repositorio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAnalysis {
    #[serde(rename = "file")]
    pub path: String,
    pub description: FileSummary,
    #[serde(default)]
    pub complexity: Vec<FunctionComplexity>,
}

/// Primer informe: análisis de todos los ficheros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesReport {
    pub project: String,
    pub files: Vec<FileAnalysis>,
}

/// Segundo informe: resumen del proyecto más el análisis por fichero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReport {
    pub project: String,
    pub summary: String,
    pub files: Vec<FileAnalysis>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_files() -> Vec<FileAnalysis> {
        vec![
            FileAnalysis {
                path: "repo/app.py".to_string(),
                description: FileSummary {
                    file_summary: "Entry point. Parses arguments".to_string(),
                    methods: vec![MethodSummary {
                        method_name: Some(json!("main")),
                        signature: Some(json!("def main()")),
                        description: Some(json!("Runs the app")),
                        complexity: Some(json!(2)),
                        extra: Map::new(),
                    }],
                    mocks: vec![],
                    assertions: vec!["assert x".to_string()],
                    noteworthy: vec!["long method".to_string(), "long method".to_string()],
                },
                complexity: vec![FunctionComplexity {
                    name: "main".to_string(),
                    complexity: 2,
                }],
            },
            FileAnalysis {
                path: "repo/Empty.java".to_string(),
                description: FileSummary::default(),
                complexity: vec![],
            },
        ]
    }

    #[test]
    fn file_analysis_uses_file_key() {
        let value = serde_json::to_value(&sample_files()[1]).unwrap();
        assert_eq!(
            value,
            json!({
                "file": "repo/Empty.java",
                "description": {
                    "file_summary": "",
                    "methods": [],
                    "mocks": [],
                    "assertions": [],
                    "noteworthy": []
                },
                "complexity": []
            })
        );
    }

    #[test]
    fn project_report_survives_json_round_trip() {
        let report = ProjectReport {
            project: "Sakila".to_string(),
            summary: "A rental backend.".to_string(),
            files: sample_files(),
        };

        let text = serde_json::to_string_pretty(&report).unwrap();
        let parsed: ProjectReport = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn method_without_optional_fields_deserializes() {
        let method: MethodSummary =
            serde_json::from_value(json!({"method_name": "run"})).unwrap();
        assert_eq!(method.method_name, Some(json!("run")));
        assert_eq!(method.signature, None);
        assert_eq!(method.description, None);
    }

    #[test]
    fn method_keeps_free_form_values_and_unknown_keys() {
        let raw = json!({
            "method_name": "rent",
            "signature": "rent(f)",
            "description": ["checks stock", "charges"],
            "parameters": ["f"],
            "returns": "bool"
        });

        let method: MethodSummary = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(method.description, Some(json!(["checks stock", "charges"])));
        assert_eq!(method.extra.get("returns"), Some(&json!("bool")));
        assert_eq!(serde_json::to_value(&method).unwrap(), raw);
    }
}
