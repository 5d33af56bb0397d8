//! Fusión de los resúmenes por chunk en un único `FileSummary`.
//!
//! Sólo se deduplican `file_summary` (por frases) y `methods` (por nombre y
//! firma); `mocks`, `assertions` y `noteworthy` se concatenan tal cual.

use std::collections::HashSet;

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::extract::JsonObject;
use crate::models::{FileSummary, MethodSummary};

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.。!?]\s*").expect("regex válida"));

/// Fusiona los objetos extraídos de cada chunk. Una lista vacía produce el
/// resumen por defecto; un campo con un tipo JSON inesperado es un error.
pub fn merge_chunk_summaries(objects: Vec<JsonObject>) -> Result<FileSummary> {
    if objects.is_empty() {
        return Ok(FileSummary::default());
    }

    let mut narratives = Vec::with_capacity(objects.len());
    let mut methods = Vec::new();
    let mut mocks = Vec::new();
    let mut assertions = Vec::new();
    let mut noteworthy = Vec::new();

    for (index, mut object) in objects.into_iter().enumerate() {
        narratives.push(narrative_text(object.remove("file_summary")));

        methods.extend(
            method_list(object.remove("methods"))
                .with_context(|| format!("'methods' inválido en el chunk {}", index + 1))?,
        );
        mocks.extend(text_list(object.remove("mocks"), "mocks")?);
        assertions.extend(text_list(object.remove("assertions"), "assertions")?);
        noteworthy.extend(text_list(object.remove("noteworthy"), "noteworthy")?);
    }

    Ok(FileSummary {
        file_summary: deduplicate_sentences(narratives.join(" ").trim()),
        methods: deduplicate_methods(methods),
        mocks,
        assertions,
        noteworthy,
    })
}

/// Elimina frases repetidas conservando el orden de primera aparición.
/// Las frases se reconstruyen unidas por ". ".
pub fn deduplicate_sentences(summary: &str) -> String {
    let mut seen = HashSet::new();
    let unique: Vec<&str> = SENTENCE_END
        .split(summary)
        .filter(|sentence| !sentence.trim().is_empty())
        .filter(|sentence| seen.insert(*sentence))
        .collect();
    unique.join(". ").trim().to_string()
}

/// La primera aparición de cada `(method_name, signature)` gana. Los valores
/// se comparan por su texto JSON, así que `"f"` y `["f"]` son distintos.
pub fn deduplicate_methods(methods: Vec<MethodSummary>) -> Vec<MethodSummary> {
    let mut seen = HashSet::new();
    methods
        .into_iter()
        .filter(|method| {
            let key = (
                method.method_name.as_ref().map(Value::to_string),
                method.signature.as_ref().map(Value::to_string),
            );
            seen.insert(key)
        })
        .collect()
}

fn narrative_text(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    }
}

fn method_list(value: Option<Value>) -> Result<Vec<MethodSummary>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(_) => serde_json::from_value::<MethodSummary>(item).map_err(Into::into),
                other => Err(anyhow!("cada método debería ser un objeto y se recibió {other}")),
            })
            .collect(),
        Some(other) => Err(anyhow!("se esperaba una lista y se recibió {other}")),
    }
}

fn text_list(value: Option<Value>, field: &str) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .map(|item| match item {
                Value::String(text) => text,
                other => other.to_string(),
            })
            .collect()),
        Some(other) => Err(anyhow!("'{field}' debería ser una lista y es {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn objects(values: Vec<Value>) -> Vec<JsonObject> {
        values
            .into_iter()
            .map(|value| match value {
                Value::Object(object) => object,
                other => panic!("no es un objeto: {other}"),
            })
            .collect()
    }

    #[test]
    fn empty_input_gives_default_summary() {
        assert_eq!(merge_chunk_summaries(Vec::new()).unwrap(), FileSummary::default());
    }

    #[test]
    fn duplicate_sentences_collapse() {
        let merged =
            merge_chunk_summaries(objects(vec![json!({"file_summary": "Parses input. Parses input."})]))
                .unwrap();
        assert_eq!(merged.file_summary, "Parses input");
    }

    #[test]
    fn narratives_join_across_chunks_in_order() {
        let merged = merge_chunk_summaries(objects(vec![
            json!({"file_summary": "Loads config. Validates it!"}),
            json!({"methods": []}),
            json!({"file_summary": "Validates it? Writes report。Loads config."}),
        ]))
        .unwrap();
        assert_eq!(merged.file_summary, "Loads config. Validates it. Writes report");
    }

    #[test]
    fn first_method_with_same_name_and_signature_wins() {
        let merged = merge_chunk_summaries(objects(vec![
            json!({"methods": [
                {"method_name": "save", "signature": "void save(Film f)", "description": "first"},
                {"method_name": "save", "signature": "void save(Actor a)", "description": "overload"}
            ]}),
            json!({"methods": [
                {"method_name": "save", "signature": "void save(Film f)", "description": "second", "complexity": 4}
            ]}),
        ]))
        .unwrap();

        assert_eq!(merged.methods.len(), 2);
        assert_eq!(merged.methods[0].description, Some(json!("first")));
        assert_eq!(merged.methods[0].complexity, None);
        assert_eq!(merged.methods[1].signature, Some(json!("void save(Actor a)")));
    }

    #[test]
    fn off_schema_method_values_keep_the_rest_of_the_file() {
        let merged = merge_chunk_summaries(objects(vec![json!({
            "file_summary": "Rents films.",
            "methods": [
                {"method_name": "rent", "signature": "rent(f)", "description": ["checks stock", "charges"]},
                {"method_name": "rent", "signature": "rent(f)", "parameters": ["f"], "returns": "bool"},
                {"method_name": "late_fee", "signature": "late_fee(days)", "parameters": ["days"]}
            ],
            "noteworthy": ["n"]
        })]))
        .unwrap();

        assert_eq!(merged.file_summary, "Rents films");
        assert_eq!(merged.noteworthy, vec!["n"]);
        assert_eq!(
            serde_json::to_value(&merged.methods).unwrap(),
            json!([
                {"method_name": "rent", "signature": "rent(f)", "description": ["checks stock", "charges"]},
                {"method_name": "late_fee", "signature": "late_fee(days)", "parameters": ["days"]}
            ])
        );
    }

    #[test]
    fn list_fields_concatenate_without_dedup() {
        let merged = merge_chunk_summaries(objects(vec![
            json!({"noteworthy": ["a"], "mocks": ["Mockito"]}),
            json!({"noteworthy": ["a"], "assertions": ["assertEquals", 3]}),
        ]))
        .unwrap();

        assert_eq!(merged.noteworthy, vec!["a", "a"]);
        assert_eq!(merged.mocks, vec!["Mockito"]);
        assert_eq!(merged.assertions, vec!["assertEquals", "3"]);
    }

    #[test]
    fn missing_and_null_fields_default_to_empty() {
        let merged = merge_chunk_summaries(objects(vec![
            json!({"file_summary": null, "methods": null}),
            json!({"unrelated": true}),
        ]))
        .unwrap();
        assert_eq!(merged, FileSummary::default());
    }

    #[test]
    fn non_string_summary_uses_json_text() {
        let merged = merge_chunk_summaries(objects(vec![json!({"file_summary": 42})])).unwrap();
        assert_eq!(merged.file_summary, "42");
    }

    #[test]
    fn wrong_field_types_fail_the_merge() {
        assert!(merge_chunk_summaries(objects(vec![json!({"methods": "none"})])).is_err());
        assert!(merge_chunk_summaries(objects(vec![json!({"methods": ["save"]})])).is_err());
        assert!(merge_chunk_summaries(objects(vec![json!({"mocks": {"a": 1}})])).is_err());
    }
}
