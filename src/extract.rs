//! Extracción tolerante de objetos JSON embebidos en la salida libre del LLM.
//!
//! El modelo suele envolver el JSON en bloques ```json, añadir prosa antes o
//! después, o cortar la respuesta a mitad. Por cada salida se devuelve el
//! primer objeto `{...}` balanceado que sea JSON válido, o nada.

use serde_json::{Map, Value};
use tracing::debug;

pub type JsonObject = Map<String, Value>;

/// Extrae como mucho un objeto por salida, conservando el orden original.
/// Las salidas sin JSON válido no aportan nada.
pub fn extract_json_objects<S: AsRef<str>>(raw_outputs: &[S]) -> Vec<JsonObject> {
    raw_outputs
        .iter()
        .filter_map(|raw| first_json_object(raw.as_ref()))
        .collect()
}

/// Busca primero dentro de los bloques de código cercados y después en el
/// texto completo.
pub fn first_json_object(raw: &str) -> Option<JsonObject> {
    fenced_blocks(raw)
        .into_iter()
        .chain(std::iter::once(raw))
        .find_map(scan_for_object)
}

fn scan_for_object(text: &str) -> Option<JsonObject> {
    for (start, _) in text.match_indices('{') {
        let Some(end) = balanced_end(text, start) else {
            continue;
        };

        match serde_json::from_str::<Value>(&text[start..=end]) {
            Ok(Value::Object(object)) => return Some(object),
            Ok(_) => {}
            Err(e) => debug!("Fragmento JSON descartado en el byte {start}: {e}"),
        }
    }
    None
}

/// Índice del `}` que cierra la llave abierta en `start`, ignorando llaves
/// dentro de cadenas JSON.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Contenido de los bloques ``` ... ``` (sin la etiqueta de lenguaje).
fn fenced_blocks(raw: &str) -> Vec<&str> {
    raw.split("```")
        .skip(1)
        .step_by(2)
        .map(|block| match block.split_once('\n') {
            Some((tag, body)) if !tag.contains('{') => body,
            _ => block,
        })
        .collect()
}
