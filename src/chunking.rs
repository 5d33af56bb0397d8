//! División de ficheros en chunks solapados para el LLM.
//!
//! Se prueban los separadores en orden (párrafo, línea, frase, espacio y, como
//! último recurso, carácter a carácter). Los trozos pequeños se agrupan hasta
//! `chunk_size` caracteres y cada chunk arrastra como mucho `chunk_overlap`
//! caracteres del anterior.

use std::collections::VecDeque;

use anyhow::{bail, Result};

const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            bail!("El tamaño de chunk debe ser mayor que 0");
        }
        if chunk_overlap >= chunk_size {
            bail!(
                "El solapamiento ({chunk_overlap}) debe ser menor que el tamaño de chunk ({chunk_size})"
            );
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Divide `text` en chunks. Un texto vacío o más corto que `chunk_size`
    /// produce un único chunk con el texto tal cual.
    pub fn split(&self, text: &str) -> Vec<String> {
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }
        self.split_recursive(text, &SEPARATORS)
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (separator, remaining) = pick_separator(text, separators);

        let mut chunks = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge_pieces(&pending));
                pending.clear();
            }

            if remaining.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge_pieces(&pending));
        }
        chunks
    }

    /// Agrupa trozos contiguos en ventanas de hasta `chunk_size` caracteres.
    fn merge_pieces(&self, pieces: &[String]) -> Vec<String> {
        let mut merged = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_joined(&window, &mut merged);

                // La cola que sobrevive es el solapamiento con el siguiente chunk.
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }

            window.push_back((piece.as_str(), len));
            total += len;
        }

        push_joined(&window, &mut merged);
        merged
    }
}

fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (i, &separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return (separator, &[]);
        }
        if text.contains(separator) {
            return (separator, &separators[i + 1..]);
        }
    }
    ("", &[])
}

/// El separador queda pegado al inicio del trozo siguiente.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut parts = text.split(separator);
    let mut pieces = Vec::new();
    if let Some(first) = parts.next() {
        pieces.push(first.to_string());
    }
    pieces.extend(parts.map(|part| format!("{separator}{part}")));
    pieces.retain(|piece| !piece.is_empty());
    pieces
}

fn push_joined(window: &VecDeque<(&str, usize)>, out: &mut Vec<String>) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
