//! Complejidad ciclomática por función usando tree-sitter.
//!
//! De momento sólo Python; para el resto de lenguajes se devuelve una lista
//! vacía. Cada función vale 1 más sus puntos de decisión (`if`/`elif`,
//! bucles y su `else`, `except` y el `else` de `try`, `case`, `assert`,
//! operadores booleanos, expresiones condicionales y comprensiones). Sólo se
//! reportan funciones y métodos: las clases no tienen entrada propia.
//!
//! El árbol se recorre con una pila explícita; una expresión muy anidada no
//! debe agotar la pila del hilo.

use tree_sitter::{Node, Parser};
use tracing::warn;

use crate::models::FunctionComplexity;

/// Capacidad de medir la complejidad de un fichero. Nunca falla: si el
/// lenguaje no está soportado o el código no se puede analizar, devuelve `[]`.
pub trait ComplexityAnalyzer: Send + Sync {
    fn compute(&self, code: &str, language: &str) -> Vec<FunctionComplexity>;
}

/// Nodos de tree-sitter-python que abren un camino de decisión.
const PYTHON_DECISION_NODES: &[&str] = &[
    "if_statement",
    "elif_clause",
    "for_statement",
    "while_statement",
    "except_clause",
    "case_clause",
    "assert_statement",
    "boolean_operator",
    "conditional_expression",
    "for_in_clause",
    "if_clause",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSitterComplexity;

impl ComplexityAnalyzer for TreeSitterComplexity {
    fn compute(&self, code: &str, language: &str) -> Vec<FunctionComplexity> {
        if !language.eq_ignore_ascii_case("python") {
            return Vec::new();
        }

        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&tree_sitter_python::LANGUAGE.into()) {
            warn!("No se pudo cargar la gramática de Python: {e}");
            return Vec::new();
        }
        let Some(tree) = parser.parse(code, None) else {
            warn!("tree-sitter no pudo analizar el código");
            return Vec::new();
        };

        collect_functions(tree.root_node(), code)
    }
}

/// Funciones en orden de aparición (preorden), anidadas incluidas.
fn collect_functions(root: Node, code: &str) -> Vec<FunctionComplexity> {
    let mut functions = Vec::new();
    let mut cursor = root.walk();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if node.kind() == "function_definition" {
            let name = node
                .child_by_field_name("name")
                .and_then(|n| n.utf8_text(code.as_bytes()).ok())
                .unwrap_or("<anonymous>")
                .to_string();
            let complexity = 1 + node
                .child_by_field_name("body")
                .map(count_decisions)
                .unwrap_or(0);
            functions.push(FunctionComplexity { name, complexity });
        }

        let children: Vec<_> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    functions
}

/// Cuenta puntos de decisión sin entrar en funciones anidadas, que se
/// reportan por separado.
fn count_decisions(body: Node) -> u32 {
    let mut total = 0;
    let mut cursor = body.walk();
    let mut stack = vec![body];

    while let Some(node) = stack.pop() {
        let children: Vec<_> = node.children(&mut cursor).collect();
        for child in children {
            match child.kind() {
                "function_definition" => continue,
                // El `else` de un `if` no abre camino nuevo; el de un bucle o un `try` sí.
                "else_clause" if node.kind() != "if_statement" => total += 1,
                kind if PYTHON_DECISION_NODES.contains(&kind) => total += 1,
                _ => {}
            }
            stack.push(child);
        }
    }
    total
}
