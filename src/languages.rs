//! Tabla extensión → lenguaje usada para decidir qué ficheros se analizan.

use std::path::Path;

use anyhow::{anyhow, Result};

const DEFAULT_EXTENSIONS: [(&str, &str); 12] = [
    (".py", "Python"),
    (".java", "Java"),
    (".js", "JavaScript"),
    (".ts", "TypeScript"),
    (".go", "Go"),
    (".rb", "Ruby"),
    (".cpp", "C++"),
    (".cs", "C#"),
    (".php", "PHP"),
    (".rs", "Rust"),
    (".kt", "Kotlin"),
    (".html", "Html"),
];

/// Conjunto ordenado de extensiones reconocidas. Gana la primera entrada
/// cuyo sufijo coincide con el nombre del fichero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageMap {
    entries: Vec<(String, String)>,
}

impl Default for LanguageMap {
    fn default() -> Self {
        Self {
            entries: DEFAULT_EXTENSIONS
                .iter()
                .map(|(ext, lang)| (ext.to_string(), lang.to_string()))
                .collect(),
        }
    }
}

impl LanguageMap {
    /// Añade o sustituye una extensión. Acepta "vue" o ".vue".
    pub fn insert(&mut self, extension: &str, language: &str) {
        let extension = if extension.starts_with('.') {
            extension.to_string()
        } else {
            format!(".{extension}")
        };

        match self.entries.iter_mut().find(|(ext, _)| *ext == extension) {
            Some(entry) => entry.1 = language.to_string(),
            None => self.entries.push((extension, language.to_string())),
        }
    }

    /// Procesa una lista del tipo `".vue=Vue,.swift=Swift"`.
    pub fn extend_from_list(&mut self, list: &str) -> Result<()> {
        for pair in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (ext, lang) = pair
                .split_once('=')
                .map(|(e, l)| (e.trim(), l.trim()))
                .filter(|(e, l)| !e.is_empty() && !l.is_empty())
                .ok_or_else(|| anyhow!("Entrada de lenguaje mal formada: '{pair}'"))?;
            self.insert(ext, lang);
        }
        Ok(())
    }

    pub fn language_for(&self, path: &Path) -> Option<&str> {
        let name = path.file_name()?.to_string_lossy();
        self.entries
            .iter()
            .find(|(ext, _)| name.ends_with(ext.as_str()))
            .map(|(_, lang)| lang.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
