//! Carga y gestión de configuración de la aplicación (repositorio, chunking y LLM).

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};

use crate::languages::LanguageMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAI,
    Gemini,
    Ollama,
}

impl LlmProvider {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(anyhow!("Proveedor LLM no soportado: {other}")),
        }
    }

    /// Modelo de chat usado cuando `LLM_CHAT_MODEL` no está definido.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-3.5-turbo",
            Self::Gemini => "gemini-2.0-flash",
            Self::Ollama => "codellama",
        }
    }

    /// Variable de entorno que Rig necesita para construir el cliente.
    pub fn credential_var(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Ollama => "OLLAMA_API_BASE_URL",
        }
    }

    fn default_temperature(&self) -> f64 {
        match self {
            Self::Ollama => 0.2,
            _ => 0.0,
        }
    }

    fn default_max_tokens(&self) -> Option<u64> {
        match self {
            Self::OpenAI => Some(600),
            _ => None,
        }
    }
}

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub repo_path: PathBuf,
    pub output_dir: PathBuf,
    pub project_name: String,

    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub languages: LanguageMap,

    pub llm_provider: LlmProvider,
    pub llm_chat_model: String,
    pub llm_temperature: f64,
    pub llm_max_tokens: Option<u64>,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    /// `repo_url` es el repositorio remoto opcional pasado por línea de comandos.
    pub fn from_env(repo_url: Option<&str>) -> Result<Self> {
        Self::from_lookup(repo_url, |key| env::var(key).ok())
    }

    /// Igual que [`AppConfig::from_env`] pero leyendo cada variable con `lookup`.
    pub fn from_lookup<F>(repo_url: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let repo_path = PathBuf::from(lookup("REPO_PATH").unwrap_or_else(|| "./repo".to_string()));
        let output_dir = PathBuf::from(lookup("OUTPUT_DIR").unwrap_or_else(|| "output".to_string()));

        let project_name = lookup("PROJECT_NAME")
            .filter(|name| !name.trim().is_empty())
            .or_else(|| repo_url.and_then(project_name_from_source))
            .or_else(|| project_name_from_source(&repo_path.to_string_lossy()))
            .unwrap_or_else(|| "project".to_string());

        let chunk_size: usize = parse_var(&lookup, "CHUNK_SIZE")?.unwrap_or(1024);
        let chunk_overlap: usize = parse_var(&lookup, "CHUNK_OVERLAP")?.unwrap_or(100);
        if chunk_size == 0 {
            bail!("CHUNK_SIZE debe ser mayor que 0");
        }
        if chunk_overlap >= chunk_size {
            bail!("CHUNK_OVERLAP ({chunk_overlap}) debe ser menor que CHUNK_SIZE ({chunk_size})");
        }

        let mut languages = LanguageMap::default();
        if let Some(overrides) = lookup("EXTENSION_LANGUAGES") {
            languages
                .extend_from_list(&overrides)
                .context("EXTENSION_LANGUAGES inválido")?;
        }

        let llm_provider_str = lookup("LLM_PROVIDER").unwrap_or_else(|| "ollama".to_string());
        let llm_provider = LlmProvider::from_str(&llm_provider_str)?;

        let credential = llm_provider.credential_var();
        if lookup(credential).is_none() {
            return Err(anyhow!(
                "Falta {credential} en el entorno (requerido por el proveedor {llm_provider:?})"
            ));
        }

        let llm_chat_model = lookup("LLM_CHAT_MODEL")
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| llm_provider.default_model().to_string());
        let llm_temperature =
            parse_var(&lookup, "LLM_TEMPERATURE")?.unwrap_or_else(|| llm_provider.default_temperature());
        let llm_max_tokens = match parse_var(&lookup, "LLM_MAX_TOKENS")? {
            Some(max) => Some(max),
            None => llm_provider.default_max_tokens(),
        };

        Ok(Self {
            repo_path,
            output_dir,
            project_name,
            chunk_size,
            chunk_overlap,
            languages,
            llm_provider,
            llm_chat_model,
            llm_temperature,
            llm_max_tokens,
        })
    }

    /// Ruta del informe con el análisis por fichero.
    pub fn files_report_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_summary.json", self.report_slug()))
    }

    /// Ruta del informe con el resumen del proyecto.
    pub fn project_report_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_project_summary.json", self.report_slug()))
    }

    fn report_slug(&self) -> String {
        self.project_name
            .chars()
            .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect()
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("Valor inválido para {key} ('{raw}'): {e}")),
        None => Ok(None),
    }
}

/// "https://github.com/org/Sakila.git" -> "Sakila"; "./repo" -> "repo".
fn project_name_from_source(source: &str) -> Option<String> {
    let trimmed = source.trim_end_matches(['/', '\\']);
    let last = trimmed.rsplit(['/', '\\', ':']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() || name == "." || name == ".." {
        return Path::new(trimmed)
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()));
    }
    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_follow_local_ollama_setup() {
        let cfg = AppConfig::from_lookup(
            None,
            lookup_from(&[("OLLAMA_API_BASE_URL", "http://localhost:11434")]),
        )
        .unwrap();

        assert_eq!(cfg.repo_path, PathBuf::from("./repo"));
        assert_eq!(cfg.chunk_size, 1024);
        assert_eq!(cfg.chunk_overlap, 100);
        assert_eq!(cfg.llm_provider, LlmProvider::Ollama);
        assert_eq!(cfg.llm_chat_model, "codellama");
        assert_eq!(cfg.llm_temperature, 0.2);
        assert_eq!(cfg.llm_max_tokens, None);
        assert_eq!(cfg.project_name, "repo");
        assert_eq!(cfg.files_report_path(), PathBuf::from("output/repo_summary.json"));
    }

    #[test]
    fn project_name_comes_from_remote_url() {
        let cfg = AppConfig::from_lookup(
            Some("https://github.com/acme/Sakila-Project.git"),
            lookup_from(&[("OLLAMA_API_BASE_URL", "http://localhost:11434")]),
        )
        .unwrap();

        assert_eq!(cfg.project_name, "Sakila-Project");
        assert_eq!(
            cfg.project_report_path(),
            PathBuf::from("output/sakila_project_project_summary.json")
        );
    }

    #[test]
    fn openai_requires_api_key_and_caps_tokens() {
        let err = AppConfig::from_lookup(None, lookup_from(&[("LLM_PROVIDER", "openai")]))
            .unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let cfg = AppConfig::from_lookup(
            None,
            lookup_from(&[("LLM_PROVIDER", "OpenAI"), ("OPENAI_API_KEY", "sk-test")]),
        )
        .unwrap();
        assert_eq!(cfg.llm_max_tokens, Some(600));
        assert_eq!(cfg.llm_temperature, 0.0);
    }

    #[test]
    fn rejects_overlap_not_smaller_than_chunk() {
        let err = AppConfig::from_lookup(
            None,
            lookup_from(&[
                ("OLLAMA_API_BASE_URL", "http://localhost:11434"),
                ("CHUNK_SIZE", "100"),
                ("CHUNK_OVERLAP", "100"),
            ]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("CHUNK_OVERLAP"));
    }

    #[test]
    fn rejects_unparsable_numbers_and_unknown_provider() {
        assert!(AppConfig::from_lookup(
            None,
            lookup_from(&[
                ("OLLAMA_API_BASE_URL", "http://localhost:11434"),
                ("CHUNK_SIZE", "mucho"),
            ]),
        )
        .is_err());

        let err = AppConfig::from_lookup(None, lookup_from(&[("LLM_PROVIDER", "watson")]))
            .unwrap_err();
        assert!(err.to_string().contains("watson"));
    }

    #[test]
    fn extension_overrides_extend_language_map() {
        let cfg = AppConfig::from_lookup(
            None,
            lookup_from(&[
                ("OLLAMA_API_BASE_URL", "http://localhost:11434"),
                ("EXTENSION_LANGUAGES", ".vue=Vue, .swift=Swift"),
            ]),
        )
        .unwrap();

        assert_eq!(cfg.languages.language_for(Path::new("a/App.vue")), Some("Vue"));
        assert_eq!(cfg.languages.language_for(Path::new("main.py")), Some("Python"));
    }
}
