//! Abstracción sobre Rig para invocar distintos proveedores de LLM.
//!
//! El resto de la aplicación sólo ve [`ModelInvoker`]: texto de entrada,
//! texto de salida, y un error si la llamada falla.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers;
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::{AppConfig, LlmProvider};

/// Capacidad de invocar un modelo de lenguaje con un prompt ya construido.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String>;
}

/// Gestor de LLMs de chat.
#[derive(Debug, Clone)]
pub struct LlmManager {
    pub provider: LlmProvider,
    pub chat_model: String,
    pub temperature: f64,
    pub max_tokens: Option<u64>,
}

impl LlmManager {
    /// Construye el manager a partir de la configuración.
    pub fn from_config(cfg: &AppConfig) -> Result<Self> {
        if cfg.llm_chat_model.is_empty() {
            return Err(anyhow!("No se ha configurado ningún modelo de chat"));
        }
        Ok(Self {
            provider: cfg.llm_provider.clone(),
            chat_model: cfg.llm_chat_model.clone(),
            temperature: cfg.llm_temperature,
            max_tokens: cfg.llm_max_tokens,
        })
    }
}

#[async_trait]
impl ModelInvoker for LlmManager {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        // Los clientes de cada proveedor son tipos distintos; el agente se
        // construye igual para todos.
        macro_rules! prompt_with {
            ($client:expr) => {{
                let mut builder = $client
                    .agent(&self.chat_model)
                    .temperature(self.temperature);
                if let Some(max_tokens) = self.max_tokens {
                    builder = builder.max_tokens(max_tokens);
                }
                builder
                    .build()
                    .prompt(prompt)
                    .await
                    .map_err(|e| anyhow!("Fallo en la llamada al LLM ({:?}): {e}", self.provider))
            }};
        }

        match self.provider {
            LlmProvider::OpenAI => prompt_with!(providers::openai::Client::from_env()),
            LlmProvider::Gemini => prompt_with!(providers::gemini::Client::from_env()),
            LlmProvider::Ollama => prompt_with!(providers::ollama::Client::from_env()),
        }
    }
}

/// Detiene el modelo servido por Ollama en local. Nunca falla: sólo registra
/// el resultado.
pub async fn stop_local_model(model: &str) {
    match Command::new("ollama").args(["stop", model]).status().await {
        Ok(status) if status.success() => info!("Modelo de Ollama detenido: {model}"),
        Ok(status) => warn!("No se pudo detener el modelo {model} (estado {status})"),
        Err(e) => warn!("No se pudo detener el modelo {model}: {e}"),
    }
}
