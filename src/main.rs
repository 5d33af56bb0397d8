// Módulos de la aplicación
mod chunking;
mod complexity;
mod config;
mod extract;
mod languages;
mod llm;
mod merge;
mod models;
mod prompts;
mod scan;
mod summarize;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    chunking::TextSplitter, complexity::TreeSitterComplexity, config::LlmProvider,
    summarize::Summarizer,
};

/// Resume un repositorio de código con un LLM, fichero a fichero y a nivel de proyecto.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Repositorio remoto a clonar. Sin él se usa la copia local de REPO_PATH.
    repo_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // 2. Cargar configuración
    let cfg = config::AppConfig::from_env(cli.repo_url.as_deref())
        .context("Error al cargar la configuración")?;

    // 3. Inicializar gestor de LLMs y el pipeline de análisis
    let llm_manager = llm::LlmManager::from_config(&cfg).context("Error inicializando LLM Manager")?;
    let splitter = TextSplitter::new(cfg.chunk_size, cfg.chunk_overlap)?;
    let summarizer = Summarizer::new(llm_manager, TreeSitterComplexity, splitter);

    // 4. Recorrer el repositorio y escribir los informes
    let outcome = scan::run(&cfg, cli.repo_url.as_deref(), &summarizer).await;

    // 5. Liberar el modelo local aunque el recorrido haya fallado
    if cfg.llm_provider == LlmProvider::Ollama {
        llm::stop_local_model(&cfg.llm_chat_model).await;
    }

    let summary = outcome?;
    info!("✅ Análisis completado. {summary}");
    Ok(())
}
