//! Recorrido del repositorio: clonado opcional, selección de ficheros por
//! lenguaje, análisis fichero a fichero y escritura de los dos informes JSON.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use tokio::process::Command;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::{
    complexity::ComplexityAnalyzer,
    config::AppConfig,
    languages::LanguageMap,
    llm::ModelInvoker,
    models::{FileAnalysis, FilesReport, ProjectReport},
    summarize::Summarizer,
};

/// Resumen de los resultados de un recorrido del repositorio.
#[derive(Debug, Default)]
pub struct ScanSummary {
    pub files_scanned: u32,
    pub files_analyzed: u32,
    pub files_skipped: u32,
    pub files_report: PathBuf,
    pub project_report: PathBuf,
}

impl std::fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Resumen: {} ficheros encontrados, {} analizados, {} omitidos. Informes: {} y {}.",
            self.files_scanned,
            self.files_analyzed,
            self.files_skipped,
            self.files_report.display(),
            self.project_report.display()
        )
    }
}

/// Clona `url` en `dest`, borrando antes cualquier directorio existente.
pub async fn clone_repo(url: &str, dest: &Path) -> Result<()> {
    if dest.exists() {
        info!("Eliminando el repositorio existente en {}", dest.display());
        tokio::fs::remove_dir_all(dest)
            .await
            .with_context(|| format!("No se pudo eliminar {}", dest.display()))?;
    }

    info!("Clonando {url} en {}", dest.display());
    let status = Command::new("git")
        .arg("clone")
        .arg(url)
        .arg(dest)
        .status()
        .await
        .context("No se pudo ejecutar git")?;

    if !status.success() {
        bail!("git clone terminó con estado {status}");
    }
    Ok(())
}

/// Fichero del repositorio con el lenguaje deducido de su extensión.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: String,
}

/// Ficheros bajo `root` cuya extensión está en `languages`, en orden de
/// recorrido (por nombre dentro de cada directorio). Los demás se omiten
/// dejando constancia en el log.
pub fn collect_source_files(root: &Path, languages: &LanguageMap) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        return Err(anyhow!("La ruta no es un directorio: {}", root.display()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("No se pudo recorrer una entrada: {e}. Saltando.");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        match languages.language_for(&path) {
            Some(language) => files.push(SourceFile {
                language: language.to_string(),
                path,
            }),
            None => info!("Saltando extensión no reconocida: {}", path.display()),
        }
    }
    Ok(files)
}

/// Escribe `data` como JSON indentado, creando el directorio padre si hace falta.
pub fn write_json<T: Serialize>(data: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("No se pudo crear {}", parent.display()))?;
    }
    let file = fs::File::create(path)
        .with_context(|| format!("No se pudo crear {}", path.display()))?;
    serde_json::to_writer_pretty(file, data)
        .with_context(|| format!("No se pudo escribir {}", path.display()))?;
    Ok(())
}

/// Ejecuta el pipeline completo sobre el repositorio configurado.
pub async fn run<M, C>(
    cfg: &AppConfig,
    repo_url: Option<&str>,
    summarizer: &Summarizer<M, C>,
) -> Result<ScanSummary>
where
    M: ModelInvoker,
    C: ComplexityAnalyzer,
{
    if let Some(url) = repo_url {
        clone_repo(url, &cfg.repo_path).await?;
    }

    info!(
        "Analizando: {} ({} extensiones reconocidas)",
        cfg.repo_path.display(),
        cfg.languages.len()
    );
    let files = collect_source_files(&cfg.repo_path, &cfg.languages)?;

    let mut summary = ScanSummary {
        files_report: cfg.files_report_path(),
        project_report: cfg.project_report_path(),
        ..ScanSummary::default()
    };
    let mut results: Vec<FileAnalysis> = Vec::new();

    for (index, SourceFile { path, language }) in files.iter().enumerate() {
        summary.files_scanned += 1;
        info!("[{}/{}] Procesando: {}", index + 1, files.len(), path.display());

        let code = match fs::read_to_string(path) {
            Ok(code) => code,
            Err(e) => {
                warn!("Error de lectura en {}: {e}. Saltando fichero.", path.display());
                summary.files_skipped += 1;
                continue;
            }
        };

        if code.trim().is_empty() {
            info!("Saltando fichero vacío: {}", path.display());
            summary.files_skipped += 1;
            continue;
        }

        let analysis = summarizer
            .analyze_file(&code, language, &path.to_string_lossy())
            .await;
        results.push(analysis);
        summary.files_analyzed += 1;
    }

    let files_report = FilesReport {
        project: cfg.project_name.clone(),
        files: results,
    };
    write_json(&files_report, &summary.files_report)?;
    info!("Informe por fichero escrito en {}", summary.files_report.display());

    info!("Generando el resumen del proyecto...");
    let descriptions: Vec<_> = files_report
        .files
        .iter()
        .map(|analysis| analysis.description.clone())
        .collect();
    let project_summary = summarizer.summarize_project(&descriptions).await;
    info!("Resumen del proyecto:\n{project_summary}");

    let project_report = ProjectReport {
        project: files_report.project,
        summary: project_summary,
        files: files_report.files,
    };
    write_json(&project_report, &summary.project_report)?;
    info!("Informe del proyecto escrito en {}", summary.project_report.display());

    Ok(summary)
}
