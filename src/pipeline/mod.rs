//! Pipeline de generación de casos de prueba para un ticket.
//!
//! Etapas, siempre en este orden y cada una intentada una sola vez:
//! Step 0 obtener la descripción, Step 1 generar los casos estructurados,
//! Step 2 comentar en el ticket (opcional), Step 3 transformar en filas
//! detalladas, Step 4 exportar a CSV y adjuntar. El primer fallo detiene la
//! ejecución y queda registrado en el `RunResult`.

pub mod listing;
pub mod monitor;

use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::clients::{GenerationSettings, ModelClient, TrackerClient};
use crate::error::StageError;
use crate::models::{DetailedTestCase, RunResult, Stage, StageStatus, StructuredTestCases};
use crate::utils::{
    attachment_filename, instruction_prompt, is_valid_ticket_key, normalize, save_export, to_csv,
    transform_prompt, Comment, CsvSchema,
};

pub use listing::{list_tickets, TicketListing, TicketQuery};
pub use monitor::RunMonitor;

/// Opciones de solo lectura compartidas por todas las ejecuciones
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub settings: GenerationSettings,
    pub post_comment: bool,
    pub schema: CsvSchema,
    pub export_dir: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            settings: GenerationSettings::default(),
            post_comment: true,
            schema: CsvSchema::detailed(),
            export_dir: None,
        }
    }
}

/// Respuesta inmediata del modo en segundo plano
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarlyResult {
    pub run_id: Uuid,
    pub issue_key: String,
    pub structured_text: String,
}

/// Resultado de los Steps 0 y 1, entrada del resto del pipeline
struct Generated {
    description: String,
    cases: StructuredTestCases,
}

#[derive(Clone)]
pub struct Pipeline {
    tracker: Arc<dyn TrackerClient>,
    model: Arc<dyn ModelClient>,
    options: Arc<PipelineOptions>,
}

fn label(issue_key: &str, background: bool) -> String {
    if background {
        format!("[Background {}]", issue_key)
    } else {
        format!("[{}]", issue_key)
    }
}

fn halt(run: &mut RunResult, stage: Stage, message: impl Into<String>, background: bool) {
    let error = StageError::new(&run.issue_key, stage, message);
    if background {
        log::error!("[Background] {}", error);
    } else {
        log::error!("{}", error);
    }
    run.fail(error);
}

/// Resumen de tokens y resultado de una ejecución
pub fn log_report(run: &RunResult, background: bool) {
    let label = label(&run.issue_key, background);
    log::info!(
        "{} Ejecución {}: tokens generación={} transformación={} total={}",
        label,
        run.run_id,
        run.generate_tokens,
        run.transform_tokens,
        run.total_tokens()
    );

    match &run.error {
        Some(error) => log::error!("{} Ejecución terminada con error: {}", label, error),
        None => log::info!(
            "{} Ejecución completada, adjunto {}",
            label,
            run.attachment.as_deref().unwrap_or("-")
        ),
    }
}

impl Pipeline {
    pub fn new(
        tracker: Arc<dyn TrackerClient>,
        model: Arc<dyn ModelClient>,
        options: PipelineOptions,
    ) -> Self {
        Pipeline {
            tracker,
            model,
            options: Arc::new(options),
        }
    }

    pub fn tracker(&self) -> &dyn TrackerClient {
        self.tracker.as_ref()
    }

    /// Ejecuta todas las etapas y devuelve el resultado al terminar
    pub async fn run(&self, issue_key: &str, custom_prompt: Option<&str>) -> RunResult {
        let mut run = RunResult::new(issue_key.trim());
        log::info!("{} Iniciando ejecución {}", label(&run.issue_key, false), run.run_id);

        let run = match self.fetch_and_generate(&mut run, custom_prompt).await {
            Some(generated) => self.finish(run, generated, false).await,
            None => run,
        };

        log_report(&run, false);
        run
    }

    /// Ejecuta los Steps 0 y 1, devuelve el texto generado y entrega el resto al monitor.
    ///
    /// Si falla antes de devolver, el error vuelve al llamador; después solo lo ve el monitor.
    pub async fn run_detached(
        &self,
        issue_key: &str,
        custom_prompt: Option<&str>,
        monitor: &RunMonitor,
    ) -> Result<EarlyResult, RunResult> {
        let mut run = RunResult::new(issue_key.trim());
        log::info!("{} Iniciando ejecución {}", label(&run.issue_key, false), run.run_id);

        let Some(generated) = self.fetch_and_generate(&mut run, custom_prompt).await else {
            log_report(&run, false);
            return Err(run);
        };

        let early = EarlyResult {
            run_id: run.run_id,
            issue_key: run.issue_key.clone(),
            structured_text: run.structured_text.clone().unwrap_or_default(),
        };

        log::info!(
            "{} Step 1 completado, se devuelve el texto estructurado y se continúa en segundo plano",
            label(&run.issue_key, false)
        );

        let pipeline = self.clone();
        let snapshot = run.clone();
        monitor.spawn(snapshot, async move { pipeline.finish(run, generated, true).await });

        Ok(early)
    }

    async fn fetch_and_generate(
        &self,
        run: &mut RunResult,
        custom_prompt: Option<&str>,
    ) -> Option<Generated> {
        let key = run.issue_key.clone();
        let tag = label(&key, false);

        log::info!("{} Iniciando {}...", tag, Stage::Fetch);
        if key.is_empty() {
            halt(run, Stage::Fetch, "la clave del ticket está vacía", false);
            return None;
        }
        // La clave forma parte de la ruta de la API de Jira
        if !is_valid_ticket_key(&key) {
            halt(run, Stage::Fetch, format!("clave de ticket inválida: {}", key), false);
            return None;
        }

        let description = match self.tracker.get_issue(&key).await {
            Ok(issue) => {
                log::debug!("{} Ticket {} obtenido", tag, issue.key);
                issue.description.filter(|d| !d.trim().is_empty())
            }
            Err(e) => {
                halt(run, Stage::Fetch, e.to_string(), false);
                return None;
            }
        };
        let Some(description) = description else {
            halt(run, Stage::Fetch, "No description", false);
            return None;
        };
        run.mark(Stage::Fetch, StageStatus::Succeeded);

        log::info!("{} Iniciando {}...", tag, Stage::Generate);
        let prompt = instruction_prompt(&description, custom_prompt);
        let generation = match self.model.generate(&prompt, &self.options.settings).await {
            Ok(generation) => generation,
            Err(e) => {
                halt(run, Stage::Generate, e.to_string(), false);
                return None;
            }
        };
        run.generate_tokens = generation.total_tokens;

        let Some(text) = generation.text else {
            halt(run, Stage::Generate, "el modelo no devolvió texto", false);
            return None;
        };

        let cases = match normalize(&text) {
            Ok(cases) => cases,
            Err(e) => {
                log::debug!("{} Respuesta descartada: {}", tag, text);
                halt(run, Stage::Generate, e.to_string(), false);
                return None;
            }
        };

        run.structured_text = Some(text);
        run.expected_rows = Some(cases.objective_count());
        run.mark(Stage::Generate, StageStatus::Succeeded);

        Some(Generated { description, cases })
    }

    async fn finish(&self, mut run: RunResult, generated: Generated, background: bool) -> RunResult {
        let key = run.issue_key.clone();
        let tag = label(&key, background);

        if self.options.post_comment {
            log::info!("{} Iniciando {}...", tag, Stage::Comment);
            let comment = Comment::from_cases(&generated.cases);
            if let Err(e) = self.tracker.add_comment(&key, &comment).await {
                halt(&mut run, Stage::Comment, e.to_string(), background);
                return run;
            }
            run.mark(Stage::Comment, StageStatus::Succeeded);
        } else {
            run.mark(Stage::Comment, StageStatus::Skipped);
        }

        log::info!("{} Iniciando {}...", tag, Stage::Transform);
        let cases_json = match serde_json::to_string_pretty(&generated.cases) {
            Ok(json) => json,
            Err(e) => {
                halt(&mut run, Stage::Transform, e.to_string(), background);
                return run;
            }
        };
        let prompt = transform_prompt(&generated.description, &cases_json);
        let generation = match self.model.generate(&prompt, &self.options.settings).await {
            Ok(generation) => generation,
            Err(e) => {
                halt(&mut run, Stage::Transform, e.to_string(), background);
                return run;
            }
        };
        run.transform_tokens = generation.total_tokens;

        let rows_text = generation
            .text
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        let Some(rows_text) = rows_text else {
            halt(&mut run, Stage::Transform, "el modelo no devolvió las filas detalladas", background);
            return run;
        };
        run.mark(Stage::Transform, StageStatus::Succeeded);

        log::info!("{} Iniciando {}...", tag, Stage::Export);
        let export = match to_csv(&rows_text, &self.options.schema) {
            Ok(export) => export,
            Err(e) => {
                halt(&mut run, Stage::Export, format!("no se pudo generar el CSV: {}", e), background);
                return run;
            }
        };

        let expected = generated.cases.objective_count();
        if export.records.len() != expected {
            log::warn!(
                "{} Se esperaban {} filas y el modelo devolvió {} ({} descartadas)",
                tag,
                expected,
                export.records.len(),
                export.dropped
            );
        }
        run.exported_rows = Some(export.records.len());
        if self.options.schema.is_detailed() {
            run.exported = export
                .records
                .iter()
                .filter_map(|record| DetailedTestCase::from_record(record))
                .collect();
        }

        let filename = attachment_filename(&key, Utc::now());
        if let Some(dir) = &self.options.export_dir {
            match save_export(dir, &filename, &export.content) {
                Ok(path) => log::info!("{} Copia local guardada en {}", tag, path.display()),
                Err(e) => log::warn!("{} No se pudo guardar la copia local: {}", tag, e),
            }
        }

        if let Err(e) = self
            .tracker
            .add_attachment(&key, &filename, &export.content)
            .await
        {
            halt(&mut run, Stage::Export, e.to_string(), background);
            return run;
        }

        run.attachment = Some(filename);
        run.mark(Stage::Export, StageStatus::Succeeded);
        log::info!("{} {} completado", tag, Stage::Export);

        run
    }
}
