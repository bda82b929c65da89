use std::future::Future;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::error::StageError;
use crate::models::{RunResult, StageStatus};
use crate::pipeline::log_report;

/// Supervisa las continuaciones en segundo plano y publica su resultado
#[derive(Clone)]
pub struct RunMonitor {
    tx: UnboundedSender<RunResult>,
}

/// Conteo de ejecuciones recibidas por `drain`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunMonitor {
    pub fn new() -> (Self, UnboundedReceiver<RunResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (RunMonitor { tx }, rx)
    }

    /// Lanza la tarea; si termina con pánico o se cancela, se publica un resultado fallido.
    ///
    /// `snapshot` es el estado de la ejecución al entregarla, con las etapas ya completadas.
    pub fn spawn<F>(&self, snapshot: RunResult, task: F) -> JoinHandle<()>
    where
        F: Future<Output = RunResult> + Send + 'static,
    {
        let tx = self.tx.clone();
        let handle = tokio::spawn(task);

        tokio::spawn(async move {
            let issue_key = snapshot.issue_key.clone();
            let run = match handle.await {
                Ok(run) => run,
                Err(e) => aborted(snapshot, &e.to_string()),
            };

            if tx.send(run).is_err() {
                log::warn!("[Background {}] Nadie recibe el resultado de la ejecución", issue_key);
            }
        })
    }
}

/// Falla la primera etapa que seguía pendiente en el momento de la entrega
fn aborted(mut run: RunResult, reason: &str) -> RunResult {
    let stage = run
        .stages
        .iter()
        .find(|outcome| outcome.status == StageStatus::Pending)
        .map(|outcome| outcome.stage);

    let message = format!("la tarea en segundo plano terminó de forma inesperada: {}", reason);
    match stage {
        Some(stage) => {
            let error = StageError::new(&run.issue_key, stage, message);
            run.fail(error);
        }
        None => run.error = Some(message),
    }
    run
}

/// Registra cada resultado recibido hasta que se cierran todos los emisores
pub async fn drain(mut rx: UnboundedReceiver<RunResult>) -> MonitorSummary {
    let mut summary = MonitorSummary::default();

    while let Some(run) = rx.recv().await {
        log_report(&run, true);
        if run.error.is_none() {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }
    }

    summary
}
