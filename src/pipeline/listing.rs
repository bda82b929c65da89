use serde::Serialize;

use crate::clients::TrackerClient;

pub const DEFAULT_MAX_RESULTS: u32 = 50;

/// Parámetros de una página de tickets de un proyecto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketQuery {
    pub project: String,
    pub start_at: u32,
    pub max_results: u32,
}

impl TicketQuery {
    /// Valores ausentes o no numéricos toman los valores por defecto
    pub fn from_params(
        start_at: Option<&str>,
        max_results: Option<&str>,
        project_board: Option<&str>,
    ) -> Self {
        TicketQuery {
            project: project_board.unwrap_or_default().trim().to_string(),
            start_at: start_at.and_then(|s| s.trim().parse().ok()).unwrap_or(0),
            max_results: max_results
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_MAX_RESULTS),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TicketListing {
    pub issues: Vec<String>,
    pub total: u64,
    pub error: Option<String>,
}

impl TicketListing {
    fn failed(message: String) -> Self {
        TicketListing {
            error: Some(message),
            ..Default::default()
        }
    }
}

/// Lista las claves de un proyecto; los fallos quedan en `error` con lista vacía
pub async fn list_tickets(tracker: &dyn TrackerClient, query: &TicketQuery) -> TicketListing {
    if query.project.is_empty() {
        log::warn!("[Listado] Falta el proyecto");
        return TicketListing::failed("falta el proyecto (projectBoard)".to_string());
    }

    log::info!(
        "[Listado] Proyecto {} desde {} (máx. {})",
        query.project,
        query.start_at,
        query.max_results
    );

    match tracker
        .list_issues(&query.project, query.start_at, query.max_results)
        .await
    {
        Ok(page) => TicketListing {
            issues: page.keys,
            total: page.total,
            error: None,
        },
        Err(e) => {
            log::error!("[Listado] No se pudieron listar los tickets de {}: {}", query.project, e);
            TicketListing::failed(e.to_string())
        }
    }
}
