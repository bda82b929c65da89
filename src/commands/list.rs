use colored::*;
use inquire::Select;

use crate::config::AppConfig;
use crate::pipeline::{list_tickets, TicketListing, TicketQuery};

/// Lista los tickets de un proyecto; sin proyecto se elige entre los configurados
pub async fn list_project_tickets(
    config: &AppConfig,
    project: Option<String>,
    start_at: u32,
    max_results: u32,
) -> anyhow::Result<TicketListing> {
    let project = match project {
        Some(project) => project,
        None => match select_project(&config.projects) {
            Some(project) => project,
            None => {
                println!("{}", "Operación cancelada.".yellow());
                return Ok(TicketListing::default());
            }
        },
    };

    let tracker = config.jira_client()?;
    let query = TicketQuery {
        project,
        start_at,
        max_results,
    };
    let listing = list_tickets(&tracker, &query).await;

    if let Some(error) = &listing.error {
        println!("{}", format!("No se pudieron listar los tickets: {}", error).red());
        return Ok(listing);
    }

    if listing.issues.is_empty() {
        println!("{}", "No hay tickets en este proyecto.".yellow());
        return Ok(listing);
    }

    println!(
        "{}",
        format!("Tickets de {} ({} en total):", query.project, listing.total).green()
    );
    for (i, key) in listing.issues.iter().enumerate() {
        println!("{}: {}", query.start_at as usize + i + 1, key);
    }

    Ok(listing)
}

/// Selector de proyecto configurado; None si no hay proyectos o se cancela
pub fn select_project(projects: &[String]) -> Option<String> {
    if projects.is_empty() {
        println!(
            "{}",
            "No hay proyectos configurados (JIRA_PROJECTS); usa --project.".yellow()
        );
        return None;
    }

    Select::new("Selecciona un proyecto:", projects.to_vec())
        .prompt()
        .ok()
}
