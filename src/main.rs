use clap::{Parser, Subcommand};
use colored::*;
use inquire::validator::Validation;
use inquire::{Select, Text};
use std::path::PathBuf;

mod clients;
mod commands;
mod config;
mod error;
mod models;
mod pipeline;
mod server;
mod utils;

use commands::{
    generate_test_cases, list_project_tickets, list_projects, show_prompt, GenerateOptions,
};
use config::{AppConfig, ConnectionArgs};
use pipeline::listing::DEFAULT_MAX_RESULTS;
use utils::is_valid_ticket_key;

#[derive(Parser)]
#[command(author, version, about = "Genera casos de prueba a partir de tickets de Jira con Gemini", long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generar casos de prueba para un ticket y adjuntarlos como CSV
    Generate {
        /// Clave del ticket, por ejemplo ABC-123
        #[arg(value_parser = parse_ticket_key)]
        issue_key: String,

        /// No publicar el comentario con los casos en el ticket
        #[arg(long)]
        no_comment: bool,

        /// Guardar también una copia local del CSV en este directorio
        #[arg(long)]
        save: Option<PathBuf>,

        /// Archivo con una plantilla de instrucciones propia
        #[arg(long)]
        prompt_file: Option<PathBuf>,

        /// Exportar con el formato anterior de 14 columnas (sin "Category")
        #[arg(long)]
        legacy_csv: bool,
    },
    /// Listar tickets de un proyecto
    List {
        /// Clave del proyecto
        #[arg(short, long)]
        project: Option<String>,

        #[arg(long, default_value_t = 0)]
        start_at: u32,

        #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: u32,
    },
    /// Listar proyectos configurados
    Projects,
    /// Mostrar la plantilla del prompt
    Prompt {
        /// Mostrar la plantilla de transformación en lugar de la de instrucciones
        #[arg(long)]
        transform: bool,
    },
    /// Arrancar el servidor HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,

        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

fn parse_ticket_key(value: &str) -> Result<String, String> {
    let key = value.trim();
    if is_valid_ticket_key(key) {
        Ok(key.to_string())
    } else {
        Err(format!("'{}' no es una clave de ticket válida (ej. ABC-123)", value))
    }
}

/// Corta la ejecución si faltan variables necesarias
fn require(config: &AppConfig, jira_only: bool) -> anyhow::Result<()> {
    let missing: Vec<&str> = config
        .missing()
        .into_iter()
        .filter(|name| !jira_only || name.starts_with("JIRA"))
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    println!(
        "{}",
        format!("Faltan variables de configuración: {}", missing.join(", ")).yellow()
    );
    anyhow::bail!("configuración incompleta")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = AppConfig::from(cli.connection);

    match cli.command {
        Some(Commands::Generate {
            issue_key,
            no_comment,
            save,
            prompt_file,
            legacy_csv,
        }) => {
            require(&config, false)?;
            let options = GenerateOptions {
                no_comment,
                save_dir: save,
                prompt_file,
                legacy_csv,
            };
            let run = generate_test_cases(&config, &issue_key, options).await?;
            if run.error.is_some() {
                std::process::exit(1);
            }
        }
        Some(Commands::List {
            project,
            start_at,
            max_results,
        }) => {
            require(&config, true)?;
            list_project_tickets(&config, project, start_at, max_results).await?;
        }
        Some(Commands::Projects) => list_projects(&config.projects),
        Some(Commands::Prompt { transform }) => show_prompt(transform),
        Some(Commands::Serve { bind, port }) => {
            require(&config, false)?;
            let pipeline = config.pipeline(config.pipeline_options())?;
            server::run_server(
                &bind,
                port,
                pipeline,
                config.projects.clone(),
                config.jira_base_url.clone(),
            )
            .await?;
        }
        None => interactive_menu(&config).await?,
    }

    Ok(())
}

/// Menú interactivo si no se proporciona un comando
async fn interactive_menu(config: &AppConfig) -> anyhow::Result<()> {
    let options = vec![
        "Generar casos de prueba",
        "Listar tickets de un proyecto",
        "Ver proyectos configurados",
        "Ver plantilla del prompt",
        "Salir",
    ];

    let selection = Select::new("¿Qué deseas hacer?", options).prompt();

    match selection {
        Ok("Generar casos de prueba") => {
            require(config, false)?;

            let issue_key = Text::new("Clave del ticket (ej. ABC-123):")
                .with_validator(|input: &str| {
                    if is_valid_ticket_key(input) {
                        Ok(Validation::Valid)
                    } else {
                        Ok(Validation::Invalid(
                            "Formato inválido, usa PROYECTO-NÚMERO (ej. ABC-123)".into(),
                        ))
                    }
                })
                .prompt();

            let Ok(issue_key) = issue_key else {
                println!("{}", "Operación cancelada.".yellow());
                return Ok(());
            };

            let comment = Select::new("¿Publicar los casos como comentario en el ticket?", vec!["Sí", "No"])
                .prompt()
                .unwrap_or("Sí");

            let options = GenerateOptions {
                no_comment: comment == "No",
                ..Default::default()
            };
            generate_test_cases(config, issue_key.trim(), options).await?;
        }
        Ok("Listar tickets de un proyecto") => {
            require(config, true)?;
            list_project_tickets(config, None, 0, DEFAULT_MAX_RESULTS).await?;
        }
        Ok("Ver proyectos configurados") => list_projects(&config.projects),
        Ok("Ver plantilla del prompt") => show_prompt(false),
        _ => println!("¡Hasta pronto!"),
    }

    Ok(())
}
