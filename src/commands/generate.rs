use anyhow::Context;
use colored::*;
use std::fs;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::models::{RunResult, StageStatus};
use crate::utils::CsvSchema;

/// Opciones de la generación desde la CLI
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub no_comment: bool,
    pub save_dir: Option<PathBuf>,
    pub prompt_file: Option<PathBuf>,
    pub legacy_csv: bool,
}

/// Genera los casos de un ticket, espera a que termine y muestra el resultado
pub async fn generate_test_cases(
    config: &AppConfig,
    issue_key: &str,
    options: GenerateOptions,
) -> anyhow::Result<RunResult> {
    let custom_prompt = match &options.prompt_file {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("No se pudo leer el prompt {}", path.display()))?,
        ),
        None => None,
    };

    let mut pipeline_options = config.pipeline_options();
    pipeline_options.post_comment = !options.no_comment;
    pipeline_options.export_dir = options.save_dir.clone();
    if options.legacy_csv {
        pipeline_options.schema = CsvSchema::legacy();
    }
    let pipeline = config.pipeline(pipeline_options)?;

    println!(
        "{}",
        format!("Generando casos de prueba para {}...", issue_key).blue()
    );

    let run = pipeline.run(issue_key, custom_prompt.as_deref()).await;
    print_run(&run);

    Ok(run)
}

/// Filas "etapa: estado" en el orden de ejecución
pub fn stage_lines(run: &RunResult) -> Vec<String> {
    run.stages
        .iter()
        .map(|outcome| format!("{:<22} {}", outcome.stage.to_string(), outcome.status))
        .collect()
}

fn print_run(run: &RunResult) {
    println!("\n{}", format!("Ejecución {}", run.run_id).bold());
    for (line, outcome) in stage_lines(run).iter().zip(&run.stages) {
        match outcome.status {
            StageStatus::Succeeded => println!("{}", line.green()),
            StageStatus::Failed => println!("{}", line.red()),
            StageStatus::Skipped => println!("{}", line.yellow()),
            StageStatus::Pending => println!("{}", line.dimmed()),
        }
    }

    println!(
        "\nTokens: generación {} | transformación {} | total {}",
        run.generate_tokens,
        run.transform_tokens,
        run.total_tokens()
    );

    if let Some(error) = &run.error {
        println!("\n{}", error.red());
        return;
    }

    if let (Some(expected), Some(exported)) = (run.expected_rows, run.exported_rows) {
        let counts = format!("Filas exportadas: {} de {} objetivos", exported, expected);
        if expected == exported {
            println!("{}", counts.green());
        } else {
            println!("{}", counts.yellow());
        }
    }

    if !run.exported.is_empty() {
        println!("\n{}", "Casos de prueba exportados:".green());
        for case in &run.exported {
            println!(
                "{} [{} / {}] {}",
                case.id.bold(),
                case.test_type,
                case.category,
                case.summary
            );
        }
    }

    if let Some(attachment) = &run.attachment {
        println!("\n{}", format!("Adjunto subido: {}", attachment).green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StageError;
    use crate::models::Stage;

    #[test]
    fn test_stage_lines_follow_run_order() {
        let mut run = RunResult::new("ABC-1");
        run.mark(Stage::Fetch, StageStatus::Succeeded);
        run.fail(StageError::new("ABC-1", Stage::Generate, "sin texto"));

        let lines = stage_lines(&run);
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("Step 0 (fetch)"));
        assert!(lines[0].ends_with("✅ Completada"));
        assert!(lines[1].ends_with("❌ Fallida"));
        assert!(lines[4].ends_with("⏳ Pendiente"));
    }
}
