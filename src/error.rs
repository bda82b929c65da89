use thiserror::Error;

use crate::models::Stage;

/// Fallos al normalizar la respuesta estructurada del modelo
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("la respuesta del modelo está vacía")]
    Empty,

    #[error("JSON mal formado: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("estructura inválida: {0}")]
    InvalidShape(#[source] serde_json::Error),
}

/// Fallos al convertir las filas del modelo a CSV
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("la entrada está vacía")]
    EmptyInput,

    #[error("JSON mal formado: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("el JSON no es un array con elementos")]
    NotAnArray,

    #[error("no quedó ninguna fila válida")]
    NoValidRows,

    #[error("error al escribir el CSV: {0}")]
    Write(String),
}

/// Fallos de los clientes remotos (tracker y modelo)
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("falta el dato de entrada: {0}")]
    MissingInput(&'static str),

    #[error("respuesta HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("error de red: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("respuesta ilegible: {0}")]
    Decode(String),
}

/// Error de una etapa del pipeline, etiquetado con la clave del ticket y la etapa
#[derive(Debug, Clone, Error)]
#[error("[{issue_key}] {stage} failed: {message}")]
pub struct StageError {
    pub issue_key: String,
    pub stage: Stage,
    pub message: String,
}

impl StageError {
    pub fn new(issue_key: &str, stage: Stage, message: impl Into<String>) -> Self {
        StageError {
            issue_key: issue_key.to_string(),
            stage,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_is_tagged() {
        let err = StageError::new("ABC-1", Stage::Fetch, "No description");
        let text = err.to_string();
        assert!(text.contains("ABC-1"));
        assert!(text.contains("Step 0"));
        assert!(text.ends_with("No description"));
    }

    #[test]
    fn test_http_error_keeps_status_and_body() {
        let err = ClientError::Http {
            status: 404,
            body: "{\"errorMessages\":[\"Issue does not exist\"]}".into(),
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("Issue does not exist"));
    }
}
