//! Clientes remotos: tracker de tickets (Jira) y modelo generativo (Gemini).
//!
//! El pipeline solo conoce los traits; las implementaciones reales usan
//! `reqwest` y los tests usan las versiones falsas de `fakes`.

pub mod gemini;
pub mod jira;

#[cfg(test)]
pub mod fakes;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::utils::Comment;

pub use gemini::GeminiClient;
pub use jira::JiraClient;

/// Ticket con los campos que consume el pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub key: String,
    pub description: Option<String>,
}

/// Página de resultados de una búsqueda de tickets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssuePage {
    pub keys: Vec<String>,
    pub total: u64,
}

#[async_trait]
pub trait TrackerClient: Send + Sync {
    async fn get_issue(&self, key: &str) -> Result<Issue, ClientError>;

    async fn list_issues(
        &self,
        project: &str,
        start_at: u32,
        max_results: u32,
    ) -> Result<IssuePage, ClientError>;

    async fn add_comment(&self, key: &str, comment: &Comment) -> Result<(), ClientError>;

    async fn add_attachment(&self, key: &str, filename: &str, csv: &str) -> Result<(), ClientError>;
}

/// Parámetros de generación, fijos durante la vida del proceso
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.1,
            max_output_tokens: 8192,
        }
    }
}

/// Respuesta de una llamada al modelo
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    pub text: Option<String>,
    pub total_tokens: u64,
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        settings: &GenerationSettings,
    ) -> Result<Generation, ClientError>;
}
