use clap::Args;
use std::sync::Arc;
use std::time::Duration;

use crate::clients::gemini::DEFAULT_GEMINI_URL;
use crate::clients::{GeminiClient, GenerationSettings, JiraClient};
use crate::error::ClientError;
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::utils::CsvSchema;

/// Conexión con Jira y Gemini (argumentos o variables de entorno)
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// URL base de Jira, por ejemplo https://acme.atlassian.net
    #[arg(long, env = "JIRA_BASE_URL", default_value = "")]
    pub jira_base_url: String,

    /// Cuenta (email) para la autenticación Basic de Jira
    #[arg(long, env = "JIRA_ACCOUNT", default_value = "")]
    pub jira_account: String,

    #[arg(long, env = "JIRA_API_TOKEN", default_value = "", hide_env_values = true)]
    pub jira_api_token: String,

    /// Versión de la API REST de Jira (2 usa texto plano y markup, 3 usa ADF)
    #[arg(long, env = "JIRA_API_VERSION", default_value_t = 2)]
    pub jira_api_version: u8,

    /// Proyectos disponibles, separados por comas
    #[arg(long, env = "JIRA_PROJECTS", value_delimiter = ',')]
    pub jira_projects: Vec<String>,

    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    pub gemini_api_key: String,

    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_URL)]
    pub gemini_base_url: String,

    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.0-flash")]
    pub gemini_model: String,

    #[arg(long, env = "GEMINI_TEMPERATURE", default_value_t = 0.1)]
    pub gemini_temperature: f32,

    #[arg(long, env = "GEMINI_MAX_OUTPUT_TOKENS", default_value_t = 8192)]
    pub gemini_max_output_tokens: u32,

    /// Tiempo máximo de cada llamada HTTP, en segundos
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 100)]
    pub http_timeout_secs: u64,
}

/// Configuración de solo lectura del proceso
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jira_base_url: String,
    pub jira_account: String,
    pub jira_api_token: String,
    pub jira_api_version: u8,
    pub projects: Vec<String>,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub settings: GenerationSettings,
    pub timeout: Duration,
}

impl From<ConnectionArgs> for AppConfig {
    fn from(args: ConnectionArgs) -> Self {
        let projects = args
            .jira_projects
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();

        AppConfig {
            jira_base_url: args.jira_base_url.trim().to_string(),
            jira_account: args.jira_account,
            jira_api_token: args.jira_api_token,
            jira_api_version: args.jira_api_version,
            projects,
            gemini_api_key: args.gemini_api_key,
            gemini_base_url: args.gemini_base_url,
            settings: GenerationSettings {
                model: args.gemini_model,
                temperature: args.gemini_temperature,
                max_output_tokens: args.gemini_max_output_tokens,
            },
            timeout: Duration::from_secs(args.http_timeout_secs),
        }
    }
}

impl AppConfig {
    /// Variables que faltan para hablar con Jira y Gemini
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.jira_base_url.is_empty() {
            missing.push("JIRA_BASE_URL");
        }
        if self.jira_account.is_empty() {
            missing.push("JIRA_ACCOUNT");
        }
        if self.jira_api_token.is_empty() {
            missing.push("JIRA_API_TOKEN");
        }
        if self.gemini_api_key.is_empty() {
            missing.push("GEMINI_API_KEY");
        }
        missing
    }

    pub fn jira_client(&self) -> Result<JiraClient, ClientError> {
        if self.jira_base_url.is_empty() {
            return Err(ClientError::MissingInput("JIRA_BASE_URL"));
        }

        JiraClient::new(
            &self.jira_base_url,
            &self.jira_account,
            &self.jira_api_token,
            self.jira_api_version,
            self.timeout,
        )
    }

    pub fn gemini_client(&self) -> Result<GeminiClient, ClientError> {
        GeminiClient::new(&self.gemini_base_url, &self.gemini_api_key, self.timeout)
    }

    /// Pipeline con los clientes reales
    pub fn pipeline(&self, options: PipelineOptions) -> Result<Pipeline, ClientError> {
        Ok(Pipeline::new(
            Arc::new(self.jira_client()?),
            Arc::new(self.gemini_client()?),
            options,
        ))
    }

    /// Opciones por defecto con los parámetros de generación configurados
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            settings: self.settings.clone(),
            post_comment: true,
            schema: CsvSchema::detailed(),
            export_dir: None,
        }
    }
}
