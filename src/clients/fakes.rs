use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{Generation, GenerationSettings, Issue, IssuePage, ModelClient, TrackerClient};
use crate::error::ClientError;
use crate::utils::Comment;

/// Tracker en memoria con respuestas configurables
#[derive(Default)]
pub struct FakeTracker {
    pub description: Option<String>,
    pub fetch_status: Option<u16>,
    pub search_status: Option<u16>,
    pub comment_status: Option<u16>,
    pub attachment_status: Option<u16>,
    pub page: IssuePage,
    pub calls: Mutex<Vec<String>>,
    pub comments: Mutex<Vec<(String, Comment)>>,
    pub attachments: Mutex<Vec<(String, String, String)>>,
}

impl FakeTracker {
    pub fn with_description(description: &str) -> Self {
        FakeTracker {
            description: Some(description.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn http_error(status: u16) -> ClientError {
    ClientError::Http {
        status,
        body: "{\"errorMessages\":[\"fake failure\"]}".to_string(),
    }
}

#[async_trait]
impl TrackerClient for FakeTracker {
    async fn get_issue(&self, key: &str) -> Result<Issue, ClientError> {
        self.record(format!("get_issue {}", key));
        if let Some(status) = self.fetch_status {
            return Err(http_error(status));
        }
        Ok(Issue {
            key: key.to_string(),
            description: self.description.clone(),
        })
    }

    async fn list_issues(
        &self,
        project: &str,
        start_at: u32,
        max_results: u32,
    ) -> Result<IssuePage, ClientError> {
        self.record(format!("list_issues {} {} {}", project, start_at, max_results));
        if let Some(status) = self.search_status {
            return Err(http_error(status));
        }
        Ok(self.page.clone())
    }

    async fn add_comment(&self, key: &str, comment: &Comment) -> Result<(), ClientError> {
        self.record(format!("add_comment {}", key));
        if let Some(status) = self.comment_status {
            return Err(http_error(status));
        }
        self.comments
            .lock()
            .unwrap()
            .push((key.to_string(), comment.clone()));
        Ok(())
    }

    async fn add_attachment(&self, key: &str, filename: &str, csv: &str) -> Result<(), ClientError> {
        self.record(format!("add_attachment {}", key));
        if let Some(status) = self.attachment_status {
            return Err(http_error(status));
        }
        self.attachments
            .lock()
            .unwrap()
            .push((key.to_string(), filename.to_string(), csv.to_string()));
        Ok(())
    }
}

/// Modelo falso que devuelve las respuestas encoladas en orden
#[derive(Default)]
pub struct FakeModel {
    responses: Mutex<VecDeque<Result<Generation, ClientError>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: &str, tokens: u64) -> Self {
        self.responses.lock().unwrap().push_back(Ok(Generation {
            text: Some(text.to_string()),
            total_tokens: tokens,
        }));
        self
    }

    pub fn reply_empty(self) -> Self {
        self.responses.lock().unwrap().push_back(Ok(Generation::default()));
        self
    }

    pub fn fail(self, status: u16) -> Self {
        self.responses.lock().unwrap().push_back(Err(http_error(status)));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for FakeModel {
    async fn generate(
        &self,
        prompt: &str,
        _settings: &GenerationSettings,
    ) -> Result<Generation, ClientError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Decode("sin respuestas encoladas".into())))
    }
}
