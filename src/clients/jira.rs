use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{Issue, IssuePage, TrackerClient};
use crate::error::ClientError;
use crate::utils::Comment;

/// Cliente de la API REST de Jira con autenticación Basic (cuenta + token)
pub struct JiraClient {
    http: Client,
    base_url: String,
    account: String,
    token: String,
    api_version: u8,
}

#[derive(Deserialize)]
struct IssueResponse {
    key: Option<String>,
    #[serde(default)]
    fields: IssueFields,
}

#[derive(Deserialize, Default)]
struct IssueFields {
    #[serde(default)]
    description: Value,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<SearchIssue>,
    #[serde(default)]
    total: u64,
}

#[derive(Deserialize)]
struct SearchIssue {
    key: String,
}

impl JiraClient {
    pub fn new(
        base_url: &str,
        account: &str,
        token: &str,
        api_version: u8,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(JiraClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            account: account.to_string(),
            token: token.to_string(),
            api_version,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/api/{}/{}", self.base_url, self.api_version, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.account, Some(&self.token))
            .header("Accept", "application/json")
    }

    /// Devuelve la respuesta si es 2xx, o el error con estado y cuerpo
    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        log::debug!("Respuesta de Jira: {}", status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Http {
            status: status.as_u16(),
            body,
        })
    }

    fn comment_body(&self, comment: &Comment) -> Value {
        if self.api_version >= 3 {
            json!({ "body": comment.document })
        } else {
            json!({ "body": comment.markup })
        }
    }
}

/// Extrae el texto de la descripción: cadena (API v2) o documento ADF (API v3)
pub fn description_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Object(_) => {
            let mut blocks = Vec::new();
            collect_blocks(value, &mut blocks);
            let text = blocks.join("\n");
            if text.trim().is_empty() {
                None
            } else {
                Some(text)
            }
        }
        _ => None,
    }
}

fn collect_text(node: &Value, out: &mut String) {
    if let Some(text) = node.get("text").and_then(Value::as_str) {
        out.push_str(text);
    }
    if node.get("type").and_then(Value::as_str) == Some("hardBreak") {
        out.push('\n');
    }
    if let Some(children) = node.get("content").and_then(Value::as_array) {
        for child in children {
            collect_text(child, out);
        }
    }
}

fn collect_blocks(node: &Value, blocks: &mut Vec<String>) {
    let Some(children) = node.get("content").and_then(Value::as_array) else {
        return;
    };

    for child in children {
        match child.get("type").and_then(Value::as_str) {
            Some("bulletList") | Some("orderedList") | Some("listItem") | Some("blockquote")
            | Some("panel") | Some("table") | Some("tableRow") | Some("tableCell")
            | Some("tableHeader") => collect_blocks(child, blocks),
            _ => {
                let mut text = String::new();
                collect_text(child, &mut text);
                if !text.is_empty() {
                    blocks.push(text);
                }
            }
        }
    }
}

#[async_trait]
impl TrackerClient for JiraClient {
    async fn get_issue(&self, key: &str) -> Result<Issue, ClientError> {
        if key.trim().is_empty() {
            return Err(ClientError::MissingInput("clave del ticket"));
        }

        let request = self
            .http
            .get(self.url(&format!("issue/{}", key)))
            .query(&[("fields", "description")]);
        let response = Self::check(self.authorized(request).send().await?).await?;

        let issue: IssueResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        Ok(Issue {
            key: issue.key.unwrap_or_else(|| key.to_string()),
            description: description_text(&issue.fields.description),
        })
    }

    async fn list_issues(
        &self,
        project: &str,
        start_at: u32,
        max_results: u32,
    ) -> Result<IssuePage, ClientError> {
        let jql = format!("project={}", project);
        let request = self.http.get(self.url("search")).query(&[
            ("jql", jql),
            ("startAt", start_at.to_string()),
            ("maxResults", max_results.to_string()),
            ("fields", "key".to_string()),
        ]);
        let response = Self::check(self.authorized(request).send().await?).await?;

        let page: SearchResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        Ok(IssuePage {
            keys: page.issues.into_iter().map(|issue| issue.key).collect(),
            total: page.total,
        })
    }

    async fn add_comment(&self, key: &str, comment: &Comment) -> Result<(), ClientError> {
        if comment.markup.trim().is_empty() {
            return Err(ClientError::MissingInput("texto del comentario"));
        }

        let request = self
            .http
            .post(self.url(&format!("issue/{}/comment", key)))
            .json(&self.comment_body(comment));
        Self::check(self.authorized(request).send().await?).await?;

        Ok(())
    }

    async fn add_attachment(&self, key: &str, filename: &str, csv: &str) -> Result<(), ClientError> {
        let part = Part::text(csv.to_string())
            .file_name(filename.to_string())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let request = self
            .http
            .post(self.url(&format!("issue/{}/attachments", key)))
            .header("X-Atlassian-Token", "no-check")
            .multipart(form);
        Self::check(self.authorized(request).send().await?).await?;

        Ok(())
    }
}
