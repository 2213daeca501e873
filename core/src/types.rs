//! Domain DTOs for the digest API.
//!
//! # Design
//! These records mirror what the remote API returns and carry no behavior.
//! Relationships (entry -> source -> author, generator -> prompt) are ids or
//! embedded records as the API sends them; nothing is enforced locally.
//! `Create*` payloads that had a form schema in the web app implement
//! `Validate` with the same rules, so bad input is rejected before a request
//! is built.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{FieldError, ValidationError};

/// Client-side checks run before a create request is built.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Collects field errors in the order the checks run.
#[derive(Default)]
struct Checks {
    fields: Vec<FieldError>,
}

impl Checks {
    fn required(&mut self, field: &'static str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fail(field, "is required");
        }
        self
    }

    fn max_chars(&mut self, field: &'static str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.fail(field, format!("must be at most {max} characters"));
        }
        self
    }

    fn http_url(&mut self, field: &'static str, value: Option<&str>) -> &mut Self {
        if let Some(url) = value {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                self.fail(field, "must start with http:// or https://");
            }
        }
        self
    }

    fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn finish(&mut self) -> Result<(), ValidationError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                fields: std::mem::take(&mut self.fields),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for CreateProject {
    fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .required("name", &self.name)
            .max_chars("name", &self.name, 100)
            .finish()
    }
}

/// Only the fields present in the JSON are applied server-side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    pub project_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Validate for CreateDocument {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

/// A collected item (article, post, paper) that digests are built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntry {
    pub project_id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Validate for CreateEntry {}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

// ---------------------------------------------------------------------------
// Plugins
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plugin {
    pub id: Uuid,
    pub name: String,
    pub plugin_type: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlugin {
    pub name: String,
    pub plugin_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl Validate for CreatePlugin {
    fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .required("name", &self.name)
            .required("plugin_type", &self.plugin_type)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePlugin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prompt {
    pub id: Uuid,
    pub name: String,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePrompt {
    pub name: String,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Uuid>,
}

impl Validate for CreatePrompt {
    fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .required("name", &self.name)
            .required("template", &self.template)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePrompt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

// ---------------------------------------------------------------------------
// Digest generators
// ---------------------------------------------------------------------------

/// Produces a digest for a project on a schedule, using a prompt and an LLM
/// provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DigestGenerator {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub schedule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_provider_id: Option<Uuid>,
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDigestGenerator {
    pub project_id: Uuid,
    pub name: String,
    pub schedule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_provider_id: Option<Uuid>,
}

impl Validate for CreateDigestGenerator {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = Checks::default();
        checks
            .required("name", &self.name)
            .required("schedule", &self.schedule);
        if self.project_id.is_nil() {
            checks.fail("project_id", "is required");
        }
        checks.finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDigestGenerator {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

// ---------------------------------------------------------------------------
// LLM providers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LlmProvider {
    pub id: Uuid,
    pub name: String,
    /// Vendor key, e.g. `openai`, `anthropic`, `ollama`.
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLlmProvider {
    pub name: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Validate for CreateLlmProvider {
    fn validate(&self) -> Result<(), ValidationError> {
        Checks::default()
            .required("name", &self.name)
            .required("provider", &self.provider)
            .http_url("base_url", self.base_url.as_deref())
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLlmProvider {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}
