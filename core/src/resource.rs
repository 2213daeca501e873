//! Typed CRUD helpers for every collection the API exposes.
//!
//! Each DTO names its collection path and its create/update payloads through
//! `Resource`. The `build_*` methods produce requests without I/O, the
//! `parse_*` methods run the classifier and then deserialize, and the
//! unprefixed methods (`list`, `get`, ...) do both over the transport.

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::request::RequestOptions;
use crate::transport::Transport;
use crate::types::*;

pub trait Resource: DeserializeOwned {
    /// Collection path, without slashes.
    const COLLECTION: &'static str;
    type Create: Serialize + Validate;
    type Update: Serialize;
}

macro_rules! resource {
    ($ty:ty, $path:literal, $create:ty, $update:ty) => {
        impl Resource for $ty {
            const COLLECTION: &'static str = $path;
            type Create = $create;
            type Update = $update;
        }
    };
}

resource!(Project, "projects", CreateProject, UpdateProject);
resource!(Document, "documents", CreateDocument, UpdateDocument);
resource!(Entry, "entries", CreateEntry, UpdateEntry);
resource!(Plugin, "plugins", CreatePlugin, UpdatePlugin);
resource!(Prompt, "prompts", CreatePrompt, UpdatePrompt);
resource!(DigestGenerator, "digest-generators", CreateDigestGenerator, UpdateDigestGenerator);
resource!(LlmProvider, "llm-providers", CreateLlmProvider, UpdateLlmProvider);

fn collection<R: Resource>() -> String {
    format!("/{}", R::COLLECTION)
}

fn item<R: Resource>(id: Uuid) -> String {
    format!("/{}/{id}", R::COLLECTION)
}

fn decode<R: DeserializeOwned>(value: serde_json::Value) -> Result<R, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
}

impl<T> ApiClient<T> {
    pub fn build_list<R: Resource>(&self) -> HttpRequest {
        self.build(&collection::<R>(), RequestOptions::get())
    }

    pub fn build_get<R: Resource>(&self, id: Uuid) -> HttpRequest {
        self.build(&item::<R>(id), RequestOptions::get())
    }

    /// Validates `input` before serializing it.
    pub fn build_create<R: Resource>(&self, input: &R::Create) -> Result<HttpRequest, ApiError> {
        input.validate()?;
        let options = RequestOptions::new(HttpMethod::Post).json(input)?;
        Ok(self.build(&collection::<R>(), options))
    }

    pub fn build_update<R: Resource>(
        &self,
        id: Uuid,
        input: &R::Update,
    ) -> Result<HttpRequest, ApiError> {
        let options = RequestOptions::new(HttpMethod::Patch).json(input)?;
        Ok(self.build(&item::<R>(id), options))
    }

    pub fn build_delete<R: Resource>(&self, id: Uuid) -> HttpRequest {
        self.build(&item::<R>(id), RequestOptions::delete())
    }

    pub fn parse_list<R: Resource>(&self, response: &HttpResponse) -> Result<Vec<R>, ApiError> {
        decode(self.parse(response)?)
    }

    pub fn parse_one<R: Resource>(&self, response: &HttpResponse) -> Result<R, ApiError> {
        decode(self.parse(response)?)
    }

    /// Any success status counts; the 204 message is discarded.
    pub fn parse_delete(&self, response: &HttpResponse) -> Result<(), ApiError> {
        self.parse(response).map(|_| ())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn list<R: Resource>(&self) -> Result<Vec<R>, ApiError> {
        let response = self.send(&self.build_list::<R>())?;
        self.parse_list(&response)
    }

    pub fn get<R: Resource>(&self, id: Uuid) -> Result<R, ApiError> {
        let response = self.send(&self.build_get::<R>(id))?;
        self.parse_one(&response)
    }

    pub fn create<R: Resource>(&self, input: &R::Create) -> Result<R, ApiError> {
        let response = self.send(&self.build_create::<R>(input)?)?;
        self.parse_one(&response)
    }

    pub fn update<R: Resource>(&self, id: Uuid, input: &R::Update) -> Result<R, ApiError> {
        let response = self.send(&self.build_update::<R>(id, input)?)?;
        self.parse_one(&response)
    }

    pub fn delete<R: Resource>(&self, id: Uuid) -> Result<(), ApiError> {
        let response = self.send(&self.build_delete::<R>(id))?;
        self.parse_delete(&response)
    }
}
