//! In-memory pod.
//!
//! A process-local stand-in for a Solid pod: expenses are kept as typed
//! values, everything else as raw bytes with a content type. Expenses are
//! served as Turtle on raw GETs, and Turtle documents (such as seeded WebID
//! profiles) can be read back through the typed calls. Nothing is
//! authenticated and nothing is persisted.

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use url::Url;

use expense_core::pod::PodClient;
use expense_types::error::PodError;
use expense_types::expense::Expense;
use expense_types::pod::{
    PodMethod, PodRequest, PodResponse, APPLICATION_OCTET_STREAM, TEXT_TURTLE,
};
use expense_types::profile::WebIdProfile;

use crate::rdf;

enum StoredResource {
    Expense(Expense),
    Document { content_type: String, body: Bytes },
}

/// Pod backed by a hash map keyed by resource URL (fragment removed).
#[derive(Default)]
pub struct InMemoryPod {
    resources: RwLock<HashMap<Url, StoredResource>>,
}

impl InMemoryPod {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw document, e.g. a WebID profile in Turtle.
    pub fn with_document(self, url: &Url, content_type: &str, body: impl Into<Bytes>) -> Self {
        self.write().insert(
            resource_key(url),
            StoredResource::Document {
                content_type: content_type.to_string(),
                body: body.into(),
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Url, StoredResource>> {
        self.resources.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Url, StoredResource>> {
        self.resources.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Body of a stored Turtle document.
    fn turtle_document(&self, url: &Url) -> Result<Bytes, PodError> {
        match self.read().get(&resource_key(url)) {
            Some(StoredResource::Expense(expense)) => {
                rdf::expense_to_turtle(expense).map(Bytes::from)
            }
            Some(StoredResource::Document { content_type, body }) if is_turtle(content_type) => {
                Ok(body.clone())
            }
            Some(StoredResource::Document { content_type, .. }) => Err(PodError::MalformedPayload(
                format!("{url} is stored as {content_type}, not Turtle"),
            )),
            None => Err(PodError::NotFound(url.to_string())),
        }
    }

    fn get(&self, request: &PodRequest) -> PodResponse {
        match self.read().get(&resource_key(&request.uri)) {
            Some(StoredResource::Expense(expense)) => match rdf::expense_to_turtle(expense) {
                Ok(turtle) => PodResponse {
                    status: 200,
                    content_type: Some(TEXT_TURTLE.to_string()),
                    body: Bytes::from(turtle),
                },
                Err(e) => {
                    tracing::warn!(error = %e, "failed to serialize stored expense");
                    status_only(500)
                }
            },
            Some(StoredResource::Document { content_type, body }) => PodResponse {
                status: 200,
                content_type: Some(content_type.clone()),
                body: body.clone(),
            },
            None => status_only(404),
        }
    }

    fn put(&self, request: PodRequest) -> PodResponse {
        let content_type = request
            .header_value("Content-Type")
            .unwrap_or(APPLICATION_OCTET_STREAM)
            .to_string();
        let key = resource_key(&request.uri);
        let mut resources = self.write();

        if request.header_value("If-None-Match") == Some("*") && resources.contains_key(&key) {
            return status_only(412);
        }

        let stored = StoredResource::Document {
            content_type,
            body: request.body.unwrap_or_default(),
        };
        match resources.insert(key, stored) {
            Some(_) => status_only(204),
            None => status_only(201),
        }
    }
}

fn resource_key(url: &Url) -> Url {
    let mut key = url.clone();
    key.set_fragment(None);
    key
}

fn is_turtle(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(TEXT_TURTLE))
}

fn status_only(status: u16) -> PodResponse {
    PodResponse {
        status,
        content_type: None,
        body: Bytes::new(),
    }
}

impl PodClient for InMemoryPod {
    async fn read_profile(&self, webid: &Url) -> Result<WebIdProfile, PodError> {
        let body = self.turtle_document(webid)?;
        rdf::profile_from_turtle(&body, webid)
    }

    async fn read_expense(&self, url: &Url) -> Result<Expense, PodError> {
        if let Some(StoredResource::Expense(expense)) = self.read().get(&resource_key(url)) {
            return Ok(expense.clone());
        }
        let body = self.turtle_document(url)?;
        rdf::expense_from_turtle(&body, url)
    }

    async fn create_expense(&self, expense: &Expense) -> Result<(), PodError> {
        let key = resource_key(&expense.identifier);
        let mut resources = self.write();
        if resources.contains_key(&key) {
            return Err(PodError::Conflict(expense.identifier.to_string()));
        }
        resources.insert(key, StoredResource::Expense(expense.clone()));
        Ok(())
    }

    async fn update_expense(&self, expense: &Expense) -> Result<(), PodError> {
        self.write().insert(
            resource_key(&expense.identifier),
            StoredResource::Expense(expense.clone()),
        );
        Ok(())
    }

    async fn delete_resource(&self, url: &Url) -> Result<(), PodError> {
        match self.write().remove(&resource_key(url)) {
            Some(_) => Ok(()),
            None => Err(PodError::NotFound(url.to_string())),
        }
    }

    async fn send(&self, request: PodRequest) -> Result<PodResponse, PodError> {
        tracing::debug!(method = %request.method, uri = %request.uri, "in-memory pod request");
        let response = match request.method {
            PodMethod::Get => self.get(&request),
            PodMethod::Put => self.put(request),
            PodMethod::Delete => match self.write().remove(&resource_key(&request.uri)) {
                Some(_) => status_only(204),
                None => status_only(404),
            },
        };
        Ok(response)
    }
}
