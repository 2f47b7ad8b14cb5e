//! Expense gateway service.
//!
//! Maps each REST operation onto one pod call, or a short chain of them
//! (write then re-read as Turtle; upload then attach a receipt). Holds the
//! session-bound client handed in at construction.

use std::collections::BTreeSet;

use bytes::Bytes;
use expense_types::error::PodError;
use expense_types::expense::Expense;
use expense_types::pod::{PodRequest, APPLICATION_OCTET_STREAM, TEXT_TURTLE};
use url::Url;

use crate::pod::{BoxPodClient, PodClient};

/// Statuses a pod uses to acknowledge a stored file.
const UPLOAD_ACCEPTED: [u16; 3] = [200, 201, 204];

/// Whether a PUT of a non-RDF file was accepted by the pod.
pub fn is_upload_accepted(status: u16) -> bool {
    UPLOAD_ACCEPTED.contains(&status)
}

/// A file to store in a pod as a non-RDF resource.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub destination: Url,
    /// Declared media type of the upload, if the caller sent one.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Service behind every gateway endpoint.
pub struct ExpenseService {
    client: BoxPodClient,
}

impl ExpenseService {
    pub fn new(client: BoxPodClient) -> Self {
        Self { client }
    }

    /// Storage roots declared in the WebID profile.
    #[tracing::instrument(skip_all, fields(webid = %webid))]
    pub async fn list_pods(&self, webid: &Url) -> Result<BTreeSet<Url>, PodError> {
        let profile = self.client.read_profile(webid).await?;
        tracing::debug!(count = profile.storages.len(), "resolved pod storages");
        Ok(profile.storages)
    }

    /// Store a new expense, then return what the pod now holds as Turtle.
    #[tracing::instrument(skip_all, fields(identifier = %expense.identifier))]
    pub async fn create_expense(&self, expense: &Expense) -> Result<String, PodError> {
        self.client.create_expense(expense).await?;
        tracing::info!("expense created");
        self.get_resource_as_turtle(&expense.identifier).await
    }

    #[tracing::instrument(skip_all, fields(url = %url))]
    pub async fn get_expense(&self, url: &Url) -> Result<Expense, PodError> {
        self.client.read_expense(url).await
    }

    /// Replace an expense, then return what the pod now holds as Turtle.
    #[tracing::instrument(skip_all, fields(identifier = %expense.identifier))]
    pub async fn update_expense(&self, expense: &Expense) -> Result<String, PodError> {
        self.client.update_expense(expense).await?;
        tracing::info!("expense updated");
        self.get_resource_as_turtle(&expense.identifier).await
    }

    /// Delete an expense. A resource that is already gone counts as deleted.
    #[tracing::instrument(skip_all, fields(url = %url))]
    pub async fn delete_expense(&self, url: &Url) -> Result<(), PodError> {
        match self.client.delete_resource(url).await {
            Ok(()) => {
                tracing::info!("expense deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                tracing::info!("expense already absent, nothing to delete");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "expense delete failed");
                Err(e)
            }
        }
    }

    /// Raw Turtle serialization of any RDF resource.
    #[tracing::instrument(skip_all, fields(url = %url))]
    pub async fn get_resource_as_turtle(&self, url: &Url) -> Result<String, PodError> {
        let request = PodRequest::get(url.clone()).header("Accept", TEXT_TURTLE);
        let response = self.client.send(request).await?;

        if !response.is_success() {
            return Err(PodError::from_status(response.status, url.as_str()));
        }
        response.text()
    }

    /// PUT a file at its destination. Only 200, 201 and 204 count as stored.
    #[tracing::instrument(
        skip_all,
        fields(destination = %upload.destination, size = upload.bytes.len())
    )]
    pub async fn upload_file(&self, upload: FileUpload) -> Result<(), PodError> {
        let content_type = upload
            .content_type
            .unwrap_or_else(|| APPLICATION_OCTET_STREAM.to_string());
        let destination = upload.destination;
        let request =
            PodRequest::put(destination.clone(), upload.bytes).header("Content-Type", content_type);

        let response = self.client.send(request).await?;
        if is_upload_accepted(response.status) {
            tracing::info!(status = response.status, "file stored");
            Ok(())
        } else {
            Err(PodError::from_status(response.status, destination.as_str()))
        }
    }

    /// [`upload_file`](Self::upload_file) reduced to a yes/no answer.
    pub async fn add_non_rdf_file(&self, upload: FileUpload) -> bool {
        match self.upload_file(upload).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "non-RDF file was not stored");
                false
            }
        }
    }

    /// Store a receipt file and link it from the expense at `expense_url`.
    ///
    /// If the upload fails the expense is not read or written.
    #[tracing::instrument(skip_all, fields(expense = %expense_url, receipt = %upload.destination))]
    pub async fn add_receipt_to_expense(
        &self,
        upload: FileUpload,
        expense_url: &Url,
    ) -> Result<String, PodError> {
        let receipt = upload.destination.clone();
        self.upload_file(upload).await?;

        let mut expense = self.get_expense(expense_url).await?;
        if !expense.add_receipt(receipt) {
            tracing::debug!("receipt already linked");
        }
        self.update_expense(&expense).await
    }
}
