//! BoxPodClient -- object-safe dynamic dispatch wrapper for PodClient.
//!
//! 1. Define an object-safe `PodClientDyn` trait with boxed futures
//! 2. Blanket-impl `PodClientDyn` for all `T: PodClient`
//! 3. `BoxPodClient` wraps `Box<dyn PodClientDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use expense_types::error::PodError;
use expense_types::expense::Expense;
use expense_types::pod::{PodRequest, PodResponse};
use expense_types::profile::WebIdProfile;
use url::Url;

use super::client::PodClient;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, PodError>> + Send + 'a>>;

/// Object-safe version of [`PodClient`] with boxed futures.
pub trait PodClientDyn: Send + Sync {
    fn read_profile_boxed<'a>(&'a self, webid: &'a Url) -> BoxFuture<'a, WebIdProfile>;

    fn read_expense_boxed<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Expense>;

    fn create_expense_boxed<'a>(&'a self, expense: &'a Expense) -> BoxFuture<'a, ()>;

    fn update_expense_boxed<'a>(&'a self, expense: &'a Expense) -> BoxFuture<'a, ()>;

    fn delete_resource_boxed<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, ()>;

    fn send_boxed(&self, request: PodRequest) -> BoxFuture<'_, PodResponse>;
}

impl<T: PodClient> PodClientDyn for T {
    fn read_profile_boxed<'a>(&'a self, webid: &'a Url) -> BoxFuture<'a, WebIdProfile> {
        Box::pin(self.read_profile(webid))
    }

    fn read_expense_boxed<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Expense> {
        Box::pin(self.read_expense(url))
    }

    fn create_expense_boxed<'a>(&'a self, expense: &'a Expense) -> BoxFuture<'a, ()> {
        Box::pin(self.create_expense(expense))
    }

    fn update_expense_boxed<'a>(&'a self, expense: &'a Expense) -> BoxFuture<'a, ()> {
        Box::pin(self.update_expense(expense))
    }

    fn delete_resource_boxed<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, ()> {
        Box::pin(self.delete_resource(url))
    }

    fn send_boxed(&self, request: PodRequest) -> BoxFuture<'_, PodResponse> {
        Box::pin(self.send(request))
    }
}

/// Type-erased pod client.
///
/// Since `PodClient` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxPodClient` lets the service hold either the HTTP client or
/// an in-memory fake without becoming generic.
pub struct BoxPodClient {
    inner: Box<dyn PodClientDyn + Send + Sync>,
}

impl BoxPodClient {
    pub fn new<T: PodClient + 'static>(client: T) -> Self {
        Self {
            inner: Box::new(client),
        }
    }
}

impl PodClient for BoxPodClient {
    async fn read_profile(&self, webid: &Url) -> Result<WebIdProfile, PodError> {
        self.inner.read_profile_boxed(webid).await
    }

    async fn read_expense(&self, url: &Url) -> Result<Expense, PodError> {
        self.inner.read_expense_boxed(url).await
    }

    async fn create_expense(&self, expense: &Expense) -> Result<(), PodError> {
        self.inner.create_expense_boxed(expense).await
    }

    async fn update_expense(&self, expense: &Expense) -> Result<(), PodError> {
        self.inner.update_expense_boxed(expense).await
    }

    async fn delete_resource(&self, url: &Url) -> Result<(), PodError> {
        self.inner.delete_resource_boxed(url).await
    }

    async fn send(&self, request: PodRequest) -> Result<PodResponse, PodError> {
        self.inner.send_boxed(request).await
    }
}
