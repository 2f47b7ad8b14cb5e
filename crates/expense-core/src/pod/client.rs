use expense_types::error::PodError;
use expense_types::expense::Expense;
use expense_types::pod::{PodRequest, PodResponse};
use expense_types::profile::WebIdProfile;
use url::Url;

/// Trait for a Solid client bound to an authenticated session.
///
/// Implementations live in expense-infra (e.g., HttpPodClient).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait PodClient: Send + Sync {
    /// Fetch and project the WebID profile document.
    fn read_profile(
        &self,
        webid: &Url,
    ) -> impl std::future::Future<Output = Result<WebIdProfile, PodError>> + Send;

    /// Read the RDF resource at `url` as an Expense.
    fn read_expense(
        &self,
        url: &Url,
    ) -> impl std::future::Future<Output = Result<Expense, PodError>> + Send;

    /// Store a new Expense at its identifier. Fails if something already lives there.
    fn create_expense(
        &self,
        expense: &Expense,
    ) -> impl std::future::Future<Output = Result<(), PodError>> + Send;

    /// Replace the Expense stored at its identifier.
    fn update_expense(
        &self,
        expense: &Expense,
    ) -> impl std::future::Future<Output = Result<(), PodError>> + Send;

    /// Delete whatever lives at `url`.
    fn delete_resource(
        &self,
        url: &Url,
    ) -> impl std::future::Future<Output = Result<(), PodError>> + Send;

    /// Send a raw request. Any status is returned as a response; only
    /// transport and authentication failures are errors.
    fn send(
        &self,
        request: PodRequest,
    ) -> impl std::future::Future<Output = Result<PodResponse, PodError>> + Send;
}
