//! Application state wiring the pod client into the expense service.
//!
//! AppState is shared by the CLI commands and the REST handlers. The pod
//! client is either the authenticated HTTP client or, for local runs, an
//! in-memory pod.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use secrecy::SecretString;

use expense_core::pod::BoxPodClient;
use expense_core::service::expense::ExpenseService;
use expense_infra::memory::InMemoryPod;
use expense_infra::solid::client::build_http_client;
use expense_infra::solid::{HttpPodClient, SolidCredentials, SolidSession};

use crate::cli::SolidArgs;

/// Request bodies above this size are rejected unless configured otherwise.
pub const DEFAULT_UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub expense_service: Arc<ExpenseService>,
    /// Largest request body the router accepts, in bytes.
    pub upload_limit: usize,
}

impl AppState {
    /// Build the pod client described by the Solid arguments and wire the service.
    pub fn init(args: &SolidArgs) -> anyhow::Result<Self> {
        let client = if args.in_memory {
            tracing::warn!("using an in-memory pod; nothing will be persisted");
            BoxPodClient::new(InMemoryPod::new())
        } else {
            BoxPodClient::new(solid_client(args)?)
        };
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: BoxPodClient) -> Self {
        Self {
            expense_service: Arc::new(ExpenseService::new(client)),
            upload_limit: DEFAULT_UPLOAD_LIMIT,
        }
    }

    pub fn with_upload_limit(mut self, bytes: usize) -> Self {
        self.upload_limit = bytes;
        self
    }
}

fn solid_client(args: &SolidArgs) -> anyhow::Result<HttpPodClient> {
    let issuer = args
        .idp
        .clone()
        .context("an identity provider is required (--idp or MY_SOLID_IDP)")?;
    let client_id = args
        .client_id
        .clone()
        .context("a client id is required (--client-id or MY_SOLID_CLIENT_ID)")?;
    let client_secret = args
        .client_secret
        .clone()
        .context("a client secret is required (--client-secret or MY_SOLID_CLIENT_SECRET)")?;
    let flow = args
        .auth_flow
        .context("an auth flow is required (--auth-flow or MY_AUTH_FLOW)")?;

    let http = build_http_client(Duration::from_secs(args.request_timeout_secs))?;
    tracing::info!(issuer = %issuer, flow = %flow, "configured Solid session");

    let session = SolidSession::new(
        http.clone(),
        SolidCredentials {
            issuer,
            client_id,
            client_secret: SecretString::from(client_secret),
            flow,
        },
    );
    if !args.pod_origins.is_empty() {
        tracing::info!(origins = ?args.pod_origins, "access token limited to trusted pod origins");
    }
    Ok(HttpPodClient::new(http, Arc::new(session)).with_trusted_origins(args.pod_origins.clone()))
}
