//! HttpPodClient -- concrete [`PodClient`] talking to a Solid pod over HTTP.
//!
//! Requests go out without credentials first. When the pod challenges
//! with 401, the client attaches the session's access token and retries
//! once. Tokens are plain bearer tokens (no DPoP proof), so anything that
//! receives one can replay it: with trusted origins configured, only those
//! origins get a retry with the token, and a 401 from anywhere else is
//! returned as is. With no trusted origins, every challenging server gets
//! the token.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use secrecy::ExposeSecret;
use url::{Origin, Url};

use expense_core::pod::PodClient;
use expense_types::error::PodError;
use expense_types::expense::Expense;
use expense_types::pod::{PodMethod, PodRequest, PodResponse, TEXT_TURTLE};
use expense_types::profile::WebIdProfile;

use super::session::SolidSession;
use super::transport_error;
use crate::rdf;

/// Build the shared reqwest client used for both the pod and the identity provider.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, PodError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("expense-gateway/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(transport_error)
}

/// Solid client bound to an authenticated session.
pub struct HttpPodClient {
    http: reqwest::Client,
    session: Arc<SolidSession>,
    trusted_origins: Vec<Origin>,
}

impl HttpPodClient {
    pub fn new(http: reqwest::Client, session: Arc<SolidSession>) -> Self {
        Self {
            http,
            session,
            trusted_origins: Vec::new(),
        }
    }

    /// Only send the access token to these origins.
    pub fn with_trusted_origins(mut self, origins: impl IntoIterator<Item = Url>) -> Self {
        self.trusted_origins = origins.into_iter().map(|url| url.origin()).collect();
        self
    }

    fn may_authenticate(&self, uri: &Url) -> bool {
        self.trusted_origins.is_empty() || self.trusted_origins.contains(&uri.origin())
    }

    async fn execute(&self, request: &PodRequest) -> Result<PodResponse, PodError> {
        let response = self.dispatch(request, None).await?;
        if response.status != 401 {
            return Ok(response);
        }

        if !self.may_authenticate(&request.uri) {
            tracing::warn!(
                uri = %request.uri,
                "authentication requested by an untrusted origin, not sending token"
            );
            return Ok(response);
        }

        tracing::debug!(uri = %request.uri, "pod requested authentication, retrying with token");
        let token = self.session.access_token().await?;
        let retried = self.dispatch(request, Some(token.expose_secret())).await?;
        if retried.status == 401 {
            // The token was refused; make the next request log in again.
            self.session.invalidate().await;
        }
        Ok(retried)
    }

    async fn dispatch(
        &self,
        request: &PodRequest,
        token: Option<&str>,
    ) -> Result<PodResponse, PodError> {
        let mut builder = self
            .http
            .request(to_method(request.method), request.uri.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.bytes().await.map_err(transport_error)?;

        tracing::debug!(
            method = %request.method,
            uri = %request.uri,
            status,
            authenticated = token.is_some(),
            "pod request completed"
        );

        Ok(PodResponse {
            status,
            content_type,
            body,
        })
    }

    /// GET a resource as Turtle.
    async fn read_turtle(&self, url: &Url) -> Result<Bytes, PodError> {
        let request = PodRequest::get(url.clone()).header("Accept", TEXT_TURTLE);
        let response = self.execute(&request).await?;
        expect_success(&response, url)?;
        Ok(response.body)
    }

    async fn put_expense(&self, expense: &Expense, create: bool) -> Result<(), PodError> {
        let body = rdf::expense_to_turtle(expense)?;

        let mut request = PodRequest::put(expense.identifier.clone(), Bytes::from(body))
            .header("Content-Type", TEXT_TURTLE);
        if create {
            request = request.header("If-None-Match", "*");
        }

        let response = self.execute(&request).await?;
        expect_success(&response, &expense.identifier)
    }
}

fn to_method(method: PodMethod) -> Method {
    match method {
        PodMethod::Get => Method::GET,
        PodMethod::Put => Method::PUT,
        PodMethod::Delete => Method::DELETE,
    }
}

fn expect_success(response: &PodResponse, url: &Url) -> Result<(), PodError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(PodError::from_status(response.status, url.as_str()))
    }
}

impl PodClient for HttpPodClient {
    async fn read_profile(&self, webid: &Url) -> Result<WebIdProfile, PodError> {
        let body = self.read_turtle(webid).await?;
        rdf::profile_from_turtle(&body, webid)
    }

    async fn read_expense(&self, url: &Url) -> Result<Expense, PodError> {
        let body = self.read_turtle(url).await?;
        rdf::expense_from_turtle(&body, url)
    }

    async fn create_expense(&self, expense: &Expense) -> Result<(), PodError> {
        self.put_expense(expense, true).await
    }

    async fn update_expense(&self, expense: &Expense) -> Result<(), PodError> {
        self.put_expense(expense, false).await
    }

    async fn delete_resource(&self, url: &Url) -> Result<(), PodError> {
        let response = self.execute(&PodRequest::delete(url.clone())).await?;
        expect_success(&response, url)
    }

    async fn send(&self, request: PodRequest) -> Result<PodResponse, PodError> {
        self.execute(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use axum::body::Bytes as AxumBytes;
    use axum::extract::{Request, State};
    use axum::http::{HeaderMap, Method as AxumMethod, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use secrecy::SecretString;

    use expense_types::config::AuthFlow;

    use crate::solid::session::SolidCredentials;

    /// A pod whose resources require `Bearer pod-token`, plus the identity
    /// provider that issues that token.
    #[derive(Clone, Default)]
    struct FakePod {
        base: String,
        resources: Arc<Mutex<HashMap<String, (String, Vec<u8>)>>>,
        public: Arc<Mutex<Vec<String>>>,
        tokens_issued: Arc<AtomicUsize>,
    }

    impl FakePod {
        fn url(&self, path: &str) -> Url {
            Url::parse(&format!("{}{}", self.base, path)).unwrap()
        }

        fn seed(&self, path: &str, content_type: &str, body: &[u8]) {
            self.resources
                .lock()
                .unwrap()
                .insert(path.to_string(), (content_type.to_string(), body.to_vec()));
        }
    }

    async fn resource(State(pod): State<FakePod>, headers: HeaderMap, req: Request) -> Response {
        let path = req.uri().path().to_string();
        let method = req.method().clone();
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Bearer pod-token");
        if !authorized && !pod.public.lock().unwrap().contains(&path) {
            return StatusCode::UNAUTHORIZED.into_response();
        }

        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let if_none_match = headers.contains_key("if-none-match");
        let body: AxumBytes = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .unwrap_or_default();

        let mut resources = pod.resources.lock().unwrap();
        match method {
            AxumMethod::GET => match resources.get(&path) {
                Some((ct, bytes)) => {
                    ([("content-type", ct.clone())], bytes.clone()).into_response()
                }
                None => StatusCode::NOT_FOUND.into_response(),
            },
            AxumMethod::PUT => {
                if if_none_match && resources.contains_key(&path) {
                    return StatusCode::PRECONDITION_FAILED.into_response();
                }
                let existed = resources
                    .insert(path, (content_type, body.to_vec()))
                    .is_some();
                if existed {
                    StatusCode::NO_CONTENT.into_response()
                } else {
                    StatusCode::CREATED.into_response()
                }
            }
            AxumMethod::DELETE => match resources.remove(&path) {
                Some(_) => StatusCode::NO_CONTENT.into_response(),
                None => StatusCode::NOT_FOUND.into_response(),
            },
            _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        }
    }

    async fn discovery(State(pod): State<FakePod>) -> Json<serde_json::Value> {
        Json(serde_json::json!({ "token_endpoint": format!("{}/token", pod.base) }))
    }

    async fn token(State(pod): State<FakePod>) -> Json<serde_json::Value> {
        pod.tokens_issued.fetch_add(1, Ordering::SeqCst);
        Json(serde_json::json!({ "access_token": "pod-token", "expires_in": 3600 }))
    }

    async fn spawn_pod() -> FakePod {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let pod = FakePod {
            base: format!("http://{}", listener.local_addr().unwrap()),
            ..FakePod::default()
        };
        let app = Router::new()
            .route("/.well-known/openid-configuration", get(discovery))
            .route("/token", post(token))
            .fallback(resource)
            .with_state(pod.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        pod
    }

    fn client(pod: &FakePod) -> HttpPodClient {
        let http = build_http_client(Duration::from_secs(5)).unwrap();
        let session = SolidSession::new(
            http.clone(),
            SolidCredentials {
                issuer: pod.url("/"),
                client_id: "gateway".to_string(),
                client_secret: SecretString::from("s3cret".to_string()),
                flow: AuthFlow::ClientSecretPost,
            },
        );
        HttpPodClient::new(http, Arc::new(session))
    }

    #[tokio::test]
    async fn test_create_read_update_delete_expense() {
        let pod = spawn_pod().await;
        let client = client(&pod);
        let mut expense = Expense::new(pod.url("/expenses/1"));
        expense.description = Some("Team Lunch".to_string());
        expense.total = Some(99.5);

        client.create_expense(&expense).await.unwrap();
        let stored = pod.resources.lock().unwrap().get("/expenses/1").cloned().unwrap();
        assert_eq!(stored.0, TEXT_TURTLE);

        assert_eq!(client.read_expense(&expense.identifier).await.unwrap(), expense);

        expense.category = Some("Food".to_string());
        client.update_expense(&expense).await.unwrap();
        let read = client.read_expense(&expense.identifier).await.unwrap();
        assert_eq!(read.category.as_deref(), Some("Food"));

        client.delete_resource(&expense.identifier).await.unwrap();
        let err = client.read_expense(&expense.identifier).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_over_existing_resource_conflicts() {
        let pod = spawn_pod().await;
        let client = client(&pod);
        let expense = Expense::new(pod.url("/expenses/dup"));

        client.create_expense(&expense).await.unwrap();
        let err = client.create_expense(&expense).await.unwrap_err();
        assert!(matches!(err, PodError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_public_profile_read_without_token() {
        let pod = spawn_pod().await;
        let webid = pod.url("/profile/card#me");
        let doc = format!("<#me> <{}> </> .", rdf::vocab::PIM_STORAGE);
        pod.seed("/profile/card", TEXT_TURTLE, doc.as_bytes());
        pod.public.lock().unwrap().push("/profile/card".to_string());

        let profile = client(&pod).read_profile(&webid).await.unwrap();
        assert!(profile.storages.contains(&pod.url("/")));
        assert_eq!(pod.tokens_issued.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_token_sent_to_trusted_origin() {
        let pod = spawn_pod().await;
        let client = client(&pod).with_trusted_origins([pod.url("/")]);
        let expense = Expense::new(pod.url("/expenses/trusted"));

        client.create_expense(&expense).await.unwrap();
        assert_eq!(pod.tokens_issued.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_untrusted_origin_never_gets_token() {
        let pod = spawn_pod().await;
        let trusted = Url::parse("https://pod.example/").unwrap();
        let client = client(&pod).with_trusted_origins([trusted]);

        let err = client.read_expense(&pod.url("/expenses/1")).await.unwrap_err();
        assert!(matches!(err, PodError::Unauthorized(_)));

        let response = client.send(PodRequest::get(pod.url("/expenses/1"))).await.unwrap();
        assert_eq!(response.status, 401);
        assert_eq!(pod.tokens_issued.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_send_passes_headers_and_body_through() {
        let pod = spawn_pod().await;
        let client = client(&pod);
        let destination = pod.url("/receipts/r1.png");

        let put = PodRequest::put(destination.clone(), Bytes::from_static(b"\x89PNG"))
            .header("Content-Type", "image/png");
        assert_eq!(client.send(put).await.unwrap().status, 201);

        let got = client.send(PodRequest::get(destination)).await.unwrap();
        assert_eq!(got.status, 200);
        assert_eq!(got.content_type.as_deref(), Some("image/png"));
        assert_eq!(&got.body[..], b"\x89PNG");
    }

    #[tokio::test]
    async fn test_send_returns_error_statuses_as_responses() {
        let pod = spawn_pod().await;
        let client = client(&pod);

        let response = client
            .send(PodRequest::get(pod.url("/nothing")).header("Accept", TEXT_TURTLE))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_json_ld_body_is_malformed() {
        let pod = spawn_pod().await;
        let client = client(&pod);
        let doc = br#"{"@context":"https://schema.org/","@type":"Invoice","totalPaymentDue":12}"#;
        pod.seed("/expenses/bad", "application/ld+json", doc);

        let err = client.read_expense(&pod.url("/expenses/bad")).await.unwrap_err();
        assert!(matches!(err, PodError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_unreachable_pod_is_transport_error() {
        let pod = spawn_pod().await;
        let err = client(&pod)
            .read_expense(&Url::parse("http://127.0.0.1:9/expenses/1").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, PodError::Transport(_)));
    }
}
