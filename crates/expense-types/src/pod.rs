//! Low-level request/response pair for the pod `send` primitive.
//!
//! Used for everything the typed read/create/update/delete calls do not
//! cover: raw Turtle reads and non-RDF uploads.

use std::fmt;

use bytes::Bytes;
use url::Url;

use crate::error::PodError;

pub const TEXT_TURTLE: &str = "text/turtle";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// HTTP methods the gateway issues against a pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodMethod {
    Get,
    Put,
    Delete,
}

impl PodMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PodMethod::Get => "GET",
            PodMethod::Put => "PUT",
            PodMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for PodMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to send to a pod, built with [`PodRequest::get`] or
/// [`PodRequest::put`] and refined with [`PodRequest::header`].
#[derive(Debug, Clone, PartialEq)]
pub struct PodRequest {
    pub method: PodMethod,
    pub uri: Url,
    /// Header pairs in insertion order.
    pub headers: Vec<(String, String)>,
    pub body: Option<Bytes>,
}

impl PodRequest {
    pub fn new(method: PodMethod, uri: Url) -> Self {
        Self {
            method,
            uri,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(uri: Url) -> Self {
        Self::new(PodMethod::Get, uri)
    }

    pub fn put(uri: Url, body: Bytes) -> Self {
        let mut request = Self::new(PodMethod::Put, uri);
        request.body = Some(body);
        request
    }

    pub fn delete(uri: Url) -> Self {
        Self::new(PodMethod::Delete, uri)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of a header, matched case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What a pod answered.
#[derive(Debug, Clone, PartialEq)]
pub struct PodResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl PodResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8.
    pub fn text(&self) -> Result<String, PodError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| PodError::MalformedPayload(format!("response body is not UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder_headers() {
        let uri = Url::parse("https://pod.example/doc").unwrap();
        let request = PodRequest::get(uri).header("Accept", TEXT_TURTLE);

        assert_eq!(request.method, PodMethod::Get);
        assert_eq!(request.header_value("accept"), Some(TEXT_TURTLE));
        assert!(request.body.is_none());
    }

    #[test]
    fn test_response_text_rejects_invalid_utf8() {
        let response = PodResponse {
            status: 200,
            content_type: None,
            body: Bytes::from_static(&[0xff, 0xfe]),
        };
        assert!(matches!(response.text(), Err(PodError::MalformedPayload(_))));
    }

    #[test]
    fn test_response_success_range() {
        let make = |status| PodResponse {
            status,
            content_type: None,
            body: Bytes::new(),
        };
        assert!(!make(199).is_success());
        assert!(make(200).is_success());
        assert!(make(299).is_success());
        assert!(!make(300).is_success());
    }
}
