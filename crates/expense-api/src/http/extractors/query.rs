//! Query parameters and URI validation.
//!
//! Parameter names keep the casing clients already send
//! (`resourceURL`, `destinationURL`, `expenseURL`).

use serde::Deserialize;
use url::Url;

use crate::http::error::AppError;

/// `?webid=`
#[derive(Debug, Default, Deserialize)]
pub struct WebIdQuery {
    pub webid: Option<String>,
}

/// `?resourceURL=`
#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    #[serde(rename = "resourceURL")]
    pub resource_url: Option<String>,
}

/// Upload targets, which may also arrive as multipart fields.
#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    #[serde(rename = "destinationURL")]
    pub destination_url: Option<String>,
    #[serde(rename = "expenseURL")]
    pub expense_url: Option<String>,
}

/// Parse a required absolute URI parameter.
pub fn require_uri(name: &str, raw: Option<&str>) -> Result<Url, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(format!("missing required parameter '{name}'")))?;
    Url::parse(raw).map_err(|e| {
        AppError::Validation(format!("parameter '{name}' is not an absolute URI ('{raw}'): {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_uri() {
        let url = require_uri("resourceURL", Some(" https://pod.example/a ")).unwrap();
        assert_eq!(url.as_str(), "https://pod.example/a");

        assert!(matches!(
            require_uri("resourceURL", None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            require_uri("resourceURL", Some("")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            require_uri("resourceURL", Some("expenses/1")),
            Err(AppError::Validation(_))
        ));
    }
}
