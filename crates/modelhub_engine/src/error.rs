use std::fmt;

/// Normalized backend failure produced at the collaborator boundary.
///
/// Everything downstream of the adapter clients classifies on
/// `status_code`; nothing outside this crate inspects transport shapes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct BackendError {
    pub status_code: Option<u16>,
    pub body: String,
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "backend returned status {code}: {}", self.body),
            None => write!(f, "backend transport error: {}", self.body),
        }
    }
}

impl BackendError {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        Self {
            status_code: err.status().map(|status| status.as_u16()),
            body: err.to_string(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            body: message.into(),
        }
    }

    /// Consumes a non-success response into a normalized error.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self {
            status_code: Some(status),
            body,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status_code == Some(409)
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status_code == Some(403)
    }
}
