use crate::utils::splice_str;
use axum::extract::Request;

/// Timestamp layout used in reports.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Method, path and raw query of an intercepted request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub path: String,
    pub query: String,
}

impl From<&Request> for RequestLine {
    fn from(request: &Request) -> Self {
        Self {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query: request.uri().query().unwrap_or_default().to_string(),
        }
    }
}

/// Diagnostic context for one captured panic. Lives only until it has been
/// flattened into notification text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultReport {
    pub env: String,
    pub host: String,
    pub timestamp: String,
    pub request: RequestLine,
    pub body: String,
    pub fault: String,
    pub stack: String,
}

impl FaultReport {
    /// One field per line, stack trace last. Meant for humans; fields are
    /// not escaped, so multi-line values are ambiguous.
    #[rustfmt::skip]
    pub fn flatten(&self) -> String {
        splice_str(&[
            "Env: ", &self.env, "\n",
            "Host: ", &self.host, "\n",
            "Time: ", &self.timestamp, "\n",
            "Request: ", &self.request.method, " ", &self.request.path, "\n",
            "Params: ", &self.request.query, "\n",
            "Body: ", &self.body, "\n",
            "Panic: ", &self.fault, "\n",
            &self.stack,
        ])
    }
}
