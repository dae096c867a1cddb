//! Request descriptors.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The captured body of an outbound call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// A fully buffered body.
    Bytes(Bytes),
    /// A streaming or otherwise uncapturable payload. Calls carrying an
    /// opaque body cannot be replayed.
    Opaque,
}

/// A serializable description of one outbound HTTP call.
///
/// Interceptors retain descriptors verbatim so captured calls can be
/// re-issued later without holding references to any client library's
/// request objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// HTTP method, uppercase.
    pub method: String,
    /// Target URL as given by the caller.
    pub url: String,
    /// Header name/value pairs, in insertion order.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// The captured body.
    #[serde(default)]
    pub body: RequestBody,
}

impl RequestDescriptor {
    /// Create a descriptor for the given method and URL.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into().to_uppercase(),
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Create a GET descriptor.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Create a POST descriptor.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a buffered body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = RequestBody::Bytes(body.into());
        self
    }

    /// Mark the body as uncapturable. The call still executes normally but
    /// cannot be replayed.
    pub fn with_opaque_body(mut self) -> Self {
        self.body = RequestBody::Opaque;
        self
    }

    /// Whether this call can be re-issued from the captured descriptor.
    pub fn is_replayable(&self) -> bool {
        !matches!(self.body, RequestBody::Opaque)
    }

    /// The URL with surrounding whitespace trimmed and any fragment
    /// stripped; fragments are never sent on the wire.
    pub fn normalized_url(&self) -> String {
        let trimmed = self.url.trim();
        match trimmed.split_once('#') {
            Some((base, _)) => base.to_string(),
            None => trimmed.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_uppercased() {
        let request = RequestDescriptor::new("post", "https://api.example.com/items");
        assert_eq!(request.method, "POST");
    }

    #[test]
    fn test_normalized_url_strips_fragment() {
        let request = RequestDescriptor::get("  https://example.com/page#section ");
        assert_eq!(request.normalized_url(), "https://example.com/page");

        let plain = RequestDescriptor::get("https://example.com/page");
        assert_eq!(plain.normalized_url(), "https://example.com/page");
    }

    #[test]
    fn test_replayability() {
        let buffered = RequestDescriptor::post("https://example.com").with_body("payload");
        assert!(buffered.is_replayable());

        let streaming = RequestDescriptor::post("https://example.com").with_opaque_body();
        assert!(!streaming.is_replayable());
    }

    #[test]
    fn test_descriptor_serializes() {
        let request = RequestDescriptor::post("https://example.com/items")
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"thing"}"#);

        let blob = serde_json::to_string(&request).unwrap();
        let loaded: RequestDescriptor = serde_json::from_str(&blob).unwrap();
        assert_eq!(loaded, request);
    }
}
