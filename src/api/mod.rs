pub mod client;
pub mod types;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ClientError;

/// Describes one backend call. Segments and query values are kept raw and
/// only percent-encoded when resolved against the server base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// `POST /api/poll-now`
    pub fn poll_now() -> Self {
        Self::new(Method::POST, &["api", "poll-now"])
    }

    /// `POST /api/generate-briefing`
    pub fn generate_briefing() -> Self {
        Self::new(Method::POST, &["api", "generate-briefing"])
    }

    /// `POST /api/reclassify/{id}?category={category}`
    pub fn reclassify(item_id: &str, category: &str) -> Self {
        Self::new(Method::POST, &["api", "reclassify", item_id]).with_query("category", category)
    }

    /// `GET /api/briefings/{id}/tweets[?category=]`
    pub fn briefing_items(briefing_id: &str, category: Option<&str>) -> Self {
        let request = Self::new(Method::GET, &["api", "briefings", briefing_id, "tweets"]);
        match category {
            Some(category) => request.with_query("category", category),
            None => request,
        }
    }

    /// `GET /api/settings`
    pub fn settings() -> Self {
        Self::new(Method::GET, &["api", "settings"])
    }

    /// Unencoded path, used for logging and lookups.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Empty, `.` and `..` segments are refused: the URL parser would drop
    /// or collapse them and the request would reach a different endpoint.
    pub fn resolve(&self, base: &Url) -> Result<Url, ClientError> {
        if let Some(bad) = self
            .segments
            .iter()
            .find(|s| matches!(s.as_str(), "" | "." | ".."))
        {
            return Err(ClientError::PathSegment(bad.clone()));
        }

        let mut url = base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ClientError::Config(format!("{base} cannot be used as a base URL")))?;
            segments.pop_if_empty();
            segments.extend(&self.segments);
        }
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

/// Raw response: status plus body text. Interpretation is left to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// The backend seam. Errors are transport-level only; HTTP error statuses
/// come back as an `ApiResponse`.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError>;
}

#[cfg(test)]
pub mod testing {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{ApiRequest, ApiResponse, Backend};
    use crate::dispatch::{Location, Navigator};
    use crate::error::ClientError;

    /// In-memory backend keyed by unencoded request path.
    #[derive(Default)]
    pub struct FakeBackend {
        replies: Mutex<HashMap<String, Option<ApiResponse>>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, path: &str, status: u16, body: &str) -> Self {
            self.replies.lock().unwrap().insert(
                path.to_string(),
                Some(ApiResponse {
                    status,
                    body: body.to_string(),
                }),
            );
            self
        }

        /// Make `path` fail as if the connection was refused.
        pub fn unreachable(self, path: &str) -> Self {
            self.replies.lock().unwrap().insert(path.to_string(), None);
            self
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
            self.requests.lock().unwrap().push(request.clone());
            match self.replies.lock().unwrap().get(&request.path()) {
                Some(Some(response)) => Ok(response.clone()),
                _ => Err(ClientError::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))),
            }
        }
    }

    #[derive(Default)]
    pub struct RecordingNavigator {
        pub visited: Mutex<Vec<Location>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, location: &Location) -> anyhow::Result<()> {
            self.visited.lock().unwrap().push(location.clone());
            Ok(())
        }
    }

    pub struct FailingNavigator;

    impl Navigator for FailingNavigator {
        fn navigate(&self, _location: &Location) -> anyhow::Result<()> {
            anyhow::bail!("view closed")
        }
    }

    pub struct PanickingNavigator;

    impl Navigator for PanickingNavigator {
        fn navigate(&self, _location: &Location) -> anyhow::Result<()> {
            panic!("navigation exploded")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://127.0.0.1:8000").unwrap()
    }

    #[test]
    fn test_poll_url() {
        let url = ApiRequest::poll_now().resolve(&base()).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/poll-now");
    }

    #[test]
    fn test_reclassify_encodes_identifier() {
        let request = ApiRequest::reclassify("abc 123", "news");
        assert_eq!(request.method, Method::POST);
        let url = request.resolve(&base()).unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/api/reclassify/abc%20123?category=news"
        );
    }

    #[test]
    fn test_reclassify_encodes_slash_and_query_chars() {
        let url = ApiRequest::reclassify("a/b?c", "stock ideas&x")
            .resolve(&base())
            .unwrap();
        assert_eq!(url.path(), "/api/reclassify/a%2Fb%3Fc");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("category".to_string(), "stock ideas&x".to_string())]
        );
    }

    #[test]
    fn test_dot_segments_are_refused() {
        for id in ["..", ".", ""] {
            let result = ApiRequest::reclassify(id, "news").resolve(&base());
            assert!(
                matches!(result, Err(ClientError::PathSegment(ref s)) if s == id),
                "{id:?} resolved to {result:?}"
            );
        }
        let url = ApiRequest::reclassify("...", "news").resolve(&base()).unwrap();
        assert_eq!(url.path(), "/api/reclassify/...");
    }

    #[test]
    fn test_resolve_keeps_base_prefix() {
        let base = Url::parse("https://example.com/muncher/").unwrap();
        let url = ApiRequest::settings().resolve(&base).unwrap();
        assert_eq!(url.as_str(), "https://example.com/muncher/api/settings");
    }

    #[test]
    fn test_briefing_items_filter() {
        let request = ApiRequest::briefing_items("7", Some("charts"));
        assert_eq!(request.path(), "/api/briefings/7/tweets");
        let url = request.resolve(&base()).unwrap();
        assert_eq!(url.query(), Some("category=charts"));
        assert!(ApiRequest::briefing_items("7", None).query.is_empty());
    }

    #[test]
    fn test_response_success_range() {
        let ok = ApiResponse {
            status: 204,
            body: String::new(),
        };
        let err = ApiResponse {
            status: 500,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!err.is_success());
    }
}
