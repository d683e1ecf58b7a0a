//! Turning a client request configuration into an [`IncomingCall`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::method::Method;
use crate::stub::{IncomingCall, MatchAttributes};

/// `scheme://` or protocol-relative `//` prefix.
static ABSOLUTE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z\d+\-.]*:)?//").expect("absolute url pattern is valid")
});

/// Default headers layered beneath the per-request ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderDefaults {
    /// Sent with every request.
    pub common: BTreeMap<String, String>,
    /// Sent only with requests of the given method; overrides `common`.
    pub per_method: BTreeMap<Method, BTreeMap<String, String>>,
}

/// What a client knows about an outgoing request before it is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub default_headers: HeaderDefaults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RequestConfig {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            base_url: None,
            url: url.into(),
            headers: BTreeMap::new(),
            default_headers: HeaderDefaults::default(),
            params: None,
            data: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn default_headers(mut self, defaults: HeaderDefaults) -> Self {
        self.default_headers = defaults;
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Build the engine's call description from a request configuration.
pub fn extract_call(config: &RequestConfig) -> IncomingCall {
    let joined = join_url(config.base_url.as_deref(), &config.url);
    let (uri, query) = match joined.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query)),
        None => (joined.clone(), None),
    };

    let mut params = parse_query(query);
    if let Some(explicit) = &config.params {
        params.extend(explicit.clone());
    }

    let headers = flatten_headers(config);

    IncomingCall::new(
        config.method,
        uri,
        MatchAttributes {
            headers: (!headers.is_empty()).then_some(headers),
            params: (!params.is_empty()).then_some(params),
            body: config.data.clone(),
        },
    )
}

/// Join a base URL and a request URL with exactly one `/` between them.
/// Absolute request URLs are returned unchanged.
pub fn join_url(base_url: Option<&str>, url: &str) -> String {
    match base_url {
        Some(base) if !ABSOLUTE_URL.is_match(url) && !url.is_empty() => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            url.trim_start_matches('/')
        ),
        Some(base) if url.is_empty() => base.to_string(),
        _ => url.to_string(),
    }
}

/// Layer `common` < per-method defaults < request headers.
pub fn flatten_headers(config: &RequestConfig) -> BTreeMap<String, String> {
    let mut headers = config.default_headers.common.clone();
    if let Some(method_headers) = config.default_headers.per_method.get(&config.method) {
        headers.extend(method_headers.clone());
    }
    headers.extend(config.headers.clone());
    headers
}

/// Parse a query string, percent-decoding keys and values.
///
/// Values stay strings. A key repeated in the query collects its values into
/// an array, in query order.
pub fn parse_query(query: Option<&str>) -> BTreeMap<String, Value> {
    let mut params: BTreeMap<String, Value> = BTreeMap::new();
    let Some(query) = query else {
        return params;
    };
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let (key, value) = (decode(key), Value::String(decode(value)));
        match params.get_mut(&key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => *existing = Value::Array(vec![existing.take(), value]),
            None => {
                params.insert(key, value);
            }
        }
    }
    params
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url(None, "/path"), "/path");
        assert_eq!(join_url(Some("http://api"), "/path"), "http://api/path");
        assert_eq!(join_url(Some("http://api/"), "path"), "http://api/path");
        assert_eq!(join_url(Some("http://api/v1/"), "/users/"), "http://api/v1/users/");
        assert_eq!(join_url(Some("http://api"), ""), "http://api");
        assert_eq!(
            join_url(Some("http://api"), "https://other/x"),
            "https://other/x"
        );
        assert_eq!(join_url(Some("http://api"), "//cdn/x"), "//cdn/x");
    }

    #[test]
    fn test_parse_query_decodes() {
        let params = parse_query(Some("q=hello%20world&tag=a+b&flag&="));
        assert_eq!(params["q"], "hello world");
        assert_eq!(params["tag"], "a b");
        assert_eq!(params["flag"], "");
        assert!(parse_query(None).is_empty());
    }

    #[test]
    fn test_parse_query_collects_repeated_keys() {
        let params = parse_query(Some("a=1&b=x&a=2&a=3"));
        assert_eq!(params["a"], json!(["1", "2", "3"]));
        assert_eq!(params["b"], json!("x"));
    }

    #[test]
    fn test_headers_flatten_in_precedence_order() {
        let defaults = HeaderDefaults {
            common: [
                ("Accept".to_string(), "*/*".to_string()),
                ("X-Client".to_string(), "callstub".to_string()),
            ]
            .into_iter()
            .collect(),
            per_method: [(
                Method::Post,
                [("Content-Type".to_string(), "application/json".to_string())]
                    .into_iter()
                    .collect(),
            )]
            .into_iter()
            .collect(),
        };
        let config = RequestConfig::post("/items")
            .default_headers(defaults.clone())
            .header("Accept", "application/json");

        let headers = flatten_headers(&config);
        assert_eq!(headers["Accept"], "application/json");
        assert_eq!(headers["X-Client"], "callstub");
        assert_eq!(headers["Content-Type"], "application/json");

        let get = RequestConfig::get("/items").default_headers(defaults);
        assert!(!flatten_headers(&get).contains_key("Content-Type"));
    }

    #[test]
    fn test_extract_call_splits_inline_query() {
        let call = extract_call(&RequestConfig::get("/path?q=v&page=2").param("page", 3));
        assert_eq!(call.uri, "/path");
        let params = call.attributes.params.unwrap();
        assert_eq!(params["q"], json!("v"));
        // explicit params win over the inline query string
        assert_eq!(params["page"], json!(3));
        assert!(call.attributes.headers.is_none());
        assert!(call.attributes.body.is_none());
    }

    #[test]
    fn test_extract_call_with_base_url_and_body() {
        let call = extract_call(
            &RequestConfig::post("users")
                .base_url("http://api.local/")
                .header("Authorization", "Bearer t")
                .data(json!({"name": "n"})),
        );
        assert_eq!(call.method, Method::Post);
        assert_eq!(call.uri, "http://api.local/users");
        assert_eq!(call.attributes.headers.unwrap()["Authorization"], "Bearer t");
        assert_eq!(call.attributes.body, Some(json!({"name": "n"})));
        assert!(call.attributes.params.is_none());
    }
}
