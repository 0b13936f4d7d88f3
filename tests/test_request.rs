use relic::http::request::{Method, Request, RequestBuilder, Version};

fn request_with(headers: Vec<(&str, &str)>) -> Request {
    Request {
        method: Method::POST,
        path: "/form".to_string(),
        version: Version::Http10,
        headers: headers
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        body: vec![],
    }
}

#[test]
fn test_request_header_retrieval() {
    let req = request_with(vec![("Host", "example.com"), ("Content-Type", "text/plain")]);

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("text/plain"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_header_lookup_ignores_case() {
    let req = request_with(vec![("if-modified-since", "Sun, 06 Nov 1994 08:49:37 GMT")]);

    assert_eq!(
        req.header("If-Modified-Since"),
        Some("Sun, 06 Nov 1994 08:49:37 GMT")
    );
}

#[test]
fn test_request_first_duplicate_header_wins() {
    let req = request_with(vec![("X-Tag", "one"), ("X-Tag", "two")]);

    assert_eq!(req.header("X-Tag"), Some("one"));
}

#[test]
fn test_request_content_length_parsing() {
    let req = request_with(vec![("Content-Length", "42")]);

    assert_eq!(req.content_length(), Some(42));
}

#[test]
fn test_request_content_length_missing() {
    let req = request_with(vec![]);

    assert_eq!(req.content_length(), None);
}

#[test]
fn test_request_content_length_invalid() {
    let req = request_with(vec![("Content-Length", "not-a-number")]);

    assert_eq!(req.content_length(), None);
}

#[test]
fn test_method_tokens() {
    assert_eq!(Method::from_token("GET"), Method::GET);
    assert_eq!(Method::from_token("HEAD"), Method::HEAD);
    assert_eq!(Method::from_token("POST"), Method::POST);
    assert_eq!(Method::from_token("DELETE"), Method::Other("DELETE".to_string()));
    assert_eq!(Method::from_token("DELETE").as_str(), "DELETE");
}

#[test]
fn test_version_tokens_are_case_sensitive() {
    assert_eq!(Version::from_token("HTTP/0.9"), Some(Version::Http09));
    assert_eq!(Version::from_token("HTTP/1.0"), Some(Version::Http10));
    assert_eq!(Version::from_token("HTTP/1.1"), Some(Version::Http11));
    assert_eq!(Version::from_token("http/1.0"), None);
    assert_eq!(Version::from_token("HTTP/2.0"), None);
    assert!(Version::Http09.is_legacy());
    assert!(!Version::Http11.is_legacy());
}

#[test]
fn test_request_builder_defaults_to_http10() {
    let req = RequestBuilder::new()
        .method(Method::GET)
        .path("/index.html")
        .build()
        .unwrap();

    assert_eq!(req.version, Version::Http10);
    assert!(req.headers.is_empty());
    assert!(req.body.is_empty());
}

#[test]
fn test_request_builder_requires_method_and_path() {
    assert!(RequestBuilder::new().path("/").build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).build().is_err());
}
