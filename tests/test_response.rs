use chrono::{TimeZone, Utc};
use relic::http::request::Version;
use relic::http::response::{Response, ResponseBuilder, StatusCode};
use relic::http::writer::{LineEnding, ResponseWriter, serialize_response};

fn fixed_date() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2008, 11, 9, 12, 0, 0).unwrap()
}

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::Created.as_u16(), 201);
    assert_eq!(StatusCode::MovedPermanently.as_u16(), 301);
    assert_eq!(StatusCode::NotModified.as_u16(), 304);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::Unauthorized.as_u16(), 401);
    assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::Created.reason_phrase(), "Created");
    assert_eq!(StatusCode::MovedPermanently.reason_phrase(), "Moved Permanently");
    assert_eq!(StatusCode::NotModified.reason_phrase(), "Not Modified");
    assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
    assert_eq!(StatusCode::Unauthorized.reason_phrase(), "Unauthorized");
    assert_eq!(StatusCode::Forbidden.reason_phrase(), "Forbidden");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    assert_eq!(StatusCode::NotImplemented.reason_phrase(), "Not Implemented");
}

#[test]
fn test_response_builder_keeps_header_order() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .content_type("text/plain")
        .header("X-First", "1")
        .header("X-Second", "2")
        .body(b"test".to_vec())
        .build();

    assert_eq!(response.content_type.as_deref(), Some("text/plain"));
    assert_eq!(
        response.headers,
        vec![
            ("X-First".to_string(), "1".to_string()),
            ("X-Second".to_string(), "2".to_string()),
        ]
    );
}

#[test]
fn test_error_responses_carry_html_page() {
    for status in [
        StatusCode::BadRequest,
        StatusCode::Forbidden,
        StatusCode::NotFound,
        StatusCode::NotImplemented,
    ] {
        let response = Response::error(status);
        let body = String::from_utf8(response.body).unwrap();

        assert_eq!(response.status, status);
        assert_eq!(response.content_type.as_deref(), Some("text/html; charset=utf-8"));
        assert!(body.contains(&format!("Error {}", status.as_u16())));
    }
}

#[test]
fn test_unauthorized_names_realm() {
    let response = Response::unauthorized("Staff");

    assert_eq!(response.status, StatusCode::Unauthorized);
    assert_eq!(response.header("WWW-Authenticate"), Some("Basic realm=\"Staff\""));
}

#[test]
fn test_moved_permanently_sets_location() {
    let response = Response::moved_permanently("/docs/");

    assert_eq!(response.status, StatusCode::MovedPermanently);
    assert_eq!(response.header("location"), Some("/docs/"));
}

// Wire framing is configurable. CRLF is the default and what RFC 1945 asks
// for; LF reproduces the bare line feeds of the historical server.

#[test]
fn test_serialize_with_crlf_framing() {
    let response = Response::ok(b"hi".to_vec(), "text/html; charset=utf-8");
    let bytes = serialize_response(&response, Version::Http10, LineEnding::Crlf, fixed_date());

    assert_eq!(
        &bytes[..],
        b"HTTP/1.0 200 OK\r\n\
          Date: Sun, 09 Nov 2008 12:00:00 GMT\r\n\
          Content-Length: 2\r\n\
          Content-Type: text/html; charset=utf-8\r\n\
          \r\n\
          hi"
    );
}

#[test]
fn test_serialize_with_lf_framing() {
    let response = Response::ok(b"hi".to_vec(), "text/html; charset=utf-8");
    let bytes = serialize_response(&response, Version::Http10, LineEnding::Lf, fixed_date());

    assert_eq!(
        &bytes[..],
        b"HTTP/1.0 200 OK\n\
          Date: Sun, 09 Nov 2008 12:00:00 GMT\n\
          Content-Length: 2\n\
          Content-Type: text/html; charset=utf-8\n\
          \n\
          hi"
    );
    assert!(!bytes.contains(&b'\r'));
}

#[test]
fn test_serialize_http11_request_gets_http10_status_line() {
    let response = Response::not_found();
    let bytes = serialize_response(&response, Version::Http11, LineEnding::Crlf, fixed_date());

    assert!(bytes.starts_with(b"HTTP/1.0 404 Not Found\r\n"));
}

#[test]
fn test_serialize_http09_is_body_only() {
    let response = Response::ok(b"<p>legacy</p>".to_vec(), "text/html; charset=utf-8");
    let bytes = serialize_response(&response, Version::Http09, LineEnding::Crlf, fixed_date());

    assert_eq!(&bytes[..], b"<p>legacy</p>");
}

#[test]
fn test_serialize_extra_headers_after_content_type() {
    let response = Response::unauthorized("Staff");
    let bytes = serialize_response(&response, Version::Http10, LineEnding::Crlf, fixed_date());
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    let content_type = text.find("Content-Type:").unwrap();
    let challenge = text.find("WWW-Authenticate: Basic realm=\"Staff\"").unwrap();
    assert!(content_type < challenge);
}

#[test]
fn test_serialize_empty_body_has_zero_length() {
    let response = ResponseBuilder::new(StatusCode::NotModified).build();
    let bytes = serialize_response(&response, Version::Http10, LineEnding::Crlf, fixed_date());
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("Content-Length: 0\r\n"));
    assert!(!text.contains("Content-Type"));
    assert!(text.ends_with("\r\n\r\n"));
}

#[tokio::test]
async fn test_writer_reports_exact_size() {
    let response = Response::ok(b"hello".to_vec(), "text/plain");
    let mut writer =
        ResponseWriter::with_date(&response, Version::Http10, LineEnding::Crlf, fixed_date());
    let expected = writer.len();

    let mut sink: Vec<u8> = Vec::new();
    let written = writer.write_to_stream(&mut sink).await.unwrap();

    assert_eq!(written, expected);
    assert_eq!(sink.len(), expected);
    assert!(sink.ends_with(b"\r\n\r\nhello"));
}
