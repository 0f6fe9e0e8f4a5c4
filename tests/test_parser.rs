use beacon::http::message::StartLine;
use beacon::http::parser::{FramingError, find_headers_end, is_complete, parse_request, parse_response};
use beacon::http::request::{ConnectionMode, Method, build_request};
use beacon::http::response::build_response;

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let parsed = parse_request(req).unwrap();

    assert_eq!(parsed.method(), Some("GET"));
    assert_eq!(parsed.path(), Some("/"));
    assert_eq!(parsed.version(), "HTTP/1.1");
    assert_eq!(parsed.header("Host"), Some("example.com"));
}

#[test]
fn test_parse_response_with_body() {
    let res = b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 13\r\n\r\n<html></html>";
    let parsed = parse_response(res).unwrap();

    assert_eq!(parsed.status_code(), Some(200));
    assert_eq!(parsed.reason(), Some("OK"));
    assert_eq!(parsed.header("content-type"), Some("text/html"));
    assert_eq!(parsed.body, b"<html></html>".to_vec());
}

#[test]
fn test_parse_missing_delimiter_fails() {
    let res = b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n";

    assert_eq!(
        parse_response(res),
        Err(FramingError::MissingDelimiter(res.len()))
    );
    assert!(matches!(
        parse_request(b"GET / HTTP/1.1\r\n"),
        Err(FramingError::MissingDelimiter(_))
    ));
}

#[test]
fn test_parse_reason_phrase_with_spaces() {
    let parsed = parse_response(b"HTTP/1.1 404 Not Found\r\n\r\n").unwrap();

    assert_eq!(
        parsed.start_line,
        StartLine::Status {
            version: "HTTP/1.1".to_string(),
            code: 404,
            reason: "Not Found".to_string(),
        }
    );
}

#[test]
fn test_parse_empty_reason_phrase() {
    let parsed = parse_response(b"HTTP/1.1 299 \r\n\r\n").unwrap();

    assert_eq!(parsed.status_code(), Some(299));
    assert_eq!(parsed.reason(), Some(""));
}

#[test]
fn test_parse_non_numeric_status_fails() {
    let result = parse_response(b"HTTP/1.1 abc OK\r\n\r\n");
    assert!(matches!(result, Err(FramingError::MalformedStartLine(_))));
}

#[test]
fn test_parse_request_line_with_too_few_tokens() {
    let result = parse_request(b"GET /\r\nHost: x\r\n\r\n");
    assert!(matches!(result, Err(FramingError::MalformedStartLine(_))));
}

#[test]
fn test_parse_request_accepts_unknown_method() {
    let parsed = parse_request(b"BREW /pot HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(parsed.method(), Some("BREW"));
}

#[test]
fn test_parse_ignores_header_without_separator() {
    let req = b"GET / HTTP/1.1\r\nBrokenHeader\r\nNoSpace:value\r\nHost: example.com\r\n\r\n";
    let parsed = parse_request(req).unwrap();

    assert_eq!(parsed.headers.len(), 1);
    assert_eq!(parsed.header("host"), Some("example.com"));
}

#[test]
fn test_parse_duplicate_header_last_wins() {
    let res = b"HTTP/1.1 200 OK\r\nX-Tag: first\r\nx-tag: second\r\n\r\n";
    let parsed = parse_response(res).unwrap();

    assert_eq!(parsed.header("X-Tag"), Some("second"));
}

#[test]
fn test_parse_header_value_may_contain_separator() {
    let res = b"HTTP/1.1 200 OK\r\nX-Note: a: b\r\n\r\n";
    let parsed = parse_response(res).unwrap();

    assert_eq!(parsed.header("x-note"), Some("a: b"));
}

#[test]
fn test_parse_rejects_non_utf8_headers() {
    let res = b"HTTP/1.1 200 OK\r\nX-Bad: \xff\xfe\r\n\r\n";
    assert_eq!(parse_response(res), Err(FramingError::InvalidEncoding));
}

#[test]
fn test_parse_binary_body_is_kept_verbatim() {
    let res = b"HTTP/1.1 200 OK\r\n\r\n\x00\x01\r\n\r\n\xff";
    let parsed = parse_response(res).unwrap();

    assert_eq!(parsed.body, b"\x00\x01\r\n\r\n\xff".to_vec());
}

#[test]
fn test_built_request_parses_back() {
    let bytes = build_request(Method::GET, "/docs/a.html", "localhost:8080", ConnectionMode::KeepAlive);
    let parsed = parse_request(&bytes).unwrap();

    assert_eq!(parsed.method(), Some("GET"));
    assert_eq!(parsed.path(), Some("/docs/a.html"));
    assert_eq!(parsed.header("HOST"), Some("localhost:8080"));
    assert_eq!(parsed.header("connection"), Some("keep-alive"));
    assert!(parsed.body.is_empty());
}

#[test]
fn test_built_response_parses_back() {
    let bytes = build_response(404, None);
    let parsed = parse_response(&bytes).unwrap();

    assert_eq!(parsed.status_code(), Some(404));
    assert_eq!(parsed.reason(), Some("Not Found"));
    assert_eq!(parsed.header("connection"), Some("close"));
    assert!(parsed.header("content-type").is_none());
}

#[test]
fn test_find_headers_end() {
    assert_eq!(find_headers_end(b"A\r\n\r\nB"), Some(1));
    assert_eq!(find_headers_end(b"A\r\nB"), None);
}

#[test]
fn test_is_complete_waits_for_delimiter() {
    assert!(!is_complete(b""));
    assert!(!is_complete(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n"));
    assert!(is_complete(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n"));
}

#[test]
fn test_is_complete_exactly_at_content_length() {
    let head = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n";
    let mut message = head.to_vec();
    message.extend_from_slice(b"hello");

    for end in 0..message.len() {
        assert!(!is_complete(&message[..end]), "complete too early at {}", end);
    }
    assert!(is_complete(&message));
}

#[test]
fn test_is_complete_is_monotonic() {
    let mut message = b"HTTP/1.1 200 OK\r\ncontent-length: 3\r\n\r\nabc".to_vec();
    assert!(is_complete(&message));

    message.extend_from_slice(b"trailing bytes");
    assert!(is_complete(&message));
}

#[test]
fn test_is_complete_without_content_length() {
    // Close-delimited bodies cannot be detected here; headers alone complete the message.
    assert!(is_complete(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n"));
    assert!(is_complete(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\npartial"));
}

#[test]
fn test_is_complete_header_name_case_insensitive() {
    assert!(!is_complete(b"HTTP/1.1 200 OK\r\nCONTENT-LENGTH: 4\r\n\r\nab"));
}

#[test]
fn test_is_complete_with_overflowing_content_length() {
    for len in [usize::MAX, usize::MAX - 1, usize::MAX - 40] {
        let mut message =
            format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n", len).into_bytes();
        assert!(!is_complete(&message));

        message.extend_from_slice(&[b'x'; 64]);
        assert!(!is_complete(&message));
    }
}

#[test]
fn test_is_complete_ignores_invalid_content_length() {
    assert!(is_complete(b"HTTP/1.1 200 OK\r\nContent-Length: many\r\n\r\n"));
}
