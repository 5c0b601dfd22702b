//! Utilities for working with HTTP requests and responses.

use std::collections::HashMap;
use std::net::SocketAddr;

use hyper::header::HOST;
use hyper::http::request::Parts;
use hyper::{Body, HeaderMap, Response, StatusCode};

use crate::version::{CGI_VERSION, SERVER_SOFTWARE_VERSION};

/// The page is served from the root, so every path is PATH_INFO.
const SCRIPT_NAME: &str = "/";

/// Create an HTTP 500 response
pub(crate) fn internal_error(msg: impl std::string::ToString) -> Response<Body> {
    let message = msg.to_string();
    tracing::error!(%message, "HTTP 500 error");
    let mut res = Response::new(Body::from(message));
    *res.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    res
}

/// Build the CGI meta-variables for an inbound request.
///
/// See RFC 3875, section 4.1. Request headers are exposed as HTTP_* variables,
/// except for the ones the RFC says must not be passed through.
pub(crate) fn build_cgi_environment(
    req: &Parts,
    content_length: usize,
    client_addr: SocketAddr,
    default_host: &str,
) -> HashMap<String, String> {
    let (host, port) = parse_host_header_uri(&req.headers, &req.uri, default_host);
    let mut vars = HashMap::new();

    vars.insert("AUTH_TYPE".to_owned(), "".to_owned());
    vars.insert("CONTENT_LENGTH".to_owned(), content_length.to_string());
    vars.insert(
        "CONTENT_TYPE".to_owned(),
        req.headers
            .get(hyper::header::CONTENT_TYPE)
            .and_then(|c| c.to_str().ok())
            .unwrap_or("")
            .to_owned(),
    );

    // Not in RFC 3875, hence the X_ prefix.
    vars.insert(
        "X_FULL_URL".to_owned(),
        format!(
            "http://{}:{}{}",
            host,
            port,
            req.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("")
        ),
    );

    vars.insert("GATEWAY_INTERFACE".to_owned(), CGI_VERSION.to_owned());
    vars.insert(
        "QUERY_STRING".to_owned(),
        req.uri.query().unwrap_or("").to_owned(),
    );
    vars.insert("REMOTE_ADDR".to_owned(), client_addr.ip().to_string());
    vars.insert("REMOTE_HOST".to_owned(), client_addr.ip().to_string());
    vars.insert("REMOTE_USER".to_owned(), "".to_owned());
    vars.insert("REQUEST_METHOD".to_owned(), req.method.to_string());

    vars.insert("SCRIPT_NAME".to_owned(), SCRIPT_NAME.to_owned());
    let raw_path_info = req.uri.path().to_owned();
    let path_info = url_escape::decode(&raw_path_info).to_string();
    vars.insert("X_RAW_PATH_INFO".to_owned(), raw_path_info);
    vars.insert("PATH_INFO".to_owned(), path_info.clone());
    vars.insert("PATH_TRANSLATED".to_owned(), path_info);

    vars.insert("SERVER_NAME".to_owned(), host);
    vars.insert("SERVER_PORT".to_owned(), port);
    vars.insert("SERVER_PROTOCOL".to_owned(), format!("{:?}", req.version));
    vars.insert(
        "SERVER_SOFTWARE".to_owned(),
        SERVER_SOFTWARE_VERSION.to_owned(),
    );

    for (name, value) in req.headers.iter() {
        let key = format!("HTTP_{}", name.as_str().to_uppercase().replace('-', "_"));
        // RFC 3875 4.1.18: credentials and connection details stay with the server
        if key == "HTTP_AUTHORIZATION" || key == "HTTP_CONNECTION" {
            continue;
        }
        let val = value.to_str().unwrap_or("CORRUPT VALUE").to_owned();
        vars.insert(key, val);
    }

    vars
}

/// Work out the host and port the client addressed.
///
/// The request URI is the weakest source, then the configured default host,
/// and the Host header is the most authoritative. If nothing supplies a value,
/// `localhost` and `80` are used.
pub(crate) fn parse_host_header_uri(
    headers: &HeaderMap,
    uri: &hyper::Uri,
    default_host: &str,
) -> (String, String) {
    let host_header = headers.get(HOST).and_then(|v| v.to_str().ok());

    let mut host = uri.host().unwrap_or("localhost").to_owned();
    let mut port = uri.port_u16().unwrap_or(80).to_string();

    let mut apply = |hdr: &str| {
        let mut parts = hdr.splitn(2, ':');
        if let Some(h) = parts.next().filter(|h| !h.is_empty()) {
            host = h.to_owned();
        }
        if let Some(p) = parts.next().filter(|p| !p.is_empty()) {
            tracing::debug!(port = p, "Overriding port");
            port = p.to_owned();
        }
    };

    if !default_host.is_empty() {
        apply(default_host);
    }
    if let Some(hdr) = host_header {
        apply(hdr);
    }

    (host, port)
}

#[cfg(test)]
mod test {
    use super::*;
    use hyper::Request;
    use std::str::FromStr;

    fn host_headers(val: &str) -> HeaderMap {
        let mut hm = HeaderMap::new();
        hm.insert(
            HOST,
            hyper::header::HeaderValue::from_str(val).expect("Made a header value"),
        );
        hm
    }

    #[test]
    fn host_header_wins_over_everything() {
        let uri = hyper::Uri::from_str("http://localhost:443/a").expect("parsed URI");
        let (host, port) =
            parse_host_header_uri(&host_headers("snap.example:8443"), &uri, "example.com:1234");
        assert_eq!("snap.example", host);
        assert_eq!("8443", port);
    }

    #[test]
    fn host_header_without_port_keeps_default_port() {
        let uri = hyper::Uri::from_str("http://localhost:443/a").expect("parsed URI");
        let (host, port) =
            parse_host_header_uri(&host_headers("snap.example"), &uri, "example.com:1234");
        assert_eq!("snap.example", host);
        assert_eq!("1234", port);
    }

    #[test]
    fn falls_back_to_uri_then_localhost() {
        let uri = hyper::Uri::from_str("http://internal:8080/a").expect("parsed URI");
        let (host, port) = parse_host_header_uri(&HeaderMap::new(), &uri, "");
        assert_eq!("internal", host);
        assert_eq!("8080", port);

        let uri = hyper::Uri::from_str("/a").expect("parsed URI");
        let (host, port) = parse_host_header_uri(&HeaderMap::new(), &uri, "");
        assert_eq!("localhost", host);
        assert_eq!("80", port);
    }

    #[test]
    fn builds_cgi_meta_variables() {
        let (req, _) = Request::builder()
            .uri("/some/where%3bthere?foo=bar")
            .header("X-Test-Header", "hello")
            .header("Accept", "text/html")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Host", "snap.example:3000")
            .header("Authorization", "supersecret")
            .header("Connection", "keep-alive")
            .method("POST")
            .body(())
            .expect("request built")
            .into_parts();
        let client_addr = "192.168.0.1:50000".parse().expect("Should parse IP");

        let vars = build_cgi_environment(&req, 42, client_addr, "localhost:3000");

        let want = |key: &str, expect: &str| {
            let v = vars
                .get(key)
                .unwrap_or_else(|| panic!("expected to find key {}", key));
            assert_eq!(expect, v, "Key: {}", key)
        };

        want("AUTH_TYPE", "");
        want("CONTENT_LENGTH", "42");
        want("CONTENT_TYPE", "application/x-www-form-urlencoded");
        want("GATEWAY_INTERFACE", "CGI/1.1");
        want("PATH_INFO", "/some/where;there");
        want("PATH_TRANSLATED", "/some/where;there");
        want("X_RAW_PATH_INFO", "/some/where%3bthere");
        want("QUERY_STRING", "foo=bar");
        want("REMOTE_ADDR", "192.168.0.1");
        want("REMOTE_HOST", "192.168.0.1");
        want("REMOTE_USER", "");
        want("REQUEST_METHOD", "POST");
        want("SCRIPT_NAME", "/");
        want("SERVER_NAME", "snap.example");
        want("SERVER_PORT", "3000");
        want("SERVER_PROTOCOL", "HTTP/1.1");
        want("SERVER_SOFTWARE", SERVER_SOFTWARE_VERSION);
        want("X_FULL_URL", "http://snap.example:3000/some/where%3bthere?foo=bar");
        want("HTTP_ACCEPT", "text/html");
        want("HTTP_HOST", "snap.example:3000");
        want("HTTP_X_TEST_HEADER", "hello");

        assert!(vars.get("HTTP_AUTHORIZATION").is_none());
        assert!(vars.get("HTTP_CONNECTION").is_none());
    }
}
