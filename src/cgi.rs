//! Turning CGI program output into an HTTP response.

use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE, LOCATION};
use hyper::{Body, Response, StatusCode};

use crate::http_util::internal_error;

/// Build an HTTP response from CGI output.
///
/// The output is a block of `Name: value` header lines, a blank line, and the
/// body. At least one of `Content-type`, `Status` or `Location` must be present
/// (RFC 3875, section 6.2), otherwise the result is a 500.
pub fn compose_response(output: &[u8]) -> anyhow::Result<Response<Body>> {
    let (header_block, body) = split_output(output);

    let mut res = Response::new(Body::from(body.to_vec()));
    let mut sufficient_response = false;

    for (name, value) in parse_cgi_headers(std::str::from_utf8(header_block)?) {
        match name.to_lowercase().as_str() {
            "content-type" => {
                sufficient_response = true;
                res.headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_str(&value)?);
            }
            "status" => {
                sufficient_response = true;
                // `Status: CODE [REASON]`, only the code matters
                let status_code = value.split_once(' ').map(|(code, _)| code).unwrap_or(value.as_str());
                tracing::debug!(status_code, "Raw status code");
                match status_code.parse::<StatusCode>() {
                    Ok(code) => *res.status_mut() = code,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to parse status code");
                        *res.status_mut() = StatusCode::BAD_GATEWAY;
                    }
                }
            }
            "location" => {
                sufficient_response = true;
                res.headers_mut()
                    .insert(LOCATION, HeaderValue::from_str(&value)?);
                *res.status_mut() = StatusCode::FOUND;
            }
            lower => match (
                HeaderName::from_lowercase(lower.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(hdr), Ok(val)) => {
                    res.headers_mut().insert(hdr, val);
                }
                (Err(e), _) => {
                    tracing::error!(error = %e, header_name = %name, "Invalid header name")
                }
                (_, Err(e)) => {
                    tracing::error!(error = %e, header_name = %name, "Invalid header value")
                }
            },
        }
    }

    if !sufficient_response {
        return Ok(internal_error(
            "Exactly one of 'location' or 'content-type' must be specified",
        ));
    }
    Ok(res)
}

/// Split at the first blank line. Output without one is all header.
fn split_output(output: &[u8]) -> (&[u8], &[u8]) {
    match output.windows(2).position(|w| w == b"\n\n") {
        Some(idx) => (&output[..idx], &output[idx + 2..]),
        None => (output, &[]),
    }
}

fn parse_cgi_headers(headers: &str) -> Vec<(String, String)> {
    headers
        .trim()
        .lines()
        .filter_map(|h| match h.split_once(':') {
            Some((name, value)) => Some((name.trim().to_owned(), value.trim().to_owned())),
            None => {
                tracing::warn!(header = h, "corrupt header");
                None
            }
        })
        .collect()
}
