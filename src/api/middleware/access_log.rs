//! Access logging with credential-safe query strings.

use axum::{
    extract::{ConnectInfo, Request},
    http::header,
    middleware::Next,
    response::Response,
};
use std::{net::SocketAddr, time::Instant};

use crate::utils::secrets::sanitize_query_pairs;

/// Logs one line per request: client IP, request line, status, duration.
///
/// Query parameters are included, with values of credential-looking keys
/// (`key`, `token`, `secret`, ...) masked before they reach the log.
pub async fn layer(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let version = format!("{:?}", req.version());
    let query = req.uri().query().map(sanitized_query).unwrap_or_default();

    let ua = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let response = next.run(req).await;

    let status = response.status().as_u16();
    let ms = start.elapsed().as_millis();

    tracing::info!(
        r#"{ip} "{method} {path}{query} {version}" {status} "{ua}" {ms}ms"#,
        ip = addr.ip(),
        method = method,
        path = path,
        query = query,
        version = version,
        status = status,
        ua = ua,
        ms = ms,
    );

    response
}

/// Rebuilds the query string with sensitive values masked.
fn sanitized_query(raw: &str) -> String {
    let pairs: Vec<(String, String)> = raw
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect();

    let sanitized = sanitize_query_pairs(&pairs)
        .into_iter()
        .map(|(k, v)| if v.is_empty() { k } else { format!("{}={}", k, v) })
        .collect::<Vec<_>>()
        .join("&");

    format!("?{}", sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_query_masks_secrets() {
        let out = sanitized_query("location=nyc&api_key=supersecretvalue");

        assert!(out.starts_with('?'));
        assert!(out.contains("location=nyc"));
        assert!(!out.contains("supersecretvalue"));
        assert!(out.contains("api_key="));
    }

    #[test]
    fn test_sanitized_query_keeps_flags() {
        assert_eq!(sanitized_query("verbose"), "?verbose");
    }
}
