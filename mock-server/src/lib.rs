use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Payload served by `GET /ok`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub a: i64,
}

/// What `/echo` saw: the request line, headers and raw body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    /// Body bytes, for payloads that are not UTF-8.
    pub raw: Vec<u8>,
}

pub const XML_NOTE: &str = "<note><to>Tove</to><from>Jani</from><priority>2</priority></note>";
pub const HTML_PAGE: &str = "<html><body><h1>hello</h1></body></html>";

/// Targets of the `CONNECT` requests the server has refused, in arrival order.
pub type ConnectLog = Arc<Mutex<Vec<String>>>;

pub fn app() -> Router {
    app_with_connect_log(ConnectLog::default())
}

/// Same routes as `app`, recording every `CONNECT` target into `log`. The
/// tunnel itself is always refused with 403, so a client routed through this
/// server as a proxy fails after the server has seen the request.
pub fn app_with_connect_log(log: ConnectLog) -> Router {
    Router::new()
        .route("/ok", get(ok))
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/xml", get(xml))
        .route("/html", get(html))
        .route("/empty", get(empty))
        .route("/bytes/{n}", get(bytes))
        .route("/status/{code}", any(status))
        .route("/cookies", get(cookies))
        .fallback(unrouted)
        .with_state(log)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_connect_log(listener, ConnectLog::default()).await
}

pub async fn run_with_connect_log(
    listener: TcpListener,
    log: ConnectLog,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_connect_log(log)).await
}

async fn unrouted(State(log): State<ConnectLog>, method: Method, uri: Uri) -> StatusCode {
    if method != Method::CONNECT {
        return StatusCode::NOT_FOUND;
    }
    tracing::debug!(%uri, "refusing connect");
    log.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(uri.to_string());
    StatusCode::FORBIDDEN
}

async fn ok() -> Json<Sample> {
    Json(Sample { a: 1 })
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect();
    tracing::debug!(%method, %uri, len = body.len(), "echo");
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
        raw: body.to_vec(),
    })
}

async fn xml() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/xml")], XML_NOTE)
}

async fn html() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], HTML_PAGE)
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// `n` bytes cycling through 0..=255.
pub fn byte_pattern(n: usize) -> Vec<u8> {
    (0..n).map(|i| (i % 256) as u8).collect()
}

async fn bytes(Path(n): Path<usize>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        byte_pattern(n),
    )
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}

async fn cookies() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.append(header::SET_COOKIE, HeaderValue::from_static("session=abc"));
    headers.append(header::SET_COOKIE, HeaderValue::from_static("theme=dark"));
    (headers, "cookies set")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_serializes_to_json() {
        let json = serde_json::to_string(&Sample { a: 1 }).unwrap();
        assert_eq!(json, r#"{"a":1}"#);
    }

    #[test]
    fn byte_pattern_wraps() {
        let bytes = byte_pattern(258);
        assert_eq!(bytes.len(), 258);
        assert_eq!(bytes[255], 255);
        assert_eq!(bytes[256], 0);
    }

    #[test]
    fn echo_roundtrips_through_json() {
        let echo = Echo {
            method: "POST".to_string(),
            path: "/echo".to_string(),
            headers: BTreeMap::from([("x-trace".to_string(), "1".to_string())]),
            body: "hi".to_string(),
            raw: b"hi".to_vec(),
        };
        let json = serde_json::to_string(&echo).unwrap();
        let back: Echo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, echo);
    }
}
