//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route matching, method validation,
//! common headers and access logging.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, SERVER};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use super::{home, predict};
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};

const HOME_ALLOW: &str = "GET, HEAD, OPTIONS";
const PREDICT_ALLOW: &str = "POST, OPTIONS";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let access_log = state.config.logging.access_log;
    let started = access_log.then(|| AccessLogEntry::start(&req, peer));

    let mut response = route_request(req, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }
    if state.config.http.enable_cors {
        response
            .headers_mut()
            .entry(ACCESS_CONTROL_ALLOW_ORIGIN)
            .or_insert(HeaderValue::from_static("*"));
    }

    if let Some((mut entry, start)) = started {
        let body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.finish(response.status().as_u16(), body_bytes, start);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path and method
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let enable_cors = state.config.http.enable_cors;

    match path.as_str() {
        "/" => match method {
            Method::GET => home::serve_home(false),
            Method::HEAD => home::serve_home(true),
            Method::OPTIONS => http::build_options_response(HOME_ALLOW, enable_cors),
            _ => method_not_allowed(&method, &path, HOME_ALLOW),
        },
        "/predict" => match method {
            Method::POST => predict::handle_predict(req, state).await,
            Method::OPTIONS => http::build_options_response(PREDICT_ALLOW, enable_cors),
            _ => method_not_allowed(&method, &path, PREDICT_ALLOW),
        },
        p if state.config.health.enabled && p == state.config.health.liveness_path => {
            http::build_health_response(true, "ok")
        }
        p if state.config.health.enabled && p == state.config.health.readiness_path => {
            if state.models.is_available().await {
                http::build_health_response(true, "ok")
            } else {
                http::build_health_response(false, "model not loaded")
            }
        }
        _ => http::build_404_response(),
    }
}

fn method_not_allowed(method: &Method, path: &str, allow: &str) -> Response<Full<Bytes>> {
    logger::log_warning(&format!("Method not allowed: {method} {path}"));
    http::build_405_response(allow)
}
