//! `POST /predict` handler
//!
//! Model lookup -> body -> feature frame -> scaling -> inference -> JSON.
//! The model is looked up first so a missing artifact is a 404 whatever the payload.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response, StatusCode};
use serde::Serialize;

use crate::config::AppState;
use crate::error::PredictError;
use crate::http;
use crate::logger;
use crate::pipeline::{self, FeatureFrame};

/// Success body: `{"Prediction": [..]}`
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    #[serde(rename = "Prediction")]
    pub prediction: Vec<f64>,
}

pub async fn handle_predict<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match predict(req, state).await {
        Ok(prediction) => {
            http::build_json_response(StatusCode::OK, &PredictionResponse { prediction })
        }
        Err(err) => error_response(&err),
    }
}

async fn predict<B>(req: Request<B>, state: &AppState) -> Result<Vec<f64>, PredictError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let model = state.models.get().await.map_err(|e| {
        logger::log_info(&format!("Model file not found: {e}"));
        PredictError::from(e)
    })?;

    let body = read_body(req, state.config.http.max_body_size).await?;
    logger::log_debug(&format!("JSON payload: {}", String::from_utf8_lossy(&body)));

    let frame = FeatureFrame::from_json(&body)?;
    logger::log_debug(&format!("Row index: {}", frame.row_keys().join(", ")));
    logger::log_info(&format!(
        "Inference payload: {} rows x {} features [{}]",
        frame.n_rows(),
        frame.n_columns(),
        frame.columns().join(", ")
    ));

    let prediction = pipeline::run(&frame, &model, state.config.model.scaling)?;
    logger::log_info(&format!("Prediction value: {prediction:?}"));
    Ok(prediction)
}

/// Collect the body, enforcing the declared and actual size limit
async fn read_body<B>(req: Request<B>, max_body_size: u64) -> Result<Bytes, PredictError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if let Some(size) = declared_length(&req) {
        if size > max_body_size {
            return Err(PredictError::PayloadTooLarge {
                size,
                max: max_body_size,
            });
        }
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(PredictError::PayloadTooLarge {
                size: max_body_size.saturating_add(1),
                max: max_body_size,
            })
        }
        Err(e) => Err(PredictError::BadRequest(format!(
            "failed to read request body: {e}"
        ))),
    }
}

fn declared_length<B>(req: &Request<B>) -> Option<u64> {
    req.headers()
        .get(hyper::header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn error_response(err: &PredictError) -> Response<Full<Bytes>> {
    let status = err.status();
    match err {
        PredictError::ModelNotLoaded => http::build_text_response(status, &err.to_string()),
        PredictError::BadRequest(_) | PredictError::PayloadTooLarge { .. } => {
            logger::log_warning(&format!("Rejected prediction request: {err}"));
            http::build_json_error(status, &err.to_string())
        }
        PredictError::Inference(_) | PredictError::Model(_) => {
            logger::log_error(&format!("Prediction failed: {err}"));
            http::build_json_error(status, &err.to_string())
        }
    }
}
