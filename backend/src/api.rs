use andy::intent::{CommandClassifier, IntentClassifier, IntentParams};
use andy::responses::{Phrasebook, ResponseCategory};
use andy::{FulfillError, Fulfiller, FulfillmentReply};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub fulfiller: Arc<Fulfiller>,
    // Used when a request carries raw text instead of a classified intent
    pub classifier: Arc<dyn IntentClassifier>,
    phrases: Phrasebook,
}

#[derive(Debug, Deserialize)]
pub struct FulfillRequest {
    pub session_id: String,
    #[serde(default)]
    pub board_str: String,
    /// Classified intent id (name, display name or classifier path)
    #[serde(default, alias = "intent_name")]
    pub intent: Option<String>,
    #[serde(default)]
    pub parameters: Value,
    /// Raw text to classify when `intent` is absent
    #[serde(default)]
    pub utterance: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub recommender: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn router(fulfiller: Fulfiller) -> Router {
    let state = AppState {
        fulfiller: Arc::new(fulfiller),
        classifier: Arc::new(CommandClassifier::new()),
        phrases: Phrasebook::random(),
    };

    Router::new()
        .route("/api/fulfill", post(fulfill))
        .route("/api/health", get(health))
        .with_state(state)
}

async fn fulfill(
    State(state): State<AppState>,
    Json(payload): Json<FulfillRequest>,
) -> Result<Json<FulfillmentReply>, ApiError> {
    let (intent_id, params) = match (payload.intent, payload.utterance) {
        (Some(intent), _) => (intent, IntentParams::from_value(payload.parameters)),
        (None, Some(utterance)) => {
            let classified = state.classifier.classify(&utterance).await;
            (classified.intent_id, classified.params)
        }
        // Nothing understood: same as an unrecognized intent
        (None, None) => (String::new(), IntentParams::default()),
    };

    let reply = state
        .fulfiller
        .fulfill(&payload.session_id, &payload.board_str, &intent_id, params)
        .await
        .map_err(|e| reject(&state, e))?;

    info!(
        "[API] {} -> {} ({})",
        payload.session_id,
        reply.fulfillment_info.intent_name,
        reply.fulfillment_info.success
    );
    Ok(Json(reply))
}

fn reject(state: &AppState, e: FulfillError) -> ApiError {
    let (status, response_text) = match &e {
        FulfillError::EmptySessionId => (StatusCode::BAD_REQUEST, None),
        FulfillError::InvalidPosition(_) => (
            StatusCode::BAD_REQUEST,
            Some(state.phrases.say(ResponseCategory::Fallback)),
        ),
        FulfillError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
    };
    if status.is_server_error() {
        error!("[API] Fulfillment failed: {}", e);
    } else {
        warn!("[API] Rejected request: {}", e);
    }
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            response_text,
        }),
    )
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        recommender: state.fulfiller.recommender_name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: FulfillRequest =
            serde_json::from_str(r#"{"session_id": "abc", "intent": "HELLO"}"#).unwrap();
        assert_eq!(request.board_str, "");
        assert!(request.parameters.is_null());
        assert!(request.utterance.is_none());
    }

    #[test]
    fn test_request_accepts_intent_name() {
        let request: FulfillRequest = serde_json::from_str(
            r#"{"session_id": "abc", "intent_name": "CHOOSE_SIDE", "parameters": {"BoardSide": "white"}}"#,
        )
        .unwrap();
        assert_eq!(request.intent.as_deref(), Some("CHOOSE_SIDE"));
        assert_eq!(
            IntentParams::from_value(request.parameters).side.as_deref(),
            Some("white")
        );
    }

    #[test]
    fn test_error_response_omits_empty_text() {
        let body = ErrorResponse {
            error: "Session id must not be empty".to_string(),
            response_text: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("response_text"));
    }
}
