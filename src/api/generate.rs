use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::llm;
use crate::AppState;

/// Pull a non-empty string `prompt` out of the request body. Anything else
/// (missing key, wrong type, empty string) is a client error.
fn extract_prompt(body: &Value) -> Result<&str, ApiError> {
    body.get("prompt")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Invalid or missing prompt"))
}

/// POST /api/generate — forward a prompt to the upstream completion API.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let prompt = extract_prompt(&body)?;

    tracing::info!(
        prompt = %prompt.chars().take(100).collect::<String>(),
        "prompt received"
    );

    let result = state.llm.generate(prompt).await?;

    Ok(Json(json!({
        "result": result,
        "provider": llm::PROVIDER,
        "model": state.llm.model(),
    })))
}

/// GET /api/generate/ping — upstream-independent liveness probe.
pub async fn ping() -> Json<Value> {
    Json(json!({
        "ok": true,
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorCode;

    #[test]
    fn test_extract_prompt_accepts_string() {
        let body = json!({ "prompt": "hello" });
        assert_eq!(extract_prompt(&body).unwrap(), "hello");
    }

    #[test]
    fn test_extract_prompt_rejects_non_string() {
        for body in [
            json!({ "prompt": 123 }),
            json!({ "prompt": null }),
            json!({ "prompt": ["a"] }),
            json!({}),
            json!({ "prompt": "" }),
        ] {
            let err = extract_prompt(&body).unwrap_err();
            assert_eq!(err.code(), ErrorCode::BadRequest);
            assert_eq!(err.message(), "Invalid or missing prompt");
        }
    }

    #[tokio::test]
    async fn test_ping_shape() {
        let Json(body) = ping().await;
        assert_eq!(body["ok"], true);
        assert!(body["time"].as_str().is_some());
    }
}
