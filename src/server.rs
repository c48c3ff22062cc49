//! HTTP surface: `POST /generate_dishes` and a welcome route.

use crate::app::App;
use crate::models::{GenerationRequest, MenuResponse};
use crate::Error;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

pub const WELCOME_TEXT: &str = "Welcome to the Dish Generator API";

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Generation(#[from] Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            // Stage failures carry a fixed, user-facing message.
            ApiError::Generation(err @ Error::Generation(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Generation(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate dish.".to_string(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Build the application router around a shared [`App`].
pub fn router(app: Arc<App>) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/generate_dishes", post(generate_dishes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app)
}

async fn welcome() -> &'static str {
    WELCOME_TEXT
}

async fn generate_dishes(
    State(app): State<Arc<App>>,
    payload: std::result::Result<Json<GenerationRequest>, JsonRejection>,
) -> ApiResult<Json<MenuResponse>> {
    let request_id = Uuid::new_v4();

    let Json(request) = payload.map_err(|rejection| {
        warn!("[{}] Rejected request body: {}", request_id, rejection);
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let idea = request.idea().ok_or_else(|| {
        warn!("[{}] Request without an idea", request_id);
        ApiError::BadRequest("Idea is required".to_string())
    })?;

    let span = info_span!("generate_dishes", %request_id, variant = ?app.variant());
    async {
        info!("Generating menu for idea ({} chars)", idea.chars().count());
        let menu = app.generate_menu(idea, &request.style_influence).await?;
        info!("Menu generated");
        Ok::<_, ApiError>(Json(menu))
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::MOCK_IMAGE_URL;
    use crate::ai::{MockChatClient, MockImageGenerationClient};
    use crate::app::AppServices;
    use crate::models::MenuVariant;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tower::ServiceExt;

    const DETAILS: &str = "Ingredients:\nbeets\nComponents:\nfoam\nInstructions:\nRoast.";

    fn test_router(chat: MockChatClient, image_gen: MockImageGenerationClient) -> Router {
        router(Arc::new(App::with_services(
            AppServices {
                chat: Box::new(chat),
                image_gen: Box::new(image_gen),
            },
            MenuVariant::Dish,
        )))
    }

    fn dish_chat() -> MockChatClient {
        MockChatClient::new()
            .with_response("Earthy beets under a cloud of goat cheese.")
            .with_response(DETAILS)
            .with_response("Beet Cloud")
    }

    async fn post_json(router: Router, body: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/generate_dishes")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_welcome_route() {
        let router = test_router(MockChatClient::new(), MockImageGenerationClient::new());
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], WELCOME_TEXT.as_bytes());
    }

    #[tokio::test]
    async fn test_generate_dish_success() {
        let (status, body) = post_json(
            test_router(dish_chat(), MockImageGenerationClient::new()),
            r#"{"idea": "beets", "style_influence": {"Rustic": 9, "Modernist": 2}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["short_name"], "Beet Cloud");
        assert_eq!(
            body["menu_item_description"],
            "Earthy beets under a cloud of goat cheese."
        );
        assert_eq!(body["ingredients"], "beets");
        assert_eq!(body["components"], "foam");
        assert_eq!(body["instructions"], "Roast.");
        assert_eq!(body["image_url"], MOCK_IMAGE_URL);
    }

    #[tokio::test]
    async fn test_float_style_weights_are_accepted() {
        let chat = dish_chat();
        let chat_handle = chat.clone();

        let (status, body) = post_json(
            test_router(chat, MockImageGenerationClient::new()),
            r#"{"idea": "beets", "style_influence": {"Rustic": 7.5, "Comfort": 3.0, "Modernist": 8.0}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["short_name"], "Beet Cloud");
        let description_prompt = &chat_handle.get_requests()[0].user;
        assert!(description_prompt.contains("Modernist: 8, Rustic: 7.5"));
        assert!(!description_prompt.contains("Comfort"));
    }

    #[tokio::test]
    async fn test_missing_idea_is_bad_request_without_outbound_calls() {
        for body in [r#"{}"#, r#"{"idea": ""}"#, r#"{"idea": "  ", "style_influence": {}}"#] {
            let chat = MockChatClient::new();
            let chat_handle = chat.clone();
            let image_gen = MockImageGenerationClient::new();
            let image_handle = image_gen.clone();

            let (status, response) = post_json(test_router(chat, image_gen), body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(response["error"], "Idea is required");
            assert_eq!(chat_handle.get_call_count(), 0);
            assert_eq!(image_handle.get_call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (status, response) = post_json(
            test_router(MockChatClient::new(), MockImageGenerationClient::new()),
            "not json",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_generation_failure_is_internal_error() {
        let (status, response) = post_json(
            test_router(
                dish_chat().with_failure_on_call(2),
                MockImageGenerationClient::new(),
            ),
            r#"{"idea": "beets"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response["error"], "Failed to generate name.");
    }

    #[tokio::test]
    async fn test_blank_name_is_internal_error() {
        let chat = MockChatClient::new()
            .with_response("Earthy beets under a cloud of goat cheese.")
            .with_response(DETAILS)
            .with_response("**");
        let image_gen = MockImageGenerationClient::new();
        let image_handle = image_gen.clone();

        let (status, response) = post_json(test_router(chat, image_gen), r#"{"idea": "beets"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response["error"], "Failed to generate name.");
        assert_eq!(image_handle.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_image_failure_still_succeeds() {
        let (status, body) = post_json(
            test_router(
                dish_chat(),
                MockImageGenerationClient::new().with_failure(true),
            ),
            r#"{"idea": "beets"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["image_url"].is_null());
        assert_eq!(body["short_name"], "Beet Cloud");
        assert_eq!(body["ingredients"], "beets");
    }
}
