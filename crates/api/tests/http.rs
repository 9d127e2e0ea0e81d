//! HTTP-level behavior of the coach API.

use std::sync::Arc;
use std::time::Duration;

use api::{AppState, StaticAuthenticator};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use coach::{ChatPipeline, GoalSuggester, PipelineConfig, PollPolicy};
use coach_core::{Language, Plan, RunStatus};
use database::{life_area, message, thread, usage, user, Database, LifeArea, User};
use mock_provider::ScriptedProvider;
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN: &str = "token-dana";
const USER: &str = "user-dana";
const ASSISTANT: &str = "asst_coach";

struct Harness {
    db: Database,
    provider: Arc<ScriptedProvider>,
    app: Router,
}

async fn harness(plan: Plan, used: i64, provider: ScriptedProvider) -> Harness {
    let db = Database::in_memory().await.unwrap();
    user::create_user(
        db.pool(),
        &User {
            id: USER.to_string(),
            email: None,
            language: Language::He,
            plan,
        },
    )
    .await
    .unwrap();
    usage::set_messages_used(db.pool(), USER, used).await.unwrap();

    let provider = Arc::new(provider);
    let pipeline = ChatPipeline::new(
        db.clone(),
        provider.clone(),
        PipelineConfig::new(ASSISTANT).with_poll(PollPolicy::new(Duration::from_millis(1), 3)),
    );
    let suggester = GoalSuggester::new(db.clone(), provider.clone());
    let auth = StaticAuthenticator::new().with_token(TOKEN, USER);
    let app = api::app(AppState::new(pipeline, suggester, Arc::new(auth)));

    Harness { db, provider, app }
}

fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn sleep_question() -> Value {
    json!({
        "message": "How do I sleep better?",
        "contextType": "general",
        "language": "en"
    })
}

#[tokio::test]
async fn health_is_public() {
    let h = harness(Plan::Free, 0, ScriptedProvider::new()).await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn chat_requires_a_valid_token() {
    let h = harness(Plan::Free, 0, ScriptedProvider::new()).await;

    let (status, body) = send(&h.app, post("/v1/ai/chat", None, sleep_question())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing authorization header");

    let (status, body) = send(&h.app, post("/v1/ai/chat", Some("forged"), sleep_question())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid authorization token");
    assert_eq!(h.provider.calls().total(), 0);
}

#[tokio::test]
async fn chat_at_limit_returns_402() {
    let h = harness(Plan::Free, 5, ScriptedProvider::new()).await;

    let (status, body) = send(&h.app, post("/v1/ai/chat", Some(TOKEN), sleep_question())).await;

    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"], "AI_LIMIT_REACHED");
    assert_eq!(body["plan"], "free");
    assert_eq!(body["remainingFreeMessages"], 0);
    assert!(body["message"].as_str().unwrap().contains("5"));
    assert_eq!(h.provider.calls().total(), 0);
}

#[tokio::test]
async fn chat_success_reports_remaining() {
    let h = harness(
        Plan::Free,
        2,
        ScriptedProvider::new().with_reply("Try a consistent bedtime."),
    )
    .await;

    let (status, body) = send(&h.app, post("/v1/ai/chat", Some(TOKEN), sleep_question())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assistantMessage"], "Try a consistent bedtime.");
    assert_eq!(body["plan"], "free");
    assert_eq!(body["remainingFreeMessages"], 2);
    assert!(body["conversationId"].is_string());
    assert_eq!(usage::messages_used(h.db.pool(), USER).await.unwrap(), 3);
    assert_eq!(message::count_messages_for_user(h.db.pool(), USER).await.unwrap(), 2);
}

#[tokio::test]
async fn premium_chat_is_unlimited() {
    let h = harness(Plan::Premium, 99, ScriptedProvider::new()).await;

    let (status, body) = send(&h.app, post("/v1/ai/chat", Some(TOKEN), sleep_question())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plan"], "premium");
    assert_eq!(body["remainingFreeMessages"], -1);
}

#[tokio::test]
async fn expired_thread_returns_410_in_request_language() {
    let h = harness(Plan::Free, 0, ScriptedProvider::new()).await;
    thread::upsert_thread(h.db.pool(), USER, ASSISTANT, "thread_gone")
        .await
        .unwrap();

    let body = json!({"message": "שלום", "contextType": "general", "language": "he"});
    let (status, body) = send(&h.app, post("/v1/ai/chat", Some(TOKEN), body)).await;

    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["error"], "THREAD_EXPIRED");
    assert_eq!(body["message"], coach::localized::thread_expired(Language::He));
    assert!(thread::get_thread(h.db.pool(), USER, ASSISTANT)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn failed_run_returns_500() {
    let h = harness(
        Plan::Free,
        0,
        ScriptedProvider::new().with_run_statuses([RunStatus::Cancelled]),
    )
    .await;

    let (status, body) = send(&h.app, post("/v1/ai/chat", Some(TOKEN), sleep_question())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Run failed with status: cancelled");
}

#[tokio::test]
async fn malformed_bodies_are_400() {
    let h = harness(Plan::Free, 0, ScriptedProvider::new()).await;

    let unknown_context = json!({"message": "hi", "contextType": "dreams", "language": "en"});
    let (status, body) = send(&h.app, post("/v1/ai/chat", Some(TOKEN), unknown_context)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let blank = json!({"message": "  ", "contextType": "general", "language": "en"});
    let (status, body) = send(&h.app, post("/v1/ai/chat", Some(TOKEN), blank)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Message is required");
    assert_eq!(h.provider.calls().total(), 0);
}

#[tokio::test]
async fn usage_reports_plan_state() {
    let h = harness(Plan::Free, 4, ScriptedProvider::new()).await;

    let (status, body) = send(&h.app, get("/v1/ai/usage", TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"plan": "free", "used": 4, "limit": 5, "remainingFreeMessages": 1})
    );
}

#[tokio::test]
async fn goal_suggestions_round_trip() {
    let answer = r#"{"suggestions":[{"title":"Walk daily","description":"20 minutes","timeframe":"30 days"}]}"#;
    let h = harness(Plan::Free, 5, ScriptedProvider::new().with_completion(answer)).await;
    life_area::create_life_area(
        h.db.pool(),
        &LifeArea {
            id: "area-health".to_string(),
            key: "health".to_string(),
            name_en: "Health".to_string(),
            name_he: "בריאות".to_string(),
            description_en: None,
            description_he: None,
        },
    )
    .await
    .unwrap();

    let request = json!({"lifeAreaId": "area-health", "language": "he"});
    let (status, body) = send(&h.app, post("/v1/ai/goal-suggestions", Some(TOKEN), request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestions"][0]["title"], "Walk daily");
    assert_eq!(body["lifeArea"]["name"], "בריאות");
    assert_eq!(body["lifeArea"]["baselineScore"], 5);

    let missing = json!({"lifeAreaId": "area-none", "language": "en"});
    let (status, body) = send(&h.app, post("/v1/ai/goal-suggestions", Some(TOKEN), missing)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Life area not found");
}

#[tokio::test]
async fn unparseable_suggestions_are_500() {
    let h = harness(
        Plan::Free,
        0,
        ScriptedProvider::new().with_completion("Sorry, no JSON today."),
    )
    .await;
    life_area::create_life_area(
        h.db.pool(),
        &LifeArea {
            id: "area-career".to_string(),
            key: "career".to_string(),
            name_en: "Career".to_string(),
            name_he: "קריירה".to_string(),
            description_en: None,
            description_he: None,
        },
    )
    .await
    .unwrap();

    let request = json!({"lifeAreaId": "area-career", "language": "en"});
    let (status, body) = send(&h.app, post("/v1/ai/goal-suggestions", Some(TOKEN), request)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to parse AI response. Please try again.");
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let h = harness(Plan::Free, 0, ScriptedProvider::new()).await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/v1/ai/chat")
        .header(header::ORIGIN, "http://localhost:8081")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
        .body(Body::empty())
        .unwrap();

    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
