//! Chat session against a live API server on an ephemeral port.

use std::sync::Arc;
use std::time::Duration;

use api::{AppState, StaticAuthenticator};
use chat_client::{ChatMessage, ChatSession, ClientConfig, ClientError, Role};
use coach::{ChatPipeline, GoalSuggester, PipelineConfig, PollPolicy};
use coach_core::wire::{ChatRequest, GoalSuggestionRequest};
use coach_core::{ContextType, Language, Plan, RunStatus};
use database::{life_area, thread, usage, user, Database, LifeArea, User};
use mock_provider::ScriptedProvider;

const TOKEN: &str = "token-noa";
const USER: &str = "user-noa";

struct Server {
    db: Database,
    provider: Arc<ScriptedProvider>,
    base_url: String,
}

async fn serve(plan: Plan, used: i64, provider: ScriptedProvider) -> Server {
    let db = Database::in_memory().await.unwrap();
    user::create_user(
        db.pool(),
        &User {
            id: USER.to_string(),
            email: None,
            language: Language::En,
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
        PipelineConfig::new("asst_coach").with_poll(PollPolicy::new(Duration::from_millis(1), 3)),
    );
    let suggester = GoalSuggester::new(db.clone(), provider.clone());
    let auth = StaticAuthenticator::new().with_token(TOKEN, USER);
    let app = api::app(AppState::new(pipeline, suggester, Arc::new(auth)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Server {
        db,
        provider,
        base_url: format!("http://{}", addr),
    }
}

fn session(server: &Server, token: &str) -> ChatSession {
    ChatSession::new(ClientConfig::new(&server.base_url).with_access_token(token)).unwrap()
}

fn ask(text: &str) -> ChatRequest {
    ChatRequest::new(text, ContextType::General, Language::En)
}

#[tokio::test]
async fn successful_send_appends_both_sides() {
    let server = serve(
        Plan::Free,
        2,
        ScriptedProvider::new().with_reply("Try a consistent bedtime."),
    )
    .await;
    let session = session(&server, TOKEN);

    let response = session
        .send_message(ask("How do I sleep better?"))
        .await
        .unwrap();

    assert_eq!(response.remaining_free_messages, 2);
    assert_eq!(
        session.messages(),
        vec![
            ChatMessage {
                role: Role::User,
                content: "How do I sleep better?".to_string(),
            },
            ChatMessage {
                role: Role::Assistant,
                content: "Try a consistent bedtime.".to_string(),
            },
        ]
    );
    assert_eq!(session.remaining_messages(), Some(2));
    assert_eq!(session.plan(), Some(Plan::Free));
    assert!(!session.is_loading());
    assert!(session.last_error().is_none());
}

#[tokio::test]
async fn limit_reached_rolls_back_and_zeroes_remaining() {
    let server = serve(Plan::Free, 5, ScriptedProvider::new()).await;
    let session = session(&server, TOKEN);

    let err = session
        .send_message(ask("How do I sleep better?"))
        .await
        .unwrap_err();

    assert!(err.is_limit_reached());
    match err {
        ClientError::LimitReached { message, plan } => {
            assert!(message.contains("5 messages"));
            assert_eq!(plan, Some(Plan::Free));
        }
        other => panic!("expected limit error, got {:?}", other),
    }
    assert!(session.messages().is_empty());
    assert_eq!(session.remaining_messages(), Some(0));
    assert_eq!(session.last_error().as_deref(), Some("AI_LIMIT_REACHED"));
    assert_eq!(server.provider.calls().total(), 0);
}

#[tokio::test]
async fn failure_keeps_earlier_transcript() {
    let server = serve(Plan::Free, 0, ScriptedProvider::new().with_reply("Hi!")).await;
    let session = session(&server, TOKEN);

    session.send_message(ask("hello")).await.unwrap();
    server.provider.fail_next(coach_core::ProviderError::Api {
        status: 500,
        message: "upstream".to_string(),
    });
    let err = session.send_message(ask("again")).await.unwrap_err();

    assert!(matches!(err, ClientError::Server { status: 500, .. }));
    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, "Hi!");
}

#[tokio::test]
async fn expired_thread_then_resend_succeeds() {
    let server = serve(Plan::Free, 0, ScriptedProvider::new()).await;
    thread::upsert_thread(server.db.pool(), USER, "asst_coach", "thread_stale")
        .await
        .unwrap();
    let session = session(&server, TOKEN);

    let err = session.send_message(ask("hello")).await.unwrap_err();
    assert!(matches!(err, ClientError::ThreadExpired { .. }));
    assert!(session.messages().is_empty());

    session.send_message(ask("hello")).await.unwrap();
    assert_eq!(session.messages().len(), 2);
}

#[tokio::test]
async fn timed_out_run_is_a_server_error() {
    let server = serve(
        Plan::Free,
        0,
        ScriptedProvider::new().with_run_statuses([RunStatus::InProgress]),
    )
    .await;
    let session = session(&server, TOKEN);

    let err = session.send_message(ask("hello")).await.unwrap_err();
    match err {
        ClientError::Server { status, error } => {
            assert_eq!(status, 500);
            assert!(error.contains("timeout"));
        }
        other => panic!("expected server error, got {:?}", other),
    }
    assert!(session.messages().is_empty());
}

#[tokio::test]
async fn bad_token_is_not_authenticated() {
    let server = serve(Plan::Free, 0, ScriptedProvider::new()).await;
    let session = session(&server, "stolen");

    let err = session.send_message(ask("hello")).await.unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
    assert!(session.messages().is_empty());
}

#[tokio::test]
async fn remaining_messages_for_free_and_premium() {
    let server = serve(Plan::Free, 3, ScriptedProvider::new()).await;
    let session = session(&server, TOKEN);
    assert_eq!(session.fetch_remaining_messages().await.unwrap(), 2);
    assert_eq!(session.plan(), Some(Plan::Free));

    let premium = serve(Plan::Premium, 3, ScriptedProvider::new()).await;
    let session = self::session(&premium, TOKEN);
    assert_eq!(session.fetch_remaining_messages().await.unwrap(), -1);
    // Once the plan is known, no further round trip is needed.
    assert_eq!(session.plan(), Some(Plan::Premium));
    assert_eq!(session.fetch_remaining_messages().await.unwrap(), -1);
}

#[tokio::test]
async fn clear_messages_resets_transcript() {
    let server = serve(Plan::Free, 0, ScriptedProvider::new()).await;
    let session = session(&server, TOKEN);

    session.send_message(ask("hello")).await.unwrap();
    session.clear_messages();
    assert!(session.messages().is_empty());
    assert!(session.last_error().is_none());
}

#[tokio::test]
async fn goal_suggestions() {
    let answer = "```json\n{\"suggestions\":[{\"title\":\"Journal nightly\",\"description\":\"5 lines\",\"timeframe\":\"21 days\"}]}\n```";
    let server = serve(Plan::Free, 0, ScriptedProvider::new().with_completion(answer)).await;
    life_area::create_life_area(
        server.db.pool(),
        &LifeArea {
            id: "area-mind".to_string(),
            key: "mind".to_string(),
            name_en: "Mind".to_string(),
            name_he: "נפש".to_string(),
            description_en: Some("Mental wellbeing".to_string()),
            description_he: None,
        },
    )
    .await
    .unwrap();
    let session = session(&server, TOKEN);

    let response = session
        .generate_goal_suggestions(&GoalSuggestionRequest {
            life_area_id: "area-mind".to_string(),
            language: Language::En,
            count: Some(1),
        })
        .await
        .unwrap();

    assert_eq!(response.suggestions.len(), 1);
    assert_eq!(response.suggestions[0].title, "Journal nightly");
    assert_eq!(response.life_area.name, "Mind");
}
