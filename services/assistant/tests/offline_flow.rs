//! End-to-end flows through `AppState` with the real HTTP client and the
//! file-backed store.

use assistant_lib::adapters::{HttpRequestClient, JsonFileStore, SpeechCapabilities};
use assistant_lib::app::auth::AuthSource;
use assistant_lib::app::AppState;
use assistant_lib::config::Config;
use learning_assistant_core::domain::Role;
use learning_assistant_core::ports::KeyValueStore;
use learning_assistant_core::Language;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn unreachable_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port())
}

async fn state(base: &str, data_dir: &Path) -> AppState {
    let config = Arc::new(Config {
        api_base_url: base.to_string(),
        data_dir: data_dir.to_path_buf(),
        action_debounce: Duration::ZERO,
        ..Config::default()
    });
    let client = HttpRequestClient::new(base, Duration::from_secs(5)).unwrap();
    let store = JsonFileStore::open(data_dir).await.unwrap();
    let state = AppState::new(config, Arc::new(client), Arc::new(store), SpeechCapabilities::disabled());
    state.bootstrap().await.unwrap();
    state
}

#[tokio::test]
async fn offline_account_and_quiz_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let base = unreachable_base();

    let first = state(&base, dir.path()).await;
    let registered = first.auth.register("Learner@School.org", "pw", Role::Student).await.unwrap();
    assert_eq!(registered.source, AuthSource::Local);
    let user_id = registered.session.user_id.clone();
    drop(first);

    let second = state(&base, dir.path()).await;
    let ctx = second.context().await.unwrap();
    assert_eq!(ctx.user_id.as_deref(), Some(user_id.as_str()));

    second.auth.logout().await.unwrap();
    let by_id = second.auth.login(&user_id, "pw").await.unwrap();
    assert_eq!(by_id.session.email.as_deref(), Some("learner@school.org"));

    let mut quiz = second.quiz.lock().await;
    let load = quiz.load(&ctx, "Photosynthesis", 5).await.unwrap();
    assert!(load.offline);
    let attempt = quiz.attempt().unwrap();
    assert_eq!(attempt.len(), 5);
    assert!(attempt.questions().iter().all(|q| q.prompt.contains("Photosynthesis")));
}

#[tokio::test]
async fn remote_login_then_localized_explanation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "identifier": "t@s.com", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "token": "srv-token", "id": 77, "email": "t@s.com", "role": "teacher" }),
        ))
        .mount(&server)
        .await;
    Mock::given(path("/ai/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "summary": "Overview\nLight bends.\n\nRule\nAngles are equal." }),
        ))
        .mount(&server)
        .await;
    Mock::given(path("/translate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(path("/events/teacher"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state(&server.uri(), dir.path()).await;
    let outcome = state.auth.login("t@s.com", "pw").await.unwrap();
    assert_eq!(outcome.source, AuthSource::Remote);
    assert_eq!(outcome.destination(), Role::Teacher);

    state.set_language(Language::Hindi).await.unwrap();
    let ctx = state.context().await.unwrap();
    assert_eq!(ctx.user_id.as_deref(), Some("77"));

    let plan = state.teacher.lesson_plan(&ctx, "Reflection").await.unwrap();
    assert!(!plan.offline);
    assert_eq!(plan.sections.len(), 2);
    assert_eq!(plan.sections[0].heading, "Overview");

    let summary_calls: Vec<_> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/ai/summary")
        .collect();
    assert_eq!(
        summary_calls[0].headers.get("authorization").unwrap().to_str().unwrap(),
        "Bearer srv-token"
    );
}

#[tokio::test]
async fn file_store_persists_and_recovers_from_corruption() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store.set("tm_lang", "\"ar\"").await.unwrap();
        store.set("tm_token", "\"t\"").await.unwrap();
        store.remove("tm_token").await.unwrap();
    }
    let reopened = JsonFileStore::open(dir.path()).await.unwrap();
    assert_eq!(reopened.get("tm_lang").await.unwrap().as_deref(), Some("\"ar\""));
    assert_eq!(reopened.get("tm_token").await.unwrap(), None);

    let damaged = r#"{ "tm_local_users": "[{\"id\":\"12345678\"}]", broken"#;
    std::fs::write(dir.path().join("store.json"), damaged).unwrap();
    let recovered = JsonFileStore::open(dir.path()).await.unwrap();
    assert_eq!(recovered.get("tm_lang").await.unwrap(), None);
    recovered.set("tm_lang", "\"en\"").await.unwrap();

    let backups: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|p| p.file_name().unwrap().to_string_lossy().starts_with("store.json.corrupt-"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(std::fs::read_to_string(&backups[0]).unwrap(), damaged);

    let current = std::fs::read_to_string(dir.path().join("store.json")).unwrap();
    assert!(current.contains("tm_lang"));
    assert!(!current.contains("12345678"));
}
