//! End-to-end runs of the summarize command against a local stand-in for
//! the provider APIs.

mod support;

use std::sync::Arc;

use serde_json::json;

use summarize_shortcut_core::orchestrator::NO_SELECTION_MESSAGE;
use summarize_shortcut_core::overlay::{OverlayState, CONTENT_ID};
use summarize_shortcut_core::page::{LocalBrowser, OverlayUpdate};
use summarize_shortcut_core::settings::ProviderCredentials;
use summarize_shortcut_core::{
    AppConfig, CommandOutcome, MemorySettingsStore, ProviderConfig, ProviderKind, ProviderRegistry,
    SummarizationOrchestrator,
};

use support::{browser_with_selection, closed_port_url, config_for, unreachable_config, MockServer};

const PROMPT_PREFIX: &str =
    "Summarize the following text in a concise way. Focus on the key points and important details only:\n\n";

fn openai_settings() -> ProviderConfig {
    ProviderConfig {
        selected_provider: Some("openai".to_string()),
        openai_api_key: Some("sk-test".to_string()),
        ..Default::default()
    }
}

fn azure_settings(endpoint: &str) -> ProviderConfig {
    ProviderConfig {
        selected_provider: Some("azure".to_string()),
        azure_api_key: Some("azure-key".to_string()),
        azure_endpoint: Some(format!("{}/", endpoint)),
        azure_deployment: Some("gpt35".to_string()),
        ..Default::default()
    }
}

fn gemini_settings() -> ProviderConfig {
    ProviderConfig {
        selected_provider: Some("gemini".to_string()),
        gemini_api_key: Some("g-key".to_string()),
        gemini_model: Some("gemini-1.5-flash".to_string()),
        ..Default::default()
    }
}

fn orchestrator(
    config: &AppConfig,
    browser: LocalBrowser,
    settings: ProviderConfig,
) -> SummarizationOrchestrator<LocalBrowser, MemorySettingsStore> {
    SummarizationOrchestrator::new(
        Arc::new(browser),
        Arc::new(MemorySettingsStore::new(settings)),
        ProviderRegistry::new(config).unwrap(),
    )
}

async fn overlay_html(o: &SummarizationOrchestrator<LocalBrowser, MemorySettingsStore>) -> String {
    o.host()
        .page()
        .await
        .overlay()
        .dom()
        .outer_html(CONTENT_ID)
        .unwrap_or_default()
}

async fn overlay_state(o: &SummarizationOrchestrator<LocalBrowser, MemorySettingsStore>) -> OverlayState {
    o.host().page().await.overlay().state()
}

fn chat_completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
    })
}

#[tokio::test]
async fn test_empty_selection_makes_no_request() {
    let server = MockServer::builder()
        .respond("POST", "/v1/chat/completions", 200, chat_completion("unused"))
        .start()
        .await;
    let o = orchestrator(&config_for(&server), browser_with_selection(""), openai_settings());

    let outcome = o.handle_summarize_command().await;

    assert_eq!(
        outcome,
        CommandOutcome::Completed {
            update: OverlayUpdate::Error {
                message: NO_SELECTION_MESSAGE.to_string()
            },
            delivered: true,
        }
    );
    assert_eq!(overlay_state(&o).await, OverlayState::ShowingError);
    assert!(overlay_html(&o).await.contains(NO_SELECTION_MESSAGE));
    assert!(server.requests().await.is_empty());
}

#[tokio::test]
async fn test_no_provider_makes_no_request() {
    let server = MockServer::builder()
        .respond("POST", "/v1/chat/completions", 200, chat_completion("unused"))
        .start()
        .await;
    let o = orchestrator(
        &config_for(&server),
        browser_with_selection("A long article about ownership."),
        ProviderConfig::default(),
    );

    o.handle_summarize_command().await;

    assert_eq!(overlay_state(&o).await, OverlayState::ShowingError);
    assert!(overlay_html(&o)
        .await
        .contains("No LLM provider selected. Please configure in extension settings."));
    assert!(server.requests().await.is_empty());
}

#[tokio::test]
async fn test_openai_summary_rendered() {
    let server = MockServer::builder()
        .respond("POST", "/v1/chat/completions", 200, chat_completion("Summary X"))
        .start()
        .await;
    let o = orchestrator(
        &config_for(&server),
        browser_with_selection("Borrowing lets code use a value without taking ownership."),
        openai_settings(),
    );

    let outcome = o.handle_summarize_command().await;

    assert_eq!(
        outcome,
        CommandOutcome::Completed {
            update: OverlayUpdate::Summary {
                text: "Summary X".to_string(),
                provider: Some(ProviderKind::OpenAi),
            },
            delivered: true,
        }
    );
    assert_eq!(overlay_state(&o).await, OverlayState::ShowingResult);
    let html = overlay_html(&o).await;
    assert!(html.contains("Summary X"));
    assert!(html.contains("Summarized with OpenAI"));

    let requests = server.requests().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.header("authorization"), Some("Bearer sk-test"));

    let body = request.json();
    assert_eq!(body["model"], "gpt-3.5-turbo");
    assert_eq!(body["max_tokens"], 200);
    assert_eq!(body["temperature"], 0.5);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(
        body["messages"][1]["content"],
        format!(
            "{}Borrowing lets code use a value without taking ownership.",
            PROMPT_PREFIX
        )
    );
}

#[tokio::test]
async fn test_azure_unauthorized_shows_api_message() {
    let server = MockServer::builder()
        .respond(
            "POST",
            "/openai/deployments/gpt35/chat/completions",
            401,
            json!({"error": {"code": "401", "message": "Access denied due to invalid subscription key."}}),
        )
        .start()
        .await;
    let o = orchestrator(
        &config_for(&server),
        browser_with_selection("Some text to summarize."),
        azure_settings(&server.url()),
    );

    let outcome = o.handle_summarize_command().await;

    assert_eq!(
        outcome,
        CommandOutcome::Completed {
            update: OverlayUpdate::Error {
                message: "Access denied due to invalid subscription key.".to_string()
            },
            delivered: true,
        }
    );
    assert_eq!(overlay_state(&o).await, OverlayState::ShowingError);
    assert!(overlay_html(&o)
        .await
        .contains("Access denied due to invalid subscription key."));

    let requests = server.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].target, "/openai/deployments/gpt35/chat/completions?api-version=2023-05-15");
    assert_eq!(requests[0].header("api-key"), Some("azure-key"));
    assert!(requests[0].json().get("model").is_none());
}

#[tokio::test]
async fn test_gemini_payload_truncated() {
    let server = MockServer::builder()
        .respond(
            "POST",
            "/v1/models/gemini-1.5-flash:generateContent",
            200,
            json!({"candidates": [{"content": {"parts": [{"text": "- point one\n- point two"}]}}]}),
        )
        .start()
        .await;
    let long_text = "é".repeat(4500);
    let o = orchestrator(
        &config_for(&server),
        browser_with_selection(&long_text),
        gemini_settings(),
    );

    o.handle_summarize_command().await;

    assert_eq!(overlay_state(&o).await, OverlayState::ShowingResult);
    let html = overlay_html(&o).await;
    assert!(html.contains("<ul><li>point one</li><li>point two</li></ul>"));
    assert!(html.contains("Summarized with Google Gemini"));

    let requests = server.requests().await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].target.ends_with("?key=g-key"));

    let body = requests[0].json();
    let expected = format!("{}{}...", PROMPT_PREFIX, "é".repeat(4000));
    assert_eq!(body["contents"][0]["parts"][0]["text"], expected);
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 200);
}

#[tokio::test]
async fn test_malformed_success_is_shape_error() {
    let server = MockServer::builder()
        .respond("POST", "/v1/chat/completions", 200, json!({"choices": []}))
        .start()
        .await;
    let o = orchestrator(&config_for(&server), browser_with_selection("text"), openai_settings());

    let outcome = o.handle_summarize_command().await;

    assert_eq!(
        outcome,
        CommandOutcome::Completed {
            update: OverlayUpdate::Error {
                message: "OpenAI API returned an unexpected response format".to_string()
            },
            delivered: true,
        }
    );
}

#[tokio::test]
async fn test_verify_credentials() {
    let server = MockServer::builder()
        .respond("GET", "/v1/models", 200, json!({"data": [], "models": []}))
        .respond(
            "GET",
            "/v1/models/gemini-1.5-flash",
            200,
            json!({"name": "models/gemini-1.5-flash", "supportedGenerationMethods": ["generateContent"]}),
        )
        .respond("POST", "/openai/deployments/gpt35/chat/completions", 429, json!({"error": {"message": "Rate limit: quota exceeded"}}))
        .start()
        .await;
    let registry = ProviderRegistry::new(&config_for(&server)).unwrap();

    let openai = ProviderCredentials::OpenAi {
        api_key: "sk-test".to_string(),
        model: "gpt-4o-mini".to_string(),
    };
    assert!(registry.verify_credentials(&openai).await);

    let gemini = ProviderCredentials::Gemini {
        api_key: "g-key".to_string(),
        model: "gemini-1.5-flash".to_string(),
    };
    assert!(registry.verify_credentials(&gemini).await);

    let unknown_model = ProviderCredentials::Gemini {
        api_key: "g-key".to_string(),
        model: "gemini-ultra".to_string(),
    };
    assert!(!registry.verify_credentials(&unknown_model).await);

    let azure = ProviderCredentials::Azure {
        api_key: "azure-key".to_string(),
        endpoint: server.url(),
        deployment: "gpt35".to_string(),
    };
    assert!(registry.verify_credentials(&azure).await);

    let azure_missing = ProviderCredentials::Azure {
        api_key: "azure-key".to_string(),
        endpoint: server.url(),
        deployment: "missing".to_string(),
    };
    assert!(!registry.verify_credentials(&azure_missing).await);

    let probe = server
        .requests()
        .await
        .into_iter()
        .find(|r| r.path() == "/openai/deployments/gpt35/chat/completions")
        .unwrap();
    let body = probe.json();
    assert_eq!(body["messages"][0]["content"], "Hello");
    assert_eq!(body["max_tokens"], 5);
}

#[tokio::test]
async fn test_list_available_models() {
    let server = MockServer::builder()
        .respond(
            "GET",
            "/v1/models",
            200,
            json!({"models": [
                {"name": "models/gemini-1.5-pro", "displayName": "Gemini 1.5 Pro", "supportedGenerationMethods": ["generateContent", "countTokens"]},
                {"name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"]},
                {"name": "models/gemini-x", "supportedGenerationMethods": ["generateContent"]}
            ]}),
        )
        .start()
        .await;
    let registry = ProviderRegistry::new(&config_for(&server)).unwrap();

    let models = registry.list_available_models("g-key").await.unwrap();
    let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["gemini-1.5-pro", "gemini-x"]);
    assert_eq!(models[0].display_name, "Gemini 1.5 Pro");
    assert_eq!(models[1].display_name, "gemini-x");

    let requests = server.requests().await;
    assert_eq!(requests[0].target, "/v1/models?key=g-key");
}

#[tokio::test]
async fn test_list_models_rejected_key() {
    let server = MockServer::builder()
        .respond("GET", "/v1/models", 400, json!({"error": {"message": "API key not valid"}}))
        .start()
        .await;
    let registry = ProviderRegistry::new(&config_for(&server)).unwrap();

    let err = registry.list_available_models("bad").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "Failed to fetch models. Please check your API key.");
}

async fn assert_transport_failure(
    config: &AppConfig,
    settings: ProviderConfig,
    provider: ProviderKind,
    secret: &str,
) {
    let o = orchestrator(config, browser_with_selection("Text that never reaches the API."), settings);

    let update = match o.handle_summarize_command().await {
        CommandOutcome::Completed { update, delivered: true } => update,
        other => panic!("unexpected outcome: {:?}", other),
    };
    let message = match update {
        OverlayUpdate::Error { message } => message,
        other => panic!("expected an error, got {:?}", other),
    };

    assert!(message.starts_with(provider.short_name()), "{}", message);
    assert!(!message.contains(secret), "{}", message);
    assert!(!message.contains("key="), "{}", message);
    assert_eq!(overlay_state(&o).await, OverlayState::ShowingError);
    assert!(!overlay_html(&o).await.contains(secret));
}

#[tokio::test]
async fn test_openai_connection_refused() {
    assert_transport_failure(&unreachable_config(), openai_settings(), ProviderKind::OpenAi, "sk-test").await;
}

#[tokio::test]
async fn test_azure_connection_refused() {
    assert_transport_failure(
        &unreachable_config(),
        azure_settings(&closed_port_url()),
        ProviderKind::Azure,
        "azure-key",
    )
    .await;
}

#[tokio::test]
async fn test_gemini_connection_refused_hides_key() {
    let settings = ProviderConfig {
        gemini_api_key: Some("SECRET-GEMINI-KEY".to_string()),
        ..gemini_settings()
    };
    assert_transport_failure(&unreachable_config(), settings, ProviderKind::Gemini, "SECRET-GEMINI-KEY").await;
}

#[tokio::test]
async fn test_model_listing_connection_refused_hides_key() {
    let registry = ProviderRegistry::new(&unreachable_config()).unwrap();

    let err = registry.list_available_models("SECRET-GEMINI-KEY").await.unwrap_err();

    assert_eq!(err.status(), None);
    assert!(err.to_string().starts_with("Gemini"));
    assert!(!err.to_string().contains("SECRET-GEMINI-KEY"));
}
