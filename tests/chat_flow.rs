//! End-to-end chat turns against a simulated backend and a scripted model.

use std::sync::Arc;
use std::time::Duration;

use callcenter_agent::agent::{Agent, RunOutcome};
use callcenter_agent::config::AgentSettings;
use callcenter_agent::llm::ScriptedLlm;
use callcenter_agent::session::{Role, SessionStore};
use callcenter_agent::tools::{default_registry, BackendClient};
use tokio_test::assert_ok;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn agent(backend: &MockServer, llm: ScriptedLlm) -> Agent {
    let settings = AgentSettings::default();
    let backend = BackendClient::new(format!("{}/api/v1", backend.uri()), Duration::from_secs(5))
        .expect("backend client");
    let tools = default_registry(backend, settings.tool_timeout).expect("registry");
    Agent::new(
        Arc::new(llm),
        Arc::new(tools),
        Arc::new(SessionStore::new(settings.memory_token_limit)),
        settings,
    )
}

#[tokio::test]
async fn greeting_needs_no_tool() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let llm = ScriptedLlm::replies([
        "Thought: Müşteri selam veriyor, araç gerekmez.\nFinal Answer: Merhaba! Size nasıl yardımcı olabilirim?",
    ]);
    let agent = agent(&backend, llm);

    let reply = assert_ok!(agent.chat("Merhaba", Some("call-1")).await);
    assert!(reply.success());
    assert!(reply.steps.is_empty());

    let turns = agent.sessions().snapshot("call-1").await.expect("session");
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[1].role, Role::Agent);
}

#[tokio::test]
async fn unknown_subscriber_package_lookup() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/phone/05551234567/package"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&backend)
        .await;

    let llm = ScriptedLlm::replies([
        "Thought: Numara verilmiş, paketi sorgulayayım.\n\
         Action: get_package_by_usernumber\n\
         Action Input: 0555 123 45 67",
        "Thought: Kayıt bulunamadı.\n\
         Final Answer: Bu numarada aktif bir paket göremiyorum. Numaranızı kontrol eder misiniz?",
    ]);
    let agent = agent(&backend, llm.clone());

    let reply = assert_ok!(
        agent
            .chat("05551234567 numaralı hattımın paketi nedir?", Some("call-2"))
            .await
    );

    assert_eq!(reply.outcome, RunOutcome::Finished);
    assert_eq!(reply.steps.len(), 1);
    assert_eq!(reply.steps[0].action, "get_package_by_usernumber");
    assert_eq!(
        reply.steps[0].observation,
        "Bu telefon numarasında (05551234567) aktif paket bulunamadı veya kullanıcı sistemde kayıtlı değil."
    );
    assert!(llm.prompts()[1].contains("aktif paket bulunamadı"));
}

#[tokio::test]
async fn invalid_phone_never_reaches_the_backend() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&backend)
        .await;

    let llm = ScriptedLlm::replies([
        "Action: get_active_invoice\nAction Input: 12345",
        "Final Answer: Lütfen numaranızı eksiksiz yazın.",
    ]);
    let agent = agent(&backend, llm);

    let reply = assert_ok!(agent.chat("Faturam? Numaram 12345", Some("call-3")).await);
    assert!(reply.success());
    assert!(reply.steps[0].observation.contains("telefon numarası"));
}

#[tokio::test]
async fn follow_up_uses_previous_turns() {
    let backend = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/invoices/phone/05551234567/activeinvoice"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"amount":249.9,"due":"2026-11-01"}"#),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let llm = ScriptedLlm::replies([
        "Final Answer: Numaranızı not aldım.",
        "Thought: Numara geçmişte var.\nAction: get_active_invoice\nAction Input: 05551234567",
        "Final Answer: Güncel faturanız 249,9 TL, son ödeme 1 Kasım.",
    ]);
    let agent = agent(&backend, llm.clone());

    assert_ok!(agent.chat("Numaram 05551234567", Some("call-4")).await);
    let reply = assert_ok!(agent.chat("Faturam ne kadar?", Some("call-4")).await);

    assert!(reply.success());
    assert!(llm.prompts()[1].contains("Müşteri: Numaram 05551234567"));
    assert_eq!(
        agent.sessions().snapshot("call-4").await.map(|t| t.len()),
        Some(4)
    );
}
