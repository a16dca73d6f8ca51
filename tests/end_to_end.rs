//! End-to-end tests: panel → relay → page agent and detection service.
//!
//! The detection service is a wiremock server; the browser is a
//! `MemoryBrowser` holding static pages.

use std::sync::Arc;
use std::time::Duration;

use mcq_overlay::browser::{Browser, Capability, MemoryBrowser, WindowKind};
use mcq_overlay::page::{Document, El, HIGHLIGHT_CLASS, OVERLAY_ID, PROBE_ID, StaticDocument};
use mcq_overlay::panel::{DetectionOutcome, MemoryNotifier, Notifier, Panel, View};
use mcq_overlay::protocol::{HighlightTier, OverlayState};
use mcq_overlay::relay::{Activation, SkipReason};
use mcq_overlay::{Solver, SolverOptions, TabId};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Fixtures
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn quiz_page() -> StaticDocument {
    StaticDocument::new("https://example.com/quiz", "Arithmetic").with_body([
        El::new("p").text("1) What is 2+2?"),
        El::new("ul").children([
            El::new("li").id("a").text("A) 3"),
            El::new("li").id("b").text("B) 4"),
            El::new("li").id("c").text("C) 5"),
            El::new("li").id("d").text("D) 6"),
        ]),
    ])
}

fn single_fixture() -> serde_json::Value {
    json!({
        "questions": [{
            "question": "What is 2+2?",
            "options": ["3", "4", "5", "6"],
            "correct_option": 1,
            "reasoning": "2+2 equals 4",
            "confidence": 95
        }],
        "processing_mode": "single"
    })
}

struct Harness {
    server: MockServer,
    browser: Arc<MemoryBrowser>,
    solver: Solver,
    notifier: Arc<MemoryNotifier>,
    tab: TabId,
}

impl Harness {
    async fn new(page: StaticDocument) -> Self {
        init_tracing();

        let server = MockServer::start().await;
        let browser = Arc::new(MemoryBrowser::new());
        let window = browser.open_window(WindowKind::Normal);
        let tab = browser.open_page(window, page).expect("open page");

        let solver = Solver::builder()
            .browser(Arc::clone(&browser) as Arc<dyn Browser>)
            .options(
                SolverOptions::new()
                    .with_service_url(server.uri())
                    .with_http_timeout(Duration::from_secs(5)),
            )
            .build()
            .expect("build solver");

        Self {
            server,
            browser,
            solver,
            notifier: Arc::new(MemoryNotifier::new()),
            tab,
        }
    }

    fn panel(&self) -> Panel {
        self.solver
            .open_panel(Arc::clone(&self.notifier) as Arc<dyn Notifier>)
    }

    fn marked_ids(&self, tab: TabId) -> Vec<String> {
        let doc = self.browser.document(tab).expect("document");
        let doc = doc.lock();
        doc.elements()
            .into_iter()
            .filter(|node| doc.has_class(*node, HIGHLIGHT_CLASS))
            .map(|node| doc.attribute(node, "id").unwrap_or_default().to_string())
            .collect()
    }
}

// ============================================================================
// Detection
// ============================================================================

#[tokio::test]
async fn test_single_model_round_trip() {
    let h = Harness::new(quiz_page()).await;
    Mock::given(method("POST"))
        .and(path("/detect"))
        .and(body_partial_json(json!({
            "url": "https://example.com/quiz",
            "layout": { "title": "Arithmetic" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_fixture()))
        .expect(1)
        .mount(&h.server)
        .await;

    assert_eq!(
        assert_ok!(h.solver.activate(h.tab).await),
        Activation::Overlay(OverlayState::Attached)
    );

    let panel = h.panel();
    let outcome = assert_ok!(panel.request_detection(false).await);
    assert_eq!(outcome, DetectionOutcome::Completed { questions: 1 });

    let page = panel.render();
    assert!(page.contains("Quiz Results"), "{page}");
    assert!(page.contains("B. 4 \u{2713}"), "{page}");
    assert!(page.contains("Confidence: 95%"), "{page}");

    let report = assert_ok!(panel.request_highlight(0, 1).await);
    assert_eq!(report.tier, Some(HighlightTier::Textual));
    assert_eq!(h.marked_ids(h.tab), vec!["b".to_string()]);

    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_detection_content_excludes_overlay() {
    let h = Harness::new(quiz_page()).await;
    Mock::given(method("POST"))
        .and(path("/detect"))
        .and(body_partial_json(json!({
            "content": "1) What is 2+2?\nA) 3\nB) 4\nC) 5\nD) 6"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(single_fixture()))
        .expect(1)
        .mount(&h.server)
        .await;

    assert_ok!(h.solver.activate(h.tab).await);
    let panel = h.panel();
    assert_ok!(panel.request_detection(false).await);
}

#[tokio::test]
async fn test_multi_model_uses_multi_endpoint() {
    let h = Harness::new(quiz_page()).await;
    Mock::given(method("POST"))
        .and(path("/detect-multi-model"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "questions": [{
                "question": "What is 2+2?",
                "options": ["3", "4", "5", "6"],
                "correct_option": 1,
                "model_responses": [
                    {"model": "gpt-4.1", "selected_option": 1, "confidence": 97, "reasoning": "sum"},
                    {"model": "claude-sonnet", "selected_option": 1, "confidence": 93, "reasoning": "sum"}
                ]
            }],
            "consensus": [true],
            "processing_mode": "multi",
            "total_questions": 1,
            "cached": true
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let panel = h.panel();
    assert_ok!(panel.request_detection(true).await);

    let state = panel.state();
    assert!(state.multi_model());
    let View::Results(result) = state.view() else {
        panic!("expected results view");
    };
    assert!(result.cached);

    let page = panel.render();
    assert!(page.contains("[Multi Model]"), "{page}");
    assert!(page.contains("[Consensus]"), "{page}");
    assert!(page.contains("gpt-4.1  Answer: B  Confidence: 97%"), "{page}");
}

#[tokio::test]
async fn test_second_detection_while_pending_sends_nothing() {
    let h = Harness::new(quiz_page()).await;
    Mock::given(method("POST"))
        .and(path("/detect"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(single_fixture())
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let panel = h.panel();
    let (first, second) = tokio::join!(
        panel.request_detection(false),
        panel.request_detection(false)
    );

    assert_eq!(
        assert_ok!(first),
        DetectionOutcome::Completed { questions: 1 }
    );
    assert_eq!(assert_ok!(second), DetectionOutcome::Skipped);

    let received = h.server.received_requests().await.expect("recording");
    assert_eq!(received.len(), 1);
}

#[tokio::test]
async fn test_service_error_notifies_user() {
    let h = Harness::new(quiz_page()).await;
    Mock::given(method("POST"))
        .and(path("/detect"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "model backend down"})),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let panel = h.panel();
    let err = assert_err!(panel.request_detection(false).await);

    assert!(err.is_network_error());
    assert!(panel.state().view().is_main());
    let messages = h.notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("model backend down"), "{messages:?}");
}

#[tokio::test]
async fn test_closing_panel_discards_pending_result() {
    let h = Harness::new(quiz_page()).await;
    Mock::given(method("POST"))
        .and(path("/detect"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(single_fixture())
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&h.server)
        .await;

    assert_ok!(h.solver.activate(h.tab).await);
    let panel = h.panel();

    let (detected, closed) = tokio::join!(panel.request_detection(false), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        panel.close().await
    });

    assert_eq!(assert_ok!(closed), OverlayState::Removed);
    assert_eq!(assert_ok!(detected), DetectionOutcome::Discarded);
    assert!(panel.state().view().is_main());

    let doc = h.browser.document(h.tab).expect("document");
    assert!(doc.lock().element_by_id(OVERLAY_ID).is_none());
}

#[tokio::test]
async fn test_closing_panel_discards_pending_failure() {
    let h = Harness::new(quiz_page()).await;
    Mock::given(method("POST"))
        .and(path("/detect"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("Internal Server Error")
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&h.server)
        .await;

    assert_ok!(h.solver.activate(h.tab).await);
    let panel = h.panel();

    let (detected, closed) = tokio::join!(panel.request_detection(false), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        panel.close().await
    });

    assert_eq!(assert_ok!(closed), OverlayState::Removed);
    assert_eq!(assert_ok!(detected), DetectionOutcome::Discarded);
    assert!(h.notifier.messages().is_empty());
}

#[tokio::test]
async fn test_reload_while_pending_sends_nothing() {
    let h = Harness::new(quiz_page()).await;
    Mock::given(method("POST"))
        .and(path("/detect"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(single_fixture())
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&h.server)
        .await;

    let panel = h.panel();
    let (first, second) = tokio::join!(panel.request_detection(false), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        panel.reload();
        panel.request_detection(false).await
    });

    assert_eq!(
        assert_ok!(first),
        DetectionOutcome::Completed { questions: 1 }
    );
    assert_eq!(assert_ok!(second), DetectionOutcome::Skipped);

    let received = h.server.received_requests().await.expect("recording");
    assert_eq!(received.len(), 1);
}

// ============================================================================
// Highlight
// ============================================================================

#[tokio::test]
async fn test_structural_highlight_on_radio_groups() {
    let options = |question: &str, answers: [&str; 4]| {
        El::new("fieldset").children(answers.map(|answer| {
            El::new("label")
                .id(format!("{question}-{answer}"))
                .child(El::radio(question, answer))
                .text(answer)
        }))
    };
    let page = StaticDocument::new("https://example.com/radios", "Radios").with_body([
        options("q1", ["paris", "rome", "berlin", "madrid"]),
        options("q2", ["two", "three", "four", "five"]),
    ]);
    let h = Harness::new(page).await;
    let panel = h.panel();

    let report = assert_ok!(panel.request_highlight(1, 2).await);
    assert_eq!(report.tier, Some(HighlightTier::Structural));
    assert_eq!(h.marked_ids(h.tab), vec!["q2-four".to_string()]);

    let report = assert_ok!(panel.request_highlight(0, 0).await);
    assert_eq!(report.marked.len(), 1);
    assert_eq!(h.marked_ids(h.tab), vec!["q1-paris".to_string()]);
}

#[tokio::test]
async fn test_highlight_follows_active_tab() {
    let h = Harness::new(quiz_page()).await;
    let window = h.browser.open_window(WindowKind::Normal);
    let second = h.browser.open_page(window, quiz_page()).expect("open");
    let panel = h.panel();

    assert_ok!(panel.request_highlight(0, 2).await);
    assert_eq!(h.marked_ids(second), vec!["c".to_string()]);
    assert!(h.marked_ids(h.tab).is_empty());
}

#[tokio::test]
async fn test_highlight_without_target_is_reported() {
    let h = Harness::new(quiz_page()).await;
    h.browser.close_tab(h.tab);
    let panel = h.panel();

    assert_err!(panel.request_highlight(0, 1).await);
    assert_eq!(h.notifier.messages().len(), 1);
}

// ============================================================================
// Activation
// ============================================================================

#[tokio::test]
async fn test_extension_page_is_never_injected() {
    let h = Harness::new(StaticDocument::new(
        "chrome-extension://abcdefghijklmnop/popup.html",
        "Popup",
    ))
    .await;

    let outcome = assert_ok!(h.solver.activate(h.tab).await);

    assert_eq!(
        outcome,
        Activation::Skipped(SkipReason::PrivilegedScheme("chrome-extension".into()))
    );
    let doc = h.browser.document(h.tab).expect("document");
    let doc = doc.lock();
    assert!(doc.element_by_id(OVERLAY_ID).is_none());
    assert!(doc.element_by_id(PROBE_ID).is_none());
}

#[tokio::test]
async fn test_refused_overlay_falls_back_to_probe() {
    let h = Harness::new(quiz_page()).await;
    h.browser.block_injection(h.tab, Capability::Overlay);

    let outcome = assert_ok!(h.solver.activate(h.tab).await);
    assert!(matches!(outcome, Activation::Fallback { .. }));

    let doc = h.browser.document(h.tab).expect("document");
    assert!(doc.lock().element_by_id(PROBE_ID).is_some());
}
