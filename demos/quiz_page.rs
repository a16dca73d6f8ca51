//! Full flow on an in-memory quiz page.
//!
//! Demonstrates:
//! - Activating the overlay on a page
//! - Detecting questions through the relay
//! - Rendering the results view
//! - Highlighting the correct option
//! - Building an external search link
//!
//! By default a canned detection service answers. With `--live` the HTTP
//! service at `MCQ_SERVICE_URL` (default `http://localhost:8000`) is used.
//!
//! Usage:
//!   cargo run --example quiz_page
//!   cargo run --example quiz_page -- --live
//!   cargo run --example quiz_page -- --debug

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use mcq_overlay::browser::{Browser, MemoryBrowser, WindowKind};
use mcq_overlay::page::{Document, El, HIGHLIGHT_CLASS, StaticDocument};
use mcq_overlay::panel::{DetectionOutcome, LogNotifier, View};
use mcq_overlay::protocol::{ProcessingMode, Question};
use mcq_overlay::service::DetectionService;
use mcq_overlay::{DetectionRequest, DetectionResult, Solver, SolverOptions};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Canned Service
// ============================================================================

struct CannedService;

#[async_trait]
impl DetectionService for CannedService {
    async fn detect(&self, request: &DetectionRequest) -> mcq_overlay::Result<DetectionResult> {
        tracing::info!(content_len = request.content.len(), "Canned detection");
        Ok(DetectionResult {
            questions: vec![Question {
                question: "What is 2+2?".into(),
                options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
                correct_option: 1,
                reasoning: Some("Adding two and two gives four.".into()),
                confidence: Some(95.0),
                model_responses: None,
            }],
            consensus: Vec::new(),
            processing_mode: ProcessingMode::Single,
            total_questions: Some(1),
            cached: false,
        })
    }

    async fn health(&self) -> mcq_overlay::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let live = args.iter().any(|a| a == "--live");
    let debug = args.iter().any(|a| a == "--debug");

    let filter = if debug { "mcq_overlay=debug" } else { "mcq_overlay=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    if let Err(e) = run(live).await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run(live: bool) -> anyhow::Result<()> {
    println!("=== Quiz Page ===\n");

    // ========================================================================
    // Page
    // ========================================================================

    println!("[1] Opening quiz page...");

    let browser = Arc::new(MemoryBrowser::new());
    let window = browser.open_window(WindowKind::Normal);
    let tab = browser.open_page(
        window,
        StaticDocument::new("https://example.com/quiz", "Arithmetic").with_body([
            El::new("h1").text("Arithmetic quiz"),
            El::new("p").text("1) What is 2+2?"),
            El::new("ul").children([
                El::new("li").text("A) 3"),
                El::new("li").id("answer-b").text("B) 4"),
                El::new("li").text("C) 5"),
                El::new("li").text("D) 6"),
            ]),
        ]),
    )?;

    println!("    ✓ Tab {tab}\n");

    // ========================================================================
    // Solver
    // ========================================================================

    println!("[2] Starting solver ({})...", if live { "live" } else { "canned" });

    let mut builder = Solver::builder()
        .browser(Arc::clone(&browser) as Arc<dyn Browser>)
        .options(SolverOptions::from_env().context("reading MCQ_* variables")?);
    if !live {
        builder = builder.service(Arc::new(CannedService));
    }
    let solver = builder.build()?;

    solver.health().await.context("detection service is not healthy")?;
    println!("    ✓ Service healthy\n");

    println!("[3] Activating...");
    let activation = solver.activate(tab).await?;
    println!("    ✓ {activation:?}\n");

    // ========================================================================
    // Detect
    // ========================================================================

    println!("[4] Detecting MCQs...");

    let panel = solver.open_panel(Arc::new(LogNotifier));
    match panel.request_detection(false).await? {
        DetectionOutcome::Completed { questions } => println!("    ✓ {questions} question(s)\n"),
        other => anyhow::bail!("detection did not complete: {other:?}"),
    }

    println!("{}", panel.render());

    // ========================================================================
    // Highlight
    // ========================================================================

    let state = panel.state();
    let View::Results(result) = state.view() else {
        anyhow::bail!("panel is not showing results");
    };

    for (index, question) in result.questions.iter().enumerate() {
        println!("[5] Highlighting question {}...", index + 1);
        let report = panel.request_highlight(index, question.correct_option).await?;
        println!("    ✓ {:?}: {} element(s)\n", report.tier, report.marked.len());
    }

    {
        let doc = browser.document(tab).context("quiz tab is gone")?;
        let doc = doc.lock();
        if let Some(node) = doc.element_by_id("answer-b") {
            println!("    answer-b highlighted: {}\n", doc.has_class(node, HIGHLIGHT_CLASS));
        }
    }

    // ========================================================================
    // Search
    // ========================================================================

    // New tabs become active, so searches come after every highlight.
    for question in &result.questions {
        println!("[6] Searching \"{}\"...", question.question);
        let search_tab = panel.request_external_search(question).await?;
        println!("    ✓ Opened in tab {search_tab}");
    }

    println!("\n=== Done ===");
    Ok(())
}
