//! Scheduler timing tests on tokio's paused clock.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lens_core::{
    AnalysisError, AnalysisResult, Analyzer, Credential, ErrorKind, InputUnit, PersonaContext,
};
use lens_scan::{
    Capture, CaptureError, CaptureSource, ScanEvent, ScanHandle, ScanState, Scanner, StaticSource,
};
use pretty_assertions::assert_eq;
use tokio::time::{Instant, sleep};

#[derive(Debug, Clone, Copy)]
enum Step {
    Verdict,
    Quota,
    Network,
}

#[derive(Debug, Clone)]
struct Call {
    at: Instant,
    instruction: Option<String>,
}

struct ScriptedAnalyzer {
    script: Mutex<VecDeque<Step>>,
    delay: Duration,
    calls: Mutex<Vec<Call>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ScriptedAnalyzer {
    fn new(delay: Duration, script: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            delay,
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn call_offsets(&self, start: Instant) -> Vec<Duration> {
        self.calls().iter().map(|call| call.at - start).collect()
    }
}

fn verdict(summary: &str) -> AnalysisResult {
    let json = serde_json::json!({
        "summary": summary,
        "audioScript": "Listen.",
        "shareContent": "Share.",
        "healthScore": 50,
        "dietaryClassification": "veg",
        "uncertainty": { "isUncertain": false, "reason": "" },
        "tradeoffs": { "pros": [], "cons": [] },
        "insights": [],
        "radarData": [
            { "subject": "Sugar", "value": 1 },
            { "subject": "Protein", "value": 2 },
            { "subject": "Fiber", "value": 3 },
            { "subject": "Additives", "value": 4 },
            { "subject": "Processing", "value": 5 }
        ],
        "villains": []
    });
    AnalysisResult::from_json(&json.to_string()).unwrap()
}

#[async_trait]
impl Analyzer for ScriptedAnalyzer {
    async fn analyze(
        &self,
        _unit: &InputUnit,
        instruction: Option<&str>,
        credential: &Credential,
    ) -> Result<AnalysisResult, AnalysisError> {
        if credential.is_blank() {
            return Err(AnalysisError::MissingCredential);
        }
        self.calls.lock().unwrap().push(Call {
            at: Instant::now(),
            instruction: instruction.map(str::to_string),
        });
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::Verdict);
        match step {
            Step::Verdict => Ok(verdict(instruction.unwrap_or("none"))),
            Step::Quota => Err(AnalysisError::QuotaExceeded("quota".to_string())),
            Step::Network => Err(AnalysisError::Network("reset".to_string())),
        }
    }
}

/// Not ready for the first `not_ready` captures, then a fixed text unit.
struct WarmingSource {
    not_ready: usize,
}

impl CaptureSource for WarmingSource {
    fn capture(&mut self) -> Result<Capture, CaptureError> {
        if self.not_ready > 0 {
            self.not_ready -= 1;
            return Ok(Capture::NotReady);
        }
        Ok(Capture::Ready(InputUnit::text("oats")))
    }
}

struct BrokenSource;

impl CaptureSource for BrokenSource {
    fn capture(&mut self) -> Result<Capture, CaptureError> {
        Err(CaptureError::NotADirectory(PathBuf::from("/dev/camera")))
    }
}

fn context(persona: &str) -> PersonaContext {
    PersonaContext {
        persona_id: persona.to_string(),
        sub_option_id: "default".to_string(),
        instruction_fragment: format!("focus on {persona}"),
    }
}

fn start(analyzer: &Arc<ScriptedAnalyzer>, context: Option<PersonaContext>) -> ScanHandle {
    Scanner::new(
        analyzer.clone(),
        Box::new(StaticSource::new(InputUnit::text("sugar, salt"))),
        Credential::new("key"),
    )
    .with_context(context)
    .spawn()
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

async fn finish(mut handle: ScanHandle) -> (lens_scan::ScanSummary, Vec<ScanEvent>) {
    let mut events = handle.events().unwrap();
    handle.stop();
    let summary = handle.join().await.unwrap();
    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }
    (summary, collected)
}

fn published(events: &[ScanEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            ScanEvent::Published { result, .. } => Some(result.summary.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn successful_scans_respect_min_spacing() {
    let analyzer = ScriptedAnalyzer::new(Duration::ZERO, []);
    let t0 = Instant::now();
    let handle = start(&analyzer, None);

    sleep(ms(7_500)).await;
    let (summary, events) = finish(handle).await;

    assert_eq!(analyzer.call_offsets(t0), vec![ms(0), ms(3_000), ms(6_000)]);
    assert_eq!(summary.published, 3);
    assert_eq!(published(&events), vec!["none", "none", "none"]);
}

#[tokio::test(start_paused = true)]
async fn quota_exceeded_pauses_for_cooldown() {
    let analyzer = ScriptedAnalyzer::new(Duration::ZERO, [Step::Quota]);
    let t0 = Instant::now();
    let handle = start(&analyzer, None);

    sleep(ms(9_500)).await;
    assert_eq!(analyzer.calls().len(), 1);

    sleep(ms(1_000)).await;
    let (summary, events) = finish(handle).await;

    assert_eq!(analyzer.call_offsets(t0), vec![ms(0), ms(10_000)]);
    assert_eq!(summary.cooldowns, 1);
    assert!(events.iter().any(|event| matches!(
        event,
        ScanEvent::CooldownStarted { remaining } if *remaining == ms(10_000)
    )));
    assert!(events.iter().any(|event| matches!(
        event,
        ScanEvent::StateChanged { from: ScanState::Cooldown, to: ScanState::Idle }
    )));
}

#[tokio::test(start_paused = true)]
async fn network_failure_retries_on_next_tick() {
    let analyzer = ScriptedAnalyzer::new(Duration::ZERO, [Step::Network]);
    let t0 = Instant::now();
    let handle = start(&analyzer, None);

    sleep(ms(1_500)).await;
    let (summary, events) = finish(handle).await;

    assert_eq!(analyzer.call_offsets(t0), vec![ms(0), ms(1_000)]);
    assert_eq!(summary.failed, 1);
    assert!(events.iter().any(|event| matches!(
        event,
        ScanEvent::Failed { error, .. } if error.kind() == ErrorKind::NetworkFailure
    )));
}

#[tokio::test(start_paused = true)]
async fn missing_credential_fails_without_touching_limiter() {
    let analyzer = ScriptedAnalyzer::new(Duration::ZERO, []);
    let handle = Scanner::new(
        analyzer.clone(),
        Box::new(StaticSource::new(InputUnit::text("salt"))),
        Credential::new("  "),
    )
    .spawn();

    sleep(ms(2_500)).await;
    let (summary, events) = finish(handle).await;

    assert_eq!(summary.dispatched, 3);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.cooldowns, 0);
    assert!(events.iter().all(|event| match event {
        ScanEvent::Failed { error, .. } => error.kind().is_fatal_for_session(),
        _ => true,
    }));
}

#[tokio::test(start_paused = true)]
async fn at_most_one_invocation_in_flight() {
    let analyzer = ScriptedAnalyzer::new(ms(4_500), []);
    let handle = start(&analyzer, None);

    sleep(ms(20_000)).await;
    let _ = finish(handle).await;

    assert_eq!(analyzer.max_active.load(Ordering::SeqCst), 1);
    let calls = analyzer.calls();
    assert!(calls.len() >= 2);
    for pair in calls.windows(2) {
        assert!(pair[1].at - pair[0].at >= ms(4_500));
    }
}

#[tokio::test(start_paused = true)]
async fn stale_result_is_not_published() {
    let analyzer = ScriptedAnalyzer::new(ms(2_000), []);
    let handle = start(&analyzer, Some(context("a")));

    sleep(ms(500)).await;
    handle.set_context(Some(context("b")));
    sleep(ms(5_500)).await;
    let (summary, events) = finish(handle).await;

    assert_eq!(
        analyzer.calls()[0].instruction.as_deref(),
        Some("focus on a")
    );
    assert_eq!(summary.discarded, 1);
    let shown = published(&events);
    assert!(!shown.iter().any(|summary| summary == "focus on a"));
    assert_eq!(shown.first().map(String::as_str), Some("focus on b"));
    assert!(events.iter().any(|event| matches!(event, ScanEvent::Cleared)));
}

#[tokio::test(start_paused = true)]
async fn context_change_skips_spacing_once() {
    let analyzer = ScriptedAnalyzer::new(Duration::ZERO, []);
    let t0 = Instant::now();
    let handle = start(&analyzer, None);

    sleep(ms(1_200)).await;
    handle.set_context(Some(context("a")));
    sleep(ms(4_300)).await;
    let _ = finish(handle).await;

    assert_eq!(analyzer.call_offsets(t0), vec![ms(0), ms(2_000), ms(5_000)]);
}

#[tokio::test(start_paused = true)]
async fn context_change_never_skips_cooldown() {
    let analyzer = ScriptedAnalyzer::new(Duration::ZERO, [Step::Quota]);
    let t0 = Instant::now();
    let handle = start(&analyzer, None);

    sleep(ms(1_200)).await;
    handle.set_context(Some(context("a")));
    sleep(ms(9_300)).await;
    let _ = finish(handle).await;

    assert_eq!(analyzer.call_offsets(t0), vec![ms(0), ms(10_000)]);
    assert_eq!(analyzer.calls()[1].instruction.as_deref(), Some("focus on a"));
}

#[tokio::test(start_paused = true)]
async fn suspend_holds_attempts_until_resumed() {
    let analyzer = ScriptedAnalyzer::new(Duration::ZERO, []);
    let t0 = Instant::now();
    let handle = start(&analyzer, None);
    handle.suspend();

    sleep(ms(5_500)).await;
    assert!(analyzer.calls().is_empty());

    handle.resume();
    sleep(ms(1_000)).await;
    let (_, events) = finish(handle).await;

    assert_eq!(analyzer.call_offsets(t0), vec![ms(6_000)]);
    assert!(events.iter().any(|event| matches!(
        event,
        ScanEvent::StateChanged { to: ScanState::Suspended, .. }
    )));
}

#[tokio::test(start_paused = true)]
async fn not_ready_source_waits_without_side_effects() {
    let analyzer = ScriptedAnalyzer::new(Duration::ZERO, []);
    let t0 = Instant::now();
    let handle = Scanner::new(
        analyzer.clone(),
        Box::new(WarmingSource { not_ready: 3 }),
        Credential::new("key"),
    )
    .spawn();

    sleep(ms(3_500)).await;
    let (summary, events) = finish(handle).await;

    assert_eq!(analyzer.call_offsets(t0), vec![ms(3_000)]);
    assert_eq!(summary.dispatched, 1);

    let transitions = events
        .iter()
        .filter_map(|event| match event {
            ScanEvent::StateChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(
        transitions,
        vec![
            (ScanState::AwaitingSource, ScanState::Capturing),
            (ScanState::Capturing, ScanState::AwaitingResponse),
            (ScanState::AwaitingResponse, ScanState::Idle),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn broken_source_ends_scan() {
    let analyzer = ScriptedAnalyzer::new(Duration::ZERO, []);
    let mut handle = Scanner::new(analyzer.clone(), Box::new(BrokenSource), Credential::new("key"))
        .spawn();
    let mut events = handle.events().unwrap();

    let summary = handle.join().await.unwrap();

    assert_eq!(summary.final_state, Some(ScanState::Failed));
    assert!(summary.source_error.unwrap().contains("/dev/camera"));
    assert!(analyzer.calls().is_empty());
    let mut saw_failure = false;
    while let Ok(event) = events.try_recv() {
        saw_failure |= matches!(event, ScanEvent::SourceFailed { .. });
    }
    assert!(saw_failure);
}

#[tokio::test(start_paused = true)]
async fn stop_drops_in_flight_result() {
    let analyzer = ScriptedAnalyzer::new(ms(5_000), []);
    let handle = start(&analyzer, None);

    sleep(ms(1_000)).await;
    let (summary, events) = finish(handle).await;

    assert_eq!(summary.dispatched, 1);
    assert_eq!(summary.published, 0);
    assert_eq!(summary.final_state, Some(ScanState::AwaitingResponse));
    assert!(published(&events).is_empty());
}
