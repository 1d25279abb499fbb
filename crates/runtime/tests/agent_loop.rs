#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use async_trait::async_trait;
use monk_core::{ChannelChunkStream, ChunkStream, ProviderError, Role, StreamEvent, VecChunkStream};
use monk_interpreter::DiagnosticKind;
use monk_memory::{FileSessionStore, SessionStore};
use monk_runtime::*;
use monk_tools::{AutoApprove, ConfirmationPolicy, RootLocks};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

enum Script {
    Chunks(Vec<String>),
    Stream(Box<dyn ChunkStream>),
    Fail(ProviderError),
}

/// Plays back canned responses and records every request it sees.
struct ScriptedProvider {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedProvider {
    fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn replies(responses: &[&str]) -> Arc<Self> {
        Self::new(
            responses
                .iter()
                .map(|r| Script::Chunks(chunked(r, 7)))
                .collect(),
        )
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn stream(&self, request: &ModelRequest) -> Result<Box<dyn ChunkStream>, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.scripts.lock().unwrap().pop_front();
        match next {
            Some(Script::Chunks(chunks)) => Ok(Box::new(VecChunkStream::new(chunks))),
            Some(Script::Stream(stream)) => Ok(stream),
            Some(Script::Fail(e)) => Err(e),
            None => Err(ProviderError::Rejected("script exhausted".to_string())),
        }
    }
}

#[derive(Default)]
struct RecordingDisplay {
    events: Mutex<Vec<String>>,
}

impl DisplaySink for RecordingDisplay {
    fn display(&self, event: DisplayEvent<'_>) {
        let line = match event {
            DisplayEvent::Text(text) => format!("text:{}", text),
            DisplayEvent::ToolCall(call) => format!("call:{}", call.name().unwrap_or("?")),
            DisplayEvent::ToolResult(result) => format!("result:{}", result.tool),
        };
        self.events.lock().unwrap().push(line);
    }
}

/// Split on char boundaries into pieces of at most `size` chars.
fn chunked(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

fn config(root: &Path) -> MonkConfig {
    let mut config = MonkConfig::new(root);
    config.system_prompt = Some("You are monk.".to_string());
    config.tools.confirmation = ConfirmationPolicy::AutoApprove;
    config
}

fn agent(config: &MonkConfig, provider: Arc<ScriptedProvider>) -> AgentLoop {
    AgentLoop::new(
        "test-session",
        config,
        provider,
        Arc::new(AutoApprove),
        Arc::new(NullDisplay),
        RootLocks::new(),
    )
    .unwrap()
}

const SHOW_A: &str = "Sure.\n{\"action\":\"show_file\",\"parameters\":{\"filepath\":\"a.py\"}}\nDone.";
const FINISH: &str = "{\"action\":\"finish\",\"parameters\":{\"summary\":\"done\"}}";

#[tokio::test]
async fn test_show_file_then_finish() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("a.py"), "print('hi')\n").unwrap();
    let provider = ScriptedProvider::replies(&[SHOW_A, FINISH]);
    let display = Arc::new(RecordingDisplay::default());
    let mut agent = AgentLoop::new(
        "test-session",
        &config(temp_dir.path()),
        provider.clone(),
        Arc::new(AutoApprove),
        display.clone(),
        RootLocks::new(),
    )
    .unwrap();

    let report = agent.run_turn("show me a.py", &CancellationToken::new()).await.unwrap();
    assert_eq!(report.outcome, TurnOutcome::Finished);
    assert_eq!(report.iterations, 2);
    assert_eq!(report.tool_calls, 2);
    assert_eq!(agent.state(), LoopState::Finished);

    let roles: Vec<Role> = agent.context().messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::Tool, Role::Assistant, Role::Tool]
    );
    assert_eq!(agent.context().messages()[2].content, SHOW_A);

    let observation: serde_json::Value =
        serde_json::from_str(&agent.context().messages()[3].content).unwrap();
    assert_eq!(observation["tool"], "show_file");
    assert_eq!(observation["status"], "success");
    assert!(observation["output"].as_str().unwrap().contains("print('hi')"));

    // The second request already carries the first observation.
    let requests = provider.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].messages.len(), 4);
    assert_eq!(requests[1].messages[3].role, Role::Tool);
    assert_eq!(requests[0].tool_schemas.len(), 10);
    drop(requests);

    let events = display.events.lock().unwrap();
    assert_eq!(events[0], "text:Sure.\n");
    assert!(events.contains(&"call:show_file".to_string()));
    assert!(events.contains(&"result:finish".to_string()));
    assert_eq!(agent.context().tool_log().len(), 2);
}

#[tokio::test]
async fn test_plain_reply_ends_turn() {
    let temp_dir = TempDir::new().unwrap();
    let provider = ScriptedProvider::replies(&["Hello there."]);
    let mut agent = agent(&config(temp_dir.path()), provider.clone());

    let report = agent.run_turn("hi", &CancellationToken::new()).await.unwrap();
    assert_eq!(report.outcome, TurnOutcome::Replied);
    assert_eq!(report.iterations, 1);
    assert_eq!(report.tool_calls, 0);
    assert_eq!(provider.request_count(), 1);

    let last = agent.context().messages().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.content, "Hello there.");
}

#[tokio::test]
async fn test_safety_block_aborts_and_skips_later_calls() {
    let temp_dir = TempDir::new().unwrap();
    let response = "{\"action\":\"execute_command\",\"parameters\":{\"command\":\"rm -rf /\"}}\n\
                    {\"action\":\"create_file\",\"parameters\":{\"filepath\":\"later.txt\",\"content\":\"x\"}}";
    let provider = ScriptedProvider::replies(&[response]);
    let mut agent = agent(&config(temp_dir.path()), provider);

    let report = agent.run_turn("clean up", &CancellationToken::new()).await.unwrap();
    assert_eq!(
        report.outcome,
        TurnOutcome::Aborted(AbortReason::SafetyBlocked {
            tool: "execute_command".to_string()
        })
    );
    assert_eq!(report.tool_calls, 1);
    assert_eq!(agent.state(), LoopState::Aborted);
    assert!(!temp_dir.path().join("later.txt").exists());

    let observation: serde_json::Value =
        serde_json::from_str(&agent.context().messages().last().unwrap().content).unwrap();
    assert_eq!(observation["status"], "denied");
    assert_eq!(observation["error_kind"], "safety_blocked");
}

#[tokio::test]
async fn test_finish_skips_later_calls_but_drains_response() {
    let temp_dir = TempDir::new().unwrap();
    let response = format!(
        "{}\n{{\"action\":\"create_file\",\"parameters\":{{\"filepath\":\"later.txt\",\"content\":\"x\"}}}}\nBye.",
        FINISH
    );
    let provider = ScriptedProvider::replies(&[response.as_str()]);
    let mut agent = agent(&config(temp_dir.path()), provider);

    let report = agent.run_turn("wrap up", &CancellationToken::new()).await.unwrap();
    assert_eq!(report.outcome, TurnOutcome::Finished);
    assert_eq!(report.tool_calls, 1);
    assert!(!temp_dir.path().join("later.txt").exists());

    let assistant = agent
        .context()
        .messages()
        .iter()
        .find(|m| m.role == Role::Assistant)
        .unwrap();
    assert!(assistant.content.ends_with("Bye."));
}

#[tokio::test]
async fn test_provider_error_aborts_without_observation() {
    let temp_dir = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![Script::Fail(ProviderError::Transport(
        "connection reset".to_string(),
    ))]);
    let mut agent = agent(&config(temp_dir.path()), provider);

    let report = agent.run_turn("hi", &CancellationToken::new()).await.unwrap();
    assert_eq!(
        report.outcome,
        TurnOutcome::Aborted(AbortReason::Provider(ProviderError::Transport(
            "connection reset".to_string()
        )))
    );
    let roles: Vec<Role> = agent.context().messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::User]);
}

#[tokio::test]
async fn test_iteration_cap() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("a.py"), "x = 1\n").unwrap();
    let mut cfg = config(temp_dir.path());
    cfg.agent.max_iterations = 2;
    let provider = ScriptedProvider::replies(&[SHOW_A, SHOW_A, SHOW_A]);
    let mut agent = agent(&cfg, provider.clone());

    let report = agent.run_turn("look", &CancellationToken::new()).await.unwrap();
    assert_eq!(report.outcome, TurnOutcome::IterationCapped);
    assert_eq!(report.iterations, 2);
    assert_eq!(provider.request_count(), 2);
    assert_eq!(agent.state(), LoopState::IterationCapped);
}

#[tokio::test]
async fn test_consecutive_failures_abort() {
    let temp_dir = TempDir::new().unwrap();
    let mut cfg = config(temp_dir.path());
    cfg.agent.max_consecutive_failures = 2;
    let missing = "{\"action\":\"show_file\",\"parameters\":{}}";
    let provider = ScriptedProvider::replies(&[missing, missing, FINISH]);
    let mut agent = agent(&cfg, provider);

    let report = agent.run_turn("look", &CancellationToken::new()).await.unwrap();
    assert_eq!(report.outcome, TurnOutcome::Aborted(AbortReason::TooManyFailures(2)));

    let observation: serde_json::Value =
        serde_json::from_str(&agent.context().messages().last().unwrap().content).unwrap();
    assert_eq!(observation["error_kind"], "validation_error");
    assert!(observation["output"].as_str().unwrap().contains("filepath"));
}

#[tokio::test]
async fn test_validation_error_lets_model_retry() {
    let temp_dir = TempDir::new().unwrap();
    let missing = "{\"action\":\"show_file\",\"parameters\":{}}";
    let provider = ScriptedProvider::replies(&[missing, FINISH]);
    let mut agent = agent(&config(temp_dir.path()), provider);

    let report = agent.run_turn("look", &CancellationToken::new()).await.unwrap();
    assert_eq!(report.outcome, TurnOutcome::Finished);
    assert_eq!(report.iterations, 2);
    assert_eq!(agent.context().tool_log().len(), 2);
}

#[tokio::test]
async fn test_unterminated_call_is_text_with_diagnostic() {
    let temp_dir = TempDir::new().unwrap();
    let provider = ScriptedProvider::replies(&["{\"action\":\"create_file\",\"paramet"]);
    let mut agent = agent(&config(temp_dir.path()), provider);

    let report = agent.run_turn("make it", &CancellationToken::new()).await.unwrap();
    assert_eq!(report.outcome, TurnOutcome::Replied);
    assert_eq!(report.tool_calls, 0);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, DiagnosticKind::Unterminated);
}

#[tokio::test]
async fn test_cancellation_discards_pending_observations() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("a.py"), "x = 1\n").unwrap();
    let (tx, stream) = ChannelChunkStream::channel(8);
    let provider = ScriptedProvider::new(vec![Script::Stream(Box::new(stream))]);
    let mut agent = agent(&config(temp_dir.path()), provider);
    let before = agent.context().messages().len();

    tx.send(Ok(StreamEvent::Chunk(SHOW_A.to_string()))).await.unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let canceller = async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    };
    let (report, _) = tokio::join!(agent.run_turn("show a.py", &cancel), canceller);

    assert_eq!(report.unwrap().outcome, TurnOutcome::Cancelled);
    // Only the user message was added; no assistant text or tool observation.
    assert_eq!(agent.context().messages().len(), before + 1);
    assert_eq!(agent.context().messages().last().unwrap().role, Role::User);
    assert!(agent.context().tool_log().is_empty());
    drop(tx);
}

#[tokio::test]
async fn test_overflow_force_drops_oldest() {
    let temp_dir = TempDir::new().unwrap();
    let mut cfg = config(temp_dir.path());
    // 100-char prompt is 29 tokens; the 80-char input adds 24 more.
    cfg.system_prompt = Some("p".repeat(100));
    cfg.model.context_window = 40;
    cfg.context.prune_threshold = 1.0;
    cfg.context.keep_recent_exchanges = 1;
    let provider = ScriptedProvider::replies(&["ok"]);
    let mut agent = agent(&cfg, provider);

    let report = agent.run_turn(&"u".repeat(80), &CancellationToken::new()).await.unwrap();
    assert_eq!(report.overflows, 1);
    assert_eq!(report.outcome, TurnOutcome::Replied);

    let roles: Vec<Role> = agent.context().messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::Assistant]);
    assert!(agent.context().token_count() <= 40);
}

#[tokio::test]
async fn test_session_persists_across_loops() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(temp_dir.path().join(".sessions"));
    store.initialize().await.unwrap();

    let cfg = config(temp_dir.path());
    let mut first = agent(&cfg, ScriptedProvider::replies(&["Noted."]));
    first.run_turn("remember this", &CancellationToken::new()).await.unwrap();
    store.save("test-session", &first.snapshot()).await.unwrap();

    let mut second = agent(&cfg, ScriptedProvider::replies(&["Still here."]));
    let saved = store.load("test-session").await.unwrap().unwrap();
    second.restore(saved).unwrap();
    assert_eq!(second.snapshot(), first.snapshot());

    second.run_turn("and now?", &CancellationToken::new()).await.unwrap();
    let contents: Vec<&str> = second
        .context()
        .messages()
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(
        contents,
        vec!["You are monk.", "remember this", "Noted.", "and now?", "Still here."]
    );
}

#[test]
fn test_invalid_sandbox_root_rejected() {
    let cfg = config(Path::new("/nonexistent/monk-sandbox"));
    let result = AgentLoop::new(
        "s",
        &cfg,
        ScriptedProvider::replies(&[]),
        Arc::new(AutoApprove),
        Arc::new(NullDisplay),
        RootLocks::new(),
    );
    assert!(matches!(result, Err(RuntimeError::Tool(_))));
}
