//! End-to-end engine behavior against a scripted model backend.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

use stackwright::config::{Credentials, SessionConfig};
use stackwright::engine::{
    run_automode, AutomodeOutcome, ConfirmationGate, GateDecision, TurnEngine,
    COMPLETION_SENTINEL, EMPTY_RESPONSE_FALLBACK,
};
use stackwright::error::{EngineError, Result};
use stackwright::provider::{ConverseRequest, ModelBackend, ModelReply, StopReason};
use stackwright::tools::ToolRegistry;
use stackwright::transcript::Transcript;
use stackwright::types::{ContentBlock, Role, ToolUseBlock};

/// Pops scripted replies in order; once exhausted, answers with plain text.
struct ScriptedBackend {
    replies: Mutex<Vec<ModelReply>>,
    requests: Mutex<Vec<ConverseRequest>>,
}

impl ScriptedBackend {
    fn new(mut replies: Vec<ModelReply>) -> Arc<Self> {
        replies.reverse();
        Arc::new(Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_request(&self) -> ConverseRequest {
        self.requests.lock().unwrap().last().unwrap().clone()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn converse(&self, request: &ConverseRequest) -> Result<ModelReply> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.replies.lock().unwrap().pop().unwrap_or_else(|| {
            text_reply("nothing left to do")
        }))
    }
}

/// Never resolves. Used to make cancellation deterministic.
struct PendingBackend;

#[async_trait]
impl ModelBackend for PendingBackend {
    async fn converse(&self, _request: &ConverseRequest) -> Result<ModelReply> {
        std::future::pending().await
    }
}

struct ScriptedGate {
    decision: GateDecision,
    calls: AtomicU32,
}

impl ScriptedGate {
    fn new(decision: GateDecision) -> Arc<Self> {
        Arc::new(Self {
            decision,
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl ConfirmationGate for ScriptedGate {
    async fn confirm(&self, _tool_name: &str, _input: &serde_json::Value) -> Result<GateDecision> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.decision)
    }
}

fn text_reply(text: &str) -> ModelReply {
    ModelReply {
        content: vec![ContentBlock::Text { text: text.into() }],
        stop_reason: Some(StopReason::EndTurn),
    }
}

fn tool_reply(id: &str, name: &str, input: serde_json::Value) -> ModelReply {
    ModelReply {
        content: vec![ContentBlock::ToolUse(ToolUseBlock {
            id: id.into(),
            name: name.into(),
            input,
        })],
        stop_reason: Some(StopReason::ToolUse),
    }
}

fn engine(
    backend: Arc<dyn ModelBackend>,
    gate: Arc<dyn ConfirmationGate>,
    config: SessionConfig,
) -> TurnEngine {
    let registry = Arc::new(ToolRegistry::new(Credentials::default()));
    TurnEngine::new(backend, registry, gate, config, CancellationToken::new())
}

/// Every tool-use turn must be immediately followed by a result turn
/// answering the same id.
fn assert_uses_paired(transcript: &Transcript) {
    let turns = transcript.turns();
    for (i, turn) in turns.iter().enumerate() {
        for tu in turn.tool_uses() {
            let next = turns.get(i + 1).expect("tool use must not be last");
            match &next.content[0] {
                ContentBlock::ToolResult(tr) => assert_eq!(tr.tool_use_id, tu.id),
                other => panic!("expected tool result after tool use, got {other:?}"),
            }
        }
    }
}

#[tokio::test]
async fn plain_text_turn_appends_user_and_assistant() {
    let backend = ScriptedBackend::new(vec![text_reply("hello there")]);
    let engine = engine(
        backend.clone(),
        ScriptedGate::new(GateDecision::Approve),
        SessionConfig::default(),
    );
    let mut transcript = Transcript::new();

    let response = engine.run_turn(&mut transcript, "hi").await.unwrap();

    assert_eq!(response, "hello there");
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.turns()[0].role, Role::User);
    assert_eq!(transcript.turns()[1].role, Role::Assistant);
    assert_eq!(backend.request_count(), 1);
}

#[tokio::test]
async fn list_files_chain_pairs_use_and_result() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "").unwrap();
    std::fs::write(dir.path().join("b.txt"), "").unwrap();

    let backend = ScriptedBackend::new(vec![
        ModelReply {
            content: vec![
                ContentBlock::Text {
                    text: "Let me check.".into(),
                },
                ContentBlock::ToolUse(ToolUseBlock {
                    id: "toolu_1".into(),
                    name: "listFiles".into(),
                    input: serde_json::json!({"path": dir.path().to_str().unwrap()}),
                }),
            ],
            stop_reason: Some(StopReason::ToolUse),
        },
        text_reply("The directory holds a.txt and b.txt."),
    ]);
    let engine = engine(
        backend.clone(),
        ScriptedGate::new(GateDecision::Approve),
        SessionConfig::default(),
    );
    let mut transcript = Transcript::new();

    let response = engine.run_turn(&mut transcript, "what files are there?").await.unwrap();

    assert_eq!(response, "Let me check.\nThe directory holds a.txt and b.txt.");
    // user, tool use, tool result, final assistant
    assert_eq!(transcript.len(), 4);
    assert_uses_paired(&transcript);

    match &transcript.turns()[2].content[0] {
        ContentBlock::ToolResult(tr) => {
            assert_eq!(tr.tool_use_id, "toolu_1");
            assert_eq!(tr.content[0], "a.txt\nb.txt");
        }
        other => panic!("expected tool result, got {other:?}"),
    }

    // The second model call saw the tool result it was owed.
    assert_eq!(backend.request_count(), 2);
    let turns = backend.last_request().turns;
    assert!(matches!(
        turns.last().unwrap().content[0],
        ContentBlock::ToolResult(_)
    ));
}

#[tokio::test]
async fn empty_reply_finalizes_with_fallback_text() {
    let backend = ScriptedBackend::new(vec![ModelReply {
        content: vec![],
        stop_reason: Some(StopReason::EndTurn),
    }]);
    let engine = engine(
        backend,
        ScriptedGate::new(GateDecision::Approve),
        SessionConfig::default(),
    );
    let mut transcript = Transcript::new();

    let response = engine.run_turn(&mut transcript, "hi").await.unwrap();

    assert_eq!(response, EMPTY_RESPONSE_FALLBACK);
    assert_eq!(transcript.last().unwrap().text(), EMPTY_RESPONSE_FALLBACK);
}

#[tokio::test]
async fn unknown_tool_name_is_fatal_and_leaves_no_dangling_use() {
    let backend = ScriptedBackend::new(vec![tool_reply(
        "toolu_9",
        "doesNotExist",
        serde_json::json!({}),
    )]);
    let engine = engine(
        backend,
        ScriptedGate::new(GateDecision::Approve),
        SessionConfig::default(),
    );
    let mut transcript = Transcript::new();

    let err = engine.run_turn(&mut transcript, "go").await.unwrap_err();

    assert!(matches!(err, EngineError::UnknownTool(name) if name == "doesNotExist"));
    // Only the user turn was retained; no unanswered tool use remains.
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript.turns()[0].role, Role::User);
}

#[tokio::test]
async fn credential_gated_tool_is_unknown_when_key_absent() {
    let backend = ScriptedBackend::new(vec![tool_reply(
        "toolu_5",
        "webSearch",
        serde_json::json!({"query": "weather"}),
    )]);
    let engine = engine(
        backend.clone(),
        ScriptedGate::new(GateDecision::Approve),
        SessionConfig::default(),
    );
    let mut transcript = Transcript::new();

    let err = engine.run_turn(&mut transcript, "search").await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownTool(name) if name == "webSearch"));

    // The tool was never offered in the first place.
    let offered: Vec<String> = backend
        .last_request()
        .tools
        .iter()
        .map(|t| t.name.clone())
        .collect();
    assert!(!offered.contains(&"webSearch".to_string()));
    assert!(offered.contains(&"listFiles".to_string()));
}

#[tokio::test]
async fn shell_command_runs_after_gate_approval() {
    let backend = ScriptedBackend::new(vec![
        tool_reply(
            "toolu_2",
            "executeShellCommand",
            serde_json::json!({"cmd": "echo gated"}),
        ),
        text_reply("It printed gated."),
    ]);
    let gate = ScriptedGate::new(GateDecision::Approve);
    let engine = engine(backend, gate.clone(), SessionConfig::default());
    let mut transcript = Transcript::new();

    engine.run_turn(&mut transcript, "run echo").await.unwrap();

    assert_eq!(gate.calls.load(Ordering::SeqCst), 1);
    assert_uses_paired(&transcript);
    match &transcript.turns()[2].content[0] {
        ContentBlock::ToolResult(tr) => assert!(tr.content[0].contains("gated")),
        other => panic!("expected tool result, got {other:?}"),
    }
}

#[tokio::test]
async fn shell_command_veto_skips_execution_entirely() {
    let backend = ScriptedBackend::new(vec![ModelReply {
        content: vec![
            ContentBlock::Text {
                text: "Running it now.".into(),
            },
            ContentBlock::ToolUse(ToolUseBlock {
                id: "toolu_3".into(),
                name: "executeShellCommand".into(),
                input: serde_json::json!({"cmd": "echo nope"}),
            }),
        ],
        stop_reason: Some(StopReason::ToolUse),
    }]);
    let gate = ScriptedGate::new(GateDecision::Veto);
    let engine = engine(backend.clone(), gate.clone(), SessionConfig::default());
    let mut transcript = Transcript::new();

    let response = engine.run_turn(&mut transcript, "run echo").await.unwrap();

    assert_eq!(gate.calls.load(Ordering::SeqCst), 1);
    // No further model call after the veto, and neither the use nor a result
    // was appended.
    assert_eq!(backend.request_count(), 1);
    assert_eq!(transcript.len(), 2);
    assert!(transcript.turns()[1].tool_uses().is_empty());
    assert_eq!(response, "Running it now.");
}

#[tokio::test]
async fn read_only_tools_bypass_the_gate() {
    let backend = ScriptedBackend::new(vec![
        tool_reply("toolu_4", "listFiles", serde_json::json!({"path": "."})),
        text_reply("done"),
    ]);
    let gate = ScriptedGate::new(GateDecision::Veto);
    let engine = engine(backend, gate.clone(), SessionConfig::default());
    let mut transcript = Transcript::new();

    engine.run_turn(&mut transcript, "list").await.unwrap();

    // A vetoing gate was never consulted for a non-gated tool.
    assert_eq!(gate.calls.load(Ordering::SeqCst), 0);
    assert_uses_paired(&transcript);
}

#[tokio::test]
async fn suppressed_confirmation_skips_the_gate_for_shell() {
    let backend = ScriptedBackend::new(vec![
        tool_reply(
            "toolu_6",
            "executeShellCommand",
            serde_json::json!({"cmd": "echo unsupervised"}),
        ),
        text_reply("done"),
    ]);
    let gate = ScriptedGate::new(GateDecision::Veto);
    let config = SessionConfig {
        require_confirmation: false,
        ..SessionConfig::default()
    };
    let engine = engine(backend, gate.clone(), config);
    let mut transcript = Transcript::new();

    engine.run_turn(&mut transcript, "run it").await.unwrap();

    assert_eq!(gate.calls.load(Ordering::SeqCst), 0);
    assert_uses_paired(&transcript);
}

#[tokio::test]
async fn tool_depth_cap_bounds_model_calls_per_turn() {
    // Every reply asks for another tool; the engine must stop at the cap.
    let replies: Vec<ModelReply> = (0..20)
        .map(|i| tool_reply(&format!("toolu_{i}"), "listFiles", serde_json::json!({"path": "."})))
        .collect();
    let backend = ScriptedBackend::new(replies);
    let config = SessionConfig {
        max_tool_depth: 3,
        ..SessionConfig::default()
    };
    let engine = engine(backend.clone(), ScriptedGate::new(GateDecision::Approve), config);
    let mut transcript = Transcript::new();

    let response = engine.run_turn(&mut transcript, "loop").await.unwrap();

    assert_eq!(backend.request_count(), 3);
    assert_eq!(response, EMPTY_RESPONSE_FALLBACK);
    assert_uses_paired(&transcript);
}

#[tokio::test]
async fn interactive_request_carries_fixed_inference_knobs() {
    let backend = ScriptedBackend::new(vec![text_reply("ok")]);
    let engine = engine(
        backend.clone(),
        ScriptedGate::new(GateDecision::Approve),
        SessionConfig::default(),
    );
    let mut transcript = Transcript::new();
    engine.run_turn(&mut transcript, "hi").await.unwrap();

    let request = backend.last_request();
    assert_eq!(request.temperature, 0.5);
    assert_eq!(request.max_tokens, 4000);
    assert_eq!(request.top_p, 0.9);
    assert!(request.system.contains("You are not in automode"));
}

#[tokio::test]
async fn cancellation_aborts_the_turn() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let registry = Arc::new(ToolRegistry::new(Credentials::default()));
    let engine = TurnEngine::new(
        Arc::new(PendingBackend),
        registry,
        ScriptedGate::new(GateDecision::Approve),
        SessionConfig::default(),
        cancel,
    );
    let mut transcript = Transcript::new();

    let err = engine.run_turn(&mut transcript, "hi").await.unwrap_err();
    assert!(matches!(err, EngineError::Canceled));
}

#[tokio::test]
async fn automode_stops_on_completion_sentinel() {
    let backend = ScriptedBackend::new(vec![
        text_reply("Working on step one."),
        text_reply(&format!("All goals achieved. {COMPLETION_SENTINEL}")),
    ]);
    let config = SessionConfig {
        automode: true,
        ..SessionConfig::default()
    };
    let mut engine = engine(backend.clone(), ScriptedGate::new(GateDecision::Approve), config);
    let mut transcript = Transcript::new();

    let mut seen = Vec::new();
    let outcome = run_automode(&mut engine, &mut transcript, "build a site", |i, text| {
        seen.push((i, text.to_string()));
    })
    .await
    .unwrap();

    assert_eq!(outcome, AutomodeOutcome::Completed { iterations: 2 });
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0, 1);
    // Iteration one carried the goal; iteration two the synthetic continue.
    assert_eq!(transcript.turns()[0].text(), "build a site");
    assert_eq!(backend.request_count(), 2);
}

#[tokio::test]
async fn automode_budget_exhaustion_is_a_distinct_outcome() {
    // No scripted replies: the fallback text never contains the sentinel.
    let backend = ScriptedBackend::new(vec![]);
    let config = SessionConfig {
        automode: true,
        max_iterations: 3,
        ..SessionConfig::default()
    };
    let mut engine = engine(backend.clone(), ScriptedGate::new(GateDecision::Approve), config);
    let mut transcript = Transcript::new();

    let outcome = run_automode(&mut engine, &mut transcript, "never finishes", |_, _| {})
        .await
        .unwrap();

    assert_eq!(outcome, AutomodeOutcome::BudgetExceeded { iterations: 3 });
    assert_eq!(backend.request_count(), 3);
}

#[tokio::test]
async fn automode_surfaces_remaining_budget_to_the_model() {
    let backend = ScriptedBackend::new(vec![]);
    let config = SessionConfig {
        automode: true,
        max_iterations: 2,
        ..SessionConfig::default()
    };
    let mut engine = engine(backend.clone(), ScriptedGate::new(GateDecision::Approve), config);
    let mut transcript = Transcript::new();

    run_automode(&mut engine, &mut transcript, "goal", |_, _| {})
        .await
        .unwrap();

    // The final iteration advertised exactly one iteration left.
    let request = backend.last_request();
    assert!(request.system.contains("1 iterations left"));
    assert!(request.system.contains(COMPLETION_SENTINEL));
}

#[tokio::test]
async fn empty_automode_goal_uses_continue_prompt() {
    let backend = ScriptedBackend::new(vec![text_reply(COMPLETION_SENTINEL)]);
    let config = SessionConfig {
        automode: true,
        ..SessionConfig::default()
    };
    let mut engine = engine(backend, ScriptedGate::new(GateDecision::Approve), config);
    let mut transcript = Transcript::new();

    run_automode(&mut engine, &mut transcript, "  ", |_, _| {})
        .await
        .unwrap();

    assert_eq!(
        transcript.turns()[0].text(),
        stackwright::engine::CONTINUE_PROMPT
    );
}
