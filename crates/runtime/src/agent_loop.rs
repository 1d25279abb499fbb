//! Agent loop: think, act, observe, reflect.

use crate::config::{AgentSection, MonkConfig};
use crate::interfaces::{DisplayEvent, DisplaySink, ModelProvider, ModelRequest, RuntimeError};
use crate::metrics::{self, MetricTimer};
use monk_core::{Message, ProviderError, StreamEvent, ToolResult};
use monk_interpreter::{Diagnostic, Interpreter, InterpreterConfig, Segment};
use monk_memory::{ContextError, ContextManager, ConversationState};
use monk_tools::{
    default_registry, validation_failure, Confirmer, ExecutionPolicy, RootLocks, ToolExecutor,
    ToolRegistry, Validator,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Think,
    Act,
    Observe,
    Reflect,
    Finished,
    Aborted,
    IterationCapped,
}

/// Why a turn stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// A deny-listed or blocked invocation was attempted.
    SafetyBlocked { tool: String },
    Provider(ProviderError),
    /// This many iterations in a row produced only failed results.
    TooManyFailures(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The `finish` tool ran.
    Finished,
    /// The model answered without calling a tool.
    Replied,
    Aborted(AbortReason),
    IterationCapped,
    Cancelled,
}

/// Summary of one call to [`AgentLoop::run_turn`].
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub outcome: TurnOutcome,
    pub iterations: usize,
    /// Candidates dispatched to the executor, including failed validations.
    pub tool_calls: usize,
    pub diagnostics: Vec<Diagnostic>,
    /// Times pruning could not get under the watermark.
    pub overflows: usize,
}

/// What stopped dispatch inside a single response.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Halt {
    Finish,
    SafetyBlocked(String),
}

/// One fully drained model response and what it produced.
#[derive(Default)]
struct Response {
    raw: String,
    results: Vec<ToolResult>,
    candidates: usize,
    diagnostics: Vec<Diagnostic>,
    halt: Option<Halt>,
}

enum ActOutcome {
    Drained(Response),
    Cancelled,
    ProviderFailed(ProviderError),
}

/// Drives one session's conversation.
///
/// Each call to [`run_turn`](Self::run_turn) runs strictly sequentially:
/// a response is fully drained, its candidates executed in emission order
/// and the observations pruned before the next model request is built.
pub struct AgentLoop {
    provider: Arc<dyn ModelProvider>,
    display: Arc<dyn DisplaySink>,
    registry: Arc<ToolRegistry>,
    validator: Validator,
    executor: ToolExecutor,
    context: ContextManager,
    interpreter_config: InterpreterConfig,
    policy: ExecutionPolicy,
    limits: AgentSection,
    state: LoopState,
}

impl AgentLoop {
    /// Build a loop over the built-in tool set.
    pub fn new(
        session_id: impl Into<String>,
        config: &MonkConfig,
        provider: Arc<dyn ModelProvider>,
        confirmer: Arc<dyn Confirmer>,
        display: Arc<dyn DisplaySink>,
        root_locks: RootLocks,
    ) -> Result<Self, RuntimeError> {
        let registry = Arc::new(default_registry()?);
        Self::with_registry(session_id, config, registry, provider, confirmer, display, root_locks)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_registry(
        session_id: impl Into<String>,
        config: &MonkConfig,
        registry: Arc<ToolRegistry>,
        provider: Arc<dyn ModelProvider>,
        confirmer: Arc<dyn Confirmer>,
        display: Arc<dyn DisplaySink>,
        root_locks: RootLocks,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        let session_id = session_id.into();

        let executor = ToolExecutor::new(
            session_id.clone(),
            &config.sandbox_root,
            registry.clone(),
            confirmer,
            root_locks,
            config.tools.executor.clone(),
        )?;

        let mut context = ContextManager::new(&config.context_config())?;
        if let Some(prompt) = &config.system_prompt {
            context.append(Message::system(prompt.clone()));
        }

        info!(
            "Agent loop ready for session: {} ({} tools)",
            session_id,
            registry.count()
        );

        Ok(Self {
            provider,
            display,
            validator: Validator::new(registry.clone()),
            registry,
            executor,
            context,
            interpreter_config: config.interpreter.clone(),
            policy: config.execution_policy(),
            limits: config.agent.clone(),
            state: LoopState::Think,
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn context(&self) -> &ContextManager {
        &self.context
    }

    pub fn snapshot(&self) -> ConversationState {
        self.context.snapshot()
    }

    /// Resume from a stored conversation. The state is left untouched on error.
    pub fn restore(&mut self, state: ConversationState) -> Result<(), RuntimeError> {
        self.context.restore(state)?;
        Ok(())
    }

    /// Run one user turn until the model finishes, replies, fails or hits a limit.
    pub async fn run_turn(
        &mut self,
        user_input: &str,
        cancel: &CancellationToken,
    ) -> Result<TurnReport, RuntimeError> {
        let mut report = TurnReport {
            outcome: TurnOutcome::IterationCapped,
            iterations: 0,
            tool_calls: 0,
            diagnostics: Vec::new(),
            overflows: 0,
        };

        self.context.append(Message::user(user_input));
        self.prune(&mut report)?;

        let mut consecutive_failures = 0;

        for iteration in 0..self.limits.max_iterations {
            report.iterations = iteration + 1;

            self.state = LoopState::Think;
            debug!(
                "TAOR iteration {}/{} ({} tokens in context)",
                iteration + 1,
                self.limits.max_iterations,
                self.context.token_count()
            );
            let request = ModelRequest {
                messages: self.context.messages().to_vec(),
                tool_schemas: self.registry.schemas(),
            };

            self.state = LoopState::Act;
            let response = match self.act(&request, cancel).await {
                ActOutcome::Drained(response) => response,
                ActOutcome::Cancelled => {
                    info!("Turn cancelled during iteration {}", iteration + 1);
                    self.state = LoopState::Think;
                    report.outcome = TurnOutcome::Cancelled;
                    return Ok(report);
                }
                ActOutcome::ProviderFailed(e) => {
                    error!("Provider stream failed: {}", e);
                    self.state = LoopState::Aborted;
                    report.outcome = TurnOutcome::Aborted(AbortReason::Provider(e));
                    return Ok(report);
                }
            };

            self.state = LoopState::Observe;
            report.tool_calls += response.candidates;
            report.diagnostics.extend(response.diagnostics.iter().cloned());
            self.observe(&response);
            self.prune(&mut report)?;

            self.state = LoopState::Reflect;
            match &response.halt {
                Some(Halt::Finish) => {
                    info!("Finish tool observed after {} iterations", iteration + 1);
                    self.state = LoopState::Finished;
                    report.outcome = TurnOutcome::Finished;
                    return Ok(report);
                }
                Some(Halt::SafetyBlocked(tool)) => {
                    warn!("Turn aborted: safety block on tool {}", tool);
                    self.state = LoopState::Aborted;
                    report.outcome = TurnOutcome::Aborted(AbortReason::SafetyBlocked { tool: tool.clone() });
                    return Ok(report);
                }
                None => {}
            }

            if response.results.is_empty() {
                info!("Model replied without tool calls after {} iterations", iteration + 1);
                self.state = LoopState::Finished;
                report.outcome = TurnOutcome::Replied;
                return Ok(report);
            }

            if response.results.iter().all(|r| !r.is_success()) {
                consecutive_failures += 1;
                if consecutive_failures >= self.limits.max_consecutive_failures {
                    warn!(
                        "Turn aborted after {} consecutive failed iterations",
                        consecutive_failures
                    );
                    self.state = LoopState::Aborted;
                    report.outcome = TurnOutcome::Aborted(AbortReason::TooManyFailures(consecutive_failures));
                    return Ok(report);
                }
            } else {
                consecutive_failures = 0;
            }
        }

        warn!(
            "Max iterations ({}) reached without finishing",
            self.limits.max_iterations
        );
        self.state = LoopState::IterationCapped;
        report.outcome = TurnOutcome::IterationCapped;
        Ok(report)
    }

    /// Stream one response, dispatching candidates as they are recognised.
    ///
    /// Awaiting the next chunk is the only point where cancellation is observed.
    async fn act(&self, request: &ModelRequest, cancel: &CancellationToken) -> ActOutcome {
        let _timer = MetricTimer::new(metrics::record_provider_latency);

        let mut stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return ActOutcome::Cancelled,
            stream = self.provider.stream(request) => match stream {
                Ok(stream) => stream,
                Err(e) => return ActOutcome::ProviderFailed(e),
            },
        };

        let mut interpreter = Interpreter::new(&self.interpreter_config);
        let mut response = Response::default();

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => return ActOutcome::Cancelled,
                event = stream.next_event() => event,
            };

            match event {
                Ok(StreamEvent::Chunk(chunk)) => {
                    response.raw.push_str(&chunk);
                    let segments = interpreter.feed(&chunk);
                    self.dispatch(segments, &mut response).await;
                }
                Ok(StreamEvent::End) => {
                    let segments = interpreter.finish();
                    self.dispatch(segments, &mut response).await;
                    break;
                }
                Err(e) => return ActOutcome::ProviderFailed(e),
            }
        }

        response.diagnostics = interpreter.take_diagnostics();
        metrics::record_parse_fallbacks(response.diagnostics.len());
        ActOutcome::Drained(response)
    }

    async fn dispatch(&self, segments: Vec<Segment>, response: &mut Response) {
        for segment in segments {
            let candidate = match segment {
                Segment::Text(text) => {
                    self.display.display(DisplayEvent::Text(&text));
                    continue;
                }
                Segment::ToolCall(candidate) => candidate,
            };

            self.display.display(DisplayEvent::ToolCall(&candidate));
            if let Some(halt) = &response.halt {
                debug!(
                    "Skipping tool call {:?} after {:?}",
                    candidate.name().unwrap_or("unknown"),
                    halt
                );
                continue;
            }
            response.candidates += 1;

            let result = match self.validator.validate(&candidate) {
                Ok(invocation) => {
                    let _timer = MetricTimer::new(metrics::record_tool_latency);
                    self.executor.execute(&invocation, &self.policy).await
                }
                Err(e) => {
                    warn!("Rejected tool call: {}", e);
                    validation_failure(candidate.name().unwrap_or("unknown"), &e)
                }
            };

            metrics::record_tool_outcome(result.status);
            self.display.display(DisplayEvent::ToolResult(&result));

            if result.finish {
                response.halt = Some(Halt::Finish);
            } else if result.is_safety_blocked() {
                response.halt = Some(Halt::SafetyBlocked(result.tool.clone()));
            }
            response.results.push(result);
        }
    }

    fn observe(&mut self, response: &Response) {
        if !response.raw.is_empty() {
            self.context.append(Message::assistant(response.raw.clone()));
        }
        for result in &response.results {
            self.context.append(Message::tool(result.observation().to_json()));
            self.context.record_tool(result);
        }
    }

    /// Prune, force-dropping the oldest messages when pruning alone falls short.
    fn prune(&mut self, report: &mut TurnReport) -> Result<(), RuntimeError> {
        match self.context.prune_if_needed() {
            Ok(pruned) => {
                if pruned.removed > 0 {
                    metrics::increment_prune_count();
                }
                Ok(())
            }
            Err(ContextError::Overflow { token_count, watermark }) => {
                warn!(
                    "Context overflow ({} > {}); dropping oldest messages",
                    token_count, watermark
                );
                metrics::increment_overflow_count();
                report.overflows += 1;
                while self.context.needs_pruning() {
                    if self.context.force_drop_oldest().is_none() {
                        return Err(ContextError::Overflow {
                            token_count: self.context.token_count(),
                            watermark,
                        }
                        .into());
                    }
                }
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
