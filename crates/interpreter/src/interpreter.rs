//! Incremental stream interpreter.

use crate::scanner::BalanceScanner;
use crate::segment::{Diagnostic, DiagnosticKind, Segment};
use crate::strategies::{default_strategies, Extraction, ExtractionStrategy};
use monk_core::{StrategyKind, ToolCallCandidate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Interpreter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    pub enable_intent_inference: bool,
    /// An open span larger than this is released as text.
    pub max_span_bytes: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            enable_intent_inference: false,
            max_span_bytes: 256 * 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterState {
    AccumulatingText,
    ScanningCandidate,
    ValidatingCandidate,
    Finished,
}

/// Converts one streamed response into ordered segments.
///
/// Text before an opening brace is released as soon as it arrives; an open
/// span is held back until its closing brace or end of stream. One
/// interpreter serves exactly one response.
pub struct Interpreter {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    max_span_bytes: usize,
    state: InterpreterState,
    span: String,
    span_offset: usize,
    scanner: BalanceScanner,
    consumed: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Interpreter {
    pub fn new(config: &InterpreterConfig) -> Self {
        Self::with_strategies(
            default_strategies(config.enable_intent_inference),
            config.max_span_bytes,
        )
    }

    pub fn with_strategies(
        strategies: Vec<Box<dyn ExtractionStrategy>>,
        max_span_bytes: usize,
    ) -> Self {
        Self {
            strategies,
            max_span_bytes: max_span_bytes.max(1),
            state: InterpreterState::AccumulatingText,
            span: String::new(),
            span_offset: 0,
            scanner: BalanceScanner::new(),
            consumed: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn state(&self) -> InterpreterState {
        self.state
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Consume the next chunk and return every segment it completes.
    pub fn feed(&mut self, chunk: &str) -> Vec<Segment> {
        let mut out = Vec::new();
        if self.state == InterpreterState::Finished {
            warn!("Chunk fed to finished interpreter; ignoring {} bytes", chunk.len());
            return out;
        }

        let bytes = chunk.as_bytes();
        // Start of the not-yet-released region of this chunk.
        let mut start = 0;

        for (i, &byte) in bytes.iter().enumerate() {
            match self.state {
                InterpreterState::AccumulatingText => {
                    if byte == b'{' {
                        push_text(&mut out, &chunk[start..i]);
                        start = i;
                        self.open_span(self.consumed + i);
                        self.scanner.step(byte);
                    }
                }
                InterpreterState::ScanningCandidate => {
                    if self.scanner.step(byte) {
                        self.span.push_str(&chunk[start..=i]);
                        start = i + 1;
                        let span = std::mem::take(&mut self.span);
                        out.push(self.resolve(span));
                    }
                }
                InterpreterState::ValidatingCandidate | InterpreterState::Finished => {}
            }
        }

        match self.state {
            InterpreterState::ScanningCandidate => {
                self.span.push_str(&chunk[start..]);
                if self.span.len() > self.max_span_bytes {
                    warn!(
                        "Open span exceeded {} bytes; releasing as text",
                        self.max_span_bytes
                    );
                    let span = std::mem::take(&mut self.span);
                    self.record(DiagnosticKind::SpanTooLarge, span.len(), Vec::new());
                    self.state = InterpreterState::AccumulatingText;
                    push_text(&mut out, &span);
                }
            }
            _ => push_text(&mut out, &chunk[start..]),
        }

        self.consumed += chunk.len();
        out
    }

    /// Signal end of stream. An unterminated span is released as text.
    pub fn finish(&mut self) -> Vec<Segment> {
        let mut out = Vec::new();
        if self.state == InterpreterState::ScanningCandidate {
            let span = std::mem::take(&mut self.span);
            debug!("Unterminated span of {} bytes at end of stream", span.len());
            self.record(DiagnosticKind::Unterminated, span.len(), Vec::new());
            push_text(&mut out, &span);
        }
        self.state = InterpreterState::Finished;
        out
    }

    fn open_span(&mut self, offset: usize) {
        self.state = InterpreterState::ScanningCandidate;
        self.scanner = BalanceScanner::new();
        self.span.clear();
        self.span_offset = offset;
    }

    fn resolve(&mut self, span: String) -> Segment {
        self.state = InterpreterState::ValidatingCandidate;
        let mut attempts: Vec<(StrategyKind, String)> = Vec::new();

        let mut matched = None;
        for strategy in &self.strategies {
            match strategy.extract(&span) {
                Extraction::Matched(fields) => {
                    matched = Some((fields, strategy.kind(), strategy.confidence()));
                    break;
                }
                Extraction::NoMatch(reason) => attempts.push((strategy.kind(), reason)),
            }
        }

        self.state = InterpreterState::AccumulatingText;

        match matched {
            Some((fields, strategy, confidence)) => {
                if strategy != StrategyKind::Strict {
                    debug!(
                        "Recovered tool call {} via {:?} after {} failed attempts",
                        fields.name,
                        strategy,
                        attempts.len()
                    );
                }
                Segment::ToolCall(ToolCallCandidate {
                    span,
                    fields: Some(fields),
                    strategy,
                    confidence,
                })
            }
            None => {
                debug!("No strategy matched span at offset {}", self.span_offset);
                self.record(DiagnosticKind::NoStrategyMatched, span.len(), attempts);
                Segment::Text(span)
            }
        }
    }

    fn record(&mut self, kind: DiagnosticKind, span_len: usize, attempts: Vec<(StrategyKind, String)>) {
        self.diagnostics.push(Diagnostic {
            kind,
            offset: self.span_offset,
            span_len,
            attempts,
        });
    }
}

fn push_text(out: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        out.push(Segment::Text(text.to_string()));
    }
}
