use monk_core::ToolCallCandidate;

/// A contiguous unit of an interpreted response.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    ToolCall(ToolCallCandidate),
}

impl Segment {
    /// Source bytes this segment covers.
    pub fn source(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::ToolCall(candidate) => &candidate.span,
        }
    }

    pub fn as_tool_call(&self) -> Option<&ToolCallCandidate> {
        match self {
            Segment::ToolCall(candidate) => Some(candidate),
            Segment::Text(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Segment::Text(_))
    }
}

/// Merge runs of adjacent text segments.
pub fn coalesce(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments {
        match (out.last_mut(), segment) {
            (Some(Segment::Text(prev)), Segment::Text(next)) => prev.push_str(&next),
            (_, segment) => out.push(segment),
        }
    }
    out
}

/// Why a span fell back to plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Every strategy declined the balanced span.
    NoStrategyMatched,
    /// End of stream reached inside an open span.
    Unterminated,
    /// The open span grew past the configured limit.
    SpanTooLarge,
}

/// Parse failure record. Kept for operators, never shown to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Byte offset of the span within the response.
    pub offset: usize,
    pub span_len: usize,
    /// `(strategy, reason)` for each strategy that declined.
    pub attempts: Vec<(monk_core::StrategyKind, String)>,
}
