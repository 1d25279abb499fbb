use crate::interpreter::{Interpreter, InterpreterConfig};
use crate::segment::{coalesce, Diagnostic, Segment};
use monk_core::{ChunkStream, ProviderError, StreamEvent};

/// A fully interpreted response.
#[derive(Debug, Clone, Default)]
pub struct Interpretation {
    pub segments: Vec<Segment>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Interpretation {
    pub fn candidate_count(&self) -> usize {
        self.segments.iter().filter(|s| !s.is_text()).count()
    }

    /// Concatenated source of every segment, in order.
    pub fn reconstruct(&self) -> String {
        self.segments.iter().map(Segment::source).collect()
    }
}

/// Drain `stream` to its end-of-stream marker and interpret it.
///
/// A provider error aborts interpretation; nothing partial is returned.
pub async fn interpret(
    stream: &mut dyn ChunkStream,
    config: &InterpreterConfig,
) -> Result<Interpretation, ProviderError> {
    let mut interpreter = Interpreter::new(config);
    let mut segments = Vec::new();

    loop {
        match stream.next_event().await? {
            StreamEvent::Chunk(chunk) => segments.extend(interpreter.feed(&chunk)),
            StreamEvent::End => {
                segments.extend(interpreter.finish());
                break;
            }
        }
    }

    Ok(Interpretation {
        segments: coalesce(segments),
        diagnostics: interpreter.take_diagnostics(),
    })
}
