//! Streaming tool-call interpreter.
//!
//! Turns a chunked model response into ordered [`Segment`]s: plain text and
//! tool-call candidates recovered by an ordered list of extraction
//! strategies. Unparseable spans are never dropped; they come back as text.

pub mod driver;
pub mod interpreter;
pub mod scanner;
pub mod segment;
pub mod strategies;

pub use driver::{interpret, Interpretation};
pub use interpreter::{Interpreter, InterpreterConfig, InterpreterState};
pub use segment::{coalesce, Diagnostic, DiagnosticKind, Segment};
pub use strategies::{default_strategies, Extraction, ExtractionStrategy, IntentMatcher, IntentRule};
