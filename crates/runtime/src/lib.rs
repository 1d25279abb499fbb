//! Monk runtime: the agent loop and its configuration.
//!
//! Wires the stream interpreter, validator, executor and context manager
//! into a think/act/observe/reflect loop over a streaming model provider.

pub mod agent_loop;
pub mod config;
pub mod interfaces;
pub mod metrics;

pub use agent_loop::{AbortReason, AgentLoop, LoopState, TurnOutcome, TurnReport};
pub use config::{load_config, AgentSection, ContextSection, ModelSection, MonkConfig, ToolsSection};
pub use interfaces::{DisplayEvent, DisplaySink, ModelProvider, ModelRequest, NullDisplay, RuntimeError};
