//! YAML configuration loader.

use crate::interfaces::RuntimeError;
use monk_interpreter::InterpreterConfig;
use monk_memory::{ContextConfig, RolePriorities};
use monk_tools::{ConfirmationPolicy, ExecutionPolicy, ExecutorConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration document.
#[derive(Debug, Clone, Deserialize)]
pub struct MonkConfig {
    pub sandbox_root: PathBuf,
    /// Inline system prompt. Replaced by the file contents when
    /// `system_prompt_file` is set.
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub system_prompt_file: Option<PathBuf>,
    #[serde(default)]
    pub model: ModelSection,
    #[serde(default)]
    pub context: ContextSection,
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub tools: ToolsSection,
    #[serde(default)]
    pub interpreter: InterpreterConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub context_window: usize,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            context_window: 128_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContextSection {
    pub prune_threshold: f64,
    pub keep_recent_exchanges: usize,
    pub chars_per_token: f64,
    pub message_overhead: usize,
    pub priorities: RolePriorities,
}

impl Default for ContextSection {
    fn default() -> Self {
        let defaults = ContextConfig::default();
        Self {
            prune_threshold: defaults.prune_threshold,
            keep_recent_exchanges: defaults.keep_recent_exchanges,
            chars_per_token: defaults.chars_per_token,
            message_overhead: defaults.message_overhead,
            priorities: defaults.priorities,
        }
    }
}

/// Agent loop limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    pub max_iterations: usize,
    pub max_consecutive_failures: usize,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            max_consecutive_failures: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    pub confirmation: ConfirmationPolicy,
    #[serde(flatten)]
    pub executor: ExecutorConfig,
}

impl MonkConfig {
    /// Config rooted at `sandbox_root` with every other section defaulted.
    pub fn new(sandbox_root: impl Into<PathBuf>) -> Self {
        Self {
            sandbox_root: sandbox_root.into(),
            system_prompt: None,
            system_prompt_file: None,
            model: ModelSection::default(),
            context: ContextSection::default(),
            agent: AgentSection::default(),
            tools: ToolsSection::default(),
            interpreter: InterpreterConfig::default(),
        }
    }

    pub fn context_config(&self) -> ContextConfig {
        ContextConfig {
            context_window: self.model.context_window,
            prune_threshold: self.context.prune_threshold,
            keep_recent_exchanges: self.context.keep_recent_exchanges,
            chars_per_token: self.context.chars_per_token,
            message_overhead: self.context.message_overhead,
            priorities: self.context.priorities,
        }
    }

    pub fn execution_policy(&self) -> ExecutionPolicy {
        ExecutionPolicy {
            confirmation: self.tools.confirmation,
        }
    }

    /// Check limits that serde cannot express.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        self.context_config()
            .validate()
            .map_err(|e| RuntimeError::Config(e.to_string()))?;
        if self.agent.max_iterations == 0 {
            return Err(RuntimeError::Config("agent.max_iterations must be > 0".to_string()));
        }
        if self.agent.max_consecutive_failures == 0 {
            return Err(RuntimeError::Config(
                "agent.max_consecutive_failures must be > 0".to_string(),
            ));
        }
        if self.tools.executor.timeout_ms == 0 {
            return Err(RuntimeError::Config("tools.timeout_ms must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Load and validate configuration from a YAML file.
///
/// Relative `sandbox_root` and `system_prompt_file` paths are resolved
/// against the directory holding the config file.
pub fn load_config(config_path: impl AsRef<Path>) -> Result<MonkConfig, RuntimeError> {
    let config_file = config_path.as_ref();

    if !config_file.exists() {
        return Err(RuntimeError::Config(format!(
            "Config file not found: {}",
            config_file.display()
        )));
    }

    let content = std::fs::read_to_string(config_file)?;
    if content.trim().is_empty() {
        return Err(RuntimeError::Config("Config file is empty".to_string()));
    }

    let mut config: MonkConfig = serde_yaml::from_str(&content)
        .map_err(|e| RuntimeError::Config(format!("Invalid YAML: {}", e)))?;

    let base = config_file.parent().unwrap_or_else(|| Path::new("."));
    if config.sandbox_root.is_relative() {
        config.sandbox_root = base.join(&config.sandbox_root);
    }
    if !config.sandbox_root.is_dir() {
        return Err(RuntimeError::Config(format!(
            "Sandbox root not found: {}",
            config.sandbox_root.display()
        )));
    }

    if let Some(prompt_file) = &config.system_prompt_file {
        let prompt_path = if prompt_file.is_absolute() {
            prompt_file.clone()
        } else {
            base.join(prompt_file)
        };
        let prompt = std::fs::read_to_string(&prompt_path).map_err(|e| {
            RuntimeError::Config(format!(
                "System prompt file unreadable: {}: {}",
                prompt_path.display(),
                e
            ))
        })?;
        config.system_prompt = Some(prompt);
    }

    config.validate()?;
    tracing::info!("Loaded config from {}", config_file.display());
    Ok(config)
}
