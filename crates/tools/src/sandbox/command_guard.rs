use crate::error::ToolError;
use regex::Regex;

/// Built-in destructive command patterns, by category.
const DENY_PATTERNS: &[(&str, &str)] = &[
    (
        "recursive_root_delete",
        r#"\brm\s+(?:[^\s;&|]+\s+)*?(?:-[a-zA-Z]*[rR][a-zA-Z]*|--recursive)\s+(?:[^\s;&|]+\s+)*?["']?(?:/+(?:\.{1,2}/*)?\*?|~/?\*?|\$HOME/?\*?|\$\{HOME\}/?\*?)["']?(?:\s|;|&|\||$)"#,
    ),
    // Flags after the target, e.g. `rm / -rf`
    (
        "recursive_root_delete",
        r#"\brm\s+(?:[^\s;&|]+\s+)*?["']?(?:/+(?:\.{1,2}/*)?\*?|~/?\*?|\$HOME/?\*?|\$\{HOME\}/?\*?)["']?\s+(?:[^\s;&|]+\s+)*?(?:-[a-zA-Z]*[rR][a-zA-Z]*|--recursive)(?:\s|;|&|\||$)"#,
    ),
    (
        "recursive_root_delete",
        r"\brm\s+(?:\S+\s+)*--no-preserve-root\b",
    ),
    // Any function whose body pipes into a backgrounded call
    (
        "fork_bomb",
        r"(?:\bfunction\s+[\w:.-]+\s*(?:\(\s*\))?|[\w:.-]+\s*\(\s*\))\s*\{[^}]*[\w:.-]+\s*\|\s*[\w:.-]+\s*&[^}]*\}",
    ),
    ("filesystem_format", r"\bmkfs(?:\.\w+)?\b"),
    ("raw_device_write", r"\bdd\b[^|;&]*\bof=/dev/"),
    ("raw_device_write", r">\s*/dev/(?:sd|hd|nvme|vd|xvd|mmcblk)"),
    (
        "credential_exfiltration",
        r"(?:\.ssh/|\.aws/credentials|/etc/shadow|\.netrc|\.env\b|\.git-credentials)[^|;&]*\|\s*(?:curl|wget|nc|ncat|netcat|socat)\b",
    ),
    (
        "credential_exfiltration",
        r"\b(?:curl|wget)\b[^|;&]*(?:-d|--data\S*|-F|--form|-T|--upload-file|--post-file)[= ]\s*@?\S*(?:\.ssh/|\.aws/credentials|/etc/shadow|\.netrc|\.env\b|\.git-credentials)",
    ),
    (
        "credential_exfiltration",
        r"\b(?:nc|ncat|netcat)\b[^|;&]*<\s*\S*(?:\.ssh/|\.aws/credentials|/etc/shadow|\.netrc|\.env\b)",
    ),
    ("remote_script_execution", r"\b(?:curl|wget)\b[^|;&]*\|\s*(?:sudo\s+)?(?:ba|z|da)?sh\b"),
    ("world_writable_root", r"\bchmod\s+(?:-\S+\s+)*-[a-zA-Z]*R[a-zA-Z]*\s+(?:0?777|a\+rwx|o\+w)\s+/(?:\s|$)"),
];

/// A deny-list entry.
#[derive(Debug, Clone)]
pub struct DenyRule {
    pub category: String,
    pattern: Regex,
}

impl DenyRule {
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Classifies shell commands against the deny-list.
#[derive(Debug, Clone)]
pub struct CommandGuard {
    rules: Vec<DenyRule>,
}

impl CommandGuard {
    /// Built-in rules plus `extra_patterns` from configuration.
    pub fn new(extra_patterns: &[String]) -> Result<Self, ToolError> {
        let builtin = DENY_PATTERNS
            .iter()
            .map(|(category, pattern)| (category.to_string(), pattern.to_string()));
        let extra = extra_patterns
            .iter()
            .map(|pattern| ("configured".to_string(), pattern.clone()));

        let rules = builtin
            .chain(extra)
            .map(|(category, pattern)| {
                Regex::new(&pattern)
                    .map(|pattern| DenyRule { category, pattern })
                    .map_err(|e| ToolError::ValidationError(format!("Invalid deny pattern: {}", e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    /// First rule matched by `command`, if any.
    pub fn check(&self, command: &str) -> Option<&DenyRule> {
        self.rules.iter().find(|rule| rule.pattern.is_match(command))
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
