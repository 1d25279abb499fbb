use crate::error::ContextError;
use crate::state::ConversationState;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Persistence for conversation snapshots, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<ConversationState>, ContextError>;
    async fn save(&self, session_id: &str, state: &ConversationState) -> Result<(), ContextError>;
    async fn delete(&self, session_id: &str) -> Result<(), ContextError>;
    async fn list_sessions(&self) -> Result<Vec<String>, ContextError>;
}

/// One pretty-printed JSON file per session under `base_path`.
pub struct FileSessionStore {
    base_path: PathBuf,
}

impl FileSessionStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub async fn initialize(&self) -> Result<(), ContextError> {
        fs::create_dir_all(&self.base_path).await?;
        tracing::info!("Session store initialized at {:?}", self.base_path);
        Ok(())
    }

    fn session_path(&self, session_id: &str) -> Result<PathBuf, ContextError> {
        let valid = !session_id.is_empty()
            && session_id != "."
            && session_id != ".."
            && !session_id.contains(['/', '\\', '\0']);
        if !valid {
            return Err(ContextError::InvalidSessionId(session_id.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", session_id)))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<ConversationState>, ContextError> {
        let path = self.session_path(session_id)?;
        if !fs::try_exists(&path).await? {
            tracing::info!("No stored context for session: {}", session_id);
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let state: ConversationState = serde_json::from_str(&content)?;
        state.validate()?;

        tracing::info!(
            "Loaded context for session: {} ({} messages)",
            session_id,
            state.messages.len()
        );
        Ok(Some(state))
    }

    async fn save(&self, session_id: &str, state: &ConversationState) -> Result<(), ContextError> {
        let path = self.session_path(session_id)?;
        let temp_path = self
            .base_path
            .join(format!(".{}.{}.tmp", session_id, uuid::Uuid::new_v4()));
        let content = serde_json::to_string_pretty(state)?;

        let write = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(content.as_bytes()).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, &path).await
        };
        if let Err(e) = write.await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!("Saved context for session: {}", session_id);
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), ContextError> {
        let path = self.session_path(session_id)?;
        if fs::try_exists(&path).await? {
            fs::remove_file(&path).await?;
            tracing::info!("Deleted context for session: {}", session_id);
        }
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<String>, ContextError> {
        let mut sessions = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') && name.ends_with(".json") {
                    sessions.push(name.trim_end_matches(".json").to_string());
                }
            }
        }

        sessions.sort();
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_rejects_separators() {
        let store = FileSessionStore::new("/tmp/unused");
        assert!(store.session_path("abc").is_ok());
        assert!(matches!(
            store.session_path("../escape"),
            Err(ContextError::InvalidSessionId(_))
        ));
        assert!(store.session_path("").is_err());
        assert!(store.session_path("..").is_err());
    }
}
