use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crewdesk_core::{ThemeMode, TokenPair, User};

/// Durable client-side state: the three slots the dashboard persists.
///
/// Writers are last-writer-wins; the single-flight refresh gate guarantees at
/// most one writer races the login/logout call sites.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn tokens(&self) -> Result<Option<TokenPair>>;
    async fn set_tokens(&self, pair: TokenPair) -> Result<()>;
    async fn user(&self) -> Result<Option<User>>;
    async fn set_user(&self, user: User) -> Result<()>;
    async fn theme(&self) -> Result<Option<ThemeMode>>;
    async fn set_theme(&self, theme: ThemeMode) -> Result<()>;
    /// Drops `tokens` and `user`. The theme preference survives a logout.
    async fn clear_session(&self) -> Result<()>;
}

pub type SharedCredentialStore = Arc<dyn CredentialStore>;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Slots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tokens: Option<TokenPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<ThemeMode>,
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Slots>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(pair: TokenPair) -> Self {
        Self {
            inner: RwLock::new(Slots {
                tokens: Some(pair),
                ..Slots::default()
            }),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn tokens(&self) -> Result<Option<TokenPair>> {
        Ok(self.inner.read().await.tokens.clone())
    }

    async fn set_tokens(&self, pair: TokenPair) -> Result<()> {
        self.inner.write().await.tokens = Some(pair);
        Ok(())
    }

    async fn user(&self) -> Result<Option<User>> {
        Ok(self.inner.read().await.user.clone())
    }

    async fn set_user(&self, user: User) -> Result<()> {
        self.inner.write().await.user = Some(user);
        Ok(())
    }

    async fn theme(&self) -> Result<Option<ThemeMode>> {
        Ok(self.inner.read().await.theme)
    }

    async fn set_theme(&self, theme: ThemeMode) -> Result<()> {
        self.inner.write().await.theme = Some(theme);
        Ok(())
    }

    async fn clear_session(&self) -> Result<()> {
        let mut guard = self.inner.write().await;
        guard.tokens = None;
        guard.user = None;
        Ok(())
    }
}

/// Stores the three slots as one JSON document, rewritten via a temp-file
/// rename on every mutation.
pub struct FileCredentialStore {
    path: PathBuf,
    inner: RwLock<Slots>,
}

impl FileCredentialStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let slots = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("corrupt credential file {}", path.display()))?,
            Err(err) if err.kind() == ErrorKind::NotFound => Slots::default(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read credential file {}", path.display()));
            }
        };
        Ok(Self {
            path,
            inner: RwLock::new(slots),
        })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn persist(&self, slots: &Slots) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(slots)?;
        let staging = self.path.with_extension("tmp");
        std::fs::write(&staging, bytes)?;
        std::fs::rename(&staging, &self.path)
            .with_context(|| format!("failed to persist {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn tokens(&self) -> Result<Option<TokenPair>> {
        Ok(self.inner.read().await.tokens.clone())
    }

    async fn set_tokens(&self, pair: TokenPair) -> Result<()> {
        let mut guard = self.inner.write().await;
        guard.tokens = Some(pair);
        self.persist(&guard)
    }

    async fn user(&self) -> Result<Option<User>> {
        Ok(self.inner.read().await.user.clone())
    }

    async fn set_user(&self, user: User) -> Result<()> {
        let mut guard = self.inner.write().await;
        guard.user = Some(user);
        self.persist(&guard)
    }

    async fn theme(&self) -> Result<Option<ThemeMode>> {
        Ok(self.inner.read().await.theme)
    }

    async fn set_theme(&self, theme: ThemeMode) -> Result<()> {
        let mut guard = self.inner.write().await;
        guard.theme = Some(theme);
        self.persist(&guard)
    }

    async fn clear_session(&self) -> Result<()> {
        let mut guard = self.inner.write().await;
        guard.tokens = None;
        guard.user = None;
        self.persist(&guard)
    }
}
