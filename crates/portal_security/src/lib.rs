use anyhow::{Context, Result};
use async_trait::async_trait;
use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;
use tokio::task;
use tracing::debug;

pub const DEFAULT_SERVICE: &str = "citizen-portal";

/// Username and password for the admin login form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredential {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredential")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn store(&self, account: &str, credential: &AdminCredential) -> Result<()>;
    async fn resolve(&self, account: &str) -> Result<Option<AdminCredential>>;
    async fn remove(&self, account: &str) -> Result<()>;
}

/// Credentials kept in the OS keychain, one entry per account name
/// (the CLI uses the portal base url).
#[derive(Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, account: &str) -> Result<Entry> {
        Entry::new(&self.service, account).with_context(|| format!("keyring entry {}", account))
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

#[async_trait]
impl CredentialStore for KeyringStore {
    async fn store(&self, account: &str, credential: &AdminCredential) -> Result<()> {
        let entry = self.entry(account)?;
        let json = serde_json::to_string(credential)?;
        task::spawn_blocking(move || entry.set_password(&json).map_err(anyhow::Error::from))
            .await??;
        debug!(target: "security::keyring", "stored credential for {}", account);
        Ok(())
    }

    async fn resolve(&self, account: &str) -> Result<Option<AdminCredential>> {
        let entry = self.entry(account)?;
        let secret = task::spawn_blocking(move || match entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(anyhow::Error::from(err)),
        })
        .await??;
        match secret {
            Some(secret) => Ok(Some(
                serde_json::from_str(&secret)
                    .with_context(|| format!("decoding keyring entry {}", account))?,
            )),
            None => Ok(None),
        }
    }

    async fn remove(&self, account: &str) -> Result<()> {
        let entry = self.entry(account)?;
        task::spawn_blocking(move || match entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(anyhow::Error::from(err)),
        })
        .await??;
        Ok(())
    }
}

/// Process-local store for tests and keychain-less environments.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<HashMap<String, AdminCredential>>,
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn store(&self, account: &str, credential: &AdminCredential) -> Result<()> {
        self.inner
            .write()
            .await
            .insert(account.to_string(), credential.clone());
        Ok(())
    }

    async fn resolve(&self, account: &str) -> Result<Option<AdminCredential>> {
        Ok(self.inner.read().await.get(account).cloned())
    }

    async fn remove(&self, account: &str) -> Result<()> {
        self.inner.write().await.remove(account);
        Ok(())
    }
}
