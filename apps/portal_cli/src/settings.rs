use anyhow::{Context, Result};
use portal_client::config::DEFAULT_BASE_URL;
use portal_model::Language;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG: &str = "portal.yaml";
pub const DEFAULT_CART: &str = ".portal/cart.json";
const PROFILE_FILE: &str = "profile_id";

/// Optional `portal.yaml`; command-line flags win over every key.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub language: Option<Language>,
    pub cart_path: Option<PathBuf>,
    pub profile_id: Option<String>,
}

impl ConfigFile {
    /// An explicit path must exist; the default one may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG), false),
        };
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

#[derive(Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub language: Option<Language>,
    pub cart_path: Option<PathBuf>,
    pub profile_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub language: Language,
    pub cart_path: PathBuf,
    profile_id: Option<String>,
}

impl Settings {
    pub fn resolve(file: ConfigFile, flags: Overrides) -> Self {
        Self {
            base_url: flags
                .base_url
                .or(file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            language: flags.language.or(file.language).unwrap_or_default(),
            cart_path: flags
                .cart_path
                .or(file.cart_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CART)),
            profile_id: flags.profile_id.or(file.profile_id),
        }
    }

    /// Where `portal profile` remembers the id the server handed out.
    pub fn profile_path(&self) -> PathBuf {
        self.cart_path.with_file_name(PROFILE_FILE)
    }

    /// Flag or config value, else the remembered one.
    pub fn profile_id(&self) -> Option<String> {
        self.profile_id.clone().or_else(|| {
            fs::read_to_string(self.profile_path())
                .ok()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
        })
    }

    pub fn remember_profile_id(&self, profile_id: &str) -> Result<()> {
        let path = self.profile_path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&path, profile_id).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
