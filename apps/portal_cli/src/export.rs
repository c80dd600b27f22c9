use crate::auth::{admin_client, AdminArgs};
use crate::settings::Settings;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use portal_client::admin::ExportKind;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportTarget {
    Engagements,
    Profiles,
}

impl From<ExportTarget> for ExportKind {
    fn from(target: ExportTarget) -> Self {
        match target {
            ExportTarget::Engagements => ExportKind::Engagements,
            ExportTarget::Profiles => ExportKind::Profiles,
        }
    }
}

#[derive(Args)]
pub struct ExportCmd {
    #[arg(value_enum)]
    pub target: ExportTarget,
    /// Destination file (engagements.csv / profiles.csv when omitted)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Downloads one of the admin CSV reports to a file.
pub async fn run(settings: &Settings, admin: &AdminArgs, cmd: ExportCmd) -> Result<()> {
    let kind = ExportKind::from(cmd.target);
    let client = admin_client(settings, admin).await?;
    let bytes = client
        .export(kind)
        .await
        .with_context(|| format!("downloading {}", kind.default_file_name()))?;
    let out = cmd
        .out
        .unwrap_or_else(|| PathBuf::from(kind.default_file_name()));
    fs::write(&out, &bytes).with_context(|| format!("writing {}", out.display()))?;
    println!("Wrote {} bytes to {}", bytes.len(), out.display());
    Ok(())
}
