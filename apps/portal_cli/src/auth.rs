use crate::settings::Settings;
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use portal_client::{ApiError, PortalClient};
use portal_security::{AdminCredential, CredentialStore, KeyringStore};
use std::io::{self, BufRead, Write};
use tracing::warn;

/// Admin login; anything not given here comes from the keychain or a prompt.
#[derive(Args, Debug, Clone, Default)]
pub struct AdminArgs {
    #[arg(long, global = true, env = "PORTAL_ADMIN_USER")]
    pub username: Option<String>,
    #[arg(long, global = true, env = "PORTAL_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct CredsCmd {
    #[command(subcommand)]
    pub action: CredsAction,
}

#[derive(Subcommand)]
pub enum CredsAction {
    /// Save the admin login in the OS keychain
    Set {
        #[arg(long)]
        username: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Print the saved admin username
    Show,
    /// Forget the saved admin login
    Clear,
}

pub async fn run_creds(settings: &Settings, cmd: CredsCmd) -> Result<()> {
    let store = KeyringStore::default();
    let account = settings.base_url.as_str();
    match cmd.action {
        CredsAction::Set { username, password } => {
            let password = match password {
                Some(password) => password,
                None => rpassword::prompt_password(format!("Password for {}: ", username))?,
            };
            store
                .store(account, &AdminCredential { username, password })
                .await?;
            println!("Stored admin login for {}", account);
        }
        CredsAction::Show => match store.resolve(account).await? {
            Some(credential) => println!("{} ({})", credential.username, account),
            None => println!("No admin login stored for {}", account),
        },
        CredsAction::Clear => {
            store.remove(account).await?;
            println!("Removed admin login for {}", account);
        }
    }
    Ok(())
}

/// Checks an admin login against the server and closes the session again.
pub async fn run_login(settings: &Settings, args: AdminArgs, save: bool) -> Result<()> {
    let client = PortalClient::new(&settings.base_url)?;
    let credential = resolve_credential(settings, &args).await?;
    login(&client, &credential).await?;
    if save {
        KeyringStore::default()
            .store(&settings.base_url, &credential)
            .await?;
    }
    client.admin_logout().await.context("logging out")?;
    println!("Logged in to {} as {}", settings.base_url, credential.username);
    Ok(())
}

/// A client holding a live admin session.
pub async fn admin_client(settings: &Settings, args: &AdminArgs) -> Result<PortalClient> {
    let client = PortalClient::new(&settings.base_url)?;
    let credential = resolve_credential(settings, args).await?;
    login(&client, &credential).await?;
    Ok(client)
}

async fn login(client: &PortalClient, credential: &AdminCredential) -> Result<()> {
    match client
        .admin_login(&credential.username, &credential.password)
        .await
    {
        Ok(()) => Ok(()),
        Err(ApiError::LoginFailed) => bail!("Login failed. Please check your credentials."),
        Err(err) => Err(err).context("admin login"),
    }
}

async fn resolve_credential(settings: &Settings, args: &AdminArgs) -> Result<AdminCredential> {
    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        return Ok(AdminCredential {
            username: username.clone(),
            password: password.clone(),
        });
    }
    match KeyringStore::default().resolve(&settings.base_url).await {
        Ok(Some(saved)) if args.username.as_ref().map_or(true, |u| *u == saved.username) => {
            return Ok(saved)
        }
        Ok(_) => {}
        Err(err) => warn!("keychain unavailable: {:#}", err),
    }
    let username = match &args.username {
        Some(username) => username.clone(),
        None => prompt_line("Admin username: ")?,
    };
    let password = rpassword::prompt_password(format!("Password for {}: ", username))?;
    Ok(AdminCredential { username, password })
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim().to_string();
    if line.is_empty() {
        bail!("an admin username is required");
    }
    Ok(line)
}
