mod auth;
mod dashboard;
mod export;
mod index;
mod output;
mod public;
mod records;
mod settings;
mod store;
mod tui;

use anyhow::Result;
use auth::AdminArgs;
use clap::{Parser, Subcommand};
use portal_model::Language;
use settings::{ConfigFile, Overrides, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portal", about = "Citizen services portal client")]
struct Cli {
    /// Portal server root
    #[arg(long, global = true, env = "PORTAL_BASE_URL")]
    base_url: Option<String>,
    /// YAML settings file (defaults to ./portal.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Content language: en, si or ta
    #[arg(long, global = true)]
    lang: Option<Language>,
    /// Where the cart is kept between runs
    #[arg(long, global = true, env = "PORTAL_CART")]
    cart: Option<PathBuf>,
    #[arg(long, global = true, env = "PORTAL_PROFILE_ID")]
    profile_id: Option<String>,
    /// Emit logs as JSON lines
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    #[command(flatten)]
    admin: AdminArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the service directory and read answers
    Browse(public::BrowseCmd),
    /// Suggest services for a partial query
    Search { query: String },
    /// Ask the AI assistant
    Ask { question: String },
    /// Public announcements
    Announcements {
        /// Record a click on this announcement
        #[arg(long)]
        click: Option<String>,
    },
    /// Save your citizen profile
    Profile(public::ProfileCmd),
    /// Browse the store
    Store {
        #[command(subcommand)]
        action: store::StoreAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: store::CartAction,
    },
    /// Pay for the cart
    Checkout(store::CheckoutCmd),
    /// Citizen sign-in for the store
    Session(store::SessionCmd),
    /// Check an admin login
    Login {
        /// Also save the login in the OS keychain
        #[arg(long, default_value_t = false)]
        save: bool,
    },
    /// Manage the admin login kept in the OS keychain
    Creds(auth::CredsCmd),
    /// Admin analytics dashboard
    Dashboard(dashboard::DashboardCmd),
    /// Build and inspect the AI search index
    Index {
        #[command(subcommand)]
        action: index::IndexAction,
    },
    /// Manage announcements
    Ads {
        #[command(subcommand)]
        action: records::AdAction,
    },
    /// Manage service categories
    Categories {
        #[command(subcommand)]
        action: records::CategoryAction,
    },
    /// Manage officers
    Officers {
        #[command(subcommand)]
        action: records::OfficerAction,
    },
    /// Manage services
    Services {
        #[command(subcommand)]
        action: records::ServiceAction,
    },
    /// Download a CSV report
    Export(export::ExportCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let settings = Settings::resolve(
        ConfigFile::load(cli.config.as_deref())?,
        Overrides {
            base_url: cli.base_url,
            language: cli.lang,
            cart_path: cli.cart,
            profile_id: cli.profile_id,
        },
    );
    let admin = cli.admin;

    match cli.command {
        Commands::Browse(cmd) => public::browse(&settings, cmd).await?,
        Commands::Search { query } => public::search(&settings, &query).await?,
        Commands::Ask { question } => public::ask(&settings, &question).await?,
        Commands::Announcements { click } => public::announcements(&settings, click).await?,
        Commands::Profile(cmd) => public::profile(&settings, cmd).await?,
        Commands::Store { action } => store::run_store(&settings, action).await?,
        Commands::Cart { action } => store::run_cart(&settings, action).await?,
        Commands::Checkout(cmd) => store::run_checkout(&settings, cmd).await?,
        Commands::Session(cmd) => store::run_session(&settings, cmd).await?,
        Commands::Login { save } => auth::run_login(&settings, admin, save).await?,
        Commands::Creds(cmd) => auth::run_creds(&settings, cmd).await?,
        Commands::Dashboard(cmd) => dashboard::run(&settings, &admin, cmd).await?,
        Commands::Index { action } => index::run(&settings, &admin, action).await?,
        Commands::Ads { action } => records::run_ads(&settings, &admin, action).await?,
        Commands::Categories { action } => {
            records::run_categories(&settings, &admin, action).await?
        }
        Commands::Officers { action } => records::run_officers(&settings, &admin, action).await?,
        Commands::Services { action } => records::run_services(&settings, &admin, action).await?,
        Commands::Export(cmd) => export::run(&settings, &admin, cmd).await?,
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
