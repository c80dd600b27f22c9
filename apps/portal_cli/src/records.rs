use crate::auth::{admin_client, AdminArgs};
use crate::output::{self, Format};
use crate::settings::Settings;
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use portal_client::PortalClient;
use portal_engine::forms::{self, OfficerForm, ServiceForm};
use portal_model::{Language, StatusReply};
use std::fs;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum AdAction {
    /// List announcements
    List {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Create or update an announcement
    Save {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum CategoryAction {
    List {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    Save {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum OfficerAction {
    List {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    Save {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        role: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ServiceAction {
    List {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Create or update a service (super-category)
    Save {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name_en: String,
        #[arg(long, default_value = "")]
        name_si: String,
        #[arg(long, default_value = "")]
        name_ta: String,
        /// File holding the subservices JSON array
        #[arg(long)]
        subservices: Option<PathBuf>,
    },
    Delete {
        #[arg(long)]
        id: String,
    },
}

pub async fn run_ads(settings: &Settings, admin: &AdminArgs, action: AdAction) -> Result<()> {
    let client = admin_client(settings, admin).await?;
    match action {
        AdAction::List { format } => {
            list(&client, Collection::Ads, settings.language, format).await
        }
        AdAction::Save { id, title, body } => {
            let ad = forms::ad(&id, &title, &body)?;
            report(&client.save_ad(&ad).await?, &format!("Ad \"{}\" saved", ad.id))
        }
        AdAction::Delete { id } => {
            report(&client.delete_ad(&id).await?, &format!("Ad \"{}\" deleted", id))
        }
    }
}

pub async fn run_categories(
    settings: &Settings,
    admin: &AdminArgs,
    action: CategoryAction,
) -> Result<()> {
    let client = admin_client(settings, admin).await?;
    match action {
        CategoryAction::List { format } => {
            list(&client, Collection::Categories, settings.language, format).await
        }
        CategoryAction::Save { id, name } => {
            let category = forms::category(&id, &name)?;
            report(
                &client.save_category(&category).await?,
                &format!("Category \"{}\" saved", category.id),
            )
        }
        CategoryAction::Delete { id } => report(
            &client.delete_category(&id).await?,
            &format!("Category \"{}\" deleted", id),
        ),
    }
}

pub async fn run_officers(
    settings: &Settings,
    admin: &AdminArgs,
    action: OfficerAction,
) -> Result<()> {
    let client = admin_client(settings, admin).await?;
    match action {
        OfficerAction::List { format } => {
            list(&client, Collection::Officers, settings.language, format).await
        }
        OfficerAction::Save {
            id,
            name,
            role,
            email,
            phone,
        } => {
            let officer = OfficerForm {
                id,
                name,
                role,
                email,
                phone,
            }
            .validate()?;
            report(
                &client.save_officer(&officer).await?,
                &format!("Officer \"{}\" saved", officer.id),
            )
        }
        OfficerAction::Delete { id } => report(
            &client.delete_officer(&id).await?,
            &format!("Officer \"{}\" deleted", id),
        ),
    }
}

pub async fn run_services(
    settings: &Settings,
    admin: &AdminArgs,
    action: ServiceAction,
) -> Result<()> {
    let client = admin_client(settings, admin).await?;
    match action {
        ServiceAction::List { format } => {
            list(&client, Collection::Services, settings.language, format).await
        }
        ServiceAction::Save {
            id,
            name_en,
            name_si,
            name_ta,
            subservices,
        } => {
            let subservices_json = match subservices {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => String::new(),
            };
            let record = ServiceForm {
                id,
                name_en,
                name_si,
                name_ta,
                subservices_json,
            }
            .validate()?;
            report(
                &client.save_service_record(&record).await?,
                &format!("Service \"{}\" saved successfully!", record.id),
            )
        }
        ServiceAction::Delete { id } => report(
            &client.delete_service_record(&id).await?,
            &format!("Service \"{}\" deleted successfully!", id),
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Ads,
    Categories,
    Officers,
    Services,
}

fn report(reply: &StatusReply, done: &str) -> Result<()> {
    if let Some(error) = &reply.error {
        bail!("{}", error);
    }
    println!("{}", done);
    Ok(())
}

async fn list(
    client: &PortalClient,
    collection: Collection,
    language: Language,
    format: Format,
) -> Result<()> {
    match collection {
        Collection::Ads => {
            let ads = client.list_ads().await?;
            if format == Format::Json {
                return output::print_json(&ads);
            }
            let rows: Vec<Vec<String>> = ads
                .iter()
                .map(|ad| {
                    vec![
                        ad.id.clone(),
                        ad.title.localized(language).to_string(),
                        ad.body.localized(language).to_string(),
                    ]
                })
                .collect();
            output::emit(format, &["id", "title", "body"], &rows)
        }
        Collection::Categories => {
            let categories = client.list_categories().await?;
            if format == Format::Json {
                return output::print_json(&categories);
            }
            let rows: Vec<Vec<String>> = categories
                .iter()
                .map(|c| vec![c.id.clone(), c.name.localized(language).to_string()])
                .collect();
            output::emit(format, &["id", "name"], &rows)
        }
        Collection::Officers => {
            let officers = client.list_officers().await?;
            if format == Format::Json {
                return output::print_json(&officers);
            }
            let rows: Vec<Vec<String>> = officers
                .iter()
                .map(|o| {
                    vec![
                        o.id.clone(),
                        o.name.clone(),
                        o.role.clone().unwrap_or_default(),
                        o.email().unwrap_or_default().to_string(),
                        o.phone().unwrap_or_default().to_string(),
                    ]
                })
                .collect();
            output::emit(format, &["id", "name", "role", "email", "phone"], &rows)
        }
        Collection::Services => {
            let services = client.list_service_records().await?;
            if format == Format::Json {
                return output::print_json(&services);
            }
            let rows: Vec<Vec<String>> = services
                .iter()
                .map(|s| {
                    vec![
                        s.id.clone(),
                        s.name.localized(language).to_string(),
                        s.ministries.len().to_string(),
                    ]
                })
                .collect();
            output::emit(format, &["id", "name", "ministries"], &rows)
        }
    }
}
