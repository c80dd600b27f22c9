use crate::output::{self, Format};
use crate::settings::Settings;
use anyhow::{bail, Context, Result};
use clap::Args;
use portal_client::PortalClient;
use portal_engine::{chat, engagement, DirectoryState, ProfileForm};
use tracing::warn;

#[derive(Args)]
pub struct BrowseCmd {
    /// Service category id
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub ministry: Option<String>,
    /// Subservice id
    #[arg(long)]
    pub service: Option<String>,
    /// Question number as listed (1-based)
    #[arg(long)]
    pub question: Option<usize>,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

/// Walks the service directory one level per flag; a question prints its
/// answer and is recorded as a direct click.
pub async fn browse(settings: &Settings, cmd: BrowseCmd) -> Result<()> {
    let client = PortalClient::new(&settings.base_url)?;
    let categories = client.services().await.context("loading services")?;
    let mut directory = DirectoryState::new(categories);
    directory.set_language(settings.language);
    let lang = directory.language();

    let Some(category) = cmd.category else {
        let rows: Vec<Vec<String>> = directory
            .categories()
            .iter()
            .map(|sc| vec![sc.id.clone(), sc.name.localized(lang).to_string()])
            .collect();
        return output::emit(cmd.format, &["id", "category"], &rows);
    };
    directory.select_super_category(&category)?;

    let Some(ministry) = cmd.ministry else {
        let rows: Vec<Vec<String>> = directory
            .ministries()
            .unwrap_or_default()
            .iter()
            .map(|m| vec![m.id.clone(), m.name.localized(lang).to_string()])
            .collect();
        return output::emit(cmd.format, &["id", "ministry"], &rows);
    };
    directory.select_ministry(&ministry)?;

    let Some(service) = cmd.service else {
        let rows: Vec<Vec<String>> = directory
            .subservices()
            .unwrap_or_default()
            .iter()
            .map(|s| vec![s.id.clone(), s.name.localized(lang).to_string()])
            .collect();
        return output::emit(cmd.format, &["id", "service"], &rows);
    };
    directory.select_subservice(&service)?;

    let Some(number) = cmd.question else {
        let rows: Vec<Vec<String>> = directory
            .questions()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(idx, q)| vec![(idx + 1).to_string(), q.q.localized(lang).to_string()])
            .collect();
        return output::emit(cmd.format, &["#", "question"], &rows);
    };
    if number == 0 {
        bail!("questions are numbered from 1");
    }
    directory.select_question(number - 1)?;

    let profile_id = settings.profile_id();
    let (view, event) = directory.answer_view(profile_id.as_deref())?;
    if let Err(err) = client.log_engagement(&event).await {
        warn!("failed to record engagement: {}", err);
    }
    if profile_id.is_none() {
        println!("Tip: run `portal profile` to personalise the portal.\n");
    }

    if cmd.format == Format::Json {
        return output::print_json(&view);
    }
    println!("{}\n", view.question);
    println!("{}", view.answer);
    if !view.downloads.is_empty() {
        println!("\nDownloads:");
        for download in &view.downloads {
            println!("  {}  {}", download.file_name, download.url);
        }
    }
    if let Some(location) = &view.location {
        println!("\nView Map: {}", location);
    }
    if let Some(instructions) = &view.instructions {
        println!("\nInstructions: {}", instructions);
    }
    println!(
        "\nView all services of {}: {}{}",
        view.ministry, settings.base_url, view.ministry_link
    );
    Ok(())
}

/// Prints autosuggest hits for a partial query.
pub async fn search(settings: &Settings, query: &str) -> Result<()> {
    let client = PortalClient::new(&settings.base_url)?;
    let hits = chat::suggest(&client, query).await;
    if hits.is_empty() {
        println!("No suggestions");
        return Ok(());
    }
    for hit in hits {
        let name = hit.name.localized(settings.language);
        let group = hit.group().localized(settings.language);
        let kind = hit.kind.as_deref().unwrap_or("service");
        if group.is_empty() {
            println!("{} ({})", name, kind);
        } else {
            println!("{} ({}, {})", name, group, kind);
        }
    }
    Ok(())
}

pub async fn ask(settings: &Settings, question: &str) -> Result<()> {
    let client = PortalClient::new(&settings.base_url)?;
    let profile_id = settings.profile_id();
    match chat::ask(&client, question, profile_id.as_deref()).await {
        Ok(reply) => {
            println!("{}", reply.answer);
            Ok(())
        }
        Err(err) => {
            warn!("{:#}", err);
            bail!(chat::ASSISTANT_UNAVAILABLE)
        }
    }
}

/// Public announcements; `click` records an ad click first.
pub async fn announcements(settings: &Settings, click: Option<String>) -> Result<()> {
    let client = PortalClient::new(&settings.base_url)?;
    if let Some(ad_id) = click {
        let profile_id = settings.profile_id();
        client
            .log_engagement(&engagement::ad_click(ad_id.clone(), profile_id.as_deref()))
            .await
            .context("recording ad click")?;
        println!("Recorded click on {}", ad_id);
        return Ok(());
    }
    let ads = match client.public_ads().await {
        Ok(ads) => ads,
        Err(err) => {
            warn!("{}", err);
            bail!("Failed to load announcements.");
        }
    };
    if ads.is_empty() {
        println!("No announcements available.");
    }
    for ad in ads {
        println!("[{}] {}", ad.id, ad.title.localized(settings.language));
        let body = ad.body.localized(settings.language);
        if !body.is_empty() {
            println!("    {}", body);
        }
    }
    Ok(())
}

#[derive(Args)]
pub struct ProfileCmd {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub age: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub job: String,
    /// What you would like help with
    #[arg(long)]
    pub desire: String,
}

/// Submits the citizen profile and remembers the id the server returns.
pub async fn profile(settings: &Settings, cmd: ProfileCmd) -> Result<()> {
    let form = ProfileForm {
        name: cmd.name,
        age: cmd.age,
        email: cmd.email,
        phone: cmd.phone,
        job: cmd.job,
        desire: cmd.desire,
    };
    let submission = form.validate()?;
    let client = PortalClient::new(&settings.base_url)?;
    let current = settings.profile_id();
    let profile_id = client
        .submit_profile(current.as_deref(), &submission)
        .await
        .context("Failed to save your profile. Please try again.")?;
    match profile_id {
        Some(id) => {
            settings.remember_profile_id(&id)?;
            println!("Profile saved ({})", id);
        }
        None => println!("Profile saved"),
    }
    Ok(())
}
