use crate::output::{self, Format};
use crate::settings::Settings;
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use portal_client::PortalClient;
use portal_engine::{checkout, checkout_session_request, display_image, AppState, FileCartStore};
use portal_model::{CartItem, Product, ProductQuery, SortOrder, UserLogin};
use tracing::info;

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Category filter; repeat for several
    #[arg(long = "category")]
    pub categories: Vec<String>,
    #[arg(long)]
    pub subcategory: Option<String>,
    #[arg(long)]
    pub min_price: Option<f64>,
    #[arg(long)]
    pub max_price: Option<f64>,
    /// Tag filter; repeat for several
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// relevance, price_low, price_high, rating or newest
    #[arg(long, default_value_t = SortOrder::Relevance)]
    pub sort: SortOrder,
}

impl From<FilterArgs> for ProductQuery {
    fn from(args: FilterArgs) -> Self {
        ProductQuery {
            categories: args.categories,
            subcategory: args.subcategory,
            min_price: args.min_price,
            max_price: args.max_price,
            tags: args.tags,
            sort: args.sort,
        }
    }
}

#[derive(Subcommand)]
pub enum StoreAction {
    /// Store categories and their subcategories
    Categories,
    /// Products matching the filters
    Products {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart and its total
    List {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Add one unit of a product
    Add { product_id: String },
    /// Change a line's quantity by a signed amount
    Update {
        product_id: String,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    Remove { product_id: String },
    Clear,
}

#[derive(Args)]
pub struct CheckoutCmd {
    /// Open a hosted card checkout instead of paying by card on file
    #[arg(long, default_value_t = false)]
    pub stripe: bool,
    #[arg(long, requires = "stripe")]
    pub success_url: Option<String>,
    #[arg(long, requires = "stripe")]
    pub cancel_url: Option<String>,
}

#[derive(Args)]
pub struct SessionCmd {
    #[command(subcommand)]
    pub action: SessionAction,
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Sign in with an email and password, or with the saved profile id
    Login {
        #[arg(long, requires = "password")]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    Logout,
}

pub async fn run_store(settings: &Settings, action: StoreAction) -> Result<()> {
    let client = PortalClient::new(&settings.base_url)?;
    match action {
        StoreAction::Categories => {
            let listing = client.store_categories().await?;
            for category in &listing.categories {
                let subs: Vec<String> = listing
                    .subcategories
                    .get(category)
                    .and_then(|value| value.as_array())
                    .map(|values| values.iter().map(portal_model::scalar::text).collect())
                    .unwrap_or_default();
                if subs.is_empty() {
                    println!("{}", category);
                } else {
                    println!("{}: {}", category, subs.join(", "));
                }
            }
            Ok(())
        }
        StoreAction::Products { filters, format } => {
            let products = client.products(&filters.into()).await?;
            if format == Format::Json {
                return output::print_json(&products);
            }
            let rows: Vec<Vec<String>> = products.iter().map(product_row).collect();
            output::emit(format, PRODUCT_HEADERS, &rows)
        }
    }
}

const PRODUCT_HEADERS: &[&str] = &["id", "name", "price", "discount", "rating", "image"];

fn product_row(product: &Product) -> Vec<String> {
    vec![
        product.id.clone(),
        product.name.clone(),
        format!("{:.2}", product.price),
        product
            .discount_percent()
            .map(|pct| format!("-{}%", pct))
            .unwrap_or_default(),
        format!("{} ({})", product.stars(), product.reviews_count),
        display_image(product),
    ]
}

fn open_state(settings: &Settings) -> Result<AppState> {
    let mut state = AppState::new(FileCartStore::new(&settings.cart_path))?;
    state.set_profile_id(settings.profile_id());
    state.set_language(settings.language);
    Ok(state)
}

fn cart_rows(items: &[CartItem]) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|item| {
            vec![
                item.id.clone(),
                item.name.clone(),
                item.quantity.to_string(),
                format!("{:.2}", item.price),
                format!("{:.2}", item.subtotal()),
            ]
        })
        .collect()
}

pub async fn run_cart(settings: &Settings, action: CartAction) -> Result<()> {
    let mut state = open_state(settings)?;
    match action {
        CartAction::List { format } => {
            let cart = state.cart().cart();
            if format == Format::Json {
                return output::print_json(cart.items());
            }
            if cart.is_empty() && format == Format::Text {
                println!("Your cart is empty");
                return Ok(());
            }
            output::emit(
                format,
                &["id", "name", "qty", "price", "subtotal"],
                &cart_rows(cart.items()),
            )?;
            if format == Format::Text {
                println!("\n{} items, total {:.2}", cart.count(), cart.total());
            }
            Ok(())
        }
        CartAction::Add { product_id } => {
            let client = PortalClient::new(&settings.base_url)?;
            let products = client
                .products(&ProductQuery::default())
                .await
                .context("loading products")?;
            state.set_products(products);
            if !state.add_to_cart(&product_id)? {
                bail!("no product with id {}", product_id);
            }
            print_count(&state);
            Ok(())
        }
        CartAction::Update { product_id, delta } => {
            if !state.cart_mut().update_quantity(&product_id, delta)? {
                bail!("{} is not in the cart", product_id);
            }
            print_count(&state);
            Ok(())
        }
        CartAction::Remove { product_id } => {
            if !state.cart_mut().remove(&product_id)? {
                bail!("{} is not in the cart", product_id);
            }
            print_count(&state);
            Ok(())
        }
        CartAction::Clear => {
            state.cart_mut().clear()?;
            println!("Cart cleared");
            Ok(())
        }
    }
}

fn print_count(state: &AppState) {
    let cart = state.cart().cart();
    println!("Cart: {} items, total {:.2}", cart.count(), cart.total());
}

pub async fn run_checkout(settings: &Settings, cmd: CheckoutCmd) -> Result<()> {
    let mut state = open_state(settings)?;
    let client = PortalClient::new(&settings.base_url)?;

    if cmd.stripe {
        if state.cart().cart().is_empty() {
            bail!("the cart is empty");
        }
        let products = client
            .products(&ProductQuery::default())
            .await
            .context("loading products")?;
        let request = checkout_session_request(
            state.cart().cart(),
            &products,
            cmd.success_url,
            cmd.cancel_url,
        );
        if request.line_items.is_empty() {
            bail!("none of the cart items can be paid online");
        }
        let reply = client.create_checkout_session(&request).await?;
        match (reply.url, reply.error) {
            (Some(url), _) => println!("Complete payment at {}", url),
            (None, Some(error)) => bail!("checkout session failed: {}", error),
            (None, None) => bail!("checkout session failed"),
        }
        return Ok(());
    }

    let profile_id = state.profile_id().map(str::to_string);
    let receipt = checkout(&client, state.cart_mut(), profile_id.as_deref()).await?;
    info!("order {} placed", receipt.order_id);
    println!(
        "Order {} paid: {:.2}{}",
        receipt.order_id,
        receipt.amount,
        receipt
            .payment_id
            .map(|id| format!(" (payment {})", id))
            .unwrap_or_default()
    );
    Ok(())
}

pub async fn run_session(settings: &Settings, cmd: SessionCmd) -> Result<()> {
    let client = PortalClient::new(&settings.base_url)?;
    match cmd.action {
        SessionAction::Login { email, password } => {
            let login = match (email, password) {
                (Some(email), Some(password)) => UserLogin::Password { email, password },
                _ => match settings.profile_id() {
                    Some(profile_id) => UserLogin::Profile { profile_id },
                    None => bail!("no saved profile; pass --email and --password"),
                },
            };
            let reply = client.user_login(&login).await?;
            if let Some(error) = reply.error {
                bail!("{}", error);
            }
            if let Some(user_id) = reply.user_id {
                settings.remember_profile_id(&user_id)?;
            }
            println!("Signed in");
        }
        SessionAction::Logout => {
            client.user_logout().await?;
            println!("Signed out");
        }
    }
    Ok(())
}
