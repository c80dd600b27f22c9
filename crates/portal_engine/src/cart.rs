use crate::catalog::display_image;
use anyhow::{Context, Result};
use portal_client::{ApiError, PortalClient};
use portal_model::{
    CartItem, CheckoutSessionRequest, LineItem, OrderRequest, PaymentRequest, Product,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{info, warn};

pub const PAYMENT_METHOD: &str = "card";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn from_items(items: Vec<CartItem>) -> Self {
        Self {
            items: items.into_iter().filter(|item| item.quantity > 0).collect(),
        }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One more of `product`; new lines start at quantity 1.
    pub fn add(&mut self, product: &Product) {
        match self.items.iter_mut().find(|item| item.id == product.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(CartItem {
                id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                image: Some(display_image(product)),
                quantity: 1,
            }),
        }
    }

    /// Adjusts a line by `delta`, dropping it at zero or below. Unknown ids
    /// are ignored. Returns whether anything changed.
    pub fn update_quantity(&mut self, id: &str, delta: i64) -> bool {
        let Some(pos) = self.items.iter().position(|item| item.id == id) else {
            return false;
        };
        let next = i64::from(self.items[pos].quantity) + delta;
        if next <= 0 {
            self.items.remove(pos);
        } else {
            self.items[pos].quantity = u32::try_from(next).unwrap_or(u32::MAX);
        }
        true
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        before != self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of units across all lines.
    pub fn count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, item| count.saturating_add(item.quantity))
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }
}

pub trait CartStore: Send + Sync {
    fn load(&self) -> Result<Cart>;
    fn save(&self, cart: &Cart) -> Result<()>;
}

/// Cart kept as a JSON array on disk.
#[derive(Debug, Clone)]
pub struct FileCartStore {
    path: PathBuf,
}

impl FileCartStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStore for FileCartStore {
    /// A missing or unreadable file is an empty cart.
    fn load(&self) -> Result<Cart> {
        if !self.path.exists() {
            return Ok(Cart::default());
        }
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) => {
                warn!(target: "engine::cart", "cannot read cart {:?}: {}", self.path, err);
                return Ok(Cart::default());
            }
        };
        match serde_json::from_str::<Vec<CartItem>>(&content) {
            Ok(items) => Ok(Cart::from_items(items)),
            Err(err) => {
                warn!(target: "engine::cart", "discarding corrupt cart {:?}: {}", self.path, err);
                Ok(Cart::default())
            }
        }
    }

    fn save(&self, cart: &Cart) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let body = serde_json::to_string_pretty(cart.items())?;
        fs::write(&self.path, body).with_context(|| format!("writing cart {:?}", self.path))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    saved: Mutex<Vec<CartItem>>,
}

impl InMemoryCartStore {
    pub fn saved(&self) -> Vec<CartItem> {
        self.saved.lock().map(|items| items.clone()).unwrap_or_default()
    }
}

impl CartStore for InMemoryCartStore {
    fn load(&self) -> Result<Cart> {
        Ok(Cart::from_items(self.saved()))
    }

    fn save(&self, cart: &Cart) -> Result<()> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| anyhow::anyhow!("cart store lock poisoned"))?;
        *saved = cart.items().to_vec();
        Ok(())
    }
}

/// A cart that is written back to its store after every change.
pub struct CartSession {
    cart: Cart,
    store: Box<dyn CartStore>,
}

impl CartSession {
    pub fn open(store: impl CartStore + 'static) -> Result<Self> {
        let cart = store.load()?;
        Ok(Self {
            cart,
            store: Box::new(store),
        })
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn add(&mut self, product: &Product) -> Result<()> {
        self.cart.add(product);
        info!(target: "engine::cart", "{} added to cart", product.name);
        self.persist()
    }

    pub fn update_quantity(&mut self, id: &str, delta: i64) -> Result<bool> {
        let changed = self.cart.update_quantity(id, delta);
        if changed {
            self.persist()?;
        }
        Ok(changed)
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let changed = self.cart.remove(id);
        if changed {
            self.persist()?;
        }
        Ok(changed)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.cart.clear();
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.cart)
    }
}

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("a profile is required before checkout")]
    ProfileRequired,
    #[error("the cart is empty")]
    EmptyCart,
    #[error("order was not accepted: {0}")]
    OrderRejected(String),
    #[error("payment was not accepted: {0}")]
    PaymentRejected(String),
    #[error("checkout failed: {0}")]
    Api(#[from] ApiError),
    #[error("cart could not be saved: {0}")]
    Persist(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub order_id: String,
    pub payment_id: Option<String>,
    pub amount: f64,
}

/// Places an order for the cart, records the card payment and empties the
/// cart once the payment is accepted.
pub async fn checkout(
    client: &PortalClient,
    session: &mut CartSession,
    profile_id: Option<&str>,
) -> Result<Receipt, CheckoutError> {
    let user_id = profile_id
        .filter(|id| !id.is_empty())
        .ok_or(CheckoutError::ProfileRequired)?
        .to_string();
    if session.cart().is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let items = session.cart().items().to_vec();
    let amount = session.cart().total();

    let order = client
        .create_order(&OrderRequest {
            user_id: user_id.clone(),
            items: items.clone(),
            total_amount: amount,
            payment_method: PAYMENT_METHOD.to_string(),
        })
        .await?;
    let order_id = match (order.is_ok(), order.order_id) {
        (true, Some(order_id)) => order_id,
        (_, _) => return Err(CheckoutError::OrderRejected(rejection(&order.error, &order.status))),
    };

    let payment = client
        .record_payment(&PaymentRequest {
            order_id: order_id.clone(),
            user_id,
            amount,
            method: PAYMENT_METHOD.to_string(),
            items,
        })
        .await?;
    if !payment.is_ok() {
        return Err(CheckoutError::PaymentRejected(rejection(
            &payment.error,
            &payment.status,
        )));
    }

    session.clear()?;
    info!(target: "engine::cart", "order {} paid ({:.2})", order_id, amount);
    Ok(Receipt {
        order_id,
        payment_id: payment.payment_id,
        amount,
    })
}

fn rejection(error: &Option<String>, status: &Option<String>) -> String {
    error
        .clone()
        .or_else(|| status.clone())
        .unwrap_or_else(|| "no status".to_string())
}

/// Hosted checkout request for every cart line that carries a price id.
pub fn checkout_session_request(
    cart: &Cart,
    products: &[Product],
    success_url: Option<String>,
    cancel_url: Option<String>,
) -> CheckoutSessionRequest {
    let line_items = cart
        .items()
        .iter()
        .filter_map(|item| {
            let product = products.iter().find(|product| product.id == item.id)?;
            let price = product.stripe_price_id.clone()?;
            Some(LineItem {
                price,
                quantity: item.quantity,
            })
        })
        .collect();
    CheckoutSessionRequest {
        line_items,
        success_url,
        cancel_url,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn product(id: &str, price: f64) -> Product {
        Product {
            id: id.into(),
            name: format!("Item {}", id),
            price,
            ..Default::default()
        }
    }

    #[test]
    fn add_increments_existing_line() {
        let mut cart = Cart::default();
        cart.add(&product("a", 100.0));
        cart.add(&product("a", 100.0));
        cart.add(&product("b", 50.0));
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.get("a").unwrap().quantity, 2);
        assert_eq!(cart.count(), 3);
        assert_eq!(cart.total(), 250.0);
    }

    #[test]
    fn quantities_saturate_instead_of_wrapping() {
        let line = |id: &str| CartItem {
            id: id.into(),
            name: id.into(),
            price: 1.0,
            image: None,
            quantity: u32::MAX,
        };
        let mut cart = Cart::from_items(vec![line("a"), line("b")]);
        cart.add(&product("a", 1.0));
        assert_eq!(cart.get("a").unwrap().quantity, u32::MAX);
        assert_eq!(cart.count(), u32::MAX);
    }

    #[test]
    fn new_line_uses_placeholder_image() {
        let mut cart = Cart::default();
        cart.add(&product("a", 1.0));
        assert_eq!(
            cart.get("a").unwrap().image.as_deref(),
            Some(crate::catalog::placeholder_image("a", 0))
        );
    }

    #[test]
    fn quantity_at_zero_removes_line() {
        let mut cart = Cart::default();
        cart.add(&product("a", 10.0));
        cart.add(&product("a", 10.0));
        assert!(cart.update_quantity("a", -1));
        assert_eq!(cart.get("a").unwrap().quantity, 1);
        assert!(cart.update_quantity("a", -1));
        assert!(cart.get("a").is_none());
        assert!(!cart.update_quantity("missing", 1));
    }

    #[test]
    fn session_persists_each_change() {
        struct Shared(Arc<InMemoryCartStore>);
        impl CartStore for Shared {
            fn load(&self) -> Result<Cart> {
                self.0.load()
            }
            fn save(&self, cart: &Cart) -> Result<()> {
                self.0.save(cart)
            }
        }

        let store = Arc::new(InMemoryCartStore::default());
        let mut session = CartSession::open(Shared(store.clone())).unwrap();
        session.add(&product("a", 5.0)).unwrap();
        assert_eq!(store.saved().len(), 1);
        session.update_quantity("a", 2).unwrap();
        assert_eq!(store.saved()[0].quantity, 3);
        session.remove("a").unwrap();
        assert!(store.saved().is_empty());
    }

    #[test]
    fn file_store_round_trip_and_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state/cart.json");
        let store = FileCartStore::new(&path);
        assert!(store.load().unwrap().is_empty());

        let mut cart = Cart::default();
        cart.add(&product("a", 2.5));
        store.save(&cart).unwrap();
        assert_eq!(store.load().unwrap(), cart);

        fs::write(&path, "{not json").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn session_request_skips_lines_without_price_id() {
        let mut with_price = product("a", 10.0);
        with_price.stripe_price_id = Some("price_1".into());
        let plain = product("b", 5.0);
        let mut cart = Cart::default();
        cart.add(&with_price);
        cart.add(&with_price);
        cart.add(&plain);

        let request = checkout_session_request(&cart, &[with_price, plain], None, None);
        assert_eq!(request.line_items.len(), 1);
        assert_eq!(request.line_items[0].price, "price_1");
        assert_eq!(request.line_items[0].quantity, 2);
    }
}
