use crate::cart::{CartSession, CartStore};
use crate::catalog::Catalog;
use crate::charts::ChartRegistry;
use crate::directory::DirectoryState;
use anyhow::Result;
use portal_model::{Language, Product, ProductQuery};

/// Everything a front-end session holds between requests. Each piece is
/// reached through an accessor; mutations go through the setters below or
/// the owned component's own methods.
pub struct AppState {
    cart: CartSession,
    catalog: Catalog,
    profile_id: Option<String>,
    directory: DirectoryState,
    charts: ChartRegistry,
}

impl AppState {
    pub fn new(cart_store: impl CartStore + 'static) -> Result<Self> {
        Ok(Self {
            cart: CartSession::open(cart_store)?,
            catalog: Catalog::default(),
            profile_id: None,
            directory: DirectoryState::default(),
            charts: ChartRegistry::default(),
        })
    }

    pub fn cart(&self) -> &CartSession {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartSession {
        &mut self.cart
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn set_products(&mut self, products: Vec<Product>) {
        self.catalog.set_products(products);
    }

    pub fn set_filters(&mut self, filters: ProductQuery) {
        self.catalog.set_filters(filters);
    }

    pub fn profile_id(&self) -> Option<&str> {
        self.profile_id.as_deref()
    }

    /// Blank ids clear the profile.
    pub fn set_profile_id(&mut self, profile_id: Option<String>) {
        self.profile_id = profile_id.filter(|id| !id.trim().is_empty());
    }

    pub fn directory(&self) -> &DirectoryState {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut DirectoryState {
        &mut self.directory
    }

    pub fn set_language(&mut self, language: Language) {
        self.directory.set_language(language);
    }

    pub fn charts(&self) -> &ChartRegistry {
        &self.charts
    }

    pub fn charts_mut(&mut self) -> &mut ChartRegistry {
        &mut self.charts
    }

    /// Adds a product from the current listing to the cart.
    pub fn add_to_cart(&mut self, product_id: &str) -> Result<bool> {
        let Some(product) = self.catalog.find(product_id).cloned() else {
            return Ok(false);
        };
        self.cart.add(&product)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::InMemoryCartStore;

    #[test]
    fn add_to_cart_uses_current_listing() {
        let mut state = AppState::new(InMemoryCartStore::default()).unwrap();
        state.set_products(vec![Product {
            id: "p1".into(),
            name: "Solar lamp".into(),
            price: 12.5,
            ..Default::default()
        }]);

        assert!(state.add_to_cart("p1").unwrap());
        assert!(state.add_to_cart("p1").unwrap());
        assert!(!state.add_to_cart("missing").unwrap());
        assert_eq!(state.cart().cart().count(), 2);
        assert_eq!(state.cart().cart().total(), 25.0);
    }

    #[test]
    fn blank_profile_id_is_cleared() {
        let mut state = AppState::new(InMemoryCartStore::default()).unwrap();
        state.set_profile_id(Some("abc".into()));
        assert_eq!(state.profile_id(), Some("abc"));
        state.set_profile_id(Some("  ".into()));
        assert_eq!(state.profile_id(), None);
    }
}
