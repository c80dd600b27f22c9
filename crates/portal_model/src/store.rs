use crate::scalar;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, deserialize_with = "scalar::text_or_empty")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "scalar::number_or_zero")]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "scalar::number_or_zero")]
    pub rating: f64,
    #[serde(default, deserialize_with = "scalar::count_or_zero")]
    pub reviews_count: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub delivery_options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_price_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Percentage saved against `original_price`, if one is listed.
    pub fn discount_percent(&self) -> Option<i64> {
        self.original_price
            .filter(|original| *original > 0.0)
            .map(|original| ((1.0 - self.price / original) * 100.0).round() as i64)
    }

    /// Whole stars out of five for the rating column.
    pub fn stars(&self) -> String {
        let full = (self.rating.max(0.0).floor() as usize).min(5);
        format!("{}{}", "★".repeat(full), "☆".repeat(5 - full))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreCategories {
    pub categories: Vec<String>,
    pub subcategories: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Relevance,
    PriceLow,
    PriceHigh,
    Rating,
    Newest,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Relevance => "relevance",
            SortOrder::PriceLow => "price_low",
            SortOrder::PriceHigh => "price_high",
            SortOrder::Rating => "rating",
            SortOrder::Newest => "newest",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relevance" | "" => Ok(SortOrder::Relevance),
            "price_low" | "price-low" => Ok(SortOrder::PriceLow),
            "price_high" | "price-high" => Ok(SortOrder::PriceHigh),
            "rating" => Ok(SortOrder::Rating),
            "newest" => Ok(SortOrder::Newest),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filters for `GET /api/store/products`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductQuery {
    pub categories: Vec<String>,
    pub subcategory: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub tags: Vec<String>,
    pub sort: SortOrder,
}

impl ProductQuery {
    /// Query pairs in the order the store endpoint documents them.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.categories.is_empty() {
            pairs.push(("category", self.categories.join(",")));
        }
        if let Some(sub) = self.subcategory.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("subcategory", sub.to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("min_price", format_price(min)));
        }
        if let Some(max) = self.max_price {
            pairs.push(("max_price", format_price(max)));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.join(",")));
        }
        pairs.push(("sort", self.sort.as_str().to_string()));
        pairs
    }
}

fn format_price(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub user_id: String,
    pub items: Vec<CartItem>,
    pub total_amount: f64,
    pub payment_method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub order_id: String,
    pub user_id: String,
    pub amount: f64,
    pub method: String,
    pub items: Vec<CartItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub price: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub line_items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub price_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub success_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub cancel_url: Option<String>,
}

/// Generic `{status, ...}` acknowledgement used by store and profile calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusReply {
    pub status: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub order_id: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub payment_id: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub profile_id: Option<String>,
    #[serde(deserialize_with = "scalar::opt_text")]
    pub user_id: Option<String>,
    pub url: Option<String>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl StatusReply {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserLogin {
    Password { email: String, password: String },
    Profile { profile_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn product_ids_accept_numbers() {
        let product: Product =
            serde_json::from_value(json!({"id": 7, "name": "Kettle", "price": 4500})).unwrap();
        assert_eq!(product.id, "7");
        assert_eq!(product.price, 4500.0);
        assert_eq!(product.discount_percent(), None);
    }

    #[test]
    fn discount_rounds_to_whole_percent() {
        let product = Product {
            price: 2000.0,
            original_price: Some(3000.0),
            ..Default::default()
        };
        assert_eq!(product.discount_percent(), Some(33));
    }

    #[test]
    fn query_pairs_keep_sort_last() {
        let query = ProductQuery {
            categories: vec!["books".into(), "toys".into()],
            max_price: Some(500000.0),
            sort: SortOrder::PriceLow,
            ..Default::default()
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("category", "books,toys".to_string()),
                ("max_price", "500000".to_string()),
                ("sort", "price_low".to_string()),
            ]
        );
    }
}
