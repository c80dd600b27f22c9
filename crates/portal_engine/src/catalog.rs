use portal_model::{Product, ProductQuery};

pub const PLACEHOLDER_IMAGES: [&str; 5] = [
    "https://images.unsplash.com/photo-1542291026-7eec264c27ff?w=1200&q=80&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1513708928121-79c2b6f8d0b7?w=1200&q=80&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1523275335684-37898b6baf30?w=1200&q=80&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1503602642458-232111445657?w=1200&q=80&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1515165562835-c3c0a14b5a63?w=1200&q=80&auto=format&fit=crop",
];

/// 32-bit `h * 31 + c` string hash over UTF-16 code units, made non-negative.
pub fn string_hash(input: &str) -> u32 {
    let h = input.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    });
    h.unsigned_abs()
}

/// Stable stand-in image for a product without one. The key is the product
/// id, else the position, else nothing.
pub fn placeholder_image(id: &str, idx: usize) -> &'static str {
    let key = if !id.is_empty() {
        id.to_string()
    } else if idx != 0 {
        idx.to_string()
    } else {
        String::new()
    };
    PLACEHOLDER_IMAGES[string_hash(&key) as usize % PLACEHOLDER_IMAGES.len()]
}

/// The first listed image, or the placeholder for this product.
pub fn display_image(product: &Product) -> String {
    product
        .images
        .iter()
        .find(|image| !image.is_empty())
        .cloned()
        .unwrap_or_else(|| placeholder_image(&product.id, 0).to_string())
}

/// Products currently shown plus the filters that produced them.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    filters: ProductQuery,
}

impl Catalog {
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn set_products(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    pub fn filters(&self) -> &ProductQuery {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: ProductQuery) {
        self.filters = filters;
    }

    pub fn clear_filters(&mut self) {
        self.filters = ProductQuery::default();
    }

    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }
}
