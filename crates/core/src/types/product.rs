//! Catalog product records and the seller/admin product form.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::{DEFAULT_CURRENCY, Price};
use super::status::ProductStatus;

/// Maximum number of tags kept on a product.
pub const MAX_TAGS: usize = 20;

/// Product categories offered by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Electrical,
    Supplements,
    ClothesMen,
    ClothesWomen,
    ClothesKids,
}

impl Category {
    /// Every category, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Electrical,
        Self::Supplements,
        Self::ClothesMen,
        Self::ClothesWomen,
        Self::ClothesKids,
    ];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electrical => "electrical",
            Self::Supplements => "supplements",
            Self::ClothesMen => "clothes_men",
            Self::ClothesWomen => "clothes_women",
            Self::ClothesKids => "clothes_kids",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| format!("invalid category: {s}"))
    }
}

/// A catalog product as returned by the backend.
///
/// Categories stay free-form strings: the backend may know categories this
/// client does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub shipping_cost: Option<Decimal>,
    #[serde(default)]
    pub status: Option<ProductStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub affiliate_url: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub brand: Option<String>,
}

impl Product {
    /// Price with the product's currency (USD when unset).
    #[must_use]
    pub fn display_price(&self) -> Price {
        Price::new(
            self.price,
            self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
        )
    }

    /// Image to show first: `imageUrl`, else the first gallery image.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
    }
}

/// One page of the management listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    #[serde(default)]
    pub items: Vec<Product>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "first_page")]
    pub total_pages: u32,
}

const fn first_page() -> u32 {
    1
}

impl ProductPage {
    /// Whether another page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Input of the create/edit product form, before it is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub original_price: Decimal,
    pub stock: i64,
    pub sku: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping_cost: Decimal,
    pub status: ProductStatus,
    pub tags: Vec<String>,
    pub images: Vec<String>,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: Category::default(),
            price: Decimal::ZERO,
            original_price: Decimal::ZERO,
            stock: 0,
            sku: String::new(),
            shipping_cost: Decimal::ZERO,
            status: ProductStatus::Draft,
            tags: Vec::new(),
            images: Vec::new(),
        }
    }
}

/// A single form field problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Every problem found in a [`ProductDraft`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("please fix the form errors: {}", format_field_errors(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    /// Problems keyed by field name.
    #[must_use]
    pub fn by_field(&self) -> BTreeMap<&'static str, &'static str> {
        self.0.iter().map(|e| (e.field, e.message)).collect()
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ProductDraft {
    /// Seed a draft from an existing product for editing.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            category: product
                .category
                .as_deref()
                .and_then(|c| c.parse().ok())
                .unwrap_or_default(),
            price: product.price,
            original_price: product.original_price.unwrap_or_default(),
            stock: product.stock.unwrap_or_default(),
            sku: product.sku.clone().unwrap_or_default(),
            shipping_cost: product.shipping_cost.unwrap_or_default(),
            status: product.status.unwrap_or_default(),
            tags: product.tags.clone(),
            images: product.images.clone(),
        }
    }

    /// Check the form rules and trim text fields.
    ///
    /// # Errors
    ///
    /// Returns every failed rule at once.
    pub fn validate(mut self) -> Result<Self, ValidationErrors> {
        self.title = self.title.trim().to_owned();
        self.description = self.description.trim().to_owned();
        self.sku = self.sku.trim().to_owned();

        let mut errors = Vec::new();
        if self.title.chars().count() < 3 {
            errors.push(FieldError {
                field: "title",
                message: "Title must be at least 3 characters",
            });
        }
        if self.description.chars().count() < 10 {
            errors.push(FieldError {
                field: "description",
                message: "Description must be at least 10 characters",
            });
        }
        if self.price < Decimal::ZERO {
            errors.push(FieldError {
                field: "price",
                message: "Price must be 0 or more",
            });
        }
        if self.original_price < Decimal::ZERO {
            errors.push(FieldError {
                field: "originalPrice",
                message: "Discount price must be 0 or more",
            });
        }
        if self.stock < 0 {
            errors.push(FieldError {
                field: "stock",
                message: "Stock must be 0 or more",
            });
        }
        if self.shipping_cost < Decimal::ZERO {
            errors.push(FieldError {
                field: "shippingCost",
                message: "Shipping cost must be 0 or more",
            });
        }

        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// Split comma-separated tag input: trimmed, empties dropped, at most
/// [`MAX_TAGS`].
#[must_use]
pub fn normalize_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .take(MAX_TAGS)
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid_draft() -> ProductDraft {
        ProductDraft {
            title: "  Desk lamp ".into(),
            description: "Warm white LED lamp".into(),
            price: Decimal::new(1999, 2),
            stock: 4,
            ..ProductDraft::default()
        }
    }

    #[test]
    fn test_product_deserializes_backend_shape() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1",
            "title": "Lamp",
            "price": 10,
            "originalPrice": 12.5,
            "images": ["a.png"],
            "status": "APPROVED"
        }))
        .unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price, Decimal::new(10, 0));
        assert_eq!(product.original_price, Some(Decimal::new(125, 1)));
        assert_eq!(product.status, Some(ProductStatus::Approved));
        assert_eq!(product.primary_image(), Some("a.png"));
        assert_eq!(product.display_price().display(), "USD 10.00");
    }

    #[test]
    fn test_product_accepts_plain_id() {
        let product: Product = serde_json::from_value(json!({"id": "p2", "title": "Mug"})).unwrap();
        assert_eq!(product.id.as_str(), "p2");
    }

    #[test]
    fn test_validate_trims_and_accepts() {
        let draft = valid_draft().validate().unwrap();
        assert_eq!(draft.title, "Desk lamp");
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let draft = ProductDraft {
            title: "ab".into(),
            description: "short".into(),
            price: Decimal::new(-1, 0),
            stock: -2,
            ..ProductDraft::default()
        };
        let errors = draft.validate().unwrap_err();
        let fields = errors.by_field();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("description"));
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("stock"));
        assert!(!fields.contains_key("shippingCost"));
    }

    #[test]
    fn test_draft_serializes_numbers() {
        let value = serde_json::to_value(valid_draft()).unwrap();
        assert_eq!(value["price"], json!(19.99));
        assert_eq!(value["category"], json!("electrical"));
        assert_eq!(value["status"], json!("DRAFT"));
    }

    #[test]
    fn test_normalize_tags() {
        assert_eq!(normalize_tags(" a, b ,, c,"), ["a", "b", "c"]);
        let many = (0..30).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        assert_eq!(normalize_tags(&many).len(), MAX_TAGS);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("clothes-kids".parse::<Category>().unwrap(), Category::ClothesKids);
        assert!("toys".parse::<Category>().is_err());
    }

    #[test]
    fn test_product_page_has_next() {
        let page: ProductPage =
            serde_json::from_value(json!({"items": [], "page": 1, "totalPages": 3})).unwrap();
        assert!(page.has_next());
    }
}
