use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::slug::slugify;

/// Largest accepted photo, in bytes.
pub const MAX_PHOTO_BYTES: usize = 1_000_000;

/// Names of the client-supplied fields, as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ProductField {
    Name,
    Description,
    Price,
    Category,
    Quantity,
    Shipping,
    Photo,
    PriceRange,
}

/// Category a product points at. Owned by another service; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Uuid::now_v7(),
            slug: slugify(&name),
            name,
        }
    }
}

/// Photo bytes plus the content type they were uploaded with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductPhoto {
    /// Base64 in JSON
    #[serde(with = "base64_bytes")]
    #[schema(value_type = String, format = Byte)]
    pub data: Vec<u8>,
    pub content_type: String,
}

impl ProductPhoto {
    pub fn new(data: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded)
            .map_err(serde::de::Error::custom)
    }
}

/// Product entity, full record including the photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    /// Derived from `name` on every write
    pub slug: String,
    pub description: String,
    pub price: f64,
    /// Category id; not checked against the categories collection
    pub category: Uuid,
    pub quantity: i64,
    #[serde(default)]
    pub shipping: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<ProductPhoto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(draft: ProductDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: draft.name,
            slug: draft.slug,
            description: draft.description,
            price: draft.price,
            category: draft.category,
            quantity: draft.quantity,
            shipping: draft.shipping,
            photo: draft.photo,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite every field carried by `draft`.
    ///
    /// `shipping` and `photo` are optional on the form; when absent the stored
    /// values are kept.
    pub fn apply(&mut self, draft: ProductDraft) {
        self.name = draft.name;
        self.slug = draft.slug;
        self.description = draft.description;
        self.price = draft.price;
        self.category = draft.category;
        self.quantity = draft.quantity;
        if draft.shipping.is_some() {
            self.shipping = draft.shipping;
        }
        if draft.photo.is_some() {
            self.photo = draft.photo;
        }
        self.updated_at = Utc::now();
    }

    /// Read model with the category resolved and the photo left out.
    pub fn view(&self, category: Option<Category>) -> ProductView {
        ProductView {
            id: self.id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            price: self.price,
            category,
            quantity: self.quantity,
            shipping: self.shipping,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// What list and get-by-slug return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductView {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    /// `null` when the referenced category does not exist
    pub category: Option<Category>,
    pub quantity: i64,
    #[serde(default)]
    pub shipping: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw multipart form as submitted to create and update.
///
/// Every text field arrives as a string and is checked by
/// [`crate::validation::validate`].
#[derive(Debug, Clone, Default, ToSchema)]
pub struct ProductForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    /// Category id
    pub category: Option<String>,
    pub quantity: Option<String>,
    /// `true`/`false`, `1`/`0` or `yes`/`no`
    pub shipping: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub photo: Option<ProductPhoto>,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Uuid,
    pub quantity: i64,
    pub shipping: Option<bool>,
    pub photo: Option<ProductPhoto>,
}

/// Validated input plus derived fields, ready for the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub category: Uuid,
    pub quantity: i64,
    pub shipping: Option<bool>,
    pub photo: Option<ProductPhoto>,
}

impl ProductDraft {
    pub fn from_input(input: ProductInput) -> Self {
        Self {
            slug: slugify(&input.name),
            name: input.name,
            description: input.description,
            price: input.price,
            category: input.category,
            quantity: input.quantity,
            shipping: input.shipping,
            photo: input.photo,
        }
    }
}

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// List query parameters, kept as text so bad input can fall back to defaults
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number (default 1)
    pub page: Option<String>,
    /// Page size (default 10)
    pub limit: Option<String>,
}

/// Normalized pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Absent, non-numeric, zero or negative values use the defaults.
    pub fn from_query(query: &PageQuery) -> Self {
        Self {
            page: positive_or(query.page.as_deref(), DEFAULT_PAGE),
            limit: positive_or(query.limit.as_deref(), DEFAULT_LIMIT),
        }
    }

    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn positive_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

/// Filter request body
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ProductFilter {
    /// Category ids; empty means any category
    #[serde(default)]
    pub checked: Vec<Uuid>,
    /// `[min, max]` inclusive, or empty for any price
    #[serde(default)]
    #[validate(custom(function = "validate_price_range"))]
    pub radio: Vec<f64>,
}

#[allow(clippy::ptr_arg)]
fn validate_price_range(range: &Vec<f64>) -> Result<(), ValidationError> {
    match range.len() {
        0 | 2 => Ok(()),
        _ => Err(ValidationError::new("price_range")
            .with_message("expected [min, max] or an empty list".into())),
    }
}

impl ProductFilter {
    pub fn to_query(&self) -> FilterQuery {
        let price = match self.radio.as_slice() {
            [min, max] => Some(PriceRange {
                min: *min,
                max: *max,
            }),
            _ => None,
        };
        FilterQuery {
            categories: self.checked.clone(),
            price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Store-facing filter built from a validated [`ProductFilter`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterQuery {
    pub categories: Vec<Uuid>,
    pub price: Option<PriceRange>,
}

impl FilterQuery {
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok =
            self.categories.is_empty() || self.categories.contains(&product.category);
        let price_ok = self
            .price
            .is_none_or(|range| product.price >= range.min && product.price <= range.max);
        category_ok && price_ok
    }
}

// Response bodies

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub success: bool,
    pub message: String,
    pub product: Product,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductViewResponse {
    pub success: bool,
    pub message: String,
    /// `null` when no product has this slug
    pub product: Option<ProductView>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FilterResponse {
    pub success: bool,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub success: bool,
    /// Number of products in this page
    #[serde(rename = "counTotal")]
    pub count_total: u64,
    pub total_products: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub message: String,
    pub products: Vec<ProductView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> ProductDraft {
        ProductDraft::from_input(ProductInput {
            name: name.to_string(),
            description: "A thing".to_string(),
            price: 9.5,
            category: Uuid::now_v7(),
            quantity: 3,
            shipping: Some(true),
            photo: Some(ProductPhoto::new(vec![1, 2, 3], "image/png")),
        })
    }

    #[test]
    fn test_draft_derives_slug() {
        assert_eq!(draft("Super Widget").slug, "super-widget");
    }

    #[test]
    fn test_apply_keeps_optional_fields_when_absent() {
        let mut product = Product::new(draft("Widget"));
        let created = product.created_at;

        let mut update = draft("Super Widget");
        update.shipping = None;
        update.photo = None;
        update.price = 12.0;
        product.apply(update);

        assert_eq!(product.slug, "super-widget");
        assert_eq!(product.price, 12.0);
        assert_eq!(product.shipping, Some(true));
        assert_eq!(product.photo.as_ref().map(|p| p.len()), Some(3));
        assert_eq!(product.created_at, created);
        assert!(product.updated_at >= created);
    }

    #[test]
    fn test_view_excludes_photo() {
        let product = Product::new(draft("Widget"));
        let json = serde_json::to_value(product.view(None)).unwrap();
        assert!(json.get("photo").is_none());
        assert!(json["category"].is_null());
    }

    #[test]
    fn test_photo_is_base64_in_json() {
        let photo = ProductPhoto::new(b"hi!".to_vec(), "image/png");
        let json = serde_json::to_value(&photo).unwrap();
        assert_eq!(json["data"], "aGkh");

        let back: ProductPhoto = serde_json::from_value(json).unwrap();
        assert_eq!(back, photo);
    }

    #[test]
    fn test_page_request_defaults() {
        let page = PageRequest::from_query(&PageQuery::default());
        assert_eq!(page, PageRequest { page: 1, limit: 10 });
        assert_eq!(page.skip(), 0);
    }

    #[test]
    fn test_page_request_bad_input_falls_back() {
        for raw in ["abc", "0", "-3", "2.5", ""] {
            let query = PageQuery {
                page: Some(raw.to_string()),
                limit: Some(raw.to_string()),
            };
            assert_eq!(PageRequest::from_query(&query), PageRequest::default(), "{raw}");
        }
    }

    #[test]
    fn test_page_request_skip_and_total_pages() {
        let query = PageQuery {
            page: Some("2".to_string()),
            limit: Some(" 5 ".to_string()),
        };
        let page = PageRequest::from_query(&query);
        assert_eq!(page.skip(), 5);
        assert_eq!(page.total_pages(11), 3);
        assert_eq!(page.total_pages(10), 2);
        assert_eq!(page.total_pages(0), 0);
    }

    #[test]
    fn test_filter_price_range_length() {
        let ok = ProductFilter {
            checked: vec![],
            radio: vec![10.0, 50.0],
        };
        assert!(ok.validate().is_ok());
        assert!(ProductFilter::default().validate().is_ok());

        let bad = ProductFilter {
            checked: vec![],
            radio: vec![10.0],
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_filter_query_matches_inclusive_bounds() {
        let cat = Uuid::now_v7();
        let mut product = Product::new(draft("Widget"));
        product.category = cat;
        product.price = 50.0;

        let filter = ProductFilter {
            checked: vec![cat],
            radio: vec![10.0, 50.0],
        }
        .to_query();
        assert!(filter.matches(&product));

        product.price = 50.01;
        assert!(!filter.matches(&product));

        product.price = 10.0;
        product.category = Uuid::now_v7();
        assert!(!filter.matches(&product));

        assert!(FilterQuery::default().matches(&product));
    }

    #[test]
    fn test_page_serializes_wire_names() {
        let page = ProductPage {
            success: true,
            count_total: 0,
            total_products: 0,
            total_pages: 0,
            current_page: 1,
            message: "All products".to_string(),
            products: vec![],
        };
        let json = serde_json::to_value(page).unwrap();
        assert_eq!(json["counTotal"], 0);
        assert_eq!(json["totalProducts"], 0);
        assert_eq!(json["totalPages"], 0);
        assert_eq!(json["currentPage"], 1);
    }
}
