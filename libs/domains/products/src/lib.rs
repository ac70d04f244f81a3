//! Products Domain
//!
//! Product catalog backed by MongoDB: create, paginated listing,
//! lookup by slug, update, delete, and filtering by category and price.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, multipart upload reading
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, slugs, paging rules
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB + in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, forms, response bodies
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{handlers, CatalogConfig, MongoProductRepository, ProductService};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("catalog");
//!
//! let repository = MongoProductRepository::new(&db);
//! repository.init_indexes().await?;
//! let service = ProductService::with_config(repository, CatalogConfig::default());
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;
pub mod slug;
pub mod upload;
pub mod validation;

// Re-export commonly used types
pub use crate::config::CatalogConfig;
pub use crate::mongodb::MongoProductRepository;
pub use error::{ProductError, ProductResult, ValidationReason};
pub use handlers::ApiDoc;
pub use models::{
    Category, FilterQuery, PageQuery, PageRequest, PriceRange, Product, ProductDraft,
    ProductField, ProductFilter, ProductForm, ProductInput, ProductPage, ProductPhoto,
    ProductView, MAX_PHOTO_BYTES,
};
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
pub use slug::slugify;
