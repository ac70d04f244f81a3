//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::config::CatalogConfig;
use crate::error::{ProductError, ProductResult};
use crate::models::{
    PageQuery, PageRequest, Product, ProductDraft, ProductFilter, ProductForm, ProductPage,
    ProductPhoto, ProductView,
};
use crate::repository::ProductRepository;
use crate::validation::validate;

/// Product catalog operations over a [`ProductRepository`].
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
    config: CatalogConfig,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self::with_config(repository, CatalogConfig::default())
    }

    pub fn with_config(repository: R, config: CatalogConfig) -> Self {
        Self {
            repository: Arc::new(repository),
            config,
        }
    }

    /// Validate the form and insert one product
    #[instrument(skip(self, form))]
    pub async fn create_product(&self, form: ProductForm) -> ProductResult<Product> {
        let draft = ProductDraft::from_input(validate(form)?);
        self.repository.insert(draft).await
    }

    /// One page of products, newest first, photos excluded
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: PageQuery) -> ProductResult<ProductPage> {
        let page = PageRequest::from_query(&query);
        let page_size = self.config.page_size(page.limit);

        let (products, total) = tokio::try_join!(
            self.repository.find_paged(page.skip(), page_size),
            self.repository.count(),
        )?;

        Ok(ProductPage {
            success: true,
            count_total: products.len() as u64,
            total_products: total,
            total_pages: page.total_pages(total),
            current_page: page.page,
            message: "All products".to_string(),
            products,
        })
    }

    /// `None` when no product has this slug
    #[instrument(skip(self))]
    pub async fn get_by_slug(&self, slug: &str) -> ProductResult<Option<ProductView>> {
        self.repository.find_by_slug(slug).await
    }

    /// Replace the product's fields (and photo, if one was sent) in one write
    #[instrument(skip(self, form))]
    pub async fn update_product(&self, id: Uuid, form: ProductForm) -> ProductResult<Product> {
        let draft = ProductDraft::from_input(validate(form)?);
        self.repository
            .update_by_id(id, draft)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    /// Succeeds whether or not the product existed
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> ProductResult<()> {
        let removed = self.repository.delete_by_id(id).await?;
        if removed {
            tracing::info!(product_id = %id, "Product deleted");
        } else {
            tracing::debug!(product_id = %id, "Delete matched no product");
        }
        Ok(())
    }

    /// Products matching the category ids and inclusive price range
    #[instrument(skip(self))]
    pub async fn filter_products(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        filter.validate()?;
        self.repository.find_by_filter(filter.to_query()).await
    }

    #[instrument(skip(self))]
    pub async fn get_photo(&self, id: Uuid) -> ProductResult<ProductPhoto> {
        let product = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))?;
        product.photo.ok_or(ProductError::PhotoNotFound(id))
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            config: self.config,
        }
    }
}
