use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{Category, FilterQuery, Product, ProductDraft, ProductView};

/// Repository trait for Product persistence
///
/// Storage backends implement this; the service never talks to a driver
/// directly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a new product
    async fn insert(&self, draft: ProductDraft) -> ProductResult<Product>;

    /// Full record, photo included
    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// Category resolved, photo excluded
    async fn find_by_slug(&self, slug: &str) -> ProductResult<Option<ProductView>>;

    /// Newest first
    async fn find_paged(&self, skip: u64, limit: u64) -> ProductResult<Vec<ProductView>>;

    /// Total number of products, unfiltered
    async fn count(&self) -> ProductResult<u64>;

    /// Apply `draft` in one write. `None` when no product has this id.
    async fn update_by_id(&self, id: Uuid, draft: ProductDraft) -> ProductResult<Option<Product>>;

    /// Hard delete; `false` when nothing matched
    async fn delete_by_id(&self, id: Uuid) -> ProductResult<bool>;

    async fn find_by_filter(&self, filter: FilterQuery) -> ProductResult<Vec<Product>>;
}

/// In-memory implementation of ProductRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    // insertion order; newest last
    products: Arc<RwLock<Vec<Product>>>,
    categories: Arc<RwLock<HashMap<Uuid, Category>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a category so reads can resolve references to it.
    pub async fn add_category(&self, category: Category) {
        self.categories.write().await.insert(category.id, category);
    }

    async fn resolve(&self, product: &Product) -> ProductView {
        let categories = self.categories.read().await;
        product.view(categories.get(&product.category).cloned())
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, draft: ProductDraft) -> ProductResult<Product> {
        let product = Product::new(draft);
        self.products.write().await.push(product.clone());

        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> ProductResult<Option<ProductView>> {
        let found = {
            let products = self.products.read().await;
            products.iter().find(|p| p.slug == slug).cloned()
        };
        match found {
            Some(product) => Ok(Some(self.resolve(&product).await)),
            None => Ok(None),
        }
    }

    async fn find_paged(&self, skip: u64, limit: u64) -> ProductResult<Vec<ProductView>> {
        let page: Vec<Product> = {
            let products = self.products.read().await;
            products
                .iter()
                .rev()
                .skip(usize::try_from(skip).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .cloned()
                .collect()
        };

        let categories = self.categories.read().await;
        Ok(page
            .iter()
            .map(|p| p.view(categories.get(&p.category).cloned()))
            .collect())
    }

    async fn count(&self) -> ProductResult<u64> {
        Ok(self.products.read().await.len() as u64)
    }

    async fn update_by_id(&self, id: Uuid, draft: ProductDraft) -> ProductResult<Option<Product>> {
        let mut products = self.products.write().await;
        let Some(product) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        product.apply(draft);
        tracing::info!(product_id = %id, "Updated product");
        Ok(Some(product.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() < before)
    }

    async fn find_by_filter(&self, filter: FilterQuery) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceRange, ProductInput, ProductPhoto};

    fn draft(name: &str, price: f64, category: Uuid) -> ProductDraft {
        ProductDraft::from_input(ProductInput {
            name: name.to_string(),
            description: format!("{name} description"),
            price,
            category,
            quantity: 1,
            shipping: None,
            photo: None,
        })
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = InMemoryProductRepository::new();
        let product = repo.insert(draft("Widget", 5.0, Uuid::now_v7())).await.unwrap();

        let found = repo.find_by_id(product.id).await.unwrap();
        assert_eq!(found, Some(product));
        assert!(repo.find_by_id(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_slug_resolves_category() {
        let repo = InMemoryProductRepository::new();
        let category = Category::new("Tools");
        repo.add_category(category.clone()).await;
        repo.insert(draft("Super Widget", 5.0, category.id)).await.unwrap();
        repo.insert(draft("Orphan", 5.0, Uuid::now_v7())).await.unwrap();

        let view = repo.find_by_slug("super-widget").await.unwrap().unwrap();
        assert_eq!(view.category, Some(category));

        let orphan = repo.find_by_slug("orphan").await.unwrap().unwrap();
        assert_eq!(orphan.category, None);

        assert!(repo.find_by_slug("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_paged_newest_first() {
        let repo = InMemoryProductRepository::new();
        let category = Uuid::now_v7();
        for i in 0..7 {
            repo.insert(draft(&format!("P{i}"), 1.0, category)).await.unwrap();
        }

        let first = repo.find_paged(0, 3).await.unwrap();
        let names: Vec<_> = first.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["P6", "P5", "P4"]);

        let last = repo.find_paged(6, 3).await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].name, "P0");

        assert_eq!(repo.count().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_update_by_id_replaces_fields_and_photo() {
        let repo = InMemoryProductRepository::new();
        let product = repo.insert(draft("Widget", 5.0, Uuid::now_v7())).await.unwrap();

        let mut change = draft("Super Widget", 7.5, product.category);
        change.photo = Some(ProductPhoto::new(vec![9; 4], "image/png"));
        let updated = repo.update_by_id(product.id, change).await.unwrap().unwrap();

        assert_eq!(updated.slug, "super-widget");
        assert_eq!(updated.price, 7.5);
        assert_eq!(updated.photo.map(|p| p.content_type), Some("image/png".to_string()));
        assert_eq!(updated.created_at, product.created_at);

        let missing = repo
            .update_by_id(Uuid::now_v7(), draft("X", 1.0, Uuid::now_v7()))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let repo = InMemoryProductRepository::new();
        let product = repo.insert(draft("Widget", 5.0, Uuid::now_v7())).await.unwrap();

        assert!(repo.delete_by_id(product.id).await.unwrap());
        assert!(!repo.delete_by_id(product.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_by_filter() {
        let repo = InMemoryProductRepository::new();
        let cat_a = Uuid::now_v7();
        let cat_b = Uuid::now_v7();
        repo.insert(draft("A cheap", 5.0, cat_a)).await.unwrap();
        repo.insert(draft("A mid", 10.0, cat_a)).await.unwrap();
        repo.insert(draft("A top", 50.0, cat_a)).await.unwrap();
        repo.insert(draft("B mid", 20.0, cat_b)).await.unwrap();

        let all = repo.find_by_filter(FilterQuery::default()).await.unwrap();
        assert_eq!(all.len(), 4);

        let filtered = repo
            .find_by_filter(FilterQuery {
                categories: vec![cat_a],
                price: Some(PriceRange {
                    min: 10.0,
                    max: 50.0,
                }),
            })
            .await
            .unwrap();
        let names: Vec<_> = filtered.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A mid", "A top"]);
    }
}
