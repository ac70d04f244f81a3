//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{self, doc, spec::BinarySubtype, Binary, Bson, Document},
    options::{IndexOptions, ReturnDocument},
    Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{Category, FilterQuery, Product, ProductDraft, ProductPhoto, ProductView};
use crate::repository::ProductRepository;

pub const PRODUCTS_COLLECTION: &str = "products";
pub const CATEGORIES_COLLECTION: &str = "categories";

/// MongoDB implementation of the ProductRepository
#[derive(Clone)]
pub struct MongoProductRepository {
    collection: Collection<ProductDocument>,
    categories: String,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self::with_collections(db, PRODUCTS_COLLECTION, CATEGORIES_COLLECTION)
    }

    pub fn with_collections(db: &Database, products: &str, categories: &str) -> Self {
        Self {
            collection: db.collection::<ProductDocument>(products),
            categories: categories.to_string(),
        }
    }

    /// Initialize indexes for slug lookups, listing and filtering
    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            // Slug lookups; not unique, two products may share a name
            IndexModel::builder()
                .keys(doc! { "slug": 1 })
                .options(IndexOptions::builder().name("idx_slug".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created_at".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "category": 1, "price": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category_price".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    /// Aggregation that resolves the category reference and drops the photo.
    fn view_pipeline(&self, mut stages: Vec<Document>) -> Vec<Document> {
        stages.extend([
            doc! { "$project": { "photo": 0 } },
            doc! {
                "$lookup": {
                    "from": self.categories.as_str(),
                    "localField": "category",
                    "foreignField": "_id",
                    "as": "category",
                }
            },
            doc! {
                "$unwind": {
                    "path": "$category",
                    "preserveNullAndEmptyArrays": true,
                }
            },
        ]);
        stages
    }

    async fn aggregate_views(&self, pipeline: Vec<Document>) -> ProductResult<Vec<ProductView>> {
        let documents: Vec<Document> = self
            .collection
            .aggregate(pipeline)
            .await?
            .try_collect()
            .await?;
        documents
            .into_iter()
            .map(|d| {
                bson::from_document::<ProductViewDocument>(d)
                    .map(ProductView::from)
                    .map_err(ProductError::from)
            })
            .collect()
    }

    /// Build a MongoDB filter document from a FilterQuery
    fn build_filter(filter: &FilterQuery) -> Document {
        let mut doc = doc! {};

        if !filter.categories.is_empty() {
            let ids: Vec<Bson> = filter
                .categories
                .iter()
                .map(|id| Bson::from(mongo_id(*id)))
                .collect();
            doc.insert("category", doc! { "$in": ids });
        }

        if let Some(range) = filter.price {
            doc.insert("price", doc! { "$gte": range.min, "$lte": range.max });
        }

        doc
    }

    fn set_document(draft: &ProductDraft) -> Document {
        let mut set = doc! {
            "name": draft.name.as_str(),
            "slug": draft.slug.as_str(),
            "description": draft.description.as_str(),
            "price": draft.price,
            "category": mongo_id(draft.category),
            "quantity": draft.quantity,
            "updated_at": bson::DateTime::now(),
        };
        if let Some(shipping) = draft.shipping {
            set.insert("shipping", shipping);
        }
        if let Some(photo) = &draft.photo {
            set.insert(
                "photo",
                doc! {
                    "data": binary(&photo.data),
                    "content_type": photo.content_type.as_str(),
                },
            );
        }
        set
    }
}

fn id_filter(id: Uuid) -> Document {
    doc! { "_id": mongo_id(id) }
}

fn mongo_id(id: Uuid) -> bson::Uuid {
    bson::Uuid::from_bytes(id.into_bytes())
}

fn binary(bytes: &[u8]) -> Binary {
    Binary {
        subtype: BinarySubtype::Generic,
        bytes: bytes.to_vec(),
    }
}

fn to_bson_datetime(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

fn from_bson_datetime(at: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or_default()
}

// Stored shapes. Ids are BSON UUIDs (binary subtype 4), timestamps BSON dates.

#[derive(Debug, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    name: String,
    slug: String,
    description: String,
    price: f64,
    category: bson::Uuid,
    quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shipping: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    photo: Option<PhotoDocument>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

#[derive(Debug, Serialize, Deserialize)]
struct PhotoDocument {
    data: Binary,
    content_type: String,
}

#[derive(Debug, Deserialize)]
struct CategoryDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    name: String,
    #[serde(default)]
    slug: String,
}

#[derive(Debug, Deserialize)]
struct ProductViewDocument {
    #[serde(rename = "_id")]
    id: bson::Uuid,
    name: String,
    slug: String,
    description: String,
    price: f64,
    #[serde(default)]
    category: Option<CategoryDocument>,
    quantity: i64,
    #[serde(default)]
    shipping: Option<bool>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

impl From<&Product> for ProductDocument {
    fn from(product: &Product) -> Self {
        Self {
            id: mongo_id(product.id),
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            price: product.price,
            category: mongo_id(product.category),
            quantity: product.quantity,
            shipping: product.shipping,
            photo: product.photo.as_ref().map(|p| PhotoDocument {
                data: binary(&p.data),
                content_type: p.content_type.clone(),
            }),
            created_at: to_bson_datetime(product.created_at),
            updated_at: to_bson_datetime(product.updated_at),
        }
    }
}

impl From<ProductDocument> for Product {
    fn from(doc: ProductDocument) -> Self {
        Self {
            id: Uuid::from_bytes(doc.id.bytes()),
            name: doc.name,
            slug: doc.slug,
            description: doc.description,
            price: doc.price,
            category: Uuid::from_bytes(doc.category.bytes()),
            quantity: doc.quantity,
            shipping: doc.shipping,
            photo: doc
                .photo
                .map(|p| ProductPhoto::new(p.data.bytes, p.content_type)),
            created_at: from_bson_datetime(doc.created_at),
            updated_at: from_bson_datetime(doc.updated_at),
        }
    }
}

impl From<CategoryDocument> for Category {
    fn from(doc: CategoryDocument) -> Self {
        Self {
            id: Uuid::from_bytes(doc.id.bytes()),
            name: doc.name,
            slug: doc.slug,
        }
    }
}

impl From<ProductViewDocument> for ProductView {
    fn from(doc: ProductViewDocument) -> Self {
        Self {
            id: Uuid::from_bytes(doc.id.bytes()),
            name: doc.name,
            slug: doc.slug,
            description: doc.description,
            price: doc.price,
            category: doc.category.map(Category::from),
            quantity: doc.quantity,
            shipping: doc.shipping,
            created_at: from_bson_datetime(doc.created_at),
            updated_at: from_bson_datetime(doc.updated_at),
        }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, draft), fields(product_name = %draft.name))]
    async fn insert(&self, draft: ProductDraft) -> ProductResult<Product> {
        let document = ProductDocument::from(&Product::new(draft));
        self.collection.insert_one(&document).await?;

        let product = Product::from(document);
        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let document = self.collection.find_one(id_filter(id)).await?;
        Ok(document.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn find_by_slug(&self, slug: &str) -> ProductResult<Option<ProductView>> {
        let pipeline = self.view_pipeline(vec![
            doc! { "$match": { "slug": slug } },
            doc! { "$limit": 1 },
        ]);
        Ok(self.aggregate_views(pipeline).await?.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn find_paged(&self, skip: u64, limit: u64) -> ProductResult<Vec<ProductView>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let pipeline = self.view_pipeline(vec![
            // _id is a v7 uuid, so it breaks created_at ties in insertion order
            doc! { "$sort": { "created_at": -1, "_id": -1 } },
            doc! { "$skip": i64::try_from(skip).unwrap_or(i64::MAX) },
            doc! { "$limit": i64::try_from(limit).unwrap_or(i64::MAX) },
        ]);
        self.aggregate_views(pipeline).await
    }

    #[instrument(skip(self))]
    async fn count(&self) -> ProductResult<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    #[instrument(skip(self, draft), fields(product_name = %draft.name))]
    async fn update_by_id(&self, id: Uuid, draft: ProductDraft) -> ProductResult<Option<Product>> {
        let update = doc! { "$set": Self::set_document(&draft) };

        let updated = self
            .collection
            .find_one_and_update(id_filter(id), update)
            .return_document(ReturnDocument::After)
            .await?;

        if updated.is_some() {
            tracing::info!(product_id = %id, "Product updated successfully");
        }
        Ok(updated.map(Product::from))
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: Uuid) -> ProductResult<bool> {
        let result = self.collection.delete_one(id_filter(id)).await?;
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self))]
    async fn find_by_filter(&self, filter: FilterQuery) -> ProductResult<Vec<Product>> {
        let documents: Vec<ProductDocument> = self
            .collection
            .find(Self::build_filter(&filter))
            .await?
            .try_collect()
            .await?;
        Ok(documents.into_iter().map(Product::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceRange, ProductInput};

    fn draft() -> ProductDraft {
        ProductDraft::from_input(ProductInput {
            name: "Super Widget".to_string(),
            description: "desc".to_string(),
            price: 10.0,
            category: Uuid::now_v7(),
            quantity: 2,
            shipping: None,
            photo: None,
        })
    }

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoProductRepository::build_filter(&FilterQuery::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_with_categories() {
        let id = Uuid::now_v7();
        let doc = MongoProductRepository::build_filter(&FilterQuery {
            categories: vec![id],
            price: None,
        });
        let ids = doc.get_document("category").unwrap().get_array("$in").unwrap();
        assert_eq!(ids, &vec![Bson::from(mongo_id(id))]);
        assert!(!doc.contains_key("price"));
    }

    #[test]
    fn test_build_filter_with_price_range() {
        let doc = MongoProductRepository::build_filter(&FilterQuery {
            categories: vec![],
            price: Some(PriceRange {
                min: 10.0,
                max: 50.0,
            }),
        });
        let price = doc.get_document("price").unwrap();
        assert_eq!(price.get_f64("$gte").unwrap(), 10.0);
        assert_eq!(price.get_f64("$lte").unwrap(), 50.0);
        assert!(!doc.contains_key("category"));
    }

    #[test]
    fn test_set_document_leaves_absent_optionals_alone() {
        let set = MongoProductRepository::set_document(&draft());
        assert_eq!(set.get_str("slug").unwrap(), "super-widget");
        assert!(!set.contains_key("shipping"));
        assert!(!set.contains_key("photo"));
        assert!(set.contains_key("updated_at"));
    }

    #[test]
    fn test_set_document_carries_photo() {
        let mut draft = draft();
        draft.shipping = Some(true);
        draft.photo = Some(ProductPhoto::new(vec![1, 2, 3], "image/png"));

        let set = MongoProductRepository::set_document(&draft);
        assert!(set.get_bool("shipping").unwrap());
        let photo = set.get_document("photo").unwrap();
        assert_eq!(photo.get_binary_generic("data").unwrap(), &vec![1, 2, 3]);
        assert_eq!(photo.get_str("content_type").unwrap(), "image/png");
    }

    #[test]
    fn test_document_round_trip_keeps_ids() {
        let product = Product::new(draft());
        let back = Product::from(ProductDocument::from(&product));
        assert_eq!(back.id, product.id);
        assert_eq!(back.category, product.category);
        assert_eq!(
            back.created_at.timestamp_millis(),
            product.created_at.timestamp_millis()
        );
    }
}
