//! HTTP handlers for the product catalog

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use axum_helpers::{
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, PayloadTooLargeResponse, ServiceUnavailableResponse,
    },
    UuidPath,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::models::{
    Category, FilterResponse, MessageResponse, PageQuery, Product, ProductFilter, ProductForm,
    ProductPage, ProductPhoto, ProductResponse, ProductView, ProductViewResponse,
};
use crate::repository::ProductRepository;
use crate::service::ProductService;
use crate::upload::read_product_form;

/// Request body ceiling for multipart uploads. Bodies past it are refused
/// with 413 before any field is checked. Photos under it are streamed and
/// checked against `MAX_PHOTO_BYTES` during validation.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        filter_products,
        get_by_slug,
        update_product,
        delete_product,
        get_photo,
    ),
    components(
        schemas(
            Product, ProductView, Category, ProductPhoto, ProductForm, ProductFilter,
            ProductResponse, ProductViewResponse, ProductPage, FilterResponse, MessageResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            PayloadTooLargeResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/filter", post(filter_products))
        .route("/slug/{slug}", get(get_by_slug))
        .route("/{id}", put(update_product).delete(delete_product))
        .route("/{id}/photo", get(get_photo))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(shared_service)
}

/// List products, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of products", body = ProductPage),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Query(query): Query<PageQuery>,
) -> ProductResult<Json<ProductPage>> {
    let page = service.list_products(query).await?;
    Ok(Json(page))
}

/// Create a product from a multipart form
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body(content = ProductForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created successfully", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 413, response = PayloadTooLargeResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProductResult<impl IntoResponse> {
    let form = read_product_form(multipart?).await?;
    let product = service.create_product(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            success: true,
            message: "Product created successfully".to_string(),
            product,
        }),
    ))
}

/// Filter by category ids and an inclusive price range
#[utoipa::path(
    post,
    path = "/filter",
    tag = "Products",
    request_body = ProductFilter,
    responses(
        (status = 200, description = "Matching products", body = FilterResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn filter_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    payload: Result<Json<ProductFilter>, JsonRejection>,
) -> ProductResult<Json<FilterResponse>> {
    let Json(filter) = payload?;
    let products = service.filter_products(filter).await?;
    Ok(Json(FilterResponse {
        success: true,
        products,
    }))
}

/// Get a product by slug; `product` is `null` when nothing matches
#[utoipa::path(
    get,
    path = "/slug/{slug}",
    tag = "Products",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Single product fetched", body = ProductViewResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_by_slug<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(slug): Path<String>,
) -> ProductResult<Json<ProductViewResponse>> {
    let product = service.get_by_slug(&slug).await?;
    Ok(Json(ProductViewResponse {
        success: true,
        message: "Single product fetched".to_string(),
        product,
    }))
}

/// Replace a product's fields, and its photo when one is sent
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body(content = ProductForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product updated successfully", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 413, response = PayloadTooLargeResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProductResult<impl IntoResponse> {
    let form = read_product_form(multipart?).await?;
    let product = service.update_product(id, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            success: true,
            message: "Product updated successfully".to_string(),
            product,
        }),
    ))
}

/// Delete a product. Unknown ids still succeed.
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted successfully", body = MessageResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<Json<MessageResponse>> {
    service.delete_product(id).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Product deleted successfully".to_string(),
    }))
}

/// Raw photo bytes, served with the content type they were uploaded with
#[utoipa::path(
    get,
    path = "/{id}/photo",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Photo bytes", content_type = "application/octet-stream", body = Vec<u8>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_photo<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    UuidPath(id): UuidPath,
) -> ProductResult<impl IntoResponse> {
    let photo = service.get_photo(id).await?;
    Ok(([(header::CONTENT_TYPE, photo.content_type)], photo.data))
}
