//! Reads a `multipart/form-data` product form.

use axum::extract::multipart::{Field, Multipart};

use crate::error::{ProductError, ProductResult};
use crate::models::{ProductForm, ProductPhoto, MAX_PHOTO_BYTES};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Longest accepted text field
pub const MAX_TEXT_FIELD_BYTES: usize = 64 * 1024;

/// Collect the text fields and the optional `photo` file.
///
/// Nothing is validated here; an empty file part is treated as no photo.
/// At most `MAX_PHOTO_BYTES + 1` photo bytes are kept and the rest of the
/// part is drained, so an oversized photo still reaches validation after
/// the required-field checks.
pub async fn read_product_form(mut multipart: Multipart) -> ProductResult<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(mut field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            "photo" => {
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let data = read_photo(&mut field).await?;
                if !data.is_empty() {
                    form.photo = Some(ProductPhoto::new(data, content_type));
                }
            }
            "name" => form.name = Some(read_text(&name, &mut field).await?),
            "description" => form.description = Some(read_text(&name, &mut field).await?),
            "price" => form.price = Some(read_text(&name, &mut field).await?),
            "category" => form.category = Some(read_text(&name, &mut field).await?),
            "quantity" => form.quantity = Some(read_text(&name, &mut field).await?),
            "shipping" => form.shipping = Some(read_text(&name, &mut field).await?),
            other => {
                tracing::debug!(field = other, "Ignoring unknown form field");
            }
        }
    }

    Ok(form)
}

async fn read_photo(field: &mut Field<'_>) -> ProductResult<Vec<u8>> {
    let keep = MAX_PHOTO_BYTES + 1;
    let mut data = Vec::new();
    let mut total = 0usize;

    while let Some(chunk) = field.chunk().await? {
        total += chunk.len();
        let room = keep.saturating_sub(data.len());
        data.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }

    if total > data.len() {
        tracing::debug!(photo_bytes = total, "Photo over the size limit, drained the rest");
    }
    Ok(data)
}

async fn read_text(name: &str, field: &mut Field<'_>) -> ProductResult<String> {
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        if data.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(ProductError::MalformedRequest(format!(
                "form field '{name}' exceeds {MAX_TEXT_FIELD_BYTES} bytes"
            )));
        }
        data.extend_from_slice(&chunk);
    }
    String::from_utf8(data)
        .map_err(|_| ProductError::MalformedRequest(format!("form field '{name}' is not UTF-8")))
}
