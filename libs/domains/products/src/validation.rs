//! Form validation for create and update.
//!
//! Presence checks run in a fixed order and stop at the first failure, so a
//! form missing both `name` and `price` reports `name`. Values are only
//! parsed once every presence check has passed.

use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{ProductField, ProductForm, ProductInput, MAX_PHOTO_BYTES};

struct Check {
    field: ProductField,
    passes: fn(&ProductForm) -> bool,
}

const CHECKS: [Check; 6] = [
    Check {
        field: ProductField::Name,
        passes: |f| present(&f.name),
    },
    Check {
        field: ProductField::Description,
        passes: |f| present(&f.description),
    },
    Check {
        field: ProductField::Price,
        passes: |f| present(&f.price),
    },
    Check {
        field: ProductField::Category,
        passes: |f| present(&f.category),
    },
    Check {
        field: ProductField::Quantity,
        passes: |f| present(&f.quantity),
    },
    Check {
        field: ProductField::Photo,
        passes: |f| f.photo.as_ref().is_none_or(|p| p.len() <= MAX_PHOTO_BYTES),
    },
];

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Run the ordered checks, then parse the form into typed input.
pub fn validate(form: ProductForm) -> ProductResult<ProductInput> {
    if let Some(failed) = CHECKS.iter().find(|check| !(check.passes)(&form)) {
        return Err(match failed.field {
            ProductField::Photo => ProductError::PayloadTooLarge {
                limit: MAX_PHOTO_BYTES,
            },
            field => ProductError::missing(field),
        });
    }

    let ProductForm {
        name,
        description,
        price,
        category,
        quantity,
        shipping,
        photo,
    } = form;

    Ok(ProductInput {
        name: take_text(name, ProductField::Name)?,
        description: take_text(description, ProductField::Description)?,
        price: parse_price(&take_text(price, ProductField::Price)?)?,
        category: parse_category(&take_text(category, ProductField::Category)?)?,
        quantity: parse_quantity(&take_text(quantity, ProductField::Quantity)?)?,
        shipping: parse_shipping(shipping.as_deref())?,
        photo: photo.filter(|p| !p.is_empty()),
    })
}

fn take_text(value: Option<String>, field: ProductField) -> ProductResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ProductError::missing(field))
}

fn parse_price(raw: &str) -> ProductResult<f64> {
    let price: f64 = raw
        .parse()
        .map_err(|_| ProductError::invalid(ProductField::Price, "not a number"))?;
    if !price.is_finite() {
        return Err(ProductError::invalid(ProductField::Price, "not a number"));
    }
    if price < 0.0 {
        return Err(ProductError::invalid(
            ProductField::Price,
            "must not be negative",
        ));
    }
    Ok(price)
}

fn parse_category(raw: &str) -> ProductResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| ProductError::invalid(ProductField::Category, "not a valid category id"))
}

fn parse_quantity(raw: &str) -> ProductResult<i64> {
    let quantity: i64 = raw
        .parse()
        .map_err(|_| ProductError::invalid(ProductField::Quantity, "not an integer"))?;
    if quantity < 0 {
        return Err(ProductError::invalid(
            ProductField::Quantity,
            "must not be negative",
        ));
    }
    Ok(quantity)
}

fn parse_shipping(raw: Option<&str>) -> ProductResult<Option<bool>> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(Some(true)),
        "false" | "0" | "no" => Ok(Some(false)),
        _ => Err(ProductError::invalid(
            ProductField::Shipping,
            "expected true or false",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationReason;
    use crate::models::ProductPhoto;

    fn complete_form() -> ProductForm {
        ProductForm {
            name: Some("Widget".to_string()),
            description: Some("A useful widget".to_string()),
            price: Some("19.99".to_string()),
            category: Some(Uuid::now_v7().to_string()),
            quantity: Some("5".to_string()),
            shipping: None,
            photo: None,
        }
    }

    fn missing_field(err: ProductError) -> ProductField {
        match err {
            ProductError::ValidationFailed {
                field,
                reason: ValidationReason::Missing,
            } => field,
            other => panic!("expected a missing-field error, got {:?}", other),
        }
    }

    #[test]
    fn test_complete_form_is_accepted() {
        let input = validate(complete_form()).unwrap();
        assert_eq!(input.name, "Widget");
        assert_eq!(input.price, 19.99);
        assert_eq!(input.quantity, 5);
        assert_eq!(input.shipping, None);
    }

    #[test]
    fn test_each_missing_field_is_named() {
        let cases: [(fn(&mut ProductForm), ProductField); 5] = [
            (|f| f.name = None, ProductField::Name),
            (|f| f.description = None, ProductField::Description),
            (|f| f.price = None, ProductField::Price),
            (|f| f.category = None, ProductField::Category),
            (|f| f.quantity = None, ProductField::Quantity),
        ];

        for (strip, expected) in cases {
            let mut form = complete_form();
            strip(&mut form);
            assert_eq!(missing_field(validate(form).unwrap_err()), expected);
        }
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let mut form = complete_form();
        form.description = Some("   ".to_string());
        assert_eq!(
            missing_field(validate(form).unwrap_err()),
            ProductField::Description
        );
    }

    #[test]
    fn test_first_failure_wins() {
        let mut form = complete_form();
        form.price = None;
        form.quantity = None;
        form.photo = Some(ProductPhoto::new(vec![0; MAX_PHOTO_BYTES + 1], "image/png"));
        assert_eq!(missing_field(validate(form).unwrap_err()), ProductField::Price);
    }

    #[test]
    fn test_photo_size_boundary() {
        let mut form = complete_form();
        form.photo = Some(ProductPhoto::new(vec![0; MAX_PHOTO_BYTES], "image/jpeg"));
        let input = validate(form).unwrap();
        assert_eq!(input.photo.map(|p| p.len()), Some(MAX_PHOTO_BYTES));

        let mut form = complete_form();
        form.photo = Some(ProductPhoto::new(vec![0; MAX_PHOTO_BYTES + 1], "image/jpeg"));
        assert!(matches!(
            validate(form),
            Err(ProductError::PayloadTooLarge { limit: MAX_PHOTO_BYTES })
        ));
    }

    #[test]
    fn test_unparseable_values_are_invalid() {
        let mut form = complete_form();
        form.price = Some("cheap".to_string());
        assert!(matches!(
            validate(form),
            Err(ProductError::ValidationFailed {
                field: ProductField::Price,
                reason: ValidationReason::Invalid(_)
            })
        ));

        let mut form = complete_form();
        form.price = Some("-1".to_string());
        assert!(validate(form).is_err());

        let mut form = complete_form();
        form.category = Some("electronics".to_string());
        assert!(matches!(
            validate(form),
            Err(ProductError::ValidationFailed {
                field: ProductField::Category,
                ..
            })
        ));

        let mut form = complete_form();
        form.quantity = Some("2.5".to_string());
        assert!(validate(form).is_err());
    }

    #[test]
    fn test_shipping_parsing() {
        let mut form = complete_form();
        form.shipping = Some("Yes".to_string());
        assert_eq!(validate(form).unwrap().shipping, Some(true));

        let mut form = complete_form();
        form.shipping = Some("0".to_string());
        assert_eq!(validate(form).unwrap().shipping, Some(false));

        let mut form = complete_form();
        form.shipping = Some("maybe".to_string());
        assert!(matches!(
            validate(form),
            Err(ProductError::ValidationFailed {
                field: ProductField::Shipping,
                ..
            })
        ));
    }
}
