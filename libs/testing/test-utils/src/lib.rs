//! Test helpers for the catalog crates
//!
//! - [`TestMongo`]: throwaway MongoDB container (feature `mongo`, on by default)
//! - [`TestDataBuilder`]: seeded catalog data, stable per test name
//! - [`assertions`]: assertion helpers with context in the failure message
//!
//! ```rust,no_run
//! use test_utils::{TestDataBuilder, TestMongo};
//!
//! #[tokio::test]
//! async fn my_mongo_test() {
//!     let mongo = TestMongo::new().await;
//!     let db = mongo.database("my_test");
//!     let data = TestDataBuilder::from_test_name("my_test");
//!
//!     let category = data.category_id(0);
//!     let name = data.product_name(0);
//!     let price = data.price(0);
//! }
//! ```

use std::hash::{DefaultHasher, Hash, Hasher};
use uuid::Uuid;

#[cfg(feature = "mongo")]
mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::TestMongo;

/// Seeded generator for catalog test data.
///
/// Two builders with the same seed hand out the same ids, names and prices,
/// so a failing test reproduces exactly.
#[derive(Debug, Clone, Copy)]
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test's own name
    pub fn from_test_name(name: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    fn mix(&self, index: u8) -> u64 {
        let mut hasher = DefaultHasher::new();
        (self.seed, index).hash(&mut hasher);
        hasher.finish()
    }

    /// Category id; each `index` gives a distinct id
    pub fn category_id(&self, index: u8) -> Uuid {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..].copy_from_slice(&self.mix(index).to_le_bytes());
        Uuid::from_bytes(uuid_bytes)
    }

    /// Product name such as `"Product 3 a1b2c3"`. Distinct per index and seed,
    /// and slugifies to `"product-3-a1b2c3"`.
    pub fn product_name(&self, index: u8) -> String {
        format!("Product {} {:06x}", index, self.seed & 0xFF_FFFF)
    }

    /// Price between 1.00 and 999.99 with two decimals
    pub fn price(&self, index: u8) -> f64 {
        let cents = 100 + self.mix(index) % 99_900;
        cents as f64 / 100.0
    }
}

/// Assertion helpers
pub mod assertions {
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    /// Unwraps `value`, failing with `context` when it is `None`
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Prices compared to the cent
    pub fn assert_price_eq(actual: f64, expected: f64, context: &str) {
        assert!(
            (actual - expected).abs() < 0.005,
            "{}: expected price {}, got {}",
            context,
            expected,
            actual
        );
    }
}
