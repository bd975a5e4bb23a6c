//! Shared test utilities for the bistro crates
//!
//! - `TestDatabase`: Postgres container with a migrator applied (feature: "postgres")
//! - `TestRedis`: Redis container (feature: "redis")
//! - `TestDataBuilder`: deterministic ids and names derived from the test name
//!
//! ```rust,ignore
//! let db = TestDatabase::with_migrator::<OrdersMigrator>().await;
//! let builder = TestDataBuilder::from_test_name("test_confirm_order");
//! let user_id = builder.user_id();
//! ```

use uuid::Uuid;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "redis")]
mod redis;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

#[cfg(feature = "redis")]
pub use redis::TestRedis;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by using seeded random data.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed derived from the test name, so each test gets stable, distinct data.
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a unique user ID for testing
    pub fn user_id(&self) -> Uuid {
        // Use seed to generate deterministic UUID
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// A second deterministic id, distinct from [`user_id`](Self::user_id).
    pub fn other_user_id(&self) -> Uuid {
        let bytes = self.seed.rotate_left(17).to_be_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// `"test-{prefix}-{seed}-{suffix}"`, e.g. `builder.name("product", "soup")`.
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// A unique, valid email address for this test.
    pub fn email(&self, local: &str) -> String {
        format!("{}.{}@bistro.test", local, self.seed)
    }
}

/// Assertion helpers with context in the failure message
pub mod assertions {
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    /// Unwraps `value`, failing the test with `context` when it is `None`.
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}
