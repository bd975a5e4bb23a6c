//! Database migrations, one migrator per service.
//!
//! Services share a Postgres instance in development but never each other's
//! tables, so every migrator keeps its own history table.

pub use sea_orm_migration::prelude::*;

mod m20260105_000001_create_users;
mod m20260105_000002_create_catalog;
mod m20260105_000003_create_orders;
mod m20260105_000004_create_payments;
mod m20260105_000005_create_bookings;
mod m20260105_000006_create_reviews;

macro_rules! service_migrator {
    ($name:ident, $table:literal, [$($migration:path),+ $(,)?]) => {
        pub struct $name;

        #[async_trait::async_trait]
        impl MigratorTrait for $name {
            fn migrations() -> Vec<Box<dyn MigrationTrait>> {
                vec![$(Box::new($migration)),+]
            }

            fn migration_table_name() -> DynIden {
                Alias::new($table).into_iden()
            }
        }
    };
}

service_migrator!(
    UsersMigrator,
    "seaql_migrations_users",
    [m20260105_000001_create_users::Migration]
);
service_migrator!(
    CatalogMigrator,
    "seaql_migrations_catalog",
    [m20260105_000002_create_catalog::Migration]
);
service_migrator!(
    OrdersMigrator,
    "seaql_migrations_orders",
    [m20260105_000003_create_orders::Migration]
);
service_migrator!(
    PaymentsMigrator,
    "seaql_migrations_payments",
    [m20260105_000004_create_payments::Migration]
);
service_migrator!(
    BookingsMigrator,
    "seaql_migrations_bookings",
    [m20260105_000005_create_bookings::Migration]
);
service_migrator!(
    ReviewsMigrator,
    "seaql_migrations_reviews",
    [m20260105_000006_create_reviews::Migration]
);
