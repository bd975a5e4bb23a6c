use migration::{
    BookingsMigrator, CatalogMigrator, OrdersMigrator, PaymentsMigrator, ReviewsMigrator,
    UsersMigrator,
};
use sea_orm_migration::cli;

/// `MIGRATION_TARGET=orders migration up`
#[tokio::main]
async fn main() {
    let target = std::env::var("MIGRATION_TARGET").unwrap_or_default();

    match target.to_ascii_lowercase().as_str() {
        "users" => cli::run_cli(UsersMigrator).await,
        "catalog" => cli::run_cli(CatalogMigrator).await,
        "orders" => cli::run_cli(OrdersMigrator).await,
        "payments" => cli::run_cli(PaymentsMigrator).await,
        "bookings" => cli::run_cli(BookingsMigrator).await,
        "reviews" => cli::run_cli(ReviewsMigrator).await,
        other => {
            eprintln!(
                "MIGRATION_TARGET must be one of users, catalog, orders, payments, bookings, reviews (got {:?})",
                other
            );
            std::process::exit(2);
        }
    }
}
