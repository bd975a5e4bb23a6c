use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(pk_uuid(Payments::Id))
                    .col(uuid(Payments::OrderId))
                    .col(uuid(Payments::UserId))
                    .col(big_integer(Payments::AmountCents))
                    .col(text(Payments::Currency))
                    .col(text(Payments::Status))
                    .col(text(Payments::Provider))
                    .col(text(Payments::ProviderSessionId).unique_key())
                    .col(text_null(Payments::CheckoutUrl))
                    .col(text(Payments::CustomerEmail))
                    .col(
                        timestamp_with_time_zone(Payments::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Payments::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(timestamp_with_time_zone_null(Payments::CompletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_order_id")
                    .table(Payments::Table)
                    .col(Payments::OrderId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    OrderId,
    UserId,
    AmountCents,
    Currency,
    Status,
    Provider,
    ProviderSessionId,
    CheckoutUrl,
    CustomerEmail,
    CreatedAt,
    UpdatedAt,
    CompletedAt,
}
