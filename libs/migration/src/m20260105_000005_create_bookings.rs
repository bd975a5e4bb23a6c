use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(pk_uuid(Bookings::Id))
                    .col(uuid(Bookings::UserId))
                    .col(text(Bookings::Zone))
                    .col(timestamp_with_time_zone(Bookings::StartsAt))
                    .col(timestamp_with_time_zone(Bookings::EndsAt))
                    .col(integer(Bookings::Guests))
                    .col(text(Bookings::ContactName))
                    .col(text(Bookings::ContactPhone))
                    .col(text(Bookings::ContactEmail))
                    .col(text_null(Bookings::Comment))
                    .col(text(Bookings::Status))
                    .col(
                        timestamp_with_time_zone(Bookings::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Bookings::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HookahBookings::Table)
                    .if_not_exists()
                    .col(pk_uuid(HookahBookings::Id))
                    .col(uuid(HookahBookings::BookingId))
                    .col(text(HookahBookings::Flavor))
                    .col(text(HookahBookings::Strength))
                    .col(integer(HookahBookings::Quantity))
                    .col(timestamp_with_time_zone_null(HookahBookings::ServeAt))
                    .col(big_integer(HookahBookings::PriceCents))
                    .col(
                        timestamp_with_time_zone(HookahBookings::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hookah_bookings_booking")
                            .from(HookahBookings::Table, HookahBookings::BookingId)
                            .to(Bookings::Table, Bookings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Overlap queries filter by zone and window
        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_zone_window")
                    .table(Bookings::Table)
                    .col(Bookings::Zone)
                    .col(Bookings::StartsAt)
                    .col(Bookings::EndsAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user_id")
                    .table(Bookings::Table)
                    .col(Bookings::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HookahBookings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    UserId,
    Zone,
    StartsAt,
    EndsAt,
    Guests,
    ContactName,
    ContactPhone,
    ContactEmail,
    Comment,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum HookahBookings {
    Table,
    Id,
    BookingId,
    Flavor,
    Strength,
    Quantity,
    ServeAt,
    PriceCents,
    CreatedAt,
}
