use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(pk_uuid(Reviews::Id))
                    .col(uuid(Reviews::UserId))
                    .col(text(Reviews::AuthorName))
                    .col(text(Reviews::ReviewType))
                    .col(uuid(Reviews::TargetId))
                    .col(small_integer(Reviews::Rating))
                    .col(text_null(Reviews::Comment))
                    .col(
                        timestamp_with_time_zone(Reviews::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Reviews::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Reviews::Rating).between(1, 5))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_reviews_user_target")
                    .table(Reviews::Table)
                    .col(Reviews::UserId)
                    .col(Reviews::ReviewType)
                    .col(Reviews::TargetId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_target")
                    .table(Reviews::Table)
                    .col(Reviews::ReviewType)
                    .col(Reviews::TargetId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    UserId,
    AuthorName,
    ReviewType,
    TargetId,
    Rating,
    Comment,
    CreatedAt,
    UpdatedAt,
}
