use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Urls::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Urls::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Urls::Slug).string_len(50).not_null())
                    .col(ColumnDef::new(Urls::TargetUrl).text().not_null())
                    .col(ColumnDef::new(Urls::OwnerId).string_len(36).null())
                    .col(
                        ColumnDef::new(Urls::IsPublic)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Urls::Title).string_len(255).null())
                    .col(ColumnDef::new(Urls::Description).text().null())
                    .col(ColumnDef::new(Urls::Password).string().null())
                    .col(
                        ColumnDef::new(Urls::ClickCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Urls::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Urls::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Urls::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Urls::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Urls::IsGuest)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Urls::GuestSessionId).string_len(64).null())
                    .col(
                        ColumnDef::new(Urls::GuestCreatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // slug lookups are the hot path; uniqueness also backs the
        // immutable-after-creation contract
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_slug")
                    .table(Urls::Table)
                    .col(Urls::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_deleted_at")
                    .table(Urls::Table)
                    .col(Urls::DeletedAt)
                    .to_owned(),
            )
            .await?;

        // guest cleanup scans by (is_guest, guest_created_at)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_guest_cleanup")
                    .table(Urls::Table)
                    .col(Urls::IsGuest)
                    .col(Urls::GuestCreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_owner_id")
                    .table(Urls::Table)
                    .col(Urls::OwnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_urls_owner_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_urls_guest_cleanup").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_urls_deleted_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_urls_slug").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Urls::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Urls {
    Table,
    Id,
    Slug,
    TargetUrl,
    OwnerId,
    IsPublic,
    Title,
    Description,
    Password,
    ClickCount,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
    ExpiresAt,
    IsGuest,
    GuestSessionId,
    GuestCreatedAt,
}
