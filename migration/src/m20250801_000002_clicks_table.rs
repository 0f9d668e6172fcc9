//! Clicks table migration
//!
//! One row per successful redirect: timestamp, anonymized visitor hash,
//! raw user agent / referrer, coarse geo, and the categorical
//! device/browser/os classification.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clicks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clicks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clicks::UrlId).string_len(36).not_null())
                    .col(
                        ColumnDef::new(Clicks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Clicks::IpHash).string_len(16).null())
                    .col(ColumnDef::new(Clicks::UserAgent).text().null())
                    .col(ColumnDef::new(Clicks::Referrer).text().null())
                    .col(ColumnDef::new(Clicks::Country).string_len(2).null())
                    .col(ColumnDef::new(Clicks::City).string_len(100).null())
                    .col(ColumnDef::new(Clicks::Device).string_len(16).null())
                    .col(ColumnDef::new(Clicks::Browser).string_len(16).null())
                    .col(ColumnDef::new(Clicks::Os).string_len(16).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clicks_url_id")
                            .from(Clicks::Table, Clicks::UrlId)
                            .to(Urls::Table, Urls::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_url_id")
                    .table(Clicks::Table)
                    .col(Clicks::UrlId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_created_at")
                    .table(Clicks::Table)
                    .col(Clicks::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // per-link time-series queries
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_url_time")
                    .table(Clicks::Table)
                    .col(Clicks::UrlId)
                    .col(Clicks::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_clicks_url_time").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_clicks_created_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_clicks_url_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Clicks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Clicks {
    Table,
    Id,
    UrlId,
    CreatedAt,
    IpHash,
    UserAgent,
    Referrer,
    Country,
    City,
    Device,
    Browser,
    Os,
}

#[derive(DeriveIden)]
enum Urls {
    Table,
    Id,
}
