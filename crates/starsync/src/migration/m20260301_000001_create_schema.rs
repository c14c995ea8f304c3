//! Initial migration to create the starsync database schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StarredRepositories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StarredRepositories::FullName)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    // Naming
                    .col(
                        ColumnDef::new(StarredRepositories::Owner)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StarredRepositories::Name).string().not_null())
                    .col(ColumnDef::new(StarredRepositories::Url).text().not_null())
                    // Content
                    .col(
                        ColumnDef::new(StarredRepositories::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(StarredRepositories::Language)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StarredRepositories::Topics)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(
                        ColumnDef::new(StarredRepositories::Stars)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    // Enrichment
                    .col(ColumnDef::new(StarredRepositories::Summary).text().null())
                    .col(
                        ColumnDef::new(StarredRepositories::SummaryGeneratedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(StarredRepositories::SummaryAttemptedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // Tracking
                    .col(
                        ColumnDef::new(StarredRepositories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(StarredRepositories::LastSyncedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(StarredRepositories::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_starred_repos_owner")
                    .table(StarredRepositories::Table)
                    .col(StarredRepositories::Owner)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_starred_repos_archived")
                    .table(StarredRepositories::Table)
                    .col(StarredRepositories::Archived)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StarredRepositories::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
#[sea_orm(iden = "starred_repositories")]
enum StarredRepositories {
    Table,
    FullName,
    Owner,
    Name,
    Url,
    Description,
    Language,
    Topics,
    Stars,
    Summary,
    SummaryGeneratedAt,
    SummaryAttemptedAt,
    CreatedAt,
    LastSyncedAt,
    Archived,
}
