use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_post_contents::{Bodies, Conclusions, Introductions};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Posts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Posts::IntroductionId).integer().not_null())
                    .col(ColumnDef::new(Posts::BodyId).integer().not_null())
                    .col(ColumnDef::new(Posts::ConclusionId).integer().not_null())
                    .col(
                        ColumnDef::new(Posts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Posts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_introduction")
                            .from(Posts::Table, Posts::IntroductionId)
                            .to(Introductions::Table, Introductions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_body")
                            .from(Posts::Table, Posts::BodyId)
                            .to(Bodies::Table, Bodies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_conclusion")
                            .from(Posts::Table, Posts::ConclusionId)
                            .to(Conclusions::Table, Conclusions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One post per content triple; find-or-create relies on it.
        manager
            .create_index(
                Index::create()
                    .name("idx_posts_parts")
                    .table(Posts::Table)
                    .col(Posts::IntroductionId)
                    .col(Posts::BodyId)
                    .col(Posts::ConclusionId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Posts {
    Table,
    Id,
    IntroductionId,
    BodyId,
    ConclusionId,
    CreatedAt,
    UpdatedAt,
}
