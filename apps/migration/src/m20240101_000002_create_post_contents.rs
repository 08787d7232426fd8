//! The three content tables a post is composed from.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn content_table<T: Iden + Copy + 'static>(table: T, id: T, content: T) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(
            ColumnDef::new(id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(content).text().not_null())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(content_table(
                Introductions::Table,
                Introductions::Id,
                Introductions::Content,
            ))
            .await?;
        manager
            .create_table(content_table(Bodies::Table, Bodies::Id, Bodies::Content))
            .await?;
        manager
            .create_table(content_table(
                Conclusions::Table,
                Conclusions::Id,
                Conclusions::Content,
            ))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Conclusions::Table.into_iden(),
            Bodies::Table.into_iden(),
            Introductions::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden, Clone, Copy)]
pub enum Introductions {
    Table,
    Id,
    Content,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum Bodies {
    Table,
    Id,
    Content,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum Conclusions {
    Table,
    Id,
    Content,
}
