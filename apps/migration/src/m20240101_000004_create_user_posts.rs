use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users::Users;
use super::m20240101_000003_create_posts::Posts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserPosts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserPosts::UserId).integer().not_null())
                    .col(ColumnDef::new(UserPosts::PostId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserPosts::UserId)
                            .col(UserPosts::PostId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_posts_user")
                            .from(UserPosts::Table, UserPosts::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_posts_post")
                            .from(UserPosts::Table, UserPosts::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserPosts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserPosts {
    Table,
    UserId,
    PostId,
}
