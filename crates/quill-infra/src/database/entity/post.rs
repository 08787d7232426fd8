//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

/// A post is unique on its (introduction, body, conclusion) triple.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub introduction_id: i32,
    pub body_id: i32,
    pub conclusion_id: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::introduction::Entity",
        from = "Column::IntroductionId",
        to = "super::introduction::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Introduction,
    #[sea_orm(
        belongs_to = "super::body::Entity",
        from = "Column::BodyId",
        to = "super::body::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Body,
    #[sea_orm(
        belongs_to = "super::conclusion::Entity",
        from = "Column::ConclusionId",
        to = "super::conclusion::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Conclusion,
    #[sea_orm(has_many = "super::user_post::Entity")]
    UserPost,
}

impl Related<super::introduction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Introduction.def()
    }
}

impl Related<super::body::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Body.def()
    }
}

impl Related<super::conclusion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conclusion.def()
    }
}

impl Related<super::user_post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserPost.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_post::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_post::Relation::Post.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for quill_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            introduction_id: model.introduction_id,
            body_id: model.body_id,
            conclusion_id: model.conclusion_id,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<quill_core::domain::Post> for ActiveModel {
    fn from(post: quill_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            introduction_id: Set(post.introduction_id),
            body_id: Set(post.body_id),
            conclusion_id: Set(post.conclusion_id),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
