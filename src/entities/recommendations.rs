use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "recommendations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// TMDB movie id
    #[sea_orm(unique)]
    pub movie_id: i32,

    pub movie_title: String,

    pub description: Option<String>,

    pub image_url: Option<String>,

    pub category: Option<String>,

    pub is_active: bool,

    /// RFC 3339, fixed precision so lexical order matches time order
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
