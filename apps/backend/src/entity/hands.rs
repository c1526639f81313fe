use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hands")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub game_id: Uuid,
    pub number: i32,
    pub taker_user_id: Option<Uuid>,
    pub contract: String,
    pub trump: Option<String>,
    pub score_team_a: i32,
    pub score_team_b: i32,
    pub points_made_team_a: i32,
    pub points_made_team_b: i32,
    pub coinche: bool,
    pub surcoinche: bool,
    pub general: bool,
    pub belote_a: i32,
    pub belote_b: i32,
    pub capot_team: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::games::Entity",
        from = "Column::GameId",
        to = "super::games::Column::Id"
    )]
    Game,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TakerUserId",
        to = "super::users::Column::Id"
    )]
    Taker,
}

impl Related<super::games::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Game.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Taker.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
