use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::ExternalId).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::Name).string().null())
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Users::IsAdmin).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        // Create games table
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Games::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Games::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(Games::State).string_len(20).not_null())
                    .col(ColumnDef::new(Games::PointsTeamA).integer().not_null().default(0))
                    .col(ColumnDef::new(Games::PointsTeamB).integer().not_null().default(0))
                    .col(ColumnDef::new(Games::TargetPoints).integer().not_null().default(1000))
                    .col(ColumnDef::new(Games::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Games::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_games_created_by")
                            .from(Games::Table, Games::CreatedBy)
                            .to(Users::Table, Users::Id)
                    )
                    .to_owned(),
            )
            .await?;

        // Create game_players table
        manager
            .create_table(
                Table::create()
                    .table(GamePlayers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GamePlayers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(GamePlayers::GameId).uuid().not_null())
                    .col(ColumnDef::new(GamePlayers::UserId).uuid().not_null())
                    .col(ColumnDef::new(GamePlayers::Team).string_len(1).not_null())
                    .col(ColumnDef::new(GamePlayers::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_players_game_id")
                            .from(GamePlayers::Table, GamePlayers::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_players_user_id")
                            .from(GamePlayers::Table, GamePlayers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_game_players_game")
                    .table(GamePlayers::Table)
                    .col(GamePlayers::GameId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_game_players_user")
                    .table(GamePlayers::Table)
                    .col(GamePlayers::UserId)
                    .to_owned(),
            )
            .await?;

        // Create hands table
        manager
            .create_table(
                Table::create()
                    .table(Hands::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Hands::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Hands::GameId).uuid().not_null())
                    .col(ColumnDef::new(Hands::Number).integer().not_null())
                    .col(ColumnDef::new(Hands::TakerUserId).uuid().null())
                    .col(ColumnDef::new(Hands::Contract).string_len(20).not_null())
                    .col(ColumnDef::new(Hands::Trump).string_len(20).null())
                    .col(ColumnDef::new(Hands::ScoreTeamA).integer().not_null().default(0))
                    .col(ColumnDef::new(Hands::ScoreTeamB).integer().not_null().default(0))
                    .col(ColumnDef::new(Hands::PointsMadeTeamA).integer().not_null().default(0))
                    .col(ColumnDef::new(Hands::PointsMadeTeamB).integer().not_null().default(0))
                    .col(ColumnDef::new(Hands::Coinche).boolean().not_null().default(false))
                    .col(ColumnDef::new(Hands::Surcoinche).boolean().not_null().default(false))
                    .col(ColumnDef::new(Hands::General).boolean().not_null().default(false))
                    .col(ColumnDef::new(Hands::BeloteA).integer().not_null().default(0))
                    .col(ColumnDef::new(Hands::BeloteB).integer().not_null().default(0))
                    .col(ColumnDef::new(Hands::CapotTeam).string_len(1).null())
                    .col(ColumnDef::new(Hands::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hands_game_id")
                            .from(Hands::Table, Hands::GameId)
                            .to(Games::Table, Games::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hands_taker_user_id")
                            .from(Hands::Table, Hands::TakerUserId)
                            .to(Users::Table, Users::Id)
                    )
                    .to_owned(),
            )
            .await?;

        // One hand number per game
        manager
            .create_index(
                Index::create()
                    .name("idx_hands_game_number")
                    .table(Hands::Table)
                    .col(Hands::GameId)
                    .col(Hands::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order due to foreign key constraints
        manager
            .drop_table(Table::drop().table(Hands::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(GamePlayers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    ExternalId,
    Email,
    Name,
    IsActive,
    IsAdmin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
    CreatedBy,
    State,
    PointsTeamA,
    PointsTeamB,
    TargetPoints,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GamePlayers {
    Table,
    Id,
    GameId,
    UserId,
    Team,
    Position,
}

#[derive(DeriveIden)]
enum Hands {
    Table,
    Id,
    GameId,
    Number,
    TakerUserId,
    Contract,
    Trump,
    ScoreTeamA,
    ScoreTeamB,
    PointsMadeTeamA,
    PointsMadeTeamB,
    Coinche,
    Surcoinche,
    General,
    BeloteA,
    BeloteB,
    CapotTeam,
    CreatedAt,
}
