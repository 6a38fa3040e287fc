//! Postgres-backed room store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectOptions, Database, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter,
};
use tracing::warn;

use super::entity::{game_state, members, rooms, schema_version};
use super::{
    CleanupStats, PersistedRoom, RoomStore, StoreError, PLAYING_ROOM_MAX_AGE_DAYS,
    WAITING_ROOM_MAX_AGE_HOURS,
};
use crate::room::{RoomOptions, RoomStatus};

const LOG_TARGET: &str = "store::sea_orm";

const SCHEMA_VERSION: i32 = 2;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// All schema in one idempotent block.
const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS rooms (
    code       TEXT PRIMARY KEY,
    status     TEXT NOT NULL DEFAULT 'waiting',
    winner     TEXT,
    created_at TIMESTAMPTZ DEFAULT now()
);

CREATE TABLE IF NOT EXISTS members (
    code   TEXT REFERENCES rooms(code) ON DELETE CASCADE,
    pid    TEXT NOT NULL,
    name   TEXT NOT NULL,
    is_ai  BOOLEAN NOT NULL DEFAULT FALSE,
    PRIMARY KEY (code, pid)
);

CREATE TABLE IF NOT EXISTS game_state (
    code                    TEXT PRIMARY KEY REFERENCES rooms(code) ON DELETE CASCADE,
    game_json               JSONB,
    last_round              JSONB,
    last_turn               JSONB,
    round_banner_turns_left INTEGER NOT NULL DEFAULT 0,
    options                 JSONB NOT NULL DEFAULT '{}',
    updated_at              TIMESTAMPTZ DEFAULT now()
);
"#;

/// Connect with a bounded pool and a short connect timeout.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(database_url.to_owned());
    opts.max_connections(10)
        .min_connections(2)
        .connect_timeout(CONNECT_TIMEOUT)
        .sqlx_logging(false);
    Database::connect(opts).await
}

pub struct SeaOrmRoomStore {
    db: DatabaseConnection,
}

impl SeaOrmRoomStore {
    pub fn new(db: DatabaseConnection) -> Self {
        SeaOrmRoomStore { db }
    }
}

#[async_trait]
impl RoomStore for SeaOrmRoomStore {
    async fn migrate(&self) -> Result<(), StoreError> {
        use sea_orm::ConnectionTrait;
        self.db.execute_unprepared(MIGRATION_SQL).await?;

        let versions = schema_version::Entity::find().count(&self.db).await?;
        if versions == 0 {
            schema_version::Entity::insert(schema_version::ActiveModel {
                version: Set(SCHEMA_VERSION),
            })
            .exec_without_returning(&self.db)
            .await?;
        } else {
            schema_version::Entity::update_many()
                .col_expr(
                    schema_version::Column::Version,
                    sea_orm::sea_query::Expr::value(SCHEMA_VERSION),
                )
                .exec(&self.db)
                .await?;
        }
        Ok(())
    }

    async fn save_room(&self, room: &PersistedRoom) -> Result<(), StoreError> {
        rooms::Entity::insert(rooms::ActiveModel {
            code: Set(room.code.clone()),
            status: Set(room.status.as_str().to_owned()),
            winner: Set(room.winner.clone()),
            created_at: Set(room.created_at.fixed_offset()),
        })
        .on_conflict(
            OnConflict::column(rooms::Column::Code)
                .update_columns([rooms::Column::Status, rooms::Column::Winner])
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await?;

        // Members are only ever added; removal happens via room-delete
        // cascade.
        for member in &room.members {
            let insert = members::Entity::insert(members::ActiveModel {
                code: Set(room.code.clone()),
                pid: Set(member.pid.clone()),
                name: Set(member.name.clone()),
                is_ai: Set(member.is_ai),
            })
            .on_conflict(
                OnConflict::columns([members::Column::Code, members::Column::Pid])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await;
            match insert {
                Ok(_) | Err(DbErr::RecordNotInserted) => {}
                Err(err) => return Err(err.into()),
            }
        }

        game_state::Entity::insert(game_state::ActiveModel {
            code: Set(room.code.clone()),
            game_json: Set(room.game.as_ref().map(serde_json::to_value).transpose()?),
            last_round: Set(room.last_round.as_ref().map(serde_json::to_value).transpose()?),
            last_turn: Set(room.last_turn.as_ref().map(serde_json::to_value).transpose()?),
            round_banner_turns_left: Set(room.round_banner_turns_left),
            options: Set(serde_json::to_value(room.options)?),
            updated_at: Set(Utc::now().fixed_offset()),
        })
        .on_conflict(
            OnConflict::column(game_state::Column::Code)
                .update_columns([
                    game_state::Column::GameJson,
                    game_state::Column::LastRound,
                    game_state::Column::LastTurn,
                    game_state::Column::RoundBannerTurnsLeft,
                    game_state::Column::Options,
                    game_state::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&self.db)
        .await?;

        Ok(())
    }

    async fn cleanup_stale(&self, now: DateTime<Utc>) -> Result<CleanupStats, StoreError> {
        let playing_cutoff = (now - chrono::Duration::days(PLAYING_ROOM_MAX_AGE_DAYS)).fixed_offset();
        let waiting_cutoff = (now - chrono::Duration::hours(WAITING_ROOM_MAX_AGE_HOURS)).fixed_offset();

        let finished = rooms::Entity::update_many()
            .col_expr(
                rooms::Column::Status,
                sea_orm::sea_query::Expr::value(RoomStatus::Finished.as_str()),
            )
            .filter(rooms::Column::Status.eq(RoomStatus::Playing.as_str()))
            .filter(rooms::Column::CreatedAt.lt(playing_cutoff))
            .exec(&self.db)
            .await?
            .rows_affected;

        let deleted = rooms::Entity::delete_many()
            .filter(rooms::Column::Status.eq(RoomStatus::Waiting.as_str()))
            .filter(rooms::Column::CreatedAt.lt(waiting_cutoff))
            .exec(&self.db)
            .await?
            .rows_affected;

        Ok(CleanupStats { finished, deleted })
    }

    async fn load_active_rooms(&self) -> Result<Vec<PersistedRoom>, StoreError> {
        let room_rows = rooms::Entity::find()
            .filter(rooms::Column::Status.is_in([
                RoomStatus::Waiting.as_str(),
                RoomStatus::Playing.as_str(),
            ]))
            .all(&self.db)
            .await?;

        let mut out = Vec::with_capacity(room_rows.len());
        for row in room_rows {
            let Some(status) = RoomStatus::parse(&row.status) else {
                warn!(target: LOG_TARGET, code = %row.code, status = %row.status, "unknown room status, skipping");
                continue;
            };

            let member_rows = members::Entity::find()
                .filter(members::Column::Code.eq(row.code.clone()))
                .all(&self.db)
                .await?;
            let members = member_rows
                .into_iter()
                .map(|m| crate::room::Member {
                    pid: m.pid,
                    name: m.name,
                    is_ai: m.is_ai,
                })
                .collect();

            let state_row = game_state::Entity::find_by_id(row.code.clone())
                .one(&self.db)
                .await?;

            let (game, last_round, last_turn, banner, options) = match state_row {
                Some(state) => (
                    state.game_json.and_then(|v| parse_json(&row.code, "game_json", v)),
                    state.last_round.and_then(|v| parse_json(&row.code, "last_round", v)),
                    state.last_turn.and_then(|v| parse_json(&row.code, "last_turn", v)),
                    state.round_banner_turns_left,
                    parse_json(&row.code, "options", state.options).unwrap_or_default(),
                ),
                None => (None, None, None, 0, RoomOptions::default()),
            };

            out.push(PersistedRoom {
                code: row.code,
                status,
                winner: row.winner,
                created_at: row.created_at.to_utc(),
                members,
                game,
                last_round,
                last_turn,
                round_banner_turns_left: banner,
                options,
            });
        }
        Ok(out)
    }
}

/// Deserialize a stored JSON column, logging and dropping corrupt values.
fn parse_json<T: serde::de::DeserializeOwned>(
    code: &str,
    column: &str,
    value: serde_json::Value,
) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(target: LOG_TARGET, code, column, error = %err, "could not parse stored value");
            None
        }
    }
}
