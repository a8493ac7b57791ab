use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::dto::match_dto::MatchRecord;

pub async fn insert_for_player(conn: &mut SqliteConnection, player_id: i64) -> Result<MatchRecord, sqlx::Error> {
    sqlx::query_as::<_, MatchRecord>("INSERT INTO matches (player_id) VALUES (?) RETURNING *")
        .bind(player_id)
        .fetch_one(conn)
        .await
}

/// Creates a zeroed record for the player unless one exists.
pub async fn ensure_for_player(conn: &mut SqliteConnection, player_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO matches (player_id) VALUES (?) ON CONFLICT(player_id) DO NOTHING")
        .bind(player_id)
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
pub async fn find_for_player(conn: &mut SqliteConnection, player_id: i64) -> Result<Option<MatchRecord>, sqlx::Error> {
    sqlx::query_as::<_, MatchRecord>("SELECT * FROM matches WHERE player_id = ?")
        .bind(player_id)
        .fetch_optional(conn)
        .await
}

pub async fn delete_for_player(conn: &mut SqliteConnection, player_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM matches WHERE player_id = ?")
        .bind(player_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Drops the player from the current and next playing XI.
pub async fn clear_selection(conn: &mut SqliteConnection, player_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE matches SET current_xi = 0, next_xi = 0 WHERE player_id = ?")
        .bind(player_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Sets `next_xi` for every listed player's match record.
pub async fn set_next_xi(conn: &mut SqliteConnection, player_ids: &[i64], selected: bool) -> Result<u64, sqlx::Error> {
    if player_ids.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE matches SET next_xi = ");
    builder.push_bind(selected);
    builder.push(" WHERE player_id IN (");
    let mut ids = builder.separated(", ");
    for id in player_ids {
        ids.push_bind(*id);
    }
    ids.push_unseparated(")");

    let result = builder.build().execute(conn).await?;
    Ok(result.rows_affected())
}
