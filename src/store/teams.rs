use sqlx::SqliteConnection;

use crate::dto::team_dto::Team;

pub async fn find(conn: &mut SqliteConnection, team_id: i64) -> Result<Option<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = ?")
        .bind(team_id)
        .fetch_optional(conn)
        .await
}

pub async fn find_in_auction(
    conn: &mut SqliteConnection,
    team_id: i64,
    auction_id: i64,
) -> Result<Option<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = ? AND auction_id = ?")
        .bind(team_id)
        .bind(auction_id)
        .fetch_optional(conn)
        .await
}

pub async fn list_for_auction(conn: &mut SqliteConnection, auction_id: i64) -> Result<Vec<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE auction_id = ? ORDER BY id ASC")
        .bind(auction_id)
        .fetch_all(conn)
        .await
}

// Team setup belongs to the auction administration service; tests need it to seed.
#[cfg(test)]
pub async fn insert(conn: &mut SqliteConnection, auction_id: i64, name: &str) -> Result<Team, sqlx::Error> {
    let now = chrono::Utc::now();
    sqlx::query_as::<_, Team>(
        r#"
        INSERT INTO teams (auction_id, name, image, owners, created_at, updated_at)
        VALUES (?, ?, '', '[]', ?, ?)
        RETURNING *
        "#,
    )
    .bind(auction_id)
    .bind(name)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await
}
