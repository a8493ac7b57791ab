use sqlx::SqliteConnection;

use crate::dto::auction_dto::Auction;

pub async fn find(conn: &mut SqliteConnection, auction_id: i64) -> Result<Option<Auction>, sqlx::Error> {
    sqlx::query_as::<_, Auction>("SELECT * FROM auctions WHERE id = ?")
        .bind(auction_id)
        .fetch_optional(conn)
        .await
}

#[cfg(test)]
pub async fn insert(
    conn: &mut SqliteConnection,
    name: &str,
    purse: f64,
    is_fantasy_mode: bool,
) -> Result<Auction, sqlx::Error> {
    let now = chrono::Utc::now();
    sqlx::query_as::<_, Auction>(
        r#"
        INSERT INTO auctions (
            name, created_by, auction_date, is_fantasy_mode, base_price, purse,
            joined_by, created_at, updated_at
        )
        VALUES (?, 'admin', ?, ?, 20, ?, '[]', ?, ?)
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(now)
    .bind(is_fantasy_mode)
    .bind(purse)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await
}
