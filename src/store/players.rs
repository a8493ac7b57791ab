use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::dto::player_dto::{Hammer, NewPlayer, Player};

/// A compare-on-write update of a player's hammer state. The row only changes
/// if its current hammer is one of `expected`.
#[derive(Debug)]
pub struct HammerWrite<'a> {
    pub player_id: i64,
    pub auction_id: i64,
    pub expected: &'a [Hammer],
    pub hammer: Hammer,
    pub current_team: &'a str,
    pub selling_price: f64,
    /// Bid appended to the history, if any.
    pub bid: Option<(&'a str, f64)>,
}

pub async fn find(conn: &mut SqliteConnection, player_id: i64) -> Result<Option<Player>, sqlx::Error> {
    sqlx::query_as::<_, Player>("SELECT * FROM players WHERE id = ?")
        .bind(player_id)
        .fetch_optional(conn)
        .await
}

pub async fn find_in_auction(
    conn: &mut SqliteConnection,
    player_id: i64,
    auction_id: i64,
) -> Result<Option<Player>, sqlx::Error> {
    sqlx::query_as::<_, Player>("SELECT * FROM players WHERE id = ? AND auction_id = ?")
        .bind(player_id)
        .bind(auction_id)
        .fetch_optional(conn)
        .await
}

pub async fn list_for_auction(conn: &mut SqliteConnection, auction_id: i64) -> Result<Vec<Player>, sqlx::Error> {
    sqlx::query_as::<_, Player>("SELECT * FROM players WHERE auction_id = ? ORDER BY player_number ASC")
        .bind(auction_id)
        .fetch_all(conn)
        .await
}

pub async fn list_upcoming(conn: &mut SqliteConnection, auction_id: i64) -> Result<Vec<Player>, sqlx::Error> {
    sqlx::query_as::<_, Player>("SELECT * FROM players WHERE auction_id = ? AND hammer = ?")
        .bind(auction_id)
        .bind(Hammer::Upcoming)
        .fetch_all(conn)
        .await
}

pub async fn insert(
    conn: &mut SqliteConnection,
    auction_id: i64,
    player: &NewPlayer,
    now: DateTime<Utc>,
) -> Result<Player, sqlx::Error> {
    sqlx::query_as::<_, Player>(
        r#"
        INSERT INTO players (
            auction_id, player_number, name, role, country, prev_team, current_team,
            hammer, base_price, selling_price, ipl_team, prev_fantasy_points, bids,
            created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, '', ?, ?, 0, ?, ?, '[]', ?, ?)
        RETURNING *
        "#,
    )
    .bind(auction_id)
    .bind(player.player_number)
    .bind(&player.name)
    .bind(player.role)
    .bind(&player.country)
    .bind(&player.prev_team)
    .bind(Hammer::Upcoming)
    .bind(player.base_price)
    .bind(&player.ipl_team)
    .bind(player.prev_fantasy_points)
    .bind(now)
    .bind(now)
    .fetch_one(conn)
    .await
}

pub async fn delete(conn: &mut SqliteConnection, player_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM players WHERE id = ?")
        .bind(player_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Applies `write` and returns the updated row, or `None` when no row matched
/// the id, auction and expected hammer.
pub async fn write_hammer(
    conn: &mut SqliteConnection,
    write: &HammerWrite<'_>,
    now: DateTime<Utc>,
) -> Result<Option<Player>, sqlx::Error> {
    let bids_clause = if write.bid.is_some() {
        ", bids = json_insert(bids, '$[#]', json_object('team_name', ?, 'bid', ?))"
    } else {
        ""
    };
    let expected = vec!["?"; write.expected.len()].join(", ");
    let sql = format!(
        "UPDATE players SET hammer = ?, current_team = ?, selling_price = ?, updated_at = ?{bids_clause} \
         WHERE id = ? AND auction_id = ? AND hammer IN ({expected}) \
         RETURNING *"
    );

    let mut query = sqlx::query_as::<_, Player>(&sql)
        .bind(write.hammer)
        .bind(write.current_team)
        .bind(write.selling_price)
        .bind(now);
    if let Some((team_name, amount)) = write.bid {
        query = query.bind(team_name).bind(amount);
    }
    query = query.bind(write.player_id).bind(write.auction_id);
    for hammer in write.expected {
        query = query.bind(*hammer);
    }

    query.fetch_optional(conn).await
}
