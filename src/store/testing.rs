use std::{str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tempfile::TempDir;

use crate::config::Config;
use crate::dto::{
    auction_dto::Auction,
    player_dto::{NewPlayer, Player, Role},
    team_dto::Team,
};
use crate::store::{AuctionStore, auctions, players, teams};

pub async fn memory_store() -> AuctionStore {
    memory_store_with_timeout(Duration::from_secs(5)).await
}

/// In-memory database behind a single connection, so every caller sees the same data.
pub async fn memory_store_with_timeout(op_timeout: Duration) -> AuctionStore {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    AuctionStore::new(pool, op_timeout)
}

/// File-backed WAL database opened the way the server opens it, with several
/// pooled connections so concurrent callers contend on SQLite's locks. The
/// directory is removed when the returned guard drops.
pub async fn file_store() -> (AuctionStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = Config {
        database_url: format!("sqlite://{}", dir.path().join("auction.db").display()),
        bind_addr: "127.0.0.1:0".to_string(),
        jwt_secret: "test-secret".to_string(),
        max_connections: 5,
        op_timeout: Duration::from_secs(10),
        offer_hold: Duration::from_secs(60),
        allowed_origin: None,
    };
    let store = AuctionStore::connect(&config).await.unwrap();
    (store, dir)
}

pub async fn seed_auction(store: &AuctionStore, purse: f64, is_fantasy_mode: bool) -> Auction {
    let mut conn = store.pool().acquire().await.unwrap();
    auctions::insert(&mut conn, "Premier League Auction", purse, is_fantasy_mode)
        .await
        .unwrap()
}

pub async fn seed_team(store: &AuctionStore, auction_id: i64, name: &str) -> Team {
    let mut conn = store.pool().acquire().await.unwrap();
    teams::insert(&mut conn, auction_id, name).await.unwrap()
}

pub fn new_player(player_number: i64, name: &str, role: Role, country: &str) -> NewPlayer {
    NewPlayer {
        player_number,
        name: name.to_string(),
        role,
        country: country.to_string(),
        prev_team: String::new(),
        base_price: 100.0,
        ipl_team: None,
        prev_fantasy_points: 0,
    }
}

pub async fn seed_player(store: &AuctionStore, auction_id: i64, player_number: i64, role: Role, country: &str) -> Player {
    let mut conn = store.pool().acquire().await.unwrap();
    let player = new_player(player_number, &format!("Player {player_number}"), role, country);
    players::insert(&mut conn, auction_id, &player, chrono::Utc::now())
        .await
        .unwrap()
}

pub async fn reload_player(store: &AuctionStore, player_id: i64) -> Option<Player> {
    let mut conn = store.pool().acquire().await.unwrap();
    players::find(&mut conn, player_id).await.unwrap()
}
