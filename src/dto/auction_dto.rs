use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Auction {
    pub id: i64,
    pub name: String,
    pub created_by: String,
    pub auction_date: DateTime<Utc>,
    pub is_fantasy_mode: bool,
    pub base_price: f64,
    /// Starting purse of every team in this auction.
    pub purse: f64,
    pub joined_by: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AuctionRef {
    #[validate(range(min = 1))]
    pub auction_id: i64,
}
