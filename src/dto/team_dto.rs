use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Team {
    pub id: i64,
    pub auction_id: i64,
    pub name: String,
    pub image: String,
    pub owners: Json<Vec<String>>,
    #[sqlx(skip)]
    pub squad: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derived view of a team. Never stored; rebuilt from the squad on every read.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TeamSummary {
    pub team_id: i64,
    pub team_name: String,
    pub team_image: String,
    pub purse_remaining: f64,
    pub batter: u32,
    pub bowler: u32,
    pub all_rounder: u32,
    pub wicket_keeper: u32,
    pub overseas: u32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TeamRef {
    #[validate(range(min = 1))]
    pub team_id: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveEleven {
    #[validate(range(min = 1))]
    pub team_id: i64,
    #[validate(length(equal = 11, message = "exactly 11 players are required"))]
    pub player_ids: Vec<i64>,
}
