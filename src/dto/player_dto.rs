use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use validator::Validate;

/// Auction resolution status of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Hammer {
    Upcoming,
    Sold,
    Unsold,
}

impl Hammer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hammer::Upcoming => "upcoming",
            Hammer::Sold => "sold",
            Hammer::Unsold => "unsold",
        }
    }
}

impl fmt::Display for Hammer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum Role {
    Batter,
    Bowler,
    #[serde(rename = "All-Rounder")]
    #[sqlx(rename = "All-Rounder")]
    AllRounder,
    #[serde(rename = "Wicket-Keeper")]
    #[sqlx(rename = "Wicket-Keeper")]
    WicketKeeper,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub team_name: String,
    pub bid: f64,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Player {
    pub id: i64,
    pub auction_id: i64,
    pub player_number: i64,
    pub name: String,
    pub role: Role,
    pub country: String,
    pub prev_team: String,
    pub current_team: String,
    pub hammer: Hammer,
    pub base_price: f64,
    pub selling_price: f64,
    pub ipl_team: Option<String>,
    pub prev_fantasy_points: i64,
    pub bids: Json<Vec<Bid>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of an uploaded roster. Auction state fields are always reset on insert.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewPlayer {
    #[validate(range(min = 1))]
    pub player_number: i64,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub prev_team: String,
    #[validate(range(min = 0.0))]
    pub base_price: f64,
    pub ipl_team: Option<String>,
    #[serde(default)]
    pub prev_fantasy_points: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveRoster {
    #[validate(range(min = 1))]
    pub auction_id: i64,
    #[validate(length(min = 1), nested)]
    pub players: Vec<NewPlayer>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlayerRef {
    #[validate(range(min = 1))]
    pub player_id: i64,
}

#[derive(Debug, Serialize)]
pub struct SquadByRole {
    pub batters: Vec<Player>,
    pub bowlers: Vec<Player>,
    pub all_rounders: Vec<Player>,
    pub wicket_keepers: Vec<Player>,
}

impl SquadByRole {
    pub fn from_players(players: Vec<Player>) -> Self {
        let mut squad = SquadByRole {
            batters: vec![],
            bowlers: vec![],
            all_rounders: vec![],
            wicket_keepers: vec![],
        };

        for player in players {
            match player.role {
                Role::Batter => squad.batters.push(player),
                Role::Bowler => squad.bowlers.push(player),
                Role::AllRounder => squad.all_rounders.push(player),
                Role::WicketKeeper => squad.wicket_keepers.push(player),
            }
        }

        squad
    }
}
