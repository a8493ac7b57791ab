use serde::Serialize;

use crate::dto::player_dto::Player;

/// Live auction update relayed to websocket subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuctionEvent {
    PlayerOffered { auction_id: i64, player: Player },
    PlayerSold { auction_id: i64, team_id: i64, player: Player },
    PlayerUnsold { auction_id: i64, player: Player },
    PlayerCorrected { auction_id: i64, player: Player },
    RosterChanged { auction_id: i64 },
}

impl AuctionEvent {
    pub fn auction_id(&self) -> i64 {
        match self {
            AuctionEvent::PlayerOffered { auction_id, .. }
            | AuctionEvent::PlayerSold { auction_id, .. }
            | AuctionEvent::PlayerUnsold { auction_id, .. }
            | AuctionEvent::PlayerCorrected { auction_id, .. }
            | AuctionEvent::RosterChanged { auction_id } => *auction_id,
        }
    }
}
