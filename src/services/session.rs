use std::time::Duration;

use moka::sync::Cache;
use tracing::info;

use crate::dto::{
    bidding_dto::{CorrectPlayer, SoldPlayer, UnsoldPlayer},
    event_dto::AuctionEvent,
    player_dto::Player,
};
use crate::error::AppResult;
use crate::services::{
    state_machine::PlayerStateMachine,
    websocket::{EventSender, publish},
};

/// Front door for the live bidding flow.
///
/// Offered players are put on a short hold so a second caller is handed a
/// different player while a decision is pending. The hold is advisory: two
/// submissions for the same player are still settled by the state machine,
/// which turns the later one into a conflict.
///
/// Holds live in this process only. Instances behind a load balancer do not
/// share them, so each may offer the same player; the store stays the single
/// source of truth either way.
#[derive(Clone)]
pub struct AuctionSession {
    machine: PlayerStateMachine,
    held: Cache<(i64, i64), ()>,
    events: EventSender,
}

impl AuctionSession {
    pub fn new(machine: PlayerStateMachine, offer_hold: Duration, events: EventSender) -> Self {
        let held = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(offer_hold)
            .build();
        Self { machine, held, events }
    }

    pub async fn offer_next(&self, auction_id: i64) -> AppResult<Option<Player>> {
        let held = self.held.clone();
        let offered = self
            .machine
            .offer_next(auction_id, move |player_id| held.contains_key(&(auction_id, player_id)))
            .await?;

        match &offered {
            Some(player) => {
                self.held.insert((auction_id, player.id), ());
                info!(auction_id, player_id = player.id, "Offered player.");
                publish(&self.events, AuctionEvent::PlayerOffered { auction_id, player: player.clone() });
            }
            None => info!(auction_id, "No upcoming players left."),
        }

        Ok(offered)
    }

    pub async fn sell(&self, request: SoldPlayer) -> AppResult<Player> {
        let (auction_id, team_id) = (request.auction_id, request.team_id);
        let key = (auction_id, request.player_id);

        let result = self.machine.mark_sold(request).await;
        self.held.invalidate(&key);

        let player = result?;
        publish(&self.events, AuctionEvent::PlayerSold { auction_id, team_id, player: player.clone() });
        Ok(player)
    }

    pub async fn pass(&self, request: UnsoldPlayer) -> AppResult<Player> {
        let auction_id = request.auction_id;
        let key = (auction_id, request.player_id);

        let result = self.machine.mark_unsold(request).await;
        self.held.invalidate(&key);

        let player = result?;
        publish(&self.events, AuctionEvent::PlayerUnsold { auction_id, player: player.clone() });
        Ok(player)
    }

    pub async fn correct(&self, request: CorrectPlayer) -> AppResult<Player> {
        let player = self.machine.correct(request).await?;
        self.release(player.auction_id, player.id);
        publish(
            &self.events,
            AuctionEvent::PlayerCorrected { auction_id: player.auction_id, player: player.clone() },
        );
        Ok(player)
    }

    pub fn release(&self, auction_id: i64, player_id: i64) {
        self.held.invalidate(&(auction_id, player_id));
    }

    #[cfg(test)]
    fn is_held(&self, auction_id: i64, player_id: i64) -> bool {
        self.held.contains_key(&(auction_id, player_id))
    }
}
