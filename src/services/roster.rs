use chrono::Utc;
use tracing::info;
use validator::Validate;

use crate::dto::{
    event_dto::AuctionEvent,
    player_dto::{Player, SaveRoster, SquadByRole},
};
use crate::error::{AppError, AppResult};
use crate::services::{
    squad_ledger,
    websocket::{EventSender, publish},
};
use crate::store::{AuctionStore, auctions, matches, players};

/// Roster administration: uploading, listing and removing an auction's players.
#[derive(Clone)]
pub struct RosterService {
    store: AuctionStore,
    events: EventSender,
}

impl RosterService {
    pub fn new(store: AuctionStore, events: EventSender) -> Self {
        Self { store, events }
    }

    /// Inserts every player as upcoming, or none of them. Fantasy auctions get
    /// a match record per player in the same transaction.
    pub async fn save_roster(&self, request: SaveRoster) -> AppResult<Vec<Player>> {
        request.validate()?;
        let auction_id = request.auction_id;

        let saved = self
            .store
            .write_transaction(move |conn| {
                Box::pin(async move {
                    let auction = auctions::find(&mut *conn, auction_id)
                        .await?
                        .ok_or_else(|| AppError::not_found(format!("auction {auction_id} does not exist")))?;

                    let now = Utc::now();
                    let mut saved = Vec::with_capacity(request.players.len());
                    for new_player in &request.players {
                        let player = players::insert(&mut *conn, auction_id, new_player, now)
                            .await
                            .map_err(|e| match AppError::from(e) {
                                AppError::Conflict(_) => AppError::conflict(format!(
                                    "player number {} is already taken in auction {auction_id}",
                                    new_player.player_number
                                )),
                                other => other,
                            })?;
                        if auction.is_fantasy_mode {
                            matches::insert_for_player(&mut *conn, player.id).await?;
                        }
                        saved.push(player);
                    }
                    Ok(saved)
                })
            })
            .await?;

        info!(auction_id, count = saved.len(), "Saved auction roster.");
        publish(&self.events, AuctionEvent::RosterChanged { auction_id });
        Ok(saved)
    }

    pub async fn list_players(&self, auction_id: i64) -> AppResult<Vec<Player>> {
        self.store
            .transaction(move |conn| {
                Box::pin(async move {
                    if auctions::find(&mut *conn, auction_id).await?.is_none() {
                        return Err(AppError::not_found(format!("auction {auction_id} does not exist")));
                    }
                    Ok(players::list_for_auction(conn, auction_id).await?)
                })
            })
            .await
    }

    /// Removes the player together with its squad membership and match record.
    pub async fn delete_player(&self, player_id: i64) -> AppResult<Player> {
        let player = self
            .store
            .write_transaction(move |conn| {
                Box::pin(async move {
                    let player = players::find(&mut *conn, player_id)
                        .await?
                        .ok_or_else(|| AppError::not_found(format!("player {player_id} does not exist")))?;

                    if let Some(team_id) = squad_ledger::team_of(&mut *conn, player_id).await? {
                        squad_ledger::remove_from_squad(&mut *conn, team_id, player_id).await?;
                    }
                    matches::delete_for_player(&mut *conn, player_id).await?;
                    players::delete(conn, player_id).await?;
                    Ok(player)
                })
            })
            .await?;

        info!(player_id, auction_id = player.auction_id, "Deleted player.");
        publish(&self.events, AuctionEvent::RosterChanged { auction_id: player.auction_id });
        Ok(player)
    }

    pub async fn squad_by_role(&self, team_id: i64) -> AppResult<SquadByRole> {
        self.store
            .transaction(move |conn| {
                Box::pin(async move {
                    squad_ledger::load_team(&mut *conn, team_id).await?;
                    let members = squad_ledger::squad_players(conn, team_id).await?;
                    Ok(SquadByRole::from_players(members))
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::broadcast;

    use super::*;
    use crate::dto::bidding_dto::SoldPlayer;
    use crate::dto::player_dto::{Hammer, Role};
    use crate::services::state_machine::PlayerStateMachine;
    use crate::store::testing;

    fn roster(store: &AuctionStore) -> RosterService {
        let (tx, _) = broadcast::channel(16);
        RosterService::new(store.clone(), tx)
    }

    #[tokio::test]
    async fn saved_players_start_upcoming_with_match_records_in_fantasy_mode() {
        let store = testing::memory_store().await;
        let auction = testing::seed_auction(&store, 1000.0, true).await;
        let service = roster(&store);

        let saved = service
            .save_roster(SaveRoster {
                auction_id: auction.id,
                players: vec![
                    testing::new_player(2, "Second", Role::Bowler, "India"),
                    testing::new_player(1, "First", Role::Batter, "England"),
                ],
            })
            .await
            .unwrap();
        assert_eq!(saved.len(), 2);
        assert!(saved.iter().all(|p| p.hammer == Hammer::Upcoming && p.selling_price == 0.0));

        let listed = service.list_players(auction.id).await.unwrap();
        let numbers: Vec<i64> = listed.iter().map(|p| p.player_number).collect();
        assert_eq!(numbers, vec![1, 2]);

        let mut conn = store.pool().acquire().await.unwrap();
        for player in &saved {
            let record = matches::find_for_player(&mut conn, player.id).await.unwrap();
            assert!(record.is_some());
        }
    }

    #[tokio::test]
    async fn duplicate_player_number_saves_nothing() {
        let store = testing::memory_store().await;
        let auction = testing::seed_auction(&store, 1000.0, false).await;
        let service = roster(&store);

        let err = service
            .save_roster(SaveRoster {
                auction_id: auction.id,
                players: vec![
                    testing::new_player(7, "One", Role::Batter, "India"),
                    testing::new_player(7, "Two", Role::Batter, "India"),
                ],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(service.list_players(auction.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn roster_requires_players_and_an_existing_auction() {
        let store = testing::memory_store().await;
        let service = roster(&store);

        let empty = service.save_roster(SaveRoster { auction_id: 1, players: vec![] }).await;
        assert!(matches!(empty, Err(AppError::Validation(_))));

        let missing = service
            .save_roster(SaveRoster {
                auction_id: 42,
                players: vec![testing::new_player(1, "Solo", Role::Batter, "India")],
            })
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn deleting_a_sold_player_empties_the_squad_slot() {
        let store = testing::memory_store().await;
        let auction = testing::seed_auction(&store, 1000.0, true).await;
        let team = testing::seed_team(&store, auction.id, "T1").await;
        let service = roster(&store);
        let saved = service
            .save_roster(SaveRoster {
                auction_id: auction.id,
                players: vec![testing::new_player(1, "Keeper", Role::WicketKeeper, "India")],
            })
            .await
            .unwrap();
        let player_id = saved[0].id;

        PlayerStateMachine::new(store.clone())
            .mark_sold(SoldPlayer {
                player_id,
                auction_id: auction.id,
                team_id: team.id,
                team_name: "T1".to_string(),
                selling_price: 120.0,
            })
            .await
            .unwrap();
        assert_eq!(service.squad_by_role(team.id).await.unwrap().wicket_keepers.len(), 1);

        let deleted = service.delete_player(player_id).await.unwrap();
        assert_eq!(deleted.id, player_id);
        assert!(testing::reload_player(&store, player_id).await.is_none());
        assert!(service.squad_by_role(team.id).await.unwrap().wicket_keepers.is_empty());

        let mut conn = store.pool().acquire().await.unwrap();
        assert!(matches::find_for_player(&mut conn, player_id).await.unwrap().is_none());
        drop(conn);

        let again = service.delete_player(player_id).await;
        assert!(matches!(again, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn squad_of_unknown_team_is_not_found() {
        let store = testing::memory_store().await;
        let result = roster(&store).squad_by_role(99).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
