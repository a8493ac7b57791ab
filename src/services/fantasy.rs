use std::collections::HashSet;

use tracing::info;
use validator::Validate;

use crate::dto::{player_dto::Player, team_dto::SaveEleven};
use crate::error::{AppError, AppResult};
use crate::services::squad_ledger;
use crate::store::{AuctionStore, auctions, matches};

#[derive(Clone)]
pub struct FantasyService {
    store: AuctionStore,
}

impl FantasyService {
    pub fn new(store: AuctionStore) -> Self {
        Self { store }
    }

    /// Picks the team's next playing XI. Everyone else in the squad is benched.
    pub async fn save_eleven(&self, request: SaveEleven) -> AppResult<Vec<Player>> {
        request.validate()?;
        let team_id = request.team_id;

        let distinct: HashSet<i64> = request.player_ids.iter().copied().collect();
        if distinct.len() != request.player_ids.len() {
            return Err(AppError::validation("playing XI contains duplicate players"));
        }

        let eleven = self
            .store
            .write_transaction(move |conn| {
                Box::pin(async move {
                    let team = squad_ledger::load_team(&mut *conn, team_id).await?;
                    let auction = auctions::find(&mut *conn, team.auction_id)
                        .await?
                        .ok_or_else(|| AppError::not_found(format!("auction {} does not exist", team.auction_id)))?;
                    if !auction.is_fantasy_mode {
                        return Err(AppError::validation(format!(
                            "auction {} is not running in fantasy mode",
                            auction.id
                        )));
                    }

                    if let Some(outsider) = request.player_ids.iter().find(|id| !team.squad.contains(id)) {
                        return Err(AppError::validation(format!(
                            "player {outsider} is not in the squad of team {team_id}"
                        )));
                    }

                    let benched: Vec<i64> = team.squad.iter().copied().filter(|id| !distinct.contains(id)).collect();
                    for player_id in &team.squad {
                        matches::ensure_for_player(&mut *conn, *player_id).await?;
                    }
                    matches::set_next_xi(&mut *conn, &request.player_ids, true).await?;
                    matches::set_next_xi(&mut *conn, &benched, false).await?;

                    let squad = squad_ledger::squad_players(conn, team_id).await?;
                    Ok(squad.into_iter().filter(|p| distinct.contains(&p.id)).collect::<Vec<_>>())
                })
            })
            .await?;

        info!(team_id, "Saved next playing XI.");
        Ok(eleven)
    }

    /// Squad members selected for the XI currently in play.
    pub async fn current_eleven(&self, team_id: i64) -> AppResult<Vec<Player>> {
        self.store
            .transaction(move |conn| {
                Box::pin(async move {
                    squad_ledger::load_team(&mut *conn, team_id).await?;
                    let players = sqlx::query_as::<_, Player>(
                        r#"
                        SELECT p.* FROM players p
                        JOIN squad_members sm ON sm.player_id = p.id
                        JOIN matches m ON m.player_id = p.id
                        WHERE sm.team_id = ? AND m.current_xi = 1
                        ORDER BY p.player_number
                        "#,
                    )
                    .bind(team_id)
                    .fetch_all(conn)
                    .await?;
                    Ok(players)
                })
            })
            .await
    }
}
