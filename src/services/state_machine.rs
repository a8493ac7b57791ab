use chrono::Utc;
use rand::Rng;
use sqlx::SqliteConnection;
use tracing::{error, info};
use validator::Validate;

use crate::dto::{
    bidding_dto::{CorrectPlayer, SoldPlayer, UnsoldPlayer},
    player_dto::{Hammer, Player},
    team_dto::Team,
};
use crate::error::{AppError, AppResult};
use crate::services::{
    squad_ledger,
    transition::{PASSABLE, SELLABLE, SquadEffect},
};
use crate::store::{AuctionStore, matches, players, players::HammerWrite, teams};

/// Owns every change to a player's hammer state and the squad and match
/// bookkeeping that has to move with it.
#[derive(Clone)]
pub struct PlayerStateMachine {
    store: AuctionStore,
}

impl PlayerStateMachine {
    pub fn new(store: AuctionStore) -> Self {
        Self { store }
    }

    /// Samples one upcoming player of the auction uniformly at random,
    /// preferring players for which `is_held` is false. `None` means the
    /// roster is exhausted.
    pub async fn offer_next<F>(&self, auction_id: i64, is_held: F) -> AppResult<Option<Player>>
    where
        F: Fn(i64) -> bool + Send,
    {
        let candidates = self
            .store
            .with_deadline(async {
                let mut conn = self.store.pool().acquire().await?;
                Ok(players::list_upcoming(&mut conn, auction_id).await?)
            })
            .await?;

        Ok(pick(candidates, is_held))
    }

    pub async fn mark_sold(&self, request: SoldPlayer) -> AppResult<Player> {
        request.validate()?;
        let SoldPlayer { player_id, auction_id, team_id, team_name, selling_price } = request;

        let player = self
            .store
            .write_transaction(move |conn| {
                Box::pin(async move {
                    let write = HammerWrite {
                        player_id,
                        auction_id,
                        expected: &SELLABLE,
                        hammer: Hammer::Sold,
                        current_team: team_name.as_str(),
                        selling_price,
                        bid: Some((team_name.as_str(), selling_price)),
                    };
                    let Some(player) = players::write_hammer(&mut *conn, &write, Utc::now()).await? else {
                        return Err(explain_miss(conn, player_id, auction_id, Hammer::Sold).await);
                    };

                    let team = teams::find_in_auction(&mut *conn, team_id, auction_id)
                        .await?
                        .ok_or_else(|| {
                            AppError::not_found(format!("team {team_id} is not part of auction {auction_id}"))
                        })?;
                    if team.name != team_name {
                        return Err(AppError::validation(format!(
                            "team {team_id} is named '{}', not '{team_name}'",
                            team.name
                        )));
                    }

                    squad_ledger::add_to_squad(&mut *conn, team_id, player_id).await?;
                    Ok(player)
                })
            })
            .await?;

        info!(player_id, auction_id, team_id, "Player sold for {}.", selling_price);
        Ok(player)
    }

    pub async fn mark_unsold(&self, request: UnsoldPlayer) -> AppResult<Player> {
        request.validate()?;
        let UnsoldPlayer { player_id, auction_id } = request;

        let player = self
            .store
            .write_transaction(move |conn| {
                Box::pin(async move {
                    let write = HammerWrite {
                        player_id,
                        auction_id,
                        expected: &PASSABLE,
                        hammer: Hammer::Unsold,
                        current_team: "",
                        selling_price: 0.0,
                        bid: None,
                    };
                    match players::write_hammer(&mut *conn, &write, Utc::now()).await? {
                        Some(player) => Ok(player),
                        None => Err(explain_miss(conn, player_id, auction_id, Hammer::Unsold).await),
                    }
                })
            })
            .await?;

        info!(player_id, auction_id, "Player went unsold.");
        Ok(player)
    }

    /// Moves a player between any two hammer states after the fact. The old
    /// squad is left before the new one is joined, and the player row is
    /// written last; the whole correction commits or nothing does.
    pub async fn correct(&self, request: CorrectPlayer) -> AppResult<Player> {
        request.validate()?;
        let CorrectPlayer { player_id, hammer: target, team_id, selling_price } = request;

        match (target, team_id, selling_price) {
            (Hammer::Sold, None, _) => {
                return Err(AppError::validation("team_id is required to mark a player sold"));
            }
            (Hammer::Upcoming | Hammer::Unsold, Some(_), _) | (Hammer::Upcoming | Hammer::Unsold, _, Some(_)) => {
                return Err(AppError::validation(
                    "team_id and selling_price only apply when marking a player sold",
                ));
            }
            _ => {}
        }

        let player = self
            .store
            .write_transaction(move |conn| {
                Box::pin(async move {
                    let current = players::find(&mut *conn, player_id)
                        .await?
                        .ok_or_else(|| AppError::not_found(format!("player {player_id} does not exist")))?;

                    let target_team = match team_id {
                        Some(team_id) => Some(
                            teams::find_in_auction(&mut *conn, team_id, current.auction_id)
                                .await?
                                .ok_or_else(|| {
                                    AppError::not_found(format!(
                                        "team {team_id} is not part of auction {}",
                                        current.auction_id
                                    ))
                                })?,
                        ),
                        None => None,
                    };

                    let price = match target {
                        Hammer::Sold => selling_price.unwrap_or(current.selling_price),
                        Hammer::Upcoming | Hammer::Unsold => 0.0,
                    };
                    if target == Hammer::Sold && price <= 0.0 {
                        return Err(AppError::validation("selling_price is required to mark a player sold"));
                    }

                    apply_correction(conn, &current, target, target_team.as_ref(), price).await
                })
            })
            .await?;

        info!(player_id, hammer = %player.hammer, team = %player.current_team, "Player corrected.");
        Ok(player)
    }
}

/// Moves `current` to `target`, leaving its old squad before joining the new
/// one. The player row is written last and only if its hammer still matches
/// `current`.
async fn apply_correction(
    conn: &mut SqliteConnection,
    current: &Player,
    target: Hammer,
    target_team: Option<&Team>,
    price: f64,
) -> AppResult<Player> {
    let player_id = current.id;
    let effect = SquadEffect::of(current.hammer, target);

    if effect.leaves_current() {
        let old_team = squad_ledger::team_of(&mut *conn, player_id).await?;
        match old_team {
            Some(old_team) => squad_ledger::remove_from_squad(&mut *conn, old_team, player_id).await?,
            None => error!(player_id, "Sold player was not in any squad; correcting anyway."),
        }
        if old_team != target_team.map(|t| t.id) {
            matches::clear_selection(&mut *conn, player_id).await?;
        }
    }

    if effect.joins_target() {
        if let Some(team) = target_team {
            squad_ledger::add_to_squad(&mut *conn, team.id, player_id).await?;
        }
    }

    let write = HammerWrite {
        player_id,
        auction_id: current.auction_id,
        expected: &[current.hammer],
        hammer: target,
        current_team: target_team.map(|t| t.name.as_str()).unwrap_or(""),
        selling_price: price,
        bid: target_team.map(|t| (t.name.as_str(), price)),
    };
    players::write_hammer(conn, &write, Utc::now())
        .await?
        .ok_or_else(|| AppError::conflict(format!("player {player_id} changed during the correction")))
}

/// Works out why a compare-on-write matched nothing.
async fn explain_miss(conn: &mut SqliteConnection, player_id: i64, auction_id: i64, attempted: Hammer) -> AppError {
    match players::find_in_auction(conn, player_id, auction_id).await {
        Ok(None) => AppError::not_found(format!("player {player_id} is not part of auction {auction_id}")),
        Ok(Some(current)) => AppError::conflict(format!(
            "player {player_id} is already {}; cannot mark it {attempted}",
            current.hammer
        )),
        Err(e) => e.into(),
    }
}

fn pick<F>(candidates: Vec<Player>, is_held: F) -> Option<Player>
where
    F: Fn(i64) -> bool,
{
    let (free, held): (Vec<Player>, Vec<Player>) = candidates.into_iter().partition(|p| !is_held(p.id));
    let mut pool = if free.is_empty() { held } else { free };
    if pool.is_empty() {
        return None;
    }

    let index = rand::rng().random_range(0..pool.len());
    Some(pool.swap_remove(index))
}
