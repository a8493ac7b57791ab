use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::info;

use crate::dto::{
    auction_dto::AuctionRef,
    bidding_dto::CorrectPlayer,
    player_dto::{PlayerRef, SaveRoster},
    team_dto::{SaveEleven, TeamRef},
};
use crate::error::AppResult;
use crate::services::{
    auth_user::AuthUser, fantasy::FantasyService, roster::RosterService, session::AuctionSession,
    validated_json::ValidatedJson,
};

/**
 * POST request to list an auction's players by player number.
 */
pub async fn get_players(
    Extension(roster): Extension<RosterService>,
    AuthUser(_claims): AuthUser,
    ValidatedJson(payload): ValidatedJson<AuctionRef>,
) -> AppResult<impl IntoResponse> {
    let players = roster.list_players(payload.auction_id).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Players fetched", "players": players }))))
}

/**
 * POST request to upload an auction's roster.
 */
pub async fn save_players(
    Extension(roster): Extension<RosterService>,
    AuthUser(claims): AuthUser,
    ValidatedJson(payload): ValidatedJson<SaveRoster>,
) -> AppResult<impl IntoResponse> {
    info!(
        auction_id = payload.auction_id,
        count = payload.players.len(),
        user = %claims.sub,
        "Saving roster."
    );

    let players = roster.save_roster(payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Players saved", "players": players }))))
}

/**
 * PATCH request to correct a player's hammer after the fact.
 */
pub async fn update_player(
    Extension(session): Extension<AuctionSession>,
    AuthUser(claims): AuthUser,
    ValidatedJson(payload): ValidatedJson<CorrectPlayer>,
) -> AppResult<impl IntoResponse> {
    info!(player_id = payload.player_id, hammer = %payload.hammer, user = %claims.sub, "Correcting player.");

    let player = session.correct(payload).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Player updated", "player": player }))))
}

/**
 * DELETE request to remove a player from the auction.
 */
pub async fn delete_player(
    Extension(roster): Extension<RosterService>,
    Extension(session): Extension<AuctionSession>,
    AuthUser(claims): AuthUser,
    ValidatedJson(payload): ValidatedJson<PlayerRef>,
) -> AppResult<impl IntoResponse> {
    info!(player_id = payload.player_id, user = %claims.sub, "Deleting player.");

    let player = roster.delete_player(payload.player_id).await?;
    session.release(player.auction_id, player.id);
    Ok((StatusCode::OK, Json(json!({ "message": "Player deleted", "player": player }))))
}

/**
 * POST request to get a team's squad grouped by role.
 */
pub async fn get_squad(
    Extension(roster): Extension<RosterService>,
    AuthUser(_claims): AuthUser,
    ValidatedJson(payload): ValidatedJson<TeamRef>,
) -> AppResult<impl IntoResponse> {
    let squad = roster.squad_by_role(payload.team_id).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Squad fetched", "squad": squad }))))
}

/**
 * POST request to get the playing XI currently in play.
 */
pub async fn get_eleven(
    Extension(fantasy): Extension<FantasyService>,
    AuthUser(_claims): AuthUser,
    ValidatedJson(payload): ValidatedJson<TeamRef>,
) -> AppResult<impl IntoResponse> {
    let players = fantasy.current_eleven(payload.team_id).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Playing XI fetched", "players": players }))))
}

/**
 * POST request to choose the next playing XI.
 */
pub async fn save_eleven(
    Extension(fantasy): Extension<FantasyService>,
    AuthUser(claims): AuthUser,
    ValidatedJson(payload): ValidatedJson<SaveEleven>,
) -> AppResult<impl IntoResponse> {
    info!(team_id = payload.team_id, user = %claims.sub, "Saving playing XI.");

    let players = fantasy.save_eleven(payload).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Playing XI saved", "players": players }))))
}
