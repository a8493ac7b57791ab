use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::info;

use crate::dto::{
    auction_dto::AuctionRef,
    bidding_dto::{SoldPlayer, UnsoldPlayer},
};
use crate::error::{AppError, AppResult};
use crate::services::{auth_user::AuthUser, session::AuctionSession, validated_json::ValidatedJson};

/**
 * POST request to put the next upcoming player under the hammer.
 */
pub async fn fetch_player(
    Extension(session): Extension<AuctionSession>,
    AuthUser(claims): AuthUser,
    ValidatedJson(payload): ValidatedJson<AuctionRef>,
) -> AppResult<impl IntoResponse> {
    info!(auction_id = payload.auction_id, user = %claims.sub, "Fetching next player.");

    let player = session
        .offer_next(payload.auction_id)
        .await?
        .ok_or_else(|| AppError::not_found("No upcoming players left in this auction"))?;

    Ok((StatusCode::OK, Json(json!({ "message": "Player fetched", "player": player }))))
}

/**
 * POST request to sell the player to a team.
 */
pub async fn player_sold(
    Extension(session): Extension<AuctionSession>,
    AuthUser(claims): AuthUser,
    ValidatedJson(payload): ValidatedJson<SoldPlayer>,
) -> AppResult<impl IntoResponse> {
    info!(
        player_id = payload.player_id,
        team_id = payload.team_id,
        user = %claims.sub,
        "Selling player."
    );

    let player = session.sell(payload).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Player sold", "player": player }))))
}

/**
 * POST request to pass on the player.
 */
pub async fn player_unsold(
    Extension(session): Extension<AuctionSession>,
    AuthUser(claims): AuthUser,
    ValidatedJson(payload): ValidatedJson<UnsoldPlayer>,
) -> AppResult<impl IntoResponse> {
    info!(player_id = payload.player_id, user = %claims.sub, "Marking player unsold.");

    let player = session.pass(payload).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Player unsold", "player": player }))))
}
