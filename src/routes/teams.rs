use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::info;

use crate::dto::auction_dto::AuctionRef;
use crate::error::AppResult;
use crate::services::{auth_user::AuthUser, squad_ledger, validated_json::ValidatedJson};
use crate::store::AuctionStore;

/**
 * POST request to get every team of an auction with its remaining purse and squad make-up.
 */
pub async fn get_teams(
    Extension(store): Extension<AuctionStore>,
    AuthUser(_claims): AuthUser,
    ValidatedJson(payload): ValidatedJson<AuctionRef>,
) -> AppResult<impl IntoResponse> {
    info!(auction_id = payload.auction_id, "Fetching team summaries.");

    let teams = squad_ledger::team_summaries(&store, payload.auction_id).await?;
    Ok((StatusCode::OK, Json(json!({ "message": "Teams fetched", "teams": teams }))))
}
