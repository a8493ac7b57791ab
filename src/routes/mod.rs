use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::services::websocket::websocket_handler;

pub mod bidding;
pub mod players;
pub mod teams;

pub fn router() -> Router {
    let api = Router::new()
        .route("/bidding/player", post(bidding::fetch_player))
        .route("/bidding/sold", post(bidding::player_sold))
        .route("/bidding/unsold", post(bidding::player_unsold))
        .route("/bidding/teams/all", post(teams::get_teams))
        .route("/players/get", post(players::get_players))
        .route("/players/save", post(players::save_players))
        .route("/players/update", patch(players::update_player))
        .route("/players/delete", delete(players::delete_player))
        .route("/players/squad", post(players::get_squad))
        .route("/players/eleven", post(players::get_eleven))
        .route("/players/eleven/save", post(players::save_eleven))
        .route("/ws", get(websocket_handler));

    Router::new().nest("/api/v1", api)
}
