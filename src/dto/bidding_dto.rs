use serde::Deserialize;
use validator::Validate;

use crate::dto::player_dto::Hammer;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SoldPlayer {
    #[validate(range(min = 1))]
    pub player_id: i64,
    #[validate(range(min = 1))]
    pub auction_id: i64,
    #[validate(range(min = 1))]
    pub team_id: i64,
    #[validate(length(min = 1, message = "team_name is required"))]
    pub team_name: String,
    #[validate(range(exclusive_min = 0.0, message = "selling_price must be greater than zero"))]
    pub selling_price: f64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UnsoldPlayer {
    #[validate(range(min = 1))]
    pub player_id: i64,
    #[validate(range(min = 1))]
    pub auction_id: i64,
}

/// After-the-fact correction of a player's hammer state.
///
/// `team_id` is required when the target state is sold and rejected otherwise.
/// `selling_price` defaults to the player's current price when omitted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CorrectPlayer {
    #[validate(range(min = 1))]
    pub player_id: i64,
    pub hammer: Hammer,
    #[validate(range(min = 1))]
    pub team_id: Option<i64>,
    #[validate(range(exclusive_min = 0.0, message = "selling_price must be greater than zero"))]
    pub selling_price: Option<f64>,
}
