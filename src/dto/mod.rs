pub mod auction_dto;
pub mod bidding_dto;
pub mod claims_dto;
pub mod event_dto;
pub mod match_dto;
pub mod player_dto;
pub mod team_dto;
