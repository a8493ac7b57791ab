pub mod auth_user;
pub mod fantasy;
pub mod roster;
pub mod session;
pub mod squad_ledger;
pub mod state_machine;
pub mod transition;
pub mod validated_json;
pub mod websocket;
