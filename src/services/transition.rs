use crate::dto::player_dto::Hammer;

/// Hammer states MarkSold may start from. Unsold players can be re-offered.
pub const SELLABLE: [Hammer; 2] = [Hammer::Upcoming, Hammer::Unsold];

/// Hammer states MarkUnsold may start from.
pub const PASSABLE: [Hammer; 1] = [Hammer::Upcoming];

/// Squad side effect of moving a player between two hammer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquadEffect {
    Keep,
    Join,
    Leave,
    /// Leave the current squad, then join the target one.
    Move,
}

impl SquadEffect {
    pub fn of(from: Hammer, to: Hammer) -> Self {
        match (from, to) {
            (Hammer::Sold, Hammer::Sold) => SquadEffect::Move,
            (Hammer::Sold, _) => SquadEffect::Leave,
            (_, Hammer::Sold) => SquadEffect::Join,
            _ => SquadEffect::Keep,
        }
    }

    pub fn leaves_current(self) -> bool {
        matches!(self, SquadEffect::Leave | SquadEffect::Move)
    }

    pub fn joins_target(self) -> bool {
        matches!(self, SquadEffect::Join | SquadEffect::Move)
    }
}
