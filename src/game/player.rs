//! Player state management.

use crate::game::Coord;

/// Unique identifier for a player. Players are numbered from 1.
pub type PlayerId = u8;

/// State for a single player.
///
/// Players are never removed from the game. Elimination is a terminal flag
/// so the end screen can still show score and kill counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    /// Unique identifier for this player.
    pub id: PlayerId,
    /// Spendable money.
    pub money: i64,
    /// Current score, a projection of live state recomputed every tick.
    pub score: f64,
    /// Whether this player is controlled through commands rather than AI.
    pub is_human: bool,
    /// Whether the player has lost every capital.
    pub is_eliminated: bool,
    /// Origin tile of the starting capital.
    pub capital: Coord,
    /// Enemy units this player's units have killed.
    pub units_killed: u32,
    /// Units this player has lost.
    pub units_lost: u32,
    /// Enemy buildings this player's units have destroyed.
    pub buildings_destroyed: u32,
    /// Flat income added on every economy tick.
    pub income_per_tick: i64,
    /// Tick on which the player was eliminated.
    pub eliminated_at: Option<u64>,
}

impl Player {
    /// Create a new player with the given ID, capital and starting money.
    #[must_use]
    pub fn new(id: PlayerId, capital: Coord, money: i64, is_human: bool) -> Self {
        Self {
            id,
            money,
            score: 0.0,
            is_human,
            is_eliminated: false,
            capital,
            units_killed: 0,
            units_lost: 0,
            buildings_destroyed: 0,
            income_per_tick: 0,
            eliminated_at: None,
        }
    }

    /// Whether the player is still in the game.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.is_eliminated
    }

    /// Whether the player can pay `cost`.
    #[must_use]
    pub const fn can_afford(&self, cost: i64) -> bool {
        self.money >= cost
    }

    /// Eliminate this player on the given tick. Has no effect if already
    /// eliminated.
    pub fn eliminate(&mut self, tick: u64) {
        if !self.is_eliminated {
            self.is_eliminated = true;
            self.eliminated_at = Some(tick);
        }
    }
}
