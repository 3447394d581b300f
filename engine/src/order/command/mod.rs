use crate::geo::Location;
use std::fmt;

mod build_phase;
mod main_phase;
mod retreat_phase;

pub use self::build_phase::BuildCommand;
pub use self::main_phase::{ConvoyedMove, MainCommand, MoveCommand, SupportedOrder};
pub use self::retreat_phase::RetreatCommand;

/// A command dispatched to a unit at a location.
///
/// Implemented by the per-phase command enums (`MainCommand`, `RetreatCommand`,
/// `BuildCommand`) and by `Order` itself, so adjudication code can stay generic
/// over which phase's orders it's looking at.
pub trait Command<L: Location>: fmt::Display {
    /// The region this command would move its unit to, if it is a move.
    fn move_dest(&self) -> Option<&L>;

    /// Whether this command is a move (as opposed to hold, support, convoy, or build/disband).
    fn is_move(&self) -> bool;
}
