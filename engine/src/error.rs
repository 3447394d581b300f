//! Top-level error type for board-state construction and phase resolution.
//!
//! These describe failures of the engine or its inputs, not the outcome of any
//! particular order: a move that bounces is not an error, but a board that claims
//! two units occupy the same province is.

use crate::board::BoardSeason;
use crate::geo::ProvinceKey;
use crate::Nation;
use thiserror::Error;

/// Failures that can occur while building a [`crate::BoardState`] from external
/// data, or while asking the engine to advance one.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdjudicationError {
    /// A province code in the input does not exist on the map.
    #[error("unknown province `{0}`")]
    UnknownProvince(String),

    /// A region code (province plus coast) does not exist on the map.
    #[error("unknown region `{0}`")]
    UnknownRegion(String),

    /// A supply-center ownership entry named a province that isn't a supply center.
    #[error("`{0}` was given an owner, but is not a supply center")]
    NotASupplyCenter(ProvinceKey),

    /// An order or ownership entry referenced a nation that doesn't exist.
    #[error("unknown power `{0}`")]
    UnknownNation(Nation),

    /// An order was submitted for a unit that the board does not have at that location.
    #[error("{nation} has no unit at {region} to order")]
    NoSuchUnit { nation: Nation, region: String },

    /// The board violates the one-unit-per-province invariant.
    #[error("{0} is occupied by more than one unit")]
    MultipleUnitsInProvince(ProvinceKey),

    /// Orders of a kind not accepted in the board's current phase were submitted.
    #[error("{season} does not accept {submitted} orders")]
    WrongOrderKind {
        season: BoardSeason,
        submitted: &'static str,
    },

    /// A fatal internal invariant was violated. Unlike the other variants, this
    /// should never occur from untrusted input alone; seeing one means the
    /// engine itself has a bug.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}
