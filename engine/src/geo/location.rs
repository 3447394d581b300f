use crate::ShortName;
use std::fmt::Debug;
use std::hash::Hash;

/// An addressable location in the Diplomacy world.
///
/// This trait is used during order parsing and adjudication so that code can be
/// generic over whether it operates on bare province keys or coast-aware regions.
pub trait Location: ShortName + Clone + Debug + PartialEq + Eq + Hash {
    /// The type used to identify the province that contains this location.
    type Province: PartialEq;

    /// Gets the province containing this location.
    fn province(&self) -> &Self::Province;
}
