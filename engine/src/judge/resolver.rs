//! The mutable and immutable state threaded through main-phase adjudication.
//!
//! [`Context`] holds everything that is fixed for the duration of a turn's
//! resolution: the map, the adjudicator, and the orders under consideration.
//! [`ResolverState`] is the scratch space that accumulates partial results as
//! the [Kruijswijk guess-and-backtrack algorithm](http://uk.diplom.org/pouch/Zine/S2009M/Kruijswijk/DipMath.htm)
//! works through dependency cycles between orders.

use super::{Adjudicate, IllegalOrder, MappedMainOrder, Outcome, OrderState};
use crate::geo::{Map, ProvinceKey};
use crate::order::{Command, MainCommand};
use std::collections::HashMap;

/// A set of orders submitted for a turn, not yet adjudicated.
///
/// `Submission` is the entry point for main-phase resolution: it pairs the raw
/// order list with the map it was issued against and detects orders that can
/// never succeed regardless of what anyone else does.
pub struct Submission<'a> {
    world_map: &'a Map,
    orders: Vec<MappedMainOrder>,
}

impl<'a> Submission<'a> {
    pub fn new(world_map: &'a Map, orders: impl IntoIterator<Item = MappedMainOrder>) -> Self {
        Self {
            world_map,
            orders: orders.into_iter().collect(),
        }
    }

    /// Adjudicate the submission under the given rules.
    pub fn resolve<A: Adjudicate>(&'a self, rules: A) -> Outcome<'a, A> {
        Context::new(self.world_map, rules, &self.orders).resolve()
    }
}

/// The immutable parts of a turn's resolution: the map, the rules, and the
/// orders under consideration.
pub struct Context<'a, A> {
    pub world_map: &'a Map,

    /// The adjudicator used to resolve orders.
    pub rules: A,

    orders: Vec<&'a MappedMainOrder>,

    pub(in crate::judge) illegal_orders: HashMap<&'a MappedMainOrder, IllegalOrder>,
}

impl<'a, A> Context<'a, A> {
    /// Builds a context from a slice of orders, discarding orders that can
    /// never be adjudicated: multiple orders to the same unit, and moves with
    /// no possible path to their destination (even via convoy).
    pub fn new(world_map: &'a Map, rules: A, orders: &'a [MappedMainOrder]) -> Self {
        let mut order_counts: HashMap<&crate::geo::RegionKey, usize> = HashMap::new();
        for order in orders {
            *order_counts.entry(&order.region).or_insert(0) += 1;
        }

        let mut illegal_orders = HashMap::new();
        let mut legal_orders = Vec::with_capacity(orders.len());

        for order in orders {
            if order_counts[&order.region] > 1 {
                illegal_orders.insert(order, IllegalOrder::MultipleToSameUnit);
                continue;
            }

            legal_orders.push(order);
        }

        let positions = legal_orders
            .iter()
            .map(|&order| order.unit_position())
            .collect::<Vec<_>>();

        let mut orders = Vec::with_capacity(legal_orders.len());
        for order in legal_orders {
            if order.is_move() && !Self::path_may_exist(world_map, &positions, order) {
                illegal_orders.insert(order, IllegalOrder::UnreachableDestination);
            } else {
                orders.push(order);
            }
        }

        Self {
            world_map,
            rules,
            orders,
            illegal_orders,
        }
    }

    fn path_may_exist(
        world_map: &'a Map,
        positions: &[crate::UnitPosition<'a>],
        order: &'a MappedMainOrder,
    ) -> bool {
        let Some(dst) = order.move_dest() else {
            return true;
        };

        let direct = world_map
            .find_border_between(&order.region, dst)
            .map(|b| b.is_passable_by(order.unit_type))
            .unwrap_or(false);

        direct || super::convoy::route_may_exist(world_map, positions.iter().cloned(), order)
    }

    /// The orders under consideration, excluding any discarded as illegal.
    pub fn orders(&self) -> impl Iterator<Item = &'a MappedMainOrder> + '_ {
        self.orders.iter().copied()
    }

    /// Find the order, if any, issued to the unit occupying `province`.
    pub fn find_order_to_province(&self, province: &ProvinceKey) -> Option<&'a MappedMainOrder> {
        self.orders()
            .find(|order| order.region.province() == province)
    }
}

impl<'a, A: Adjudicate> Context<'a, A> {
    /// Adjudicate every order in this context, producing the turn's outcome.
    pub fn resolve(self) -> Outcome<'a, A> {
        let mut resolver = ResolverState::new();
        resolver.illegal_orders = self.illegal_orders.clone();
        Outcome::new(self, resolver)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolutionState {
    /// A value assumed true for the purpose of resolving a dependency cycle; may be
    /// revised once the rest of the cycle is known.
    Guessing(OrderState),

    /// A value that has been confirmed and will not change again.
    Known(OrderState),
}

impl ResolutionState {
    fn order_state(self) -> OrderState {
        match self {
            ResolutionState::Guessing(s) | ResolutionState::Known(s) => s,
        }
    }
}

/// Mutable state accumulated while adjudicating a turn.
///
/// This is created fresh for each resolution and threaded through every call
/// into the adjudicator, so that orders are only ever computed once.
#[derive(Debug, Clone)]
pub struct ResolverState<'a> {
    state: HashMap<&'a MappedMainOrder, ResolutionState>,

    /// Orders currently being resolved, in the order resolution was requested.
    /// Used to detect dependency cycles: if an order shows up in its own chain,
    /// everything from that point on forms a cycle that must be guessed at.
    dependency_chain: Vec<&'a MappedMainOrder>,

    pub(in crate::judge) illegal_orders: HashMap<&'a MappedMainOrder, IllegalOrder>,

    #[cfg(feature = "dependency-graph")]
    dependencies: std::collections::BTreeSet<(MappedMainOrder, MappedMainOrder)>,
}

impl<'a> ResolverState<'a> {
    pub fn new() -> Self {
        Self {
            state: HashMap::new(),
            dependency_chain: Vec::new(),
            illegal_orders: HashMap::new(),
            #[cfg(feature = "dependency-graph")]
            dependencies: std::collections::BTreeSet::new(),
        }
    }

    /// Resolve an order, reusing any cached result and recording the
    /// dependency if this call happens during resolution of another order.
    pub fn resolve<A: Adjudicate>(
        &mut self,
        context: &Context<'a, A>,
        order: &'a MappedMainOrder,
    ) -> OrderState {
        #[cfg(feature = "dependency-graph")]
        if let Some(&dependent) = self.dependency_chain.last() {
            self.dependencies
                .insert((dependent.clone(), order.clone()));
        }

        if let Some(known) = self.state.get(order) {
            return known.order_state();
        }

        if let Some(pos) = self.dependency_chain.iter().position(|&o| o == order) {
            return self.resolve_dependency_cycle(context, pos);
        }

        self.dependency_chain.push(order);
        let result = context.rules.adjudicate(context, self, order);
        self.dependency_chain.pop();

        self.state
            .entry(order)
            .or_insert(ResolutionState::Known(result));

        self.state[order].order_state()
    }

    /// Resolve every order from `cycle_start` to the end of the dependency chain
    /// as a unit, per Kruijswijk's guess-and-backtrack algorithm.
    ///
    /// A cycle of plain moves is allowed to succeed outright (DATC 6.C.03, circular
    /// movement). A cycle that involves a convoy order cannot be resolved this way
    /// without risking a paradox, so the Szykman rule is applied instead: convoy
    /// orders caught in the cycle fail, which is enough to break the loop.
    fn resolve_dependency_cycle<A: Adjudicate>(
        &mut self,
        context: &Context<'a, A>,
        cycle_start: usize,
    ) -> OrderState {
        let cycle = self.dependency_chain[cycle_start..].to_vec();
        let has_convoy = cycle
            .iter()
            .any(|o| matches!(o.command, MainCommand::Convoy(_)));

        for &order in &cycle {
            let guess = if has_convoy && matches!(order.command, MainCommand::Convoy(_)) {
                OrderState::Fails
            } else {
                OrderState::Succeeds
            };

            self.state.insert(order, ResolutionState::Guessing(guess));
        }

        for &order in &cycle {
            let confirmed = context.rules.adjudicate(context, self, order);
            self.state.insert(order, ResolutionState::Known(confirmed));
        }

        self.state[cycle[0]].order_state()
    }

    /// Whether `order` is currently standing in as a guess for a dependency cycle.
    ///
    /// Used by convoy adjudication to detect the Szykman-rule paradox case.
    pub fn order_in_paradox(&self, order: &MappedMainOrder) -> bool {
        matches!(self.state.get(order), Some(ResolutionState::Guessing(_)))
    }

    #[cfg(feature = "dependency-graph")]
    pub fn dependencies(&self) -> std::collections::BTreeSet<(MappedMainOrder, MappedMainOrder)> {
        self.dependencies.clone()
    }
}

impl<'a> Default for ResolverState<'a> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geo::standard_map;
    use crate::judge::Rulebook;

    #[test]
    fn context_drops_duplicate_orders_to_the_same_unit() {
        let orders = vec![
            "GER: A ber hold".parse::<MappedMainOrder>().unwrap(),
            "GER: A ber -> pru".parse::<MappedMainOrder>().unwrap(),
        ];

        let context = Context::new(standard_map(), Rulebook::default(), &orders);
        assert_eq!(0, context.orders().count());
        assert_eq!(2, context.illegal_orders.len());
    }

    #[test]
    fn context_keeps_legal_orders() {
        let orders = vec!["GER: A ber hold".parse::<MappedMainOrder>().unwrap()];

        let context = Context::new(standard_map(), Rulebook::default(), &orders);
        assert_eq!(1, context.orders().count());
        assert!(context.illegal_orders.is_empty());
    }
}
