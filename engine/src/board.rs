//! The external checkpoint representation of a game in progress, and the
//! phase-resolution entry points that advance one.
//!
//! Unlike the types in [`crate::judge`], which borrow heavily from the orders
//! under consideration to avoid cloning during resolution, everything here is
//! owned. A [`BoardState`] is meant to be serialized between phases, so it
//! carries no lifetime and no reference to the [`Map`] it was adjudicated
//! against; callers pass the map alongside the state to every entry point.

use crate::error::AdjudicationError;
use crate::geo::{Map, ProvinceKey, RegionKey, SupplyCenter};
use crate::judge::{
    self, build, retreat, IllegalOrder, MappedBuildOrder, MappedMainOrder, MappedRetreatOrder,
    OrderOutcome, OrderState, Rulebook, SupportOutcome,
};
use crate::order::{BuildCommand, Command, MainCommand, Order, RetreatCommand};
use crate::{Nation, ShortName, UnitType};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// The season a board is currently in. Folds the retreat step into its own
/// tag, matching how the checkpoint format reports phases to callers: they
/// don't need to know that a retreat phase is "attached" to the movement
/// phase that preceded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoardSeason {
    Spring,
    Fall,
    Retreat,
    Winter,
}

impl std::fmt::Display for BoardSeason {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(match self {
            BoardSeason::Spring => "Spring",
            BoardSeason::Fall => "Fall",
            BoardSeason::Retreat => "Retreat",
            BoardSeason::Winter => "Winter",
        })
    }
}

/// The movement season a pending retreat phase follows. Only movement phases
/// can produce dislodgements, so this is a strict subset of [`BoardSeason`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementSeason {
    Spring,
    Fall,
}

/// A unit on the board, identified by its owner, kind, and current region.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacedUnit {
    pub power: Nation,
    #[cfg_attr(feature = "serde", serde(with = "unit_type_long"))]
    pub unit_type: UnitType,
    pub location: ProvinceKey,
    #[cfg_attr(feature = "serde", serde(with = "coast_code"))]
    pub coast: Option<crate::geo::Coast>,
}

impl PlacedUnit {
    fn region(&self) -> RegionKey {
        RegionKey::new(self.location.clone(), self.coast)
    }
}

/// A unit's identity without its position, used once it has been dislodged
/// and has no location on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitRef {
    pub power: Nation,
    #[cfg_attr(feature = "serde", serde(with = "unit_type_long"))]
    pub unit_type: UnitType,
}

/// A unit dislodged during the most recent movement phase, awaiting a retreat
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DislodgedUnit {
    pub unit: UnitRef,
    pub dislodged_from: ProvinceKey,
    pub dislodger_origin: ProvinceKey,
    pub contested_provinces: Vec<ProvinceKey>,
}

/// A complete snapshot of a game in progress, suitable for persisting between
/// phases. Deliberately does not carry the [`Map`] it was produced against;
/// every resolution entry point takes the map as an explicit parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardState {
    pub year: usize,
    pub season: BoardSeason,
    pub previous_season: Option<MovementSeason>,
    pub units: Vec<PlacedUnit>,
    pub supply_centers: BTreeMap<ProvinceKey, Nation>,
    pub dislodged_units: Vec<DislodgedUnit>,
}

impl BoardState {
    fn unit_at(&self, region: &RegionKey) -> Option<&PlacedUnit> {
        self.units.iter().find(|u| &u.region() == region)
    }
}

/// A power's victory, reported once its supply-center count reaches the
/// winning threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Victory {
    pub power: Nation,
    pub year: usize,
}

/// The minimum supply-center count that ends the game.
const VICTORY_THRESHOLD: usize = 18;

/// Explanatory output accompanying a resolved movement phase.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub illegal_orders: Vec<(MappedMainOrder, IllegalOrder)>,
    pub invalid_supports: BTreeSet<ProvinceKey>,
    pub cut_supports: BTreeSet<ProvinceKey>,
    pub dislodged: BTreeSet<ProvinceKey>,
    pub contested: BTreeSet<ProvinceKey>,
    /// One line per order that participated in resolution, drawn from the
    /// closed vocabulary described in the adjudicator's error handling design.
    pub outcomes: Vec<(ProvinceKey, String)>,
}

/// `serde(with = ...)` module matching the checkpoint format's
/// `"Army"`/`"Fleet"` spelling, which differs from [`UnitType`]'s own
/// canonical short-form serialization used in orders (`"A"`/`"F"`).
#[cfg(feature = "serde")]
mod unit_type_long {
    use crate::UnitType;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &UnitType, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            UnitType::Army => "Army",
            UnitType::Fleet => "Fleet",
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<UnitType, D::Error> {
        match String::deserialize(deserializer)?.as_str() {
            "Army" => Ok(UnitType::Army),
            "Fleet" => Ok(UnitType::Fleet),
            other => Err(serde::de::Error::custom(format!(
                "unknown unit type `{other}`"
            ))),
        }
    }
}

/// `serde(with = ...)` module matching the checkpoint format's bare coast
/// codes (`"nc"`, `"ec"`, `"sc"`, `"wc"`, or null), which differ from
/// [`crate::geo::Coast`]'s own `ShortName` (`"(nc)"`, parenthesized).
#[cfg(feature = "serde")]
mod coast_code {
    use crate::geo::Coast;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Coast>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value
            .map(|coast| match coast {
                Coast::North => "nc",
                Coast::East => "ec",
                Coast::South => "sc",
                Coast::West => "wc",
            })
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Coast>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(code) => match code.as_str() {
                "nc" => Ok(Some(Coast::North)),
                "ec" => Ok(Some(Coast::East)),
                "sc" => Ok(Some(Coast::South)),
                "wc" => Ok(Some(Coast::West)),
                other => Err(serde::de::Error::custom(format!(
                    "unknown coast code `{other}`"
                ))),
            },
        }
    }
}

impl build::WorldState for BoardState {
    fn nations(&self) -> HashSet<&Nation> {
        self.units
            .iter()
            .map(|u| &u.power)
            .chain(self.supply_centers.values())
            .collect()
    }

    fn occupier(&self, province: &ProvinceKey) -> Option<&Nation> {
        self.units
            .iter()
            .find(|u| &u.location == province)
            .map(|u| &u.power)
    }

    fn unit_count(&self, nation: &Nation) -> u8 {
        self.units.iter().filter(|u| &u.power == nation).count() as u8
    }

    fn units(&self, nation: &Nation) -> HashSet<(UnitType, RegionKey)> {
        self.units
            .iter()
            .filter(|u| &u.power == nation)
            .map(|u| (u.unit_type, u.region()))
            .collect()
    }
}

/// Checks a [`BoardState`] against the map for malformed input (§7 category
/// 2): an unknown province or region code, a supply-center ownership entry
/// naming a province that isn't a supply center or a power with no home
/// center on this map, or two units occupying the same province (I1). Unlike
/// an illegal order, these are never recorded and proceeded past — every
/// phase-resolution entry point calls this before doing anything else, so a
/// rejected call leaves the caller's prior state untouched.
fn validate(map: &Map, state: &BoardState) -> Result<(), AdjudicationError> {
    let mut occupied = HashSet::new();
    for unit in &state.units {
        if map.find_region(unit.location.short_name().as_ref()).is_none() {
            return Err(AdjudicationError::UnknownProvince(unit.location.to_string()));
        }

        let region = unit.region();
        if map.find_region(region.short_name().as_ref()).is_none() {
            return Err(AdjudicationError::UnknownRegion(region.to_string()));
        }

        if !occupied.insert(unit.location.clone()) {
            return Err(AdjudicationError::MultipleUnitsInProvince(
                unit.location.clone(),
            ));
        }
    }

    let home_nations: HashSet<&Nation> = map
        .provinces()
        .filter_map(|p| match &p.supply_center {
            SupplyCenter::Home(nation) => Some(nation),
            _ => None,
        })
        .collect();

    for (province, nation) in &state.supply_centers {
        let is_supply_center = map.provinces().any(|p| p == province && p.is_supply_center());
        if !is_supply_center {
            return Err(AdjudicationError::NotASupplyCenter(province.clone()));
        }
        if !home_nations.contains(nation) {
            return Err(AdjudicationError::UnknownNation(nation.clone()));
        }
    }

    Ok(())
}

fn require_season(
    state: &BoardState,
    expected: &[BoardSeason],
    submitted: &'static str,
) -> Result<(), AdjudicationError> {
    if expected.contains(&state.season) {
        Ok(())
    } else {
        Err(AdjudicationError::WrongOrderKind {
            season: state.season,
            submitted,
        })
    }
}

/// Splits submitted orders into the legal batch and the illegal ones, and
/// synthesizes an implicit [`MainCommand::Hold`] for every on-board unit that
/// received no legal order.
///
/// [`judge::Context::new`] already discards orders with no possible path and
/// duplicate orders to the same unit; what it cannot do is detect an order
/// addressed to a unit belonging to another power, since it has no access to
/// the real board. That case is filtered here instead, as an illegal order
/// (the unit exists; the order just isn't this nation's to give). An order
/// addressed to a province with no unit at all is a different thing — a
/// malformed OrderSet, not a data-domain illegal order — so it's rejected
/// outright rather than recorded and skipped.
fn prepare_main_orders(
    state: &BoardState,
    orders: Vec<MappedMainOrder>,
) -> Result<(Vec<MappedMainOrder>, Vec<(MappedMainOrder, IllegalOrder)>), AdjudicationError> {
    let mut illegal = Vec::new();
    let mut prepared = Vec::new();
    let mut ordered = HashSet::new();

    for order in orders {
        match state.unit_at(&order.region) {
            Some(unit) if unit.power == order.nation && unit.unit_type == order.unit_type => {
                ordered.insert(order.region.clone());
                prepared.push(order);
            }
            Some(_) => illegal.push((order, IllegalOrder::ForeignUnit)),
            None => {
                return Err(AdjudicationError::NoSuchUnit {
                    nation: order.nation.clone(),
                    region: order.region.to_string(),
                })
            }
        }
    }

    for unit in &state.units {
        let region = unit.region();
        if !ordered.contains(&region) {
            prepared.push(Order::new(
                unit.power.clone(),
                unit.unit_type,
                region,
                MainCommand::Hold,
            ));
        }
    }

    Ok((prepared, illegal))
}

/// Resolve a movement phase (Spring or Fall), relocating successful movers,
/// removing dislodged units onto the dislodged set, and reporting full
/// per-order diagnostics. Leaves the board's season and year untouched;
/// sequencing to the next phase is [`advance_phase`]'s job.
pub fn resolve_movement(
    map: &Map,
    state: &BoardState,
    orders: Vec<MappedMainOrder>,
) -> Result<(BoardState, Diagnostics), AdjudicationError> {
    validate(map, state)?;
    require_season(state, &[BoardSeason::Spring, BoardSeason::Fall], "movement")?;

    let (prepared, illegal) = prepare_main_orders(state, orders)?;
    log::debug!(
        "resolving {} movement with {} orders ({} illegal)",
        state.season,
        prepared.len(),
        illegal.len()
    );

    let submission = judge::Submission::new(map, prepared);
    let outcome = submission.resolve(Rulebook::default());
    let retreat_start = outcome.to_retreat_start();
    let dislodged_map = retreat_start.dislodged();

    let mut diagnostics = Diagnostics {
        illegal_orders: illegal,
        ..Diagnostics::default()
    };
    let mut next_units = Vec::new();
    let mut dislodged_units = Vec::new();

    for (order, order_outcome) in outcome.all_orders_with_outcomes() {
        if let OrderOutcome::Support(support_outcome) = order_outcome {
            match support_outcome {
                SupportOutcome::CutBy(_) => {
                    diagnostics.cut_supports.insert(order.region.province().clone());
                }
                SupportOutcome::SupportingSelf | SupportOutcome::CantReach => {
                    diagnostics
                        .invalid_supports
                        .insert(order.region.province().clone());
                }
                SupportOutcome::NotDisrupted => {}
            }
        }

        if let Some(&dislodger) = dislodged_map.get(order) {
            let contested_provinces = map
                .find_bordering(order.region.province())
                .into_iter()
                .filter_map(|region| {
                    if retreat_start
                        .retreat_destinations()
                        .get(&order.unit_position())
                        .map(|dests| dests.get(region) == retreat::DestStatus::Contested)
                        .unwrap_or(false)
                    {
                        Some(region.province().clone())
                    } else {
                        None
                    }
                })
                .collect();

            diagnostics.dislodged.insert(order.region.province().clone());
            diagnostics.outcomes.push((
                order.region.province().clone(),
                format!(
                    "Dislodged from {} by {}",
                    order.region.province(),
                    dislodger.region.province()
                ),
            ));
            dislodged_units.push(DislodgedUnit {
                unit: UnitRef {
                    power: order.nation.clone(),
                    unit_type: order.unit_type,
                },
                dislodged_from: order.region.province().clone(),
                dislodger_origin: dislodger.region.province().clone(),
                contested_provinces,
            });
            continue;
        }

        match &order.command {
            MainCommand::Move(_) if OrderState::from(order_outcome) == OrderState::Succeeds => {
                let dest = order.move_dest().expect("move order has a destination");
                diagnostics.outcomes.push((
                    order.region.province().clone(),
                    format!("Successfully moved to {dest}"),
                ));
                next_units.push(PlacedUnit {
                    power: order.nation.clone(),
                    unit_type: order.unit_type,
                    location: dest.province().clone(),
                    coast: dest.coast(),
                });
            }
            MainCommand::Move(_) => {
                diagnostics.outcomes.push((
                    order.region.province().clone(),
                    format!(
                        "Bounced from {}",
                        order.move_dest().expect("move order has a destination")
                    ),
                ));
                next_units.push(PlacedUnit {
                    power: order.nation.clone(),
                    unit_type: order.unit_type,
                    location: order.region.province().clone(),
                    coast: order.region.coast(),
                });
            }
            _ => {
                if matches!(order.command, MainCommand::Hold) {
                    diagnostics
                        .outcomes
                        .push((order.region.province().clone(), "Held position".into()));
                }
                next_units.push(PlacedUnit {
                    power: order.nation.clone(),
                    unit_type: order.unit_type,
                    location: order.region.province().clone(),
                    coast: order.region.coast(),
                });
            }
        }
    }

    // A province is a standoff (§4.2) iff two or more moves targeted it and
    // none of them succeeded -- a single winner, even one that dislodges the
    // occupant, is not a standoff. This is independent of whether anyone was
    // dislodged: `S3 A Ber -> Sil, A War -> Sil` contests Sil despite neither
    // unit ever occupying it.
    let mut move_targets: HashMap<ProvinceKey, (usize, bool)> = HashMap::new();
    for (order, order_outcome) in outcome.all_orders_with_outcomes() {
        if let MainCommand::Move(_) = &order.command {
            if let Some(dest) = order.move_dest() {
                let entry = move_targets.entry(dest.province().clone()).or_insert((0, false));
                entry.0 += 1;
                if OrderState::from(order_outcome) == OrderState::Succeeds {
                    entry.1 = true;
                }
            }
        }
    }
    for (province, (attacker_count, any_succeeded)) in move_targets {
        if attacker_count >= 2 && !any_succeeded {
            diagnostics.contested.insert(province);
        }
    }

    log::info!(
        "{} movement resolved: {} moved/held, {} dislodged",
        state.season,
        next_units.len(),
        dislodged_units.len()
    );

    let next = BoardState {
        year: state.year,
        season: state.season,
        previous_season: state.previous_season,
        units: next_units,
        supply_centers: state.supply_centers.clone(),
        dislodged_units,
    };

    Ok((next, diagnostics))
}

/// Whether the unit type given can occupy the given terrain. Mirrors the
/// equivalent (private) check in [`crate::judge`], since retreat-destination
/// validity has to be recomputed here against plain board data rather than
/// a live [`judge::Context`].
fn passable(unit_type: UnitType, terrain: crate::geo::Terrain) -> bool {
    use crate::geo::Terrain;
    match terrain {
        Terrain::Coast => true,
        Terrain::Land => unit_type == UnitType::Army,
        Terrain::Sea => unit_type == UnitType::Fleet,
    }
}

/// Resolve a retreat phase: dislodged units either move to a vacant, valid
/// destination or are destroyed. Leaves season and year untouched.
pub fn resolve_retreat(
    map: &Map,
    state: &BoardState,
    orders: Vec<MappedRetreatOrder>,
) -> Result<BoardState, AdjudicationError> {
    validate(map, state)?;
    require_season(state, &[BoardSeason::Retreat], "retreat")?;
    log::debug!(
        "resolving retreat phase with {} dislodged units, {} orders",
        state.dislodged_units.len(),
        orders.len()
    );

    let mut next_units = state.units.clone();
    let mut claims: HashMap<ProvinceKey, Vec<(&DislodgedUnit, RegionKey)>> = HashMap::new();
    let mut disbanded = 0usize;

    for dislodged in &state.dislodged_units {
        let order = orders.iter().find(|o| {
            o.nation == dislodged.unit.power && o.region.province() == &dislodged.dislodged_from
        });

        let dest = match order.map(|o| &o.command) {
            None | Some(RetreatCommand::Hold) => None,
            Some(RetreatCommand::Move(dest)) => {
                let status = retreat_destination_status(map, state, dislodged, dest);
                if status == retreat::DestStatus::Available {
                    Some(dest.clone())
                } else {
                    None
                }
            }
        };

        match dest {
            Some(dest) => claims
                .entry(dest.province().clone())
                .or_default()
                .push((dislodged, dest)),
            None => disbanded += 1,
        }
    }

    for (province, claimants) in claims {
        if claimants.len() == 1 {
            let (dislodged, dest) = &claimants[0];
            next_units.push(PlacedUnit {
                power: dislodged.unit.power.clone(),
                unit_type: dislodged.unit.unit_type,
                location: province,
                coast: dest.coast(),
            });
        } else {
            disbanded += claimants.len();
        }
    }

    log::info!(
        "retreat phase resolved: {} retreated, {} disbanded",
        next_units.len() - state.units.len(),
        disbanded
    );

    Ok(BoardState {
        year: state.year,
        season: state.season,
        previous_season: state.previous_season,
        units: next_units,
        supply_centers: state.supply_centers.clone(),
        dislodged_units: Vec::new(),
    })
}

/// Recomputes retreat-destination validity for a dislodged unit directly
/// against persisted board data, mirroring [`retreat::DestStatus`]'s cases.
fn retreat_destination_status(
    map: &Map,
    state: &BoardState,
    dislodged: &DislodgedUnit,
    dest: &RegionKey,
) -> retreat::DestStatus {
    let from = RegionKey::new(dislodged.dislodged_from.clone(), None);

    let Some(border) = map.find_border_between(&from, dest) else {
        return retreat::DestStatus::Unreachable;
    };

    if !passable(dislodged.unit.unit_type, border.terrain()) {
        return retreat::DestStatus::Unreachable;
    }

    if dest.province() == &dislodged.dislodger_origin {
        return retreat::DestStatus::BlockedByDislodger;
    }

    if state.unit_at(dest).is_some() {
        return retreat::DestStatus::Occupied;
    }

    if dislodged.contested_provinces.contains(dest.province()) {
        return retreat::DestStatus::Contested;
    }

    retreat::DestStatus::Available
}

/// Resolve a Winter adjustment phase: apply builds and disbands against the
/// build/disband delta implied by supply-center count versus unit count.
/// Leaves season and year untouched.
pub fn resolve_winter(
    map: &Map,
    state: &BoardState,
    builds: Vec<MappedBuildOrder>,
    disbands: Vec<MappedBuildOrder>,
) -> Result<BoardState, AdjudicationError> {
    validate(map, state)?;
    require_season(state, &[BoardSeason::Winter], "build/disband")?;

    let last_time: HashMap<ProvinceKey, Nation> = state
        .supply_centers
        .iter()
        .map(|(p, n)| (p.clone(), n.clone()))
        .collect();

    if last_time.is_empty() {
        return Err(AdjudicationError::InvariantViolation(
            "winter adjudication requires at least one owned supply center".into(),
        ));
    }

    let mut orders = builds;
    let disband_count = disbands.len();
    orders.extend(disbands);
    log::debug!(
        "resolving winter adjustment with {} builds, {} disbands",
        orders.len() - disband_count,
        disband_count
    );

    let submission = build::Submission::new(map, &last_time, state, orders);
    let outcome = submission.adjudicate(Rulebook::default());

    let units = outcome
        .to_final_unit_positions()
        .map(|pos| PlacedUnit {
            power: pos.unit.nation().clone(),
            unit_type: pos.unit.unit_type(),
            location: pos.region.province().clone(),
            coast: pos.region.coast(),
        })
        .collect::<Vec<_>>();

    log::info!("winter adjustment resolved: {} units on board", units.len());

    Ok(BoardState {
        year: state.year,
        season: state.season,
        previous_season: state.previous_season,
        units,
        supply_centers: state.supply_centers.clone(),
        dislodged_units: Vec::new(),
    })
}

/// Updates supply-center ownership to match end-of-Fall occupancy (§4.5):
/// every SC province occupied at this instant changes hands to its occupier;
/// unoccupied SCs keep their previous owner.
fn update_supply_centers(map: &Map, state: &BoardState) -> BTreeMap<ProvinceKey, Nation> {
    let mut owners = state.supply_centers.clone();
    for province in map.provinces().filter(|p| p.is_supply_center()) {
        let key = ProvinceKey::from(province);
        if let Some(unit) = state.units.iter().find(|u| u.location == key) {
            owners.insert(key, unit.power.clone());
        }
    }
    owners
}

/// Advances the phase cursor per the state machine in the phase sequencer:
/// movement phases with dislodgements go to a retreat phase; movement
/// phases and retreat phases without one go on to the next season; Winter
/// always advances to Spring of the following year. Supply-center ownership
/// is updated here, at the close of Fall, rather than inside
/// [`resolve_movement`] or [`resolve_retreat`], since it's a property of the
/// phase transition rather than of either adjudication step.
pub fn advance_phase(
    map: &Map,
    state: &BoardState,
    had_dislodged: bool,
) -> Result<BoardState, AdjudicationError> {
    validate(map, state)?;
    let mut next = state.clone();

    match (state.season, state.previous_season) {
        (BoardSeason::Spring, _) if had_dislodged => {
            next.season = BoardSeason::Retreat;
            next.previous_season = Some(MovementSeason::Spring);
        }
        (BoardSeason::Spring, _) => {
            next.season = BoardSeason::Fall;
        }
        (BoardSeason::Retreat, Some(MovementSeason::Spring)) => {
            next.season = BoardSeason::Fall;
            next.previous_season = None;
        }
        (BoardSeason::Fall, _) if had_dislodged => {
            next.season = BoardSeason::Retreat;
            next.previous_season = Some(MovementSeason::Fall);
        }
        (BoardSeason::Fall, _) => {
            next.supply_centers = update_supply_centers(map, &next);
            next.season = BoardSeason::Winter;
        }
        (BoardSeason::Retreat, Some(MovementSeason::Fall)) => {
            next.supply_centers = update_supply_centers(map, &next);
            next.season = BoardSeason::Winter;
            next.previous_season = None;
        }
        (BoardSeason::Retreat, None) => {
            return Err(AdjudicationError::InvariantViolation(
                "retreat phase with no previous movement season recorded".into(),
            ));
        }
        (BoardSeason::Winter, _) => {
            next.season = BoardSeason::Spring;
            next.previous_season = None;
            next.year += 1;
        }
    }

    log::info!(
        "phase advanced: {} {} -> {} {}",
        state.season,
        state.year,
        next.season,
        next.year
    );

    Ok(next)
}

/// Checks whether any power has reached the victory threshold of supply
/// centers, in a fixed deterministic iteration order (alphabetical by power
/// code) so that detection is itself reproducible.
pub fn check_victory(state: &BoardState) -> Option<Victory> {
    let mut counts: BTreeMap<&Nation, usize> = BTreeMap::new();
    for owner in state.supply_centers.values() {
        *counts.entry(owner).or_insert(0) += 1;
    }

    let mut powers = counts.keys().copied().collect::<Vec<_>>();
    powers.sort_by(|a, b| a.short_name().cmp(&b.short_name()));

    powers.into_iter().find_map(|power| {
        if counts[power] >= VICTORY_THRESHOLD {
            Some(Victory {
                power: power.clone(),
                year: state.year,
            })
        } else {
            None
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geo::standard_map;

    fn two_power_board() -> BoardState {
        let mut units = Vec::new();
        units.push(PlacedUnit {
            power: Nation::from("GER"),
            unit_type: UnitType::Army,
            location: ProvinceKey::new("ber"),
            coast: None,
        });
        units.push(PlacedUnit {
            power: Nation::from("RUS"),
            unit_type: UnitType::Army,
            location: ProvinceKey::new("war"),
            coast: None,
        });

        BoardState {
            year: 1901,
            season: BoardSeason::Spring,
            previous_season: None,
            units,
            supply_centers: BTreeMap::new(),
            dislodged_units: Vec::new(),
        }
    }

    #[test]
    fn basic_bounce() {
        let state = two_power_board();
        let orders = vec![
            "GER: A ber -> sil".parse::<MappedMainOrder>().unwrap(),
            "RUS: A war -> sil".parse::<MappedMainOrder>().unwrap(),
        ];

        let (next, diag) = resolve_movement(standard_map(), &state, orders).unwrap();
        assert!(diag.dislodged.is_empty());
        assert!(diag.contested.contains(&ProvinceKey::new("sil")));
        assert_eq!(2, next.units.len());
        assert!(next.units.iter().any(|u| u.location == ProvinceKey::new("ber")));
        assert!(next.units.iter().any(|u| u.location == ProvinceKey::new("war")));
    }

    #[test]
    fn supported_dislodgement() {
        let mut state = two_power_board();
        state.units.push(PlacedUnit {
            power: Nation::from("GER"),
            unit_type: UnitType::Army,
            location: ProvinceKey::new("sil"),
            coast: None,
        });
        state.units.push(PlacedUnit {
            power: Nation::from("RUS"),
            unit_type: UnitType::Fleet,
            location: ProvinceKey::new("pru"),
            coast: None,
        });

        let orders = vec![
            "GER: A ber -> pru".parse::<MappedMainOrder>().unwrap(),
            "GER: A sil supports A ber -> pru"
                .parse::<MappedMainOrder>()
                .unwrap(),
            "RUS: A war holds".parse::<MappedMainOrder>().unwrap(),
            "RUS: F pru holds".parse::<MappedMainOrder>().unwrap(),
        ];

        let (next, diag) = resolve_movement(standard_map(), &state, orders).unwrap();
        assert_eq!(1, diag.dislodged.len());
        assert!(diag.dislodged.contains(&ProvinceKey::new("pru")));
        assert_eq!(1, next.dislodged_units.len());
        assert_eq!(
            ProvinceKey::new("ber"),
            next.dislodged_units[0].dislodger_origin
        );
    }

    #[test]
    fn phase_sequencer_follows_the_table() {
        let map = standard_map();
        let mut state = two_power_board();

        state = advance_phase(map, &state, false).unwrap();
        assert_eq!(BoardSeason::Fall, state.season);

        state = advance_phase(map, &state, true).unwrap();
        assert_eq!(BoardSeason::Retreat, state.season);
        assert_eq!(Some(MovementSeason::Fall), state.previous_season);

        state = advance_phase(map, &state, false).unwrap();
        assert_eq!(BoardSeason::Winter, state.season);

        state = advance_phase(map, &state, false).unwrap();
        assert_eq!(BoardSeason::Spring, state.season);
        assert_eq!(1902, state.year);
    }

    #[test]
    fn victory_at_eighteen_centers() {
        let mut state = two_power_board();
        for i in 0..18 {
            state
                .supply_centers
                .insert(ProvinceKey::new(format!("sc{i}")), Nation::from("GER"));
        }

        assert_eq!(Some(Nation::from("GER")), check_victory(&state).map(|v| v.power));
    }

    #[test]
    fn no_victory_at_seventeen_centers() {
        let mut state = two_power_board();
        for i in 0..17 {
            state
                .supply_centers
                .insert(ProvinceKey::new(format!("sc{i}")), Nation::from("GER"));
        }

        assert_eq!(None, check_victory(&state));
    }
}
