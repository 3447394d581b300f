//! DATC-style scenario tests and cross-cutting invariants for the checkpoint
//! engine. `S1` (basic bounce) and `S2` (supported dislodgement) live as unit
//! tests next to `resolve_movement` in `board.rs`; everything else the
//! adjudicator's test matrix calls for is here.

use diplomacy::board::{
    advance_phase, resolve_movement, resolve_retreat, resolve_winter, BoardSeason, BoardState,
    DislodgedUnit, MovementSeason, PlacedUnit, UnitRef,
};
use diplomacy::geo::{standard_map, Map, ProvinceKey};
use diplomacy::judge::build::WorldState;
use diplomacy::judge::{ConvoyOutcome, MappedBuildOrder, MappedMainOrder, OrderOutcome, Rulebook};
use diplomacy::{Nation, UnitType};

fn unit(power: &str, unit_type: UnitType, province: &str) -> PlacedUnit {
    PlacedUnit {
        power: Nation::from(power),
        unit_type,
        location: ProvinceKey::new(province),
        coast: None,
    }
}

fn board(season: BoardSeason, units: Vec<PlacedUnit>, supply_centers: &[(&str, &str)]) -> BoardState {
    BoardState {
        year: 1901,
        season,
        previous_season: None,
        units,
        supply_centers: supply_centers
            .iter()
            .map(|(p, n)| (ProvinceKey::new(*p), Nation::from(*n)))
            .collect(),
        dislodged_units: Vec::new(),
    }
}

fn orders(texts: &[&str]) -> Vec<MappedMainOrder> {
    texts
        .iter()
        .map(|t| t.parse::<MappedMainOrder>().unwrap())
        .collect()
}

#[test]
fn s3_support_cut() {
    let state = board(
        BoardSeason::Spring,
        vec![
            unit("FRA", UnitType::Fleet, "bre"),
            unit("FRA", UnitType::Fleet, "gas"),
            unit("SPA", UnitType::Army, "spa"),
        ],
        &[],
    );
    let ords = orders(&[
        "FRA: F bre -> mao",
        "FRA: F gas supports F bre -> mao",
        "SPA: A spa -> gas",
    ]);

    let (next, diag) = resolve_movement(standard_map(), &state, ords).unwrap();
    assert!(diag.cut_supports.contains(&ProvinceKey::new("gas")));
    assert!(diag.dislodged.is_empty());
    assert!(next
        .units
        .iter()
        .any(|u| u.power == Nation::from("FRA") && u.location == ProvinceKey::new("mao")));
}

#[test]
fn s4_head_to_head() {
    let state = board(
        BoardSeason::Spring,
        vec![
            unit("GER", UnitType::Army, "ber"),
            unit("GER", UnitType::Army, "mun"),
        ],
        &[],
    );
    let ords = orders(&["GER: A ber -> mun", "GER: A mun -> ber"]);

    // Head-to-head bounces are resolved by the strength comparison in §4.2,
    // not the ≥2-attackers-into-one-province standoff rule, so neither
    // province joins the phase's contested set here.
    let (next, diag) = resolve_movement(standard_map(), &state, ords).unwrap();
    assert!(diag.dislodged.is_empty());
    assert!(diag.contested.is_empty());
    assert!(next.units.iter().any(|u| u.location == ProvinceKey::new("ber")));
    assert!(next.units.iter().any(|u| u.location == ProvinceKey::new("mun")));
}

#[test]
fn s5_convoy_disruption() {
    let state = board(
        BoardSeason::Spring,
        vec![
            unit("ENG", UnitType::Army, "lon"),
            unit("ENG", UnitType::Fleet, "eng"),
            unit("GER", UnitType::Fleet, "nth"),
            unit("GER", UnitType::Fleet, "hel"),
        ],
        &[],
    );
    let ords = orders(&[
        "ENG: A lon -> bel via convoy",
        "ENG: F eng convoys lon -> bel",
        "GER: F nth -> eng",
        "GER: F hel supports F nth -> eng",
    ]);

    let (next, diag) = resolve_movement(standard_map(), &state, ords).unwrap();
    assert!(diag.dislodged.contains(&ProvinceKey::new("eng")));
    assert!(diag
        .outcomes
        .contains(&(ProvinceKey::new("lon"), "Held position".to_string())));
    assert!(next
        .units
        .iter()
        .any(|u| u.power == Nation::from("ENG") && u.location == ProvinceKey::new("lon")));
    assert!(next
        .dislodged_units
        .iter()
        .any(|d| d.dislodged_from == ProvinceKey::new("eng")));
}

#[test]
fn s6_fall_sc_capture_and_winter_build() {
    let mut state = board(
        BoardSeason::Fall,
        vec![
            unit("FRA", UnitType::Army, "mar"),
            unit("FRA", UnitType::Fleet, "bre"),
            unit("FRA", UnitType::Army, "spa"),
        ],
        &[("par", "FRA"), ("mar", "FRA"), ("bre", "FRA"), ("spa", "FRA")],
    );
    state = advance_phase(standard_map(), &state, false).unwrap();
    assert_eq!(BoardSeason::Winter, state.season);

    let builds: Vec<MappedBuildOrder> = vec!["FRA: A par build".parse().unwrap()];
    let next = resolve_winter(standard_map(), &state, builds, Vec::new()).unwrap();

    let fra_units = next.unit_count(&Nation::from("FRA"));
    let fra_scs = next
        .supply_centers
        .values()
        .filter(|n| **n == Nation::from("FRA"))
        .count();
    assert_eq!(4, fra_units);
    assert_eq!(4, fra_scs);
}

/// The classic Szykman two-unit convoy paradox: France's army can only reach
/// London by convoy through the Channel, and that convoy's survival decides
/// whether France's own move counts as an attack that cuts the support
/// propping up England's assault on the convoying fleet. Resolving the cycle
/// forces the Convoy order to fail rather than loop forever.
#[test]
fn s8_convoy_paradox_forces_szykman_failure() {
    let state = board(
        BoardSeason::Spring,
        vec![
            unit("ENG", UnitType::Fleet, "lon"),
            unit("ENG", UnitType::Fleet, "wal"),
            unit("FRA", UnitType::Army, "bre"),
            unit("FRA", UnitType::Fleet, "eng"),
        ],
        &[],
    );
    let ords = orders(&[
        "ENG: F wal -> eng",
        "ENG: F lon supports F wal -> eng",
        "FRA: A bre -> lon via convoy",
        "FRA: F eng convoys bre -> lon",
    ]);

    let convoy_order = "FRA: F eng convoys bre -> lon"
        .parse::<MappedMainOrder>()
        .unwrap();

    let map: &Map = standard_map();
    let submission_orders = ords.clone();
    let submission = diplomacy::judge::Submission::new(map, submission_orders);
    let outcome = submission.resolve(Rulebook::default());
    let convoy_outcome = outcome.get(&convoy_order).expect("convoy order was adjudicated");
    assert!(matches!(
        convoy_outcome,
        OrderOutcome::Convoy(ConvoyOutcome::Paradox)
    ));

    let (next, diag) = resolve_movement(map, &state, ords).unwrap();
    assert!(diag.dislodged.contains(&ProvinceKey::new("eng")));
    assert!(next
        .units
        .iter()
        .any(|u| u.power == Nation::from("FRA") && u.location == ProvinceKey::new("bre")));
    assert!(next
        .units
        .iter()
        .any(|u| u.power == Nation::from("ENG") && u.location == ProvinceKey::new("eng")));
}

#[test]
fn s7_three_unit_rotation_succeeds() {
    let state = board(
        BoardSeason::Spring,
        vec![
            unit("TUR", UnitType::Army, "con"),
            unit("TUR", UnitType::Army, "ank"),
            unit("TUR", UnitType::Army, "smy"),
        ],
        &[],
    );
    let ords = orders(&[
        "TUR: A con -> ank",
        "TUR: A ank -> smy",
        "TUR: A smy -> con",
    ]);

    let (next, diag) = resolve_movement(standard_map(), &state, ords).unwrap();
    assert!(diag.dislodged.is_empty());
    assert!(diag.contested.is_empty());
    assert!(next.units.iter().any(|u| u.location == ProvinceKey::new("ank")));
    assert!(next.units.iter().any(|u| u.location == ProvinceKey::new("smy")));
    assert!(next.units.iter().any(|u| u.location == ProvinceKey::new("con")));
}

#[test]
fn p1_movement_conserves_unit_count() {
    let mut state = board(
        BoardSeason::Spring,
        vec![
            unit("GER", UnitType::Army, "ber"),
            unit("GER", UnitType::Army, "sil"),
            unit("RUS", UnitType::Army, "war"),
            unit("RUS", UnitType::Fleet, "pru"),
        ],
        &[],
    );
    let before = state.units.len();
    let ords = orders(&[
        "GER: A ber -> pru",
        "GER: A sil supports A ber -> pru",
        "RUS: A war holds",
        "RUS: F pru holds",
    ]);

    let (next, _diag) = resolve_movement(standard_map(), &state, ords).unwrap();
    assert_eq!(before, next.units.len() + next.dislodged_units.len());
    state = next;
    assert_eq!(1, state.dislodged_units.len());
}

#[test]
fn p2_at_most_one_unit_per_province() {
    let state = board(
        BoardSeason::Spring,
        vec![
            unit("GER", UnitType::Army, "ber"),
            unit("RUS", UnitType::Army, "war"),
        ],
        &[],
    );
    let ords = orders(&["GER: A ber -> sil", "RUS: A war -> sil"]);

    let (next, _diag) = resolve_movement(standard_map(), &state, ords).unwrap();
    let mut seen = std::collections::HashSet::new();
    for u in &next.units {
        assert!(seen.insert((u.location.clone(), u.coast)), "duplicate occupant of {}", u.location);
    }
}

#[test]
fn p3_post_winter_unit_count_matches_sc_count() {
    let state = board(
        BoardSeason::Winter,
        vec![unit("FRA", UnitType::Army, "par"), unit("FRA", UnitType::Army, "mar")],
        &[("par", "FRA"), ("mar", "FRA"), ("bre", "FRA")],
    );
    let builds: Vec<MappedBuildOrder> = vec!["FRA: A bre build".parse().unwrap()];
    let next = resolve_winter(standard_map(), &state, builds, Vec::new()).unwrap();

    assert_eq!(
        next.unit_count(&Nation::from("FRA")) as usize,
        next.supply_centers
            .values()
            .filter(|n| **n == Nation::from("FRA"))
            .count()
    );
}

#[test]
fn p4_resolution_is_deterministic() {
    let state = board(
        BoardSeason::Spring,
        vec![
            unit("GER", UnitType::Army, "ber"),
            unit("GER", UnitType::Army, "sil"),
            unit("RUS", UnitType::Army, "war"),
            unit("RUS", UnitType::Fleet, "pru"),
        ],
        &[],
    );
    let ords = orders(&[
        "GER: A ber -> pru",
        "GER: A sil supports A ber -> pru",
        "RUS: A war holds",
        "RUS: F pru holds",
    ]);

    let (next_a, diag_a) = resolve_movement(standard_map(), &state, ords.clone()).unwrap();
    let (next_b, diag_b) = resolve_movement(standard_map(), &state, ords).unwrap();

    assert_eq!(next_a, next_b);
    assert_eq!(diag_a.dislodged, diag_b.dislodged);
    assert_eq!(diag_a.contested, diag_b.contested);
    assert_eq!(diag_a.outcomes, diag_b.outcomes);
}

#[test]
fn p5_advance_phase_follows_the_table_for_random_sequences() {
    let map = standard_map();
    let mut state = board(BoardSeason::Spring, Vec::new(), &[]);

    // A small deterministic "random-ish" bit sequence, long enough to cycle
    // through every phase transition many times over.
    let had_dislodged: Vec<bool> = (0..400).map(|i| i % 3 == 0).collect();

    let mut last_year = state.year;
    for flag in had_dislodged {
        let before_season = state.season;
        let before_previous = state.previous_season;
        state = advance_phase(map, &state, flag).unwrap();

        match (before_season, before_previous) {
            (BoardSeason::Spring, _) if flag => {
                assert_eq!(BoardSeason::Retreat, state.season);
                assert_eq!(Some(MovementSeason::Spring), state.previous_season);
            }
            (BoardSeason::Spring, _) => assert_eq!(BoardSeason::Fall, state.season),
            (BoardSeason::Retreat, Some(MovementSeason::Spring)) => {
                assert_eq!(BoardSeason::Fall, state.season);
                assert_eq!(None, state.previous_season);
            }
            (BoardSeason::Fall, _) if flag => {
                assert_eq!(BoardSeason::Retreat, state.season);
                assert_eq!(Some(MovementSeason::Fall), state.previous_season);
            }
            (BoardSeason::Fall, _) => assert_eq!(BoardSeason::Winter, state.season),
            (BoardSeason::Retreat, Some(MovementSeason::Fall)) => {
                assert_eq!(BoardSeason::Winter, state.season);
            }
            (BoardSeason::Retreat, None) => unreachable!("guarded against by advance_phase"),
            (BoardSeason::Winter, _) => {
                assert_eq!(BoardSeason::Spring, state.season);
                assert_eq!(None, state.previous_season);
                assert_eq!(last_year + 1, state.year);
            }
        }
        last_year = state.year;
    }
}

#[test]
fn p6_sc_ownership_only_changes_at_fall() {
    let map = standard_map();
    let mut state = board(
        BoardSeason::Spring,
        vec![unit("GER", UnitType::Army, "ber")],
        &[("ber", "GER")],
    );

    let before = state.supply_centers.clone();
    state = advance_phase(map, &state, false).unwrap();
    assert_eq!(BoardSeason::Fall, state.season);
    assert_eq!(before, state.supply_centers);

    // A Russian army now sits on Berlin going into the Fall -> Winter
    // transition; ownership should flip only once Fall closes.
    state.units = vec![unit("RUS", UnitType::Army, "ber")];
    state = advance_phase(map, &state, false).unwrap();
    assert_eq!(BoardSeason::Winter, state.season);
    assert_eq!(
        Some(&Nation::from("RUS")),
        state.supply_centers.get(&ProvinceKey::new("ber"))
    );
}

fn single_dislodged(power: &str, dislodged_from: &str, dislodger_origin: &str) -> DislodgedUnit {
    DislodgedUnit {
        unit: UnitRef {
            power: Nation::from(power),
            unit_type: UnitType::Army,
        },
        dislodged_from: ProvinceKey::new(dislodged_from),
        dislodger_origin: ProvinceKey::new(dislodger_origin),
        contested_provinces: Vec::new(),
    }
}

#[test]
fn p9_retreat_to_dislodgers_origin_rejected() {
    // Berlin dislodged from Munich by an attacker that came directly from
    // Silesia (a normal, non-convoyed attack): retreating back into Silesia
    // must be refused.
    let mut state = board(BoardSeason::Retreat, vec![unit("RUS", UnitType::Army, "war")], &[]);
    state.previous_season = Some(MovementSeason::Spring);
    state.dislodged_units = vec![single_dislodged("GER", "mun", "sil")];

    let ords = vec!["GER: A mun -> sil".parse().unwrap()];
    let next = resolve_retreat(standard_map(), &state, ords).unwrap();

    assert!(!next
        .units
        .iter()
        .any(|u| u.power == Nation::from("GER") && u.location == ProvinceKey::new("sil")));
}

#[test]
fn p10_retreat_to_contested_province_rejected() {
    let mut state = board(BoardSeason::Retreat, vec![unit("RUS", UnitType::Army, "war")], &[]);
    state.previous_season = Some(MovementSeason::Spring);
    state.dislodged_units = vec![DislodgedUnit {
        unit: UnitRef {
            power: Nation::from("GER"),
            unit_type: UnitType::Army,
        },
        dislodged_from: ProvinceKey::new("mun"),
        dislodger_origin: ProvinceKey::new("boh"),
        contested_provinces: vec![ProvinceKey::new("sil")],
    }];

    let ords = vec!["GER: A mun -> sil".parse().unwrap()];
    let next = resolve_retreat(standard_map(), &state, ords).unwrap();

    assert!(!next
        .units
        .iter()
        .any(|u| u.power == Nation::from("GER") && u.location == ProvinceKey::new("sil")));
}
