//! Crate for testing JSON serialization and deserialization
//! of [`diplomacy`] data.
//!
//! The main crate does not have any direct need for [`serde_json`], so these
//! tests are kept separately.

#[cfg(test)]
mod tests {
    use std::{fmt::Display, str::FromStr};

    use anyhow::Context;
    use diplomacy::board::{
        BoardSeason, BoardState, DislodgedUnit, MovementSeason, PlacedUnit, UnitRef,
    };
    use diplomacy::geo::ProvinceKey;
    use diplomacy::judge::{MappedBuildOrder, MappedMainOrder};
    use diplomacy::{Nation, UnitType};
    use serde::{de::DeserializeOwned, Serialize};

    /// Parse an order, serialize it to JSON, deserialize it, and check that the two structs are equal.
    fn roundtrip_order<T>(ord: &str) -> anyhow::Result<()>
    where
        T: FromStr + Serialize + DeserializeOwned + Display + Eq,
        <T as FromStr>::Err: Send + Sync + std::error::Error + 'static,
    {
        let parsed: T = ord.parse().with_context(|| "Parsing order")?;
        let serialized =
            serde_json::to_string_pretty(&parsed).with_context(|| "Serializing order")?;
        let roundtripped: T =
            serde_json::from_str(&serialized).with_context(|| "Deserializing order")?;
        if parsed == roundtripped {
            Ok(())
        } else {
            Err(anyhow::Error::msg(format!(
                "Input: {ord} | Parsed: {parsed} | Roundtripped: {roundtripped} | Serialized: {serialized}"
            )))
        }
    }

    #[track_caller]
    fn roundtrip_orders<T>(orders: impl IntoIterator<Item = &'static str>)
    where
        T: FromStr + Serialize + DeserializeOwned + Display + Eq,
        <T as FromStr>::Err: Send + Sync + std::error::Error + 'static,
    {
        let results = orders
            .into_iter()
            .map(|ord| roundtrip_order::<T>(ord).with_context(|| ord))
            .filter_map(Result::err)
            .collect::<Vec<_>>();

        for error in &results {
            eprintln!("{:#}", error);
        }

        if !results.is_empty() {
            panic!("{} roundtrips failed", results.len());
        }
    }

    /// Serialize a [`BoardState`], deserialize it back, and check the two are equal.
    #[track_caller]
    fn roundtrip_board(state: &BoardState) {
        let serialized =
            serde_json::to_string_pretty(state).expect("board state should serialize");
        let roundtripped: BoardState =
            serde_json::from_str(&serialized).expect("board state should deserialize");
        assert_eq!(
            state, &roundtripped,
            "roundtrip changed board state: {serialized}"
        );
    }

    #[test]
    fn roundtrip_main_orders() {
        roundtrip_orders::<MappedMainOrder>(vec![
            "TUR: F ank hold",
            "TUR: A bul -> con",
            "TUR: A bul -> con via convoy",
            "TUR: F aeg convoys bul -> con",
            "TUR: A rum supports A bul -> con",
            "AUS: A tri -> ser",
            "ITA: F nap -> ion",
            "ENG: F iri supports F nao -> mao",
            "ENG: F nao -> mao",
            "FRA: F spa(nc) supports F mao",
            "FRA: F mao holds",
            "ITA: F lyo -> spa(sc)",
        ]);
    }

    #[test]
    fn roundtrip_build_orders() {
        roundtrip_orders::<MappedBuildOrder>(vec![
            "GER: A war build",
            "GER: A ber build",
            "GER: A mun build",
            "RUS: F stp(nc) build",
            "FRA: A par disband",
        ]);
    }

    /// A fresh Spring board with no dislodgements: the simplest shape of the
    /// checkpoint schema. Covers unit type/coast field naming (`"Army"`/`"Fleet"`,
    /// bare coast codes) and the empty-collections case.
    #[test]
    fn roundtrip_spring_board() {
        let state = BoardState {
            year: 1901,
            season: BoardSeason::Spring,
            previous_season: None,
            units: vec![
                PlacedUnit {
                    power: Nation::from("FRA"),
                    unit_type: UnitType::Army,
                    location: ProvinceKey::new("par"),
                    coast: None,
                },
                PlacedUnit {
                    power: Nation::from("RUS"),
                    unit_type: UnitType::Fleet,
                    location: ProvinceKey::new("stp"),
                    coast: Some(diplomacy::geo::Coast::North),
                },
            ],
            supply_centers: vec![
                (ProvinceKey::new("par"), Nation::from("FRA")),
                (ProvinceKey::new("stp"), Nation::from("RUS")),
            ]
            .into_iter()
            .collect(),
            dislodged_units: Vec::new(),
        };

        roundtrip_board(&state);
    }

    /// A Retreat-phase board carries `previous_season` and pending
    /// [`DislodgedUnit`] entries, including their contested-province lists; this
    /// is the shape that must survive a round trip for a caller to resume
    /// adjudication across a process boundary.
    #[test]
    fn roundtrip_retreat_board_preserves_previous_season() {
        let state = BoardState {
            year: 1902,
            season: BoardSeason::Retreat,
            previous_season: Some(MovementSeason::Fall),
            units: vec![PlacedUnit {
                power: Nation::from("RUS"),
                unit_type: UnitType::Army,
                location: ProvinceKey::new("war"),
                coast: None,
            }],
            supply_centers: vec![(ProvinceKey::new("war"), Nation::from("RUS"))]
                .into_iter()
                .collect(),
            dislodged_units: vec![DislodgedUnit {
                unit: UnitRef {
                    power: Nation::from("GER"),
                    unit_type: UnitType::Army,
                },
                dislodged_from: ProvinceKey::new("mun"),
                dislodger_origin: ProvinceKey::new("sil"),
                contested_provinces: vec![ProvinceKey::new("boh")],
            }],
        };

        roundtrip_board(&state);
        assert_eq!(Some(MovementSeason::Fall), state.previous_season);
    }
}
