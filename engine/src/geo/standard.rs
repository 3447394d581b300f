use crate::geo::builder::ProvinceRegistry;
use crate::geo::{Coast, Map, Province, SupplyCenter, Terrain};
use lazy_static::lazy_static;

lazy_static! {
    static ref STANDARD_MAP: Map = load_standard();
}

/// Gets a static reference to the 1901 Standard map: 75 provinces, 34 supply
/// centers, and the borders between them.
pub fn standard_map() -> &'static Map {
    &STANDARD_MAP
}

fn load_standard() -> Map {
    let mut prov_reg = ProvinceRegistry::default();
    let provinces = include_str!("data/provinces.csv").lines().skip(1);
    for line in provinces {
        let prov = province_from_line(line)
            .unwrap_or_else(|| panic!("malformed province line: {line}"));
        prov_reg
            .register(prov)
            .expect("standard map shouldn't have issues");
    }

    let mut region_reg = prov_reg.finish();
    let regions = include_str!("data/regions.csv").lines().skip(1);
    for line in regions {
        let (prov, coast, terrain) =
            region_from_line(line).unwrap_or_else(|| panic!("malformed region line: {line}"));
        region_reg
            .register(prov, coast, terrain)
            .unwrap_or_else(|e| panic!("failed registering region '{line}': {e}"));
    }

    let mut border_reg = region_reg.finish();
    let borders = include_str!("data/borders.csv").lines().skip(1);
    for line in borders {
        let words = line.split(',').collect::<Vec<_>>();
        let terrain = terrain_from_word(words[2])
            .unwrap_or_else(|| panic!("bad terrain word in border line: {line}"));
        border_reg
            .register(words[0], words[1], terrain)
            .unwrap_or_else(|e| panic!("failed registering border '{line}': {e}"));
    }

    border_reg.finish()
}

fn province_from_line(s: &str) -> Option<Province> {
    let words = s.split(',').collect::<Vec<_>>();
    if words.len() == 3 {
        Some(Province {
            short_name: String::from(words[0]),
            full_name: String::from(words[1]),
            supply_center: supply_center_from_word(words[2]),
        })
    } else {
        None
    }
}

fn supply_center_from_word(s: &str) -> SupplyCenter {
    match s {
        "" => SupplyCenter::None,
        "neutral" => SupplyCenter::Neutral,
        nat => SupplyCenter::Home(nat.into()),
    }
}

fn region_from_line(s: &str) -> Option<(&str, Option<Coast>, Terrain)> {
    let words = s.split(',').collect::<Vec<_>>();
    if words.len() == 3 {
        Some((words[0], coast_from_word(words[1])?, terrain_from_word(words[2])?))
    } else {
        None
    }
}

fn coast_from_word(w: &str) -> Option<Option<Coast>> {
    match w {
        "" => Some(None),
        "n" => Some(Some(Coast::North)),
        "e" => Some(Some(Coast::East)),
        "s" => Some(Some(Coast::South)),
        "w" => Some(Some(Coast::West)),
        _ => None,
    }
}

fn terrain_from_word(w: &str) -> Option<Terrain> {
    match w {
        "sea" => Some(Terrain::Sea),
        "coast" => Some(Terrain::Coast),
        "land" => Some(Terrain::Land),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::standard_map;
    use crate::geo::ProvinceKey;

    #[test]
    fn loads_34_supply_centers() {
        let map = standard_map();
        let sc_count = map
            .provinces()
            .filter(|p| !matches!(p.supply_center, crate::geo::SupplyCenter::None))
            .count();
        assert_eq!(34, sc_count);
    }

    #[test]
    fn berlin_borders_silesia() {
        let map = standard_map();
        let ber = map.find_region("ber").expect("ber should exist");
        let bordering = map.find_bordering(ber);
        assert!(bordering.iter().any(|r| **r == ProvinceKey::from("sil")));
    }

    #[test]
    fn st_petersburg_has_two_coasts() {
        let map = standard_map();
        assert!(map.find_region("stp(nc)").is_some());
        assert!(map.find_region("stp(sc)").is_some());
    }
}
