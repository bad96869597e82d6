//! Geohash codec for vertex identifiers.
//!
//! Road vertices are named by their 12-character geohash. Elevation-aware
//! identifiers ("geohash-Z") append a fixed-width decimal elevation code.
//! Coordinates are always passed and returned as `(lon, lat)`.

use crate::error::{CprnError, Result};
use log::{debug, warn};
use std::collections::{BTreeSet, HashSet};

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Longest supported geohash.
pub const MAX_PRECISION: usize = 12;
/// Default decimal places kept by [`z_encode`].
pub const Z_PRECISION: u32 = 2;
/// Default width of a Z code.
pub const Z_DIGITS: u32 = 6;
/// Mean Earth radius in metres used by [`haversine_distance`].
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Direction of a neighbouring cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compass {
    /// North
    North,
    /// North-east
    NorthEast,
    /// East
    East,
    /// South-east
    SouthEast,
    /// South
    South,
    /// South-west
    SouthWest,
    /// West
    West,
    /// North-west
    NorthWest,
}

impl Compass {
    /// All directions, clockwise from north.
    pub const ALL: [Compass; 8] = [
        Compass::North,
        Compass::NorthEast,
        Compass::East,
        Compass::SouthEast,
        Compass::South,
        Compass::SouthWest,
        Compass::West,
        Compass::NorthWest,
    ];

    fn offset(self) -> (f64, f64) {
        match self {
            Compass::North => (0.0, 1.0),
            Compass::NorthEast => (1.0, 1.0),
            Compass::East => (1.0, 0.0),
            Compass::SouthEast => (1.0, -1.0),
            Compass::South => (0.0, -1.0),
            Compass::SouthWest => (-1.0, -1.0),
            Compass::West => (-1.0, 0.0),
            Compass::NorthWest => (-1.0, 1.0),
        }
    }
}

/// Cell bounds of a geohash.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Western edge
    pub min_lon: f64,
    /// Southern edge
    pub min_lat: f64,
    /// Eastern edge
    pub max_lon: f64,
    /// Northern edge
    pub max_lat: f64,
}

impl BoundingBox {
    /// Cell center as `(lon, lat)`.
    pub fn center(&self) -> (f64, f64) {
        ((self.min_lon + self.max_lon) / 2.0, (self.min_lat + self.max_lat) / 2.0)
    }

    fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

/// Encode a coordinate to a geohash of `precision` characters.
pub fn encode(lon: f64, lat: f64, precision: usize) -> Result<String> {
    if precision == 0 || precision > MAX_PRECISION {
        return Err(CprnError::invalid_argument(format!(
            "geohash precision must be within 1..={MAX_PRECISION}, got {precision}"
        )));
    }
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(CprnError::invalid_argument(format!(
            "coordinate out of range: lon {lon}, lat {lat}"
        )));
    }

    let mut lon_range = (-180.0, 180.0);
    let mut lat_range = (-90.0, 90.0);
    let mut hash = String::with_capacity(precision);
    let mut even = true;
    let mut bits = 0u8;
    let mut index = 0usize;

    while hash.len() < precision {
        let (range, value) = if even {
            (&mut lon_range, lon)
        } else {
            (&mut lat_range, lat)
        };
        let mid = (range.0 + range.1) / 2.0;
        index <<= 1;
        if value >= mid {
            index |= 1;
            range.0 = mid;
        } else {
            range.1 = mid;
        }
        even = !even;
        bits += 1;
        if bits == 5 {
            hash.push(BASE32[index] as char);
            bits = 0;
            index = 0;
        }
    }

    Ok(hash)
}

/// Bounds of the cell named by `hash` (case-insensitive).
pub fn decode_bbox(hash: &str) -> Result<BoundingBox> {
    if hash.is_empty() {
        return Err(CprnError::Geohash {
            message: "empty geohash".to_string(),
        });
    }

    let mut lon_range = (-180.0_f64, 180.0_f64);
    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut even = true;

    for ch in hash.chars() {
        let lower = ch.to_ascii_lowercase();
        let value = BASE32
            .iter()
            .position(|&b| b as char == lower)
            .ok_or_else(|| CprnError::Geohash {
                message: format!("invalid character '{ch}' in geohash '{hash}'"),
            })?;
        for shift in (0..5).rev() {
            let bit = (value >> shift) & 1;
            let range = if even { &mut lon_range } else { &mut lat_range };
            let mid = (range.0 + range.1) / 2.0;
            if bit == 1 {
                range.0 = mid;
            } else {
                range.1 = mid;
            }
            even = !even;
        }
    }

    Ok(BoundingBox {
        min_lon: lon_range.0,
        min_lat: lat_range.0,
        max_lon: lon_range.1,
        max_lat: lat_range.1,
    })
}

/// Center of the cell named by `hash`, as `(lon, lat)`.
pub fn decode(hash: &str) -> Result<(f64, f64)> {
    Ok(decode_bbox(hash)?.center())
}

/// The adjacent cell of the same precision.
///
/// Longitude wraps at the antimeridian; there is no cell beyond a pole.
pub fn neighbor(hash: &str, direction: Compass) -> Result<String> {
    let bbox = decode_bbox(hash)?;
    let (lon, lat) = bbox.center();
    let (dx, dy) = direction.offset();

    let lat = lat + dy * bbox.height();
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CprnError::Geohash {
            message: format!("geohash '{hash}' has no {direction:?} neighbour"),
        });
    }
    let mut lon = lon + dx * bbox.width();
    if lon >= 180.0 {
        lon -= 360.0;
    } else if lon < -180.0 {
        lon += 360.0;
    }

    let hash = encode(lon, lat, hash.len())?;
    Ok(hash)
}

/// The eight surrounding cells in [`Compass::ALL`] order.
pub fn neighbors(hash: &str) -> Result<Vec<String>> {
    Compass::ALL.iter().map(|&dir| neighbor(hash, dir)).collect()
}

/// Cells within `radius` rings of `hash` truncated to `precision`,
/// including the cell itself, sorted.
///
/// A radius of 1 yields the cell and its eight neighbours. Rings are clipped
/// at the poles.
pub fn neighbors_within(hash: &str, precision: usize, radius: u32) -> Result<Vec<String>> {
    if radius == 0 {
        return Err(CprnError::invalid_argument("neighbour radius must be at least 1"));
    }
    if precision == 0 || precision > hash.len() || !hash.is_char_boundary(precision) {
        return Err(CprnError::invalid_argument(format!(
            "precision {precision} does not fit geohash '{hash}'"
        )));
    }
    let cell = hash[..precision].to_ascii_lowercase();
    decode_bbox(&cell)?;

    let mut seen = BTreeSet::from([cell.clone()]);
    let mut ring = vec![cell];
    for _ in 0..radius {
        let mut next = Vec::new();
        for gh in &ring {
            for &dir in Compass::ALL.iter() {
                let adjacent = match neighbor(gh, dir) {
                    Ok(adjacent) => adjacent,
                    Err(CprnError::Geohash { .. }) => continue,
                    Err(e) => return Err(e),
                };
                if seen.insert(adjacent.clone()) {
                    next.push(adjacent);
                }
            }
        }
        ring = next;
    }
    Ok(seen.into_iter().collect())
}

/// Candidates sharing a `precision`-character prefix with any of `bases`,
/// in input order. Prefixes compare case-insensitively.
///
/// # Errors
///
/// Returns [`CprnError::InvalidArgument`] if a base is shorter than
/// `precision`.
pub fn filter_by_prefix<'a, B, C>(bases: &[B], candidates: &'a [C], precision: usize) -> Result<Vec<&'a str>>
where
    B: AsRef<str>,
    C: AsRef<str>,
{
    if precision == 0 {
        return Err(CprnError::invalid_argument("prefix precision must be at least 1"));
    }
    let mut prefixes = HashSet::with_capacity(bases.len());
    for base in bases {
        let base = base.as_ref();
        let prefix = base.get(..precision).ok_or_else(|| {
            CprnError::invalid_argument(format!("geohash '{base}' is shorter than precision {precision}"))
        })?;
        prefixes.insert(prefix.to_ascii_lowercase());
    }

    Ok(candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| {
            c.get(..precision)
                .is_some_and(|prefix| prefixes.contains(&prefix.to_ascii_lowercase()))
        })
        .collect())
}

/// Great-circle distance in metres between two `(lon, lat)` points.
pub fn haversine_distance(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lon1, lat1) = (from.0.to_radians(), from.1.to_radians());
    let (lon2, lat2) = (to.0.to_radians(), to.1.to_radians());
    let a = ((lat2 - lat1) / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}

/// The candidate whose cell center is closest to that of `hash`, with the
/// distance in metres. Ties keep the earlier candidate.
///
/// Returns `None` when there are no candidates.
pub fn nearest<'a, C: AsRef<str>>(hash: &str, candidates: &'a [C]) -> Result<Option<(&'a str, f64)>> {
    nearest_of(hash, candidates.iter().map(AsRef::as_ref))
}

/// [`nearest`] restricted to candidates within `radius` rings of `hash` at
/// `precision`, which avoids decoding every candidate of a large network.
pub fn nearest_within<'a, C: AsRef<str>>(
    hash: &str,
    candidates: &'a [C],
    radius: u32,
    precision: usize,
) -> Result<Option<(&'a str, f64)>> {
    let cells = neighbors_within(hash, precision, radius)?;
    let nearby = filter_by_prefix(cells.as_slice(), candidates, precision)?;
    debug!(
        "{} of {} candidate(s) within {} cell(s) around {hash}",
        nearby.len(),
        candidates.len(),
        cells.len()
    );
    nearest_of(hash, nearby)
}

fn nearest_of<'a>(hash: &str, candidates: impl IntoIterator<Item = &'a str>) -> Result<Option<(&'a str, f64)>> {
    let origin = decode(hash)?;
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let distance = haversine_distance(origin, decode(candidate)?);
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }
    Ok(best)
}

/// Encode an elevation as a zero-padded decimal code of `digits`
/// characters keeping `precision_z` decimal places.
///
/// Values above the largest representable elevation are clamped to it;
/// negative values are clamped to zero.
pub fn z_encode(z: f64, precision_z: u32, digits: u32) -> Result<String> {
    if precision_z > digits || digits > 18 {
        return Err(CprnError::invalid_argument(format!(
            "invalid Z code layout: precision {precision_z}, digits {digits}"
        )));
    }
    if z.is_nan() {
        return Err(CprnError::invalid_argument("Z value is NaN"));
    }

    let max_scaled = 10_i64.pow(digits) - 1;
    let scale = 10_f64.powi(precision_z as i32);
    let mut scaled = (z * scale).round();
    if scaled > max_scaled as f64 {
        let max_z = max_scaled as f64 / scale;
        warn!("Z value {z} exceeds {max_z}, clamped");
        scaled = max_scaled as f64;
    } else if scaled < 0.0 {
        warn!("Z value {z} is negative, clamped to 0");
        scaled = 0.0;
    }

    Ok(format!("{:0width$}", scaled as i64, width = digits as usize))
}

/// Decode a Z code produced by [`z_encode`].
pub fn z_decode(code: &str, precision_z: u32, digits: u32) -> Result<f64> {
    if code.len() != digits as usize || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CprnError::Geohash {
            message: format!("Z code must be {digits} digits, got '{code}'"),
        });
    }
    let value: i64 = code.parse().map_err(|_| CprnError::Geohash {
        message: format!("Z code '{code}' is not a number"),
    })?;
    Ok(value as f64 / 10_f64.powi(precision_z as i32))
}

/// Encode a coordinate with elevation as geohash followed by the default
/// Z code.
pub fn encode_ghz(lon: f64, lat: f64, z: f64, precision: usize) -> Result<String> {
    let mut hash = encode(lon, lat, precision)?;
    hash.push_str(&z_encode(z, Z_PRECISION, Z_DIGITS)?);
    Ok(hash)
}

/// Decode a geohash-Z identifier into `(lon, lat, z)`.
pub fn decode_ghz(ghz: &str) -> Result<(f64, f64, f64)> {
    let split = ghz
        .len()
        .checked_sub(Z_DIGITS as usize)
        .filter(|&at| at > 0 && ghz.is_char_boundary(at))
        .ok_or_else(|| CprnError::Geohash {
            message: format!("'{ghz}' is too short for a geohash-Z identifier"),
        })?;
    let (hash, z_code) = ghz.split_at(split);
    let (lon, lat) = decode(hash)?;
    let z = z_decode(z_code, Z_PRECISION, Z_DIGITS)?;
    Ok((lon, lat, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        assert_eq!(encode(-5.6, 42.6, 5).unwrap(), "ezs42");
        let (lon, lat) = decode("ezs42").unwrap();
        assert!((lon - -5.603).abs() < 0.01);
        assert!((lat - 42.605).abs() < 0.01);
    }

    #[test]
    fn test_decode_is_case_insensitive() {
        assert_eq!(decode("EZS42").unwrap(), decode("ezs42").unwrap());
    }

    #[test]
    fn test_round_trip_full_precision() {
        let hash = encode(120.123456, 31.123456, 12).unwrap();
        assert_eq!(hash.len(), 12);
        let (lon, lat) = decode(&hash).unwrap();
        assert!((lon - 120.123456).abs() < 1e-6);
        assert!((lat - 31.123456).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(encode(0.0, 0.0, 0), Err(CprnError::InvalidArgument { .. })));
        assert!(matches!(encode(0.0, 0.0, 13), Err(CprnError::InvalidArgument { .. })));
        assert!(matches!(encode(181.0, 0.0, 5), Err(CprnError::InvalidArgument { .. })));
        assert!(matches!(decode("ezs4a"), Err(CprnError::Geohash { .. })));
        assert!(matches!(decode(""), Err(CprnError::Geohash { .. })));
    }

    #[test]
    fn test_neighbors() {
        assert_eq!(neighbor("ezs42", Compass::North).unwrap(), "ezs48");
        assert_eq!(neighbor("ezs42", Compass::East).unwrap(), "ezs43");
        assert_eq!(neighbor("ezs42", Compass::NorthEast).unwrap(), "ezs49");
        let all = neighbors("ezs42").unwrap();
        assert_eq!(all.len(), 8);
        assert!(!all.contains(&"ezs42".to_string()));
    }

    #[test]
    fn test_neighbor_wraps_antimeridian() {
        let east_edge = encode(179.99, 0.0, 4).unwrap();
        let (lon, _) = decode(&neighbor(&east_edge, Compass::East).unwrap()).unwrap();
        assert!(lon < -179.0);
        let north_pole = encode(0.0, 89.99, 3).unwrap();
        assert!(neighbor(&north_pole, Compass::North).is_err());
    }

    #[test]
    fn test_neighbors_within_radius() {
        let ring1 = neighbors_within("ezs42", 5, 1).unwrap();
        assert_eq!(ring1.len(), 9);
        let mut expected = neighbors("ezs42").unwrap();
        expected.push("ezs42".to_string());
        expected.sort();
        assert_eq!(ring1, expected);

        let ring2 = neighbors_within("ezs42", 5, 2).unwrap();
        assert_eq!(ring2.len(), 25);
        assert!(ring1.iter().all(|gh| ring2.contains(gh)));

        // longer hashes are truncated, case is normalized
        assert_eq!(neighbors_within("EZS42BCD", 5, 1).unwrap(), ring1);
    }

    #[test]
    fn test_neighbors_within_rejects_bad_arguments() {
        assert!(matches!(
            neighbors_within("ezs42", 5, 0),
            Err(CprnError::InvalidArgument { .. })
        ));
        assert!(matches!(
            neighbors_within("ezs42", 6, 1),
            Err(CprnError::InvalidArgument { .. })
        ));
        assert!(matches!(neighbors_within("ezsa2", 5, 1), Err(CprnError::Geohash { .. })));
    }

    #[test]
    fn test_neighbors_within_clipped_at_pole() {
        let north_pole = encode(0.0, 89.99, 3).unwrap();
        assert_eq!(neighbors_within(&north_pole, 3, 1).unwrap().len(), 6);
    }

    #[test]
    fn test_filter_by_prefix() {
        let candidates = ["ezs42abc", "EZS4200", "ezs43x", "ez"];
        assert_eq!(
            filter_by_prefix(&["ezs42"], &candidates, 5).unwrap(),
            ["ezs42abc", "EZS4200"]
        );
        assert_eq!(
            filter_by_prefix(&["ezs42", "ezs43"], &candidates, 5).unwrap(),
            ["ezs42abc", "EZS4200", "ezs43x"]
        );
        assert!(filter_by_prefix(&["ezs"], &candidates, 5).is_err());
    }

    #[test]
    fn test_haversine_distance() {
        let one_degree = haversine_distance((0.0, 0.0), (0.0, 1.0));
        assert!((one_degree - 111_195.08).abs() < 1.0);
        assert_eq!(haversine_distance((120.0, 31.0), (120.0, 31.0)), 0.0);
    }

    #[test]
    fn test_nearest_candidate() {
        let origin = encode(120.0, 31.0, 9).unwrap();
        let candidates = [
            encode(120.01, 31.0, 9).unwrap(),
            encode(120.001, 31.0, 9).unwrap(),
            encode(121.0, 31.0, 9).unwrap(),
        ];
        let (hash, meters) = nearest(&origin, &candidates).unwrap().unwrap();
        assert_eq!(hash, candidates[1]);
        assert!((85.0..105.0).contains(&meters), "{meters}");

        let empty: [&str; 0] = [];
        assert!(nearest(&origin, &empty).unwrap().is_none());
    }

    #[test]
    fn test_nearest_within_skips_distant_cells() {
        let origin = encode(120.0005, 31.0005, 12).unwrap();
        let far = encode(121.0, 31.0, 12).unwrap();
        let close = encode(120.0006, 31.0005, 12).unwrap();

        let candidates = [far.clone(), close.clone()];
        let (hash, meters) = nearest_within(&origin, &candidates, 1, 6).unwrap().unwrap();
        assert_eq!(hash, close);
        assert!(meters < 20.0, "{meters}");

        assert!(nearest_within(&origin, &[far], 1, 6).unwrap().is_none());
    }

    #[test]
    fn test_z_codes() {
        assert_eq!(z_encode(123.45, 2, 6).unwrap(), "012345");
        assert_eq!(z_encode(10.66, 2, 6).unwrap(), "001066");
        assert_eq!(z_encode(10_000.0, 2, 6).unwrap(), "999999");
        assert_eq!(z_encode(-3.0, 2, 6).unwrap(), "000000");
        assert_eq!(z_decode("001066", 2, 6).unwrap(), 10.66);
        assert!(z_decode("10.66", 2, 6).is_err());
        assert!(z_encode(1.0, 7, 6).is_err());
    }

    #[test]
    fn test_ghz_round_trip() {
        let ghz = encode_ghz(120.123456, 31.123456, 10.66, 12).unwrap();
        assert_eq!(ghz.len(), 18);
        assert!(ghz.ends_with("001066"));
        let (lon, lat, z) = decode_ghz(&ghz).unwrap();
        assert!((lon - 120.123456).abs() < 1e-6);
        assert!((lat - 31.123456).abs() < 1e-6);
        assert_eq!(z, 10.66);
        assert!(decode_ghz("001066").is_err());
    }
}
