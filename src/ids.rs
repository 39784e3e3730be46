//! Identifier minting. Cliff, sector and route ids are the parent id followed by
//! the node's position among its siblings, so row order is part of the contract.

pub const MAP_LINK_BASE: &str = "https://maps.google.com/?q=";

/// `province_id` + 1-based ordinal, zero-padded to 5 digits.
pub fn cliff_id(province_id: &str, ordinal: usize) -> String {
    format!("{province_id}{ordinal:05}")
}

/// `cliff_id` + letter for the 0-based index (0 → `A`).
///
/// Only 26 sectors per cliff map onto `A..=Z`; later indices continue into the
/// code points after `Z` (`[`, `\`, ...).
pub fn sector_id(cliff_id: &str, index: usize) -> String {
    let letter = u32::try_from(index)
        .ok()
        .and_then(|i| char::from_u32(u32::from(b'A') + i))
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    format!("{cliff_id}{letter}")
}

/// `sector_id` + 1-based ordinal, zero-padded to 4 digits.
pub fn route_id(sector_id: &str, ordinal: usize) -> String {
    format!("{sector_id}{ordinal:04}")
}

pub fn map_link(latitude: f64, longitude: f64) -> String {
    format!("{MAP_LINK_BASE}{latitude},{longitude}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_are_zero_padded() {
        assert_eq!(cliff_id("BG", 1), "BG00001");
        assert_eq!(cliff_id("BG", 12345), "BG12345");
        assert_eq!(route_id("BG00001A", 7), "BG00001A0007");
    }

    #[test]
    fn sector_letters_start_at_a() {
        assert_eq!(sector_id("BG00001", 0), "BG00001A");
        assert_eq!(sector_id("BG00001", 1), "BG00001B");
        assert_eq!(sector_id("BG00001", 25), "BG00001Z");
        assert_eq!(sector_id("X", 26), "X[");
    }

    #[test]
    fn map_link_uses_latitude_then_longitude() {
        assert_eq!(map_link(45.1, 9.3), "https://maps.google.com/?q=45.1,9.3");
        assert_eq!(map_link(0.0, 0.0), "https://maps.google.com/?q=0,0");
    }
}
