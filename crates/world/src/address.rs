// World addressing - absolute tile coordinates to sector addresses
//
// The world y axis stacks four bands, one per plane. Each band maps onto the
// same 48-row sector grid once its base is subtracted.

use serde::Serialize;
use thiserror::Error;

use crate::SECTOR_TILES;
use crate::grid::Plane;

/// Added to `x / 48` to get the sector x
pub const SECTOR_X_OFFSET: u16 = 48;
/// Added to `y / 48` to get the sector y
pub const SECTOR_Y_OFFSET: u16 = 37;

/// Height of one vertical band in world tiles
pub const BAND_HEIGHT: u16 = 943;
/// Last world y of the ground band. The next band starts here too; the
/// ground band wins because bands are tested in order.
pub const GROUND_BAND_END: u16 = 1007;

pub const MAX_NORTH: u16 = 37;
pub const MAX_SOUTH: u16 = 55;
pub const MAX_EAST: u16 = 48;
pub const MAX_WEST: u16 = 67;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error(
        "sector ({x}, {y}) outside world bounds x {MAX_EAST}..={MAX_WEST}, y {MAX_NORTH}..={MAX_SOUTH}"
    )]
    OutOfBounds { x: u16, y: u16 },

    #[error("plane {0} does not exist")]
    InvalidPlane(u8),
}

/// Sector one step away. West grows x, south grows y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SectorAddress {
    pub x: u16,
    pub y: u16,
    pub plane: Plane,
}

impl SectorAddress {
    /// Sector the viewer opens when nothing else is configured
    pub const START: SectorAddress = SectorAddress {
        x: 55,
        y: 48,
        plane: Plane::Ground,
    };

    /// Bounds-checked constructor for user-supplied sector coordinates
    pub fn new(x: u16, y: u16, plane: Plane) -> Result<Self, AddressError> {
        if !(MAX_EAST..=MAX_WEST).contains(&x) || !(MAX_NORTH..=MAX_SOUTH).contains(&y) {
            return Err(AddressError::OutOfBounds { x, y });
        }
        Ok(SectorAddress { x, y, plane })
    }

    pub fn from_parts(x: u16, y: u16, plane: u8) -> Result<Self, AddressError> {
        let plane = Plane::from_index(plane).ok_or(AddressError::InvalidPlane(plane))?;
        Self::new(x, y, plane)
    }

    /// Neighbouring sector on the same plane, `None` at the world edge
    pub fn step(&self, direction: Direction) -> Option<Self> {
        let (x, y) = match direction {
            Direction::North if self.y > MAX_NORTH => (self.x, self.y - 1),
            Direction::South if self.y < MAX_SOUTH => (self.x, self.y + 1),
            Direction::West if self.x < MAX_WEST => (self.x + 1, self.y),
            Direction::East if self.x > MAX_EAST => (self.x - 1, self.y),
            _ => return None,
        };
        Some(SectorAddress { x, y, ..*self })
    }

    /// Planes that have to be read to show this sector. Upper floors and the
    /// underground only ever show together with the ground view.
    pub fn planes_to_load(&self) -> Vec<Plane> {
        if self.plane == Plane::Ground {
            Plane::ALL.to_vec()
        } else {
            vec![self.plane]
        }
    }
}

impl std::fmt::Display for SectorAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "h{}x{}y{}", self.plane.index(), self.x, self.y)
    }
}

/// Band a world y falls in, with y reduced to that band's base
pub fn band_for(y: u16) -> (Plane, u16) {
    if y <= GROUND_BAND_END {
        (Plane::Ground, y)
    } else if y <= GROUND_BAND_END + BAND_HEIGHT {
        (Plane::Upper1, y - BAND_HEIGHT)
    } else if y <= GROUND_BAND_END + BAND_HEIGHT * 2 {
        (Plane::Upper2, y - BAND_HEIGHT * 2)
    } else {
        (Plane::Underground, y - BAND_HEIGHT * 3)
    }
}

/// Sector holding the absolute world tile `(x, y)`. No bounds check: the
/// result may lie outside the navigable world.
pub fn coordinates_to_sector(x: u16, y: u16) -> SectorAddress {
    let (plane, band_y) = band_for(y);
    SectorAddress {
        x: x / SECTOR_TILES as u16 + SECTOR_X_OFFSET,
        y: band_y / SECTOR_TILES as u16 + SECTOR_Y_OFFSET,
        plane,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_band() {
        let addr = coordinates_to_sector(0, 0);
        assert_eq!(addr, SectorAddress { x: 48, y: 37, plane: Plane::Ground });

        let addr = coordinates_to_sector(330, 530);
        assert_eq!(addr, SectorAddress { x: 54, y: 48, plane: Plane::Ground });
    }

    #[test]
    fn test_band_boundaries_first_match_wins() {
        // 1007 satisfies both the ground and the first-floor range
        assert_eq!(band_for(1007), (Plane::Ground, 1007));
        assert_eq!(band_for(1008), (Plane::Upper1, 1008 - 943));
        assert_eq!(band_for(1950), (Plane::Upper1, 1950 - 943));
        assert_eq!(band_for(1951), (Plane::Upper2, 1951 - 1886));
        assert_eq!(band_for(2893), (Plane::Upper2, 2893 - 1886));
        assert_eq!(band_for(2894), (Plane::Underground, 2894 - 2829));
        assert_eq!(band_for(u16::MAX).0, Plane::Underground);
    }

    #[test]
    fn test_bands_map_onto_same_rows() {
        let ground = coordinates_to_sector(100, 530);
        let upper = coordinates_to_sector(100, 530 + 943);
        let under = coordinates_to_sector(100, 530 + 943 * 3);
        assert_eq!((ground.x, ground.y), (upper.x, upper.y));
        assert_eq!((ground.x, ground.y), (under.x, under.y));
        assert_eq!(upper.plane, Plane::Upper1);
        assert_eq!(under.plane, Plane::Underground);
    }

    #[test]
    fn test_bounds() {
        assert!(SectorAddress::new(48, 37, Plane::Ground).is_ok());
        assert!(SectorAddress::new(67, 55, Plane::Underground).is_ok());
        assert_eq!(
            SectorAddress::new(47, 40, Plane::Ground),
            Err(AddressError::OutOfBounds { x: 47, y: 40 })
        );
        assert!(SectorAddress::new(50, 56, Plane::Ground).is_err());
        assert_eq!(
            SectorAddress::from_parts(50, 40, 4),
            Err(AddressError::InvalidPlane(4))
        );
    }

    #[test]
    fn test_step_stops_at_edges() {
        let corner = SectorAddress::new(MAX_WEST, MAX_NORTH, Plane::Ground).unwrap();
        assert_eq!(corner.step(Direction::North), None);
        assert_eq!(corner.step(Direction::West), None);
        assert_eq!(corner.step(Direction::South).map(|a| a.y), Some(MAX_NORTH + 1));
        assert_eq!(corner.step(Direction::East).map(|a| a.x), Some(MAX_WEST - 1));
    }

    #[test]
    fn test_planes_to_load() {
        assert_eq!(SectorAddress::START.planes_to_load().len(), 4);
        let upper = SectorAddress::new(55, 48, Plane::Upper1).unwrap();
        assert_eq!(upper.planes_to_load(), vec![Plane::Upper1]);
        assert_eq!(SectorAddress::START.to_string(), "h0x55y48");
    }
}
