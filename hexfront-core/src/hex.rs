//! Hex geometry with axial coordinates over a rectangular odd-q extent

use serde::{Deserialize, Serialize};

/// Axial hex coordinates
///
/// Ordering is by `q` then `r`; the CPU strategy relies on it for
/// reproducible tie-breaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Third cube coordinate, widened so it exists for every axial hex
    pub const fn s(&self) -> i64 {
        -(self.q as i64) - self.r as i64
    }

    /// Distance between two hexes, saturating at `u32::MAX`
    pub fn distance_to(&self, other: Hex) -> u32 {
        let dq = (self.q as i64 - other.q as i64).abs();
        let dr = (self.r as i64 - other.r as i64).abs();
        let ds = (self.s() - other.s()).abs();
        u32::try_from((dq + dr + ds) / 2).unwrap_or(u32::MAX)
    }

    /// Get neighbor in direction (0-5). Wraps at the edge of the `i32` plane.
    pub fn neighbor(&self, direction: usize) -> Hex {
        let (dq, dr) = DIRECTIONS[direction % 6];
        Hex::new(self.q.wrapping_add(dq), self.r.wrapping_add(dr))
    }

    /// All six neighbors, in `DIRECTIONS` order. Not filtered by any extent.
    pub fn neighbors(&self) -> [Hex; 6] {
        [
            self.neighbor(0),
            self.neighbor(1),
            self.neighbor(2),
            self.neighbor(3),
            self.neighbor(4),
            self.neighbor(5),
        ]
    }

    pub fn is_adjacent(&self, other: Hex) -> bool {
        self.distance_to(other) == 1
    }

    /// Every hex at distance <= `range`, including `self`, sorted
    ///
    /// Hexes that would fall outside the `i32` plane are skipped.
    pub fn within(&self, range: u32) -> Vec<Hex> {
        let range = range as i64;
        let (q, r) = (self.q as i64, self.r as i64);
        let q_lo = (q - range).max(i32::MIN as i64);
        let q_hi = (q + range).min(i32::MAX as i64);
        let mut hexes = Vec::new();
        for nq in q_lo..=q_hi {
            let dq = nq - q;
            let lo = (r - range).max(r - dq - range).max(i32::MIN as i64);
            let hi = (r + range).min(r - dq + range).min(i32::MAX as i64);
            for nr in lo..=hi {
                hexes.push(Hex::new(nq as i32, nr as i32));
            }
        }
        hexes
    }

    /// Every hex at exactly `radius` from `self` that lies on the `i32` plane
    pub fn ring(&self, radius: u32) -> Vec<Hex> {
        if radius == 0 {
            return vec![*self];
        }
        let radius = radius as i64;
        let (q, r) = (self.q as i64, self.r as i64);
        (0..6)
            .flat_map(move |side| {
                let (dq, dr) = DIRECTIONS[side];
                let (cq, cr) = DIRECTIONS[(side + 4) % 6];
                (0..radius).filter_map(move |step| {
                    let nq = q + radius * cq as i64 + step * dq as i64;
                    let nr = r + radius * cr as i64 + step * dr as i64;
                    Some(Hex::new(i32::try_from(nq).ok()?, i32::try_from(nr).ok()?))
                })
            })
            .collect()
    }

    /// Hexes on the straight line from `self` to `other`, both ends included
    pub fn line_to(&self, other: Hex) -> Vec<Hex> {
        let n = self.distance_to(other);
        if n == 0 {
            return vec![*self];
        }
        (0..=n)
            .map(|i| {
                let t = i as f64 / n as f64;
                let q = self.q as f64 + (other.q as f64 - self.q as f64) * t;
                let r = self.r as f64 + (other.r as f64 - self.r as f64) * t;
                cube_round(q, r)
            })
            .collect()
    }
}

/// Round fractional axial coordinates to the nearest hex
fn cube_round(q: f64, r: f64) -> Hex {
    // Nudge off exact midpoints so lines resolve the same way every time
    let q = q + 1e-6;
    let r = r + 1e-6;
    let s = -q - r;
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let q_diff = (rq - q).abs();
    let r_diff = (rr - r).abs();
    let s_diff = (rs - s).abs();

    if q_diff > r_diff && q_diff > s_diff {
        rq = -rr - rs;
    } else if r_diff > s_diff {
        rr = -rq - rs;
    }

    Hex::new(rq as i32, rr as i32)
}

/// Direction vectors in axial coordinates (dq, dr)
/// Index: 0=E, 1=NE, 2=NW, 3=W, 4=SW, 5=SE
pub const DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),   // E
    (1, -1),  // NE
    (0, -1),  // NW
    (-1, 0),  // W
    (-1, 1),  // SW
    (0, 1),   // SE
];

/// Rectangular board extent measured in odd-q offset columns and rows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of cells in the extent
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Axial -> (column, row), widened so every axial hex has an offset
    pub fn to_offset(hex: Hex) -> (i64, i64) {
        let col = hex.q as i64;
        let row = hex.r as i64 + (col - (col & 1)) / 2;
        (col, row)
    }

    /// (column, row) -> axial. Wraps like [`Hex::neighbor`] off the `i32` plane.
    pub fn from_offset(col: i32, row: i32) -> Hex {
        let shift = (col as i64 - (col & 1) as i64) / 2;
        Hex::new(col, (row as i64 - shift) as i32)
    }

    /// Check if this hex is on the board
    pub fn contains(&self, hex: Hex) -> bool {
        let (col, row) = Self::to_offset(hex);
        (0..self.width as i64).contains(&col) && (0..self.height as i64).contains(&row)
    }

    /// Storage index (column-major), `None` outside the extent
    pub fn index_of(&self, hex: Hex) -> Option<usize> {
        if !self.contains(hex) {
            return None;
        }
        let (col, row) = Self::to_offset(hex);
        Some(col as usize * self.height as usize + row as usize)
    }

    /// All hexes in storage order
    pub fn hexes(&self) -> impl Iterator<Item = Hex> + '_ {
        (0..self.width as i32).flat_map(move |col| {
            (0..self.height as i32).map(move |row| Self::from_offset(col, row))
        })
    }

    /// In-extent neighbors of `hex`
    pub fn neighbors_of(&self, hex: Hex) -> impl Iterator<Item = Hex> + '_ {
        hex.neighbors().into_iter().filter(move |n| self.contains(*n))
    }

    /// A border hex has at least one neighbor outside the extent
    pub fn is_border(&self, hex: Hex) -> bool {
        self.contains(hex) && hex.neighbors().iter().any(|n| !self.contains(*n))
    }

    /// The four corner hexes: top-left, bottom-left, top-right, bottom-right
    pub fn corners(&self) -> [Hex; 4] {
        let last_col = self.width.saturating_sub(1) as i32;
        let last_row = self.height.saturating_sub(1) as i32;
        [
            Self::from_offset(0, 0),
            Self::from_offset(0, last_row),
            Self::from_offset(last_col, 0),
            Self::from_offset(last_col, last_row),
        ]
    }

    /// The most distant pair of opposite corners.
    /// Ties go to the top-left / bottom-right diagonal.
    pub fn opposite_corners(&self) -> (Hex, Hex) {
        let [top_left, bottom_left, top_right, bottom_right] = self.corners();
        let main = top_left.distance_to(bottom_right);
        let anti = bottom_left.distance_to(top_right);
        if anti > main {
            (bottom_left, top_right)
        } else {
            (top_left, bottom_right)
        }
    }
}
