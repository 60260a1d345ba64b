use super::label::{Label, Location, Position};

pub const NULL_DEPTH: i32 = -1;

/// Number of times each side of an edge is covered by each input geometry.
///
/// Coincident edges accumulate depth as they are merged; after
/// normalisation a side is exterior at depth 0 and interior above it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Depth {
    depth: [[i32; 3]; 2],
}

impl Default for Depth {
    fn default() -> Self {
        Self {
            depth: [[NULL_DEPTH; 3]; 2],
        }
    }
}

impl Depth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth_at_location(loc: Location) -> i32 {
        match loc {
            Location::Exterior => 0,
            Location::Interior => 1,
            _ => NULL_DEPTH,
        }
    }

    pub fn get(&self, geom: usize, pos: Position) -> i32 {
        self.depth[geom][pos.index()]
    }

    pub fn set(&mut self, geom: usize, pos: Position, depth: i32) {
        self.depth[geom][pos.index()] = depth;
    }

    pub fn location(&self, geom: usize, pos: Position) -> Location {
        if self.depth[geom][pos.index()] <= 0 {
            Location::Exterior
        } else {
            Location::Interior
        }
    }

    /// Adds the side locations of `label`.
    pub fn add(&mut self, label: &Label) {
        for geom in 0..2 {
            for pos in [Position::Left, Position::Right] {
                let loc = label.location(geom, pos);
                if loc == Location::Exterior || loc == Location::Interior {
                    let d = &mut self.depth[geom][pos.index()];
                    if *d == NULL_DEPTH {
                        *d = Depth::depth_at_location(loc);
                    } else {
                        *d += Depth::depth_at_location(loc);
                    }
                }
            }
        }
    }

    pub fn is_null(&self) -> bool {
        self.depth.iter().flatten().all(|d| *d == NULL_DEPTH)
    }

    pub fn is_null_geom(&self, geom: usize) -> bool {
        self.depth[geom][Position::Left.index()] == NULL_DEPTH
    }

    pub fn is_null_at(&self, geom: usize, pos: Position) -> bool {
        self.depth[geom][pos.index()] == NULL_DEPTH
    }

    /// Right depth minus left depth.
    pub fn delta(&self, geom: usize) -> i32 {
        self.depth[geom][Position::Right.index()] - self.depth[geom][Position::Left.index()]
    }

    /// Reduces each non-null geometry's side depths to 0 or 1 relative to
    /// the shallower side.
    pub fn normalize(&mut self) {
        for geom in 0..2 {
            if self.is_null_geom(geom) {
                continue;
            }
            let left = self.depth[geom][Position::Left.index()];
            let right = self.depth[geom][Position::Right.index()];
            let min_depth = left.min(right).max(0);
            for pos in [Position::Left, Position::Right] {
                let d = &mut self.depth[geom][pos.index()];
                *d = if *d > min_depth { 1 } else { 0 };
            }
        }
    }
}
