use std::fmt;

/// Topological location of a point relative to a geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Location {
    Interior,
    Boundary,
    Exterior,
    #[default]
    None,
}

impl Location {
    pub fn symbol(self) -> char {
        match self {
            Location::Interior => 'i',
            Location::Boundary => 'b',
            Location::Exterior => 'e',
            Location::None => '-',
        }
    }
}

/// Position relative to a directed edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    On = 0,
    Left = 1,
    Right = 2,
}

impl Position {
    pub fn opposite(self) -> Self {
        match self {
            Position::Left => Position::Right,
            Position::Right => Position::Left,
            Position::On => Position::On,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Locations of an edge relative to one geometry.
///
/// Line locations only carry `On`; area locations carry `On`, `Left` and
/// `Right`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TopologyLocation {
    locs: [Location; 3],
    area: bool,
}

impl TopologyLocation {
    pub fn line(on: Location) -> Self {
        Self {
            locs: [on, Location::None, Location::None],
            area: false,
        }
    }

    pub fn area(on: Location, left: Location, right: Location) -> Self {
        Self {
            locs: [on, left, right],
            area: true,
        }
    }

    pub fn get(&self, pos: Position) -> Location {
        if !self.area && pos != Position::On {
            return Location::None;
        }
        self.locs[pos.index()]
    }

    pub fn set(&mut self, pos: Position, loc: Location) {
        if !self.area && pos != Position::On {
            self.area = true;
        }
        self.locs[pos.index()] = loc;
    }

    pub fn is_area(&self) -> bool {
        self.area
    }

    pub fn is_line(&self) -> bool {
        !self.area
    }

    pub fn is_null(&self) -> bool {
        self.slots().iter().all(|l| *l == Location::None)
    }

    pub fn is_any_null(&self) -> bool {
        self.slots().iter().any(|l| *l == Location::None)
    }

    pub fn all_positions_equal(&self, loc: Location) -> bool {
        self.slots().iter().all(|l| *l == loc)
    }

    pub fn is_equal_on_side(&self, other: &TopologyLocation, pos: Position) -> bool {
        self.get(pos) == other.get(pos)
    }

    pub fn set_all(&mut self, loc: Location) {
        let n = self.slot_count();
        for l in &mut self.locs[..n] {
            *l = loc;
        }
    }

    pub fn set_all_if_null(&mut self, loc: Location) {
        let n = self.slot_count();
        for l in &mut self.locs[..n] {
            if *l == Location::None {
                *l = loc;
            }
        }
    }

    pub fn flip(&mut self) {
        if self.area {
            self.locs.swap(Position::Left.index(), Position::Right.index());
        }
    }

    /// Fills null locations from `other`. A line location merged with an
    /// area location becomes an area location with null sides first.
    pub fn merge(&mut self, other: &TopologyLocation) {
        if other.area && !self.area {
            self.area = true;
            self.locs[1] = Location::None;
            self.locs[2] = Location::None;
        }
        for i in 0..self.slot_count() {
            if self.locs[i] == Location::None && i < other.slot_count() {
                self.locs[i] = other.locs[i];
            }
        }
    }

    pub fn to_line(&mut self) {
        self.area = false;
        self.locs[1] = Location::None;
        self.locs[2] = Location::None;
    }

    fn slot_count(&self) -> usize {
        if self.area {
            3
        } else {
            1
        }
    }

    fn slots(&self) -> &[Location] {
        &self.locs[..self.slot_count()]
    }
}

impl fmt::Display for TopologyLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.area {
            write!(
                f,
                "{}{}{}",
                self.locs[1].symbol(),
                self.locs[0].symbol(),
                self.locs[2].symbol()
            )
        } else {
            write!(f, "{}", self.locs[0].symbol())
        }
    }
}

/// Locations of a graph component relative to the two input geometries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Label {
    elt: [TopologyLocation; 2],
}

impl Default for Label {
    fn default() -> Self {
        Label::line(Location::None)
    }
}

impl Label {
    /// A line label with the same `On` location for both geometries.
    pub fn line(on: Location) -> Self {
        Self {
            elt: [TopologyLocation::line(on); 2],
        }
    }

    /// A line label for geometry `geom`; the other geometry is null.
    pub fn for_line(geom: usize, on: Location) -> Self {
        let mut label = Label::line(Location::None);
        label.elt[geom] = TopologyLocation::line(on);
        label
    }

    /// An area label with the same locations for both geometries.
    pub fn area(on: Location, left: Location, right: Location) -> Self {
        Self {
            elt: [TopologyLocation::area(on, left, right); 2],
        }
    }

    /// An area label for geometry `geom`; the other geometry is a null area.
    pub fn for_area(geom: usize, on: Location, left: Location, right: Location) -> Self {
        let mut label = Label::area(Location::None, Location::None, Location::None);
        label.elt[geom] = TopologyLocation::area(on, left, right);
        label
    }

    /// A line label carrying the `On` locations of `label`.
    pub fn to_line_label(label: &Label) -> Label {
        let mut line = Label::line(Location::None);
        for i in 0..2 {
            line.set_on_location(i, label.on_location(i));
        }
        line
    }

    pub fn flip(&mut self) {
        self.elt[0].flip();
        self.elt[1].flip();
    }

    pub fn flipped(&self) -> Label {
        let mut l = *self;
        l.flip();
        l
    }

    pub fn location(&self, geom: usize, pos: Position) -> Location {
        self.elt[geom].get(pos)
    }

    pub fn on_location(&self, geom: usize) -> Location {
        self.elt[geom].get(Position::On)
    }

    pub fn set_location(&mut self, geom: usize, pos: Position, loc: Location) {
        self.elt[geom].set(pos, loc);
    }

    pub fn set_on_location(&mut self, geom: usize, loc: Location) {
        self.elt[geom].set(Position::On, loc);
    }

    pub fn set_all_locations(&mut self, geom: usize, loc: Location) {
        self.elt[geom].set_all(loc);
    }

    pub fn set_all_locations_if_null(&mut self, geom: usize, loc: Location) {
        self.elt[geom].set_all_if_null(loc);
    }

    pub fn set_all_if_null(&mut self, loc: Location) {
        self.elt[0].set_all_if_null(loc);
        self.elt[1].set_all_if_null(loc);
    }

    pub fn merge(&mut self, other: &Label) {
        self.elt[0].merge(&other.elt[0]);
        self.elt[1].merge(&other.elt[1]);
    }

    /// Number of geometries this label carries any location for.
    pub fn geometry_count(&self) -> usize {
        self.elt.iter().filter(|e| !e.is_null()).count()
    }

    pub fn is_null(&self, geom: usize) -> bool {
        self.elt[geom].is_null()
    }

    pub fn is_any_null(&self, geom: usize) -> bool {
        self.elt[geom].is_any_null()
    }

    pub fn is_area(&self) -> bool {
        self.elt[0].is_area() || self.elt[1].is_area()
    }

    pub fn is_area_of(&self, geom: usize) -> bool {
        self.elt[geom].is_area()
    }

    pub fn is_line(&self, geom: usize) -> bool {
        self.elt[geom].is_line()
    }

    pub fn is_equal_on_side(&self, other: &Label, pos: Position) -> bool {
        self.elt[0].is_equal_on_side(&other.elt[0], pos) && self.elt[1].is_equal_on_side(&other.elt[1], pos)
    }

    pub fn all_positions_equal(&self, geom: usize, loc: Location) -> bool {
        self.elt[geom].all_positions_equal(loc)
    }

    pub fn to_line(&mut self, geom: usize) {
        if self.elt[geom].is_area() {
            self.elt[geom].to_line();
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A:{} B:{}", self.elt[0], self.elt[1])
    }
}
