use serde::{Deserialize, Serialize};

/// Side length of every floor grid.
pub const MAP_SIZE: usize = 13;

const MAP_EDGE: i32 = MAP_SIZE as i32 - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::Up => Self { y: self.y - 1, x: self.x },
            Direction::Down => Self { y: self.y + 1, x: self.x },
            Direction::Left => Self { y: self.y, x: self.x - 1 },
            Direction::Right => Self { y: self.y, x: self.x + 1 },
        }
    }

    pub fn is_valid(self) -> bool {
        (0..=MAP_EDGE).contains(&self.x) && (0..=MAP_EDGE).contains(&self.y)
    }

    pub fn is_corner(self) -> bool {
        (self.x == 0 || self.x == MAP_EDGE) && (self.y == 0 || self.y == MAP_EDGE)
    }

    pub fn is_border(self) -> bool {
        self.x == 0 || self.x == MAP_EDGE || self.y == 0 || self.y == MAP_EDGE
    }

    /// The four orthogonal neighbours, including ones that fall off the map.
    pub fn free_dir4(self) -> [Pos; 4] {
        [
            self.step(Direction::Up),
            self.step(Direction::Down),
            self.step(Direction::Left),
            self.step(Direction::Right),
        ]
    }

    pub fn dir4(self) -> impl Iterator<Item = Pos> {
        self.free_dir4().into_iter().filter(|pos| pos.is_valid())
    }

    pub fn free_dir8(self) -> [Pos; 8] {
        let up = self.step(Direction::Up);
        let down = self.step(Direction::Down);
        [
            up,
            down,
            self.step(Direction::Left),
            self.step(Direction::Right),
            up.step(Direction::Left),
            up.step(Direction::Right),
            down.step(Direction::Left),
            down.step(Direction::Right),
        ]
    }

    pub fn dir8(self) -> impl Iterator<Item = Pos> {
        self.free_dir8().into_iter().filter(|pos| pos.is_valid())
    }

    pub fn is_near(self, other: Pos) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }

    pub fn distance(self, other: Pos) -> f64 {
        f64::from(self.x - other.x).hypot(f64::from(self.y - other.y))
    }

    /// Row-major slot of this cell inside a flat `MAP_SIZE * MAP_SIZE` buffer.
    pub fn index(self) -> usize {
        (self.y as usize) * MAP_SIZE + (self.x as usize)
    }

    pub fn from_index(index: usize) -> Self {
        Self { y: (index / MAP_SIZE) as i32, x: (index % MAP_SIZE) as i32 }
    }

    /// Every cell of the map, row by row.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..MAP_SIZE * MAP_SIZE).map(Pos::from_index)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WallKind {
    Normal,
    Unbreakable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StairDir {
    Up,
    Down,
}

/// Door and key colours, ordered from the cheapest tier to the most valuable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KeyType {
    Yellow,
    Blue,
    Red,
    Green,
}

impl KeyType {
    pub const ALL: [KeyType; 4] = [KeyType::Yellow, KeyType::Blue, KeyType::Red, KeyType::Green];

    pub fn tier(self) -> usize {
        match self {
            KeyType::Yellow => 0,
            KeyType::Blue => 1,
            KeyType::Red => 2,
            KeyType::Green => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    Door { key: KeyType },
    Key { key: KeyType },
    Enemy { index: usize },
    Potion { index: usize },
    Gem { index: usize },
}

impl Event {
    pub fn is_expense(self) -> bool {
        matches!(self, Event::Door { .. } | Event::Enemy { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Block {
    Empty,
    Wall(WallKind),
    Stair(StairDir),
    Event(Event),
}

impl Block {
    pub fn is_wall(self) -> bool {
        matches!(self, Block::Wall(_))
    }

    pub fn is_stair(self) -> bool {
        matches!(self, Block::Stair(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoomMark {
    Empty,
    Inner,
    Border,
    Entry,
}

impl RoomMark {
    /// Any mark other than `Empty` means the cell is already claimed by some room.
    pub fn is_claimed(self) -> bool {
        self != RoomMark::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir4_drops_neighbours_outside_the_map() {
        let corner = Pos::new(0, 0);
        let neighbours: Vec<Pos> = corner.dir4().collect();
        assert_eq!(neighbours, vec![Pos::new(0, 1), Pos::new(1, 0)]);
        assert_eq!(Pos::new(6, 6).dir8().count(), 8);
    }

    #[test]
    fn index_round_trips_through_row_major_layout() {
        for pos in Pos::all() {
            assert_eq!(Pos::from_index(pos.index()), pos);
        }
        assert_eq!(Pos::new(6, 12).index(), 12 * MAP_SIZE + 6);
    }

    #[test]
    fn corner_and_border_checks_follow_map_edges() {
        assert!(Pos::new(12, 0).is_corner());
        assert!(!Pos::new(6, 12).is_corner());
        assert!(Pos::new(6, 12).is_border());
        assert!(!Pos::new(6, 11).is_border());
        assert!(Pos::new(6, 11).is_near(Pos::new(6, 12)));
        assert!(!Pos::new(5, 11).is_near(Pos::new(6, 12)));
    }

    #[test]
    fn key_tiers_follow_declaration_order() {
        let tiers: Vec<usize> = KeyType::ALL.iter().map(|key| key.tier()).collect();
        assert_eq!(tiers, vec![0, 1, 2, 3]);
        assert!(KeyType::Yellow < KeyType::Blue);
    }
}
