//! Per-cell layers over the fixed floor grid.

use std::ops::{Index, IndexMut};

use serde::Serialize;

use crate::graph::Graph;
use crate::types::{MAP_SIZE, Pos};

/// One value per map cell, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Layer<T> {
    cells: Vec<T>,
}

impl<T: Clone> Layer<T> {
    pub fn filled(value: T) -> Self {
        Self { cells: vec![value; MAP_SIZE * MAP_SIZE] }
    }
}

impl<T> Layer<T> {
    pub fn from_fn(mut init: impl FnMut(Pos) -> T) -> Self {
        Self { cells: Pos::all().map(&mut init).collect() }
    }

    pub fn get(&self, pos: Pos) -> Option<&T> {
        if pos.is_valid() { self.cells.get(pos.index()) } else { None }
    }

    pub fn set_many(&mut self, positions: impl IntoIterator<Item = Pos>, value: T)
    where
        T: Clone,
    {
        for pos in positions {
            self[pos] = value.clone();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pos, &T)> {
        self.cells.iter().enumerate().map(|(index, value)| (Pos::from_index(index), value))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Pos, &T) -> U) -> Layer<U> {
        Layer { cells: self.iter().map(|(pos, value)| f(pos, value)).collect() }
    }

    /// Registers every cell in row-major order and links it to each valid
    /// orthogonal neighbour accepted by `connects(from, to)`.
    pub fn build_graph_dir4(&self, connects: impl Fn((&T, Pos), (&T, Pos)) -> bool) -> Graph<Pos, u32> {
        let mut graph = Graph::new();
        for (pos, value) in self.iter() {
            let targets: Vec<(Pos, u32)> = pos
                .dir4()
                .filter(|&next| connects((value, pos), (&self[next], next)))
                .map(|next| (next, 1))
                .collect();
            graph.add_edges(pos, targets);
        }
        graph
    }
}

impl<T> Index<Pos> for Layer<T> {
    type Output = T;

    fn index(&self, pos: Pos) -> &T {
        &self.cells[pos.index()]
    }
}

impl<T> IndexMut<Pos> for Layer<T> {
    fn index_mut(&mut self, pos: Pos) -> &mut T {
        &mut self.cells[pos.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_registers_every_cell_even_without_edges() {
        let layer = Layer::from_fn(|pos| pos.x % 2 == 0);
        let graph = layer.build_graph_dir4(|(from, _), (to, _)| from == to);
        assert_eq!(graph.vertices().len(), MAP_SIZE * MAP_SIZE);
        assert_eq!(graph.vertices()[0], Pos::new(0, 0));
        assert_eq!(graph.multi_source_reach(None).len(), MAP_SIZE);
    }

    #[test]
    fn get_rejects_cells_outside_the_map() {
        let mut layer = Layer::filled(0_u8);
        layer.set_many([Pos::new(3, 4), Pos::new(5, 6)], 7);
        assert_eq!(layer.get(Pos::new(3, 4)), Some(&7));
        assert_eq!(layer[Pos::new(5, 6)], 7);
        assert_eq!(layer.get(Pos::new(-1, 4)), None);
        assert_eq!(layer.get(Pos::new(0, MAP_SIZE as i32)), None);
        assert_eq!(layer.iter().filter(|(_, value)| **value == 7).count(), 2);
    }
}
