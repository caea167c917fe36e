//! Expense slots of a room as a small DAG keyed by cell.

use std::collections::BTreeMap;

use crate::types::Pos;

/// Expense slots of one room: cells the hero pays to pass, chained so that a
/// path lists the tolls met one after another.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpenseDag<T> {
    nodes: Vec<(Pos, T)>,
    edges: BTreeMap<Pos, Vec<Pos>>,
}

impl<T> Default for ExpenseDag<T> {
    fn default() -> Self {
        Self { nodes: Vec::new(), edges: BTreeMap::new() }
    }
}

impl<T> ExpenseDag<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a slot, or replaces an existing slot's value and drops its
    /// outgoing edges.
    pub fn add_node(&mut self, pos: Pos, value: T) {
        match self.nodes.iter_mut().find(|(existing, _)| *existing == pos) {
            Some(slot) => slot.1 = value,
            None => self.nodes.push((pos, value)),
        }
        self.edges.insert(pos, Vec::new());
    }

    /// Ignored unless `from` is already a slot.
    pub fn add_edge(&mut self, from: Pos, to: Pos) {
        if let Some(targets) = self.edges.get_mut(&from) {
            targets.push(to);
        }
    }

    pub fn nodes(&self) -> &[(Pos, T)] {
        &self.nodes
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        self.nodes.iter().map(|(pos, _)| *pos)
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.edges.contains_key(&pos)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn value(&self, pos: Pos) -> Option<&T> {
        self.nodes.iter().find(|(existing, _)| *existing == pos).map(|(_, value)| value)
    }

    /// Every source-to-sink path, sources taken in insertion order.
    pub fn paths(&self) -> Vec<Vec<(Pos, &T)>> {
        let mut in_degree: BTreeMap<Pos, usize> = self.positions().map(|pos| (pos, 0)).collect();
        for targets in self.edges.values() {
            for target in targets {
                if let Some(degree) = in_degree.get_mut(target) {
                    *degree += 1;
                }
            }
        }

        let mut paths = Vec::new();
        for source in self.positions().filter(|pos| in_degree.get(pos) == Some(&0)) {
            let mut stack = vec![vec![source]];
            while let Some(path) = stack.pop() {
                let Some(&tail) = path.last() else {
                    continue;
                };
                let next: Vec<Pos> = self
                    .edges
                    .get(&tail)
                    .into_iter()
                    .flatten()
                    .copied()
                    .filter(|target| self.contains(*target) && !path.contains(target))
                    .collect();
                if next.is_empty() {
                    paths.push(path.iter().filter_map(|&pos| Some((pos, self.value(pos)?))).collect());
                    continue;
                }
                for target in next.into_iter().rev() {
                    let mut extended = path.clone();
                    extended.push(target);
                    stack.push(extended);
                }
            }
        }
        paths
    }

    /// Same shape with every value replaced, stopping at the first error.
    pub fn try_map<U, E>(&self, mut f: impl FnMut(Pos, &T) -> Result<U, E>) -> Result<ExpenseDag<U>, E> {
        let nodes = self
            .nodes
            .iter()
            .map(|(pos, value)| f(*pos, value).map(|mapped| (*pos, mapped)))
            .collect::<Result<Vec<_>, E>>()?;
        Ok(ExpenseDag { nodes, edges: self.edges.clone() })
    }
}
