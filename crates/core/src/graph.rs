//! Directed adjacency-list graph with reachability, cut scanning, and shortest paths.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

/// Adjacency lists keyed by vertex id. Vertices are remembered in the order
/// they were first registered as an edge source, which fixes the traversal
/// order of every query.
#[derive(Clone, Debug)]
pub struct Graph<K, P = ()> {
    order: Vec<K>,
    edges: BTreeMap<K, Vec<(K, P)>>,
}

impl<K: Copy + Ord, P> Default for Graph<K, P> {
    fn default() -> Self {
        Self { order: Vec::new(), edges: BTreeMap::new() }
    }
}

impl<K: Copy + Ord, P> Graph<K, P> {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, vertex: K) -> &mut Vec<(K, P)> {
        if !self.edges.contains_key(&vertex) {
            self.order.push(vertex);
        }
        self.edges.entry(vertex).or_default()
    }

    pub fn add_edge(&mut self, from: K, to: K, payload: P) {
        self.register(from).push((to, payload));
    }

    /// Appends edges out of `from`. An empty iterator still registers `from`.
    pub fn add_edges(&mut self, from: K, targets: impl IntoIterator<Item = (K, P)>) {
        self.register(from).extend(targets);
    }

    pub fn vertices(&self) -> &[K] {
        &self.order
    }

    pub fn neighbors(&self, vertex: K) -> impl Iterator<Item = &(K, P)> {
        self.edges.get(&vertex).into_iter().flatten()
    }

    fn reach_into(&self, source: K, skip: &dyn Fn(K) -> bool, visited: &mut BTreeSet<K>) -> Vec<K> {
        let mut reached = Vec::new();
        if !visited.insert(source) {
            return reached;
        }
        reached.push(source);

        let mut stack = vec![(source, 0_usize)];
        while let Some(frame) = stack.last_mut() {
            let (vertex, cursor) = *frame;
            frame.1 += 1;
            let next = match self.edges.get(&vertex).and_then(|edges| edges.get(cursor)) {
                Some((next, _)) => *next,
                None => {
                    stack.pop();
                    continue;
                }
            };
            if skip(next) || !visited.insert(next) {
                continue;
            }
            reached.push(next);
            stack.push((next, 0));
        }
        reached
    }

    /// Every vertex reachable from `source`, in depth-first pre-order.
    pub fn single_source_reach(&self, source: K) -> Vec<K> {
        self.reach_into(source, &|_| false, &mut BTreeSet::new())
    }

    /// Splits the vertices reachable from `sources` (all registered vertices
    /// when `None`) into components; each vertex lands in exactly one.
    pub fn multi_source_reach(&self, sources: Option<&[K]>) -> Vec<Vec<K>> {
        self.multi_source_reach_skipping(sources.unwrap_or(self.order.as_slice()), &|_| false)
    }

    fn multi_source_reach_skipping(&self, sources: &[K], skip: &dyn Fn(K) -> bool) -> Vec<Vec<K>> {
        let mut visited = BTreeSet::new();
        let mut components = Vec::new();
        for &source in sources {
            if visited.contains(&source) || skip(source) {
                continue;
            }
            components.push(self.reach_into(source, skip, &mut visited));
        }
        components
    }

    /// Simulates removing `vertex` and returns the pieces its component falls
    /// apart into. Zero pieces means the vertex was isolated, one means it is
    /// not an articulation point.
    pub fn scan_cut(&self, vertex: K) -> Vec<Vec<K>> {
        let component: Vec<K> =
            self.single_source_reach(vertex).into_iter().filter(|&other| other != vertex).collect();
        self.multi_source_reach_skipping(&component, &|other| other == vertex)
    }

    /// Shortest distances from `source` in visit order. Equal distances are
    /// settled in the order they were discovered; vertices rejected by `skip`
    /// are never entered.
    pub fn dijkstra(
        &self,
        source: K,
        extract_distance: impl Fn(&P) -> u32,
        skip: impl Fn(K) -> bool,
    ) -> Vec<(K, u32)> {
        let mut settled = BTreeSet::new();
        let mut result = Vec::new();
        let mut sequence = 0_u64;
        let mut queue = BinaryHeap::from([Reverse((0_u32, sequence, source))]);

        while let Some(Reverse((distance, _, vertex))) = queue.pop() {
            if !settled.insert(vertex) {
                continue;
            }
            result.push((vertex, distance));
            for (next, payload) in self.neighbors(vertex) {
                if skip(*next) {
                    continue;
                }
                sequence += 1;
                queue.push(Reverse((distance + extract_distance(payload), sequence, *next)));
            }
        }
        result
    }
}
