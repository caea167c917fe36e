//! Union-find over small integer domains and layering of partial orders.

#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    pub fn new(size: usize) -> Self {
        Self { parent: (0..size).collect() }
    }

    pub fn find(&mut self, value: usize) -> usize {
        let mut root = value;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = value;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    pub fn is_joint(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    pub fn join(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        self.parent[root_a] = root_b;
    }
}

/// Caps `value` at `high`, then raises it to `low`. Unlike `Ord::clamp` this
/// never panics; when `low > high` the lower bound wins.
pub fn clamp_to(value: i64, low: i64, high: i64) -> i64 {
    value.min(high).max(low)
}

/// Splits `items` into layers with Kahn's algorithm: the first layer holds
/// every item nothing dominates, and an item only dominates items that land
/// in strictly later layers. Items caught in a domination cycle are emitted
/// together as a final layer.
pub fn partial_order_layers<T: Clone>(
    items: &[T],
    dominates: impl Fn(&T, &T) -> bool,
) -> Vec<Vec<T>> {
    let mut dominated: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
    let mut in_degree = vec![0_usize; items.len()];
    for (i, a) in items.iter().enumerate() {
        for (j, b) in items.iter().enumerate() {
            if i != j && dominates(a, b) {
                dominated[i].push(j);
                in_degree[j] += 1;
            }
        }
    }

    let mut layers = Vec::new();
    let mut remaining: Vec<usize> = (0..items.len()).collect();
    while !remaining.is_empty() {
        let (layer, rest): (Vec<usize>, Vec<usize>) =
            remaining.iter().partition(|&&index| in_degree[index] == 0);
        if layer.is_empty() {
            layers.push(rest.iter().map(|&index| items[index].clone()).collect());
            break;
        }
        for &index in &layer {
            for &next in &dominated[index] {
                in_degree[next] -= 1;
            }
        }
        layers.push(layer.iter().map(|&index| items[index].clone()).collect());
        remaining = rest;
    }
    layers
}
