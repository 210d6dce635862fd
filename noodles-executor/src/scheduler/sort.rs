//! Topological sorting and dependency-level partitioning.
//!
//! Both functions are pure: they take a node list and an edge list and never
//! touch engine state. They are generic over the key type so the execution
//! graph can sort arena indices while scope execution sorts operator IDs.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Result of a topological sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome<K> {
    /// Nodes in a valid execution order. Nodes on or behind a cycle are omitted.
    pub sorted: Vec<K>,
    /// Cycles found among the nodes Kahn's pass could not order.
    pub cycles: Vec<Vec<K>>,
}

impl<K> SortOutcome<K> {
    /// Whether the sort covered the whole graph.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        self.cycles.is_empty()
    }
}

/// Sort `nodes` so that every edge `(source, target)` has `source` first.
///
/// Uses Kahn's algorithm seeded in `nodes` order, so the result is
/// deterministic for a given input. Edges whose endpoints are not in `nodes`
/// are ignored. Duplicate edges are allowed.
///
/// When the graph contains cycles, `sorted` holds the partial order and a
/// depth-first walk over the remaining nodes reports each cycle as the path
/// slice from the revisited node onward. Overlapping cycle clusters may be
/// reported more than once.
pub fn topological_sort<K>(nodes: &[K], edges: &[(K, K)]) -> SortOutcome<K>
where
    K: Clone + Eq + Hash,
{
    let mut position: HashMap<&K, usize> = HashMap::with_capacity(nodes.len());
    let mut keys: Vec<&K> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if !position.contains_key(node) {
            position.insert(node, keys.len());
            keys.push(node);
        }
    }

    let n = keys.len();
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut in_degree = vec![0usize; n];

    for (source, target) in edges {
        let (Some(&s), Some(&t)) = (position.get(source), position.get(target)) else {
            continue;
        };
        successors[s].push(t);
        in_degree[t] += 1;
    }

    // Kahn's pass
    let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    let mut placed = vec![false; n];
    let mut sorted = Vec::with_capacity(n);

    while let Some(node) = queue.pop_front() {
        placed[node] = true;
        sorted.push(keys[node].clone());

        for &next in &successors[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    let cycles = if sorted.len() < n {
        find_cycles(&keys, &successors, &placed)
    } else {
        Vec::new()
    };

    SortOutcome { sorted, cycles }
}

/// Depth-first cycle search restricted to nodes Kahn's pass left unplaced.
fn find_cycles<K: Clone>(keys: &[&K], successors: &[Vec<usize>], placed: &[bool]) -> Vec<Vec<K>> {
    let n = keys.len();
    let mut explored = vec![false; n];
    let mut on_path: Vec<Option<usize>> = vec![None; n];
    let mut cycles = Vec::new();

    for start in 0..n {
        if placed[start] || explored[start] {
            continue;
        }

        // (node, next successor to visit)
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        let mut path: Vec<usize> = vec![start];
        on_path[start] = Some(0);

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            if let Some(&next) = successors[node].get(frame.1) {
                frame.1 += 1;
                if placed[next] || explored[next] {
                    continue;
                }
                if let Some(at) = on_path[next] {
                    cycles.push(path[at..].iter().map(|&i| keys[i].clone()).collect());
                } else {
                    on_path[next] = Some(path.len());
                    path.push(next);
                    stack.push((next, 0));
                }
            } else {
                stack.pop();
                path.pop();
                on_path[node] = None;
                explored[node] = true;
            }
        }
    }

    cycles
}

/// Partition a topological order into dependency levels.
///
/// A node's level is one more than the highest level among its direct
/// predecessors, or 0 when it has none. Predecessors missing from `sorted`
/// (for example nodes trapped in a cycle) are ignored. Within a level, nodes
/// keep their relative order from `sorted`.
pub fn compute_levels<K>(sorted: &[K], edges: &[(K, K)]) -> Vec<Vec<K>>
where
    K: Clone + Eq + Hash,
{
    let mut predecessors: HashMap<&K, Vec<&K>> = HashMap::new();
    for (source, target) in edges {
        predecessors.entry(target).or_default().push(source);
    }

    let mut level_of: HashMap<&K, usize> = HashMap::with_capacity(sorted.len());
    let mut levels: Vec<Vec<K>> = Vec::new();

    for node in sorted {
        let level = predecessors
            .get(node)
            .into_iter()
            .flatten()
            .filter_map(|pred| level_of.get(*pred))
            .max()
            .map_or(0, |max| max + 1);

        level_of.insert(node, level);
        if levels.len() <= level {
            levels.resize_with(level + 1, Vec::new);
        }
        levels[level].push(node.clone());
    }

    levels
}
