//! Bipartite quantity–law dependency graph and cycle enumeration.
//!
//! Quantities and laws are the two node kinds. An [`Edge`] joins a
//! quantity to a law. A path may step from edge `(q1, L1)` to edge
//! `(q2, L2)` when `L2 != L1`, `q2 != q1` and `L2` uses `q1`. A cycle is
//! a closed path of more than two edges that repeats no edge and no law.
//! Laws that merely share one quantity form a star, not a cycle.
//!
//! Cycles are reported in canonical form so each one appears once no
//! matter which edge the search started from.

use crate::error::GraphError;
use crate::registry::Registry;
use mpd_core::QuantityDecl;
use mpd_law::Law;
use std::collections::BTreeSet;
use std::fmt;

/// A dependency edge between a quantity and a law.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    /// Quantity node.
    pub quantity: String,
    /// Law node.
    pub law: String,
}

impl Edge {
    /// Create an edge.
    pub fn new(quantity: impl Into<String>, law: impl Into<String>) -> Self {
        Self {
            quantity: quantity.into(),
            law: law.into(),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.quantity, self.law)
    }
}

/// A closed, non-repeating sequence of more than two edges.
///
/// Stored rotated so the smallest edge comes first, and of the two
/// traversal directions the lexicographically smaller is kept. Two
/// cycles over the same edges in the same ring order compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cycle {
    edges: Vec<Edge>,
}

impl Cycle {
    /// Canonicalise a closed path.
    pub fn from_path(path: Vec<Edge>) -> Self {
        let forward = rotate_to_min(path);
        let mut backward = forward.clone();
        if backward.len() > 1 {
            backward[1..].reverse();
        }
        Self {
            edges: forward.min(backward),
        }
    }

    /// Edges in canonical order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the cycle has no edges. Never true for enumerated cycles.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether `edge` lies on the cycle.
    pub fn contains(&self, edge: &Edge) -> bool {
        self.edges.contains(edge)
    }

    /// Laws on the cycle, in canonical order.
    pub fn laws(&self) -> impl Iterator<Item = &str> + '_ {
        self.edges.iter().map(|e| e.law.as_str())
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.edges.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

fn rotate_to_min(mut edges: Vec<Edge>) -> Vec<Edge> {
    let start = edges
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map_or(0, |(i, _)| i);
    edges.rotate_left(start);
    edges
}

/// Check every edge against the declared quantities and laws.
///
/// Both ends must be declared, and the law must list the quantity among
/// the quantities it uses.
pub fn validate_edges(
    edges: &[Edge],
    quantities: &Registry<QuantityDecl>,
    laws: &Registry<Law>,
) -> Result<(), GraphError> {
    for edge in edges {
        if !quantities.contains(&edge.quantity) {
            return Err(GraphError::MalformedEdge {
                quantity: edge.quantity.clone(),
                law: edge.law.clone(),
                reason: format!("unknown quantity '{}'", edge.quantity),
            });
        }
        let Some(law) = laws.get(&edge.law) else {
            return Err(GraphError::MalformedEdge {
                quantity: edge.quantity.clone(),
                law: edge.law.clone(),
                reason: format!("unknown law '{}'", edge.law),
            });
        };
        if !law.uses_quantity(&edge.quantity) {
            return Err(GraphError::EdgeNotUsedByLaw {
                quantity: edge.quantity.clone(),
                law: edge.law.clone(),
            });
        }
    }
    Ok(())
}

/// Enumerate the distinct simple cycles of the graph spanned by `edges`.
///
/// `law_uses(law, quantity)` reports whether a law uses a quantity. The
/// search is an iterative depth-first walk started from every edge, with
/// an explicit path stack and one candidate cursor per path position.
pub fn enumerate_cycles<F>(edges: &[Edge], law_uses: F) -> BTreeSet<Cycle>
where
    F: Fn(&str, &str) -> bool,
{
    let mut cycles = BTreeSet::new();

    for start in edges {
        let mut path: Vec<&Edge> = vec![start];
        let mut cursors: Vec<usize> = vec![0];

        while let Some(cursor) = cursors.last_mut() {
            let Some(candidate) = edges.get(*cursor) else {
                cursors.pop();
                path.pop();
                continue;
            };
            *cursor += 1;

            let Some(last) = path.last() else { break };
            if candidate.law == last.law
                || candidate.quantity == last.quantity
                || !law_uses(candidate.law.as_str(), last.quantity.as_str())
            {
                continue;
            }
            if candidate == start {
                if path.len() > 2 {
                    cycles.insert(Cycle::from_path(path.iter().map(|&e| e.clone()).collect()));
                }
                continue;
            }
            if path.iter().any(|e| *e == candidate || e.law == candidate.law) {
                continue;
            }
            path.push(candidate);
            cursors.push(0);
        }
    }

    cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn uses_table(pairs: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(l, qs)| (l.to_string(), qs.iter().map(|q| q.to_string()).collect()))
            .collect()
    }

    fn uses_fn(table: &HashMap<String, Vec<String>>) -> impl Fn(&str, &str) -> bool + '_ {
        move |law: &str, q: &str| table.get(law).is_some_and(|qs| qs.iter().any(|x| x == q))
    }

    fn ring() -> (Vec<Edge>, HashMap<String, Vec<String>>) {
        let table = uses_table(&[
            ("la", &["a", "c"][..]),
            ("lb", &["b", "a"][..]),
            ("lc", &["c", "b"][..]),
        ]);
        let edges = vec![Edge::new("a", "la"), Edge::new("b", "lb"), Edge::new("c", "lc")];
        (edges, table)
    }

    #[test]
    fn three_edge_ring_is_one_cycle() {
        let (edges, table) = ring();
        let cycles = enumerate_cycles(&edges, uses_fn(&table));
        assert_eq!(cycles.len(), 1);
        let cycle = cycles.iter().next().unwrap();
        assert_eq!(cycle.len(), 3);
        assert_eq!(cycle.edges()[0], Edge::new("a", "la"));
    }

    #[test]
    fn two_edge_loop_is_not_a_cycle() {
        let table = uses_table(&[("la", &["a", "b"][..]), ("lb", &["a", "b"][..])]);
        let edges = vec![Edge::new("a", "la"), Edge::new("b", "lb")];
        assert!(enumerate_cycles(&edges, uses_fn(&table)).is_empty());
    }

    #[test]
    fn laws_sharing_one_quantity_form_no_cycle() {
        let table = uses_table(&[
            ("la", &["k"][..]),
            ("lb", &["k"][..]),
            ("lc", &["k"][..]),
        ]);
        let edges = vec![Edge::new("k", "la"), Edge::new("k", "lb"), Edge::new("k", "lc")];
        assert!(enumerate_cycles(&edges, uses_fn(&table)).is_empty());

        // A shared constant may still close a loop through other quantities.
        let table = uses_table(&[
            ("la", &["k", "c"][..]),
            ("lb", &["k", "b"][..]),
            ("lc", &["c", "b"][..]),
        ]);
        let edges = vec![Edge::new("k", "la"), Edge::new("b", "lb"), Edge::new("c", "lc")];
        let cycles = enumerate_cycles(&edges, uses_fn(&table));
        assert_eq!(cycles.len(), 1);
    }

    #[test]
    fn broken_ring_has_no_cycle() {
        let (mut edges, table) = ring();
        edges.pop();
        assert!(enumerate_cycles(&edges, uses_fn(&table)).is_empty());
    }

    #[test]
    fn empty_graph() {
        assert!(enumerate_cycles(&[], |_, _| true).is_empty());
    }

    #[test]
    fn canonical_form_is_rotation_and_direction_invariant() {
        let e = |q: &str| Edge::new(q, format!("l{q}"));
        let a = Cycle::from_path(vec![e("c"), e("a"), e("b"), e("d")]);
        let b = Cycle::from_path(vec![e("b"), e("d"), e("c"), e("a")]);
        let reversed = Cycle::from_path(vec![e("d"), e("b"), e("a"), e("c")]);
        assert_eq!(a, b);
        assert_eq!(a, reversed);
        assert_eq!(a.edges()[0], e("a"));
        assert_eq!(a.to_string(), "(a, la) -> (b, lb) -> (d, ld) -> (c, lc)");
    }

    #[test]
    fn validate_rejects_unknown_and_unused() {
        let mut quantities = Registry::new();
        quantities.insert(QuantityDecl::new("a", "ns")).unwrap();
        quantities.insert(QuantityDecl::new("b", "ns")).unwrap();
        let mut laws = Registry::new();
        laws.insert(Law::builder("la", "ns").uses("a").build()).unwrap();

        assert!(validate_edges(&[Edge::new("a", "la")], &quantities, &laws).is_ok());
        assert!(matches!(
            validate_edges(&[Edge::new("z", "la")], &quantities, &laws),
            Err(GraphError::MalformedEdge { .. })
        ));
        assert!(matches!(
            validate_edges(&[Edge::new("a", "lz")], &quantities, &laws),
            Err(GraphError::MalformedEdge { .. })
        ));
        assert_eq!(
            validate_edges(&[Edge::new("b", "la")], &quantities, &laws),
            Err(GraphError::EdgeNotUsedByLaw {
                quantity: "b".into(),
                law: "la".into()
            })
        );
    }

    proptest! {
        #[test]
        fn edge_order_does_not_change_cycles(seed in 0usize..6) {
            let (edges, table) = ring();
            let mut shuffled = edges.clone();
            shuffled.rotate_left(seed % 3);
            if seed >= 3 {
                shuffled.reverse();
            }
            prop_assert_eq!(
                enumerate_cycles(&edges, uses_fn(&table)),
                enumerate_cycles(&shuffled, uses_fn(&table))
            );
        }
    }
}
