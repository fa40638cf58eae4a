use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashSet;

/// All maximal cliques of `graph`. Self loops are ignored.
pub fn maximal_cliques<N, E>(graph: &UnGraph<N, E>) -> Vec<Vec<NodeIndex>> {
    if graph.node_count() == 0 {
        return vec![];
    }
    let adjacency = graph
        .node_indices()
        .map(|v| graph.neighbors(v).filter(|&u| u != v).collect())
        .collect::<Vec<HashSet<NodeIndex>>>();

    let mut cliques = vec![];
    let mut r = vec![];
    let p = graph.node_indices().collect();
    bron_kerbosch(&adjacency, &mut r, p, HashSet::new(), &mut cliques);
    cliques
}

/// Bron–Kerbosch with pivoting.
///
/// `r` is the clique being grown, `p` the vertices that may still extend it
/// and `x` those that were already tried. The pivot is the vertex of `p ∪ x`
/// with the most neighbours in `p`; its neighbours are not branched on.
fn bron_kerbosch(
    adjacency: &[HashSet<NodeIndex>],
    r: &mut Vec<NodeIndex>,
    mut p: HashSet<NodeIndex>,
    mut x: HashSet<NodeIndex>,
    cliques: &mut Vec<Vec<NodeIndex>>,
) {
    let pivot = match p
        .union(&x)
        .max_by_key(|u| adjacency[u.index()].intersection(&p).count())
    {
        Some(&pivot) => pivot,
        None => {
            cliques.push(r.clone());
            return;
        }
    };

    let candidates = p
        .difference(&adjacency[pivot.index()])
        .copied()
        .collect::<Vec<_>>();
    for v in candidates {
        let neighbours = &adjacency[v.index()];
        r.push(v);
        bron_kerbosch(
            adjacency,
            r,
            p.intersection(neighbours).copied().collect(),
            x.intersection(neighbours).copied().collect(),
            cliques,
        );
        r.pop();
        p.remove(&v);
        x.insert(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    fn cliques_of(edges: &[(u32, u32)]) -> Vec<Vec<usize>> {
        let graph = UnGraph::<(), ()>::from_edges(edges);
        maximal_cliques(&graph)
            .into_iter()
            .map(|c| c.into_iter().map(|v| v.index()).sorted().collect_vec())
            .sorted()
            .collect_vec()
    }

    #[test]
    fn test_triangle_with_tail() {
        assert_eq!(
            cliques_of(&[(1, 2), (2, 3), (1, 3), (3, 4)]),
            vec![vec![0], vec![1, 2, 3], vec![3, 4]]
        );
    }

    #[test]
    fn test_two_overlapping_k4() {
        let edges = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3), (1, 4), (2, 4), (3, 4)];
        assert_eq!(cliques_of(&edges), vec![vec![0, 1, 2, 3], vec![1, 2, 3, 4]]);
    }

    #[test]
    fn test_self_loops_and_parallel_edges_ignored() {
        assert_eq!(cliques_of(&[(0, 0), (0, 1), (1, 0)]), vec![vec![0, 1]]);
    }

    #[test]
    fn test_empty_graph() {
        let graph = UnGraph::<(), ()>::default();
        assert!(maximal_cliques(&graph).is_empty());
    }
}
