mod maximal_cliques;
mod sub_cliques;

use itertools::Itertools;
use log::info;
use petgraph::{
    algo::dijkstra,
    graph::{NodeIndex, UnGraph},
};
use std::collections::{BTreeSet, HashMap};

pub use maximal_cliques::maximal_cliques;
pub use sub_cliques::SubCliques;

/// Recomputes query results in memory to cross-check the database.
///
/// Edges are undirected; `k` is the clique size, or the hop threshold when
/// checking a diameter.
pub struct Validation {
    graph: UnGraph<i64, f64>,
    k: usize,
}

impl Validation {
    /// Builds the graph from weighted edges `(i, j, weight)`.
    ///
    /// A repeated edge overwrites the weight of the earlier one.
    pub fn new(edge_list: &[(i64, i64, f64)], k: usize) -> Self {
        let mut graph = UnGraph::<i64, f64>::default();
        let mut nodes = HashMap::new();
        let mut node = |graph: &mut UnGraph<i64, f64>, id: i64| {
            *nodes.entry(id).or_insert_with(|| graph.add_node(id))
        };
        for &(i, j, weight) in edge_list {
            let a = node(&mut graph, i);
            let b = node(&mut graph, j);
            graph.update_edge(a, b, weight);
        }
        info!(
            "Validation graph has {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Self { graph, k }
    }

    /// Builds the graph from unweighted edges, each with weight 1.
    pub fn from_edges(edge_list: &[(i64, i64)], k: usize) -> Self {
        let weighted = edge_list.iter().map(|&(i, j)| (i, j, 1.0)).collect_vec();
        Self::new(&weighted, k)
    }

    pub fn get_subcliques<'a>(&self, clique: &'a [i64]) -> SubCliques<'a, i64> {
        SubCliques::new(clique, self.k)
    }

    /// All k-cliques, each sorted, in sorted order.
    ///
    /// Maximal cliques of size k are taken as they are, larger ones are split
    /// into their sub-cliques of size k and smaller ones are dropped.
    pub fn find_cliques(&self) -> Vec<Vec<i64>> {
        let mut cliques = BTreeSet::new();
        for clique in maximal_cliques(&self.graph) {
            let clique = clique.iter().map(|&v| self.graph[v]).sorted().collect_vec();
            if clique.len() == self.k {
                cliques.insert(clique);
            } else if clique.len() > self.k {
                // Maximal cliques may share k-subsets, the set keeps one of each.
                cliques.extend(self.get_subcliques(&clique));
            }
        }
        cliques.into_iter().collect()
    }

    /// Compares the k-cliques of the graph with those found by SQL.
    pub fn test_find_cliques(&self, sql_cliques: &[Vec<i64>]) -> bool {
        check_lists(&self.find_cliques(), sql_cliques)
    }

    /// Pairs `[v1, v2, d]` with `v1 < v2` whose shortest distance `d` is the
    /// largest one found within k hops.
    pub fn find_diameter_pairs(&self) -> Vec<Vec<i64>> {
        let distances = self
            .graph
            .node_indices()
            .flat_map(|start| {
                dijkstra(&self.graph, start, None, |_| 1usize)
                    .into_iter()
                    .filter(move |&(end, d)| end != start && d <= self.k)
                    .map(move |(end, d)| (start, end, d))
            })
            .collect_vec();

        let diameter = match distances.iter().map(|&(_, _, d)| d).max() {
            Some(diameter) => diameter,
            None => return vec![],
        };
        distances
            .into_iter()
            .filter(|&(start, end, d)| d == diameter && self.graph[start] < self.graph[end])
            .map(|(start, end, d)| vec![self.graph[start], self.graph[end], d as i64])
            .sorted()
            .collect()
    }

    /// Compares the diameter pairs with rows `(v1, v2, d)` found by SQL.
    pub fn test_diameter(&self, sql_rows: &[Vec<i64>]) -> bool {
        let expected = self.find_diameter_pairs();
        expected.len() == sql_rows.len() && expected == sql_rows.iter().cloned().sorted().collect_vec()
    }

    pub fn get_nodes(&self) -> Vec<i64> {
        self.graph.node_weights().copied().collect()
    }

    pub fn get_edges(&self) -> Vec<(i64, i64)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b): (NodeIndex, NodeIndex)| (self.graph[a], self.graph[b]))
            .collect()
    }
}

/// Checks whether two lists hold the same cliques, ignoring the order of the
/// cliques and of the vertices within each clique.
pub fn check_lists<T: Ord + Clone>(list1: &[Vec<T>], list2: &[Vec<T>]) -> bool {
    if list1.len() != list2.len() {
        return false;
    }
    let normalize = |list: &[Vec<T>]| {
        list.iter()
            .map(|clique| clique.iter().cloned().sorted().collect_vec())
            .sorted()
            .collect_vec()
    };
    normalize(list1) == normalize(list2)
}
