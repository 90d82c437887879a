// src/dag/graph.rs

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use petgraph::algo::toposort;
use petgraph::dot::Dot;
use petgraph::graph::DiGraph;

use crate::errors::{FlowdagError, Result};
use crate::types::EdgeKind;

/// Free-form annotations attached to a node record.
pub type Metadata = BTreeMap<String, String>;

/// A node as stored in the graph: its key, the attached object and metadata.
#[derive(Debug, Clone)]
pub struct NodeRecord<K, N> {
    pub key: K,
    pub node: N,
    pub metadata: Metadata,
}

/// Internal edge structure, endpoints stored as insertion ordinals.
#[derive(Debug, Clone, Copy)]
struct EdgeRecord {
    from: usize,
    to: usize,
    kind: EdgeKind,
}

/// Directed graph with typed edges, keyed by an opaque node identity.
///
/// Nodes and edges keep their insertion order, which is what every query
/// below returns them in. The graph does not know anything about jobs and
/// does not reject cycles; use [`Graph::find_cycle`] if that matters.
#[derive(Debug, Clone)]
pub struct Graph<K, N> {
    records: Vec<NodeRecord<K, N>>,
    index: HashMap<K, usize>,
    edges: Vec<EdgeRecord>,
    /// Per-node edge ordinals, outgoing and incoming.
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl<K, N> Default for Graph<K, N> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
        }
    }
}

impl<K, N> Graph<K, N>
where
    K: Clone + Eq + Hash + fmt::Display,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node with empty adjacency.
    ///
    /// Inserting a key that is already present is a no-op and returns
    /// `false`; the first record wins.
    pub fn add_node(&mut self, key: K, node: N) -> bool {
        self.add_node_with_metadata(key, node, Metadata::new())
    }

    /// Like [`Graph::add_node`], with metadata attached to the record.
    pub fn add_node_with_metadata(&mut self, key: K, node: N, metadata: Metadata) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }

        let ord = self.records.len();
        self.index.insert(key.clone(), ord);
        self.records.push(NodeRecord {
            key,
            node,
            metadata,
        });
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        true
    }

    /// Record a directed edge `from -> to` tagged with `kind`.
    ///
    /// Both endpoints must already be registered.
    pub fn add_edge<Q>(&mut self, from: &Q, to: &Q, kind: EdgeKind) -> Result<()>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Display + ?Sized,
    {
        let from_ord = self.ord_of(from).ok_or_else(|| missing_endpoint(from, to, kind, from))?;
        let to_ord = self.ord_of(to).ok_or_else(|| missing_endpoint(from, to, kind, to))?;

        let edge_ord = self.edges.len();
        self.edges.push(EdgeRecord {
            from: from_ord,
            to: to_ord,
            kind,
        });
        self.outgoing[from_ord].push(edge_ord);
        self.incoming[to_ord].push(edge_ord);
        Ok(())
    }

    /// Add several edges, stopping at the first one with an unknown endpoint.
    pub fn add_edges<'a, I>(&mut self, edges: I) -> Result<()>
    where
        K: 'a,
        I: IntoIterator<Item = (&'a K, &'a K, EdgeKind)>,
    {
        for (from, to, kind) in edges {
            self.add_edge::<K>(from, to, kind)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&NodeRecord<K, N>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ord_of(key).map(|ord| &self.records[ord])
    }

    /// All node records in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord<K, N>> {
        self.records.iter()
    }

    /// All edges as `(from, to, kind)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&K, &K, EdgeKind)> {
        self.edges
            .iter()
            .map(move |e| (&self.records[e.from].key, &self.records[e.to].key, e.kind))
    }

    /// Nodes with no incoming edge of any kind, in insertion order.
    pub fn get_root_nodes(&self) -> Vec<&NodeRecord<K, N>> {
        self.root_ords().map(|ord| &self.records[ord]).collect()
    }

    /// Nodes with no outgoing edge of any kind, in insertion order.
    pub fn get_leaf_nodes(&self) -> Vec<&NodeRecord<K, N>> {
        (0..self.records.len())
            .filter(|&ord| self.outgoing[ord].is_empty())
            .map(|ord| &self.records[ord])
            .collect()
    }

    /// Direct successors of `key` over edges of `kind`, in edge order.
    ///
    /// Unknown keys have no dependencies.
    pub fn get_dependencies<Q>(&self, key: &Q, kind: EdgeKind) -> Vec<&NodeRecord<K, N>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.ord_of(key) {
            Some(ord) => self
                .dependency_ords(ord, kind)
                .map(|to| &self.records[to])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Direct successors of `key` over edges of any kind, in edge order.
    pub fn get_all_dependencies<Q>(&self, key: &Q) -> Vec<&NodeRecord<K, N>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.ord_of(key) {
            Some(ord) => self.outgoing[ord]
                .iter()
                .map(|&e| &self.records[self.edges[e].to])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Direct predecessors of `key` over edges of `kind`, in edge order.
    pub fn get_dependents<Q>(&self, key: &Q, kind: EdgeKind) -> Vec<&NodeRecord<K, N>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.ord_of(key) {
            Some(ord) => self.incoming[ord]
                .iter()
                .map(|&e| self.edges[e])
                .filter(|e| e.kind == kind)
                .map(|e| &self.records[e.from])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Return some node that sits on a cycle, if the edge data has one.
    ///
    /// Self-loops count as cycles.
    pub fn find_cycle(&self) -> Option<K> {
        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(self.len(), self.edges.len());
        let indices: Vec<_> = (0..self.len()).map(|ord| graph.add_node(ord)).collect();
        for e in &self.edges {
            graph.add_edge(indices[e.from], indices[e.to], ());
        }

        match toposort(&graph, None) {
            Ok(_order) => None,
            Err(cycle) => {
                let ord = graph[cycle.node_id()];
                Some(self.records[ord].key.clone())
            }
        }
    }

    /// Render the graph in Graphviz dot format, labelling nodes by key.
    pub fn to_dot(&self) -> String {
        self.to_dot_with(|record| record.key.to_string())
    }

    /// Render the graph in Graphviz dot format with a custom node label.
    ///
    /// Edges are labelled with their kind.
    pub fn to_dot_with<F>(&self, label: F) -> String
    where
        F: Fn(&NodeRecord<K, N>) -> String,
    {
        let mut graph: DiGraph<String, &'static str> =
            DiGraph::with_capacity(self.len(), self.edges.len());
        let indices: Vec<_> = self
            .records
            .iter()
            .map(|record| graph.add_node(label(record)))
            .collect();
        for e in &self.edges {
            graph.add_edge(indices[e.from], indices[e.to], e.kind.as_str());
        }

        format!("{}", Dot::new(&graph))
    }

    pub(crate) fn ord_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).copied()
    }

    pub(crate) fn record(&self, ord: usize) -> &NodeRecord<K, N> {
        &self.records[ord]
    }

    pub(crate) fn root_ords(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.records.len()).filter(move |&ord| self.incoming[ord].is_empty())
    }

    pub(crate) fn dependency_ords(
        &self,
        ord: usize,
        kind: EdgeKind,
    ) -> impl Iterator<Item = usize> + '_ {
        self.outgoing[ord]
            .iter()
            .map(move |&e| self.edges[e])
            .filter(move |e| e.kind == kind)
            .map(|e| e.to)
    }
}

fn missing_endpoint<Q>(from: &Q, to: &Q, kind: EdgeKind, missing: &Q) -> FlowdagError
where
    Q: fmt::Display + ?Sized,
{
    FlowdagError::MissingNode(format!(
        "'{missing}' (edge '{from}' -[{kind}]-> '{to}')"
    ))
}
