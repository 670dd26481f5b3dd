//! Module for only DependencyGraph storage and queries, not related to the resolving process.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::prelude::*;
use serde::{Serialize, Deserialize};

use crate::artifact::*;

/// The result of a resolution: every coordinate encountered and every dependency edge considered.
///
/// Disabled edges are kept so consumers can explain why something was left out.
/// The only way to mutate a graph is through the resolver, consumers get it read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredGraph")]
pub struct DependencyGraph {
	graph: StableDiGraph<DependencyGraphNode, DependencyGraphEdge>,
	root: NodeIndex,
	#[serde(skip)]
	index: HashMap<Coordinate, NodeIndex>,
}

#[derive(Deserialize)]
struct StoredGraph {
	graph: StableDiGraph<DependencyGraphNode, DependencyGraphEdge>,
	root: NodeIndex,
}

impl From<StoredGraph> for DependencyGraph {
	fn from(stored: StoredGraph) -> Self {
		let index = stored.graph.node_indices()
			.map(|i| (stored.graph[i].coordinate.clone(), i))
			.collect();
		Self { graph: stored.graph, root: stored.root, index }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraphNode {
	pub coordinate: Coordinate,
	/// Reached via parent descriptor inheritance rather than a direct declaration.
	pub from_parent: bool,
	/// Another version of the same artifact won a conflict against this one.
	pub conflicted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraphEdge {
	pub from: Coordinate,
	pub to: Coordinate,
	/// Effective scope of the dependency along this edge.
	pub scope: Scope,
	/// `None` while the edge is part of the effective graph.
	pub disabled: Option<EdgeDisablement>,
}

impl DependencyGraphEdge {
	pub fn is_enabled(&self) -> bool {
		self.disabled.is_none()
	}

	pub fn disabled_type(&self) -> Option<DisabledType> {
		self.disabled.as_ref().map(|d| d.kind)
	}

	pub fn disabled_reason(&self) -> Option<&str> {
		self.disabled.as_ref().map(|d| d.reason.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDisablement {
	pub kind: DisabledType,
	/// Human readable explanation.
	pub reason: String,
}

/// Why an edge is excluded from the effective graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisabledType {
	/// Points back at an ancestor.
	Cyclic,
	/// Optional dependency of a non-root artifact.
	Optional,
	/// Lost a version conflict to an occurrence at the same depth or nearer.
	NearerDependency,
	/// Was the winner of a version conflict until a nearer occurrence turned up.
	NearerEdge,
	/// Removed by an exclusion on an ancestor's declaration.
	Excluded,
}

impl std::fmt::Display for DisabledType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			DisabledType::Cyclic => "cyclic",
			DisabledType::Optional => "optional",
			DisabledType::NearerDependency => "nearer dependency",
			DisabledType::NearerEdge => "nearer edge",
			DisabledType::Excluded => "excluded",
		};
		f.write_str(s)
	}
}

/// An artifact that is part of the effective graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
	pub coordinate: Coordinate,
	/// `None` only for the root.
	pub scope: Option<Scope>,
	/// Number of enabled edges on the shortest path from the root.
	pub depth: usize,
}

impl DependencyGraph {
	/// Creates a graph containing only `root`.
	pub fn new(root: Coordinate) -> Self {
		let mut graph = StableDiGraph::<DependencyGraphNode, DependencyGraphEdge>::default();
		let root_index = graph.add_node(DependencyGraphNode { coordinate: root.clone(), from_parent: false, conflicted: false });
		let mut index = HashMap::new();
		index.insert(root, root_index);
		Self { graph, root: root_index, index }
	}

	/* Mutation, only reachable from the resolver */

	/// Returns the index of the existing node for `coordinate` or creates it.
	pub(crate) fn add_or_get_node(&mut self, coordinate: &Coordinate) -> NodeIndex {
		if let Some(i) = self.index.get(coordinate) {
			return *i;
		}
		let i = self.graph.add_node(DependencyGraphNode { coordinate: coordinate.clone(), from_parent: false, conflicted: false });
		self.index.insert(coordinate.clone(), i);
		log::trace!("Added node {}", coordinate);
		i
	}

	pub(crate) fn node_mut(&mut self, i: NodeIndex) -> &mut DependencyGraphNode {
		&mut self.graph[i]
	}

	pub(crate) fn index_of(&self, coordinate: &Coordinate) -> Option<NodeIndex> {
		self.index.get(coordinate).copied()
	}

	/// Creates the edge `from -> to` or overwrites the state of the existing one.
	///
	/// There is never more than one edge for an ordered pair.
	pub(crate) fn add_or_update_edge(&mut self, from: NodeIndex, to: NodeIndex, scope: Scope, disabled: Option<EdgeDisablement>) -> EdgeIndex {
		if let Some(e) = self.graph.find_edge(from, to) {
			let edge = &mut self.graph[e];
			edge.scope = scope;
			edge.disabled = disabled;
			return e;
		}
		let edge = DependencyGraphEdge {
			from: self.graph[from].coordinate.clone(),
			to: self.graph[to].coordinate.clone(),
			scope,
			disabled,
		};
		self.graph.add_edge(from, to, edge)
	}

	/// Marks an edge as disabled in place, it stays in the graph.
	pub(crate) fn disable(&mut self, e: EdgeIndex, kind: DisabledType, reason: impl Into<String>) {
		self.graph[e].disabled = Some(EdgeDisablement { kind, reason: reason.into() });
	}

	pub(crate) fn enabled_edges_into_index(&self, i: NodeIndex) -> Vec<EdgeIndex> {
		self.graph.edges_directed(i, Incoming)
			.filter(|e| e.weight().is_enabled())
			.map(|e| e.id())
			.collect()
	}

	/// Enabled edges accepted by `filter`, oldest first.
	pub(crate) fn enabled_edges_where(&self, filter: impl Fn(&DependencyGraphEdge) -> bool) -> Vec<EdgeIndex> {
		let mut found: Vec<EdgeIndex> = self.graph.edge_indices()
			.filter(|e| self.graph[*e].is_enabled() && filter(&self.graph[*e]))
			.collect();
		found.sort();
		found
	}

	/* Queries */

	pub fn root(&self) -> &DependencyGraphNode {
		&self.graph[self.root]
	}

	pub fn node_count(&self) -> usize {
		self.graph.node_count()
	}

	pub fn edge_count(&self) -> usize {
		self.graph.edge_count()
	}

	/// All nodes in the order they were first encountered.
	pub fn nodes(&self) -> impl Iterator<Item = &DependencyGraphNode> + '_ {
		self.graph.node_indices().map(move |i| &self.graph[i])
	}

	/// All edges, enabled or not, in the order they were created.
	pub fn edges(&self) -> impl Iterator<Item = &DependencyGraphEdge> + '_ {
		self.graph.edge_indices().map(move |e| &self.graph[e])
	}

	pub fn node(&self, coordinate: &Coordinate) -> crate::Result<&DependencyGraphNode> {
		self.index.get(coordinate)
			.map(|i| &self.graph[*i])
			.ok_or_else(|| crate::Error::NotFound(coordinate.clone()))
	}

	pub fn contains(&self, coordinate: &Coordinate) -> bool {
		self.index.contains_key(coordinate)
	}

	/// The edge `from -> to` if one was ever created.
	pub fn edge(&self, from: &Coordinate, to: &Coordinate) -> Option<&DependencyGraphEdge> {
		let a = self.index.get(from)?;
		let b = self.index.get(to)?;
		self.graph.find_edge(*a, *b).map(|e| &self.graph[e])
	}

	/// Every edge targeting `coordinate`, an empty result means the node is an orphan (or the root).
	pub fn edges_into(&self, coordinate: &Coordinate) -> crate::Result<Vec<&DependencyGraphEdge>> {
		let i = self.index.get(coordinate).ok_or_else(|| crate::Error::NotFound(coordinate.clone()))?;
		Ok(self.sorted_edges(self.graph.edges_directed(*i, Incoming).map(|e| e.id())))
	}

	/// Every edge leaving `coordinate`, in declaration order.
	pub fn edges_from(&self, coordinate: &Coordinate) -> crate::Result<Vec<&DependencyGraphEdge>> {
		let i = self.index.get(coordinate).ok_or_else(|| crate::Error::NotFound(coordinate.clone()))?;
		Ok(self.sorted_edges(self.graph.edges_directed(*i, Outgoing).map(|e| e.id())))
	}

	/* petgraph walks adjacency lists newest first */
	fn sorted_edges(&self, ids: impl Iterator<Item = EdgeIndex>) -> Vec<&DependencyGraphEdge> {
		let mut ids: Vec<EdgeIndex> = ids.collect();
		ids.sort();
		ids.into_iter().map(|e| &self.graph[e]).collect()
	}

	/// Nodes other than the root that nothing points at.
	pub fn orphans(&self) -> Vec<&DependencyGraphNode> {
		self.graph.node_indices()
			.filter(|i| *i != self.root)
			.filter(|i| self.graph.edges_directed(*i, Incoming).next().is_none())
			.map(|i| &self.graph[i])
			.collect()
	}

	/// Artifacts reachable from the root over enabled edges only, breadth first.
	///
	/// This is the effective dependency closure, the root comes first.
	pub fn resolved_artifacts(&self) -> Vec<ResolvedArtifact> {
		let mut resolved = Vec::new();
		let mut visited = HashSet::<NodeIndex>::new();
		let mut queue = VecDeque::<(NodeIndex, Option<Scope>, usize)>::new();

		queue.push_back((self.root, None, 0));
		while let Some((i, scope, depth)) = queue.pop_front() {
			if !visited.insert(i) { continue; }
			resolved.push(ResolvedArtifact { coordinate: self.graph[i].coordinate.clone(), scope, depth });

			let mut outgoing: Vec<_> = self.graph.edges_directed(i, Outgoing)
				.filter(|e| e.weight().is_enabled())
				.map(|e| (e.id(), e.target(), e.weight().scope))
				.collect();
			outgoing.sort_by_key(|(e, _, _)| *e);
			for (_, target, scope) in outgoing {
				queue.push_back((target, Some(scope), depth + 1));
			}
		}

		resolved
	}

	/// Coordinates reachable from the root over enabled edges, root included.
	pub fn effective_coordinates(&self) -> HashSet<&Coordinate> {
		let reachable = self.reachable_indices();
		reachable.into_iter().map(|i| &self.graph[i].coordinate).collect()
	}

	fn reachable_indices(&self) -> HashSet<NodeIndex> {
		let mut reachable = HashSet::new();
		let mut stack = vec![self.root];
		while let Some(i) = stack.pop() {
			if !reachable.insert(i) { continue; }
			stack.extend(
				self.graph.edges_directed(i, Outgoing)
					.filter(|e| e.weight().is_enabled())
					.map(|e| e.target())
			);
		}
		reachable
	}

	/// Whether the sub-graph of enabled edges contains a cycle.
	pub fn has_enabled_cycle(&self) -> bool {
		let enabled = self.graph.filter_map(
			|_, _| Some(()),
			|_, edge| if edge.is_enabled() { Some(()) } else { None },
		);
		petgraph::algo::is_cyclic_directed(&enabled)
	}
}
