//! Decides what happens to each declared dependency of a node.
//!
//! [`ConflictResolver::classify`] only looks at the task, the candidate and what the run has
//! recorded so far. Applying the outcome to the graph is the resolver's job, which then reports
//! accepted versions and exclusions back through [`ConflictResolver::record_winner`] and
//! [`ConflictResolver::record_exclusions`].
//!
//! Outcomes are checked in this order, first match wins:
//! 1. effective scope outside the desired closure, or the depth limit reached: skipped, nothing recorded.
//! 1. candidate is an ancestor (same `groupId:artifactId`): [`Classification::Cyclic`].
//! 1. an exclusion recorded anywhere in the run matches and the root didn't declare it: [`Classification::Excluded`].
//! 1. optional and not declared by the root: [`Classification::Optional`].
//! 1. another version already won and is at least as near: [`Classification::NearerDependency`].
//! 1. another version already won but is further away: [`Classification::NearerEdge`].
//! 1. otherwise [`Classification::Accept`].
//!
//! Versions only compete within a [`ConflictKey`], so type and classifier variants of one
//! artifact are resolved independently.

use std::collections::HashMap;

use serde::{Serialize, Deserialize};

use crate::artifact::*;
use crate::config::ResolverOptions;
use crate::metadata::*;
use super::task_queue::ResolutionTask;
use super::dependency_graph::{DependencyGraph, DisabledType};

/// An exclusion together with the coordinate whose declaration carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedExclusion {
	pub owner: Coordinate,
	pub exclusion: Exclusion,
}

impl ScopedExclusion {
	/// Whether this exclusion removes `coordinate`. The owner's own artifact is never excluded.
	pub fn applies_to(&self, coordinate: &Coordinate) -> bool {
		self.exclusion.matches(&coordinate.key()) && !self.owner.is_same_artifact(coordinate)
	}
}

/// Outcome for one declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
	/// Enable the edge and expand the candidate.
	Accept,
	/// Effective scope isn't wanted, no node or edge is created.
	OutOfScope { declared: Scope, effective: Option<Scope> },
	/// Declaring node sits at the depth limit, no node or edge is created.
	TooDeep { limit: usize },
	Cyclic { ancestor: Coordinate },
	Excluded { owner: Coordinate, exclusion: Exclusion },
	Optional,
	/// Another version is at least as near, this edge loses.
	NearerDependency { winner: Coordinate, winner_depth: usize },
	/// This occurrence is nearer than the current winner, which loses its edges.
	NearerEdge { loser: Coordinate, loser_depth: usize },
}

impl Classification {
	/// Whether the candidate gets a node and an edge at all.
	pub fn is_recorded(&self) -> bool {
		!matches!(self, Classification::OutOfScope { .. } | Classification::TooDeep { .. })
	}

	/// Whether the edge ends up enabled and the candidate expanded.
	pub fn is_accepted(&self) -> bool {
		matches!(self, Classification::Accept | Classification::NearerEdge { .. })
	}

	/// The kind of disablement for the candidate's edge, `None` if it stays enabled or isn't recorded.
	pub fn disabled_type(&self) -> Option<DisabledType> {
		match self {
			Classification::Cyclic { .. } => Some(DisabledType::Cyclic),
			Classification::Excluded { .. } => Some(DisabledType::Excluded),
			Classification::Optional => Some(DisabledType::Optional),
			Classification::NearerDependency { .. } => Some(DisabledType::NearerDependency),
			Classification::Accept
			| Classification::NearerEdge { .. }
			| Classification::OutOfScope { .. }
			| Classification::TooDeep { .. } => None,
		}
	}

	/// Explanation stored on the candidate's disabled edge.
	pub fn reason(&self, declared_by: &Coordinate) -> String {
		match self {
			Classification::Accept => "accepted".to_string(),
			Classification::OutOfScope { declared, effective: Some(effective) } => format!("declared {} becomes {} which is not wanted", declared, effective),
			Classification::OutOfScope { declared, effective: None } => format!("{} dependencies are not transitive", declared),
			Classification::TooDeep { limit } => format!("depth limit {} reached", limit),
			Classification::Cyclic { ancestor } => format!("cycle back to ancestor {}", ancestor),
			Classification::Excluded { owner, exclusion } => format!("excluded by {} (exclusion {})", owner, exclusion),
			Classification::Optional => format!("optional dependency of {}", declared_by),
			Classification::NearerDependency { winner, winner_depth } => format!("{} is nearer (declared at depth {})", winner, winner_depth),
			Classification::NearerEdge { loser, loser_depth } => format!("replaces {} (declared at depth {})", loser, loser_depth),
		}
	}
}

#[derive(Debug, Clone)]
struct Winner {
	coordinate: Coordinate,
	/// Depth of the node that declared the winning dependency.
	depth: usize,
}

/// Nearest-wins and exclusion bookkeeping for one run.
#[derive(Debug, Default)]
pub struct ConflictResolver {
	winners: HashMap<ConflictKey, Winner>,
	exclusions: Vec<ScopedExclusion>,
}

impl ConflictResolver {
	pub fn new() -> Self {
		Default::default()
	}

	/// Classifies `candidate` as declared by `task`.
	///
	/// `candidate` is expected to already carry any managed version.
	pub fn classify(&self, task: &ResolutionTask, candidate: &DeclaredDependency, options: &ResolverOptions) -> Classification {
		let coordinate = &candidate.coordinate;

		let effective = Scope::effective(task.scope, candidate.scope);
		match effective {
			Some(scope) if options.desired_scope().accepts(scope) => {},
			_ => return Classification::OutOfScope { declared: candidate.scope, effective },
		}

		if let Some(limit) = options.max_depth() {
			if task.depth >= limit {
				return Classification::TooDeep { limit };
			}
		}

		if let Some(ancestor) = task.lineage().find(|a| a.is_same_artifact(coordinate)) {
			return Classification::Cyclic { ancestor: ancestor.clone() };
		}

		/* What the root declares itself is never excluded */
		if !task.is_root() {
			if let Some(scoped) = self.excluded_by(coordinate) {
				return Classification::Excluded { owner: scoped.owner.clone(), exclusion: scoped.exclusion.clone() };
			}
		}

		if candidate.optional && !task.is_root() && !options.include_optional() {
			return Classification::Optional;
		}

		match self.winners.get(&coordinate.conflict_key()) {
			Some(winner) if winner.coordinate.version != coordinate.version => {
				if task.depth < winner.depth {
					Classification::NearerEdge { loser: winner.coordinate.clone(), loser_depth: winner.depth }
				} else {
					Classification::NearerDependency { winner: winner.coordinate.clone(), winner_depth: winner.depth }
				}
			},
			_ => Classification::Accept,
		}
	}

	/// Records `coordinate` as the version in use, declared at `depth`.
	///
	/// Re-recording the current winner from a nearer node only lowers its depth.
	pub fn record_winner(&mut self, coordinate: &Coordinate, depth: usize) {
		match self.winners.get_mut(&coordinate.conflict_key()) {
			Some(winner) if winner.coordinate == *coordinate => {
				winner.depth = winner.depth.min(depth);
			},
			Some(winner) => {
				log::debug!("{} replaces {} as the selected version", coordinate, winner.coordinate);
				*winner = Winner { coordinate: coordinate.clone(), depth };
			},
			None => {
				self.winners.insert(coordinate.conflict_key(), Winner { coordinate: coordinate.clone(), depth });
			},
		}
	}

	/// Releases every winner the root can no longer reach over enabled edges.
	///
	/// Returns the released coordinates.
	pub fn retain_reachable(&mut self, graph: &DependencyGraph) -> Vec<Coordinate> {
		let reachable = graph.effective_coordinates();
		let mut released = Vec::new();
		self.winners.retain(|_, winner| {
			let keep = reachable.contains(&winner.coordinate);
			if !keep {
				released.push(winner.coordinate.clone());
			}
			keep
		});
		released.sort();
		released
	}

	/// The version currently winning the conflict `coordinate` takes part in.
	pub fn winner(&self, coordinate: &Coordinate) -> Option<(&Coordinate, usize)> {
		self.winners.get(&coordinate.conflict_key()).map(|w| (&w.coordinate, w.depth))
	}

	/// Makes the exclusions declared on `owner` hold for the rest of the run.
	///
	/// Returns the ones not already recorded for `owner`.
	pub fn record_exclusions(&mut self, owner: &Coordinate, exclusions: &[Exclusion]) -> Vec<ScopedExclusion> {
		let mut added = Vec::new();
		for exclusion in exclusions {
			let scoped = ScopedExclusion { owner: owner.clone(), exclusion: exclusion.clone() };
			if !self.exclusions.contains(&scoped) {
				log::debug!("{} excludes {} from the whole graph", owner, exclusion);
				self.exclusions.push(scoped.clone());
				added.push(scoped);
			}
		}
		added
	}

	/// First recorded exclusion removing `coordinate`.
	pub fn excluded_by(&self, coordinate: &Coordinate) -> Option<&ScopedExclusion> {
		self.exclusions.iter().find(|e| e.applies_to(coordinate))
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use super::super::task_queue::TaskQueue;

	fn c(s: &str) -> Coordinate {
		s.parse().unwrap()
	}

	fn dep(s: &str) -> DeclaredDependency {
		DeclaredDependency::new(c(s), Scope::Compile)
	}

	/// root -> b, returns (root task, b task).
	fn two_levels() -> (ResolutionTask, ResolutionTask) {
		let mut queue = TaskQueue::new();
		queue.seed(c("g:root:1"));
		let root = queue.pop().unwrap();
		let b = queue.child_of(&root, &c("g:b:1"), Scope::Compile).unwrap();
		(root, b)
	}

	#[test]
	fn plain_candidate_is_accepted() {
		let (root, _) = two_levels();
		assert_eq!(ConflictResolver::new().classify(&root, &dep("g:b:1"), &Default::default()), Classification::Accept);
	}

	#[test]
	fn ancestor_version_is_cyclic() {
		let (_, b) = two_levels();
		let outcome = ConflictResolver::new().classify(&b, &dep("g:root:1"), &Default::default());
		assert_eq!(outcome, Classification::Cyclic { ancestor: c("g:root:1") });
	}

	#[test]
	fn ancestor_identity_in_other_version_is_cyclic() {
		let (_, b) = two_levels();
		let outcome = ConflictResolver::new().classify(&b, &dep("g:root:2"), &Default::default());
		assert!(matches!(outcome, Classification::Cyclic { .. }));
	}

	#[test]
	fn self_dependency_is_cyclic() {
		let (_, b) = two_levels();
		assert!(matches!(ConflictResolver::new().classify(&b, &dep("g:b:1"), &Default::default()), Classification::Cyclic { .. }));
	}

	#[test]
	fn exclusion_names_owner() {
		let (_, b) = two_levels();
		let mut resolver = ConflictResolver::new();
		resolver.record_exclusions(&c("g:b:1"), &[Exclusion::new("g", "x")]);
		let outcome = resolver.classify(&b, &dep("g:x:1"), &Default::default());
		assert_eq!(outcome, Classification::Excluded { owner: c("g:b:1"), exclusion: Exclusion::new("g", "x") });
	}

	#[test]
	fn exclusion_holds_outside_the_owners_subtree() {
		let (_, b) = two_levels();
		let mut resolver = ConflictResolver::new();
		resolver.record_exclusions(&c("g:elsewhere:1"), &[Exclusion::new("g", "x")]);
		assert!(matches!(resolver.classify(&b, &dep("g:x:1"), &Default::default()), Classification::Excluded { .. }));
	}

	#[test]
	fn root_declarations_are_never_excluded() {
		let (root, _) = two_levels();
		let mut resolver = ConflictResolver::new();
		resolver.record_exclusions(&c("g:b:1"), &[Exclusion::new("g", "x")]);
		assert_eq!(resolver.classify(&root, &dep("g:x:1"), &Default::default()), Classification::Accept);
	}

	#[test]
	fn wildcard_spares_the_owners_own_artifact() {
		let mut queue = TaskQueue::new();
		queue.seed(c("g:root:1"));
		let root = queue.pop().unwrap();
		let d = queue.child_of(&root, &c("g:d:1"), Scope::Compile).unwrap();

		let mut resolver = ConflictResolver::new();
		resolver.record_exclusions(&c("g:b:1"), &[Exclusion::new("*", "*")]);
		assert_eq!(resolver.classify(&d, &dep("g:b:1"), &Default::default()), Classification::Accept);
		assert!(matches!(resolver.classify(&d, &dep("g:e:1"), &Default::default()), Classification::Excluded { .. }));
	}

	#[test]
	fn exclusions_are_recorded_once_per_owner() {
		let mut resolver = ConflictResolver::new();
		assert_eq!(resolver.record_exclusions(&c("g:b:1"), &[Exclusion::new("g", "x")]).len(), 1);
		assert!(resolver.record_exclusions(&c("g:b:1"), &[Exclusion::new("g", "x")]).is_empty());
		assert_eq!(resolver.record_exclusions(&c("g:d:1"), &[Exclusion::new("g", "x")]).len(), 1);
	}

	#[test]
	fn optional_of_root_is_accepted() {
		let (root, _) = two_levels();
		assert_eq!(ConflictResolver::new().classify(&root, &dep("g:o:1").optional(true), &Default::default()), Classification::Accept);
	}

	#[test]
	fn optional_of_transitive_is_disabled() {
		let (_, b) = two_levels();
		assert_eq!(ConflictResolver::new().classify(&b, &dep("g:o:1").optional(true), &Default::default()), Classification::Optional);
	}

	#[test]
	fn optional_can_be_included() {
		let (_, b) = two_levels();
		let mut options = ResolverOptions::default();
		options.set_include_optional(true);
		assert_eq!(ConflictResolver::new().classify(&b, &dep("g:o:1").optional(true), &options), Classification::Accept);
	}

	#[test]
	fn exclusion_takes_precedence_over_conflict() {
		let (_, b) = two_levels();
		let mut resolver = ConflictResolver::new();
		resolver.record_exclusions(&c("g:b:1"), &[Exclusion::new("g", "x")]);
		resolver.record_winner(&c("g:x:2"), 5);
		assert!(matches!(resolver.classify(&b, &dep("g:x:1"), &Default::default()), Classification::Excluded { .. }));
	}

	#[test]
	fn tie_keeps_first_winner() {
		let (_, b) = two_levels();
		let mut resolver = ConflictResolver::new();
		resolver.record_winner(&c("g:x:1"), 1);
		let outcome = resolver.classify(&b, &dep("g:x:2"), &Default::default());
		assert_eq!(outcome, Classification::NearerDependency { winner: c("g:x:1"), winner_depth: 1 });
	}

	#[test]
	fn nearer_occurrence_replaces_winner() {
		let (_, b) = two_levels();
		let mut resolver = ConflictResolver::new();
		resolver.record_winner(&c("g:x:1"), 3);
		let outcome = resolver.classify(&b, &dep("g:x:2"), &Default::default());
		assert_eq!(outcome, Classification::NearerEdge { loser: c("g:x:1"), loser_depth: 3 });
	}

	#[test]
	fn same_version_is_not_a_conflict() {
		let (_, b) = two_levels();
		let mut resolver = ConflictResolver::new();
		resolver.record_winner(&c("g:x:1"), 0);
		assert_eq!(resolver.classify(&b, &dep("g:x:1"), &Default::default()), Classification::Accept);
	}

	#[test]
	fn classifier_variants_do_not_compete() {
		let (_, b) = two_levels();
		let mut resolver = ConflictResolver::new();
		resolver.record_winner(&c("g:x:1"), 0);
		assert_eq!(resolver.classify(&b, &dep("g:x:test-jar:tests:1"), &Default::default()), Classification::Accept);
		assert_eq!(resolver.classify(&b, &dep("g:x:test-jar:tests:2"), &Default::default()), Classification::Accept);

		resolver.record_winner(&c("g:x:test-jar:tests:2"), 0);
		assert_eq!(resolver.winner(&c("g:x:1")), Some((&c("g:x:1"), 0)));
		assert!(matches!(resolver.classify(&b, &dep("g:x:test-jar:tests:3"), &Default::default()), Classification::NearerDependency { .. }));
	}

	#[test]
	fn record_winner_keeps_nearest_depth() {
		let mut resolver = ConflictResolver::new();
		resolver.record_winner(&c("g:x:1"), 3);
		resolver.record_winner(&c("g:x:1"), 1);
		resolver.record_winner(&c("g:x:1"), 2);
		assert_eq!(resolver.winner(&c("g:x:7")), Some((&c("g:x:1"), 1)));
	}

	#[test]
	fn unreachable_winners_are_released() {
		let mut graph = DependencyGraph::new(c("g:root:1"));
		let root = graph.add_or_get_node(&c("g:root:1"));
		let b = graph.add_or_get_node(&c("g:b:1"));
		let y = graph.add_or_get_node(&c("g:y:1"));
		let into_b = graph.add_or_update_edge(root, b, Scope::Compile, None);
		graph.add_or_update_edge(b, y, Scope::Compile, None);

		let mut resolver = ConflictResolver::new();
		resolver.record_winner(&c("g:b:1"), 0);
		resolver.record_winner(&c("g:y:1"), 1);
		assert!(resolver.retain_reachable(&graph).is_empty());

		graph.disable(into_b, DisabledType::NearerEdge, "replaced");
		assert_eq!(resolver.retain_reachable(&graph), vec![c("g:b:1"), c("g:y:1")]);
		assert_eq!(resolver.winner(&c("g:y:2")), None);
	}

	#[test]
	fn transitive_test_scope_is_out_of_scope() {
		let (_, b) = two_levels();
		let candidate = DeclaredDependency::new(c("g:t:1"), Scope::Test);
		assert!(matches!(ConflictResolver::new().classify(&b, &candidate, &Default::default()), Classification::OutOfScope { effective: None, .. }));
	}

	#[test]
	fn depth_limit_stops_expansion() {
		let (_, b) = two_levels();
		let mut options = ResolverOptions::default();
		options.set_max_depth(Some(1));
		assert_eq!(ConflictResolver::new().classify(&b, &dep("g:x:1"), &options), Classification::TooDeep { limit: 1 });
	}
}
