use super::*;
use super::listener::Listeners;

/// Lifecycle of a [`GraphResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionState {
	/// Nothing has run yet.
	Init,
	/// The task queue is being worked through.
	Expanding,
	/// The last run produced a graph.
	Completed,
	/// The last run failed because the root itself couldn't be resolved.
	Aborted,
}

/// Drives resolution of one root coordinate.
///
/// Each call to [`GraphResolver::resolve`] owns a fresh graph, queue and conflict state,
/// nothing is shared between runs or between resolvers. Several roots can be resolved
/// concurrently with one resolver per thread as long as the provider can be shared.
///
/// # Errors
/// Only a root whose metadata is unavailable aborts a run, everything else degrades
/// into childless nodes or disabled edges.
pub struct GraphResolver<'p> {
	provider: &'p dyn MetadataProvider,
	root: Coordinate,
	options: ResolverOptions,
	listeners: Listeners,
	state: ResolutionState,
}

impl std::fmt::Debug for GraphResolver<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GraphResolver")
			.field("root", &self.root)
			.field("options", &self.options)
			.field("listeners", &self.listeners)
			.field("state", &self.state)
			.finish_non_exhaustive()
	}
}

impl<'p> GraphResolver<'p> {
	pub(super) fn new(provider: &'p dyn MetadataProvider, root: Coordinate, options: ResolverOptions) -> Self {
		GraphResolver {
			provider,
			root,
			options,
			listeners: Default::default(),
			state: ResolutionState::Init,
		}
	}

	pub fn root(&self) -> &Coordinate {
		&self.root
	}

	pub fn options(&self) -> &ResolverOptions {
		&self.options
	}

	pub fn state(&self) -> ResolutionState {
		self.state
	}

	/// Adds a listener for all following runs.
	pub fn register_listener(&mut self, listener: impl GraphListener + 'static) -> ListenerId {
		self.register_boxed_listener(Box::new(listener))
	}

	pub(super) fn register_boxed_listener(&mut self, listener: Box<dyn GraphListener>) -> ListenerId {
		self.listeners.register(listener)
	}

	/// Removes a listener, handing it back. `None` if it was already removed.
	pub fn unregister_listener(&mut self, id: ListenerId) -> Option<Box<dyn GraphListener>> {
		self.listeners.unregister(id)
	}

	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	/// Runs the task queue to exhaustion and returns the finished graph.
	///
	/// Listeners see a [`PhaseKind::TaskCompleted`] event after every task and a single
	/// [`PhaseKind::GraphCompleted`] event at the end of a successful run.
	///
	/// # Errors
	/// [`Error::MetadataUnavailable`] when the root's own dependencies can't be obtained.
	/// No partial graph is returned in that case.
	pub fn resolve(&mut self) -> Result<DependencyGraph> {
		log::info!("Resolving dependency graph of {} for {} scope", self.root, self.options.desired_scope());
		self.state = ResolutionState::Init;

		let mut graph = DependencyGraph::new(self.root.clone());
		let mut queue = TaskQueue::new();
		let mut conflicts = ConflictResolver::new();
		let mut processed = 0usize;

		queue.seed(self.root.clone());
		self.state = ResolutionState::Expanding;

		while let Some(task) = queue.pop() {
			let children = match self.provider.resolve_direct_dependencies(&task.coordinate, self.options.desired_scope()) {
				Ok(declared) => self.expand(&mut graph, &mut conflicts, &mut queue, &task, declared),
				Err(e) if task.is_root() => {
					log::error!("Unable to resolve root {}: {}", task.coordinate, e);
					self.state = ResolutionState::Aborted;
					return Err(Error::MetadataUnavailable(e));
				},
				Err(e) => {
					log::warn!("Leaving {} without dependencies: {}", task.coordinate, e);
					self.listeners.error(&e, &graph);
					Vec::new()
				},
			};

			queue.push_children(children);
			processed += 1;
			self.listeners.phase(&GraphPhaseEvent { kind: PhaseKind::TaskCompleted, task: Some(&task), graph: &graph });
		}

		self.listeners.phase(&GraphPhaseEvent { kind: PhaseKind::GraphCompleted, task: None, graph: &graph });
		self.state = ResolutionState::Completed;
		log::info!("Resolved {} in {} tasks, {} nodes and {} edges", self.root, processed, graph.node_count(), graph.edge_count());

		Ok(graph)
	}

	/// Applies the declared dependencies of `task` to the graph, returning the tasks for accepted candidates.
	fn expand(&mut self, graph: &mut DependencyGraph, conflicts: &mut ConflictResolver, queue: &mut TaskQueue, task: &ResolutionTask, declared: Vec<DeclaredDependency>) -> Vec<ResolutionTask> {
		log::debug!("{} declares {} dependencies", task.coordinate, declared.len());

		let from = graph.add_or_get_node(&task.coordinate);
		let mut children = Vec::new();
		let mut pruned = false;

		for mut candidate in declared {
			/* Dependency management never applies to what the root declares itself */
			if !task.is_root() {
				if let Some(version) = self.options.managed_version(&candidate.coordinate.key()) {
					if version != candidate.coordinate.version {
						log::debug!("Managed version {} replaces {} declared by {}", version, candidate.coordinate, task.coordinate);
						candidate.coordinate = candidate.coordinate.with_version(version);
					}
				}
			}

			let classification = conflicts.classify(task, &candidate, &self.options);
			let scope = Scope::effective(task.scope, candidate.scope);
			log::trace!("{} -> {}: {:?}", task.coordinate, candidate.coordinate, classification);

			match scope {
				Some(scope) if classification.is_recorded() => {
					let to = graph.add_or_get_node(&candidate.coordinate);
					if candidate.from_parent {
						graph.node_mut(to).from_parent = true;
					}

					let mut unlinked = false;
					if let Classification::NearerEdge { loser, .. } = &classification {
						unlinked = displace(graph, loser, &candidate.coordinate, task);
					}

					let disabled = classification.disabled_type().map(|kind| EdgeDisablement {
						kind,
						reason: classification.reason(&task.coordinate),
					});
					graph.add_or_update_edge(from, to, scope, disabled);

					if classification.is_accepted() {
						conflicts.record_winner(&candidate.coordinate, task.depth);
						let added = conflicts.record_exclusions(&candidate.coordinate, &candidate.exclusions);
						unlinked |= exclude_existing(graph, task, &added);
						if let Some(child) = queue.child_of(task, &candidate.coordinate, scope) {
							children.push(child);
						}
					} else if conflicts.winner(&candidate.coordinate).map_or(false, |(winner, _)| *winner == candidate.coordinate) {
						/* A repeated declaration may have just disabled the only edge to the winner */
						unlinked |= graph.enabled_edges_into_index(to).is_empty();
					}

					if unlinked {
						prune(graph, conflicts, queue);
						pruned = true;
					}
				},
				_ => log::debug!("Skipping {} declared by {}: {}", candidate.coordinate, task.coordinate, classification.reason(&task.coordinate)),
			}

			self.listeners.resolution_event(&EdgeDecision {
				from: task.coordinate.clone(),
				to: candidate.coordinate,
				scope,
				classification,
			});
		}

		if pruned {
			/* A withdrawn child accepted again in the same pass has two tasks */
			let reachable = graph.effective_coordinates();
			let mut seen = std::collections::HashSet::new();
			children.retain(|child| reachable.contains(&child.coordinate) && seen.insert(child.coordinate.clone()));
		}
		children
	}
}

/// Disables every enabled edge into `loser` and flags it as conflicted.
///
/// Only the edges into the losing node flip, its own dependencies are left as they are.
/// Returns whether any edge was disabled.
fn displace(graph: &mut DependencyGraph, loser: &Coordinate, winner: &Coordinate, task: &ResolutionTask) -> bool {
	let Some(loser_index) = graph.index_of(loser) else {
		return false;
	};

	let reason = format!("{} declared by {} at depth {} is nearer", winner, task.coordinate, task.depth);
	let edges = graph.enabled_edges_into_index(loser_index);
	for e in &edges {
		graph.disable(*e, DisabledType::NearerEdge, reason.clone());
	}
	graph.node_mut(loser_index).conflicted = true;
	log::debug!("{} displaced by nearer {}", loser, winner);
	!edges.is_empty()
}

/// Disables enabled edges into anything `exclusions` remove, wherever it was declared.
///
/// Edges leaving the root and edges into the lineage of the declaring `task` stay as they are.
/// Returns whether any edge was disabled.
fn exclude_existing(graph: &mut DependencyGraph, task: &ResolutionTask, exclusions: &[ScopedExclusion]) -> bool {
	let root = graph.root().coordinate.clone();
	let mut changed = false;

	for scoped in exclusions {
		let hits = graph.enabled_edges_where(|edge| {
			edge.from != root
				&& scoped.applies_to(&edge.to)
				&& !task.lineage().any(|ancestor| ancestor.is_same_artifact(&edge.to))
		});
		let classification = Classification::Excluded { owner: scoped.owner.clone(), exclusion: scoped.exclusion.clone() };
		for e in hits {
			log::debug!("Disabling an edge declared before {} excluded {}", scoped.owner, scoped.exclusion);
			graph.disable(e, DisabledType::Excluded, classification.reason(&scoped.owner));
			changed = true;
		}
	}

	changed
}

/// Releases winners the root no longer reaches and forgets their pending expansion.
fn prune(graph: &DependencyGraph, conflicts: &mut ConflictResolver, queue: &mut TaskQueue) {
	for released in conflicts.retain_reachable(graph) {
		log::debug!("{} is no longer reachable, releasing it", released);
		queue.withdraw(&released);
	}
}
