//! Notifications for external consumers of a resolution in progress.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Serialize, Deserialize};

use crate::artifact::*;
use crate::metadata::MetadataUnavailable;
use super::dependency_graph::DependencyGraph;
use super::task_queue::ResolutionTask;
use super::conflict_resolver::Classification;

/// Error a listener may return, it is logged and otherwise ignored.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
	/// One task has been fully processed.
	TaskCompleted,
	/// The queue is exhausted, fired exactly once per successful run.
	GraphCompleted,
}

/// Progress notification carrying the graph as it is right now.
#[derive(Debug, Clone, Copy)]
pub struct GraphPhaseEvent<'g> {
	pub kind: PhaseKind,
	/// The finished task, `None` for [`PhaseKind::GraphCompleted`].
	pub task: Option<&'g ResolutionTask>,
	pub graph: &'g DependencyGraph,
}

/// What became of one declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDecision {
	pub from: Coordinate,
	pub to: Coordinate,
	/// Effective scope of the edge, `None` when the dependency doesn't propagate.
	pub scope: Option<Scope>,
	pub classification: Classification,
}

/// Receives events from a resolver, synchronously on the resolving thread.
///
/// Every callback has a no-op default. Errors and panics raised by a listener never stop the resolution.
pub trait GraphListener {
	fn on_phase(&mut self, _event: &GraphPhaseEvent<'_>) -> Result<(), ListenerError> {
		Ok(())
	}

	/// Called once per declared dependency, accepted or not.
	fn on_resolution_event(&mut self, _decision: &EdgeDecision) -> Result<(), ListenerError> {
		Ok(())
	}

	/// Metadata for a non-root node could not be obtained, the node is left without children.
	fn on_error(&mut self, _error: &MetadataUnavailable, _graph: &DependencyGraph) -> Result<(), ListenerError> {
		Ok(())
	}
}

/// Handle returned on registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

/// Registration list owned by one resolver.
#[derive(Default)]
pub(crate) struct Listeners {
	entries: Vec<(ListenerId, Box<dyn GraphListener>)>,
	next_id: usize,
}

impl Listeners {
	pub fn register(&mut self, listener: Box<dyn GraphListener>) -> ListenerId {
		let id = ListenerId(self.next_id);
		self.next_id += 1;
		self.entries.push((id, listener));
		id
	}

	pub fn unregister(&mut self, id: ListenerId) -> Option<Box<dyn GraphListener>> {
		let position = self.entries.iter().position(|(i, _)| *i == id)?;
		Some(self.entries.remove(position).1)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn phase(&mut self, event: &GraphPhaseEvent<'_>) {
		self.dispatch("on_phase", |l| l.on_phase(event));
	}

	pub fn resolution_event(&mut self, decision: &EdgeDecision) {
		self.dispatch("on_resolution_event", |l| l.on_resolution_event(decision));
	}

	pub fn error(&mut self, error: &MetadataUnavailable, graph: &DependencyGraph) {
		self.dispatch("on_error", |l| l.on_error(error, graph));
	}

	fn dispatch(&mut self, callback: &str, mut f: impl FnMut(&mut dyn GraphListener) -> Result<(), ListenerError>) {
		for (id, listener) in self.entries.iter_mut() {
			match catch_unwind(AssertUnwindSafe(|| f(listener.as_mut()))) {
				Ok(Ok(())) => {},
				Ok(Err(e)) => log::warn!("Listener {:?} failed in {}: {}", id, callback, e),
				Err(_) => log::warn!("Listener {:?} panicked in {}, ignoring", id, callback),
			}
		}
	}
}

impl std::fmt::Debug for Listeners {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Listeners")
			.field("registered", &self.entries.iter().map(|(id, _)| *id).collect::<Vec<_>>())
			.finish()
	}
}
