//! Various helper functions for testing
//!
//! functions in this module should use results and not use any panics to avoid confusion in callers

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use mavgraph::Coordinate;
use mavgraph::dependency_resolver::*;
use mavgraph::metadata::*;

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
	#[error("mavgraph error: {0}")]
	Library(#[from] mavgraph::Error),
	#[error("unrecognised fixture token `{0}`")]
	Syntax(String),
}

pub type Result<T> = std::result::Result<T, FixtureError>;

pub fn coordinate(s: &str) -> Result<Coordinate> {
	Ok(s.parse()?)
}

/// Parses a one line dependency declaration.
///
/// `g:a:v [scope] [optional] [parent] [exclude=g:a,g:a]`, scope defaults to compile.
/// e.g. `org.x:lib:1.0 runtime optional exclude=org.y:*`
pub fn declared(line: &str) -> Result<DeclaredDependency> {
	let mut tokens = line.split_whitespace();
	let coordinate = tokens.next().ok_or_else(|| FixtureError::Syntax(line.to_string()))?;
	let mut dependency = DeclaredDependency::new(coordinate.parse()?, Default::default());

	for token in tokens {
		if token == "optional" {
			dependency = dependency.optional(true);
		} else if token == "parent" {
			dependency = dependency.from_parent(true);
		} else if let Some(list) = token.strip_prefix("exclude=") {
			for exclusion in list.split(',') {
				dependency = dependency.exclude(exclusion.parse()?);
			}
		} else if let Ok(scope) = token.parse::<mavgraph::Scope>() {
			dependency.scope = scope;
		} else {
			return Err(FixtureError::Syntax(token.to_string()));
		}
	}

	Ok(dependency)
}

/// Builds a catalog from `(coordinate, [declaration lines])` pairs.
///
/// Coordinates only appearing as dependencies are left out, and so report as missing when resolved.
pub fn catalog(entries: &[(&str, &[&str])]) -> Result<Catalog> {
	let mut catalog = Catalog::new();
	for (c, dependencies) in entries {
		let dependencies = dependencies.iter()
			.map(|line| declared(line))
			.collect::<Result<Vec<_>>>()?;
		catalog.insert(coordinate(c)?, dependencies);
	}
	Ok(catalog)
}

/// A phase event with the graph reduced to its size at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPhase {
	pub kind: PhaseKind,
	pub task: Option<(TaskId, Coordinate)>,
	pub node_count: usize,
	pub edge_count: usize,
}

#[derive(Debug, Default)]
pub struct Recording {
	pub phases: Vec<RecordedPhase>,
	pub decisions: Vec<EdgeDecision>,
	pub errors: Vec<MetadataUnavailable>,
	/// Copy of the graph as delivered with the `GraphCompleted` event.
	pub completed_graph: Option<DependencyGraph>,
}

impl Recording {
	pub fn count(&self, kind: PhaseKind) -> usize {
		self.phases.iter().filter(|p| p.kind == kind).count()
	}
}

/// Listener keeping every event it sees. Clones share the same recording.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
	recording: Rc<RefCell<Recording>>,
}

impl EventRecorder {
	pub fn new() -> Self {
		Default::default()
	}

	pub fn recording(&self) -> Ref<'_, Recording> {
		self.recording.borrow()
	}
}

impl GraphListener for EventRecorder {
	fn on_phase(&mut self, event: &GraphPhaseEvent<'_>) -> std::result::Result<(), ListenerError> {
		let mut recording = self.recording.borrow_mut();
		recording.phases.push(RecordedPhase {
			kind: event.kind,
			task: event.task.map(|t| (t.id, t.coordinate.clone())),
			node_count: event.graph.node_count(),
			edge_count: event.graph.edge_count(),
		});
		if event.kind == PhaseKind::GraphCompleted {
			recording.completed_graph = Some(event.graph.clone());
		}
		Ok(())
	}

	fn on_resolution_event(&mut self, decision: &EdgeDecision) -> std::result::Result<(), ListenerError> {
		self.recording.borrow_mut().decisions.push(decision.clone());
		Ok(())
	}

	fn on_error(&mut self, error: &MetadataUnavailable, _graph: &DependencyGraph) -> std::result::Result<(), ListenerError> {
		self.recording.borrow_mut().errors.push(error.clone());
		Ok(())
	}
}

/// How a [`FaultyListener`] misbehaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
	Error,
	Panic,
}

/// Listener that fails on every callback.
#[derive(Debug, Clone, Copy)]
pub struct FaultyListener(pub Fault);

impl FaultyListener {
	fn fail(&self, callback: &str) -> std::result::Result<(), ListenerError> {
		match self.0 {
			Fault::Error => Err(format!("{} refused", callback).into()),
			Fault::Panic => panic!("{} exploded", callback),
		}
	}
}

impl GraphListener for FaultyListener {
	fn on_phase(&mut self, _event: &GraphPhaseEvent<'_>) -> std::result::Result<(), ListenerError> {
		self.fail("on_phase")
	}

	fn on_resolution_event(&mut self, _decision: &EdgeDecision) -> std::result::Result<(), ListenerError> {
		self.fail("on_resolution_event")
	}

	fn on_error(&mut self, _error: &MetadataUnavailable, _graph: &DependencyGraph) -> std::result::Result<(), ListenerError> {
		self.fail("on_error")
	}
}
