//! Builds the transitive dependency graph of a single root artifact.
//!
//! # Usage
//! 1. Create a [`ResolverBuilder`]
//! 1. Give the builder a [`MetadataProvider`], a root coordinate and optionally [`ResolverOptions`] or listeners.
//! 1. [`ResolverBuilder::build()`] to get a [`GraphResolver`]
//! 1. [`GraphResolver::resolve()`] to run the task queue to exhaustion and get the [`DependencyGraph`].
//! 1. Query the graph, [`DependencyGraph::resolved_artifacts()`] lists the effective dependency closure.
//!
//! Resolution is depth first. Each task asks the provider for the declared dependencies of one coordinate,
//! classifies every candidate with the [`ConflictResolver`] and applies the result to the graph.
//! Rejected candidates are kept as disabled edges carrying a [`DisabledType`] and a reason.

use crate::*;
use crate::artifact::*;
use crate::metadata::*;

mod dependency_graph;
pub use dependency_graph::DependencyGraph;
pub use dependency_graph::DependencyGraphNode;
pub use dependency_graph::DependencyGraphEdge;
pub use dependency_graph::EdgeDisablement;
pub use dependency_graph::DisabledType;
pub use dependency_graph::ResolvedArtifact;

mod task_queue;
pub use task_queue::TaskQueue;
pub use task_queue::TaskId;
pub use task_queue::ResolutionTask;

mod conflict_resolver;
pub use conflict_resolver::ConflictResolver;
pub use conflict_resolver::Classification;
pub use conflict_resolver::ScopedExclusion;

mod listener;
pub use listener::GraphListener;
pub use listener::ListenerError;
pub use listener::ListenerId;
pub use listener::GraphPhaseEvent;
pub use listener::PhaseKind;
pub use listener::EdgeDecision;

mod resolver_builder;
pub use resolver_builder::ResolverBuilder;
mod processing_resolver;
pub use processing_resolver::GraphResolver;
pub use processing_resolver::ResolutionState;
