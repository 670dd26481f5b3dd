//! Pending expansion work.

use std::collections::{HashSet, VecDeque};

use serde::{Serialize, Deserialize};

use crate::artifact::*;

/// Opaque identifier of a [`ResolutionTask`], unique within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

impl std::fmt::Display for TaskId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "task#{}", self.0)
	}
}

/// Expansion of a single coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionTask {
	pub id: TaskId,
	pub coordinate: Coordinate,
	/// Distance from the root, the root is 0.
	pub depth: usize,
	/// Ancestors from the root down to the parent. Empty for the root.
	pub path: Vec<Coordinate>,
	/// Scope of the edge that led here, `None` for the root.
	pub scope: Option<Scope>,
}

impl ResolutionTask {
	pub fn is_root(&self) -> bool {
		self.depth == 0
	}

	/// The ancestors followed by this task's own coordinate.
	pub fn lineage(&self) -> impl Iterator<Item = &Coordinate> + '_ {
		self.path.iter().chain(std::iter::once(&self.coordinate))
	}
}

/// Holds the tasks still to be processed.
///
/// Tasks are handed out depth first, children in the order they were declared,
/// and every coordinate is scheduled at most once per run. A coordinate that dropped
/// out of the graph can be [withdrawn](TaskQueue::withdraw) once and scheduled again.
#[derive(Debug, Default)]
pub struct TaskQueue {
	pending: VecDeque<ResolutionTask>,
	scheduled: HashSet<Coordinate>,
	withdrawn: HashSet<Coordinate>,
	next_id: u64,
}

impl TaskQueue {
	pub fn new() -> Self {
		Default::default()
	}

	/// Schedules the root task. Should be the first thing pushed.
	pub fn seed(&mut self, root: Coordinate) -> TaskId {
		let task = ResolutionTask {
			id: self.allocate_id(),
			coordinate: root,
			depth: 0,
			path: Vec::new(),
			scope: None,
		};
		let id = task.id;
		self.scheduled.insert(task.coordinate.clone());
		self.pending.push_back(task);
		id
	}

	/// Creates a task for `coordinate` below `parent`.
	///
	/// `None` when `coordinate` has already been scheduled during this run.
	pub fn child_of(&mut self, parent: &ResolutionTask, coordinate: &Coordinate, scope: Scope) -> Option<ResolutionTask> {
		if !self.scheduled.insert(coordinate.clone()) {
			log::trace!("{} already scheduled, not expanding again", coordinate);
			return None;
		}

		let mut path = parent.path.clone();
		path.push(parent.coordinate.clone());

		Some(ResolutionTask {
			id: self.allocate_id(),
			coordinate: coordinate.clone(),
			depth: parent.depth + 1,
			path,
			scope: Some(scope),
		})
	}

	/// Queues the children produced by one task ahead of everything else, preserving their order.
	pub fn push_children(&mut self, children: Vec<ResolutionTask>) {
		for task in children.into_iter().rev() {
			self.pending.push_front(task);
		}
	}

	pub fn pop(&mut self) -> Option<ResolutionTask> {
		let task = self.pending.pop_front();
		if let Some(task) = &task {
			log::debug!("Dequeued {} for {} at depth {} ({} pending)", task.id, task.coordinate, task.depth, self.pending.len());
		}
		task
	}

	/// Drops pending tasks for `coordinate` after it stopped being reachable.
	///
	/// The first time this happens to a coordinate it may be scheduled again, should a later
	/// declaration bring it back. After that it stays expanded at most once more.
	pub fn withdraw(&mut self, coordinate: &Coordinate) {
		self.pending.retain(|task| task.coordinate != *coordinate);
		if self.withdrawn.insert(coordinate.clone()) {
			self.scheduled.remove(coordinate);
		}
	}

	pub fn len(&self) -> usize {
		self.pending.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pending.is_empty()
	}

	fn allocate_id(&mut self) -> TaskId {
		let id = TaskId(self.next_id);
		self.next_id += 1;
		id
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn c(s: &str) -> Coordinate {
		s.parse().unwrap()
	}

	#[test]
	fn children_run_before_siblings_of_parent() {
		let mut queue = TaskQueue::new();
		queue.seed(c("g:root:1"));
		let root = queue.pop().unwrap();

		let b = queue.child_of(&root, &c("g:b:1"), Scope::Compile).unwrap();
		let d = queue.child_of(&root, &c("g:d:1"), Scope::Compile).unwrap();
		queue.push_children(vec![b, d]);

		let b = queue.pop().unwrap();
		assert_eq!(b.coordinate, c("g:b:1"));
		let x = queue.child_of(&b, &c("g:x:1"), Scope::Compile).unwrap();
		queue.push_children(vec![x]);

		assert_eq!(queue.pop().unwrap().coordinate, c("g:x:1"));
		assert_eq!(queue.pop().unwrap().coordinate, c("g:d:1"));
		assert!(queue.is_empty());
	}

	#[test]
	fn coordinate_is_scheduled_once() {
		let mut queue = TaskQueue::new();
		queue.seed(c("g:root:1"));
		let root = queue.pop().unwrap();
		assert!(queue.child_of(&root, &c("g:b:1"), Scope::Compile).is_some());
		assert!(queue.child_of(&root, &c("g:b:1"), Scope::Runtime).is_none());
		assert!(queue.child_of(&root, &c("g:root:1"), Scope::Compile).is_none());
	}

	#[test]
	fn child_inherits_path() {
		let mut queue = TaskQueue::new();
		queue.seed(c("g:root:1"));
		let root = queue.pop().unwrap();
		let b = queue.child_of(&root, &c("g:b:1"), Scope::Runtime).unwrap();
		let e = queue.child_of(&b, &c("g:e:1"), Scope::Runtime).unwrap();

		assert_eq!(e.depth, 2);
		assert_eq!(e.scope, Some(Scope::Runtime));
		assert_eq!(e.path, vec![c("g:root:1"), c("g:b:1")]);
		assert!(e.lineage().any(|a| *a == c("g:e:1")));
	}

	#[test]
	fn withdrawn_coordinate_can_come_back_once() {
		let mut queue = TaskQueue::new();
		queue.seed(c("g:root:1"));
		let root = queue.pop().unwrap();

		let b = queue.child_of(&root, &c("g:b:1"), Scope::Compile).unwrap();
		let d = queue.child_of(&root, &c("g:d:1"), Scope::Compile).unwrap();
		queue.push_children(vec![b, d]);

		queue.withdraw(&c("g:b:1"));
		assert_eq!(queue.len(), 1);
		assert!(queue.child_of(&root, &c("g:b:1"), Scope::Compile).is_some());

		queue.withdraw(&c("g:b:1"));
		assert!(queue.child_of(&root, &c("g:b:1"), Scope::Compile).is_none());
	}
}
