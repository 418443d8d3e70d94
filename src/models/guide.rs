// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Guide data structures.
//!
//! The guide is the root persisted document: title, author, and the
//! ordered list of steps.

use super::step::Step;
use serde::{Deserialize, Serialize};

/// Persisted schema version written into every saved guide.
pub const SCHEMA_VERSION: u32 = 1;

/// A complete tutorial guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    /// Schema version of the persisted shape, for forward-compat checks.
    pub schema_version: u32,
    pub title: String,
    pub author: String,
    /// Steps in display/export order.
    pub steps: Vec<Step>,
}

impl Guide {
    /// Create an empty guide with the given title and author.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            title: title.into(),
            author: author.into(),
            steps: Vec::new(),
        }
    }

    /// The guide a fresh install (or a reset) starts from.
    pub fn starter() -> Self {
        let mut guide = Guide::new("How To Use My Application", "Creator");
        let mut step = Step::new(1, "Open The Main Page");
        step.description = "Navigate your browser to the application dashboard.".to_string();
        guide.steps.push(step);
        guide
    }

    /// Append a new step with a placeholder title and return its id.
    ///
    /// Ids are `max(existing) + 1`: unique among live steps, though the
    /// highest id is reallocated once its step is deleted.
    pub fn add_step(&mut self) -> u64 {
        let id = self.steps.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        self.steps
            .push(Step::new(id, format!("Step {}", self.steps.len() + 1)));
        id
    }

    /// Delete a step by id. Returns whether one was removed.
    pub fn delete_step(&mut self, id: u64) -> bool {
        let before = self.steps.len();
        self.steps.retain(|s| s.id != id);
        self.steps.len() != before
    }

    /// Swap the step at `index` with its neighbor above or below.
    /// Out-of-range moves are ignored.
    pub fn move_step(&mut self, index: usize, up: bool) {
        if index >= self.steps.len() {
            return;
        }
        if up && index > 0 {
            self.steps.swap(index, index - 1);
        } else if !up && index + 1 < self.steps.len() {
            self.steps.swap(index, index + 1);
        }
    }

    /// Look up a step by id.
    pub fn step(&self, id: u64) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Look up a step by id, mutably.
    pub fn step_mut(&mut self, id: u64) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id == id)
    }
}

impl Default for Guide {
    fn default() -> Self {
        Self::starter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_ids_are_not_reused_after_delete() {
        let mut guide = Guide::new("Guide", "Author");
        let a = guide.add_step();
        let b = guide.add_step();
        assert_eq!((a, b), (1, 2));

        guide.delete_step(b);
        let c = guide.add_step();
        assert_eq!(c, 2, "max+1 after deleting the max id");

        guide.delete_step(a);
        let d = guide.add_step();
        assert!(d > c);
    }

    #[test]
    fn move_step_swaps_neighbors_and_ignores_edges() {
        let mut guide = Guide::new("Guide", "Author");
        guide.add_step();
        guide.add_step();
        guide.add_step();

        guide.move_step(0, true); // no-op at top
        assert_eq!(guide.steps[0].id, 1);

        guide.move_step(0, false);
        assert_eq!(guide.steps.iter().map(|s| s.id).collect::<Vec<_>>(), [2, 1, 3]);

        guide.move_step(2, false); // no-op at bottom
        assert_eq!(guide.steps[2].id, 3);

        guide.move_step(2, true);
        assert_eq!(guide.steps.iter().map(|s| s.id).collect::<Vec<_>>(), [2, 3, 1]);
    }

    #[test]
    fn starter_guide_has_one_placeholder_step() {
        let guide = Guide::starter();
        assert_eq!(guide.schema_version, SCHEMA_VERSION);
        assert_eq!(guide.steps.len(), 1);
        assert!(guide.steps[0].image.is_none());
        assert!(guide.steps[0].annotations.is_empty());
    }
}
