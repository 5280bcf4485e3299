//! # Undo/Redo History
//!
//! Bounded list of section-list snapshots with a cursor.
//!
//! ## Design
//!
//! - Only structural changes (add/delete/move/reorder/restore) are recorded
//! - The entry under the cursor always equals the current section list
//! - Pushing after an undo discards the redo branch
//! - When over capacity the oldest entry is evicted and the cursor shifts
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = HistoryManager::new(50);
//! history.seed(sections.clone());
//!
//! // After a structural change
//! history.push(sections.clone(), "move section");
//!
//! // Undo returns the snapshot to restore
//! if let Some(previous) = history.undo() {
//!     sections = previous.to_vec();
//! }
//! ```

use pagebuilder_model::Section;
use std::collections::VecDeque;
use std::sync::Arc;

/// Immutable snapshot of the section list
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    sections: Arc<[Section]>,

    /// What produced this snapshot, e.g. "add section"
    pub label: Option<String>,
}

impl HistoryEntry {
    fn new(sections: Vec<Section>, label: Option<String>) -> Self {
        Self {
            sections: sections.into(),
            label,
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}

/// Snapshot history for one open page
#[derive(Debug)]
pub struct HistoryManager {
    entries: VecDeque<HistoryEntry>,

    /// Index of the entry matching the current state
    cursor: usize,

    /// Maximum number of entries (0 = unlimited)
    capacity: usize,
}

impl HistoryManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            capacity,
        }
    }

    /// Drop all entries and start from `sections`
    pub fn seed(&mut self, sections: Vec<Section>) {
        self.entries.clear();
        self.entries.push_back(HistoryEntry::new(sections, None));
        self.cursor = 0;
    }

    /// Record a structural change
    pub fn push(&mut self, sections: Vec<Section>, label: impl Into<String>) {
        // Abandon the redo branch
        self.entries.truncate(self.cursor + 1);

        self.entries
            .push_back(HistoryEntry::new(sections, Some(label.into())));
        self.cursor = self.entries.len() - 1;

        if self.capacity > 0 {
            while self.entries.len() > self.capacity {
                self.entries.pop_front();
                self.cursor = self.cursor.saturating_sub(1);
            }
        }
    }

    /// Step back; returns the snapshot to restore
    pub fn undo(&mut self) -> Option<&[Section]> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).map(HistoryEntry::sections)
    }

    /// Step forward; returns the snapshot to restore
    pub fn redo(&mut self) -> Option<&[Section]> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).map(HistoryEntry::sections)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot under the cursor
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    /// Label of the change the next undo reverts
    pub fn undo_label(&self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.current().and_then(|e| e.label.as_deref())
    }

    /// Label of the change the next redo reapplies
    pub fn redo_label(&self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        self.entries
            .get(self.cursor + 1)
            .and_then(|e| e.label.as_deref())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagebuilder_model::{SectionContent, SectionType};

    fn sections(ids: &[&str]) -> Vec<Section> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| {
                let mut s = Section::new(*id, SectionType::Text, SectionContent::default());
                s.order = i;
                s
            })
            .collect()
    }

    fn ids(snapshot: &[Section]) -> Vec<&str> {
        snapshot.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_seeded_history_has_nothing_to_undo() {
        let mut history = HistoryManager::new(50);
        history.seed(sections(&["a"]));

        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_undo_and_redo_walk_the_cursor() {
        let mut history = HistoryManager::new(50);
        history.seed(sections(&["a"]));
        history.push(sections(&["a", "b"]), "add section");

        assert!(history.can_undo());
        assert_eq!(history.undo_label(), Some("add section"));
        assert_eq!(ids(history.undo().unwrap()), vec!["a"]);

        assert!(!history.can_undo());
        assert!(history.can_redo());
        assert_eq!(history.redo_label(), Some("add section"));
        assert_eq!(ids(history.redo().unwrap()), vec!["a", "b"]);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_discards_redo_branch() {
        let mut history = HistoryManager::new(50);
        history.seed(sections(&["a"]));
        history.push(sections(&["a", "b"]), "add section");
        history.push(sections(&["a", "b", "c"]), "add section");

        history.undo();
        history.undo();
        assert_eq!(history.cursor(), 0);

        history.push(sections(&["x"]), "restore version");
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(ids(history.current().unwrap().sections()), vec!["x"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = HistoryManager::new(3);
        history.seed(sections(&["s0"]));

        for i in 1..10 {
            let id = format!("s{}", i);
            history.push(sections(&[id.as_str()]), "add section");
            assert!(history.len() <= 3);
            assert_eq!(history.cursor(), history.len() - 1);
        }

        // Oldest surviving entry is s7
        history.undo();
        assert_eq!(ids(history.undo().unwrap()), vec!["s7"]);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_zero_capacity_is_unbounded() {
        let mut history = HistoryManager::new(0);
        history.seed(Vec::new());
        for _ in 0..200 {
            history.push(Vec::new(), "move section");
        }
        assert_eq!(history.len(), 201);
    }
}
