//! # Section Mutations
//!
//! The editing surface is split into two mutation classes.
//!
//! ## Structural
//!
//! Change which sections exist and in what order. Add, delete and duplicate
//! are confirmed by the backend before anything changes locally; move,
//! reorder and version restore apply locally. Every applied structural
//! operation resequences `order` and pushes a history snapshot.
//!
//! ## Local
//!
//! Edit fields inside a section, or page settings/SEO. Applied immediately,
//! never fail at edit time, never touch history. Problems surface only when
//! the page is saved.

use pagebuilder_model::{
    PageSettings, SectionContent, SectionId, SectionPatch, SectionStyles, SectionType, Seo,
};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl std::str::FromStr for MoveDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(MoveDirection::Up),
            "down" => Ok(MoveDirection::Down),
            other => Err(format!("unknown direction `{}` (expected up or down)", other)),
        }
    }
}

/// Operations that change the shape of the section list
#[derive(Debug, Clone, PartialEq)]
pub enum StructuralOp {
    AddSection {
        section_type: SectionType,
        content: Option<SectionContent>,
        /// Insert position, clamped; `None` appends
        position: Option<usize>,
    },
    DeleteSection {
        section_id: SectionId,
    },
    DuplicateSection {
        section_id: SectionId,
    },
    MoveSection {
        section_id: SectionId,
        direction: MoveDirection,
    },
    ReorderSections {
        from_index: usize,
        to_index: usize,
    },
    RestoreVersion {
        version_number: u32,
    },
}

impl StructuralOp {
    /// Whether the backend must confirm this operation before it applies
    pub fn is_backend_confirmed(&self) -> bool {
        matches!(
            self,
            StructuralOp::AddSection { .. }
                | StructuralOp::DeleteSection { .. }
                | StructuralOp::DuplicateSection { .. }
        )
    }

    /// History label for the snapshot this operation pushes
    pub fn label(&self) -> &'static str {
        match self {
            StructuralOp::AddSection { .. } => "add section",
            StructuralOp::DeleteSection { .. } => "delete section",
            StructuralOp::DuplicateSection { .. } => "duplicate section",
            StructuralOp::MoveSection { .. } => "move section",
            StructuralOp::ReorderSections { .. } => "reorder sections",
            StructuralOp::RestoreVersion { .. } => "restore version",
        }
    }
}

/// Field-level edits applied without the backend
#[derive(Debug, Clone, PartialEq)]
pub enum LocalEdit {
    /// Replace the value at a dot path inside the section's content
    UpdateContent {
        section_id: SectionId,
        path: String,
        value: Value,
    },
    UpdateStyles {
        section_id: SectionId,
        styles: SectionStyles,
    },
    UpdateSection {
        section_id: SectionId,
        patch: SectionPatch,
    },
    ToggleVisibility {
        section_id: SectionId,
    },
    UpdateSettings {
        settings: PageSettings,
    },
    UpdateSeo {
        seo: Seo,
    },
}

impl LocalEdit {
    pub fn section_id(&self) -> Option<&SectionId> {
        match self {
            LocalEdit::UpdateContent { section_id, .. }
            | LocalEdit::UpdateStyles { section_id, .. }
            | LocalEdit::UpdateSection { section_id, .. }
            | LocalEdit::ToggleVisibility { section_id } => Some(section_id),
            LocalEdit::UpdateSettings { .. } | LocalEdit::UpdateSeo { .. } => None,
        }
    }
}

/// Why an operation changed nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoopReason {
    NoDocument,
    SectionNotFound(SectionId),
    AtBoundary,
    IndexOutOfRange,
    SamePosition,
    InvalidPath(String),
}

impl fmt::Display for NoopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoopReason::NoDocument => f.write_str("no page is open"),
            NoopReason::SectionNotFound(id) => write!(f, "section {} not found", id),
            NoopReason::AtBoundary => f.write_str("section is already at the edge"),
            NoopReason::IndexOutOfRange => f.write_str("index out of range"),
            NoopReason::SamePosition => f.write_str("section is already there"),
            NoopReason::InvalidPath(message) => write!(f, "invalid content path: {}", message),
        }
    }
}

/// Result of a structural operation
#[derive(Debug, Clone, PartialEq)]
pub enum StructuralOutcome {
    /// Applied locally; a history snapshot was pushed and the page is dirty
    Applied {
        /// Section created or affected by the operation
        section_id: Option<SectionId>,
        /// History cursor after the snapshot
        history_cursor: usize,
    },
    /// Nothing changed: no backend call, no snapshot, dirty flag untouched
    Noop { reason: NoopReason },
}

impl StructuralOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, StructuralOutcome::Applied { .. })
    }

    pub fn section_id(&self) -> Option<&SectionId> {
        match self {
            StructuralOutcome::Applied { section_id, .. } => section_id.as_ref(),
            StructuralOutcome::Noop { .. } => None,
        }
    }
}

/// Result of a local edit
#[derive(Debug, Clone, PartialEq)]
pub enum LocalOutcome {
    /// Applied and marked dirty
    Applied {
        /// False when the section's content no longer fits its schema;
        /// the value is kept and the next save will be rejected
        schema_valid: bool,
    },
    Noop { reason: NoopReason },
}

impl LocalOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LocalOutcome::Applied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_classes() {
        let add = StructuralOp::AddSection {
            section_type: SectionType::Hero,
            content: None,
            position: None,
        };
        let mv = StructuralOp::MoveSection {
            section_id: "a".into(),
            direction: MoveDirection::Up,
        };

        assert!(add.is_backend_confirmed());
        assert!(!mv.is_backend_confirmed());
        assert_eq!(mv.label(), "move section");
    }

    #[test]
    fn test_local_edit_target() {
        let edit = LocalEdit::ToggleVisibility {
            section_id: "a".into(),
        };
        assert_eq!(edit.section_id(), Some(&SectionId::from("a")));

        let edit = LocalEdit::UpdateSeo { seo: Seo::default() };
        assert_eq!(edit.section_id(), None);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("up".parse::<MoveDirection>(), Ok(MoveDirection::Up));
        assert!("left".parse::<MoveDirection>().is_err());
    }
}
