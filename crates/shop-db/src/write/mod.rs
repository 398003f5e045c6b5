//! Transactional composite writes.
//!
//! A composite write runs as an ordered list of [`WriteStep`]s inside one
//! [`WriteTx`]. The guard moves through [`WriteState`] as steps succeed and
//! ends in `Committed` or `RolledBack`; there is no way back from either.

mod tx;

pub use tx::WriteTx;

/// One statement (or batch) of a composite write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStep {
    InsertParent,
    UpdateParent,
    LinkAssociation,
    ClearChildren,
    InsertChildren,
    DeleteParent,
    Commit,
}

impl WriteStep {
    /// The state reached once this step succeeds.
    fn reaches(self) -> WriteState {
        match self {
            WriteStep::InsertParent | WriteStep::UpdateParent | WriteStep::DeleteParent => {
                WriteState::ParentWritten
            }
            WriteStep::LinkAssociation => WriteState::AssociationsWritten,
            WriteStep::ClearChildren | WriteStep::InsertChildren => WriteState::ChildrenWritten,
            WriteStep::Commit => WriteState::Committed,
        }
    }
}

impl std::fmt::Display for WriteStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WriteStep::InsertParent => "insert parent",
            WriteStep::UpdateParent => "update parent",
            WriteStep::LinkAssociation => "link association",
            WriteStep::ClearChildren => "clear children",
            WriteStep::InsertChildren => "insert children",
            WriteStep::DeleteParent => "delete parent",
            WriteStep::Commit => "commit",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteState {
    Idle,
    TransactionOpen,
    ParentWritten,
    AssociationsWritten,
    ChildrenWritten,
    Committed,
    RolledBack,
}

impl WriteState {
    pub fn is_terminal(self) -> bool {
        matches!(self, WriteState::Committed | WriteState::RolledBack)
    }
}
