use std::fmt;

/// Overwrite, simulation and confirmation rules for one batch run.
///
/// `force` and `skip_existing` may both be set; `force` is checked first
/// and wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoPolicy {
    pub dry_run: bool,
    pub force: bool,
    pub skip_existing: bool,
    /// Whether the engine may ask before overwriting an existing target.
    pub interactive: bool,
    pub create_directories: bool,
}

impl IoPolicy {
    /// Policy for the automatic second pass: never prompt.
    pub fn for_retry(&self) -> Self {
        Self {
            interactive: false,
            ..*self
        }
    }

    /// Rename always overwrites without asking.
    pub fn for_kind(&self, kind: OperationKind) -> Self {
        match kind {
            OperationKind::Rename => Self {
                force: true,
                skip_existing: false,
                interactive: false,
                ..*self
            },
            OperationKind::Copy | OperationKind::Move => *self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Copy,
    Move,
    Rename,
}

impl OperationKind {
    /// Present participle used in progress lines, e.g. "Copying".
    pub fn action(&self) -> &'static str {
        match self {
            OperationKind::Copy => "Copying",
            OperationKind::Move => "Moving",
            OperationKind::Rename => "Renaming",
        }
    }

    /// Past participle used in the summary, e.g. "copied".
    pub fn past(&self) -> &'static str {
        match self {
            OperationKind::Copy => "copied",
            OperationKind::Move => "moved",
            OperationKind::Rename => "renamed",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Copy => "copy",
            OperationKind::Move => "move",
            OperationKind::Rename => "rename",
        };
        f.write_str(name)
    }
}
