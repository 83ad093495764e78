//! Worker lifecycle states.

use std::fmt;

/// Where the asset worker is in its install/activate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkerState {
    /// Created, no install attempted yet
    #[default]
    Parsed,
    /// Populating the versioned bucket
    Installing,
    /// Bucket populated, waiting for activation
    Installed,
    /// Sweeping old generations
    Activating,
    /// Controlling requests
    Active,
    /// Install failed or superseded
    Redundant,
}

impl WorkerState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Redundant => "redundant",
        }
    }

    /// Whether `next` may directly follow `self`
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Parsed, Self::Installing)
                | (Self::Installing, Self::Installed)
                | (Self::Installed, Self::Activating)
                | (Self::Activating, Self::Active)
                | (
                    Self::Installing | Self::Installed | Self::Activating | Self::Active,
                    Self::Redundant
                )
        )
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
