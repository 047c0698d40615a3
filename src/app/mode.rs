//! Which panes are visible.

use std::fmt;
use std::str::FromStr;

/// The three-way pane layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Source editor only.
    Source,
    /// Source and preview side by side.
    #[default]
    Split,
    /// Preview only.
    Rendered,
}

/// Visibility of each pane for a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panes {
    pub source: bool,
    pub rendered: bool,
}

/// A mode name that is not one of `source`, `split`, `rendered`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown view mode `{0}` (expected source, split or rendered)")]
pub struct UnknownViewMode(pub String);

impl ViewMode {
    /// Every mode in selector order.
    pub const ALL: [Self; 3] = [Self::Source, Self::Split, Self::Rendered];

    /// Parse an exact, lowercase mode name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "source" => Some(Self::Source),
            "split" => Some(Self::Split),
            "rendered" => Some(Self::Rendered),
            _ => None,
        }
    }

    /// The name used on the command line and in host signals.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Split => "split",
            Self::Rendered => "rendered",
        }
    }

    /// Label shown in the mode selector.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Source => "Source",
            Self::Split => "Split",
            Self::Rendered => "Rendered",
        }
    }

    pub const fn panes(self) -> Panes {
        match self {
            Self::Source => Panes {
                source: true,
                rendered: false,
            },
            Self::Split => Panes {
                source: true,
                rendered: true,
            },
            Self::Rendered => Panes {
                source: false,
                rendered: true,
            },
        }
    }
}

impl FromStr for ViewMode {
    type Err = UnknownViewMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownViewMode(s.to_string()))
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
