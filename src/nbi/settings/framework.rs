//! Runtime frameworks that can be injected into BaseSystem.dmg.

use std::fmt;

/// A scripting runtime copied from the installer's packages into the NBI.
///
/// Each framework names the installer packages (`Packages/<name>.pkg`) whose
/// payloads carry it and the cpio patterns selecting its files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Framework {
    /// Python.framework and its libraries
    Python,
    /// Ruby.framework and its libraries
    Ruby,
}

impl Framework {
    /// Human-readable framework name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::Ruby => "Ruby",
        }
    }

    /// Installer packages whose payloads contain the framework
    pub fn source_packages(&self) -> &'static [&'static str] {
        match self {
            Self::Python => &["BSD"],
            Self::Ruby => &["BSD", "Essentials"],
        }
    }

    /// Shell patterns selecting the framework's files inside a payload
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            Self::Python => &["*Py*", "*py*"],
            Self::Ruby => &["*ruby*", "*lib*ruby*", "*Ruby.framework*"],
        }
    }

    /// Suffix appended to the bundle name when the framework is added
    pub fn name_suffix(&self) -> String {
        format!("+{}", self.display_name())
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
