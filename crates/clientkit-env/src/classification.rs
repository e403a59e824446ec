//! Classification result types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system family derived from the platform string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    Windows,
    Mac,
    Linux,
    /// Anything that is not one of the desktop signatures.
    Mobile,
}

impl PlatformFamily {
    /// The rule that selects this family.
    pub fn rule(&self) -> &'static str {
        match self {
            Self::Windows => "platform starts with \"Win\"",
            Self::Mac => "platform starts with \"Mac\"",
            Self::Linux => "platform is \"X11\" or starts with \"Linux\"",
            Self::Mobile => "no desktop platform signature matched",
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Mac => write!(f, "mac"),
            Self::Linux => write!(f, "linux"),
            Self::Mobile => write!(f, "mobile"),
        }
    }
}

/// Snapshot of the client environment.
///
/// Exactly one of the four platform flags is set; `is_wechat_browser` is
/// independent of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentClassification {
    pub is_windows: bool,
    pub is_mac: bool,
    pub is_linux: bool,
    pub is_mobile: bool,
    #[serde(rename = "isWeChatBrowser")]
    pub is_wechat_browser: bool,
}

impl EnvironmentClassification {
    /// Build a classification for a platform family.
    pub fn new(family: PlatformFamily, is_wechat_browser: bool) -> Self {
        Self {
            is_windows: family == PlatformFamily::Windows,
            is_mac: family == PlatformFamily::Mac,
            is_linux: family == PlatformFamily::Linux,
            is_mobile: family == PlatformFamily::Mobile,
            is_wechat_browser,
        }
    }

    /// The platform family whose flag is set.
    pub fn platform(&self) -> PlatformFamily {
        if self.is_windows {
            PlatformFamily::Windows
        } else if self.is_mac {
            PlatformFamily::Mac
        } else if self.is_linux {
            PlatformFamily::Linux
        } else {
            PlatformFamily::Mobile
        }
    }

    pub fn is_desktop(&self) -> bool {
        !self.is_mobile
    }
}
