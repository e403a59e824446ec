//! Host adapter seam.
//!
//! The classifier never reads ambient state. Callers hand it whatever their
//! host reports through [`HostEnvironment`].

use crate::{classify, EnvironmentClassification};

/// Source of the raw platform and user-agent strings.
pub trait HostEnvironment {
    /// Platform identifier, e.g. `"Win32"`, `"MacIntel"`, `"Linux x86_64"`.
    fn platform(&self) -> &str;

    /// Full user-agent string.
    fn user_agent(&self) -> &str;
}

/// Owned host strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticHost {
    pub platform: String,
    pub user_agent: String,
}

impl StaticHost {
    pub fn new(platform: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            user_agent: user_agent.into(),
        }
    }
}

impl HostEnvironment for StaticHost {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Read both strings from `host` once and classify them.
pub fn probe<H: HostEnvironment + ?Sized>(host: &H) -> EnvironmentClassification {
    classify(host.platform(), host.user_agent())
}
