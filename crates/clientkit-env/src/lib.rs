//! Client environment classification.
//!
//! Classifies a platform identifier and a user-agent string into an
//! operating system family, a mobile flag, and WeChat in-app browser
//! presence.

mod classification;
mod host;

pub use classification::{EnvironmentClassification, PlatformFamily};
pub use host::{probe, HostEnvironment, StaticHost};

use tracing::trace;

/// Platform prefix for Windows hosts.
const WINDOWS_PREFIX: &str = "Win";

/// Platform prefix for macOS hosts.
const MAC_PREFIX: &str = "Mac";

/// Platform prefix for Linux hosts.
const LINUX_PREFIX: &str = "Linux";

/// Exact platform value reported by X11 desktops.
const X11_PLATFORM: &str = "X11";

/// User-agent token of the WeChat embedded browser, lower-cased.
pub const WECHAT_MARKER: &str = "micromessenger";

/// Platform family for a platform string. Comparison is case-sensitive.
pub fn platform_family(platform: &str) -> PlatformFamily {
    if platform.starts_with(WINDOWS_PREFIX) {
        PlatformFamily::Windows
    } else if platform.starts_with(MAC_PREFIX) {
        PlatformFamily::Mac
    } else if platform == X11_PLATFORM || platform.starts_with(LINUX_PREFIX) {
        PlatformFamily::Linux
    } else {
        PlatformFamily::Mobile
    }
}

/// Whether the user agent carries the WeChat marker, in any letter-casing.
pub fn is_wechat_user_agent(user_agent: &str) -> bool {
    user_agent.to_lowercase().contains(WECHAT_MARKER)
}

/// Classify a platform string and a user-agent string.
///
/// Pure: the same inputs always produce the same classification.
pub fn classify(platform: &str, user_agent: &str) -> EnvironmentClassification {
    let family = platform_family(platform);
    let wechat = is_wechat_user_agent(user_agent);
    trace!(platform, %family, wechat, "Classified environment");
    EnvironmentClassification::new(family, wechat)
}
