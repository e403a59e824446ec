//! Explain output for environment classification
//!
//! Provides structured JSON and human-readable explanations of how a
//! platform and user-agent pair was classified.

use clientkit_env::{classify, EnvironmentClassification, PlatformFamily, WECHAT_MARKER};
use serde::{Deserialize, Serialize};

/// Explanation of a classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainOutput {
    /// Platform string that was classified
    pub platform: String,

    /// User-agent string that was classified
    pub user_agent: String,

    /// The resulting five-flag record
    pub classification: EnvironmentClassification,

    /// Platform family whose flag is set
    pub platform_family: PlatformFamily,

    /// Rule that selected the platform family
    pub matched_rule: String,

    /// Human-readable explanation
    pub explanation: String,
}

impl ExplainOutput {
    /// Classify the inputs and explain the result
    pub fn from_inputs(platform: &str, user_agent: &str) -> Self {
        let classification = classify(platform, user_agent);
        Self::from_classification(platform, user_agent, classification)
    }

    /// Explain an existing classification of the given inputs
    pub fn from_classification(
        platform: &str,
        user_agent: &str,
        classification: EnvironmentClassification,
    ) -> Self {
        let family = classification.platform();
        let explanation = Self::generate_explanation(platform, user_agent, &classification);

        Self {
            platform: platform.to_string(),
            user_agent: user_agent.to_string(),
            classification,
            platform_family: family,
            matched_rule: family.rule().to_string(),
            explanation,
        }
    }

    fn generate_explanation(
        platform: &str,
        user_agent: &str,
        classification: &EnvironmentClassification,
    ) -> String {
        let family = classification.platform();
        let mut lines = Vec::new();

        lines.push(format!("Platform: {:?}", platform));
        lines.push(format!("User agent: {:?}", user_agent));
        lines.push(String::new());
        lines.push(format!("Family: {}", family.to_string().to_uppercase()));
        lines.push(format!("  because {}", family.rule()));

        if classification.is_wechat_browser {
            lines.push(format!("WeChat browser: yes (user agent contains '{}')", WECHAT_MARKER));
        } else {
            lines.push(format!("WeChat browser: no (no '{}' token)", WECHAT_MARKER));
        }

        lines.join("\n")
    }

    /// Format as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format as human-readable text
    pub fn to_human(&self) -> String {
        let c = &self.classification;
        let mut output = self.explanation.clone();
        output.push_str("\n\n--- Flags ---\n");
        output.push_str(&format!("isWindows: {}\n", c.is_windows));
        output.push_str(&format!("isMac: {}\n", c.is_mac));
        output.push_str(&format!("isLinux: {}\n", c.is_linux));
        output.push_str(&format!("isMobile: {}\n", c.is_mobile));
        output.push_str(&format!("isWeChatBrowser: {}\n", c.is_wechat_browser));
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explain_windows() {
        let explain = ExplainOutput::from_inputs("Win32", "Mozilla/5.0 (Windows NT 10.0)");

        assert_eq!(explain.platform_family, PlatformFamily::Windows);
        assert!(explain.classification.is_windows);
        assert!(explain.matched_rule.contains("Win"));
        assert!(explain.explanation.contains("Family: WINDOWS"));
    }

    #[test]
    fn test_explain_mobile_fallback() {
        let explain = ExplainOutput::from_inputs("iPhone", "");

        assert_eq!(explain.platform_family, PlatformFamily::Mobile);
        assert!(explain.matched_rule.contains("no desktop"));
    }

    #[test]
    fn test_explain_to_json() {
        let explain = ExplainOutput::from_inputs("X11", "MicroMessenger/8.0");

        let json = explain.to_json().unwrap();
        assert!(json.contains("\"isLinux\": true"));
        assert!(json.contains("\"isWeChatBrowser\": true"));
        assert!(json.contains("\"platform_family\": \"linux\""));
    }

    #[test]
    fn test_explain_to_human() {
        let explain = ExplainOutput::from_inputs("MacIntel", "Safari");

        let human = explain.to_human();
        assert!(human.contains("Family: MAC"));
        assert!(human.contains("WeChat browser: no"));
        assert!(human.contains("isMac: true"));
    }
}
