//! Environment classification corpus tests
//!
//! Runs every fixture case through `classify` and the host adapter, and
//! checks the platform exclusivity invariant.

mod fixtures;

use clientkit::{classify, probe, ExplainOutput, PlatformFamily, StaticHost};
use fixtures::EnvironmentCorpus;

fn flag_count(platform: &str) -> usize {
    let c = classify(platform, "");
    [c.is_windows, c.is_mac, c.is_linux, c.is_mobile]
        .iter()
        .filter(|set| **set)
        .count()
}

#[test]
fn test_corpus_loads() {
    let corpus = EnvironmentCorpus::load().expect("Failed to load corpus");
    assert_eq!(corpus.schema_version, 1);
    assert!(!corpus.description.is_empty());
    assert!(corpus.test_cases.len() >= 10, "Expected at least 10 test cases");
}

#[test]
fn test_corpus_cases() {
    let corpus = EnvironmentCorpus::load().expect("Failed to load corpus");

    for case in &corpus.test_cases {
        let result = classify(&case.platform, &case.user_agent);
        assert_eq!(
            result.platform(),
            case.expected.family,
            "{} ({}): wrong platform family",
            case.id,
            case.description
        );
        assert_eq!(
            result.is_wechat_browser, case.expected.wechat,
            "{} ({}): wrong WeChat flag",
            case.id, case.description
        );
    }
}

#[test]
fn test_corpus_through_host_adapter() {
    let corpus = EnvironmentCorpus::load().expect("Failed to load corpus");

    for case in &corpus.test_cases {
        let host = StaticHost::new(case.platform.clone(), case.user_agent.clone());
        assert_eq!(probe(&host), classify(&case.platform, &case.user_agent), "{}", case.id);
    }
}

#[test]
fn test_platform_exclusivity() {
    let expected = [
        ("Win32", PlatformFamily::Windows),
        ("MacIntel", PlatformFamily::Mac),
        ("X11", PlatformFamily::Linux),
        ("iPhone", PlatformFamily::Mobile),
    ];

    for (platform, family) in expected {
        assert_eq!(flag_count(platform), 1, "{}", platform);
        assert_eq!(classify(platform, "").platform(), family, "{}", platform);
    }
}

#[test]
fn test_exclusivity_holds_for_arbitrary_strings() {
    for platform in ["", " ", "Windows", "Macintosh", "Linux", "LinuxX", "FreeBSD", "X11 ", "winnt"] {
        assert_eq!(flag_count(platform), 1, "{:?}", platform);
    }
}

#[test]
fn test_wechat_marker_casing() {
    for ua in ["MicroMessenger", "micromessenger", "MICROMESSENGER", "mIcRoMeSsEnGeR/8.0"] {
        assert!(classify("iPhone", ua).is_wechat_browser, "{}", ua);
    }
    assert!(!classify("iPhone", "Micro Messenger").is_wechat_browser);
    assert!(!classify("iPhone", "WeChat").is_wechat_browser);
}

#[test]
fn test_classification_is_fresh_per_call() {
    let first = classify("Win32", "");
    let second = classify("iPhone", "MicroMessenger");
    assert!(first.is_windows && !first.is_wechat_browser);
    assert!(second.is_mobile && second.is_wechat_browser);
}

#[test]
fn test_explain_matches_classification() {
    let explain = ExplainOutput::from_inputs("Linux aarch64", "MicroMessenger/8.0");
    assert_eq!(explain.platform_family, PlatformFamily::Linux);
    assert!(explain.classification.is_linux);
    assert!(explain.classification.is_wechat_browser);
    assert_eq!(explain.matched_rule, PlatformFamily::Linux.rule());
}
