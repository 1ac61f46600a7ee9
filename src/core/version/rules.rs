// ─── OS Rule Evaluation ───

use regex::Regex;
use tracing::warn;

use super::manifest::{LibraryEntry, OsRule, PlatformRule, RuleAction};
use crate::core::platform::CurrentPlatform;

impl LibraryEntry {
    /// Evaluate whether this library should be included on `platform`.
    ///
    /// Rules logic (Mojang launcher semantics):
    /// - If no rules → allowed.
    /// - Process rules top-to-bottom. Start with "disallowed".
    /// - Every matching rule overwrites the verdict with its action, so the
    ///   last matching rule wins.
    pub fn is_allowed_on(&self, platform: &CurrentPlatform) -> bool {
        match &self.rules {
            Some(rules) => rules_allow(rules, platform),
            None => true,
        }
    }
}

pub fn rules_allow(rules: &[PlatformRule], platform: &CurrentPlatform) -> bool {
    let mut allowed = false;

    for rule in rules {
        if rule_matches(rule, platform) {
            allowed = rule.action == RuleAction::Allow;
        }
    }

    allowed
}

fn rule_matches(rule: &PlatformRule, platform: &CurrentPlatform) -> bool {
    match &rule.os {
        None => true,
        Some(os) => os_matches(os, platform),
    }
}

fn os_matches(os: &OsRule, platform: &CurrentPlatform) -> bool {
    if let Some(name) = &os.name {
        if name != platform.os.manifest_name() {
            return false;
        }
    }

    if let Some(arch) = &os.arch {
        if !arch_matches(arch, platform) {
            return false;
        }
    }

    match &os.version {
        Some(pattern) => version_matches(pattern, &platform.version),
        None => true,
    }
}

fn arch_matches(rule_arch: &str, platform: &CurrentPlatform) -> bool {
    match rule_arch.to_ascii_lowercase().as_str() {
        "x86_64" => platform.is_64bit(),
        "x86" => !platform.is_64bit(),
        other => platform.arch.contains(other),
    }
}

fn version_matches(pattern: &str, version: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(version),
        Err(err) => {
            warn!("Ignoring rule with invalid os.version pattern {:?}: {}", pattern, err);
            false
        }
    }
}
