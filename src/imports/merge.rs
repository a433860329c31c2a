//! Per-section merge policy.
//!
//! | Section | Policy |
//! |---------|--------|
//! | `tools`, `services`, `mcp-servers`, `permissions`, `network`, `runtimes`, `safe-outputs` | shallow key union, later import wins on collision |
//! | `engine` | later import replaces earlier |
//! | `steps`, `post-steps` | appended in processing order |
//! | `jobs` | key union, later import wins with a warning |
//!
//! Sections with the wrong shape are skipped with a warning; they never abort
//! the merge of other sections.

use serde_yaml::{Mapping, Value};

use super::ImportsResult;
use crate::yaml::{key_to_string, lenient_mapping, lenient_sequence};

/// Merge `source` into `target`, later keys replacing earlier ones.
fn union_into(target: &mut Mapping, source: Mapping) {
    for (key, value) in source {
        target.insert(key, value);
    }
}

impl ImportsResult {
    /// Merge the structured sections of one imported markdown file.
    pub(crate) fn merge_frontmatter(&mut self, origin: &str, frontmatter: &Mapping) {
        union_into(&mut self.merged_tools, lenient_mapping(origin, frontmatter, "tools"));
        union_into(&mut self.merged_services, lenient_mapping(origin, frontmatter, "services"));
        union_into(&mut self.merged_mcp_servers, lenient_mapping(origin, frontmatter, "mcp-servers"));
        union_into(&mut self.merged_permissions, lenient_mapping(origin, frontmatter, "permissions"));
        union_into(&mut self.merged_network, lenient_mapping(origin, frontmatter, "network"));
        union_into(&mut self.merged_runtimes, lenient_mapping(origin, frontmatter, "runtimes"));
        union_into(&mut self.merged_safe_outputs, lenient_mapping(origin, frontmatter, "safe-outputs"));

        if let Some(engine) = frontmatter.get("engine").filter(|v| !v.is_null()) {
            if self.merged_engine.is_some() {
                tracing::debug!("engine from {origin} replaces earlier engine");
            }
            self.merged_engine = Some(engine.clone());
        }

        self.merged_steps.extend(lenient_sequence(origin, frontmatter, "steps"));
        self.merged_post_steps.extend(lenient_sequence(origin, frontmatter, "post-steps"));
        self.merge_jobs(origin, frontmatter);
    }

    /// Merge the `jobs` of one import.
    pub(crate) fn merge_jobs(&mut self, origin: &str, document: &Mapping) {
        for (name, job) in lenient_mapping(origin, document, "jobs") {
            if self.merged_jobs.contains_key(&name) {
                tracing::warn!("Job '{}' from {origin} overrides an earlier import", key_to_string(&name));
            }
            self.merged_jobs.insert(name, job);
        }
    }

    /// Append one markdown contribution.
    pub(crate) fn append_markdown(&mut self, body: &str) {
        let body = body.trim();
        if body.is_empty() {
            return;
        }
        if !self.merged_markdown.is_empty() {
            self.merged_markdown.push_str("\n\n");
        }
        self.merged_markdown.push_str(body);
    }

    /// Whether any section received a contribution.
    pub fn has_contributions(&self) -> bool {
        !(self.merged_tools.is_empty()
            && self.merged_services.is_empty()
            && self.merged_mcp_servers.is_empty()
            && self.merged_permissions.is_empty()
            && self.merged_network.is_empty()
            && self.merged_runtimes.is_empty()
            && self.merged_safe_outputs.is_empty()
            && self.merged_engine.is_none()
            && self.merged_steps.is_empty()
            && self.merged_post_steps.is_empty()
            && self.merged_jobs.is_empty()
            && self.merged_markdown.is_empty()
            && self.copilot_setup_steps.is_none())
    }
}

/// Render a merged value as compact YAML for display.
pub fn to_yaml_text(value: &Value) -> String {
    serde_yaml::to_string(value).map(|s| s.trim_end().to_string()).unwrap_or_default()
}
