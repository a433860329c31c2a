//! The platform's reserved setup-steps workflow.
//!
//! A `copilot-setup-steps.yml` import is not merged like other imports: the
//! steps of its setup job become the single `copilot_setup_steps` output,
//! always starting with a repository checkout.

use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};

use crate::yaml::{lenient_mapping, lenient_sequence};

/// Job name the platform looks for.
pub const SETUP_JOB_NAME: &str = "copilot-setup-steps";

/// Default action used for a synthesised checkout step.
pub const DEFAULT_CHECKOUT_ACTION: &str = "actions/checkout@v5";

/// Whether `file_name` is the reserved setup-steps workflow (case-insensitive).
pub fn is_copilot_setup_file(file_name: &str) -> bool {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name).to_ascii_lowercase();
    name == "copilot-setup-steps.yml" || name == "copilot-setup-steps.yaml"
}

fn is_checkout_step(step: &Value) -> bool {
    step.get("uses")
        .and_then(Value::as_str)
        .is_some_and(|uses| uses.trim().starts_with("actions/checkout"))
}

fn checkout_step(action: &str) -> Value {
    let mut step = Mapping::new();
    step.insert("name".into(), "Checkout repository".into());
    step.insert("uses".into(), action.into());
    Value::Mapping(step)
}

/// Make sure the first step checks out the repository.
///
/// A missing checkout is synthesised; an existing one that is not first is
/// moved to the front. Steps already starting with a checkout are unchanged.
pub fn ensure_checkout_first(mut steps: Vec<Value>, checkout_action: &str) -> Vec<Value> {
    match steps.iter().position(is_checkout_step) {
        Some(0) => {}
        Some(index) => {
            let checkout = steps.remove(index);
            steps.insert(0, checkout);
        }
        None => steps.insert(0, checkout_step(checkout_action)),
    }
    steps
}

/// Steps of the setup job in a workflow definition.
///
/// Uses the `copilot-setup-steps` job, falling back to the first job.
pub fn extract_setup_steps(origin: &str, workflow: &Mapping, checkout_action: &str) -> Vec<Value> {
    let jobs = lenient_mapping(origin, workflow, "jobs");
    let job = jobs.get(SETUP_JOB_NAME).or_else(|| jobs.values().next());

    let steps = match job.and_then(Value::as_mapping) {
        Some(job) => lenient_sequence(origin, job, "steps"),
        None => {
            tracing::warn!("{origin} declares no setup job; using a checkout step only");
            Vec::new()
        }
    };

    ensure_checkout_first(steps, checkout_action)
}

/// Serialise steps as a YAML sequence.
pub fn serialize_steps(steps: &[Value]) -> Result<String> {
    serde_yaml::to_string(steps).context("Failed to serialize setup steps")
}
