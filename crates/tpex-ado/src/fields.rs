//! Best-effort normalization of raw work-item fields.
//!
//! Azure DevOps returns the `Microsoft.VSTS.TCM.Steps` field as an XML
//! markup string in current API versions, but older payloads have been seen
//! as structured arrays, and unassigned fields are simply absent. None of
//! these variants may fail extraction: anything unrecognizable counts as
//! zero steps.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::warn;

pub const TITLE_FIELD: &str = "System.Title";
pub const STEPS_FIELD: &str = "Microsoft.VSTS.TCM.Steps";
pub const ASSIGNED_TO_FIELD: &str = "System.AssignedTo";

static STEP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<step\s+id=").expect("valid step-tag pattern"));

/// Count test steps from whatever shape the steps field arrived in.
///
/// Returns 0 for absent, null, empty, or unparsable payloads; never fails.
pub fn count_steps(value: Option<&Value>) -> u32 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::String(markup)) => STEP_TAG.find_iter(markup).count() as u32,
        Some(Value::Array(steps)) => steps.len() as u32,
        Some(other) => {
            warn!("unrecognized steps payload ({}), counting 0 steps", type_name(other));
            0
        }
    }
}

/// Extract an assignee display name, empty when unassigned.
///
/// The field is an identity object with a `displayName` member in current
/// payloads, a bare string in older ones. A trailing `<email@host>` suffix
/// is stripped either way.
pub fn assigned_display_name(value: Option<&Value>) -> String {
    let raw = match value {
        Some(Value::Object(identity)) => identity
            .get("displayName")
            .and_then(Value::as_str)
            .unwrap_or_default(),
        Some(Value::String(name)) => name.as_str(),
        _ => "",
    };
    strip_email_suffix(raw)
}

fn strip_email_suffix(name: &str) -> String {
    match name.split_once('<') {
        Some((display, _)) => display.trim().to_string(),
        None => name.trim().to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_count_steps_from_markup() {
        let markup = json!(
            "<steps id=\"0\" last=\"3\">\
             <step id=\"1\" type=\"ActionStep\"><description/></step>\
             <step id=\"2\" type=\"ValidateStep\"><description/></step>\
             </steps>"
        );
        assert_eq!(count_steps(Some(&markup)), 2);
    }

    #[test]
    fn test_count_steps_from_structured_list() {
        let steps = json!([{"action": "open"}, {"action": "click"}, {"action": "check"}]);
        assert_eq!(count_steps(Some(&steps)), 3);
        assert_eq!(count_steps(Some(&json!([]))), 0);
    }

    #[test]
    fn test_count_steps_missing_or_malformed_is_zero() {
        assert_eq!(count_steps(None), 0);
        assert_eq!(count_steps(Some(&Value::Null)), 0);
        assert_eq!(count_steps(Some(&json!("not xml at all"))), 0);
        assert_eq!(count_steps(Some(&json!({"weird": true}))), 0);
        assert_eq!(count_steps(Some(&json!(17))), 0);
    }

    #[test]
    fn test_assigned_display_name_from_identity() {
        let identity = json!({"displayName": "Ada Smith", "uniqueName": "ada@example.com"});
        assert_eq!(assigned_display_name(Some(&identity)), "Ada Smith");
    }

    #[test]
    fn test_assigned_display_name_strips_email() {
        let value = json!("Ada Smith <ada@example.com>");
        assert_eq!(assigned_display_name(Some(&value)), "Ada Smith");
    }

    #[test]
    fn test_assigned_display_name_unassigned() {
        assert_eq!(assigned_display_name(None), "");
        assert_eq!(assigned_display_name(Some(&Value::Null)), "");
        assert_eq!(assigned_display_name(Some(&json!({"id": "abc"}))), "");
    }
}
