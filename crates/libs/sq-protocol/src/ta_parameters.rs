//! TA trigger parameters and the six-field signature.
//!
//! A TM server driving a TA job passes exactly six named parameters with
//! the trigger request. Their wire names are fixed by the mimicked
//! protocol and recognized verbatim; a request carrying only some of them
//! is a normal, non-TA trigger.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The six parameter names identifying a TA-style trigger request.
pub const TA_SIGNATURE: [&str; 6] = [
    "operation",
    "externalJobId",
    "testList",
    "notificationURL",
    "executionId",
    "executionConfiguration",
];

/// Build parameters synthesized from a TA-style trigger request.
///
/// Scoped to one build; discarded after the publishing step consumes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqTaParameters {
    /// Requested operation, e.g. `run` or `test-list`.
    pub operation: String,
    /// Identifier of the execution on the TM side.
    pub external_job_id: String,
    /// Tests the TM server asked to run.
    pub test_list: String,
    /// Callback URL the results are reported against.
    #[serde(rename = "notificationURL")]
    pub notification_url: String,
    /// Identifier of this run within the execution.
    pub execution_id: String,
    /// Opaque execution configuration forwarded by TM.
    pub execution_configuration: String,
}

impl SqTaParameters {
    /// Recognize the TA signature in a raw parameter map.
    ///
    /// Returns `Some` iff all six signature fields are present. A partial
    /// match never binds.
    pub fn from_params(params: &HashMap<String, String>) -> Option<Self> {
        if !TA_SIGNATURE.iter().all(|name| params.contains_key(*name)) {
            return None;
        }
        let field = |name: &str| params[name].clone();
        Some(Self {
            operation: field("operation"),
            external_job_id: field("externalJobId"),
            test_list: field("testList"),
            notification_url: field("notificationURL"),
            execution_id: field("executionId"),
            execution_configuration: field("executionConfiguration"),
        })
    }

    /// The six parameters as name/value pairs, wire names.
    pub fn to_params(&self) -> HashMap<String, String> {
        HashMap::from([
            ("operation".into(), self.operation.clone()),
            ("externalJobId".into(), self.external_job_id.clone()),
            ("testList".into(), self.test_list.clone()),
            ("notificationURL".into(), self.notification_url.clone()),
            ("executionId".into(), self.execution_id.clone()),
            (
                "executionConfiguration".into(),
                self.execution_configuration.clone(),
            ),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn full_params() -> HashMap<String, String> {
        TA_SIGNATURE
            .iter()
            .map(|name| (name.to_string(), format!("value-of-{name}")))
            .collect()
    }

    #[test]
    fn full_signature_binds() {
        let params = SqTaParameters::from_params(&full_params()).unwrap();
        assert_eq!(params.external_job_id, "value-of-externalJobId");
        assert_eq!(params.notification_url, "value-of-notificationURL");
    }

    #[test]
    fn partial_signature_never_binds() {
        for missing in TA_SIGNATURE {
            let mut params = full_params();
            params.remove(missing);
            assert!(
                SqTaParameters::from_params(&params).is_none(),
                "bound without '{missing}'"
            );
        }
    }

    #[test]
    fn extra_params_do_not_prevent_binding() {
        let mut params = full_params();
        params.insert("branch".into(), "main".into());
        assert!(SqTaParameters::from_params(&params).is_some());
    }
}
