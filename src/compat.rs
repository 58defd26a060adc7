//! Gateway release compatibility checks performed when a session is opened.

use serde::Deserialize;
use serde_json::Value;

/// Airlock Gateway releases this client has been exercised against.
pub const COMPATIBLE_VERSIONS: &[&str] = &["8.2", "8.3", "8.4"];

pub(crate) const SESSION_CREATE_PATH: &str = "session/create";
pub(crate) const SESSION_TERMINATE_PATH: &str = "session/terminate";
pub(crate) const NODE_STATUS_PATH: &str = "system/status/node";

/// Returns `true` if `version` belongs to one of [`COMPATIBLE_VERSIONS`].
pub fn is_compatible_version(version: &str) -> bool {
    COMPATIBLE_VERSIONS.iter().any(|prefix| {
        version
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
    })
}

/// Node status document returned by `system/status/node`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NodeStatus {
    data: NodeStatusData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NodeStatusData {
    attributes: NodeAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NodeAttributes {
    version: Option<String>,
}

/// Reads `data.attributes.version` from a node status document.
pub(crate) fn version_from_node_status(status: &Value) -> Option<String> {
    NodeStatus::deserialize(status).ok()?.data.attributes.version
}

pub(crate) fn log_compatibility(version: Option<&str>) {
    match version {
        Some(version) if is_compatible_version(version) => {
            tracing::debug!("Gateway runs supported Airlock version {}", version);
        }
        Some(version) => tracing::warn!(
            "Gateway runs Airlock version {} while this client is tested for versions {}; \
             some REST calls might not work",
            version,
            COMPATIBLE_VERSIONS.join(", ")
        ),
        None => tracing::warn!(
            "The Airlock version could not be determined, this client might be incompatible \
             with the gateway"
        ),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{is_compatible_version, version_from_node_status};

    #[test]
    fn matches_whole_release_components() {
        assert!(is_compatible_version("8.2"));
        assert!(is_compatible_version("8.3.1"));
        assert!(is_compatible_version("8.4.0-rc1"));
        assert!(!is_compatible_version("8.1.5"));
        assert!(!is_compatible_version("8.20"));
        assert!(!is_compatible_version("7.8"));
    }

    #[test]
    fn extracts_version_from_node_status() {
        let status = json!({
            "data": {"type": "node-status", "attributes": {"version": "8.3.2"}}
        });
        assert_eq!(version_from_node_status(&status), Some("8.3.2".to_owned()));
        assert_eq!(version_from_node_status(&json!({"data": {}})), None);
        assert_eq!(version_from_node_status(&json!({"data": []})), None);
        assert_eq!(
            version_from_node_status(&json!({"data": {"attributes": {"version": 8}}})),
            None
        );
    }
}
