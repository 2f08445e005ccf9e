//! Payloads that change session metadata.

use serde::{Deserialize, Serialize};

/// Payload for `provider_switch` events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSwitchPayload {
    /// New provider name.
    pub provider: String,
    /// New model. When absent the previous model is kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Payload for `directories_changed` events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoriesChangedPayload {
    /// Full replacement list of workspace directories.
    pub directories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provider_required() {
        assert!(serde_json::from_value::<ProviderSwitchPayload>(json!({"model": "m"})).is_err());
        let p: ProviderSwitchPayload =
            serde_json::from_value(json!({"provider": "anthropic"})).unwrap();
        assert!(p.model.is_none());
    }

    #[test]
    fn directories_must_be_array_of_strings() {
        assert!(
            serde_json::from_value::<DirectoriesChangedPayload>(json!({"directories": "/a"}))
                .is_err()
        );
        assert!(
            serde_json::from_value::<DirectoriesChangedPayload>(json!({"directories": [1]}))
                .is_err()
        );
    }
}
