//! Switchboard Message Types
//!
//! Wire format spoken over a transferred message port. Both ends of a
//! channel exchange these as plain JSON objects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key distinguishing switchboard traffic from anything else on the port
pub const ACTION_KEY: &str = "switchboardAction";

/// Messages exchanged over an established channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "switchboardAction", rename_all = "lowercase")]
pub enum SwitchboardMessage {
    /// Invoke a method and expect a reply
    Get {
        method: String,
        #[serde(rename = "messageId")]
        message_id: String,
        #[serde(default)]
        args: Value,
    },
    /// Successful result of a `get`
    Reply {
        #[serde(rename = "messageId")]
        message_id: String,
        #[serde(default)]
        result: Value,
    },
    /// Failed result of a `get`
    Error {
        #[serde(rename = "messageId")]
        message_id: String,
        error: String,
    },
    /// Fire-and-forget invocation
    Emit {
        method: String,
        #[serde(default)]
        args: Value,
    },
}

impl SwitchboardMessage {
    /// Whether a raw port message belongs to the switchboard protocol
    pub fn is_switchboard(value: &Value) -> bool {
        value.get(ACTION_KEY).is_some()
    }

    pub fn to_value(&self) -> Value {
        // Serializing a plain enum of strings and JSON values cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_message_deserialize() {
        let raw = json!({
            "switchboardAction": "get",
            "method": "guestToken",
            "messageId": "m_host_1",
            "args": {"guestToken": "abc"}
        });
        let msg: SwitchboardMessage = serde_json::from_value(raw).unwrap();
        match msg {
            SwitchboardMessage::Get { method, message_id, args } => {
                assert_eq!(method, "guestToken");
                assert_eq!(message_id, "m_host_1");
                assert_eq!(args["guestToken"], "abc");
            }
            _ => panic!("Expected Get"),
        }
    }

    #[test]
    fn test_get_without_args() {
        let raw = json!({"switchboardAction": "get", "method": "getScrollSize", "messageId": "m_host_2"});
        let msg: SwitchboardMessage = serde_json::from_value(raw).unwrap();
        assert!(matches!(msg, SwitchboardMessage::Get { args: Value::Null, .. }));
    }

    #[test]
    fn test_reply_serialize() {
        let msg = SwitchboardMessage::Reply {
            message_id: "m_superset_1".to_string(),
            result: json!({"width": 10, "height": 20}),
        };
        let value = msg.to_value();
        assert_eq!(value["switchboardAction"], "reply");
        assert_eq!(value["messageId"], "m_superset_1");
        assert_eq!(value["result"]["height"], 20);
    }

    #[test]
    fn test_is_switchboard() {
        assert!(SwitchboardMessage::is_switchboard(&json!({"switchboardAction": "emit"})));
        assert!(!SwitchboardMessage::is_switchboard(&json!({"type": "__embedded_comms__"})));
        assert!(!SwitchboardMessage::is_switchboard(&json!("get")));
    }
}
