// Socket command request

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request sent to the control socket of a running instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocketCommand {
    pub command: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl SocketCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            arguments: Map::new(),
        }
    }

    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let command = SocketCommand::new("igmp-join")
            .with_argument("outer-vlan", 1)
            .with_argument("group", "232.1.1.3");

        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "command": "igmp-join",
                "arguments": {"outer-vlan": 1, "group": "232.1.1.3"}
            })
        );
    }

    #[test]
    fn test_arguments_optional_on_input() {
        let command: SocketCommand =
            serde_json::from_str(r#"{"command": "session-counters"}"#).unwrap();
        assert_eq!(command, SocketCommand::new("session-counters"));
    }
}
