//! IPC message protocol for Quadsmith
//!
//! Defines the message types exchanged between the modeling core and the UI:
//! mesh edit commands going in, selection/history updates coming out.

mod commands;
mod error;
mod history;
mod messages;

pub use commands::*;
pub use error::IpcError;
pub use history::{HistoryEntry, HistoryEntryKind};
pub use messages::{ModelerToUi, UiToModeler};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Encode a message as JSON
pub fn to_json<T: Serialize>(message: &T) -> Result<String, IpcError> {
    Ok(serde_json::to_string(message)?)
}

/// Decode a JSON message, rejecting blank input up front
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, IpcError> {
    if json.trim().is_empty() {
        return Err(IpcError::InvalidFormat("empty message".to_string()));
    }
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_message_round_trip() {
        let message = UiToModeler::MeshEditCommand(MeshEditCommand::ExtrudeSelectedFace {
            distance: Some(0.5),
        });
        let json = to_json(&message).unwrap();
        assert!(json.contains("\"type\":\"MeshEditCommand\""));

        let decoded: UiToModeler = from_json(&json).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_history_update_shape() {
        let message = ModelerToUi::HistoryChanged {
            entries: vec![HistoryEntry {
                index: 0,
                tick: 0,
                tag: "init".to_string(),
                kind: HistoryEntryKind::Init,
            }],
        };
        let value: serde_json::Value = serde_json::from_str(&to_json(&message).unwrap()).unwrap();
        assert_eq!(value["type"], "HistoryChanged");
        assert_eq!(value["data"]["entries"][0]["tag"], "init");
        assert_eq!(value["data"]["entries"][0]["kind"], "Init");
    }

    #[test]
    fn test_transform_command_from_json() {
        let json = r#"{"TransformMesh":{"matrix":[1,0,0,0,0,1,0,0,0,0,1,0,2,0,0,1],"tag":"translate"}}"#;
        let command: MeshEditCommand = from_json(json).unwrap();
        match command {
            MeshEditCommand::TransformMesh { matrix, tag } => {
                assert_eq!(matrix[12], 2.0);
                assert_eq!(tag, "translate");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            from_json::<UiToModeler>("  "),
            Err(IpcError::InvalidFormat(_))
        ));
        assert!(matches!(
            from_json::<UiToModeler>("{\"type\":\"Nope\"}"),
            Err(IpcError::Serialize(_))
        ));
    }
}
