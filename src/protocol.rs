//! Actions and payloads of the `view` namespace.
//!
//! Inbound payloads are decoded leniently: unknown fields are ignored, so
//! panels and hosts of different versions keep talking to each other.

use serde::{Deserialize, Serialize};

use crate::{ObjectId, tree::Options, tree::TreeNode};

/// Panel to host.
pub mod command {
    pub const GET_TREE: &str = "getTree";
    pub const SET_OPTIONS: &str = "setOptions";
    pub const INSPECT_VIEWS: &str = "inspectViews";
    pub const SHOW_LAYER: &str = "showLayer";
    pub const PREVIEW_LAYER: &str = "previewLayer";
    pub const HIDE_LAYER: &str = "hideLayer";
    pub const HIDE_PREVIEW: &str = "hidePreview";
    pub const INSPECT_ELEMENT: &str = "inspectElement";
    pub const SEND_MODEL_TO_CONSOLE: &str = "sendModelToConsole";
    pub const OPEN_RESOURCE: &str = "openResource";
}

/// Host to panel.
pub mod event {
    pub const VIEW_TREE: &str = "viewTree";
    pub const PIN_VIEW: &str = "pinView";
    pub const UNPIN_VIEW: &str = "unpinView";
    pub const START_INSPECTING: &str = "startInspecting";
    pub const STOP_INSPECTING: &str = "stopInspecting";
}

/// Payload of commands addressing one retained object.
///
/// Older panels send `viewId` instead of `objectId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectIdPayload {
    #[serde(alias = "viewId")]
    pub object_id: ObjectId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectViewsPayload {
    #[serde(default)]
    pub inspect: bool,
}

/// Fields missing inside `options` fall back to their defaults; a missing
/// `options` object rejects the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOptionsPayload {
    pub options: Options,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenResourcePayload {
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewTreePayload {
    pub tree: TreeNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinViewPayload {
    pub object_id: ObjectId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_accepts_legacy_view_id() {
        let current: ObjectIdPayload = serde_json::from_str(r#"{"objectId":"obj4"}"#).unwrap();
        let legacy: ObjectIdPayload = serde_json::from_str(r#"{"viewId":"obj4"}"#).unwrap();
        assert_eq!(current, legacy);
        assert_eq!(current.object_id.as_str(), "obj4");
    }

    #[test]
    fn test_missing_object_id_is_rejected() {
        assert!(serde_json::from_str::<ObjectIdPayload>("{}").is_err());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let payload: InspectViewsPayload =
            serde_json::from_str(r#"{"inspect":true,"fromTheFuture":1}"#).unwrap();
        assert!(payload.inspect);
    }

    #[test]
    fn test_set_options_requires_options() {
        assert!(serde_json::from_str::<SetOptionsPayload>("{}").is_err());
        let partial: SetOptionsPayload = serde_json::from_str(r#"{"options":{}}"#).unwrap();
        assert_eq!(partial.options, Options::default());
    }

    #[test]
    fn test_pin_view_wire_format() {
        let payload = PinViewPayload {
            object_id: ObjectId::from("obj2"),
        };
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"objectId":"obj2"}"#
        );
    }
}
