//! JSON wire codec (§6).
//!
//! Shapes match the reference serialiser's `sprintf` format strings exactly
//! (`original_source/src/node.mapper.c`): one JSON document per frame, no
//! trailing data, `cmd_id` omitted only in the sense that a `DoNothing`
//! message still serialises `"cmd_id":0` (the spec's "commands without
//! payload" example). Parsing uses `serde_json` rather than a hand-rolled
//! tokeniser, matching this codebase's existing `serde`/`serde_json`
//! dependency.

use heapless::Vec as HVec;
use serde_json::{Value, json};

use crate::error::{Error, ProtocolError};
use crate::mesh::types::{
    CommandId, MAX_DESTINATIONS, MAX_FRAME_LEN, NodeCommand, NodeId, NodeMessage,
    TcpFrame, TemperatureUpdate,
};

/// Serialise a [`NodeMessage`] into the wire shape of §6, returning a
/// [`TcpFrame`]. Fails with [`Error::Protocol(ProtocolError::Malformed)`] if the rendered
/// document would exceed [`MAX_FRAME_LEN`] bytes.
pub fn encode(msg: &NodeMessage) -> Result<TcpFrame, Error> {
    let dst: Vec<u32> = msg.destinations.iter().map(|d| *d as u32).collect();

    let value = match &msg.command {
        NodeCommand::DoNothing => json!({
            "src_id": msg.source,
            "dst_id": dst,
            "cmd_id": CommandId::DoNothing as u8,
        }),
        NodeCommand::SetMode(v) => json!({
            "src_id": msg.source,
            "dst_id": dst,
            "cmd_id": CommandId::SetMode as u8,
            "data": {"value_id": v},
        }),
        NodeCommand::SetLight(v) => json!({
            "src_id": msg.source,
            "dst_id": dst,
            "cmd_id": CommandId::SetLight as u8,
            "data": {"value_id": v},
        }),
        NodeCommand::SetIntrusion(v) => json!({
            "src_id": msg.source,
            "dst_id": dst,
            "cmd_id": CommandId::SetIntrusion as u8,
            "data": {"value_id": v},
        }),
        NodeCommand::UpdateTemperature(TemperatureUpdate {
            pressure_hpa,
            humidity_pct,
            temp_c,
        }) => {
            // "1 decimal" quantisation (§8 property 7): round then format,
            // rather than letting serde_json print full float precision.
            let rounded = (*temp_c * 10.0).round() / 10.0;
            json!({
                "src_id": msg.source,
                "dst_id": dst,
                "cmd_id": CommandId::UpdateTemperature as u8,
                "data": {
                    "pres_hpa": pressure_hpa,
                    "hum_pct": humidity_pct,
                    "temp_c": format_one_decimal(rounded),
                },
            })
        }
        NodeCommand::UpdateDoorState(state) => json!({
            "src_id": msg.source,
            "dst_id": dst,
            "cmd_id": CommandId::UpdateDoorState as u8,
            "data": {"door_state": state},
        }),
        NodeCommand::Unknown(id) => json!({
            "src_id": msg.source,
            "dst_id": dst,
            "cmd_id": id,
        }),
    };

    let text = value.to_string();
    TcpFrame::new(text.as_bytes()).ok_or(Error::Protocol(ProtocolError::Malformed))
}

/// `temp_c` must round-trip as a literal 1-decimal number (`21.3`, not
/// `21.300000001`); `serde_json::Number::from_f64` prints full precision, so
/// build the JSON number from formatted text instead.
fn format_one_decimal(v: f32) -> Value {
    let text = format!("{v:.1}");
    serde_json::from_str(&text).unwrap_or(Value::Null)
}

/// Deserialise a [`TcpFrame`] into a [`NodeMessage`].
///
/// - Missing `cmd_id` maps to `DoNothing` (§6).
/// - Missing `dst_id` is treated as "broadcast to self only" (§9(c) decision
///   recorded in DESIGN.md) — `self_id` is required to resolve this.
/// - Unrecognised `cmd_id` values are delivered as `NodeCommand::Unknown`
///   rather than rejected, matching "delivered as-is to the application
///   which may drop it" (§6).
/// - Fields not populated by a given `cmd_id`'s shape are simply absent from
///   the `NodeCommand` variant — there is no whole-struct `memcpy` to leave
///   stray bytes in, resolving the source's flagged bug (§9(b)).
pub fn decode(frame: &TcpFrame, self_id: NodeId) -> Result<NodeMessage, Error> {
    let text = core::str::from_utf8(frame.as_bytes()).map_err(|_| Error::Protocol(ProtocolError::Malformed))?;
    let value: Value = serde_json::from_str(text).map_err(|_| Error::Protocol(ProtocolError::Malformed))?;

    let source = value
        .get("src_id")
        .and_then(Value::as_u64)
        .ok_or(Error::Protocol(ProtocolError::Malformed))? as NodeId;

    let mut destinations: HVec<NodeId, MAX_DESTINATIONS> = HVec::new();
    match value.get("dst_id").and_then(Value::as_array) {
        Some(arr) => {
            for entry in arr {
                let id = entry.as_u64().ok_or(Error::Protocol(ProtocolError::Malformed))? as NodeId;
                if destinations.push(id).is_err() {
                    // More destinations than the pool can address — malformed
                    // rather than silently truncated.
                    return Err(Error::Protocol(ProtocolError::Malformed));
                }
            }
        }
        None => {
            destinations.push(self_id).ok();
        }
    }

    let cmd_id = value.get("cmd_id").and_then(Value::as_u64);
    let command = match cmd_id {
        None => NodeCommand::DoNothing,
        Some(id) => {
            let id = id as u8;
            match CommandId::from_u8(id) {
                Some(CommandId::DoNothing) => NodeCommand::DoNothing,
                Some(CommandId::SetMode) => NodeCommand::SetMode(read_value_id(&value)?),
                Some(CommandId::SetLight) => NodeCommand::SetLight(read_value_id(&value)?),
                Some(CommandId::SetIntrusion) => NodeCommand::SetIntrusion(read_value_id(&value)?),
                Some(CommandId::UpdateTemperature) => {
                    let data = value.get("data").ok_or(Error::Protocol(ProtocolError::Malformed))?;
                    NodeCommand::UpdateTemperature(TemperatureUpdate {
                        pressure_hpa: data
                            .get("pres_hpa")
                            .and_then(Value::as_u64)
                            .ok_or(Error::Protocol(ProtocolError::Malformed))? as u32,
                        humidity_pct: data
                            .get("hum_pct")
                            .and_then(Value::as_i64)
                            .ok_or(Error::Protocol(ProtocolError::Malformed))? as i32,
                        temp_c: data
                            .get("temp_c")
                            .and_then(Value::as_f64)
                            .ok_or(Error::Protocol(ProtocolError::Malformed))? as f32,
                    })
                }
                Some(CommandId::UpdateDoorState) => {
                    let data = value.get("data").ok_or(Error::Protocol(ProtocolError::Malformed))?;
                    NodeCommand::UpdateDoorState(
                        data.get("door_state")
                            .and_then(Value::as_u64)
                            .ok_or(Error::Protocol(ProtocolError::Malformed))? as u32,
                    )
                }
                None => NodeCommand::Unknown(id),
            }
        }
    };

    Ok(NodeMessage {
        source,
        destinations,
        command,
    })
}

fn read_value_id(value: &Value) -> Result<i32, Error> {
    value
        .get("data")
        .and_then(|d| d.get("value_id"))
        .and_then(Value::as_i64)
        .map(|v| v as i32)
        .ok_or(Error::Protocol(ProtocolError::Malformed))
}
