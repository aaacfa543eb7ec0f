use serde::{Deserialize, Serialize};

/// Events sent over the WebSocket gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayEvent {
    /// Server confirms successful authentication
    Ready { user_id: i64, username: String },

    /// A user came online or went offline
    PresenceUpdate {
        user_id: i64,
        username: String,
        online: bool,
    },

    /// Call signaling message relayed to the target user
    CallSignal {
        from_user_id: i64,
        signal: CallSignalPayload,
    },
}

/// Commands sent FROM client TO server over WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayCommand {
    /// Authenticate the WebSocket connection
    Identify { token: String },

    /// Send a call signaling message to a specific peer
    CallSignalSend {
        receiver_id: i64,
        signal: CallSignalPayload,
    },
}

/// WebRTC signaling payload relayed between call peers. The server never
/// inspects the SDP/candidate bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "signal_type")]
pub enum CallSignalPayload {
    Offer { sdp: String },
    Answer { sdp: String },
    IceCandidate {
        candidate: String,
        sdp_mid: Option<String>,
        sdp_m_line_index: Option<u16>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_wire_format() {
        let cmd: GatewayCommand = serde_json::from_str(
            r#"{"type":"CallSignalSend","data":{"receiver_id":7,"signal":{"signal_type":"Offer","sdp":"v=0"}}}"#,
        )
        .unwrap();

        match cmd {
            GatewayCommand::CallSignalSend {
                receiver_id,
                signal: CallSignalPayload::Offer { sdp },
            } => {
                assert_eq!(receiver_id, 7);
                assert_eq!(sdp, "v=0");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn event_roundtrips_signal_payload() {
        let event = GatewayEvent::CallSignal {
            from_user_id: 3,
            signal: CallSignalPayload::IceCandidate {
                candidate: "candidate:1".into(),
                sdp_mid: Some("0".into()),
                sdp_m_line_index: Some(0),
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"CallSignal""#));
        assert!(json.contains(r#""signal_type":"IceCandidate""#));
    }
}
