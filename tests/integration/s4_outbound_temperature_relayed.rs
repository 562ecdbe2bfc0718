//! S4 (§8): an application `send` for an outbound message is encoded and
//! handed to the `TcpSink`, never touching the inbound `NodeSink`.

use heapless::Vec as HVec;

use meshnode_t01::mailbox::Mailbox;
use meshnode_t01::mesh::types::{NodeCommand, NodeMessage, TemperatureUpdate};

use crate::fakes::{RecordingNodeSink, RecordingTcpSink};

#[test]
fn outbound_temperature_relayed() {
    let mailbox = Mailbox::new(1);
    let mut node_sink = RecordingNodeSink::default();
    let mut tcp_sink = RecordingTcpSink::default();

    let mut destinations = HVec::new();
    destinations.push(99).unwrap();
    mailbox
        .send(NodeMessage {
            source: 1,
            destinations,
            command: NodeCommand::UpdateTemperature(TemperatureUpdate {
                pressure_hpa: 1013,
                humidity_pct: 42,
                temp_c: 21.3,
            }),
        })
        .unwrap();
    mailbox.step(&mut node_sink, &mut tcp_sink);

    assert!(node_sink.received.is_empty());
    assert_eq!(tcp_sink.sent.len(), 1);
    let text = core::str::from_utf8(tcp_sink.sent[0].as_bytes()).unwrap();
    assert!(text.contains(r#""src_id":1"#));
    assert!(text.contains(r#""dst_id":[99]"#));
    assert!(text.contains(r#""cmd_id":4"#));
    assert!(text.contains(r#""pres_hpa":1013"#));
    assert!(text.contains(r#""hum_pct":42"#));
    assert!(text.contains(r#""temp_c":21.3"#));
}
