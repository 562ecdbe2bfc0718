//! S3 (§8): an inbound TCP frame addressed to this node is decoded and
//! routed to the application's `NodeSink`, never touching the outbound
//! `TcpSink`.

use meshnode_t01::mailbox::Mailbox;
use meshnode_t01::mesh::types::{NodeCommand, TcpFrame};

use crate::fakes::{RecordingNodeSink, RecordingTcpSink};

#[test]
fn inbound_set_mode_routed() {
    let mailbox = Mailbox::new(1);
    let mut node_sink = RecordingNodeSink::default();
    let mut tcp_sink = RecordingTcpSink::default();

    let frame = TcpFrame::new(br#"{"src_id":99,"dst_id":[1],"cmd_id":1,"data":{"value_id":7}}"#)
        .unwrap();
    mailbox.receive_tcp(&frame).unwrap();
    mailbox.step(&mut node_sink, &mut tcp_sink);

    assert!(tcp_sink.sent.is_empty());
    assert_eq!(node_sink.received.len(), 1);
    let msg = &node_sink.received[0];
    assert_eq!(msg.source, 99);
    assert_eq!(msg.command, NodeCommand::SetMode(7));
}
