//! S6 (§8): with the consumer stalled (the TCP client's step loop not
//! running), the 9th `send` into the full 8-slot pool blocks for the
//! bounded wait and returns `QueueFull`; the first 8 still drain in FIFO
//! order once the consumer resumes.

use heapless::Vec as HVec;

use meshnode_t01::error::{Error, MailboxError};
use meshnode_t01::mailbox::{Mailbox, POOL_CAPACITY};
use meshnode_t01::mesh::types::NodeCommand;
use meshnode_t01::mesh::types::NodeMessage;

use crate::fakes::{RecordingNodeSink, RecordingTcpSink};

fn message(source: u8, tag: u8) -> NodeMessage {
    let mut destinations = HVec::new();
    destinations.push(1).unwrap();
    NodeMessage {
        source,
        destinations,
        command: NodeCommand::SetMode(tag),
    }
}

#[test]
fn ninth_send_blocks_and_times_out_while_first_eight_still_drain_in_order() {
    let mailbox = Mailbox::new(1);

    for tag in 0..POOL_CAPACITY as u8 {
        mailbox.send(message(1, tag)).unwrap();
    }

    let overflow = mailbox.send(message(1, 99));
    assert_eq!(overflow, Err(Error::Mailbox(MailboxError::QueueFull)));

    let mut node_sink = RecordingNodeSink::default();
    let mut tcp_sink = RecordingTcpSink::default();
    for _ in 0..POOL_CAPACITY {
        mailbox.step(&mut node_sink, &mut tcp_sink);
    }

    assert!(node_sink.received.is_empty());
    assert_eq!(tcp_sink.sent.len(), POOL_CAPACITY);
    for (i, frame) in tcp_sink.sent.iter().enumerate() {
        let text = core::str::from_utf8(frame.as_bytes()).unwrap();
        assert!(
            text.contains(&format!(r#""value_id":{i}"#)),
            "frame {i} out of FIFO order: {text}"
        );
    }

    // The pool is fully free again: a send that would have overflowed
    // before now succeeds immediately.
    mailbox.send(message(1, 0)).unwrap();
}
