//! Node Mailbox (§4.2) — bidirectional router between the application layer
//! and the TCP client.
//!
//! A bounded pool of 8 pre-allocated [`NodeMessage`] slots decouples
//! producers from consumers: every slot lives in exactly one of `free_q` or
//! `work_q` at all times (§3 invariant; §8 property 1). `free_q` starts
//! full, `work_q` starts empty. This single pool, shared by both directions,
//! is what gives the system its back-pressure — at most 8 in-flight
//! messages, producers block rather than allocate (§4.2 rationale).
//!
//! Sizing and the "bounded queue of pointers to pre-allocated slots" shape
//! are grounded on this codebase's `rpc::channels` static-channel pattern;
//! the backing primitive here is a condvar-guarded deque rather than an
//! async channel because the mailbox's task loop is a synchronous blocking
//! loop, not an async task (see DESIGN.md).

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::error::{Error, MailboxError};
use crate::mesh::{
    json,
    types::{NodeMessage, TcpFrame},
};
use crate::ports::{FrameSink, NodeSink, TcpSink};

/// Capacity of both `free_q` and `work_q` (§4.2, §5).
pub const POOL_CAPACITY: usize = 8;

/// Bounded wait for `send`/`receive_tcp` to acquire a free slot (§4.2).
const SEND_TIMEOUT: Duration = Duration::from_millis(100);

/// A single pre-allocated message slot, identified by index into the pool.
type Slot = usize;

struct PoolInner {
    free: VecDeque<Slot>,
    work: VecDeque<Slot>,
}

/// The message pool: 8 slots of storage plus the two queues that track
/// which slot is where. `storage[i]` is valid only while `i` is not present
/// in `free` (i.e. it is in `work` or has been taken by the task loop).
struct Pool {
    storage: Mutex<[Option<NodeMessage>; POOL_CAPACITY]>,
    queues: Mutex<PoolInner>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl Pool {
    fn new() -> Self {
        let mut free = VecDeque::with_capacity(POOL_CAPACITY);
        for i in 0..POOL_CAPACITY {
            free.push_back(i);
        }
        Self {
            storage: Mutex::new(core::array::from_fn(|_| None)),
            queues: Mutex::new(PoolInner {
                free,
                work: VecDeque::new(),
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Borrow a free slot (bounded wait), copy `msg` into it, and enqueue it
    /// onto `work_q`. Shared implementation for `send` and `receive_tcp`.
    fn enqueue(&self, msg: NodeMessage, timeout: Duration) -> Result<(), Error> {
        let guard = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        let (mut guard, timed_out) = self
            .not_full
            .wait_timeout_while(guard, timeout, |q| q.free.is_empty())
            .unwrap_or_else(|e| e.into_inner());
        if timed_out.timed_out() && guard.free.is_empty() {
            return Err(Error::Mailbox(MailboxError::QueueFull));
        }
        let slot = guard.free.pop_front().ok_or(Error::Mailbox(MailboxError::QueueFull))?;
        self.storage.lock().unwrap_or_else(|e| e.into_inner())[slot] = Some(msg);
        guard.work.push_back(slot);
        drop(guard);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Unbounded wait for a slot on `work_q`, returning the message and its
    /// slot index (the caller must return the slot via [`Pool::release`]).
    fn dequeue(&self) -> (NodeMessage, Slot) {
        let guard = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        let mut guard = self
            .not_empty
            .wait_while(guard, |q| q.work.is_empty())
            .unwrap_or_else(|e| e.into_inner());
        let slot = guard.work.pop_front().expect("work_q non-empty by wait");
        drop(guard);
        let msg = self.storage.lock().unwrap_or_else(|e| e.into_inner())[slot]
            .take()
            .expect("slot storage populated while owned by work_q");
        (msg, slot)
    }

    fn release(&self, slot: Slot) {
        let mut guard = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        guard.free.push_back(slot);
        drop(guard);
        self.not_full.notify_one();
    }
}

/// The Node Mailbox.
///
/// `self_id` decides routing direction in the task loop: `source == self_id`
/// is outbound (serialise, hand to the [`TcpSink`]); anything else is
/// inbound (deliver to the [`NodeSink`]). This is the explicit rule stated
/// in SPEC_FULL.md §4.2 — the reference C implementation inverts it, which
/// is treated as exactly the "possibly-buggy source behaviour" its own
/// design notes flag elsewhere, not as an authoritative tie-breaker (see
/// DESIGN.md).
pub struct Mailbox {
    self_id: u8,
    pool: Pool,
}

impl Mailbox {
    pub fn new(self_id: u8) -> Self {
        Self {
            self_id,
            pool: Pool::new(),
        }
    }

    /// Submit a message for routing. Dequeues a `free_q` slot with a 100 ms
    /// bounded wait; on timeout returns [`Error::Mailbox`] wrapping
    /// [`MailboxError::QueueFull`] (§4.2, §8 S6).
    pub fn send(&self, msg: NodeMessage) -> Result<(), Error> {
        self.pool.enqueue(msg, SEND_TIMEOUT)
    }

    /// Deliver a frame received from the TCP client. Deserialises it; if
    /// the destinations don't include `self_id`, drops it silently (§4.2,
    /// §8 property 3 — no slot is consumed in that case).
    pub fn receive_tcp(&self, frame: &TcpFrame) -> Result<(), Error> {
        let msg = json::decode(frame, self.self_id)?;
        if !msg.contains_destination(self.self_id) {
            return Ok(());
        }
        self.pool.enqueue(msg, SEND_TIMEOUT)
    }

    /// Run the mailbox task loop forever: dequeue from `work_q` (unbounded
    /// wait), route by direction, return the slot to `free_q`. Intended to
    /// run on its own thread (priority 2, §2).
    pub fn run(&self, node_sink: &mut impl NodeSink, tcp_sink: &mut impl TcpSink) -> ! {
        loop {
            self.step(node_sink, tcp_sink);
        }
    }

    /// One iteration of the task loop, exposed separately so tests can drive
    /// it deterministically instead of looping forever.
    pub fn step(&self, node_sink: &mut impl NodeSink, tcp_sink: &mut impl TcpSink) {
        let (msg, slot) = self.pool.dequeue();
        if msg.source == self.self_id {
            if let Ok(frame) = json::encode(&msg) {
                let _ = tcp_sink.transmit(&frame);
            } else {
                log::warn!("mailbox: outbound message failed to encode, dropping");
            }
        } else {
            node_sink.deliver(&msg);
        }
        self.pool.release(slot);
    }
}

impl FrameSink for Mailbox {
    /// Entry point the TCP client uses to hand over a received frame.
    /// `QueueFull`/`ProtocolMalformed` are logged, not propagated — the TCP
    /// client has no useful recovery action for either.
    fn deliver_frame(&self, frame: &TcpFrame) {
        if let Err(e) = self.receive_tcp(frame) {
            log::warn!("mailbox: dropping inbound frame: {e}");
        }
    }
}

impl FrameSink for std::sync::Arc<Mailbox> {
    /// Lets the TCP client hold a shared handle to the mailbox (it runs on
    /// its own thread) without needing `Mailbox` itself to be `Clone`.
    fn deliver_frame(&self, frame: &TcpFrame) {
        (**self).deliver_frame(frame);
    }
}
