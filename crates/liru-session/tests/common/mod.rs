//! Scripted fake transport shared by session tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use liru_core::error::TransportFault;
use liru_core::timing::ManualClock;
use liru_core::{
    FrameSize, NativeHandle, ReceiverTransport, RemoteFrame, SenderTransport, TextureFormat,
    TransportResult,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Publish(String, FrameSize),
    CopyOut(u64, FrameSize),
    Release,
    SelectTarget(String),
    CopyIn(u64),
    IsUpdated,
    QuerySender,
    ListPublishers,
}

#[derive(Default)]
pub struct Script {
    pub calls: Vec<Call>,
    pub publish_result: Option<TransportFault>,
    /// Queued copy-out outcomes; an empty queue means success.
    pub copy_out: VecDeque<TransportResult<()>>,
    /// Queued copy-in outcomes; an empty queue means `NoPublisher`.
    pub copy_in: VecDeque<TransportResult<RemoteFrame>>,
    pub updated: bool,
    /// Answer to `query_sender`.
    pub info: Option<RemoteFrame>,
    pub publishers: Vec<String>,
    /// Simulated duration of each copy.
    pub copy_cost: Duration,
}

impl Script {
    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

/// Fake endpoint implementing both roles. Clones share one script.
#[derive(Clone)]
pub struct ScriptedTransport {
    pub script: Rc<RefCell<Script>>,
    clock: Option<ManualClock>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            script: Rc::new(RefCell::new(Script::default())),
            clock: None,
        }
    }

    /// Copies advance `clock` by `Script::copy_cost`.
    pub fn with_clock(clock: ManualClock) -> Self {
        Self {
            script: Rc::new(RefCell::new(Script::default())),
            clock: Some(clock),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.borrow().calls.clone()
    }

    pub fn transport_calls(&self) -> usize {
        self.script.borrow().calls.len()
    }

    fn spend(&self) {
        if let Some(c) = &self.clock {
            c.advance(self.script.borrow().copy_cost);
        }
    }
}

pub fn frame(name: &str, width: u32, height: u32) -> RemoteFrame {
    RemoteFrame {
        sender_name: name.to_string(),
        size: FrameSize::new(width, height).unwrap(),
    }
}

impl SenderTransport for ScriptedTransport {
    fn publish(&mut self, name: &str, size: FrameSize, _format: TextureFormat) -> TransportResult<()> {
        let mut s = self.script.borrow_mut();
        s.calls.push(Call::Publish(name.to_string(), size));
        match s.publish_result.clone() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }

    fn copy_out(&mut self, handle: NativeHandle, _format: TextureFormat, size: FrameSize) -> TransportResult<()> {
        self.spend();
        let mut s = self.script.borrow_mut();
        s.calls.push(Call::CopyOut(handle.raw(), size));
        s.copy_out.pop_front().unwrap_or(Ok(()))
    }

    fn release(&mut self) {
        self.script.borrow_mut().calls.push(Call::Release);
    }
}

impl ReceiverTransport for ScriptedTransport {
    fn select_target(&mut self, name: &str) {
        self.script.borrow_mut().calls.push(Call::SelectTarget(name.to_string()));
    }

    fn copy_in(&mut self, handle: NativeHandle, _format: TextureFormat) -> TransportResult<RemoteFrame> {
        self.spend();
        let mut s = self.script.borrow_mut();
        s.calls.push(Call::CopyIn(handle.raw()));
        s.copy_in
            .pop_front()
            .unwrap_or(Err(TransportFault::NoPublisher(None)))
    }

    fn is_updated(&self) -> bool {
        let mut s = self.script.borrow_mut();
        s.calls.push(Call::IsUpdated);
        s.updated
    }

    fn query_sender(&self) -> Option<RemoteFrame> {
        let mut s = self.script.borrow_mut();
        s.calls.push(Call::QuerySender);
        s.info.clone()
    }

    fn list_publishers(&self) -> Vec<String> {
        let mut s = self.script.borrow_mut();
        s.calls.push(Call::ListPublishers);
        s.publishers.clone()
    }

    fn release(&mut self) {
        self.script.borrow_mut().calls.push(Call::Release);
    }
}
