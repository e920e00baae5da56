//! Batched all-to-all exchange between workers, one small dataflow per channel.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use timely::communication::Allocate;
use timely::dataflow::operators::{Exchange, Input, Inspect, Probe};
use timely::dataflow::{InputHandle, ProbeHandle};
use timely::worker::Worker;
use timely::ExchangeData;

use crate::{ProcId, Time};

type Inbox<T> = Rc<RefCell<VecDeque<Vec<T>>>>;

pub struct ExchangeChannel<T: ExchangeData> {
    input: InputHandle<Time, (ProcId, T)>,
    probe: ProbeHandle<Time>,
    inbox: Inbox<T>,
    peers: usize,
}

impl<T: ExchangeData> ExchangeChannel<T> {
    // Every worker must construct its channels in the same order.
    pub fn new<A: Allocate>(worker: &mut Worker<A>) -> Self {
        let peers = worker.peers();
        let inbox: Inbox<T> = Rc::new(RefCell::new(VecDeque::new()));
        let mut input = InputHandle::new();
        let mut probe = ProbeHandle::new();

        let sink = inbox.clone();
        worker.dataflow::<Time, _, _>(|scope| {
            scope
                .input_from(&mut input)
                .exchange(|&(dest, _): &(ProcId, T)| dest as u64)
                .inspect_batch(move |_time, batch| {
                    if !batch.is_empty() {
                        let records = batch.iter().map(|(_, record)| record.clone()).collect();
                        sink.borrow_mut().push_back(records);
                    }
                })
                .probe_with(&mut probe);
        });

        ExchangeChannel { input, probe, inbox, peers }
    }

    pub fn peers(&self) -> usize {
        self.peers
    }

    pub fn send(&mut self, dest: ProcId, record: T) {
        debug_assert!(dest < self.peers);
        self.input.send((dest, record));
    }

    /// Closes the current epoch and steps until every worker's records from it are in
    /// their inboxes.
    pub fn flush<A: Allocate>(&mut self, worker: &mut Worker<A>) {
        let next = *self.input.time() + 1;
        self.input.advance_to(next);
        while self.probe.less_than(self.input.time()) {
            worker.step();
        }
    }

    pub fn barrier<A: Allocate>(&mut self, worker: &mut Worker<A>) {
        self.flush(worker);
    }

    pub fn recv(&mut self) -> Option<Vec<T>> {
        self.inbox.borrow_mut().pop_front()
    }

    pub fn size(&self) -> usize {
        self.inbox.borrow().iter().map(|batch| batch.len()).sum()
    }

    pub fn clear(&mut self) {
        self.inbox.borrow_mut().clear();
    }
}

/// Cluster-wide summation; every worker observes the same total.
pub struct AllReduce {
    channel: ExchangeChannel<u64>,
}

impl AllReduce {
    pub fn new<A: Allocate>(worker: &mut Worker<A>) -> Self {
        AllReduce { channel: ExchangeChannel::new(worker) }
    }

    pub fn sum<A: Allocate>(&mut self, worker: &mut Worker<A>, value: u64) -> u64 {
        for peer in 0 .. self.channel.peers() {
            self.channel.send(peer, value);
        }
        self.channel.flush(worker);
        let mut total = 0;
        while let Some(batch) = self.channel.recv() {
            total += batch.iter().sum::<u64>();
        }
        total
    }
}
