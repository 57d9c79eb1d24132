//! Channel pair for handing async results back to the UI thread.
//!
//! Spawned tasks get a cloned sender; the owning screen drains the receiver
//! non-blockingly once per frame.

use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};

pub struct Inbox<T> {
    tx: UnboundedSender<T>,
    rx: UnboundedReceiver<T>,
}

impl<T> Default for Inbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Inbox<T> {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> UnboundedSender<T> {
        self.tx.clone()
    }

    /// Next queued message, if any. Never blocks.
    pub fn next(&mut self) -> Option<T> {
        self.rx.try_next().ok().flatten()
    }

    /// Everything queued right now.
    pub fn drain(&mut self) -> Vec<T> {
        let mut out = Vec::new();
        while let Some(msg) = self.next() {
            out.push(msg);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_arrive_in_order_and_empty_reads_are_none() {
        let mut inbox = Inbox::new();
        assert_eq!(inbox.next(), None::<u32>);

        let tx = inbox.sender();
        tx.unbounded_send(1).unwrap();
        tx.unbounded_send(2).unwrap();
        assert_eq!(inbox.drain(), vec![1, 2]);
        assert_eq!(inbox.next(), None);
    }
}
