use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// One event channel with its subscriber. Created from a hook closure by [`crate::events::EventHandlers`].
pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Runs the receive loop until every producer has been dropped, then waits for in-flight handler jobs to finish.
    /// Jobs run concurrently; nothing about their completion order is guaranteed.
    pub async fn start_handler(mut self) {
        debug!("📨️ Starting event handler");
        // The internal sender must go, otherwise the loop below never sees the channel close.
        drop(self.sender);
        let mut jobs: JoinSet<()> = JoinSet::new();
        loop {
            tokio::select! {
                next = self.listener.recv() => match next {
                    Some(ev) => {
                        trace!("📨️ Event received");
                        let handler = Arc::clone(&self.handler);
                        jobs.spawn((handler)(ev));
                    },
                    None => break,
                },
                Some(finished) = jobs.join_next(), if !jobs.is_empty() => {
                    if let Err(e) = finished {
                        warn!("📨️ Event handler job failed: {e}");
                    }
                },
            }
        }
        while let Some(finished) = jobs.join_next().await {
            if let Err(e) = finished {
                warn!("📨️ Event handler job failed: {e}");
            }
        }
        debug!("📨️ Event handler has shut down");
    }
}

/// A cloneable sending half of an event channel. Publishing never blocks settlement flows beyond the channel buffer,
/// and a send failure is logged rather than propagated.
#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📨️ Failed to publish event: {e}");
        }
    }
}
