use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Domain events emitted by the services.
///
/// Consumers run out-of-band; emitting an event never affects the
/// outcome of the request that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    CustomerCreated(Uuid),
    CustomerUpdated(Uuid),
    CustomerLoggedIn(Uuid),
    CustomerLoggedOut(Uuid),
    OrderCreated(Uuid),
}

/// Cloneable handle for emitting events from services and handlers
#[derive(Clone, Debug)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, logging (not propagating) delivery failures
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            error!("Failed to send event: {}", e);
        }
    }
}

/// Creates the event channel used at startup
pub fn event_channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender::new(tx), rx)
}

/// Background task that drains the event channel
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match event {
            Event::CustomerCreated(id) => debug!(customer_id = %id, "customer created"),
            Event::CustomerUpdated(id) => debug!(customer_id = %id, "customer updated"),
            Event::CustomerLoggedIn(id) => debug!(customer_id = %id, "customer logged in"),
            Event::CustomerLoggedOut(id) => debug!(customer_id = %id, "customer logged out"),
            Event::OrderCreated(id) => info!(order_id = %id, "order created"),
        }
    }
    info!("Event processor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_flow_through_channel() {
        let (sender, mut receiver) = event_channel(8);
        let id = Uuid::new_v4();
        sender.send(Event::OrderCreated(id)).await;
        assert_eq!(receiver.recv().await, Some(Event::OrderCreated(id)));
    }

    #[tokio::test]
    async fn send_survives_closed_receiver() {
        let (sender, receiver) = event_channel(1);
        drop(receiver);
        // must not panic or error out of the call
        sender.send(Event::CustomerCreated(Uuid::new_v4())).await;
    }
}
