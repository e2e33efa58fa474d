//! In-process domain events. Mutating service operations publish
//! best-effort events onto a bounded channel; a background task drains the
//! channel and logs them. Nothing downstream consumes these yet, so
//! delivery failures are logged and never block the request path.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CategoryCreated(Uuid),
    SubcategoryCreated(Uuid),
    ProductCreated(Uuid),
    ProductImageAdded {
        product_id: Uuid,
        image_id: Uuid,
    },
    PrimaryImageChanged {
        product_id: Uuid,
        image_id: Uuid,
    },
    ReviewSubmitted {
        product_id: Uuid,
        review_id: Uuid,
        rating: i32,
    },
    ReviewsModerated {
        approved: bool,
        count: u64,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, failing if the channel is closed or full.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Best-effort publish: delivery failure is logged, never propagated.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(err) = self.send(event).await {
            warn!("Dropping domain event: {}", err);
        }
    }
}

/// Drains the event channel, logging each event. Runs until every sender
/// is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        info!(?event, "Received event");
    }

    info!("Event channel closed; stopping event processing loop");
}
