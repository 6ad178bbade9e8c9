//! Shared fixtures and fakes for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use listing_desk::api::{ListingApi, ListingQuery};
use listing_desk::config::ServerConfig;
use listing_desk::error::ApiError;
use listing_desk::models::{Listing, SubmissionPayload};
use listing_desk::server::ListingServer;
use listing_desk::store::ListingCollection;
use listing_desk::submit::{Navigator, Notification, Notifier};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use uuid::Uuid;

/// A complete for-sale listing document as the form would hold it
pub fn valid_document() -> Value {
    json!({
        "show": true,
        "state": "dubai",
        "purpose": "for-sale",
        "pType": "apartment",
        "price": 500000,
        "rentFrequency": null,
        "permitNumber": "P-1",
        "title": "Luxury Apartment Downtown",
        "description": "Spacious three bedroom apartment with skyline views.",
        "slug": "",
        "category": ["residential"],
        "nearby": ["Metro"],
        "location": { "state": "dubai", "full": "Downtown Dubai, Boulevard" },
        "coordinates": { "lat": 25.19, "lng": 55.27 },
        "coverPhoto": { "url": "https://images.example.com/cover.jpg", "title": "Front" },
        "photos": [
            { "url": "https://images.example.com/living.jpg", "title": "Living room" }
        ],
        "rooms": 3,
        "area": 1200,
        "password": "secret"
    })
}

/// The same document as a yearly rental
pub fn rental_document() -> Value {
    let mut document = valid_document();
    document["purpose"] = json!("for-rent");
    document["rentFrequency"] = json!("yearly");
    document["title"] = json!("Marina Loft With Terrace");
    document["price"] = json!(85000);
    document
}

/// What the fake endpoint answers with
#[derive(Debug, Clone)]
pub enum Reply {
    Created,
    Rejected { status: u16, message: Option<String> },
}

/// Listing endpoint double that records every payload it receives
pub struct FakeApi {
    reply: Mutex<Reply>,
    calls: Mutex<Vec<SubmissionPayload>>,
    /// Signalled when a create request arrives
    pub entered: Notify,
    /// When set, create requests wait for this before answering
    hold: Option<Notify>,
}

impl FakeApi {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply: Mutex::new(reply),
            calls: Mutex::new(Vec::new()),
            entered: Notify::new(),
            hold: None,
        }
    }

    /// An endpoint that holds every request until [`FakeApi::release`]
    pub fn held(reply: Reply) -> Self {
        Self {
            hold: Some(Notify::new()),
            ..Self::new(reply)
        }
    }

    pub fn release(&self) {
        if let Some(hold) = &self.hold {
            hold.notify_one();
        }
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> Vec<SubmissionPayload> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ListingApi for FakeApi {
    async fn create(&self, payload: &SubmissionPayload) -> Result<Listing, ApiError> {
        self.calls.lock().unwrap().push(payload.clone());
        self.entered.notify_one();
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }

        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Reply::Created => {
                let mut listing = payload.listing.clone();
                listing.id = Some(Uuid::new_v4());
                Ok(listing)
            }
            Reply::Rejected { status, message } => Err(ApiError::Rejected { status, message }),
        }
    }

    async fn list(&self, _query: &ListingQuery) -> Result<Vec<Listing>, ApiError> {
        Ok(Vec::new())
    }

    fn endpoint_name(&self) -> &str {
        "fake"
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
    refreshes: AtomicUsize,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }

    fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Start a listing endpoint on an ephemeral port and return its base URL
pub async fn spawn_server(admin_password: Option<&str>) -> (String, ListingCollection) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let collection = ListingCollection::new();
    let config = ServerConfig {
        admin_password: admin_password.map(str::to_string),
        ..ServerConfig::default()
    };
    let server = ListingServer::new(config, collection.clone());
    tokio::spawn(server.run(listener));
    (format!("http://{addr}"), collection)
}
