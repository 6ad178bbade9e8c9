use crate::submit::types::{Notification, NotificationLevel};
use tracing::{error, info};

/// Surface for transient notifications (toasts)
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Page navigation as seen by the submission workflow
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);

    /// Drop cached listing data so the next view refetches it
    fn refresh(&self);
}

/// Notifier that writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => info!("✅ {}", notification.text),
            NotificationLevel::Error => error!("❌ {}", notification.text),
        }
    }
}
