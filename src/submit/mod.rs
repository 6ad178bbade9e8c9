pub mod traits;
pub mod types;
pub mod workflow;

pub use traits::{LogNotifier, Navigator, Notifier};
pub use types::{
    Notification, NotificationLevel, SubmitOutcome, SubmitState, LISTINGS_ROUTE, SUCCESS_MESSAGE,
};
pub use workflow::SubmissionWorkflow;
