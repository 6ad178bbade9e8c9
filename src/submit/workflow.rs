//! Add-listing submission workflow.
//!
//! ```text
//! Idle -> Validating -> Invalid -> Idle
//!                    -> Submitting -> Redirected
//!                                  -> Idle (request failed)
//! ```
//!
//! One submission is in flight at a time. A trigger that arrives while one is
//! running is ignored. Every failure leaves the form exactly as the user left
//! it, apart from the derived slug and timestamps which are kept for retries.

use crate::api::ListingApi;
use crate::form::slug::{check_slug, derive_slug};
use crate::form::FormStore;
use crate::submit::traits::{Navigator, Notifier};
use crate::submit::types::{
    Notification, SubmitOutcome, SubmitState, LISTINGS_ROUTE, SUCCESS_MESSAGE,
};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

pub struct SubmissionWorkflow<A, N, R> {
    api: A,
    notifier: N,
    navigator: R,
    busy: AtomicBool,
    state: Mutex<SubmitState>,
}

impl<A, N, R> SubmissionWorkflow<A, N, R>
where
    A: ListingApi,
    N: Notifier,
    R: Navigator,
{
    pub fn new(api: A, notifier: N, navigator: R) -> Self {
        Self {
            api,
            notifier,
            navigator,
            busy: AtomicBool::new(false),
            state: Mutex::new(SubmitState::Idle),
        }
    }

    pub fn state(&self) -> SubmitState {
        *self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn navigator(&self) -> &R {
        &self.navigator
    }

    /// Validate the form and, when it passes, send it to the listing endpoint
    pub async fn submit(&self, form: &mut FormStore) -> SubmitOutcome {
        if self.busy.swap(true, Ordering::AcqRel) {
            debug!("Submission already in flight, ignoring trigger");
            return SubmitOutcome::Ignored;
        }
        let _in_flight = InFlight {
            busy: &self.busy,
            state: &self.state,
        };

        self.transition(SubmitState::Validating);
        let mut payload = match form.validate() {
            Ok(payload) => payload,
            Err(errors) => {
                info!("Listing failed validation with {} errors", errors.len());
                self.transition(SubmitState::Idle);
                return SubmitOutcome::Invalid(errors);
            }
        };

        if payload.listing.slug.is_empty() {
            let slug = derive_slug(&payload.listing.title);
            if let Err(message) = check_slug(&slug) {
                let message = if slug.is_empty() {
                    "Slug could not be derived from the title"
                } else {
                    message
                };
                form.set_error("slug", message);
                self.transition(SubmitState::Idle);
                return SubmitOutcome::Invalid(form.errors().clone());
            }
            debug!("Derived slug '{}'", slug);
            if let Err(err) = form.set("slug", json!(slug)) {
                warn!("Could not store derived slug on the form: {}", err);
            }
            payload.listing.slug = slug;
        }

        let now = Utc::now();
        payload.listing.updated_at = Some(now);
        let created_at = *payload.listing.created_at.get_or_insert(now);
        for (path, stamp) in [("createdAt", created_at), ("updatedAt", now)] {
            let stamp = stamp.to_rfc3339_opts(SecondsFormat::Millis, true);
            if let Err(err) = form.set(path, json!(stamp)) {
                warn!("Could not store {} on the form: {}", path, err);
            }
        }

        self.transition(SubmitState::Submitting);
        info!(
            "Submitting listing '{}' to {}",
            payload.listing.slug,
            self.api.endpoint_name()
        );

        match self.api.create(&payload).await {
            Ok(listing) => {
                self.notifier.notify(Notification::success(SUCCESS_MESSAGE));
                self.navigator.navigate(LISTINGS_ROUTE);
                self.navigator.refresh();
                self.transition(SubmitState::Redirected);
                SubmitOutcome::Created(listing)
            }
            Err(err) => {
                error!("Error adding listing: {}", err);
                let message = err.user_message();
                self.notifier.notify(Notification::error(message.clone()));
                self.transition(SubmitState::Idle);
                SubmitOutcome::Failed(message)
            }
        }
    }

    fn transition(&self, next: SubmitState) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        debug!("Submission state {:?} -> {:?}", *state, next);
        *state = next;
    }
}

/// Clears the busy flag when the submission ends, including when its future
/// is dropped mid-request.
struct InFlight<'a> {
    busy: &'a AtomicBool,
    state: &'a Mutex<SubmitState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if matches!(*state, SubmitState::Validating | SubmitState::Submitting) {
            *state = SubmitState::Idle;
        }
        self.busy.store(false, Ordering::Release);
    }
}
