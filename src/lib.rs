//! Add-listing flow for a property listing site: form state and validation,
//! the submission workflow, listing summaries with local favorites, and the
//! listing endpoint those submissions go to.

pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod models;
pub mod server;
pub mod store;
pub mod submit;
pub mod summary;
