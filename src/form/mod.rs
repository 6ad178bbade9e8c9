pub mod fields;
pub mod schema;
pub mod slug;
pub mod store;

pub use fields::{render, visible_fields, FieldView};
pub use schema::{validate, validate_listing};
pub use slug::derive_slug;
pub use store::{FormStore, TagField, UploadTarget};
