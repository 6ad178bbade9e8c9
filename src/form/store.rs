//! Form state store.
//!
//! Holds the add-listing form as a JSON document addressed by dotted paths
//! (`location.city`, `photos.1.title`). Tracks which paths were edited, keeps
//! the error map from the latest validation pass and lets callers watch a
//! path for changes.

use crate::error::{FieldErrors, FormError};
use crate::form::schema;
use crate::models::SubmissionPayload;
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use tokio::sync::watch;
use tracing::debug;

/// Free-text arrays that behave like sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Nearby,
    Highlights,
    Category,
}

impl TagField {
    pub fn key(self) -> &'static str {
        match self {
            TagField::Nearby => "nearby",
            TagField::Highlights => "highlights",
            TagField::Category => "category",
        }
    }
}

/// Where an uploaded image URL should land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    Cover,
    Photo(usize),
}

/// Initial values of a blank add-listing form
pub fn default_values() -> Value {
    json!({
        "show": true,
        "state": "",
        "purpose": "for-sale",
        "pType": "apartment",
        "price": 0,
        "rentFrequency": null,
        "nearby": [],
        "highlights": [],
        "category": [],
        "location": { "state": "", "full": "" },
        "coordinates": { "lat": 0, "lng": 0 },
        "coverPhoto": { "url": "", "title": "" },
        "photos": [],
        "rooms": 1,
        "area": 0
    })
}

pub struct FormStore {
    values: Value,
    dirty: BTreeSet<String>,
    errors: FieldErrors,
    watchers: Vec<(String, watch::Sender<Value>)>,
    /// Set after the first validation pass; later edits re-validate
    submitted: bool,
}

impl FormStore {
    /// Create a blank form
    pub fn new() -> Self {
        Self {
            values: default_values(),
            dirty: BTreeSet::new(),
            errors: FieldErrors::new(),
            watchers: Vec::new(),
            submitted: false,
        }
    }

    /// Create a form pre-filled with `values` layered over the defaults
    pub fn from_values(values: Value) -> Self {
        let mut store = Self::new();
        merge(&mut store.values, values);
        store
    }

    pub fn values(&self) -> &Value {
        &self.values
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.values, |current, segment| match current {
            Value::Object(fields) => fields.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// String value at `path`, empty when absent or not a string
    pub fn get_str(&self, path: &str) -> &str {
        self.get(path).and_then(Value::as_str).unwrap_or_default()
    }

    /// Update a single field. Intermediate objects are created as needed and
    /// an array index equal to the array length appends. A failed update
    /// leaves the values untouched.
    pub fn set(&mut self, path: &str, value: Value) -> Result<(), FormError> {
        let mut updated = self.values.clone();
        *slot_mut(&mut updated, path)? = value;
        self.values = updated;
        self.touch(path);
        Ok(())
    }

    pub fn is_dirty(&self, path: &str) -> bool {
        self.dirty.contains(path)
    }

    pub fn dirty_fields(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, path: &str) -> Option<&str> {
        self.errors.get(path)
    }

    /// Attach an error that did not come from the schema
    pub fn set_error(&mut self, path: &str, message: &str) {
        self.errors.insert(path, message);
    }

    /// Run the schema against the current values and refresh the error map
    pub fn validate(&mut self) -> Result<SubmissionPayload, FieldErrors> {
        self.submitted = true;
        let result = schema::validate(&self.values);
        self.errors = match &result {
            Ok(_) => FieldErrors::new(),
            Err(errors) => errors.clone(),
        };
        result
    }

    /// Subscribe to changes of `path`. Any set on the path itself, a parent or
    /// a child publishes the new value.
    pub fn watch(&mut self, path: &str) -> watch::Receiver<Value> {
        let current = self.get(path).cloned().unwrap_or(Value::Null);
        let (sender, receiver) = watch::channel(current);
        self.watchers.push((path.to_string(), sender));
        receiver
    }

    pub fn tags(&self, field: TagField) -> Vec<String> {
        self.get(field.key())
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Append `value` unless it is empty or already present. Returns whether
    /// the array changed.
    pub fn append_unique(&mut self, field: TagField, value: &str) -> bool {
        let mut tags = self.tags(field);
        if value.is_empty() || tags.iter().any(|tag| tag == value) {
            return false;
        }
        tags.push(value.to_string());
        self.put(field.key(), json!(tags));
        true
    }

    pub fn remove_value(&mut self, field: TagField, value: &str) -> bool {
        let mut tags = self.tags(field);
        let before = tags.len();
        tags.retain(|tag| tag != value);
        if tags.len() == before {
            return false;
        }
        self.put(field.key(), json!(tags));
        true
    }

    pub fn photo_count(&self) -> usize {
        self.get("photos").and_then(Value::as_array).map_or(0, Vec::len)
    }

    /// Append a blank photo entry and return its index
    pub fn add_photo(&mut self) -> usize {
        let mut photos = self.photos();
        photos.push(json!({ "url": "", "title": "", "description": "" }));
        let index = photos.len() - 1;
        self.put("photos", Value::Array(photos));
        index
    }

    /// Remove the photo at `index`; later entries shift down by one
    pub fn remove_photo(&mut self, index: usize) -> Result<(), FormError> {
        let mut photos = self.photos();
        if index >= photos.len() {
            return Err(FormError::IndexOutOfBounds {
                path: "photos".to_string(),
                index,
                len: photos.len(),
            });
        }
        photos.remove(index);
        self.errors.remove_prefix("photos");
        self.put("photos", Value::Array(photos));
        Ok(())
    }

    /// Image upload callback: store the hosted URL on the cover or a photo
    pub fn on_upload(&mut self, target: UploadTarget, url: &str) -> Result<(), FormError> {
        match target {
            UploadTarget::Cover => self.set("coverPhoto.url", json!(url)),
            UploadTarget::Photo(index) => {
                let len = self.photo_count();
                if index >= len {
                    return Err(FormError::IndexOutOfBounds {
                        path: "photos".to_string(),
                        index,
                        len,
                    });
                }
                self.set(&format!("photos.{index}.url"), json!(url))
            }
        }
    }

    /// Back to a blank form. Watchers stay subscribed and see the reset.
    pub fn reset(&mut self) {
        self.values = default_values();
        self.dirty.clear();
        self.errors = FieldErrors::new();
        self.submitted = false;
        let paths: Vec<String> = self.watchers.iter().map(|(path, _)| path.clone()).collect();
        for path in paths {
            self.publish(&path);
        }
    }

    fn photos(&self) -> Vec<Value> {
        self.get("photos")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }

    /// Replace a top-level field
    fn put(&mut self, key: &str, value: Value) {
        if let Value::Object(fields) = &mut self.values {
            fields.insert(key.to_string(), value);
        }
        self.touch(key);
    }

    fn touch(&mut self, path: &str) {
        self.dirty.insert(path.to_string());
        self.publish(path);
        if self.submitted {
            self.errors = match schema::validate(&self.values) {
                Ok(_) => FieldErrors::new(),
                Err(errors) => errors,
            };
        }
    }

    fn publish(&mut self, changed: &str) {
        self.watchers.retain(|(_, sender)| !sender.is_closed());
        for (path, sender) in &self.watchers {
            if related(path, changed) {
                let current = self.values_at(path);
                debug!(path = %path, "Publishing form change");
                sender.send_replace(current);
            }
        }
    }

    fn values_at(&self, path: &str) -> Value {
        self.get(path).cloned().unwrap_or(Value::Null)
    }
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new()
    }
}

/// True when one path equals or contains the other
fn related(a: &str, b: &str) -> bool {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    long == short || long.starts_with(&format!("{short}."))
}

fn slot_mut<'v>(root: &'v mut Value, path: &str) -> Result<&'v mut Value, FormError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(FormError::InvalidPath(path.to_string()));
    }

    let mut current = root;
    for (depth, segment) in segments.iter().enumerate() {
        current = match current {
            Value::Object(fields) => fields.entry(segment.to_string()).or_insert(Value::Null),
            Value::Array(items) => {
                let index: usize = segment
                    .parse()
                    .map_err(|_| FormError::InvalidPath(path.to_string()))?;
                let len = items.len();
                if index > len {
                    return Err(FormError::IndexOutOfBounds {
                        path: segments[..depth].join("."),
                        index,
                        len,
                    });
                }
                if index == len {
                    items.push(Value::Null);
                }
                &mut items[index]
            }
            _ => return Err(FormError::InvalidPath(path.to_string())),
        };

        if let Some(next) = segments.get(depth + 1) {
            if current.is_null() {
                *current = if next.parse::<usize>().is_ok() {
                    Value::Array(Vec::new())
                } else {
                    Value::Object(Map::new())
                };
            }
        }
    }
    Ok(current)
}

/// Layer `overrides` onto `base`, merging objects key by key
fn merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base_fields), Value::Object(override_fields)) => {
            for (key, value) in override_fields {
                match base_fields.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_fields.insert(key, value);
                    }
                }
            }
        }
        (base, value) => *base = value,
    }
}
