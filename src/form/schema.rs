//! Listing validation schema.
//!
//! Takes a loosely-typed JSON document (what the form holds, or what arrives at
//! the endpoint) and either produces a typed [`Listing`] or a [`FieldErrors`]
//! map keyed by dotted path. Every problem in the document is reported, not
//! just the first.
//!
//! Two passes run over the document. Coercion reads the raw JSON into a
//! `Listing`, reporting missing fields, wrong types and closed-set violations:
//! - numeric strings become numbers (`"500000"` -> `500000.0`)
//! - missing, `null` and empty optional strings become `None`
//! - `show` defaults to `true`
//! - `rentFrequency` is required for `for-rent` and dropped for `for-sale`
//!
//! The field rules declared on the model (lengths, ranges, URLs, the slug
//! pattern) then run through [`Validate`]. A path keeps the first message
//! recorded for it, so a missing field reports `Required` rather than a
//! length or range violation of its placeholder value.

use crate::error::FieldErrors;
use crate::models::{
    Agency, ClosedSet, Coordinates, CoverPhoto, Listing, Location, Photo, PropertyType, Purpose,
    RentFrequency, State, SubmissionPayload,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

const REQUIRED: &str = "Required";

/// Validate a full form document, including the admin pass-phrase
pub fn validate(document: &Value) -> Result<SubmissionPayload, FieldErrors> {
    let mut errors = FieldErrors::new();
    let listing = coerce_listing(document, &mut errors);
    let root = Scope::root(document, &mut errors);
    let password = root.raw("password").map(|_| root.string("password", &mut errors));
    if password.is_none() {
        errors.insert("password", REQUIRED);
    }

    if errors.is_empty() {
        Ok(SubmissionPayload {
            listing,
            password: password.unwrap_or_default(),
        })
    } else {
        Err(errors)
    }
}

/// Validate a listing document on its own (no pass-phrase)
pub fn validate_listing(document: &Value) -> Result<Listing, FieldErrors> {
    let mut errors = FieldErrors::new();
    let listing = coerce_listing(document, &mut errors);
    if errors.is_empty() {
        Ok(listing)
    } else {
        Err(errors)
    }
}

fn coerce_listing(document: &Value, errors: &mut FieldErrors) -> Listing {
    let root = Scope::root(document, errors);

    let purpose = root
        .choice::<Purpose>("purpose", "Purpose is required", errors)
        .unwrap_or_default();
    let rent_frequency = match purpose {
        Purpose::ForRent => {
            let frequency = root.optional_choice::<RentFrequency>("rentFrequency", errors);
            if frequency.is_none() && !errors.contains("rentFrequency") {
                errors.insert("rentFrequency", "Rent frequency is required for rentals");
            }
            frequency
        }
        Purpose::ForSale => None,
    };

    let rooms = root.number("rooms", errors).and_then(|rooms| {
        if rooms.fract() != 0.0 {
            errors.insert("rooms", "Expected integer, received float");
            None
        } else if rooms > f64::from(u32::MAX) {
            errors.insert("rooms", "Number of rooms is too large");
            None
        } else {
            Some(rooms.max(0.0) as u32)
        }
    });

    let listing = Listing {
        id: root.raw("_id").and_then(Value::as_str).and_then(|id| id.parse().ok()),
        // Empty slugs pass the form: the submission workflow derives one.
        slug: root.optional_string("slug", errors).unwrap_or_default(),
        title: root.string("title", errors),
        description: root.string("description", errors),
        show: root.boolean("show", true, errors),
        state: root
            .choice::<State>("state", "State is required", errors)
            .unwrap_or_default(),
        purpose,
        property_type: root
            .choice::<PropertyType>("pType", "Property type is required", errors)
            .unwrap_or_default(),
        category: root.string_list("category", errors),
        price: root.number("price", errors).unwrap_or_default(),
        rent_frequency,
        reference_number: root.optional_string("referenceNumber", errors),
        permit_number: root.string("permitNumber", errors).trim().to_string(),
        project_number: root.optional_string("projectNumber", errors),
        nearby: root.string_list("nearby", errors),
        highlights: root.string_list("highlights", errors),
        rooms: rooms.unwrap_or_default(),
        area: root.number("area", errors).unwrap_or_default(),
        location: coerce_location(&root.nested("location", errors), errors),
        coordinates: coerce_coordinates(&root.nested("coordinates", errors), errors),
        agency: coerce_agency(&root.nested("agency", errors), errors),
        cover_photo: coerce_cover_photo(&root.nested("coverPhoto", errors), errors),
        photos: coerce_photos(&root, errors),
        created_at: root.timestamp("createdAt", errors),
        updated_at: root.timestamp("updatedAt", errors),
    };

    if let Err(violations) = listing.validate() {
        let mut rule_errors = FieldErrors::new();
        collect_violations("", &violations, &mut rule_errors);
        if listing.slug.is_empty() {
            rule_errors.remove_prefix("slug");
        }
        for (path, message) in rule_errors.iter() {
            errors.insert(path, message);
        }
    }
    listing
}

/// Flatten validator output into dotted document paths (`photos.1.url`)
fn collect_violations(prefix: &str, report: &ValidationErrors, errors: &mut FieldErrors) {
    for (field, kind) in report.errors() {
        let path = join_path(prefix, &document_key(field));
        match kind {
            ValidationErrorsKind::Field(violations) => {
                if let Some(violation) = violations.first() {
                    let message = match &violation.message {
                        Some(message) => message.to_string(),
                        None => violation.code.to_string(),
                    };
                    errors.insert(path, message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_violations(&path, nested, errors),
            ValidationErrorsKind::List(entries) => {
                for (index, nested) in entries {
                    collect_violations(&format!("{path}.{index}"), nested, errors);
                }
            }
        }
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Struct field name to document key (`cover_photo` -> `coverPhoto`)
fn document_key(field: &str) -> String {
    let mut key = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            key.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            key.push(c);
        }
    }
    key
}

fn coerce_location(scope: &Scope<'_>, errors: &mut FieldErrors) -> Location {
    Location {
        state: scope
            .choice::<State>("state", "State is required", errors)
            .unwrap_or_default(),
        city: scope.optional_string("city", errors),
        pincode: scope.optional_string("pincode", errors),
        street: scope.optional_string("street", errors),
        landmark: scope.optional_string("landmark", errors),
        full: scope.string("full", errors).trim().to_string(),
    }
}

fn coerce_coordinates(scope: &Scope<'_>, errors: &mut FieldErrors) -> Coordinates {
    Coordinates {
        lat: scope.number("lat", errors).unwrap_or_default(),
        lng: scope.number("lng", errors).unwrap_or_default(),
    }
}

fn coerce_agency(scope: &Scope<'_>, errors: &mut FieldErrors) -> Option<Agency> {
    let agency = Agency {
        name: scope.optional_string("name", errors),
        logo: scope.optional_string("logo", errors),
    };
    (agency.name.is_some() || agency.logo.is_some()).then_some(agency)
}

fn coerce_cover_photo(scope: &Scope<'_>, errors: &mut FieldErrors) -> CoverPhoto {
    CoverPhoto {
        url: scope.string("url", errors),
        title: scope.string("title", errors).trim().to_string(),
    }
}

fn coerce_photos(root: &Scope<'_>, errors: &mut FieldErrors) -> Vec<Photo> {
    let entries = match root.raw("photos") {
        None => Vec::new(),
        Some(Value::Array(entries)) => entries.iter().collect(),
        Some(_) => {
            errors.insert("photos", "Expected array");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let scope = root.element("photos", index, entry, errors);
            Photo {
                url: scope.string("url", errors),
                title: scope.string("title", errors).trim().to_string(),
                description: scope.optional_string("description", errors),
            }
        })
        .collect()
}

/// A JSON object being read, together with the dotted path leading to it
struct Scope<'a> {
    fields: Option<&'a Map<String, Value>>,
    prefix: String,
}

impl<'a> Scope<'a> {
    fn root(document: &'a Value, errors: &mut FieldErrors) -> Self {
        let fields = document.as_object();
        if fields.is_none() {
            errors.insert("", "Expected object");
        }
        Self {
            fields,
            prefix: String::new(),
        }
    }

    fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        }
    }

    /// The raw value under `key`, treating `null` as absent
    fn raw(&self, key: &str) -> Option<&'a Value> {
        self.fields
            .and_then(|fields| fields.get(key))
            .filter(|value| !value.is_null())
    }

    /// A child object. Missing objects yield an empty scope so that every
    /// required child reports its own error.
    fn nested(&self, key: &str, errors: &mut FieldErrors) -> Scope<'a> {
        let path = self.path(key);
        let fields = match self.raw(key) {
            None => None,
            Some(Value::Object(fields)) => Some(fields),
            Some(_) => {
                errors.insert(path.clone(), "Expected object");
                None
            }
        };
        Scope {
            fields,
            prefix: path,
        }
    }

    fn element(&self, key: &str, index: usize, entry: &'a Value, errors: &mut FieldErrors) -> Scope<'a> {
        let path = format!("{}.{index}", self.path(key));
        let fields = entry.as_object();
        if fields.is_none() {
            errors.insert(path.clone(), "Expected object");
        }
        Scope {
            fields,
            prefix: path,
        }
    }

    /// Required string. Numbers and booleans are accepted in their text form.
    fn string(&self, key: &str, errors: &mut FieldErrors) -> String {
        match self.raw(key) {
            None => {
                errors.insert(self.path(key), REQUIRED);
                String::new()
            }
            Some(value) => text_of(value).unwrap_or_else(|| {
                errors.insert(self.path(key), "Expected string");
                String::new()
            }),
        }
    }

    fn optional_string(&self, key: &str, errors: &mut FieldErrors) -> Option<String> {
        let value = self.raw(key)?;
        match text_of(value) {
            Some(text) if text.trim().is_empty() => None,
            Some(text) => Some(text),
            None => {
                errors.insert(self.path(key), "Expected string");
                None
            }
        }
    }

    fn string_list(&self, key: &str, errors: &mut FieldErrors) -> Vec<String> {
        match self.raw(key) {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| match item {
                    Value::String(text) => Some(text.clone()),
                    _ => {
                        errors.insert(format!("{}.{index}", self.path(key)), "Expected string");
                        None
                    }
                })
                .collect(),
            Some(_) => {
                errors.insert(self.path(key), "Expected array");
                Vec::new()
            }
        }
    }

    /// Required number, coercing numeric strings
    fn number(&self, key: &str, errors: &mut FieldErrors) -> Option<f64> {
        let parsed = match self.raw(key) {
            None => {
                errors.insert(self.path(key), REQUIRED);
                return None;
            }
            Some(Value::Number(number)) => number.as_f64(),
            Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
            Some(_) => None,
        };
        match parsed {
            Some(number) if number.is_finite() => Some(number),
            _ => {
                errors.insert(self.path(key), "Expected number");
                None
            }
        }
    }

    fn boolean(&self, key: &str, default: bool, errors: &mut FieldErrors) -> bool {
        match self.raw(key) {
            None => default,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => {
                errors.insert(self.path(key), "Expected boolean");
                default
            }
        }
    }

    fn choice<T: ClosedSet>(&self, key: &str, required: &str, errors: &mut FieldErrors) -> Option<T> {
        match self.raw(key) {
            None => {
                errors.insert(self.path(key), required);
                None
            }
            Some(Value::String(text)) if text.is_empty() => {
                errors.insert(self.path(key), required);
                None
            }
            Some(value) => self.parse_choice(key, value, errors),
        }
    }

    fn optional_choice<T: ClosedSet>(&self, key: &str, errors: &mut FieldErrors) -> Option<T> {
        match self.raw(key) {
            Some(Value::String(text)) if text.is_empty() => None,
            Some(value) => self.parse_choice(key, value, errors),
            None => None,
        }
    }

    fn parse_choice<T: ClosedSet>(&self, key: &str, value: &Value, errors: &mut FieldErrors) -> Option<T> {
        let received = value.as_str().map_or_else(|| value.to_string(), str::to_string);
        let parsed = value.as_str().and_then(T::parse);
        if parsed.is_none() {
            errors.insert(
                self.path(key),
                format!(
                    "Invalid enum value. Expected {}, received '{received}'",
                    T::expected()
                ),
            );
        }
        parsed
    }

    fn timestamp(&self, key: &str, errors: &mut FieldErrors) -> Option<DateTime<Utc>> {
        let value = self.raw(key)?;
        let parsed = value
            .as_str()
            .and_then(|text| DateTime::parse_from_rfc3339(text).ok())
            .map(|stamp| stamp.with_timezone(&Utc));
        if parsed.is_none() {
            errors.insert(self.path(key), "Invalid date");
        }
        parsed
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
