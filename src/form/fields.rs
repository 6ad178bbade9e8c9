//! Field renderer: maps form field paths to input widgets and shows the
//! current value together with its validation message.

use crate::form::store::FormStore;
use crate::models::{ClosedSet, PropertyType, Purpose, RentFrequency, State};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Widget {
    Text,
    TextArea,
    Number,
    Url,
    Password,
    Switch,
    Tags,
    Select(&'static [(&'static str, &'static str)]),
}

/// Static description of one form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Path with array indices replaced by `*`
    pub path: &'static str,
    pub label: &'static str,
    pub widget: Widget,
    pub placeholder: Option<&'static str>,
    pub description: Option<&'static str>,
}

fn field(path: &'static str, label: &'static str, widget: Widget) -> FieldSpec {
    FieldSpec {
        path,
        label,
        widget,
        placeholder: None,
        description: None,
    }
}

impl FieldSpec {
    fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

fn fields() -> [FieldSpec; 28] {
    [
        field("show", "Visibility", Widget::Switch)
            .description("Make this property visible to users"),
        field("purpose", "Purpose", Widget::Select(Purpose::options())),
        field("title", "Property Title", Widget::Text).placeholder("Luxury Apartment in Downtown"),
        field("slug", "Slug", Widget::Text)
            .placeholder("luxury-apartment-downtown")
            .description("URL-friendly name for the property"),
        field("pType", "Property Type", Widget::Select(PropertyType::options())),
        field("state", "Property State", Widget::Select(State::options())),
        field("price", "Price", Widget::Number).placeholder("500000"),
        field("rentFrequency", "Rent Frequency", Widget::Select(RentFrequency::options())),
        field("rooms", "Number of Rooms", Widget::Number).placeholder("3"),
        field("area", "Area (sq ft)", Widget::Number).placeholder("1200"),
        field("permitNumber", "Permit Number", Widget::Text).placeholder("P-12345"),
        field("referenceNumber", "Reference Number", Widget::Text)
            .placeholder("REF-5678")
            .description("Optional"),
        field("projectNumber", "Project Number", Widget::Text)
            .placeholder("PROJ-9012")
            .description("Optional"),
        field("description", "Property Description", Widget::TextArea)
            .placeholder("Describe the property in detail..."),
        field("category", "Categories", Widget::Tags).placeholder("Add category..."),
        field("location.state", "State", Widget::Select(State::options())),
        field("location.city", "City", Widget::Text).placeholder("Dubai Marina"),
        field("location.street", "Street", Widget::Text).placeholder("Al Marsa Street"),
        field("location.landmark", "Landmark", Widget::Text).placeholder("Near Dubai Marina Mall"),
        field("location.pincode", "Pincode", Widget::Text).placeholder("123456"),
        field("location.full", "Full Address", Widget::TextArea)
            .placeholder("Complete address of the property"),
        field("coordinates.lat", "Latitude", Widget::Number),
        field("coordinates.lng", "Longitude", Widget::Number),
        field("nearby", "Nearby Places", Widget::Tags).placeholder("Add nearby place..."),
        field("highlights", "Highlights", Widget::Tags).placeholder("Add highlight..."),
        field("coverPhoto.url", "Cover Photo URL", Widget::Url),
        field("coverPhoto.title", "Cover Photo Title", Widget::Text),
        field("password", "Password", Widget::Password),
    ]
}

const PHOTO_FIELDS: [FieldSpec; 3] = [
    FieldSpec {
        path: "photos.*.url",
        label: "Photo URL",
        widget: Widget::Url,
        placeholder: Some("https://example.com/photo.jpg"),
        description: None,
    },
    FieldSpec {
        path: "photos.*.title",
        label: "Photo Title",
        widget: Widget::Text,
        placeholder: None,
        description: None,
    },
    FieldSpec {
        path: "photos.*.description",
        label: "Photo Description",
        widget: Widget::TextArea,
        placeholder: None,
        description: None,
    },
];

/// Replace numeric path segments with `*`
pub fn normalize_path(path: &str) -> String {
    path.split('.')
        .map(|segment| {
            if segment.parse::<usize>().is_ok() {
                "*"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Look up the descriptor for a field path (indices allowed)
pub fn field_spec(path: &str) -> Option<FieldSpec> {
    let normalized = normalize_path(path);
    fields()
        .into_iter()
        .chain(PHOTO_FIELDS)
        .find(|spec| spec.path == normalized)
}

/// Field paths currently shown by the form, in display order.
///
/// Rent frequency only appears for rentals; each photo entry contributes its
/// own group of fields after the cover photo.
pub fn visible_fields(form: &FormStore) -> Vec<String> {
    let renting = form.get_str("purpose") == Purpose::ForRent.as_str();
    let mut paths: Vec<String> = Vec::new();
    for spec in fields() {
        if spec.path == "rentFrequency" && !renting {
            continue;
        }
        if spec.path == "password" {
            for index in 0..form.photo_count() {
                for photo_field in PHOTO_FIELDS {
                    paths.push(photo_field.path.replace('*', &index.to_string()));
                }
            }
        }
        paths.push(spec.path.to_string());
    }
    paths
}

/// A field ready for display
#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub path: String,
    pub label: String,
    pub widget: Widget,
    pub value: String,
    pub placeholder: Option<&'static str>,
    pub description: Option<&'static str>,
    pub error: Option<String>,
}

/// Render the field at `path` from the form's current state
pub fn render(form: &FormStore, path: &str) -> Option<FieldView> {
    let spec = field_spec(path)?;
    let label = match photo_index(path) {
        Some(index) => format!("{} {}", spec.label, index + 1),
        None => spec.label.to_string(),
    };
    let value = form.get(path).map(|value| display_value(spec.widget, value)).unwrap_or_default();

    Some(FieldView {
        path: path.to_string(),
        label,
        widget: spec.widget,
        value,
        placeholder: spec.placeholder,
        description: spec.description,
        error: form.error(path).map(str::to_string),
    })
}

fn photo_index(path: &str) -> Option<usize> {
    let mut segments = path.split('.');
    match (segments.next(), segments.next()) {
        (Some("photos"), Some(index)) => index.parse().ok(),
        _ => None,
    }
}

fn display_value(widget: Widget, value: &Value) -> String {
    match (widget, value) {
        (_, Value::Null) => String::new(),
        (Widget::Password, _) => "********".to_string(),
        (Widget::Switch, Value::Bool(true)) => "on".to_string(),
        (Widget::Switch, Value::Bool(false)) => "off".to_string(),
        (Widget::Select(options), Value::String(selected)) => options
            .iter()
            .find(|(value, _)| *value == selected.as_str())
            .map_or_else(|| selected.clone(), |(_, label)| label.to_string()),
        (_, Value::String(text)) => text.clone(),
        (_, Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_string))
            .collect::<Vec<_>>()
            .join(", "),
        (_, other) => other.to_string(),
    }
}

impl fmt::Display for FieldView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.value)?;
        if let Some(description) = self.description {
            write!(f, " ({description})")?;
        }
        if let Some(error) = &self.error {
            write!(f, "\n  ! {error}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_spec_lookup_normalizes_indices() {
        let spec = field_spec("photos.3.title").unwrap();
        assert_eq!(spec.label, "Photo Title");
        assert_eq!(field_spec("location.full").unwrap().widget, Widget::TextArea);
        assert!(field_spec("nonsense").is_none());
    }

    #[test]
    fn test_rent_frequency_only_visible_for_rentals() {
        let mut form = FormStore::new();
        assert!(!visible_fields(&form).contains(&"rentFrequency".to_string()));
        form.set("purpose", json!("for-rent")).unwrap();
        assert!(visible_fields(&form).contains(&"rentFrequency".to_string()));
    }

    #[test]
    fn test_photo_groups_listed_before_password() {
        let mut form = FormStore::new();
        form.add_photo();
        form.add_photo();
        let paths = visible_fields(&form);
        let first = paths.iter().position(|p| p == "photos.0.url").unwrap();
        let second = paths.iter().position(|p| p == "photos.1.description").unwrap();
        let password = paths.iter().position(|p| p == "password").unwrap();
        assert!(first < second && second < password);
    }

    #[test]
    fn test_render_shows_value_label_and_error() {
        let mut form = FormStore::new();
        form.set("pType", json!("hotel_apartments")).unwrap();
        let _ = form.validate();

        let kind = render(&form, "pType").unwrap();
        assert_eq!(kind.value, "Hotel Apartments");
        assert_eq!(kind.error, None);

        let title = render(&form, "title").unwrap();
        assert_eq!(title.error.as_deref(), Some("Required"));
        assert_eq!(title.to_string(), "Property Title: \n  ! Required");

        let state = render(&form, "state").unwrap();
        assert_eq!(state.label, "Property State");
        assert_eq!(state.error.as_deref(), Some("State is required"));
    }

    #[test]
    fn test_render_photo_and_password() {
        let mut form = FormStore::new();
        form.add_photo();
        form.set("photos.0.title", json!("Terrace")).unwrap();
        form.set("password", json!("secret")).unwrap();

        let photo = render(&form, "photos.0.title").unwrap();
        assert_eq!(photo.label, "Photo Title 1");
        assert_eq!(photo.value, "Terrace");
        assert_eq!(render(&form, "password").unwrap().value, "********");
    }

    #[test]
    fn test_render_tags() {
        let mut form = FormStore::new();
        form.append_unique(crate::form::TagField::Highlights, "Sea view");
        form.append_unique(crate::form::TagField::Highlights, "Private pool");
        assert_eq!(render(&form, "highlights").unwrap().value, "Sea view, Private pool");
    }
}
