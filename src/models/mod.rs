use crate::form::slug::SLUG_PATTERN;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// A closed set of string values with display labels
pub trait ClosedSet: Copy + Sized + 'static {
    /// Every member, in display order
    fn all() -> &'static [Self];
    /// `(value, label)` pairs for select widgets
    fn options() -> &'static [(&'static str, &'static str)];
    fn as_str(self) -> &'static str;
    fn label(self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::all().iter().copied().find(|member| member.as_str() == value)
    }

    /// `'a' | 'b' | 'c'`, used in validation messages
    fn expected() -> String {
        Self::all()
            .iter()
            .map(|member| format!("'{}'", member.as_str()))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

macro_rules! closed_set {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => ($value:tt, $label:tt)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $value)] $variant,)+
        }

        impl ClosedSet for $name {
            fn all() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn options() -> &'static [(&'static str, &'static str)] {
                &[$(($value, $label)),+]
            }

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_set! {
    /// Sale vs. rental classification of a listing
    Purpose {
        ForSale => ("for-sale", "For Sale"),
        ForRent => ("for-rent", "For Rent"),
    }
}

closed_set! {
    /// Kind of property being listed
    PropertyType {
        Apartment => ("apartment", "Apartment"),
        Townhouses => ("townhouses", "Townhouses"),
        Villas => ("villas", "Villas"),
        Penthouses => ("penthouses", "Penthouses"),
        HotelApartments => ("hotel_apartments", "Hotel Apartments"),
        VillaCompound => ("villa_compound", "Villa Compound"),
        ResidentialPlot => ("residential_plot", "Residential Plot"),
        ResidentialFloor => ("residential_floor", "Residential Floor"),
        ResidentialBuilding => ("residential_building", "Residential Building"),
    }
}

closed_set! {
    /// State (emirate) a property is located in
    State {
        Dubai => ("dubai", "Dubai"),
        AbuDhabi => ("abu_dhabi", "Abu Dhabi"),
        Sharjah => ("sharjah", "Sharjah"),
        Ajman => ("ajman", "Ajman"),
    }
}

closed_set! {
    /// How often rent is due on a rental listing
    RentFrequency {
        Yearly => ("yearly", "Yearly"),
        Monthly => ("monthly", "Monthly"),
        Weekly => ("weekly", "Weekly"),
        Daily => ("daily", "Daily"),
    }
}

impl Default for Purpose {
    fn default() -> Self {
        Purpose::ForSale
    }
}

impl Default for PropertyType {
    fn default() -> Self {
        PropertyType::Apartment
    }
}

impl Default for State {
    fn default() -> Self {
        State::Dubai
    }
}

/// Location information for a property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    pub state: State,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    /// Complete human-readable address
    #[validate(length(min = 5, message = "Full address is required"))]
    pub full: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinates {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lng: f64,
}

/// Listing agency, shown on cards when present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// Primary image representing a listing in summary views
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CoverPhoto {
    #[validate(url(message = "Must be a valid URL"))]
    pub url: String,
    #[validate(length(min = 1, message = "Cover photo title is required"))]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Photo {
    #[validate(url(message = "Must be a valid URL"))]
    pub url: String,
    #[validate(length(min = 1, message = "Photo title is required"))]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Core listing data model.
///
/// Field rules are declared here and checked with [`Validate`]. Rules that
/// need the raw document (presence, numeric strings, rent frequency against
/// purpose) live in the form schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Assigned by the collection on first save
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[validate(
        length(min = 5, message = "Slug must be at least 5 characters"),
        regex(path = *SLUG_PATTERN, message = "Slug can only contain lowercase letters, numbers, and hyphens")
    )]
    pub slug: String,
    #[validate(length(min = 5, message = "Title must be at least 5 characters"))]
    pub title: String,
    #[validate(length(min = 20, message = "Description must be at least 20 characters"))]
    pub description: String,
    pub show: bool,
    /// State the listing is filed under
    #[serde(default)]
    pub state: State,
    pub purpose: Purpose,
    #[serde(rename = "pType")]
    pub property_type: PropertyType,
    #[validate(length(min = 1, message = "At least one category is required"))]
    pub category: Vec<String>,
    #[validate(range(exclusive_min = 0.0, message = "Price must be positive"))]
    pub price: f64,
    #[serde(default)]
    pub rent_frequency: Option<RentFrequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[validate(length(min = 1, message = "Permit number is required"))]
    pub permit_number: String,
    #[serde(default)]
    pub project_number: Option<String>,
    #[serde(default)]
    pub nearby: Vec<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[validate(range(min = 1, message = "Number of rooms must be positive"))]
    pub rooms: u32,
    #[validate(range(exclusive_min = 0.0, message = "Area must be positive"))]
    pub area: f64,
    #[validate(nested)]
    pub location: Location,
    #[validate(nested)]
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency: Option<Agency>,
    #[validate(nested)]
    pub cover_photo: CoverPhoto,
    #[validate(length(min = 1, message = "At least one photo is required"), nested)]
    pub photos: Vec<Photo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Identifier used for favorites: the id once assigned, the slug before that
    pub fn key(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => self.slug.clone(),
        }
    }
}

/// Document sent to the listing creation endpoint: the listing record plus the
/// admin pass-phrase from the form. The pass-phrase is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    #[serde(flatten)]
    pub listing: Listing,
    pub password: String,
}
