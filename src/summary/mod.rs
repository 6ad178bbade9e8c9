//! Listing summary (card) rendering.

pub mod cache;
pub mod favorites;

pub use cache::{CacheNavigator, ListingCache};
pub use favorites::{FavoritesStore, FileFavorites, MemoryFavorites};

use crate::error::FavoritesError;
use crate::models::{Listing, Purpose, RentFrequency};
use std::fmt;

pub const CURRENCY: &str = "AED";

const UNITS: [&str; 7] = ["", "K", "M", "B", "T", "P", "E"];

/// Abbreviate a number with a magnitude suffix and one decimal of precision:
/// `530_000_000` -> `"530M"`, `1_250` -> `"1.3K"`, `950` -> `"950"`.
pub fn abbreviate(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };
    let mut scaled = value.abs();
    let mut unit = 0;
    while scaled >= 1000.0 && unit + 1 < UNITS.len() {
        scaled /= 1000.0;
        unit += 1;
    }

    let mut rounded = (scaled * 10.0).round() / 10.0;
    // 999.95K rounds up to 1000K; carry into the next unit
    if rounded >= 1000.0 && unit + 1 < UNITS.len() {
        rounded = (rounded / 100.0).round() / 10.0;
        unit += 1;
    }

    let digits = if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    };
    format!("{sign}{digits}{}", UNITS[unit])
}

/// Compact display value for a listing card
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSummary {
    /// Identifier used for favorites
    pub key: String,
    pub slug: String,
    pub title: String,
    pub purpose: Purpose,
    pub price: String,
    pub rent_frequency: Option<RentFrequency>,
    pub rooms: u32,
    pub area: String,
    pub cover_url: Option<String>,
    pub agency: Option<String>,
    pub is_favorite: bool,
}

impl ListingSummary {
    pub fn from_listing(
        listing: &Listing,
        favorites: &dyn FavoritesStore,
    ) -> Result<Self, FavoritesError> {
        let key = listing.key();
        let is_favorite = favorites.contains(&key)?;
        Ok(Self {
            slug: listing.slug.clone(),
            title: listing.title.clone(),
            purpose: listing.purpose,
            price: abbreviate(listing.price),
            rent_frequency: listing.rent_frequency,
            rooms: listing.rooms,
            area: abbreviate(listing.area),
            cover_url: Some(listing.cover_photo.url.clone()).filter(|url| !url.is_empty()),
            agency: listing.agency.as_ref().and_then(|agency| agency.name.clone()),
            is_favorite,
            key,
        })
    }

    /// `AED 530M`, or `AED 85K/monthly` for rentals
    pub fn price_label(&self) -> String {
        match self.rent_frequency {
            Some(frequency) => format!("{CURRENCY} {}/{frequency}", self.price),
            None => format!("{CURRENCY} {}", self.price),
        }
    }

    /// Flip the favorite flag and write the updated set back
    pub fn toggle_favorite(&mut self, favorites: &dyn FavoritesStore) -> Result<bool, FavoritesError> {
        self.is_favorite = favorites.toggle(&self.key)?;
        Ok(self.is_favorite)
    }
}

impl fmt::Display for ListingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heart = if self.is_favorite { "♥" } else { "♡" };
        writeln!(f, "{heart} {} ({})", self.title, self.price_label())?;
        write!(f, "   {} rooms, {} sq ft", self.rooms, self.area)?;
        if let Some(agency) = &self.agency {
            write!(f, ", {agency}")?;
        }
        write!(f, "\n   /property/{}", self.slug)
    }
}
