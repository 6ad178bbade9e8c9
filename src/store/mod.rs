//! Listing document collection keyed by slug.
//!
//! The storage boundary re-checks every listing against the schema, so
//! required fields, enum membership and the numeric invariants hold no matter
//! who calls it. Slugs are unique and never change once stored.

use crate::api::ListingQuery;
use crate::error::{FieldErrors, StoreError};
use crate::form::schema;
use crate::models::Listing;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct ListingCollection {
    documents: Arc<RwLock<BTreeMap<String, Listing>>>,
}

impl ListingCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new listing, assigning its id and both timestamps
    pub async fn insert(&self, listing: Listing) -> Result<Listing, StoreError> {
        let mut listing = normalize(listing)?;
        let mut documents = self.documents.write().await;
        if documents.contains_key(&listing.slug) {
            warn!("Rejected duplicate slug '{}'", listing.slug);
            return Err(StoreError::DuplicateSlug(listing.slug));
        }

        let now = Utc::now();
        listing.id = Some(Uuid::new_v4());
        listing.created_at = Some(now);
        listing.updated_at = Some(now);
        documents.insert(listing.slug.clone(), listing.clone());
        info!("Stored listing '{}' ({} total)", listing.slug, documents.len());
        Ok(listing)
    }

    /// Replace the listing stored under `slug`. Id and creation time are kept
    /// and the slug itself cannot change.
    pub async fn update(&self, slug: &str, listing: Listing) -> Result<Listing, StoreError> {
        let mut listing = normalize(listing)?;
        let mut documents = self.documents.write().await;
        let existing = documents
            .get(slug)
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))?;
        if listing.slug != slug {
            return Err(StoreError::SlugImmutable);
        }

        listing.id = existing.id;
        listing.created_at = existing.created_at;
        listing.updated_at = Some(Utc::now());
        documents.insert(slug.to_string(), listing.clone());
        info!("Updated listing '{}'", slug);
        Ok(listing)
    }

    pub async fn get(&self, slug: &str) -> Option<Listing> {
        self.documents.read().await.get(slug).cloned()
    }

    /// Listings matching `query`, newest first
    pub async fn list(&self, query: &ListingQuery) -> Vec<Listing> {
        let documents = self.documents.read().await;
        let mut listings: Vec<Listing> = documents
            .values()
            .filter(|listing| query.include_hidden || listing.show)
            .filter(|listing| query.purpose.map_or(true, |purpose| listing.purpose == purpose))
            .cloned()
            .collect();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.slug.cmp(&b.slug)));
        listings
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

/// Run the schema over the listing and require a slug
fn normalize(listing: Listing) -> Result<Listing, StoreError> {
    let document = serde_json::to_value(&listing)
        .map_err(|err| StoreError::Invalid(FieldErrors::single("", err.to_string())))?;
    let mut errors = FieldErrors::new();
    if listing.slug.is_empty() {
        errors.insert("slug", "Slug is required");
    }
    match schema::validate_listing(&document) {
        Ok(normalized) if errors.is_empty() => Ok(normalized),
        Ok(_) => Err(StoreError::Invalid(errors)),
        Err(schema_errors) => {
            for (path, message) in schema_errors.iter() {
                errors.insert(path, message);
            }
            Err(StoreError::Invalid(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CoverPhoto, Location, Photo, Purpose, RentFrequency};

    fn listing(slug: &str) -> Listing {
        Listing {
            slug: slug.to_string(),
            title: "Palm Residence".to_string(),
            description: "Beachfront residence with private access.".to_string(),
            show: true,
            category: vec!["residential".to_string()],
            price: 2_400_000.0,
            permit_number: "7181198593".to_string(),
            rooms: 4,
            area: 3_100.0,
            location: Location {
                full: "Palm Jumeirah, Dubai".to_string(),
                ..Location::default()
            },
            cover_photo: CoverPhoto {
                url: "https://images.example.com/palm.jpg".to_string(),
                title: "Palm".to_string(),
            },
            photos: vec![Photo {
                url: "https://images.example.com/palm-2.jpg".to_string(),
                title: "Pool".to_string(),
                description: None,
            }],
            ..Listing::default()
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_identity_and_timestamps() {
        let collection = ListingCollection::new();
        let stored = collection.insert(listing("palm-residence")).await.unwrap();
        assert!(stored.id.is_some());
        assert!(stored.created_at.is_some());
        assert_eq!(stored.created_at, stored.updated_at);
        assert_eq!(collection.get("palm-residence").await, Some(stored));
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let collection = ListingCollection::new();
        collection.insert(listing("palm-residence")).await.unwrap();
        let err = collection.insert(listing("palm-residence")).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateSlug("palm-residence".to_string()));
        assert_eq!(err.to_string(), "slug already exists");
        assert_eq!(collection.len().await, 1);
    }

    #[tokio::test]
    async fn test_boundary_enforces_schema() {
        let collection = ListingCollection::new();
        let mut invalid = listing("");
        invalid.price = 0.0;
        invalid.photos.clear();
        let Err(StoreError::Invalid(errors)) = collection.insert(invalid).await else {
            panic!("expected invalid listing");
        };
        assert_eq!(errors.get("slug"), Some("Slug is required"));
        assert_eq!(errors.get("price"), Some("Price must be positive"));
        assert_eq!(errors.get("photos"), Some("At least one photo is required"));
        assert!(collection.is_empty().await);
    }

    #[tokio::test]
    async fn test_rental_requires_frequency_at_boundary() {
        let collection = ListingCollection::new();
        let mut rental = listing("marina-rental");
        rental.purpose = Purpose::ForRent;
        assert!(collection.insert(rental.clone()).await.is_err());

        rental.rent_frequency = Some(RentFrequency::Monthly);
        assert!(collection.insert(rental).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_keeps_identity_and_slug() {
        let collection = ListingCollection::new();
        let stored = collection.insert(listing("palm-residence")).await.unwrap();

        let mut edited = stored.clone();
        edited.price = 2_250_000.0;
        edited.id = None;
        let updated = collection.update("palm-residence", edited).await.unwrap();
        assert_eq!(updated.id, stored.id);
        assert_eq!(updated.created_at, stored.created_at);
        assert_eq!(updated.price, 2_250_000.0);

        let mut renamed = updated.clone();
        renamed.slug = "palm-residence-2".to_string();
        assert_eq!(
            collection.update("palm-residence", renamed).await.unwrap_err(),
            StoreError::SlugImmutable
        );
        assert_eq!(
            collection.update("missing-slug", listing("missing-slug")).await.unwrap_err(),
            StoreError::NotFound("missing-slug".to_string())
        );
    }

    #[tokio::test]
    async fn test_list_filters_purpose_and_visibility() {
        let collection = ListingCollection::new();
        collection.insert(listing("palm-residence")).await.unwrap();
        let mut hidden = listing("hidden-villa");
        hidden.show = false;
        collection.insert(hidden).await.unwrap();
        let mut rental = listing("marina-rental");
        rental.purpose = Purpose::ForRent;
        rental.rent_frequency = Some(RentFrequency::Yearly);
        collection.insert(rental).await.unwrap();

        assert_eq!(collection.list(&ListingQuery::default()).await.len(), 2);
        let rentals = collection.list(&ListingQuery::purpose(Purpose::ForRent)).await;
        assert_eq!(rentals.len(), 1);
        assert_eq!(rentals[0].slug, "marina-rental");

        let everything = ListingQuery {
            include_hidden: true,
            ..ListingQuery::default()
        };
        assert_eq!(collection.list(&everything).await.len(), 3);
    }
}
