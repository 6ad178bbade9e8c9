use crate::api::{ListingApi, ListingQuery};
use crate::error::ApiError;
use crate::models::Listing;
use crate::submit::Navigator;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Cached listing index, fetched on first use and dropped on refresh
#[derive(Debug, Default)]
pub struct ListingCache {
    entries: Mutex<Option<(ListingQuery, Vec<Listing>)>>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listings for `query`, served from cache when the same query was
    /// fetched since the last refresh
    pub async fn listings(
        &self,
        api: &dyn ListingApi,
        query: &ListingQuery,
    ) -> Result<Vec<Listing>, ApiError> {
        if let Some((cached_query, listings)) = self.lock().as_ref() {
            if cached_query == query {
                debug!("Serving {} listings from cache", listings.len());
                return Ok(listings.clone());
            }
        }

        let listings = api.list(query).await?;
        *self.lock() = Some((query.clone(), listings.clone()));
        Ok(listings)
    }

    pub fn is_cached(&self) -> bool {
        self.lock().is_some()
    }

    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<(ListingQuery, Vec<Listing>)>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Navigator that records the current route and drops the listing cache on
/// refresh
#[derive(Debug)]
pub struct CacheNavigator {
    cache: Arc<ListingCache>,
    route: Mutex<String>,
}

impl CacheNavigator {
    pub fn new(cache: Arc<ListingCache>) -> Self {
        Self {
            cache,
            route: Mutex::new("/".to_string()),
        }
    }

    pub fn current_route(&self) -> String {
        self.route
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Navigator for CacheNavigator {
    fn navigate(&self, route: &str) {
        info!("Navigating to {}", route);
        *self.route.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = route.to_string();
    }

    fn refresh(&self) {
        debug!("Refreshing cached listing data");
        self.cache.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionPayload;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingApi {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ListingApi for CountingApi {
        async fn create(&self, _payload: &SubmissionPayload) -> Result<Listing, ApiError> {
            unimplemented!("not used by the cache")
        }

        async fn list(&self, _query: &ListingQuery) -> Result<Vec<Listing>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Listing::default()])
        }

        fn endpoint_name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_cache_serves_until_refresh() {
        let api = CountingApi::default();
        let cache = Arc::new(ListingCache::new());
        let query = ListingQuery::default();

        cache.listings(&api, &query).await.unwrap();
        cache.listings(&api, &query).await.unwrap();
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);

        let navigator = CacheNavigator::new(cache.clone());
        navigator.navigate("/properties");
        navigator.refresh();
        assert!(!cache.is_cached());
        assert_eq!(navigator.current_route(), "/properties");

        cache.listings(&api, &query).await.unwrap();
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_different_query_refetches() {
        let api = CountingApi::default();
        let cache = ListingCache::new();
        cache.listings(&api, &ListingQuery::default()).await.unwrap();
        cache
            .listings(&api, &ListingQuery::purpose(crate::models::Purpose::ForRent))
            .await
            .unwrap();
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    }
}
