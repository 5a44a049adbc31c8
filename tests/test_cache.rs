//! ResponseCache tests: capacity, eviction order, recency refresh.

use covid_sheets::ResponseCache;

#[test]
fn get_returns_inserted_value() {
    let mut cache = ResponseCache::new(4);
    cache.insert("global/count", 1);
    assert_eq!(cache.get("global/count"), Some(&1));
    assert_eq!(cache.get("missing"), None);
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.misses(), 1);
}

#[test]
fn evicts_oldest_entry_past_capacity() {
    let mut cache = ResponseCache::new(2);
    cache.insert("a", 1);
    cache.insert("b", 2);
    cache.insert("c", 3);

    assert_eq!(cache.len(), 2);
    assert!(!cache.contains("a"));
    assert!(cache.contains("b"));
    assert!(cache.contains("c"));
}

#[test]
fn hit_refreshes_recency() {
    let mut cache = ResponseCache::new(2);
    cache.insert("a", 1);
    cache.insert("b", 2);
    assert_eq!(cache.get("a"), Some(&1));
    cache.insert("c", 3);

    assert!(cache.contains("a"));
    assert!(!cache.contains("b"));
    assert_eq!(cache.keys(), vec!["a", "c"]);
}

#[test]
fn reinsert_replaces_without_evicting() {
    let mut cache = ResponseCache::new(2);
    cache.insert("a", 1);
    cache.insert("b", 2);
    cache.insert("a", 10);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.keys(), vec!["b", "a"]);
    assert_eq!(cache.get("a"), Some(&10));
}

#[test]
fn zero_capacity_caches_nothing() {
    let mut cache = ResponseCache::new(0);
    cache.insert("a", 1);
    assert!(cache.is_empty());
    assert_eq!(cache.get("a"), None);
}

#[test]
fn holds_thirty_two_endpoints_by_default_capacity() {
    let mut cache = ResponseCache::new(covid_sheets::config::CACHE_CAPACITY);
    for i in 0..40 {
        cache.insert(format!("endpoint/{}", i), i);
    }
    assert_eq!(cache.len(), 32);
    assert_eq!(cache.capacity(), 32);
    assert!(!cache.contains("endpoint/7"));
    assert!(cache.contains("endpoint/8"));
    assert!(cache.contains("endpoint/39"));
}

#[test]
fn clear_empties_the_cache() {
    let mut cache = ResponseCache::new(3);
    cache.insert("a", ());
    cache.insert("b", ());
    cache.clear();
    assert!(cache.is_empty());
}
