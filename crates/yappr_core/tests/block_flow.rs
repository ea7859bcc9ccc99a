use rand::Rng;
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;
use yappr_core::platform::{decode_block_documents, decode_block_filter_document};
use yappr_core::store::{load_or_empty, save};
use yappr_core::{
    from_base64, to_base64, BlockCacheConfig, BlockStatusCache, BlockStatusSeeder, BloomFilter,
    DocumentBlockLookup, FileFilterStore, Identifier, SeederConfig,
};

fn random_ids(n: usize) -> Vec<Identifier> {
    let mut rng = rand::rng();
    (0..n).map(|_| Identifier::from_bytes(rng.random())).collect()
}

#[test]
fn no_false_negatives_after_roundtrip() {
    let ids = random_ids(500);
    let mut f = BloomFilter::new();
    for id in &ids {
        f.add(&id.to_string()).unwrap();
    }
    let back = from_base64(&to_base64(&f), f.item_count()).unwrap();
    assert_eq!(back.serialize(), f.serialize());
    for id in &ids {
        assert!(back.might_contain(id).unwrap());
    }
    let fpr = back.estimate_false_positive_rate();
    assert!(fpr > 0.0 && fpr < 1.0);
}

#[test]
fn viewer_feed_is_seeded_from_platform_documents() {
    let viewer = random_ids(1)[0];
    let authors = random_ids(40);
    let blocked = &authors[..3];

    let docs_json = json!({
        "documents": blocked
            .iter()
            .map(|b| json!({ "$ownerId": viewer.to_string(), "blockedId": b.to_string() }))
            .collect::<Vec<_>>()
    });
    let docs = decode_block_documents(&docs_json).unwrap();
    assert_eq!(docs.len(), 3);

    // viewer publishes a filter of their own blocks; it is cached locally
    let mut published = BloomFilter::new();
    for d in &docs {
        published.add(&d.blocked_id).unwrap();
    }
    let filter_doc = decode_block_filter_document(&json!({
        "$ownerId": viewer.to_string(),
        "filterData": to_base64(&published),
        "itemCount": published.item_count(),
        "version": 1,
    }))
    .unwrap();

    let tmp = tempdir().unwrap();
    let mut store = FileFilterStore::open(tmp.path()).unwrap();
    save(&mut store, "self", &filter_doc.to_filter().unwrap()).unwrap();
    let filter = load_or_empty(&store, "self").unwrap();
    assert_eq!(filter, published);

    let cache = BlockStatusCache::handle(&BlockCacheConfig::default());
    let seeder = BlockStatusSeeder::new(
        DocumentBlockLookup::new(docs),
        Arc::clone(&cache),
        SeederConfig::default(),
    );
    let report = seeder.resolve(&viewer, Some(&filter), &authors).unwrap();
    assert_eq!(report.confirmed_blocked, 3);
    assert_eq!(
        report.filtered_out + report.confirmed_blocked + report.confirmed_clear,
        authors.len()
    );

    for (i, a) in authors.iter().enumerate() {
        assert_eq!(seeder.status(&viewer, a), Some(i < 3));
    }
    // another viewer shares nothing
    let other = random_ids(1)[0];
    assert_eq!(cache.lock().unwrap().get(&other, &authors[0]), None);
}
