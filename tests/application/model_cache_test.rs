use std::path::Path;
use std::sync::Arc;

use whispai::application::ports::ModelLoader;
use whispai::application::services::ModelCache;
use whispai::domain::ModelTier;

use crate::helpers::FakeModelLoader;

fn cache() -> (Arc<FakeModelLoader>, ModelCache) {
    let loader = Arc::new(FakeModelLoader::new("text", "en"));
    let cache = ModelCache::new(Arc::clone(&loader) as Arc<dyn ModelLoader>);
    (loader, cache)
}

#[tokio::test]
async fn given_loaded_tier_when_acquiring_same_tier_then_model_is_reused() {
    let (loader, cache) = cache();

    drop(cache.acquire(ModelTier::Small).await.unwrap());
    drop(cache.acquire(ModelTier::Small).await.unwrap());

    assert_eq!(loader.loads(), vec![ModelTier::Small]);
    assert_eq!(cache.loaded_tier().await, Some(ModelTier::Small));
}

#[tokio::test]
async fn given_loaded_tier_when_acquiring_other_tier_then_model_is_swapped() {
    let (loader, cache) = cache();

    drop(cache.acquire(ModelTier::Small).await.unwrap());
    drop(cache.acquire(ModelTier::Base).await.unwrap());
    drop(cache.acquire(ModelTier::Small).await.unwrap());

    assert_eq!(
        loader.loads(),
        vec![ModelTier::Small, ModelTier::Base, ModelTier::Small]
    );
    assert_eq!(cache.loaded_tier().await, Some(ModelTier::Small));
}

#[tokio::test]
async fn given_empty_cache_when_queried_then_no_tier_is_loaded() {
    let (_loader, cache) = cache();
    assert_eq!(cache.loaded_tier().await, None);
}

#[tokio::test]
async fn given_active_lease_when_other_job_acquires_then_it_waits_for_release() {
    let (loader, cache) = cache();
    let cache = Arc::new(cache);

    let lease = cache.acquire(ModelTier::Medium).await.unwrap();
    assert_eq!(lease.tier(), ModelTier::Medium);

    let contender = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.acquire(ModelTier::Base).await.map(|l| l.tier()) })
    };
    tokio::task::yield_now().await;
    assert!(!contender.is_finished());

    let text = lease.engine().transcribe(Path::new("Cargo.toml")).await.unwrap();
    assert_eq!(text, "text");
    drop(lease);

    assert_eq!(contender.await.unwrap().unwrap(), ModelTier::Base);
    assert_eq!(loader.loads(), vec![ModelTier::Medium, ModelTier::Base]);
}
