use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;

#[derive(Default)]
struct CountingFetcher {
    files: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

#[async_trait]
impl ImageFetcher for CountingFetcher {
    async fn fetch(&self, url: &str) -> WorldviewResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| WorldviewError::asset(format!("404 {url}")))
    }
}

#[tokio::test]
async fn hits_skip_the_fetcher() {
    let mut fetcher = CountingFetcher::default();
    fetcher.files.insert("a.png".into(), vec![1, 2, 3]);
    let cache = ImageCache::new(8);

    let first = cache.get_or_fetch("a", "a.png", &fetcher).await.unwrap();
    let second = cache.get_or_fetch("a", "a.png", &fetcher).await.unwrap();
    assert_eq!(first.as_slice(), &[1, 2, 3]);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failures_are_not_cached() {
    let fetcher = CountingFetcher::default();
    let cache = ImageCache::new(8);
    let err = cache.get_or_fetch("a", "missing.png", &fetcher).await.unwrap_err();
    assert!(err.to_string().starts_with("asset error:"));
    assert!(cache.get("a").await.is_none());
    let _ = cache.get_or_fetch("a", "missing.png", &fetcher).await;
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn capacity_bounds_the_entry_count() {
    let cache = ImageCache::new(2);
    for i in 0..10 {
        cache.insert(format!("k{i}"), vec![i]).await;
    }
    cache.sync().await;
    assert!(cache.entry_count() <= 2);
}

#[tokio::test]
async fn fs_fetcher_reads_relative_and_file_urls() {
    let dir = std::env::temp_dir().join(format!("worldview-fetch-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("dot.bin"), [9u8, 8, 7]).unwrap();

    let fetcher = FsFetcher::new(&dir);
    assert_eq!(fetcher.fetch("dot.bin").await.unwrap(), vec![9, 8, 7]);
    let absolute = format!("file://{}", dir.join("dot.bin").display());
    assert_eq!(fetcher.fetch(&absolute).await.unwrap(), vec![9, 8, 7]);
    assert!(fetcher.fetch("https://example.com/x.png").await.is_err());

    std::fs::remove_dir_all(&dir).unwrap();
}
