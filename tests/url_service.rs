use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use url_minifier::application::services::{AllocatorSettings, UrlService};
use url_minifier::domain::repositories::UrlRepository;
use url_minifier::infrastructure::persistence::InMemoryUrlRepository;

fn service() -> (Arc<UrlService>, Arc<InMemoryUrlRepository>) {
    let repo = Arc::new(InMemoryUrlRepository::new());
    let service = Arc::new(UrlService::new(repo.clone(), AllocatorSettings::default()));
    (service, repo)
}

#[tokio::test]
async fn test_example_scenario() {
    let (service, repo) = service();

    let code = service
        .create_short_url("https://example.com/a")
        .await
        .unwrap();
    assert_eq!(code.len(), 10);

    let again = service
        .create_short_url("https://example.com/a")
        .await
        .unwrap();
    assert_eq!(again, code);

    assert_eq!(
        service.get_long_url(&code).await.unwrap(),
        "https://example.com/a"
    );
    assert_eq!(repo.find_by_code(&code).await.unwrap().unwrap().click_count, 1);

    assert!(service.create_short_url("not a url").await.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creation_of_same_url_yields_one_code() {
    let (service, repo) = service();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.create_short_url("https://example.com/race").await })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        codes.insert(handle.await.unwrap().unwrap());
    }

    assert_eq!(codes.len(), 1);
    assert_eq!(repo.snapshot().len(), 1);
    assert_eq!(repo.count_orphans().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creation_of_distinct_urls_yields_distinct_codes() {
    let (service, repo) = service();

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .create_short_url(&format!("https://example.com/{i}"))
                    .await
            })
        })
        .collect();

    let mut codes = HashSet::new();
    for handle in handles {
        assert!(codes.insert(handle.await.unwrap().unwrap()));
    }

    assert_eq!(codes.len(), 50);
    assert_eq!(repo.count().await.unwrap(), 50);
}

#[tokio::test]
async fn test_short_codes_exhaust_into_unavailable() {
    let repo = Arc::new(InMemoryUrlRepository::new());
    let service = UrlService::new(
        repo.clone(),
        AllocatorSettings {
            code_length: 1,
            max_retries: 5,
            backoff: Duration::from_millis(1),
            ..AllocatorSettings::default()
        },
    );

    // 62 one-character codes exist; keep creating until the allocator gives up.
    let mut unavailable = 0;
    for i in 0..200 {
        if let Err(e) = service
            .create_short_url(&format!("https://example.com/{i}"))
            .await
        {
            assert!(matches!(e, url_minifier::AppError::Unavailable { .. }));
            unavailable += 1;
        }
    }

    assert!(unavailable > 0);
    assert!(repo.count().await.unwrap() <= 62);
    assert!(repo.count_orphans().await.unwrap() > 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_winner_code_is_returned_to_waiting_caller() {
    let (service, repo) = service();

    let id = match repo.insert_placeholder("https://example.com/slow").await.unwrap() {
        url_minifier::domain::entities::InsertOutcome::Inserted(id) => id,
        other => panic!("unexpected outcome: {other:?}"),
    };

    let winner = repo.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(60)).await;
        winner.assign_code(id, "slowwinner").await.unwrap();
    });

    let code = service
        .create_short_url("https://example.com/slow")
        .await
        .unwrap();

    assert_eq!(code, "slowwinner");
}

#[tokio::test(start_paused = true)]
async fn test_orphan_blocks_url_until_swept() {
    let (service, repo) = service();
    repo.insert_placeholder("https://example.com/orphan")
        .await
        .unwrap();

    let err = service
        .create_short_url("https://example.com/orphan")
        .await
        .unwrap_err();

    assert!(matches!(err, url_minifier::AppError::Unavailable { .. }));
    assert!(!err.to_string().contains("in progress"));
}

#[tokio::test]
async fn test_sweep_removes_orphans_and_frees_url() {
    let repo = Arc::new(InMemoryUrlRepository::new());
    repo.insert_placeholder("https://example.com/stuck")
        .await
        .unwrap();

    let service = UrlService::new(repo.clone(), AllocatorSettings::default());
    tokio::time::sleep(Duration::from_millis(5)).await;

    assert_eq!(service.count_orphans().await.unwrap(), 1);
    assert_eq!(service.sweep_orphans(Duration::ZERO).await.unwrap(), 1);
    assert_eq!(service.count_orphans().await.unwrap(), 0);

    let code = service
        .create_short_url("https://example.com/stuck")
        .await
        .unwrap();
    assert_eq!(code.len(), 10);
}
