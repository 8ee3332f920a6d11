mod utils;
#[allow(unused)]
use utils::*;

use reqwest::{Client, Method, StatusCode};
use stampede::burst::burst;
use stampede::http::notes_projects_templates;
use stampede::prelude::*;
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

fn issuer(addr: SocketAddr, token: &str) -> HttpIssuer {
    let credentials = Credentials::new(&format!("http://{addr}"), token).unwrap();
    HttpIssuer::new(credentials, notes_projects_templates("n1", "p1", "t1"))
}

#[tokio::test(flavor = "multi_thread")]
#[ntest::timeout(10_000)]
async fn totals_match_server() {
    init();
    let (addr, mock) = spawn_mock(1_000).await.unwrap();

    let stats = LoadTest::new("e2e", issuer(addr, TOKEN))
        .users(5)
        .duration(Duration::from_millis(500))
        .pacing(Duration::from_millis(20))
        .await
        .unwrap();

    assert_eq!(stats.users, 5);
    assert_eq!(stats.errors, 0);
    assert!(stats.units > 0);
    assert_eq!(stats.requests, stats.units * 3);
    assert_eq!(stats.requests, mock.updates());
    assert_eq!(mock.unauthorized(), 0);
}

#[tokio::test(flavor = "multi_thread")]
#[ntest::timeout(10_000)]
async fn rejected_token_is_transient() {
    init();
    let (addr, mock) = spawn_mock(1_000).await.unwrap();

    let stats = LoadTest::new("e2e-unauthorized", issuer(addr, "expired"))
        .users(3)
        .duration(Duration::from_millis(300))
        .pacing(Duration::from_millis(20))
        .await
        .unwrap();

    assert_eq!(stats.users, 3);
    assert_eq!(stats.requests, 0);
    assert_eq!(stats.errors, stats.units);
    // Each unit stops at its first rejected call.
    assert_eq!(mock.unauthorized(), stats.units);
    assert_eq!(mock.updates(), 0);
}

#[tokio::test(flavor = "multi_thread")]
#[ntest::timeout(10_000)]
async fn external_stop_ends_run_early() {
    init();
    let (addr, mock) = spawn_mock(1_000).await.unwrap();

    let test = LoadTest::new("e2e-stop", issuer(addr, TOKEN))
        .users(4)
        .duration(Duration::from_secs(60))
        .pacing(Duration::from_millis(10));
    let stop = test.stop_signal();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(250)).await;
        stop.fire();
    });

    let stats = test.await.unwrap();
    assert!(stats.elapsed < Duration::from_secs(5));
    assert_eq!(stats.users, 4);
    assert_eq!(stats.requests, mock.updates());
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn credentials_from_environment_lookup() {
    init();
    let (addr, mock) = spawn_mock(1_000).await.unwrap();
    let base = format!("http://{addr}");

    let credentials = Credentials::from_lookup(|key| match key {
        "API_BASE_URL" => Some(base.clone()),
        "TEST_ACCESS_TOKEN" => Some(TOKEN.to_string()),
        _ => None,
    })
    .unwrap();
    let issuer = HttpIssuer::new(credentials, notes_projects_templates("a", "b", "c"));

    let stats = run(
        {
            let mut config = LoadTestConfig::new("e2e-env");
            config.users = 1;
            config.duration = Duration::from_millis(100);
            config.pacing = Duration::ZERO;
            config
        },
        issuer,
    )
    .await
    .unwrap();

    assert_eq!(stats.users, 1);
    assert_eq!(stats.requests, mock.updates());
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn burst_counts_statuses() {
    init();
    let (addr, _mock) = spawn_mock(1_000).await.unwrap();
    let url = Url::parse(&format!("http://{addr}/status/204")).unwrap();

    let report = burst(&Client::new(), 20, Method::GET, url).await;

    assert_eq!(report.total(), 20);
    assert_eq!(report.failures, 0);
    assert_eq!(report.statuses.get(&204), Some(&20));
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn burst_against_rate_limit() {
    init();
    let (addr, _mock) = spawn_mock(5).await.unwrap();
    let url = Url::parse(&format!("http://{addr}/limited")).unwrap();

    let report = burst(&Client::new(), 30, Method::GET, url).await;

    assert_eq!(report.total(), 30);
    let ok = report.statuses.get(&StatusCode::OK.as_u16()).copied().unwrap_or(0);
    let limited = report
        .statuses
        .get(&StatusCode::TOO_MANY_REQUESTS.as_u16())
        .copied()
        .unwrap_or(0);
    assert!(limited > 0);
    assert_eq!(ok + limited, 30);
}
