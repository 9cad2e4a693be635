//! Tests for the orchestrator.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use chrono::NaiveDate;
use tempfile::TempDir;
use url::Url;

use super::*;
use crate::echo::{
    EchoFetcher, HttpClient, HttpEchoFetcher, HttpError, HttpRequest, HttpResponse,
    OrderedSelector,
};
use crate::notify::mock::MockNotifier;
use crate::state::FileStateStore;
use crate::state::mock::MockStateStore;

const SERVICES: [&str; 3] = [
    "https://a.example.com/",
    "https://b.example.com/",
    "https://c.example.com/",
];

/// Clock frozen at a fixed instant.
struct FixedClock(SystemTime);

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        self.0
    }
}

/// 2024-06-15T08:00:00Z
fn now() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_718_438_400)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn yesterday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
}

/// Fetcher returning the same answer for every service, per position.
struct ListFetcher(HashMap<String, Option<String>>);

impl ListFetcher {
    fn all(value: &str) -> Self {
        Self::per_service([Some(value), Some(value), Some(value)])
    }

    fn per_service(values: [Option<&str>; 3]) -> Self {
        Self(
            SERVICES
                .iter()
                .zip(values)
                .map(|(url, v)| ((*url).to_string(), v.map(ToString::to_string)))
                .collect(),
        )
    }
}

impl EchoFetcher for ListFetcher {
    async fn fetch(&self, url: &Url) -> Option<String> {
        self.0.get(url.as_str()).cloned().flatten()
    }
}

fn resolver<F: EchoFetcher + 'static>(fetcher: F) -> IpResolver<F> {
    let services = SERVICES.iter().map(|u| Url::parse(u).unwrap()).collect();
    IpResolver::new(fetcher, services).with_selector(OrderedSelector)
}

fn orchestrator<S, F>(
    store: S,
    fetcher: F,
    notifier: MockNotifier,
) -> Orchestrator<S, F, MockNotifier, FixedClock>
where
    F: EchoFetcher + 'static,
{
    Orchestrator::new(store, resolver(fetcher), notifier).with_clock(FixedClock(now()))
}

mod pipeline {
    use super::*;

    #[tokio::test]
    async fn first_run_notifies_and_saves_counter_one() {
        let orch = orchestrator(
            MockStateStore::not_found(),
            ListFetcher::all("9.8.7.6"),
            MockNotifier::new(),
        );

        let outcome = orch.run().await.unwrap();

        assert_eq!(outcome.delivery, Delivery::Sent);
        assert!(outcome.saved);
        assert_eq!(orch.notifier().sent(), vec!["IP address is '9.8.7.6'"]);
        assert_eq!(
            orch.store().saved(),
            vec![PersistedState::new("9.8.7.6", 1, today())]
        );
    }

    #[tokio::test]
    async fn throttled_invocation_neither_sends_nor_saves() {
        let orch = orchestrator(
            MockStateStore::with_loaded(PersistedState::new("9.8.7.6", 10, today())),
            ListFetcher::all("9.8.7.6"),
            MockNotifier::new(),
        );

        let outcome = orch.run().await.unwrap();

        assert_eq!(outcome.delivery, Delivery::NotAttempted);
        assert!(!outcome.saved);
        assert!(orch.notifier().sent().is_empty());
        assert!(orch.store().saved().is_empty());
    }

    #[tokio::test]
    async fn burst_increments_counter() {
        let orch = orchestrator(
            MockStateStore::with_loaded(PersistedState::new("9.8.7.6", 4, today())),
            ListFetcher::all("9.8.7.6"),
            MockNotifier::new(),
        );

        orch.run().await.unwrap();

        assert_eq!(orch.store().saved()[0].notifications_sent_today, 5);
    }

    #[tokio::test]
    async fn daily_notification_keeps_exhausted_counter() {
        let orch = orchestrator(
            MockStateStore::with_loaded(PersistedState::new("9.8.7.6", 10, yesterday())),
            ListFetcher::all("9.8.7.6"),
            MockNotifier::new(),
        );

        let outcome = orch.run().await.unwrap();

        assert_eq!(outcome.delivery, Delivery::Sent);
        assert_eq!(
            orch.store().saved(),
            vec![PersistedState::new("9.8.7.6", 10, today())]
        );
    }

    #[tokio::test]
    async fn address_change_resets_counter() {
        let orch = orchestrator(
            MockStateStore::with_loaded(PersistedState::new("1.1.1.1", 40, today())),
            ListFetcher::all("9.8.7.6"),
            MockNotifier::new(),
        );

        orch.run().await.unwrap();

        assert_eq!(orch.store().saved()[0].to_record(), "9.8.7.6,1");
    }

    #[tokio::test]
    async fn no_consensus_sends_diagnostic_and_saves_empty_address() {
        let orch = orchestrator(
            MockStateStore::with_loaded(PersistedState::new("9.8.7.6", 10, today())),
            ListFetcher::per_service([Some("9.8.7.6"), None, Some("9.8.7.6")]),
            MockNotifier::new(),
        );

        let outcome = orch.run().await.unwrap();

        assert!(!outcome.resolution.has_consensus());
        assert_eq!(
            orch.notifier().sent(),
            vec![
                "No consensus. IP addresses: https://a.example.com/ -> 9.8.7.6, \
                 https://b.example.com/ -> None, https://c.example.com/ -> 9.8.7.6"
            ]
        );
        assert_eq!(orch.store().saved()[0].to_record(), ",1");
    }

    #[tokio::test]
    async fn failed_delivery_still_saves_state() {
        let orch = orchestrator(
            MockStateStore::not_found(),
            ListFetcher::all("9.8.7.6"),
            MockNotifier::failing(),
        );

        let outcome = orch.run().await.unwrap();

        assert!(matches!(outcome.delivery, Delivery::Failed(_)));
        assert!(outcome.saved);
        assert_eq!(orch.store().saved()[0].to_record(), "9.8.7.6,1");
    }

    #[tokio::test]
    async fn failed_save_is_an_error() {
        let orch = orchestrator(
            MockStateStore::not_found().failing_writes(),
            ListFetcher::all("9.8.7.6"),
            MockNotifier::new(),
        );

        let result = orch.run().await;

        assert!(matches!(result, Err(OrchestratorError::StateSave(_))));
        // The notification went out before the write failed.
        assert_eq!(orch.notifier().sent().len(), 1);
    }

    #[tokio::test]
    async fn dry_run_neither_sends_nor_saves() {
        let orch = orchestrator(
            MockStateStore::not_found(),
            ListFetcher::all("9.8.7.6"),
            MockNotifier::new(),
        )
        .with_dry_run(true);

        let outcome = orch.run().await.unwrap();

        assert_eq!(outcome.delivery, Delivery::DryRun);
        assert!(outcome.decision.should_notify);
        assert!(!outcome.saved);
        assert!(orch.notifier().sent().is_empty());
        assert!(orch.store().saved().is_empty());
    }

    #[tokio::test]
    async fn query_count_limits_services_asked() {
        let orch = orchestrator(
            MockStateStore::not_found(),
            ListFetcher::per_service([Some("9.8.7.6"), None, None]),
            MockNotifier::new(),
        )
        .with_query_count(1);

        let outcome = orch.run().await.unwrap();

        assert_eq!(outcome.resolution.observations.len(), 1);
        assert_eq!(outcome.resolution.consensus_address.as_deref(), Some("9.8.7.6"));
    }
}

mod end_to_end {
    use super::*;

    /// HTTP client answering every echo request with a fixed body.
    struct EchoServer(&'static str);

    impl HttpClient for EchoServer {
        async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
            Ok(HttpResponse::new(
                http::StatusCode::OK,
                self.0.as_bytes().to_vec(),
            ))
        }
    }

    #[tokio::test]
    async fn fresh_install_with_agreeing_services() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_ip_address.txt");

        let orch = Orchestrator::new(
            FileStateStore::new(&path),
            resolver(HttpEchoFetcher::new(EchoServer("9.8.7.6\n"))),
            MockNotifier::new(),
        );

        let outcome = orch.run().await.unwrap();

        assert_eq!(outcome.resolution.consensus_address.as_deref(), Some("9.8.7.6"));
        assert_eq!(orch.notifier().sent(), vec!["IP address is '9.8.7.6'"]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "9.8.7.6,1");
    }

    #[tokio::test]
    async fn repeated_runs_throttle_after_burst() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_ip_address.txt");

        let orch = Orchestrator::new(
            FileStateStore::new(&path),
            resolver(HttpEchoFetcher::new(EchoServer("9.8.7.6"))),
            MockNotifier::new(),
        );

        for _ in 0..15 {
            orch.run().await.unwrap();
        }

        assert_eq!(orch.notifier().sent().len(), 10);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "9.8.7.6,10");
    }
}

#[test]
fn delivery_displays_reason() {
    assert_eq!(Delivery::Sent.to_string(), "sent");
    assert_eq!(
        Delivery::Failed("relay down".to_string()).to_string(),
        "failed (relay down)"
    );
}
