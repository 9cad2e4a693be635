//! Tests for the run module.

use super::*;
use ipnotify::config::Cli;

fn no_env(_: &str) -> Option<String> {
    None
}

fn make_test_config(args: &[&str]) -> ValidatedConfig {
    let mut full_args = vec!["ipnotify", "--recipient", "me@example.com"];
    full_args.extend(args);
    let cli = Cli::parse_from_iter(full_args);
    ValidatedConfig::from_raw(&cli, None, &no_env).unwrap()
}

mod run_error {
    use super::*;
    use ipnotify::state::StateError;

    #[test]
    fn pipeline_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = RunError::from(OrchestratorError::StateSave(StateError::Write(io)));
        assert!(error.to_string().starts_with("Failed to save state"));
    }

    #[test]
    fn notifier_error_displays_source() {
        let error = RunError::Notifier(NotifyError::Message(lettre::error::Error::MissingFrom));
        assert!(error.to_string().contains("Failed to create notifier"));
    }

    #[test]
    fn debug_format_works() {
        let error = RunError::Notifier(NotifyError::Message(lettre::error::Error::MissingTo));
        let debug_str = format!("{error:?}");
        assert!(debug_str.contains("Notifier"));
    }
}

mod construction {
    use super::*;

    #[test]
    fn resolver_uses_configured_services() {
        let config = make_test_config(&[
            "--service",
            "https://a.example.com/",
            "--service",
            "https://b.example.com/",
        ]);

        let resolver = create_resolver(&config).unwrap();

        assert_eq!(resolver.services().len(), 2);
        assert_eq!(resolver.services()[1].as_str(), "https://b.example.com/");
    }

    #[test]
    fn orchestrator_uses_configured_state_file() {
        let config = make_test_config(&["--state-file", "/tmp/ipnotify-state.txt"]);

        let orchestrator = create_orchestrator(&config).unwrap();

        assert_eq!(
            orchestrator.store().path(),
            std::path::Path::new("/tmp/ipnotify-state.txt")
        );
    }
}

mod execution {
    use super::*;
    use ipnotify::orchestrator::Delivery;
    use tempfile::tempdir;

    #[tokio::test]
    async fn dry_run_with_unreachable_service_reports_no_consensus() {
        let dir = tempdir().unwrap();
        let state_file = dir.path().join("state.txt");
        let config = make_test_config(&[
            "--service",
            "http://127.0.0.1:1/",
            "--query-count",
            "1",
            "--timeout",
            "2",
            "--dry-run",
            "--state-file",
            state_file.to_str().unwrap(),
        ]);

        let outcome = execute(config).await.unwrap();

        assert!(!outcome.resolution.has_consensus());
        assert_eq!(
            outcome.decision.message,
            "No consensus. IP addresses: http://127.0.0.1:1/ -> None"
        );
        assert_eq!(outcome.delivery, Delivery::DryRun);
        assert!(!outcome.saved);
        assert!(!state_file.exists());
    }
}
