// tests/supervisor_fake_launcher.rs

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::watch;

use vcf_batch::engine::{OutcomeStatus, Supervisor, SupervisorReport};
use vcf_batch::types::WaitMode;
use vcf_batch_test_utils::builders::{numbered_items, work_items, SupervisorConfigBuilder};
use vcf_batch_test_utils::fake_launcher::{FakeLauncher, FakeScript};
use vcf_batch_test_utils::{init_tracing, with_timeout};

async fn run_bounded(supervisor: Supervisor<FakeLauncher>) -> SupervisorReport {
    with_timeout(supervisor.run()).await
}

fn display_names(report: &SupervisorReport) -> Vec<String> {
    report
        .outcomes
        .iter()
        .map(|o| o.display_name.clone())
        .collect()
}

#[tokio::test]
async fn five_items_two_workers_never_exceed_ceiling() {
    init_tracing();

    for mode in [WaitMode::Poll, WaitMode::Notify] {
        let launcher = FakeLauncher::new(FakeScript::exits(0).after(Duration::from_millis(20)));
        let ledger = launcher.ledger();
        let config = SupervisorConfigBuilder::new()
            .max_workers(2)
            .wait_mode(mode)
            .build();

        let report = run_bounded(Supervisor::new(numbered_items(5, "/out"), &config, launcher)).await;

        assert_eq!(report.outcomes.len(), 5, "mode {mode:?}");
        assert_eq!(report.succeeded(), 5);
        assert!(report.peak_active <= 2);

        let ledger = ledger.lock().unwrap();
        assert!(ledger.peak_active <= 2, "mode {mode:?}: {}", ledger.peak_active);
        assert_eq!(ledger.active, 0);

        let ids: HashSet<_> = report.outcomes.iter().map(|o| o.job_id).collect();
        assert_eq!(ids.len(), 5, "each item has exactly one outcome");
    }
}

#[tokio::test]
async fn launches_follow_submission_order() {
    init_tracing();

    let launcher = FakeLauncher::new(FakeScript::exits(0))
        // Item 0 outlives the others, so slots free up out of order.
        .with_script("item0.vcf", FakeScript::exits(0).after(Duration::from_millis(80)));
    let ledger = launcher.ledger();
    let config = SupervisorConfigBuilder::new().max_workers(2).build();

    run_bounded(Supervisor::new(numbered_items(6, "/out"), &config, launcher)).await;

    let launched = ledger.lock().unwrap().launched.clone();
    let expected: Vec<String> = (0..6).map(|i| format!("item{i}.vcf")).collect();
    assert_eq!(launched, expected);
}

#[tokio::test]
async fn single_slot_reaps_first_item_before_launching_second() {
    init_tracing();

    let launcher = FakeLauncher::new(FakeScript::exits(0).after(Duration::from_millis(30)));
    let ledger = launcher.ledger();
    let config = SupervisorConfigBuilder::new().max_workers(1).build();
    let items = work_items(&["A.vcf", "B.vcf"], "/out/dirX");

    let report = run_bounded(Supervisor::new(items, &config, launcher)).await;

    assert_eq!(display_names(&report), vec!["A.vcf", "B.vcf"]);
    assert_eq!(ledger.lock().unwrap().peak_active, 1);
    assert_eq!(report.peak_active, 1);
}

#[tokio::test]
async fn launch_failure_never_occupies_a_slot() {
    init_tracing();

    let launcher = FakeLauncher::new(FakeScript::exits(0))
        .with_script("missing.vcf", FakeScript::launch_error("no such file"));
    let ledger = launcher.ledger();
    let config = SupervisorConfigBuilder::new().max_workers(1).build();
    let items = work_items(&["missing.vcf", "ok.vcf"], "/out");

    let report = run_bounded(Supervisor::new(items, &config, launcher)).await;

    assert_eq!(display_names(&report), vec!["missing.vcf", "ok.vcf"]);
    assert!(matches!(
        &report.outcomes[0].status,
        OutcomeStatus::LaunchFailed(reason) if reason.contains("no such file")
    ));
    assert_eq!(report.outcomes[1].status, OutcomeStatus::Success);
    assert_eq!(ledger.lock().unwrap().launched, vec!["ok.vcf".to_string()]);
}

#[tokio::test]
async fn nonzero_exit_is_reported_with_log_path() {
    init_tracing();

    let launcher = FakeLauncher::new(FakeScript::exits(0)).with_script("bad.vcf", FakeScript::exits(3));
    let config = SupervisorConfigBuilder::new().build();
    let items = work_items(&["good.vcf", "bad.vcf"], "/out");

    let report = run_bounded(Supervisor::new(items, &config, launcher)).await;

    let bad = report
        .outcomes
        .iter()
        .find(|o| o.display_name == "bad.vcf")
        .expect("bad.vcf has an outcome");
    assert_eq!(bad.status, OutcomeStatus::Failed(3));
    assert_eq!(bad.log_path, std::path::PathBuf::from("/out/bad.vcf.log"));
    assert!(!report.all_succeeded());
}

#[tokio::test]
async fn non_positive_max_workers_runs_two_at_a_time() {
    init_tracing();

    for requested in [0, -3] {
        let launcher = FakeLauncher::new(FakeScript::exits(0).after(Duration::from_millis(20)));
        let ledger = launcher.ledger();
        let config = SupervisorConfigBuilder::new().max_workers(requested).build();

        let report = run_bounded(Supervisor::new(numbered_items(4, "/out"), &config, launcher)).await;

        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(ledger.lock().unwrap().peak_active, 2);
    }
}

#[tokio::test]
async fn repeated_status_failures_escalate() {
    init_tracing();

    let launcher = FakeLauncher::new(FakeScript::exits(0))
        .with_script("stuck.vcf", FakeScript::exits(0).poll_errors(u32::MAX));
    let ledger = launcher.ledger();
    let config = SupervisorConfigBuilder::new().max_poll_errors(3).build();
    let items = work_items(&["stuck.vcf", "fine.vcf"], "/out");

    let report = run_bounded(Supervisor::new(items, &config, launcher)).await;

    let stuck = report
        .outcomes
        .iter()
        .find(|o| o.display_name == "stuck.vcf")
        .expect("stuck.vcf has an outcome");
    assert!(matches!(
        &stuck.status,
        OutcomeStatus::LaunchFailed(reason) if reason.contains("status unavailable")
    ));
    assert_eq!(ledger.lock().unwrap().killed, vec!["stuck.vcf".to_string()]);
    assert_eq!(report.outcomes.len(), 2);
}

#[tokio::test]
async fn transient_status_failures_are_tolerated() {
    init_tracing();

    let launcher = FakeLauncher::new(FakeScript::exits(0).poll_errors(2));
    let config = SupervisorConfigBuilder::new().max_poll_errors(3).build();

    let report = run_bounded(Supervisor::new(numbered_items(3, "/out"), &config, launcher)).await;

    assert_eq!(report.succeeded(), 3);
}

#[tokio::test]
async fn notify_and_poll_modes_agree() {
    init_tracing();

    let script = |launcher: FakeLauncher| {
        launcher
            .with_script("item1.vcf", FakeScript::exits(4).after(Duration::from_millis(15)))
            .with_script("item3.vcf", FakeScript::launch_error("denied"))
    };

    let mut results = Vec::new();
    for mode in [WaitMode::Poll, WaitMode::Notify] {
        let launcher = script(FakeLauncher::new(FakeScript::exits(0).after(Duration::from_millis(25))));
        let ledger = launcher.ledger();
        let config = SupervisorConfigBuilder::new()
            .max_workers(2)
            .wait_mode(mode)
            .build();

        let report = run_bounded(Supervisor::new(numbered_items(5, "/out"), &config, launcher)).await;

        let mut statuses: Vec<_> = report
            .outcomes
            .iter()
            .map(|o| (o.job_id, o.status.to_string()))
            .collect();
        statuses.sort();
        let launched = ledger.lock().unwrap().launched.clone();
        results.push((statuses, launched));
    }

    assert_eq!(results[0], results[1]);
}

#[tokio::test]
async fn shutdown_kills_active_jobs_and_skips_backlog() {
    init_tracing();

    for mode in [WaitMode::Poll, WaitMode::Notify] {
        let launcher = FakeLauncher::new(FakeScript::exits(0).after(Duration::from_secs(30)));
        let ledger = launcher.ledger();
        let config = SupervisorConfigBuilder::new()
            .max_workers(2)
            .wait_mode(mode)
            .build();

        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = tx.send(true);
        });

        let supervisor =
            Supervisor::new(numbered_items(4, "/out"), &config, launcher).with_shutdown(rx);
        let report = run_bounded(supervisor).await;

        assert!(report.cancelled);
        assert_eq!(report.outcomes.len(), 2);
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.status == OutcomeStatus::Failed(-1)));
        assert_eq!(report.not_started.len(), 2);
        assert_eq!(ledger.lock().unwrap().killed.len(), 2);
    }
}

#[tokio::test]
async fn shutdown_keeps_outcome_of_job_that_already_exited() {
    init_tracing();

    for mode in [WaitMode::Poll, WaitMode::Notify] {
        // `done.vcf` exits long before the shutdown; `slow.vcf` is still running.
        let launcher = FakeLauncher::new(FakeScript::exits(0).after(Duration::from_secs(30)))
            .with_script("done.vcf", FakeScript::exits(0).after(Duration::from_millis(10)));
        let ledger = launcher.ledger();
        // The poll interval outlasts the shutdown delay, so no reap pass sees
        // `done.vcf` exit before shutdown in poll mode.
        let config = SupervisorConfigBuilder::new()
            .max_workers(2)
            .poll_interval(Duration::from_secs(2))
            .wait_mode(mode)
            .build();

        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            let _ = tx.send(true);
        });

        let items = work_items(&["done.vcf", "slow.vcf"], "/out");
        let report = run_bounded(Supervisor::new(items, &config, launcher).with_shutdown(rx)).await;

        assert!(report.cancelled, "mode {mode:?}");
        let status_of = |name: &str| {
            report
                .outcomes
                .iter()
                .find(|o| o.display_name == name)
                .map(|o| o.status.clone())
        };
        assert_eq!(status_of("done.vcf"), Some(OutcomeStatus::Success), "mode {mode:?}");
        assert_eq!(status_of("slow.vcf"), Some(OutcomeStatus::Failed(-1)), "mode {mode:?}");
        assert_eq!(ledger.lock().unwrap().killed, vec!["slow.vcf".to_string()]);
    }
}

#[tokio::test]
async fn empty_worklist_finishes_immediately() {
    let launcher = FakeLauncher::new(FakeScript::exits(0));
    let config = SupervisorConfigBuilder::new().build();

    let report = run_bounded(Supervisor::new(Vec::new(), &config, launcher)).await;

    assert!(report.outcomes.is_empty());
    assert!(report.all_succeeded());
}
