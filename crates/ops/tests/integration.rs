//! Integration tests for ops crate

use async_trait::async_trait;
use gotools_config::{Config, PackageConfig};
use gotools_errors::{Error, InstallError, OpsError, PlatformError};
use gotools_events::{AppEvent, EventReceiver, PhaseEvent, ProcessOrigin};
use gotools_install::PackageSpec;
use gotools_net::NetClient;
use gotools_ops::{run_phase, BuildPhase, OpsContextBuilder, Orchestrator, PhaseKind};
use gotools_platform::{Platform, PlatformCommand, PlatformContext, ProcessOperations};
use gotools_resources::PhaseLimits;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
struct Record {
    command: String,
    cmd: PlatformCommand,
    origin: ProcessOrigin,
    started: Instant,
    finished: Instant,
}

/// Pretends to run commands: sleeps, honours cancellation, records timing
struct MockProcess {
    delay: Duration,
    slow_on: Option<String>,
    fail_on: Option<String>,
    active: AtomicUsize,
    peak: AtomicUsize,
    log: Mutex<Vec<Record>>,
}

impl MockProcess {
    fn new() -> Self {
        Self {
            delay: Duration::from_millis(20),
            slow_on: None,
            fail_on: None,
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(mut self, fragment: &str) -> Self {
        self.fail_on = Some(fragment.to_string());
        self
    }

    fn slow_on(mut self, fragment: &str) -> Self {
        self.slow_on = Some(fragment.to_string());
        self
    }

    fn records(&self) -> Vec<Record> {
        self.log.lock().unwrap().clone()
    }

    fn commands(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.command).collect()
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessOperations for MockProcess {
    async fn execute_command(&self, ctx: &PlatformContext, cmd: PlatformCommand) -> Result<(), Error> {
        let command = cmd.display();
        let delay = match &self.slow_on {
            Some(fragment) if command.contains(fragment.as_str()) => Duration::from_secs(30),
            _ => self.delay,
        };

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let started = Instant::now();

        let cancelled = tokio::select! {
            () = ctx.cancellation().cancelled() => true,
            () = tokio::time::sleep(delay) => false,
        };

        self.active.fetch_sub(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(Record {
            command: command.clone(),
            cmd,
            origin: ctx.origin().clone(),
            started,
            finished: Instant::now(),
        });

        if cancelled {
            return Err(PlatformError::Cancelled { command }.into());
        }
        match &self.fail_on {
            Some(fragment) if command.contains(fragment.as_str()) => {
                Err(PlatformError::CommandFailed {
                    command,
                    exit_code: Some(2),
                }
                .into())
            }
            _ => Ok(()),
        }
    }
}

fn config(packages: Vec<PackageConfig>) -> Config {
    Config {
        cwd: PathBuf::from("/work"),
        gopath: PathBuf::from("/gopath"),
        packages,
        pre_commands: vec![vec!["echo".to_string(), "pre".to_string()]],
        post_commands: vec![vec!["echo".to_string(), "post".to_string()]],
        ..Config::default()
    }
}

fn orchestrator(config: Config, process: Arc<MockProcess>, parallel: usize) -> (Orchestrator, EventReceiver) {
    let (tx, rx) = gotools_events::channel();
    let ctx = OpsContextBuilder::new()
        .with_config(Arc::new(config))
        .with_platform(Platform::new(process))
        .with_net(NetClient::with_defaults().unwrap())
        .with_event_sender(tx)
        .build()
        .unwrap();
    let orchestrator = Orchestrator::new(ctx)
        .with_limits(PhaseLimits::for_cpus(parallel + 1, 0))
        .with_path("/usr/bin:/bin");
    (orchestrator, rx)
}

fn package_of(record: &Record) -> Option<&str> {
    match &record.origin {
        ProcessOrigin::Package { package, .. } => Some(package.as_str()),
        _ => None,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_phase_respects_capacity_and_precedes_post_commands() {
    let process = Arc::new(MockProcess::new());
    let config = config(vec![
        PackageConfig::new("github.com/a/one"),
        PackageConfig::new("github.com/a/two"),
        PackageConfig::new("github.com/a/three"),
    ]);
    let (orchestrator, _rx) = orchestrator(config, process.clone(), 2);

    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.packages_installed(), 3);
    assert_eq!(report.pre_commands, 1);
    assert_eq!(report.post_commands, 1);
    assert!(process.peak() <= 2, "peak was {}", process.peak());

    let records = process.records();
    let post = records
        .iter()
        .find(|r| r.command == "echo post")
        .expect("post command ran");
    let pre = records
        .iter()
        .find(|r| r.command == "echo pre")
        .expect("pre command ran");
    for record in records.iter().filter(|r| package_of(r).is_some()) {
        assert!(record.finished <= post.started);
        assert!(record.started >= pre.finished);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failing_package_stops_the_run() {
    let process = Arc::new(MockProcess::new().failing_on("go install github.com/a/bad"));
    let config = config(vec![
        PackageConfig::new("github.com/a/good"),
        PackageConfig::new("github.com/a/bad"),
        PackageConfig::new("github.com/a/alone").single(),
    ]);
    let (orchestrator, _rx) = orchestrator(config, process.clone(), 2);

    let err = orchestrator.run().await.unwrap_err();

    match &err {
        Error::Install(InstallError::PackageFailed { package, step, .. }) => {
            assert_eq!(package, "github.com/a/bad");
            assert_eq!(step, "install");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let commands = process.commands();
    assert!(!commands.iter().any(|c| c == "echo post"));
    assert!(!commands.iter().any(|c| c.contains("github.com/a/alone")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_packages_run_alone_after_parallel_phase() {
    let process = Arc::new(MockProcess::new());
    let config = config(vec![
        PackageConfig::new("github.com/a/one"),
        PackageConfig::new("github.com/s/first").single(),
        PackageConfig::new("github.com/a/two"),
        PackageConfig::new("github.com/s/second").single(),
        PackageConfig::new("github.com/a/three"),
    ]);
    let (orchestrator, _rx) = orchestrator(config, process.clone(), 3);

    let report = orchestrator.run().await.unwrap();
    assert_eq!(report.phases.len(), 2);
    assert_eq!(report.phases[0].kind, PhaseKind::Parallel);
    assert_eq!(report.phases[0].packages.len(), 3);
    assert_eq!(report.phases[1].kind, PhaseKind::Single);
    assert_eq!(report.phases[1].concurrency, 1);

    let records = process.records();
    let is_single = |r: &Record| package_of(r).is_some_and(|p| p.starts_with("github.com/s/"));
    let is_parallel = |r: &Record| package_of(r).is_some_and(|p| p.starts_with("github.com/a/"));

    let last_parallel = records
        .iter()
        .filter(|r| is_parallel(r))
        .map(|r| r.finished)
        .max()
        .unwrap();
    let singles: Vec<_> = records.iter().filter(|r| is_single(r)).collect();
    assert!(!singles.is_empty());
    for record in &singles {
        assert!(record.started >= last_parallel);
    }

    // One at a time: no two single-package commands overlap.
    for a in &singles {
        for b in &singles {
            if package_of(a) != package_of(b) {
                assert!(a.finished <= b.started || b.finished <= a.started);
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failure_cancels_running_siblings() {
    let process = Arc::new(
        MockProcess::new()
            .slow_on("go get -d github.com/a/slow")
            .failing_on("go get -d github.com/a/bad"),
    );
    let config = config(vec![
        PackageConfig::new("github.com/a/slow"),
        PackageConfig::new("github.com/a/bad"),
    ]);
    let (orchestrator, mut rx) = orchestrator(config, process.clone(), 2);

    let started = Instant::now();
    let err = orchestrator.run().await.unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!err.is_cancellation());

    let mut cancelled_count = None;
    while let Ok(message) = rx.try_recv() {
        if let AppEvent::Phase(PhaseEvent::Failed { cancelled, .. }) = message.event {
            cancelled_count = Some(cancelled);
        }
    }
    assert_eq!(cancelled_count, Some(1));
    assert!(!process.commands().iter().any(|c| c.contains("install github.com/a/slow")));
}

#[tokio::test]
async fn failing_pre_command_names_step_and_index() {
    let process = Arc::new(MockProcess::new().failing_on("false"));
    let mut config = config(vec![PackageConfig::new("github.com/a/one")]);
    config.pre_commands = vec![
        vec!["echo".to_string(), "ok".to_string()],
        vec!["false".to_string()],
    ];
    let (orchestrator, _rx) = orchestrator(config, process.clone(), 2);

    let err = orchestrator.run().await.unwrap_err();
    match err {
        Error::Ops(OpsError::CommandFailed { step, index, .. }) => {
            assert_eq!(step, "pre_commands");
            assert_eq!(index, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(process.commands(), vec!["echo ok", "false"]);
}

#[tokio::test]
async fn hook_commands_run_in_cwd_with_go_environment() {
    let process = Arc::new(MockProcess::new());
    let (orchestrator, _rx) = orchestrator(config(Vec::new()), process.clone(), 2);

    let report = orchestrator.run().await.unwrap();
    assert_eq!(report.packages_installed(), 0);

    let records = process.records();
    assert_eq!(records.len(), 2);
    assert!(matches!(
        records[0].origin,
        ProcessOrigin::Command { index: 0, .. }
    ));
    for record in &records {
        assert_eq!(record.cmd.get_current_dir(), Some(&PathBuf::from("/work")));
        assert!(record.cmd.clears_env());
        assert_eq!(
            record.cmd.get_env_vars(),
            [
                ("GOPATH".to_string(), "/gopath".to_string()),
                ("PATH".to_string(), "/usr/bin:/bin".to_string()),
            ]
        );
    }
}

#[tokio::test]
async fn dry_run_executes_nothing() {
    let process = Arc::new(MockProcess::new());
    let config = config(vec![
        PackageConfig::new("github.com/a/one").with_version("v1.0.0"),
        PackageConfig::new("github.com/s/alone").single(),
    ]);
    let (orchestrator, _rx) = orchestrator(config, process.clone(), 4);

    let plan = orchestrator.dry_run().await.unwrap();

    assert!(process.commands().is_empty());
    assert_eq!(plan.pre_commands, vec!["echo pre"]);
    assert_eq!(plan.post_commands, vec!["echo post"]);
    assert_eq!(plan.phases[0].concurrency, 4);
    assert_eq!(plan.phases[0].packages[0].version, "v1.0.0");
    assert_eq!(
        plan.phases[0].packages[0].commands,
        vec![
            "go get -d github.com/a/one",
            "git fetch -q --tags origin v1.0.0",
            "git reset --hard v1.0.0",
            "go install github.com/a/one",
        ]
    );
    assert_eq!(plan.phases[1].packages[0].commands.len(), 2);
    assert!(plan.to_json().unwrap().contains("github.com/s/alone"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn phase_driver_caps_concurrency() {
    let (tx, _rx) = gotools_events::channel();
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let packages = (0..10)
        .map(|i| PackageSpec::new(format!("github.com/p/{i}")))
        .collect();
    let phase = BuildPhase::new(PhaseKind::Parallel, 3, packages);

    let report = run_phase(&phase, &tx, &CancellationToken::new(), |_spec, _cancel| {
        let active = active.clone();
        let peak = peak.clone();
        async move {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            active.fetch_sub(1, Ordering::SeqCst);
            Ok::<(), Error>(())
        }
    })
    .await
    .unwrap();

    assert_eq!(report.packages.len(), 10);
    assert!(peak.load(Ordering::SeqCst) <= 3);
    assert_eq!(active.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn phase_driver_stops_submitting_after_failure() {
    let (tx, _rx) = gotools_events::channel();
    let started = Arc::new(Mutex::new(Vec::new()));
    let packages = ["first", "broken", "never"]
        .into_iter()
        .map(PackageSpec::new)
        .collect();
    let phase = BuildPhase::new(PhaseKind::Single, 1, packages);

    let err = run_phase(&phase, &tx, &CancellationToken::new(), |spec, _cancel| {
        let started = started.clone();
        async move {
            started.lock().unwrap().push(spec.name().to_string());
            if spec.name() == "broken" {
                Err(Error::internal("boom"))
            } else {
                Ok(())
            }
        }
    })
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Internal(_)));
    assert_eq!(*started.lock().unwrap(), vec!["first", "broken"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn phase_driver_never_starts_a_package_after_a_failure() {
    let (tx, _rx) = gotools_events::channel();
    let mut late_starts = 0;

    for _ in 0..300 {
        let started = Arc::new(Mutex::new(Vec::new()));
        let packages = ["broken", "after1", "after2"]
            .into_iter()
            .map(PackageSpec::new)
            .collect();
        let phase = BuildPhase::new(PhaseKind::Parallel, 1, packages);

        let err = run_phase(&phase, &tx, &CancellationToken::new(), |spec, _cancel| {
            started.lock().unwrap().push(spec.name().to_string());
            async move {
                if spec.name() == "broken" {
                    Err(Error::internal("boom"))
                } else {
                    Ok(())
                }
            }
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Internal(_)));
        late_starts += started.lock().unwrap().len() - 1;
    }

    assert_eq!(late_starts, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn phase_failure_wins_over_sibling_cancellations() {
    let (tx, _rx) = gotools_events::channel();

    for _ in 0..50 {
        let packages = ["slow1", "broken", "slow2"]
            .into_iter()
            .map(PackageSpec::new)
            .collect();
        let phase = BuildPhase::new(PhaseKind::Parallel, 3, packages);

        let err = run_phase(&phase, &tx, &CancellationToken::new(), |spec, cancel| async move {
            if spec.name() == "broken" {
                return Err::<(), Error>(Error::internal("boom"));
            }
            cancel.cancelled().await;
            Err(Error::Cancelled)
        })
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Internal(_)));
    }
}

#[tokio::test]
async fn phase_reports_outer_cancellation() {
    let (tx, _rx) = gotools_events::channel();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let phase = BuildPhase::new(PhaseKind::Single, 1, vec![PackageSpec::new("github.com/p/x")]);

    let err = run_phase(&phase, &tx, &cancel, |_spec, _cancel| async {
        Ok::<(), Error>(())
    })
    .await
    .unwrap_err();

    assert!(err.is_cancellation());
}

async fn exploding_install(_spec: PackageSpec, _cancel: CancellationToken) -> Result<(), Error> {
    panic!("installer bug");
}

#[tokio::test]
async fn phase_driver_reports_panics() {
    let (tx, _rx) = gotools_events::channel();
    let phase = BuildPhase::new(PhaseKind::Parallel, 2, vec![PackageSpec::new("github.com/p/x")]);

    let err = run_phase(&phase, &tx, &CancellationToken::new(), exploding_install)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Ops(OpsError::PhaseFailed { .. })));
}

#[tokio::test]
async fn missing_components_are_reported() {
    let err = OpsContextBuilder::new().build().unwrap_err();
    assert!(matches!(err, Error::Ops(OpsError::MissingComponent { .. })));
}
