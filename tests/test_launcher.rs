use std::fs;
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::time::Duration;

use tempfile::TempDir;

use dummy_services_runner::procs::{supervise, Supervision};
use dummy_services_runner::{
    run, Console, Launcher, OutputMode, ProcessHandle, RunOutcome, ServiceDescriptor, WaitMode,
};

/// Lays out `Couriers/courier.js` and `E-stores/estore.js` as shell scripts
fn service_tree(courier: &str, estore: &str) -> TempDir {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir(root.path().join("Couriers")).unwrap();
    fs::create_dir(root.path().join("E-stores")).unwrap();
    fs::write(root.path().join("Couriers/courier.js"), courier).unwrap();
    fs::write(root.path().join("E-stores/estore.js"), estore).unwrap();
    root
}

fn sh_launcher(root: &Path) -> Launcher {
    Launcher::new(root).interpreter("sh")
}

fn output(console: Console<Vec<u8>>) -> String {
    String::from_utf8(console.into_inner()).unwrap()
}

#[tokio::test]
#[cfg(unix)]
async fn test_launch_runs_entry_in_its_directory() {
    let root = service_tree("pwd -P > started-in\n", "exit 0\n");
    let launcher = sh_launcher(root.path());
    let mut console = Console::new(Vec::new());

    let mut courier = launcher
        .launch(&mut console, &ServiceDescriptor::courier())
        .unwrap();
    let status = courier.wait().await.unwrap();

    assert!(status.success());
    assert_eq!(output(console), "Started service: ./Couriers/courier.js\n");

    let started_in = fs::read_to_string(root.path().join("Couriers/started-in")).unwrap();
    let home = root.path().join("Couriers").canonicalize().unwrap();
    assert_eq!(Path::new(started_in.trim_end()), home);
}

#[tokio::test]
#[cfg(unix)]
async fn test_launch_captures_output() {
    let root = service_tree("echo 'Courier service running on port 4002'\n", "exit 0\n");
    let launcher = sh_launcher(root.path());
    let mut console = Console::new(Vec::new());

    let mut courier = launcher
        .launch(&mut console, &ServiceDescriptor::courier())
        .unwrap();

    let mut stdout = courier.take_stdout().expect("stdout is piped");
    assert!(courier.take_stderr().is_some());

    let mut captured = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut stdout, &mut captured)
        .await
        .unwrap();
    courier.wait().await.unwrap();

    assert_eq!(captured, "Courier service running on port 4002\n");
}

#[tokio::test]
#[cfg(unix)]
async fn test_launch_discard_has_no_pipes() {
    let root = service_tree("echo noise\n", "exit 0\n");
    let launcher = sh_launcher(root.path()).output(OutputMode::Discard);
    let mut console = Console::new(Vec::new());

    let mut courier = launcher
        .launch(&mut console, &ServiceDescriptor::courier())
        .unwrap();

    assert!(courier.take_stdout().is_none());
    assert!(courier.take_stderr().is_none());
    assert!(courier.wait().await.unwrap().success());
}

#[tokio::test]
#[cfg(unix)]
async fn test_drain_keeps_chatty_service_running() {
    // well past the 64 KiB pipe buffer on both streams, with bytes that are not UTF-8
    let courier = r#"printf '\377\376 not utf-8\n'
printf '\377\n' >&2
i=0
while [ $i -lt 20000 ]; do
    echo "dispatch $i: courier agent assigned to order, status pending"
    echo "tracking $i: no update from courier agent yet" >&2
    i=$((i + 1))
done
exit 0
"#;
    let root = service_tree(courier, "exit 0\n");
    let launcher = sh_launcher(root.path()).output(OutputMode::Drain);
    let mut console = Console::new(Vec::new());

    let mut courier = launcher
        .launch(&mut console, &ServiceDescriptor::courier())
        .unwrap();

    assert!(courier.take_stdout().is_none());
    assert!(courier.take_stderr().is_none());

    let status = tokio::time::timeout(Duration::from_secs(60), courier.wait())
        .await
        .expect("drained courier blocked on its output")
        .unwrap();
    assert!(status.success(), "{}", status);
}

#[tokio::test]
#[cfg(unix)]
async fn test_launch_missing_interpreter() {
    let root = service_tree("exit 0\n", "exit 0\n");
    let launcher = Launcher::new(root.path()).interpreter("no-such-interpreter-for-dummy-services");
    let mut console = Console::new(Vec::new());

    let failure = launcher
        .launch(&mut console, &ServiceDescriptor::courier())
        .unwrap_err();

    assert!(!failure.error().to_string().is_empty());
    let output = output(console);
    let prefix = "Error starting service ./Couriers/courier.js: ";
    assert!(output.starts_with(prefix), "{}", output);
    assert!(output.len() > prefix.len() + 1);
}

#[tokio::test]
#[cfg(unix)]
async fn test_launch_missing_entry_file() {
    let root = tempfile::tempdir().unwrap();
    let launcher = sh_launcher(root.path());
    let mut console = Console::new(Vec::new());

    let failure = launcher
        .launch(&mut console, &ServiceDescriptor::estore())
        .unwrap_err();

    assert_eq!(failure.descriptor(), &ServiceDescriptor::estore());
    assert!(output(console).starts_with("Error starting service ./E-stores/estore.js: "));
}

#[tokio::test]
#[cfg(unix)]
async fn test_run_waits_for_both() {
    let root = service_tree("pwd -P > started-in\n", "pwd -P > started-in\nexit 4\n");
    let launcher = sh_launcher(root.path());
    let mut console = Console::new(Vec::new());
    let cwd = std::env::current_dir().unwrap();

    let outcome = run(
        &launcher,
        &mut console,
        WaitMode::Sequential,
        futures::future::pending(),
    )
    .await
    .unwrap();

    match outcome {
        RunOutcome::Completed { courier, estore } => {
            assert!(courier.success());
            assert_eq!(estore.code(), Some(4));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    assert_eq!(std::env::current_dir().unwrap(), cwd);
    let started_in = fs::read_to_string(root.path().join("E-stores/started-in")).unwrap();
    let home = root.path().join("E-stores").canonicalize().unwrap();
    assert_eq!(Path::new(started_in.trim_end()), home);

    assert_eq!(
        output(console),
        "Started service: ./Couriers/courier.js\nStarted service: ./E-stores/estore.js\n"
    );
}

#[tokio::test]
#[cfg(unix)]
async fn test_run_skips_wait_when_a_launch_fails() {
    let root = service_tree("exec sleep 30\n", "exit 0\n");
    fs::remove_file(root.path().join("E-stores/estore.js")).unwrap();
    let launcher = sh_launcher(root.path());
    let mut console = Console::new(Vec::new());

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        run(
            &launcher,
            &mut console,
            WaitMode::Sequential,
            futures::future::pending(),
        ),
    )
    .await
    .expect("run waited on a service")
    .unwrap();

    let (mut running, failures) = match outcome {
        RunOutcome::Incomplete { running, failures } => (running, failures),
        other => panic!("unexpected outcome: {:?}", other),
    };

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].descriptor(), &ServiceDescriptor::estore());
    assert_eq!(running.len(), 1);

    // the courier keeps running in the background
    let courier = &mut running[0];
    assert_eq!(courier.descriptor(), &ServiceDescriptor::courier());
    assert!(courier.id().is_some());
    courier.terminate().unwrap();
    let status = tokio::time::timeout(Duration::from_secs(5), courier.wait())
        .await
        .expect("courier ignored SIGTERM")
        .unwrap();
    assert_eq!(status.signal(), Some(libc::SIGTERM));

    let output = output(console);
    let mut lines = output.lines();
    assert_eq!(lines.next(), Some("Started service: ./Couriers/courier.js"));
    assert!(lines
        .next()
        .unwrap()
        .starts_with("Error starting service ./E-stores/estore.js: "));
    assert_eq!(lines.next(), None);
}

#[tokio::test]
#[cfg(unix)]
async fn test_run_with_nothing_launched() {
    let root = tempfile::tempdir().unwrap();
    let launcher = sh_launcher(root.path());
    let mut console = Console::new(Vec::new());

    let outcome = run(
        &launcher,
        &mut console,
        WaitMode::Sequential,
        futures::future::pending(),
    )
    .await
    .unwrap();

    match outcome {
        RunOutcome::Incomplete { running, failures } => {
            assert!(running.is_empty());
            assert_eq!(failures.len(), 2);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(output(console).lines().count(), 2);
}

#[tokio::test]
#[cfg(unix)]
async fn test_interrupt_terminates_running_services() {
    let root = service_tree("exec sleep 30\n", "exit 0\n");
    let launcher = sh_launcher(root.path());
    let mut console = Console::new(Vec::new());

    let mut courier = launcher
        .launch(&mut console, &ServiceDescriptor::courier())
        .unwrap();
    let mut estore = launcher
        .launch(&mut console, &ServiceDescriptor::estore())
        .unwrap();

    // estore has long exited by the time the interrupt fires, but is never observed
    let supervision = supervise(
        &mut console,
        &mut courier,
        &mut estore,
        WaitMode::Sequential,
        tokio::time::sleep(Duration::from_millis(300)),
    )
    .await
    .unwrap();
    assert_eq!(supervision, Supervision::Interrupted);

    let courier_status = tokio::time::timeout(Duration::from_secs(5), courier.wait())
        .await
        .expect("courier ignored SIGTERM")
        .unwrap();
    assert_eq!(courier_status.signal(), Some(libc::SIGTERM));
    assert!(estore.wait().await.unwrap().success());

    assert!(output(console).ends_with("\nShutting down services...\n"));
}

#[tokio::test]
#[cfg(unix)]
async fn test_concurrent_wait_with_real_services() {
    let root = service_tree("sleep 0.2\n", "exit 0\n");
    let launcher = sh_launcher(root.path());
    let mut console = Console::new(Vec::new());

    let outcome = run(
        &launcher,
        &mut console,
        WaitMode::Concurrent,
        futures::future::pending(),
    )
    .await
    .unwrap();

    assert!(matches!(outcome, RunOutcome::Completed { .. }));
}
