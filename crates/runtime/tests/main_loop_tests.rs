use std::path::PathBuf;
use std::process::{Command, Output};

fn scene(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../scene/tests/data")
        .join(name)
}

fn run(args: &[&str]) -> Output {
    let output = Command::new(env!("CARGO_BIN_EXE_runtime_main"))
        .args(args)
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to spawn runtime_main");
    eprintln!("--- runtime_main STDOUT ---\n{}", String::from_utf8_lossy(&output.stdout));
    eprintln!("--- runtime_main STDERR ---\n{}", String::from_utf8_lossy(&output.stderr));
    output
}

#[test]
fn runs_scene_to_completion() {
    let path = scene("drop.json");
    let output = run(&["--scene", path.to_str().unwrap(), "--steps", "120", "--log-every", "60"]);
    assert!(output.status.success(), "exit code {:?}", output.status.code());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("scene loaded"));
    assert!(stdout.contains("simulation finished"));
    assert_eq!(stdout.matches("step complete").count(), 2);
    assert!(stdout.contains("ball"));
}

#[test]
fn missing_scene_fails() {
    let output = run(&["--scene", "no/such/scene.json", "--steps", "1"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("scene.json"));
}

#[test]
fn zero_time_step_is_rejected() {
    let path = scene("drop.json");
    let output = run(&["--scene", path.to_str().unwrap(), "--dt=0"]);
    assert!(!output.status.success());
}
