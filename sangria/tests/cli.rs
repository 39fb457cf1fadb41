use std::process::Command;

#[test]
fn test_sangria_binary() {
    let output = Command::new(env!("CARGO_BIN_EXE_sangria"))
        .arg("execute")
        .arg("--n-iterations")
        .arg("3")
        .arg("--start")
        .arg("2")
        .arg("--circuit")
        .arg("fibonacci")
        .output()
        .expect("Failed to execute binary");

    assert!(
        output.status.success(),
        "Binary did not exit successfully: {:?}",
        output
    );
}

#[test]
fn test_sangria_binary_rejects_zero_iterations() {
    let output = Command::new(env!("CARGO_BIN_EXE_sangria"))
        .arg("execute")
        .arg("--n-iterations")
        .arg("0")
        .output()
        .expect("Failed to execute binary");
    assert!(!output.status.success());
}
