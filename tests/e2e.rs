use std::process::Command;

fn run(transactions: &str, uploads: &str) -> (String, String, bool) {
    let output = Command::new(env!("CARGO_BIN_EXE_promptpay-slip"))
        .arg(format!("tests/fixtures/{transactions}"))
        .arg(format!("tests/fixtures/{uploads}"))
        .env("RUST_LOG", "warn")
        .env("NO_COLOR", "1")
        .env("PROMPTPAY_EASYSLIP_API_KEY", "test-key")
        .env_remove("PROMPTPAY_AMOUNT_TOLERANCE")
        .env_remove("PROMPTPAY_ACCOUNT_MATCHING")
        .env_remove("PROMPTPAY_TELEGRAM_TOKEN")
        .env_remove("PROMPTPAY_TELEGRAM_CHAT_ID")
        .output()
        .expect("failed to run binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn verifies_uploads_in_order() {
    let (stdout, stderr, success) = run("transactions.csv", "uploads.jsonl");

    assert!(success);

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[0], "transaction,result,category,reason");
    assert_eq!(lines[1], "11111111-1111-4111-8111-111111111111,approved,,");
    assert_eq!(
        lines[2],
        "22222222-2222-4222-8222-222222222222,rejected,amount,จำนวนเงินไม่ตรงกัน คาดหวัง: 100.00 บาท แต่ได้รับ: 100.02 บาท"
    );
    // same slip as the first upload
    assert_eq!(
        lines[3],
        "33333333-3333-4333-8333-333333333333,rejected,replay,สลิปนี้ถูกใช้ไปแล้ว กรุณาใช้สลิปใหม่"
    );
    // slip already recorded on a transaction completed before the run
    assert_eq!(
        lines[4],
        "22222222-2222-4222-8222-222222222222,rejected,replay,สลิปนี้ถูกใช้ไปแล้ว กรุณาใช้สลิปใหม่"
    );
    assert_eq!(
        lines[5],
        "55555555-5555-4555-8555-555555555555,error,,\"transaction 55555555-5555-4555-8555-555555555555 is cancelled, not pending\""
    );
    assert_eq!(lines[6], "33333333-3333-4333-8333-333333333333,approved,,");
    assert_eq!(
        lines[7],
        "22222222-2222-4222-8222-222222222222,rejected,invalid_api_key,API Key ไม่ถูกต้อง โปรดติดต่อ ผู้ออกบิล"
    );
    assert_eq!(
        lines[8],
        "99999999-9999-4999-8999-999999999999,error,,transaction 99999999-9999-4999-8999-999999999999 not found"
    );

    assert!(stderr.contains("not pending"));
    assert!(stderr.contains("not found"));
}

#[test]
fn errors_warn_but_do_not_block() {
    let (stdout, stderr, success) = run("transactions_with_errors.csv", "uploads_with_errors.jsonl");

    assert!(success);
    assert!(stderr.contains("line 3: failed to parse row"));
    assert!(stderr.contains("line 4: invalid amount 'abc'"));
    assert!(stderr.contains("line 1: failed to parse upload"));

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "transaction,result,category,reason");
    assert_eq!(
        lines[1],
        "11111111-1111-4111-8111-111111111111,error,,slip provider returned status 500"
    );
    assert_eq!(lines[2], "11111111-1111-4111-8111-111111111111,approved,,");
}

#[test]
fn missing_api_key_fails_every_upload() {
    let output = Command::new(env!("CARGO_BIN_EXE_promptpay-slip"))
        .arg("tests/fixtures/transactions.csv")
        .arg("tests/fixtures/uploads.jsonl")
        .env("RUST_LOG", "off")
        .env_remove("PROMPTPAY_EASYSLIP_API_KEY")
        .output()
        .expect("failed to run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines().skip(1);
    assert_eq!(
        lines.next(),
        Some("11111111-1111-4111-8111-111111111111,error,,merchant has no slip provider API key")
    );
}

#[test]
fn usage_without_arguments() {
    let output = Command::new(env!("CARGO_BIN_EXE_promptpay-slip"))
        .output()
        .expect("failed to run binary");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage"));
}
