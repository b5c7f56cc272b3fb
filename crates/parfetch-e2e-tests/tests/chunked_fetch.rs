use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::Duration;

use parfetch_e2e_tests::{RangeServer, ServerOptions, patterned_payload};
use parfetch_lib::ParfetchError;
use parfetch_lib::cli::{Command, GetParams, ResolvedCommand, resolve_command, run_get};

fn build_get_params(
    url: &str,
    output: &Path,
    chunk_size: u64,
    workers: usize,
    verify: bool,
) -> GetParams {
    let command = Command::Get {
        url: url.to_string(),
        output: Some(output.to_str().unwrap().to_string()),
        config_path: None,
        chunk_size: Some(chunk_size),
        workers: Some(workers),
        verify,
    };
    match resolve_command(command).expect("Failed to resolve get command") {
        ResolvedCommand::Get(params) => params,
        _ => unreachable!("Resolved command type mismatch"),
    }
}

#[tokio::test]
async fn test_download_reproduces_source_bytes() {
    init_tracing();

    let payload = patterned_payload(1250);
    let server = RangeServer::start(payload.clone(), ServerOptions::default()).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("payload.bin");

    let params = build_get_params(&server.url(), &output, 256, 16, false);
    run_get(params).await.expect("download should succeed");

    let fetched = std::fs::read(&output).expect("read output");
    assert_eq!(fetched, payload, "output must match the source byte for byte");

    assert_eq!(server.stats().head_requests.load(Ordering::SeqCst), 1);
    assert_eq!(
        server.stats().range_requests.load(Ordering::SeqCst),
        5,
        "1250 bytes in 256-byte chunks is 5 ranges"
    );
}

#[tokio::test]
async fn test_out_of_order_completion_is_safe() {
    init_tracing();

    // The first chunk finishes last; its bytes must still land first.
    let payload = patterned_payload(8192);
    let options = ServerOptions {
        slow_offset: Some((0, Duration::from_millis(100))),
        ..Default::default()
    };
    let server = RangeServer::start(payload.clone(), options).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("payload.bin");

    let params = build_get_params(&server.url(), &output, 512, 8, false);
    run_get(params).await.expect("download should succeed");

    let fetched = std::fs::read(&output).expect("read output");
    assert_eq!(fetched, payload);
}

#[tokio::test]
async fn test_concurrency_never_exceeds_worker_limit() {
    init_tracing();

    let payload = patterned_payload(8192);
    let options = ServerOptions {
        response_delay: Some(Duration::from_millis(20)),
        ..Default::default()
    };
    let server = RangeServer::start(payload.clone(), options).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("payload.bin");

    let params = build_get_params(&server.url(), &output, 256, 4, false);
    run_get(params).await.expect("download should succeed");

    let observed_max = server.stats().max_in_flight.load(Ordering::SeqCst);
    assert!(
        observed_max <= 4,
        "expected at most 4 concurrent range requests, observed {observed_max}"
    );

    let fetched = std::fs::read(&output).expect("read output");
    assert_eq!(fetched, payload);
}

#[tokio::test]
async fn test_missing_content_length_fails_before_any_range_request() {
    init_tracing();

    let options = ServerOptions {
        omit_content_length: true,
        ..Default::default()
    };
    let server = RangeServer::start(patterned_payload(4096), options).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("payload.bin");

    let params = build_get_params(&server.url(), &output, 256, 4, false);
    let error = run_get(params).await.expect_err("download should fail");

    assert!(
        matches!(error, ParfetchError::MissingContentLength { .. }),
        "expected a missing-content-length error, got {error:?}"
    );
    assert_eq!(
        server.stats().range_requests.load(Ordering::SeqCst),
        0,
        "no ranged request may be issued without a known length"
    );
}

#[tokio::test]
async fn test_failing_range_reports_its_offset_and_stops_dispatch() {
    init_tracing();

    // 64 chunks of 128 bytes; the one at offset 512 gets a 500.
    let payload = patterned_payload(8192);
    let options = ServerOptions {
        fail_at_offset: Some(512),
        response_delay: Some(Duration::from_millis(20)),
        ..Default::default()
    };
    let server = RangeServer::start(payload, options).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("payload.bin");

    let params = build_get_params(&server.url(), &output, 128, 4, false);
    let error = run_get(params).await.expect_err("download should fail");

    match error {
        ParfetchError::UnexpectedStatus { offset, status } => {
            assert_eq!(offset, 512);
            assert_eq!(status.as_u16(), 500);
        }
        other => panic!("expected an unexpected-status error, got {other:?}"),
    }

    let dispatched = server.stats().range_requests.load(Ordering::SeqCst);
    assert!(
        dispatched < 64,
        "dispatch must stop after the failure; saw {dispatched} of 64 ranges requested"
    );
}

#[tokio::test]
async fn test_failure_identifies_midfile_chunk() {
    init_tracing();

    // 5 ranges; the third ([512-767]) gets a 500. With 16 workers every
    // range may have been dispatched, but the reported offset must be the
    // failing one.
    let payload = patterned_payload(1250);
    let options = ServerOptions {
        fail_at_offset: Some(512),
        ..Default::default()
    };
    let server = RangeServer::start(payload, options).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("payload.bin");

    let params = build_get_params(&server.url(), &output, 256, 16, false);
    let error = run_get(params).await.expect_err("download should fail");

    assert!(
        matches!(error, ParfetchError::UnexpectedStatus { offset: 512, .. }),
        "expected the failure to name offset 512, got {error:?}"
    );
}

#[tokio::test]
async fn test_zero_length_file_downloads_empty_output() {
    init_tracing();

    let server = RangeServer::start(Vec::new(), ServerOptions::default()).await;
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("payload.bin");

    let params = build_get_params(&server.url(), &output, 256, 4, false);
    run_get(params).await.expect("download should succeed");

    let fetched = std::fs::read(&output).expect("read output");
    assert!(fetched.is_empty());
    assert_eq!(server.stats().range_requests.load(Ordering::SeqCst), 0);
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("parfetch=debug,parfetch_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
