use std::time::Duration;

use pgwire_smoke::{ConnectionConfig, RunOptions, SmokeError, run};

#[test]
fn test05_unreachable_server_is_a_connection_error() -> Result<(), Box<dyn std::error::Error>> {
    let options = RunOptions {
        connection: ConnectionConfig {
            port: 1,
            connect_timeout: Some(Duration::from_secs(2)),
            ..ConnectionConfig::default()
        },
        ..RunOptions::default()
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let failure = rt.block_on(run(&options)).unwrap_err();
    assert!(
        matches!(failure.error, SmokeError::ConnectionError(_)),
        "got {:?}",
        failure.error
    );
    assert!(failure.to_string().contains("127.0.0.1:1"));
    assert!(failure.report.steps.is_empty());
    assert!(failure.report.failure.is_some());
    Ok(())
}
