#![cfg(feature = "test-utils")]

use pgwire_smoke::prelude::*;
use pgwire_smoke::scenario::expect;
use pgwire_smoke::test_utils::{setup_postgres_embedded, stop_postgres_embedded};

fn smoke_cfg() -> ConnectionConfig {
    ConnectionConfig {
        dbname: "smoke_db".to_string(),
        ..ConnectionConfig::default()
    }
}

#[test]
fn test01_driver_scenario_verified() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded(&smoke_cfg())?;
    let options = RunOptions {
        connection: pg.config.clone(),
        scenario: ScenarioKind::Driver,
        verify: true,
        ..RunOptions::default()
    };

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(run(&options))?;
    assert!(report.verified);
    assert_eq!(report.scenario, "driver");

    let lines: Vec<String> = report.echoed().map(ToString::to_string).collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], "default autocommit: true");
    assert_eq!(lines[2], "res2:[[2, record2, 2]]");
    assert_eq!(lines[3], "pstmt1.rs1:[[1, rec1, 11]]");
    assert_eq!(lines[4], "pstmt1.rs1:[[2, record2, 2]]");
    assert_eq!(lines[5], "pstmt3.rs3:[[1, Rec1, 2]]");
    assert_eq!(lines[6], "pstmt3.rs3:[[2, Rec2, 3]]");

    // Row order of an unordered select is up to the server
    let res1: Vec<&ResultSet> = report.labeled_rows("res1").collect();
    assert_eq!(res1.len(), 1);
    expect::check_rows("res1", &expect::after_update(), res1[0])?;
    assert_eq!(res1[0].columns.as_slice(), ["id", "info", "wt"]);

    // The table is gone and the default autocommit restored
    rt.block_on(async {
        let mut session = Session::connect(&pg.config).await?;
        assert!(!session.table_exists("t1").await?);
        assert!(session.autocommit());
        session.close().await
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}

#[test]
fn test01_driver_scenario_rerun_and_custom_table() -> Result<(), Box<dyn std::error::Error>> {
    let pg = setup_postgres_embedded(&smoke_cfg())?;
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        // A leftover table from an aborted run must not break the next one
        let mut session = Session::connect(&pg.config).await?;
        session
            .execute("create table smoke_t(id integer primary key, info text, wt integer)")
            .await?;
        session
            .execute("insert into smoke_t values(9, 'stale', 9)")
            .await?;
        session.close().await
    })?;

    let options = RunOptions {
        connection: pg.config.clone(),
        table: "smoke_t".to_string(),
        verify: true,
        ..RunOptions::default()
    };
    for _ in 0..2 {
        let report = rt.block_on(run(&options))?;
        assert!(report.verified);
        assert!(
            report
                .steps
                .iter()
                .any(|step| step.sql.as_deref() == Some("drop table smoke_t"))
        );
    }

    stop_postgres_embedded(pg);
    Ok(())
}
