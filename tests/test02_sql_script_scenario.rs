#![cfg(feature = "test-utils")]

use pgwire_smoke::prelude::*;
use pgwire_smoke::test_utils::{setup_postgres_embedded, stop_postgres_embedded};

#[test]
fn test02_sql_script_scenario() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = ConnectionConfig {
        dbname: "script_db".to_string(),
        ..ConnectionConfig::default()
    };
    let pg = setup_postgres_embedded(&cfg)?;
    let options = RunOptions {
        connection: pg.config.clone(),
        scenario: ScenarioKind::SqlScript,
        table: "t1111".to_string(),
        verify: true,
    };

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(run(&options))?;
    assert!(report.verified);
    assert_eq!(report.scenario, "sql-script");

    let lines: Vec<String> = report.echoed().map(ToString::to_string).collect();
    assert_eq!(lines[0], "command:drop table if exists t1111, res:0");
    assert!(lines.contains(&"command:execute q1(1), res:[]".to_string()));
    assert!(lines.contains(&"command:execute q1(2), res:[[2, record2, 2]]".to_string()));
    assert!(lines.contains(&"command:delete from t1111 where id = 1, res:1".to_string()));
    assert!(lines.contains(&"command:execute q2('Rec1',2,1), res:0".to_string()));
    assert!(lines.contains(&"command:execute q2('Rec2',3,2), res:1".to_string()));

    // Leaves nothing behind, so a second run starts clean
    let again = rt.block_on(run(&options))?;
    assert_eq!(again.steps.len(), report.steps.len());

    stop_postgres_embedded(pg);
    Ok(())
}
