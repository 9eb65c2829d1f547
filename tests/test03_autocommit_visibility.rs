#![cfg(feature = "test-utils")]

use pgwire_smoke::prelude::*;
use pgwire_smoke::test_utils::{setup_postgres_embedded, stop_postgres_embedded};

async fn count(session: &mut Session, sql: &str) -> Result<usize, SmokeError> {
    Ok(session.query(sql).await?.len())
}

#[test]
fn test03_manual_mode_commit_and_rollback() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = ConnectionConfig {
        dbname: "visibility_db".to_string(),
        ..ConnectionConfig::default()
    };
    let pg = setup_postgres_embedded(&cfg)?;
    let config = pg.config.clone();

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let mut writer = Session::connect_labeled(&config, "writer").await?;
        let mut reader = Session::connect_labeled(&config, "reader").await?;
        writer.execute("drop table if exists vis").await?;
        writer
            .execute("create table vis(id integer primary key, info text)")
            .await?;

        // Autocommit: visible at once
        writer.execute("insert into vis values(1, 'a')").await?;
        assert_eq!(count(&mut reader, "select * from vis").await?, 1);

        // Manual: invisible until commit
        writer.set_autocommit(false).await?;
        assert!(!writer.in_transaction());
        let insert = writer.prepare("insert into vis values(?, ?)").await?;
        insert
            .execute_update(&mut writer, &[RowValues::Int(2), "b".into()])
            .await?;
        assert!(writer.in_transaction());
        assert_eq!(count(&mut reader, "select * from vis").await?, 1);
        writer.commit().await?;
        assert!(!writer.in_transaction());
        assert_eq!(count(&mut reader, "select * from vis").await?, 2);

        // Rollback discards
        writer.execute("delete from vis where id = 1").await?;
        writer.rollback().await?;
        assert_eq!(count(&mut reader, "select * from vis").await?, 2);

        // Switching autocommit back on commits the open transaction
        writer.execute("update vis set info = 'c' where id = 2").await?;
        assert_eq!(
            count(&mut reader, "select * from vis where info = 'c'").await?,
            0
        );
        writer.set_autocommit(true).await?;
        assert_eq!(
            count(&mut reader, "select * from vis where info = 'c'").await?,
            1
        );

        // Commit in autocommit mode is refused
        assert!(matches!(
            writer.commit().await,
            Err(SmokeError::ExecutionError(_))
        ));

        // Closing with an open transaction rolls it back
        writer.set_autocommit(false).await?;
        writer.execute("delete from vis").await?;
        writer.close().await?;
        assert_eq!(count(&mut reader, "select * from vis").await?, 2);

        reader.execute("drop table vis").await?;
        reader.close().await?;
        Ok::<(), SmokeError>(())
    })?;

    stop_postgres_embedded(pg);
    Ok(())
}
