use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::error::SmokeError;
use crate::postgres::Session;
use crate::results::ResultSet;
use crate::types::RowValues;

use super::{Scenario, ScenarioKind};
use super::expect;
use super::report::{RunReport, StepOutcome, StepReport};

/// The client-driver smoke test: plain DDL/DML, then prepared statements under explicit
/// autocommit toggles.
///
/// With verification on, every printed result set is compared against the expected
/// table, commit visibility is checked from a second connection, and the table must be
/// gone at the end.
pub struct DriverScenario {
    table: String,
    /// Set when verifying; used to open the observer connection.
    observer: Option<ConnectionConfig>,
}

impl DriverScenario {
    #[must_use]
    pub fn new(table: impl Into<String>, observer: Option<ConnectionConfig>) -> Self {
        Self {
            table: table.into(),
            observer,
        }
    }

    fn verify(&self) -> bool {
        self.observer.is_some()
    }

    async fn exec(
        &self,
        session: &mut Session,
        report: &mut RunReport,
        sql: String,
    ) -> Result<(), SmokeError> {
        let affected = session.execute(&sql).await?;
        debug!(sql = %sql, affected, "statement done");
        report.push(StepReport::quiet(sql, StepOutcome::Affected(affected)));
        Ok(())
    }

    fn record(
        &self,
        report: &mut RunReport,
        label: &str,
        sql: &str,
        rows: ResultSet,
        expected: Option<ResultSet>,
    ) -> Result<(), SmokeError> {
        info!("{label}:{rows}");
        let checked = match expected.filter(|_| self.verify()) {
            Some(expected) => expect::check_rows(label, &expected, &rows),
            None => Ok(()),
        };
        report.push(StepReport::labeled(
            label,
            Some(sql.to_string()),
            StepOutcome::Rows(rows),
        ));
        checked
    }

    async fn body(&self, session: &mut Session, report: &mut RunReport) -> Result<(), SmokeError> {
        let t = &self.table;

        self.exec(session, report, format!("drop table if exists {t}"))
            .await?;
        self.exec(
            session,
            report,
            format!("create table {t}(id integer primary key, info text, wt integer)"),
        )
        .await?;
        self.exec(
            session,
            report,
            format!("insert into {t}(id,info,wt) values(1, 'record1', 1)"),
        )
        .await?;
        self.exec(
            session,
            report,
            format!("insert into {t}(id,info,wt) values(2, 'record2', 2)"),
        )
        .await?;
        self.exec(session, report, format!("update {t} set wt = 12 where id = 1"))
            .await?;

        let select_all = format!("select * from {t}");
        let res1 = session.query(&select_all).await?;
        self.record(report, "res1", &select_all, res1, Some(expect::after_update()))?;

        self.exec(session, report, format!("delete from {t} where id = 1"))
            .await?;
        let res2 = session.query(&select_all).await?;
        self.record(report, "res2", &select_all, res2, Some(expect::after_delete()))?;

        {
            let insert = session
                .prepare(&format!("insert into {t} values(?, ?, ?)"))
                .await?;
            session.set_autocommit(false).await?;
            let affected = insert
                .execute_update(session, &[RowValues::Int(1), "rec1".into(), RowValues::Int(11)])
                .await?;
            report.push(StepReport::quiet(insert.sql(), StepOutcome::Affected(affected)));
            self.commit_observed(session, report).await?;
        }

        session.set_autocommit(true).await?;
        {
            let by_id = session
                .prepare(&format!("select*from {t} where id=?"))
                .await?;
            let rs = by_id.execute_query(session, &[RowValues::Int(1)]).await?;
            self.record(report, "pstmt1.rs1", by_id.sql(), rs, Some(expect::reinserted()))?;

            session.set_autocommit(false).await?;
            let rs = by_id.execute_query(session, &[RowValues::Int(2)]).await?;
            self.record(report, "pstmt1.rs1", by_id.sql(), rs, Some(expect::untouched()))?;
        }

        {
            let update = session
                .prepare(&format!("update {t} set info=? , wt=? where id=?"))
                .await?;
            let affected = update
                .execute_update(session, &["Rec1".into(), RowValues::Int(2), RowValues::Int(1)])
                .await?;
            report.push(StepReport::quiet(update.sql(), StepOutcome::Affected(affected)));
            session.commit().await?;
            report.push(StepReport::quiet("commit", StepOutcome::Done));

            session.set_autocommit(true).await?;
            let affected = update
                .execute_update(session, &["Rec2".into(), RowValues::Int(3), RowValues::Int(2)])
                .await?;
            report.push(StepReport::quiet(update.sql(), StepOutcome::Affected(affected)));
        }

        {
            let by_id = session
                .prepare(&format!("select*from {t} where id = ?"))
                .await?;
            let [first, second] = expect::prepared_updates();
            let rs = by_id.execute_query(session, &[RowValues::Int(1)]).await?;
            self.record(report, "pstmt3.rs3", by_id.sql(), rs, Some(first))?;
            let rs = by_id.execute_query(session, &[RowValues::Int(2)]).await?;
            self.record(report, "pstmt3.rs3", by_id.sql(), rs, Some(second))?;
        }

        self.exec(session, report, format!("drop table {t}")).await?;
        if self.verify() {
            expect::check_dropped(session, t).await?;
        }
        Ok(())
    }

    /// Commit the prepared insert. When verifying, an observer connection must not see the
    /// row before the commit and must see it after.
    async fn commit_observed(
        &self,
        session: &mut Session,
        report: &mut RunReport,
    ) -> Result<(), SmokeError> {
        let Some(config) = &self.observer else {
            session.commit().await?;
            report.push(StepReport::quiet("commit", StepOutcome::Done));
            return Ok(());
        };

        let mut observer = Session::connect_labeled(config, "observer").await?;
        let checked = async {
            expect::check_visibility(&mut observer, &self.table, 1, false).await?;
            session.commit().await?;
            report.push(StepReport::quiet("commit", StepOutcome::Done));
            expect::check_visibility(&mut observer, &self.table, 1, true).await
        }
        .await;
        observer.close().await?;
        checked
    }
}

#[async_trait]
impl Scenario for DriverScenario {
    fn name(&self) -> &'static str {
        ScenarioKind::Driver.name()
    }

    async fn run(&self, session: &mut Session, report: &mut RunReport) -> Result<(), SmokeError> {
        let autocommit = session.autocommit();
        info!("default autocommit: {autocommit}");
        report.push(StepReport::labeled(
            "default autocommit",
            None,
            StepOutcome::Value(autocommit.to_string()),
        ));
        session.set_autocommit(true).await?;

        self.body(session, report).await?;

        session.set_autocommit(autocommit).await?;
        report.verified = self.verify();
        Ok(())
    }
}
