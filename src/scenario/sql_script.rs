use async_trait::async_trait;
use tracing::info;

use crate::error::SmokeError;
use crate::postgres::Session;
use crate::results::ResultSet;

use super::{Scenario, ScenarioKind};
use super::expect;
use super::report::{RunReport, StepOutcome, StepReport};

/// The same workload driven by plain SQL: server-side `PREPARE`/`EXECUTE` and explicit
/// `begin`/`commit`, every command sent through the simple protocol in autocommit mode.
pub struct SqlScriptScenario {
    table: String,
    verify: bool,
}

/// A script command and, for queries, the rows it must return when verifying.
struct Command {
    sql: String,
    expected: Option<ResultSet>,
}

impl Command {
    fn new(sql: String) -> Self {
        Self {
            sql,
            expected: None,
        }
    }

    fn expecting(sql: String, expected: ResultSet) -> Self {
        Self {
            sql,
            expected: Some(expected),
        }
    }
}

impl SqlScriptScenario {
    #[must_use]
    pub fn new(table: impl Into<String>, verify: bool) -> Self {
        Self {
            table: table.into(),
            verify,
        }
    }

    /// The commands in execution order.
    #[must_use]
    pub fn script(&self) -> Vec<String> {
        self.commands().into_iter().map(|c| c.sql).collect()
    }

    fn commands(&self) -> Vec<Command> {
        let t = &self.table;
        vec![
            Command::new(format!("drop table if exists {t}")),
            Command::new(format!(
                "create table {t}(id int primary key, info text, wt int)"
            )),
            Command::new(format!("insert into {t}(id,info,wt) values(1, 'record1', 1)")),
            Command::new(format!("insert into {t}(id,info,wt) values(2, 'record2', 2)")),
            Command::new(format!("update {t} set wt = 12 where id = 1")),
            Command::expecting(format!("select * from {t}"), expect::after_update()),
            Command::new(format!("delete from {t} where id = 1")),
            Command::expecting(format!("select * from {t}"), expect::after_delete()),
            Command::new(format!("prepare q1(int) as select*from {t} where id=$1")),
            Command::new("begin".to_string()),
            Command::expecting("execute q1(1)".to_string(), expect::empty()),
            Command::expecting("execute q1(2)".to_string(), expect::untouched()),
            Command::new(format!(
                "prepare q2(text,int, int) as update {t} set info=$1 , wt=$2 where id=$3"
            )),
            Command::new("execute q2('Rec1',2,1)".to_string()),
            Command::new("commit".to_string()),
            Command::new("execute q2('Rec2',3,2)".to_string()),
            Command::new(format!("drop table {t}")),
            Command::new("deallocate q1".to_string()),
            Command::new("deallocate q2".to_string()),
        ]
    }
}

#[async_trait]
impl Scenario for SqlScriptScenario {
    fn name(&self) -> &'static str {
        ScenarioKind::SqlScript.name()
    }

    async fn run(&self, session: &mut Session, report: &mut RunReport) -> Result<(), SmokeError> {
        session.set_autocommit(true).await?;

        for command in self.commands() {
            let outcome = StepOutcome::from(session.simple_query(&command.sql).await?);
            info!("command:{}, res:{outcome}", command.sql);

            let checked = match command.expected.as_ref().filter(|_| self.verify) {
                Some(expected) => {
                    let empty = ResultSet::default();
                    let actual = match &outcome {
                        StepOutcome::Rows(rs) => rs,
                        _ => &empty,
                    };
                    expect::check_rows(&command.sql, expected, actual)
                }
                None => Ok(()),
            };
            report.push(StepReport::command(command.sql, outcome));
            checked?;
        }

        if self.verify {
            expect::check_dropped(session, &self.table).await?;
        }
        report.verified = self.verify;
        Ok(())
    }
}
