//! Update, SQL preview and history steps.

use crate::pipeline::{BoxFuture, CommandScope, CommandStep, PipelineResults, ResultType, StepResult};
use crate::session::DeploySession;

use super::{CHANGELOG, HISTORY, LOCK, TARGET, UPDATE_REPORT, UPDATE_SQL};

/// Applies pending change sets under the pipeline's lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateStep;

impl CommandStep for UpdateStep {
    fn name(&self) -> &'static str {
        "update"
    }

    fn command_names(&self) -> &'static [&'static str] {
        &["update"]
    }

    fn requires(&self) -> Vec<ResultType> {
        vec![
            TARGET.result_type(),
            LOCK.result_type(),
            CHANGELOG.result_type(),
        ]
    }

    fn provides(&self) -> Vec<ResultType> {
        vec![UPDATE_REPORT.result_type()]
    }

    fn run<'a>(
        &'a self,
        scope: CommandScope<'a>,
        results: &'a mut PipelineResults,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            let report = {
                let target = results.require(TARGET)?;
                let lock = results.require(LOCK)?;
                let changelog = results.require(CHANGELOG)?;
                DeploySession::new(scope.ctx, target)
                    .update_locked(lock, changelog)
                    .await?
            };
            results.add(UPDATE_REPORT, report)?;
            Ok(())
        })
    }
}

/// Renders pending SQL without the lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateSqlStep;

impl CommandStep for UpdateSqlStep {
    fn name(&self) -> &'static str {
        "updateSql"
    }

    fn command_names(&self) -> &'static [&'static str] {
        &["updateSql"]
    }

    fn requires(&self) -> Vec<ResultType> {
        vec![TARGET.result_type(), CHANGELOG.result_type()]
    }

    fn provides(&self) -> Vec<ResultType> {
        vec![UPDATE_SQL.result_type()]
    }

    fn run<'a>(
        &'a self,
        scope: CommandScope<'a>,
        results: &'a mut PipelineResults,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            let sql = {
                let target = results.require(TARGET)?;
                let changelog = results.require(CHANGELOG)?;
                DeploySession::new(scope.ctx, target)
                    .update_sql(changelog)
                    .await?
            };
            results.add(UPDATE_SQL, sql)?;
            Ok(())
        })
    }
}

/// Reads the ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryStep;

impl CommandStep for HistoryStep {
    fn name(&self) -> &'static str {
        "history"
    }

    fn command_names(&self) -> &'static [&'static str] {
        &["history"]
    }

    fn requires(&self) -> Vec<ResultType> {
        vec![TARGET.result_type()]
    }

    fn provides(&self) -> Vec<ResultType> {
        vec![HISTORY.result_type()]
    }

    fn run<'a>(
        &'a self,
        scope: CommandScope<'a>,
        results: &'a mut PipelineResults,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            let target = results.require(TARGET)?.clone();
            let history = DeploySession::new(scope.ctx, &target).history().await?;
            results.add(HISTORY, history)?;
            Ok(())
        })
    }
}
