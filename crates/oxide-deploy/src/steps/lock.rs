//! Lock steps.

use std::sync::Arc;

use tracing::warn;

use crate::lock::LockService;
use crate::pipeline::{BoxFuture, CommandScope, CommandStep, PipelineResults, ResultType, StepResult};

use super::{LOCK, LOCK_STATUS, TARGET};

/// Takes the target lock and releases it when the pipeline ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct LockStep;

impl CommandStep for LockStep {
    fn name(&self) -> &'static str {
        "lock"
    }

    fn requires(&self) -> Vec<ResultType> {
        vec![TARGET.result_type()]
    }

    fn provides(&self) -> Vec<ResultType> {
        vec![LOCK.result_type()]
    }

    fn run<'a>(
        &'a self,
        scope: CommandScope<'a>,
        results: &'a mut PipelineResults,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            let target = results.require(TARGET)?.clone();
            let locks = LockService::new(scope.ctx, &target);
            locks.init().await?;
            let lock = locks.acquire().await?;
            results.add(LOCK, Arc::new(lock))?;
            Ok(())
        })
    }

    fn cleanup<'a>(
        &'a self,
        scope: CommandScope<'a>,
        results: &'a mut PipelineResults,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            let (Some(target), Some(lock)) = (results.get(TARGET)?, results.get(LOCK)?) else {
                return Ok(());
            };
            if let Err(e) = LockService::new(scope.ctx, target).release(lock).await {
                warn!(target_name = %target.name(), error = %e, "Failed to release lock");
                return Err(e.into());
            }
            Ok(())
        })
    }
}

/// Clears the target lock regardless of holder.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReleaseLocksStep;

impl CommandStep for ReleaseLocksStep {
    fn name(&self) -> &'static str {
        "releaseLocks"
    }

    fn command_names(&self) -> &'static [&'static str] {
        &["releaseLocks"]
    }

    fn requires(&self) -> Vec<ResultType> {
        vec![TARGET.result_type()]
    }

    fn provides(&self) -> Vec<ResultType> {
        vec![LOCK_STATUS.result_type()]
    }

    fn run<'a>(
        &'a self,
        scope: CommandScope<'a>,
        results: &'a mut PipelineResults,
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            let target = results.require(TARGET)?.clone();
            let locks = LockService::new(scope.ctx, &target);
            locks.init().await?;
            locks.force_release().await?;
            let status = locks.status().await?;
            results.add(LOCK_STATUS, status)?;
            Ok(())
        })
    }
}
