//! Execution engine - applies planned changes with parallelism

use crate::context::{AutoConfirm, ConfirmCallback, NoProgress, ProgressCallback};
use crate::data::ResourceData;
use crate::planner::{Address, ExecutionPlan, PlannedChange};
use crate::provider::Provider;
use crate::resource::Resource;
use crate::types::{ApplyResult, ChangeAction, ExecuteOptions, ExecuteSummary, InstanceState};
use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// What happened to one instance, and the state to persist for it
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub address: Address,
    pub result: ApplyResult,
    /// None means the instance is gone and must be dropped from state
    pub state: Option<InstanceState>,
}

/// Result of executing a plan
#[derive(Debug, Clone, Default)]
pub struct ExecuteReport {
    pub summary: ExecuteSummary,
    pub outcomes: Vec<ApplyOutcome>,
}

impl ExecuteReport {
    /// Write every outcome into a state map
    pub fn apply_to(&self, states: &mut BTreeMap<Address, InstanceState>) {
        for outcome in &self.outcomes {
            match &outcome.state {
                Some(state) => {
                    states.insert(outcome.address.clone(), state.clone());
                }
                None => {
                    states.remove(&outcome.address);
                }
            }
        }
    }
}

/// Execute a plan with the given options and callbacks
///
/// Changes run on a pool of `opts.jobs` threads. A failing instance never
/// aborts its siblings; its failure is reported in the outcome.
pub fn execute<M, P, C>(
    provider: &Provider<M>,
    meta: &M,
    plan: ExecutionPlan,
    opts: ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteReport>
where
    M: ?Sized + Sync,
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let pending: Vec<PlannedChange> = plan
        .changes
        .into_iter()
        .filter(|c| c.action().is_change())
        .collect();

    if pending.is_empty() {
        return Ok(ExecuteReport::default());
    }

    // Confirm before proceeding (unless dry_run)
    if !opts.dry_run && !confirm.confirm("Apply these changes?")? {
        let mut report = ExecuteReport::default();
        for change in pending {
            let result = ApplyResult::Skipped {
                reason: "declined".to_string(),
            };
            report.summary.add_result(&result);
            report.outcomes.push(ApplyOutcome {
                address: change.address,
                result,
                state: change.prior,
            });
        }
        return Ok(report);
    }

    if opts.dry_run {
        return Ok(ExecuteReport::default());
    }

    progress.on_batch_start(pending.len());
    let outcomes = if opts.jobs <= 1 || pending.len() == 1 {
        let mut outcomes = Vec::with_capacity(pending.len());
        for change in &pending {
            let address = change.address.to_string();
            progress.on_resource_start(&address, change.action());
            let outcome = apply_change(provider, meta, change);
            progress.on_resource_complete(&address, &outcome.result);
            outcomes.push(outcome);
        }
        outcomes
    } else {
        execute_parallel(provider, meta, &pending, opts.jobs, progress)?
    };
    progress.on_batch_complete();

    let mut summary = ExecuteSummary::default();
    for outcome in &outcomes {
        summary.add_result(&outcome.result);
    }
    Ok(ExecuteReport { summary, outcomes })
}

/// Execute changes in parallel using rayon
fn execute_parallel<M, P>(
    provider: &Provider<M>,
    meta: &M,
    changes: &[PlannedChange],
    jobs: usize,
    progress: &mut P,
) -> Result<Vec<ApplyOutcome>>
where
    M: ?Sized + Sync,
    P: ProgressCallback,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| anyhow!("Failed to create thread pool: {}", e))?;

    let outcomes: Vec<ApplyOutcome> = pool.install(|| {
        changes
            .par_iter()
            .map(|change| apply_change(provider, meta, change))
            .collect()
    });

    // The progress callback is not shared across threads, so report after
    for outcome in &outcomes {
        progress.on_resource_complete(&outcome.address.to_string(), &outcome.result);
    }

    Ok(outcomes)
}

/// Apply a single planned change
fn apply_change<M: ?Sized>(
    provider: &Provider<M>,
    meta: &M,
    change: &PlannedChange,
) -> ApplyOutcome {
    let outcome = |result, state| ApplyOutcome {
        address: change.address.clone(),
        result,
        state,
    };

    let Some(resource) = provider.resource(&change.address.resource_type) else {
        return outcome(
            failed(anyhow!(
                "unknown resource type '{}'",
                change.address.resource_type
            )),
            change.prior.clone(),
        );
    };

    match (change.action(), &change.prior, &change.desired) {
        (ChangeAction::NoOp, prior, _) => outcome(ApplyResult::NoChange, prior.clone()),
        (ChangeAction::Create, _, Some(desired)) => match create(resource, meta, desired) {
            Ok(state) => outcome(ApplyResult::Created, state),
            Err(e) => outcome(failed(e), None),
        },
        (ChangeAction::Update, Some(prior), Some(desired)) => {
            let mut data = ResourceData::for_update(prior, desired.clone());
            match resource.update(&mut data, meta) {
                Ok(()) => outcome(ApplyResult::Modified, data.to_instance_state()),
                Err(e) => outcome(failed(e), Some(prior.clone())),
            }
        }
        (ChangeAction::Delete, Some(prior), _) => match delete(resource, meta, prior) {
            Ok(()) => outcome(ApplyResult::Removed, None),
            Err(e) => outcome(failed(e), Some(prior.clone())),
        },
        (ChangeAction::Replace, Some(prior), Some(desired)) => {
            if let Err(e) = delete(resource, meta, prior) {
                return outcome(failed(e), Some(prior.clone()));
            }
            match create(resource, meta, desired) {
                Ok(state) => outcome(ApplyResult::Replaced, state),
                Err(e) => outcome(failed(e), None),
            }
        }
        (action, prior, _) => outcome(
            failed(anyhow!("{} is missing the state it needs", action)),
            prior.clone(),
        ),
    }
}

fn create<M: ?Sized>(
    resource: &dyn Resource<M>,
    meta: &M,
    desired: &crate::types::Attributes,
) -> Result<Option<InstanceState>> {
    let mut data = ResourceData::new(desired.clone());
    resource.create(&mut data, meta)?;
    Ok(data.to_instance_state())
}

fn delete<M: ?Sized>(resource: &dyn Resource<M>, meta: &M, prior: &InstanceState) -> Result<()> {
    let mut data = ResourceData::from_state(prior);
    resource.delete(&mut data, meta)
}

fn failed(error: anyhow::Error) -> ApplyResult {
    ApplyResult::Failed {
        error: format!("{:#}", error),
    }
}

/// Refresh one instance from the remote system
///
/// Returns None when the remote object no longer exists.
pub fn refresh_instance<M: ?Sized>(
    resource: &dyn Resource<M>,
    meta: &M,
    prior: &InstanceState,
) -> Result<Option<InstanceState>> {
    let mut data = ResourceData::from_state(prior);
    if !resource.exists(&data, meta)? {
        log::info!("{} '{}' no longer exists", resource.type_name(), prior.id);
        return Ok(None);
    }
    resource.read(&mut data, meta)?;
    Ok(data.to_instance_state())
}

/// Refresh every instance in parallel
///
/// Each entry carries its own result so one failure does not hide the rest.
pub fn refresh_all<M>(
    provider: &Provider<M>,
    meta: &M,
    states: &BTreeMap<Address, InstanceState>,
    jobs: usize,
) -> Result<Vec<(Address, Result<Option<InstanceState>>)>>
where
    M: ?Sized + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .map_err(|e| anyhow!("Failed to create thread pool: {}", e))?;

    let entries: Vec<(&Address, &InstanceState)> = states.iter().collect();
    Ok(pool.install(|| {
        entries
            .par_iter()
            .map(|(address, state)| {
                let result = match provider.resource(&address.resource_type) {
                    Some(resource) => refresh_instance(resource, meta, state)
                        .with_context(|| format!("refreshing {}", address)),
                    None => Err(anyhow!(
                        "unknown resource type '{}'",
                        address.resource_type
                    )),
                };
                ((*address).clone(), result)
            })
            .collect()
    }))
}

/// Adopt an existing remote object
pub fn import_instance<M: ?Sized>(
    resource: &dyn Resource<M>,
    meta: &M,
    id: &str,
) -> Result<InstanceState> {
    let mut data = ResourceData::importing(id);
    resource.import(id, &mut data, meta)?;
    data.to_instance_state()
        .ok_or_else(|| anyhow!("importing '{}' produced no identifier", id))
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple<M: ?Sized + Sync>(
    provider: &Provider<M>,
    meta: &M,
    plan: ExecutionPlan,
    opts: ExecuteOptions,
) -> Result<ExecuteReport> {
    execute(provider, meta, plan, opts, &mut NoProgress, &mut AutoConfirm)
}
