use meadow_extract::IdNamePairs;
use serde::Serialize;

use crate::{Step, StepRecord, StepStatus};

/// Everything one run has learned so far. Discarded when the run ends.
#[derive(Debug, Clone)]
pub struct WorkflowState {
  execution_id: String,
  records: Vec<StepRecord>,
  /// Collections offered by the listing step.
  pub collections: Option<IdNamePairs>,
  pub collection_id: Option<String>,
  pub package_name: Option<String>,
  pub package_id: Option<String>,
}

impl WorkflowState {
  /// Fresh state with every step of `plan` pending.
  pub fn new(plan: &[Step]) -> Self {
    Self {
      execution_id: uuid::Uuid::new_v4().to_string(),
      records: plan
        .iter()
        .map(|&step| StepRecord {
          step,
          status: StepStatus::Pending,
        })
        .collect(),
      collections: None,
      collection_id: None,
      package_name: None,
      package_id: None,
    }
  }

  pub fn execution_id(&self) -> &str {
    &self.execution_id
  }

  pub fn records(&self) -> &[StepRecord] {
    &self.records
  }

  pub fn status(&self, step: Step) -> Option<StepStatus> {
    self
      .records
      .iter()
      .find(|r| r.step == step)
      .map(|r| r.status)
  }

  /// Record `status` for `step`, appending steps outside the plan.
  pub(crate) fn set(&mut self, step: Step, status: StepStatus) {
    match self.records.iter_mut().find(|r| r.step == step) {
      Some(record) => record.status = status,
      None => self.records.push(StepRecord { step, status }),
    }
  }

  /// Display name of the chosen collection.
  pub fn collection_name(&self) -> Option<&str> {
    let id = self.collection_id.as_deref()?;
    self.collections.as_ref()?.get(id)
  }
}

/// Result of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentReport {
  pub execution_id: String,
  pub package_name: String,
  pub package_id: String,
  pub collection_id: String,
  pub collection_name: String,
  pub steps: Vec<StepRecord>,
}

impl DeploymentReport {
  /// One-line summary for the user.
  pub fn message(&self) -> String {
    format!(
      "Package '{}' ({}) published to collection '{}' ({}).",
      self.package_name, self.package_id, self.collection_name, self.collection_id
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new_state_is_all_pending() {
    let state = WorkflowState::new(&Step::DEPLOY_PLAN);
    assert_eq!(state.records().len(), Step::DEPLOY_PLAN.len());
    assert!(state.records().iter().all(|r| r.status == StepStatus::Pending));
    assert_eq!(state.records()[0].step, Step::CheckTool);
  }

  #[test]
  fn test_each_state_gets_its_own_execution_id() {
    let a = WorkflowState::new(&Step::DEPLOY_PLAN);
    let b = WorkflowState::new(&Step::DEPLOY_PLAN);
    assert_ne!(a.execution_id(), b.execution_id());
  }

  #[test]
  fn test_set_outside_plan_appends() {
    let mut state = WorkflowState::new(&[]);
    state.set(Step::Logout, StepStatus::Running);
    state.set(Step::Logout, StepStatus::Succeeded);
    assert_eq!(state.records().len(), 1);
    assert_eq!(state.status(Step::Logout), Some(StepStatus::Succeeded));
  }
}
