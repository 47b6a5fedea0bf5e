//! Workflow executor for multi-step pattern orchestration
//!
//! Executes workflows defined by WorkflowConfig, managing state and transitions.

use crate::config::{StepCondition, StepTransition, WorkflowConfig, WorkflowState, WorkflowStatus, WorkflowStep};
use crate::{OrchestratorError, Result};
use serde_json::Value;

/// Workflow executor for running multi-step workflows
pub struct WorkflowExecutor {
    config: WorkflowConfig,
    state: WorkflowState,
}

impl WorkflowExecutor {
    /// Create a new workflow executor
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            state: WorkflowState::new(),
        }
    }

    /// Get the current workflow state
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Get mutable workflow state
    pub fn state_mut(&mut self) -> &mut WorkflowState {
        &mut self.state
    }

    /// Get the workflow configuration
    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Get the current step
    pub fn current_step(&self) -> Option<&WorkflowStep> {
        self.config.steps.get(self.state.current_step)
    }

    /// Check if workflow is complete
    pub fn is_complete(&self) -> bool {
        matches!(
            self.state.status,
            WorkflowStatus::Completed | WorkflowStatus::Failed | WorkflowStatus::Cancelled
        )
    }

    /// Start the workflow
    pub fn start(&mut self) -> Result<()> {
        if self.state.status != WorkflowStatus::Pending {
            return Err(OrchestratorError::General(
                "Workflow already started".to_string(),
            ));
        }

        self.state.status = WorkflowStatus::Running;
        Ok(())
    }

    /// Record a step result and determine next step
    ///
    /// Returns the name of the next step to execute, or None if workflow is complete
    pub fn record_step_result(&mut self, result: Value, success: bool) -> Result<Option<String>> {
        let current_step = self
            .current_step()
            .ok_or_else(|| OrchestratorError::General("No current step".to_string()))?
            .clone();

        // Record the result
        self.state.record_result(current_step.name.clone(), result.clone());

        // Check max steps
        if let Some(settings) = &self.config.settings {
            if self.state.steps_executed >= settings.max_total_steps {
                self.state.status = WorkflowStatus::Failed;
                return Err(OrchestratorError::General(format!(
                    "Exceeded max total steps: {}",
                    settings.max_total_steps
                )));
            }
        }

        // Determine next transition based on success/failure
        let transition = if success {
            current_step.on_success.as_ref()
        } else {
            current_step.on_failure.as_ref()
        };

        // If no transition specified, try to go to next step
        let next_step = if let Some(trans) = transition {
            self.evaluate_transition(trans, &result)?
        } else {
            // Auto-advance to next step
            let next_idx = self.state.current_step + 1;
            if next_idx < self.config.steps.len() {
                Some(self.config.steps[next_idx].name.clone())
            } else {
                None
            }
        };

        // Update current step index
        if let Some(ref next_name) = next_step {
            if let Some((idx, _)) = self
                .config
                .steps
                .iter()
                .enumerate()
                .find(|(_, s)| &s.name == next_name)
            {
                self.state.current_step = idx;
            } else {
                return Err(OrchestratorError::General(format!(
                    "Step not found: {}",
                    next_name
                )));
            }
        } else {
            // No next step - workflow complete
            self.state.status = WorkflowStatus::Completed;
        }

        Ok(next_step)
    }

    /// Evaluate a step transition to determine next step
    fn evaluate_transition(&self, transition: &StepTransition, result: &Value) -> Result<Option<String>> {
        match transition {
            StepTransition::Goto(step_name) => Ok(Some(step_name.clone())),
            StepTransition::End { end } => {
                if *end {
                    Ok(None)
                } else {
                    // Continue to next step
                    let next_idx = self.state.current_step + 1;
                    Ok(self.config.steps.get(next_idx).map(|s| s.name.clone()))
                }
            }
            StepTransition::Conditional {
                if_condition,
                then,
                else_transition,
            } => {
                // Evaluate condition
                if self.evaluate_condition_expr(if_condition, result)? {
                    self.evaluate_transition(then, result)
                } else if let Some(else_trans) = else_transition {
                    self.evaluate_transition(else_trans, result)
                } else {
                    // No else - continue to next step
                    let next_idx = self.state.current_step + 1;
                    Ok(self.config.steps.get(next_idx).map(|s| s.name.clone()))
                }
            }
        }
    }

    /// Evaluate a condition expression (simplified)
    fn evaluate_condition_expr(&self, expr: &str, result: &Value) -> Result<bool> {
        // Simple evaluation - check if result has a "success" field
        // TODO: Implement full expression evaluation
        if expr == "result.success" {
            if let Some(success) = result.get("success") {
                Ok(success.as_bool().unwrap_or(false))
            } else {
                Ok(false)
            }
        } else {
            // Default to true for now
            Ok(true)
        }
    }

    /// Check if a step should execute based on its condition
    pub fn should_execute_step(&self, step: &WorkflowStep) -> Result<bool> {
        if let Some(condition) = &step.condition {
            match condition {
                StepCondition::Always => Ok(true),
                StepCondition::OnSuccess => {
                    // Check if previous step succeeded
                    if self.state.current_step > 0 {
                        let prev_step = &self.config.steps[self.state.current_step - 1];
                        if let Some(result) = self.state.step_results.get(&prev_step.name) {
                            Ok(result.get("success").and_then(|v| v.as_bool()).unwrap_or(true))
                        } else {
                            Ok(true)
                        }
                    } else {
                        Ok(true)
                    }
                }
                StepCondition::OnFailure => {
                    // Check if previous step failed
                    if self.state.current_step > 0 {
                        let prev_step = &self.config.steps[self.state.current_step - 1];
                        if let Some(result) = self.state.step_results.get(&prev_step.name) {
                            Ok(!result.get("success").and_then(|v| v.as_bool()).unwrap_or(false))
                        } else {
                            Ok(false)
                        }
                    } else {
                        Ok(false)
                    }
                }
                StepCondition::Expression(_expr) => {
                    // TODO: Implement expression evaluation
                    Ok(true)
                }
            }
        } else {
            Ok(true)
        }
    }

    /// Mark workflow as failed
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        self.state.status = WorkflowStatus::Failed;
        // Store failure reason in state
        self.state.step_results.insert(
            "_workflow_error".to_string(),
            serde_json::json!({ "error": reason.into() }),
        );
        Ok(())
    }

    /// Mark workflow as cancelled
    pub fn cancel(&mut self) -> Result<()> {
        self.state.status = WorkflowStatus::Cancelled;
        Ok(())
    }
}
