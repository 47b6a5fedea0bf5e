//! Router/Supervisor for dynamic pattern selection
//!
//! Selects which pattern(s) to execute based on input, context, and routing rules.

use crate::config::{RouteRule, RouterConfig, TerminationCondition};
use crate::router::evaluator::{EvaluationContext, RuleEvaluator};
use crate::{OrchestratorError, Result};
use std::collections::HashSet;

/// Router for dynamic pattern selection
pub struct Router {
    config: RouterConfig,
    evaluator: RuleEvaluator,
}

impl Router {
    /// Create a new router from configuration
    pub fn new(config: RouterConfig) -> Self {
        Self {
            config,
            evaluator: RuleEvaluator::new(),
        }
    }

    /// Route an input to determine which pattern(s) to execute
    ///
    /// # Arguments
    /// * `context` - Evaluation context with input text and context values
    ///
    /// # Returns
    /// * List of pattern IDs to execute, in priority order
    pub fn route(&self, context: &EvaluationContext) -> Result<Vec<String>> {
        // Sort rules by priority (highest first)
        let mut sorted_rules: Vec<&RouteRule> = self.config.settings.route_policy.rules.iter().collect();
        sorted_rules.sort_by(|a, b| b.priority.cmp(&a.priority));

        // Evaluate rules in priority order
        let mut selected_patterns = Vec::new();
        let mut matched = false;

        for rule in sorted_rules {
            if self.evaluator.evaluate_rule(rule, context)? {
                // Rule matched - add preferred patterns
                for pattern_id in &rule.prefer {
                    if self.is_pattern_allowed(pattern_id) {
                        selected_patterns.push(pattern_id.clone());
                        matched = true;
                    }
                }
                // Use first matching rule (highest priority)
                break;
            }
        }

        // If no rules matched, use default patterns
        if !matched {
            for pattern_id in &self.config.settings.route_policy.default {
                if self.is_pattern_allowed(pattern_id) {
                    selected_patterns.push(pattern_id.clone());
                }
            }
        }

        // Apply guards
        if let Some(guards) = &self.config.settings.guards {
            if guards.enforce_registry && selected_patterns.is_empty() && guards.fallback_to_default {
                // Fallback to defaults if enforcement is on and nothing selected
                selected_patterns.extend(self.config.settings.route_policy.default.clone());
            }
        }

        // Remove duplicates while preserving order
        let mut seen = HashSet::new();
        selected_patterns.retain(|id| seen.insert(id.clone()));

        Ok(selected_patterns)
    }

    /// Check if a pattern is allowed by the registry configuration
    fn is_pattern_allowed(&self, pattern_id: &str) -> bool {
        // Check denylist first
        if self.config.registry.deny.contains(&pattern_id.to_string()) {
            return false;
        }

        // If allowlist is empty, allow all (except denied)
        if self.config.registry.allow.is_empty() {
            return true;
        }

        // Check allowlist
        self.config.registry.allow.contains(&pattern_id.to_string())
    }

    /// Check if execution should terminate
    ///
    /// # Arguments
    /// * `steps` - Number of steps executed
    /// * `output` - Latest output text
    /// * `current_pattern` - Currently executing pattern ID
    pub fn should_terminate(
        &self,
        steps: usize,
        output: &str,
        current_pattern: &str,
    ) -> Result<bool> {
        if let Some(termination) = &self.config.settings.termination {
            // Check "any" conditions (OR logic)
            if let Some(any_conditions) = &termination.any {
                for condition in any_conditions {
                    if self.check_termination_condition(condition, steps, output, current_pattern)? {
                        return Ok(true);
                    }
                }
            }

            // Check "all" conditions (AND logic)
            if let Some(all_conditions) = &termination.all {
                let all_met = all_conditions.iter().all(|condition| {
                    self.check_termination_condition(condition, steps, output, current_pattern)
                        .unwrap_or(false)
                });
                if all_met && !all_conditions.is_empty() {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    /// Check an individual termination condition
    fn check_termination_condition(
        &self,
        condition: &TerminationCondition,
        steps: usize,
        output: &str,
        current_pattern: &str,
    ) -> Result<bool> {
        match condition {
            TerminationCondition::MaxSteps(max) => Ok(steps >= *max),
            TerminationCondition::Contains(keywords) => {
                let output_lower = output.to_lowercase();
                Ok(keywords.iter().any(|kw| output_lower.contains(&kw.to_lowercase())))
            }
            TerminationCondition::PatternName(name) => Ok(current_pattern == name),
            TerminationCondition::Expression(_expr) => {
                // TODO: Implement expression evaluation
                Err(OrchestratorError::General(
                    "Expression-based termination not yet implemented".to_string(),
                ))
            }
        }
    }

    /// Get the router configuration
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Get the maximum routing attempts from guards
    pub fn max_routing_attempts(&self) -> usize {
        self.config
            .settings
            .guards
            .as_ref()
            .map(|g| g.max_routing_attempts)
            .unwrap_or(10)
    }
}
