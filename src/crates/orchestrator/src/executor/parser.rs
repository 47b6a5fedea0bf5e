//! LLM Response Parser
//!
//! This module provides robust parsing of LLM responses into structured task results.
//! It handles various response formats (JSON, markdown, plain text) and extracts
//! task status and data from LLM output.

use crate::{OrchestratorError, Result, TaskStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Structured result parsed from LLM response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedResult {
    /// Task status determined from the response
    pub status: TaskStatus,

    /// Result data (if successful)
    pub result: Option<String>,

    /// Error message (if failed)
    pub error: Option<String>,

    /// Additional data extracted from response
    pub metadata: serde_json::Map<String, Value>,
}

impl ParsedResult {
    /// Create a new parsed result
    pub fn new(status: TaskStatus) -> Self {
        Self {
            status,
            result: None,
            error: None,
            metadata: serde_json::Map::new(),
        }
    }

    /// Set result data
    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    /// Set error message
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Add metadata field
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Parser for LLM responses
pub struct ResponseParser {
    /// Whether to require strict JSON format
    strict_mode: bool,

    /// Whether to allow partial results
    allow_partial: bool,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self {
            strict_mode: false,
            allow_partial: true,
        }
    }
}

impl ResponseParser {
    /// Create a new response parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable strict mode
    ///
    /// In strict mode, only valid JSON responses are accepted.
    /// Non-JSON responses will result in an error.
    pub fn with_strict_mode(mut self, enabled: bool) -> Self {
        self.strict_mode = enabled;
        self
    }

    /// Enable or disable partial results
    ///
    /// When enabled, incomplete responses are accepted and marked as pending.
    /// When disabled, incomplete responses result in an error.
    pub fn with_allow_partial(mut self, enabled: bool) -> Self {
        self.allow_partial = enabled;
        self
    }

    /// Parse an LLM response into a structured result
    pub fn parse(&self, response: &str) -> Result<ParsedResult> {
        debug!("Parsing LLM response: {}", response);

        // Try to extract and parse JSON first
        if let Some(json_str) = Self::extract_json(response) {
            match self.parse_json_response(json_str) {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if self.strict_mode {
                        return Err(e);
                    }
                    warn!("JSON parsing failed, falling back to text parsing: {}", e);
                }
            }
        }

        // Fallback to text-based parsing
        if self.strict_mode {
            return Err(OrchestratorError::General(
                "Strict mode enabled but no valid JSON found in response".to_string(),
            ));
        }

        self.parse_text_response(response)
    }

    /// Parse a JSON response
    fn parse_json_response(&self, json_str: &str) -> Result<ParsedResult> {
        let value: Value = serde_json::from_str(json_str).map_err(|e| {
            OrchestratorError::General(format!("Failed to parse JSON: {}", e))
        })?;

        let obj = value.as_object().ok_or_else(|| {
            OrchestratorError::General("JSON response is not an object".to_string())
        })?;

        // Extract status
        let status = self.parse_status(obj)?;

        // Build parsed result
        let mut parsed = ParsedResult::new(status);

        // Extract result field
        if let Some(result_value) = obj.get("result") {
            if let Some(result_str) = result_value.as_str() {
                parsed.result = Some(result_str.to_string());
            } else {
                // Convert non-string results to JSON string
                parsed.result = Some(serde_json::to_string(result_value).unwrap_or_default());
            }
        }

        // Extract error field
        if let Some(error_value) = obj.get("error") {
            if let Some(error_str) = error_value.as_str() {
                parsed.error = Some(error_str.to_string());
            }
        }

        // Extract needs_input field (for backward compatibility)
        if let Some(needs_input) = obj.get("needs_input") {
            if let Some(needs_input_str) = needs_input.as_str() {
                parsed.metadata.insert(
                    "needs_input".to_string(),
                    Value::String(needs_input_str.to_string()),
                );
            }
        }

        // Extract all other fields as metadata
        for (key, value) in obj {
            if key != "status" && key != "result" && key != "error" && key != "needs_input" {
                parsed.metadata.insert(key.clone(), value.clone());
            }
        }

        // Validate the parsed result
        self.validate_parsed_result(&parsed)?;

        Ok(parsed)
    }

    /// Parse a text response (fallback when JSON is not available)
    fn parse_text_response(&self, text: &str) -> Result<ParsedResult> {
        let text_lower = text.to_lowercase();

        // Check for explicit failure indicators
        if text_lower.contains("failed")
            || text_lower.contains("error")
            || text_lower.contains("failure")
        {
            return Ok(ParsedResult::new(TaskStatus::Failed).with_error(text));
        }

        // Check for completion indicators
        if text_lower.contains("completed")
            || text_lower.contains("success")
            || text_lower.contains("done")
        {
            return Ok(ParsedResult::new(TaskStatus::Completed).with_result(text));
        }

        // Check for pending/needs input indicators
        if text_lower.contains("need") || text_lower.contains("require") {
            return Ok(ParsedResult::new(TaskStatus::Pending)
                .with_result(text)
                .with_metadata("reason".to_string(), Value::String("needs_input".to_string())));
        }

        // If we got a non-empty response, consider it completed
        if !text.trim().is_empty() {
            if self.allow_partial {
                return Ok(ParsedResult::new(TaskStatus::Completed).with_result(text));
            }
        }

        // Empty response or no clear status
        Err(OrchestratorError::General(
            "Could not determine task status from response".to_string(),
        ))
    }

    /// Parse status from JSON object
    fn parse_status(&self, obj: &serde_json::Map<String, Value>) -> Result<TaskStatus> {
        let status_value = obj.get("status").ok_or_else(|| {
            OrchestratorError::General("Missing 'status' field in JSON response".to_string())
        })?;

        let status_str = status_value.as_str().ok_or_else(|| {
            OrchestratorError::General("'status' field is not a string".to_string())
        })?;

        match status_str.to_lowercase().as_str() {
            "completed" | "complete" | "success" | "done" => Ok(TaskStatus::Completed),
            "failed" | "fail" | "error" | "failure" => Ok(TaskStatus::Failed),
            "pending" | "needs_input" | "waiting" | "paused" => Ok(TaskStatus::Pending),
            "running" | "in_progress" => Ok(TaskStatus::Running),
            "cancelled" | "canceled" => Ok(TaskStatus::Cancelled),
            _ => Err(OrchestratorError::General(format!(
                "Unknown status: {}",
                status_str
            ))),
        }
    }

    /// Validate a parsed result
    fn validate_parsed_result(&self, result: &ParsedResult) -> Result<()> {
        match result.status {
            TaskStatus::Completed => {
                if result.result.is_none() && !self.allow_partial {
                    return Err(OrchestratorError::General(
                        "Completed status requires a result".to_string(),
                    ));
                }
            }
            TaskStatus::Failed => {
                if result.error.is_none() && !self.allow_partial {
                    return Err(OrchestratorError::General(
                        "Failed status requires an error message".to_string(),
                    ));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Extract JSON from a text response
    ///
    /// Looks for ```json...``` code blocks or raw JSON objects
    fn extract_json(text: &str) -> Option<&str> {
        // Try to find ```json ... ``` block
        if let Some(start) = text.find("```json") {
            let content = &text[start + 7..];
            if let Some(end) = content.find("```") {
                return Some(content[..end].trim());
            }
        }

        // Try to find ```JSON ... ``` block (uppercase)
        if let Some(start) = text.find("```JSON") {
            let content = &text[start + 7..];
            if let Some(end) = content.find("```") {
                return Some(content[..end].trim());
            }
        }

        // Try to find raw JSON object
        if let Some(start) = text.find('{') {
            if let Some(end) = text.rfind('}') {
                if end > start {
                    return Some(text[start..=end].trim());
                }
            }
        }

        None
    }
}
