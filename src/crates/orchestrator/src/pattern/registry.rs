//! Pattern registry for storing and managing pattern configurations
//!
//! Provides thread-safe storage and retrieval of pattern configurations,
//! supporting both programmatic registration and loading from YAML files.

use crate::config::{load_yaml_config, PatternConfig};
use crate::{OrchestratorError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Thread-safe registry for pattern configurations
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    /// Internal storage for patterns
    patterns: Arc<RwLock<HashMap<String, PatternConfig>>>,
}

impl PatternRegistry {
    /// Create a new empty pattern registry
    pub fn new() -> Self {
        Self {
            patterns: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a pattern configuration
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the pattern
    /// * `config` - Pattern configuration to register
    ///
    /// # Returns
    /// * `Ok(())` if registration succeeded
    /// * `Err` if pattern ID already exists
    pub fn register(&self, id: impl Into<String>, config: PatternConfig) -> Result<()> {
        let id = id.into();
        let mut patterns = self.patterns.write().map_err(|e| {
            OrchestratorError::General(format!("Failed to acquire write lock: {}", e))
        })?;

        if patterns.contains_key(&id) {
            return Err(OrchestratorError::General(format!(
                "Pattern with ID '{}' already registered",
                id
            )));
        }

        patterns.insert(id, config);
        Ok(())
    }

    /// Register or update a pattern configuration
    ///
    /// Unlike `register()`, this will overwrite an existing pattern with the same ID.
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the pattern
    /// * `config` - Pattern configuration to register
    pub fn register_or_update(&self, id: impl Into<String>, config: PatternConfig) -> Result<()> {
        let id = id.into();
        let mut patterns = self.patterns.write().map_err(|e| {
            OrchestratorError::General(format!("Failed to acquire write lock: {}", e))
        })?;

        patterns.insert(id, config);
        Ok(())
    }

    /// Get a pattern configuration by ID
    ///
    /// # Arguments
    /// * `id` - Pattern identifier to look up
    ///
    /// # Returns
    /// * `Some(PatternConfig)` if pattern exists
    /// * `None` if pattern not found
    pub fn get(&self, id: &str) -> Result<Option<PatternConfig>> {
        let patterns = self.patterns.read().map_err(|e| {
            OrchestratorError::General(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(patterns.get(id).cloned())
    }

    /// Check if a pattern is registered
    ///
    /// # Arguments
    /// * `id` - Pattern identifier to check
    pub fn contains(&self, id: &str) -> Result<bool> {
        let patterns = self.patterns.read().map_err(|e| {
            OrchestratorError::General(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(patterns.contains_key(id))
    }

    /// Remove a pattern from the registry
    ///
    /// # Arguments
    /// * `id` - Pattern identifier to remove
    ///
    /// # Returns
    /// * `Some(PatternConfig)` if pattern was removed
    /// * `None` if pattern not found
    pub fn remove(&self, id: &str) -> Result<Option<PatternConfig>> {
        let mut patterns = self.patterns.write().map_err(|e| {
            OrchestratorError::General(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(patterns.remove(id))
    }

    /// Get all registered pattern IDs
    ///
    /// # Returns
    /// Vector of pattern identifiers
    pub fn list_ids(&self) -> Result<Vec<String>> {
        let patterns = self.patterns.read().map_err(|e| {
            OrchestratorError::General(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(patterns.keys().cloned().collect())
    }

    /// Get all registered patterns
    ///
    /// # Returns
    /// Vector of (id, config) tuples
    pub fn list_all(&self) -> Result<Vec<(String, PatternConfig)>> {
        let patterns = self.patterns.read().map_err(|e| {
            OrchestratorError::General(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(patterns
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    /// Get number of registered patterns
    pub fn count(&self) -> Result<usize> {
        let patterns = self.patterns.read().map_err(|e| {
            OrchestratorError::General(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(patterns.len())
    }

    /// Clear all registered patterns
    pub fn clear(&self) -> Result<()> {
        let mut patterns = self.patterns.write().map_err(|e| {
            OrchestratorError::General(format!("Failed to acquire write lock: {}", e))
        })?;

        patterns.clear();
        Ok(())
    }

    /// Load a pattern from a YAML file and register it
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the pattern
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Returns
    /// * `Ok(())` if pattern was loaded and registered
    /// * `Err` if loading failed or pattern ID already exists
    pub fn load_from_file<P: AsRef<Path>>(
        &self,
        id: impl Into<String>,
        path: P,
    ) -> Result<()> {
        let config: PatternConfig = load_yaml_config(path)?;
        self.register(id, config)
    }

    /// Load a pattern from a YAML file and register or update it
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the pattern
    /// * `path` - Path to the YAML configuration file
    pub fn load_from_file_or_update<P: AsRef<Path>>(
        &self,
        id: impl Into<String>,
        path: P,
    ) -> Result<()> {
        let config: PatternConfig = load_yaml_config(path)?;
        self.register_or_update(id, config)
    }

    /// Load multiple patterns from a directory
    ///
    /// Scans the directory for .yaml and .yml files and attempts to load each as a pattern.
    /// The pattern ID is derived from the filename (without extension).
    ///
    /// # Arguments
    /// * `dir` - Directory path to scan
    /// * `recursive` - Whether to scan subdirectories recursively
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of patterns successfully loaded
    /// * `Err` - If directory cannot be read
    pub fn load_from_directory<P: AsRef<Path>>(
        &self,
        dir: P,
        recursive: bool,
    ) -> Result<usize> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            return Err(OrchestratorError::General(format!(
                "Path is not a directory: {}",
                dir.display()
            )));
        }

        let mut count = 0;

        let entries = std::fs::read_dir(dir).map_err(|e| {
            OrchestratorError::General(format!(
                "Failed to read directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| {
                OrchestratorError::General(format!("Failed to read directory entry: {}", e))
            })?;

            let path = entry.path();

            if path.is_dir() && recursive {
                count += self.load_from_directory(&path, recursive)?;
            } else if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext == "yaml" || ext == "yml" {
                        if let Some(stem) = path.file_stem() {
                            if let Some(id) = stem.to_str() {
                                // Try to load the pattern, but don't fail the entire operation
                                // if one file fails
                                match self.load_from_file_or_update(id, &path) {
                                    Ok(_) => {
                                        tracing::debug!("Loaded pattern '{}' from {}", id, path.display());
                                        count += 1;
                                    }
                                    Err(e) => {
                                        tracing::warn!(
                                            "Failed to load pattern from {}: {}",
                                            path.display(),
                                            e
                                        );
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        Ok(count)
    }
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new()
    }
}
