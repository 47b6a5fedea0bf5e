//! Pattern management module
//!
//! Provides pattern registry, builder, and factory for creating and managing
//! agent patterns from YAML configurations.

pub mod builder;
pub mod factory;
pub mod llm_planner;
pub mod registry;
pub mod selector;

pub use builder::{build_pattern, PatternBuilder};
pub use factory::{FactoryBuilder, LlmFunction, PatternFactory, ToolRegistry};
pub use llm_planner::{ExecutionPlan, LlmPatternPlanner, PlanStep};
pub use registry::PatternRegistry;
pub use selector::{PatternRecommendation, PatternSelector, PatternType, TaskCharacteristics};
