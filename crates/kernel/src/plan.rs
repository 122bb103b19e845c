use anyhow::Context;
use std::sync::Arc;

use crate::step::{Authenticate, CreateAppUser, SeedCtx, Step};

/// Core step execution order; custom steps always run afterwards
const CORE_STEP_ORDER: &[&str] = &[
    "authenticate", // Admin login must be first
    "create_user",  // Application user on the target database
];

/// Steps a run managed to complete before it stopped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub completed: Vec<&'static str>,
}

/// Ordered collection of seed steps with core/custom separation
pub struct SeedPlan {
    core_steps: Vec<Arc<dyn Step>>,
    custom_steps: Vec<Arc<dyn Step>>,
}

impl SeedPlan {
    /// Create an empty plan
    pub fn new() -> Self {
        Self {
            core_steps: Vec::new(),
            custom_steps: Vec::new(),
        }
    }

    /// Create a plan with the built-in administrative steps registered
    pub fn with_core_steps() -> Self {
        let mut plan = Self::new();
        plan.register_core(Arc::new(Authenticate));
        plan.register_core(Arc::new(CreateAppUser));
        plan
    }

    /// Register a core step; only names listed in the core order are executed
    pub fn register_core(&mut self, step: Arc<dyn Step>) {
        self.core_steps.push(step);
    }

    /// Register a custom step, executed in registration order
    pub fn register_custom(&mut self, step: Arc<dyn Step>) {
        self.custom_steps.push(step);
    }

    /// Names of the steps in the order `run` executes them
    pub fn step_names(&self) -> Vec<&'static str> {
        self.ordered_steps().map(|step| step.name()).collect()
    }

    fn ordered_steps(&self) -> impl Iterator<Item = &Arc<dyn Step>> + '_ {
        CORE_STEP_ORDER
            .iter()
            .filter_map(|&name| self.core_steps.iter().find(|step| step.name() == name))
            .chain(self.custom_steps.iter())
    }

    /// Execute every step in order, stopping at the first failure
    pub async fn run(&self, ctx: &SeedCtx<'_>) -> anyhow::Result<SeedReport> {
        tracing::info!("running seed steps in order: {:?}", self.step_names());

        let mut report = SeedReport::default();
        for step in self.ordered_steps() {
            tracing::info!(step = step.name(), "applying seed step");

            step.apply(ctx)
                .await
                .with_context(|| format!("seed step '{}' failed", step.name()))?;

            report.completed.push(step.name());
        }

        Ok(report)
    }
}

impl Default for SeedPlan {
    fn default() -> Self {
        Self::new()
    }
}
