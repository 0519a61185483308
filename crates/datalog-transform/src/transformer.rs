//! The transformer protocol and the driver composing passes.

use crate::TransformConfig;
use datalog_analysis::{ClauseNormalisationAnalysis, IoTypeAnalysis, ProfileUseAnalysis};
use datalog_ast::Program;

/// Shared state for a transformation run: the configuration plus lazily
/// computed analyses. Analyses are dropped whenever a transformer reports
/// change, so downstream passes always observe a self-consistent snapshot.
pub struct TransformContext {
    config: TransformConfig,
    profile: ProfileUseAnalysis,
    normalisations: Option<ClauseNormalisationAnalysis>,
    io_types: Option<IoTypeAnalysis>,
}

impl TransformContext {
    pub fn new(config: TransformConfig) -> Self {
        TransformContext {
            config,
            profile: ProfileUseAnalysis::new(),
            normalisations: None,
            io_types: None,
        }
    }

    pub fn with_profile(config: TransformConfig, profile: ProfileUseAnalysis) -> Self {
        TransformContext {
            config,
            profile,
            normalisations: None,
            io_types: None,
        }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn profile(&self) -> &ProfileUseAnalysis {
        &self.profile
    }

    /// Drop every cached analysis; the next access recomputes
    pub fn invalidate_analyses(&mut self) {
        self.normalisations = None;
        self.io_types = None;
    }

    /// The clause normalisations for the current program snapshot
    pub fn normalisations(&mut self, program: &Program) -> &ClauseNormalisationAnalysis {
        if self.normalisations.is_none() {
            self.normalisations = Some(ClauseNormalisationAnalysis::run(program));
        }
        self.normalisations.as_ref().expect("just computed")
    }

    /// The I/O-type analysis for the current program snapshot
    pub fn io_types(&mut self, program: &Program) -> &IoTypeAnalysis {
        if self.io_types.is_none() {
            self.io_types = Some(IoTypeAnalysis::run(program));
        }
        self.io_types.as_ref().expect("just computed")
    }
}

/// A program-to-program rewrite reporting whether it changed anything
pub trait Transformer {
    fn name(&self) -> &'static str;

    fn apply(&mut self, program: &mut Program, ctx: &mut TransformContext) -> bool;
}

/// Runs a fixed sequence of transformers, invalidating cached analyses
/// after every pass that reports change.
#[derive(Default)]
pub struct TransformerPipeline {
    passes: Vec<Box<dyn Transformer>>,
}

impl TransformerPipeline {
    pub fn new() -> Self {
        TransformerPipeline::default()
    }

    pub fn add(mut self, pass: Box<dyn Transformer>) -> Self {
        self.passes.push(pass);
        self
    }

    /// One round over all passes
    pub fn run(&mut self, program: &mut Program, ctx: &mut TransformContext) -> bool {
        let mut changed = false;
        for pass in &mut self.passes {
            if pass.apply(program, ctx) {
                changed = true;
                ctx.invalidate_analyses();
            }
        }
        changed
    }

    /// Iterate rounds until no pass reports observable progress
    pub fn run_to_fixpoint(&mut self, program: &mut Program, ctx: &mut TransformContext) -> bool {
        let mut changed = false;
        while self.run(program, ctx) {
            changed = true;
        }
        changed
    }
}
