use crate::config::EvolutionConfig;
use crate::engines::evaluation::{EvaluationPipeline, PopulationEvaluation, SharedObserver};
use crate::engines::generation::context::RunContext;
use crate::engines::generation::genome::Genome;
use crate::engines::generation::operators::GenomeOperators;
use crate::engines::generation::progress::{EvolutionHistory, GenerationObserver, LoggingObserver};
use crate::engines::generation::sampling::SamplingStrategy;
use crate::engines::structure::StructureModel;
use crate::error::Result;
use crate::types::{ConstraintMatrix, Gene, ObjectiveMatrix, CONSTRAINTS, GENE_HIGH, GENE_LOW, OBJECTIVES};
use std::sync::{Arc, Mutex};

/// Callback surface for an external multi-objective optimizer.
///
/// The optimizer owns selection and survival; this type supplies sampling,
/// variation and evaluation, and records one objective matrix per evaluated
/// generation.
pub struct MixedPrecisionProblem {
    structure: Arc<StructureModel>,
    operators: GenomeOperators,
    sampling: SamplingStrategy,
    pipeline: EvaluationPipeline,
    context: RunContext,
    observer: SharedObserver,
    history: EvolutionHistory,
}

impl MixedPrecisionProblem {
    pub fn new(config: &EvolutionConfig, pipeline: EvaluationPipeline, context: RunContext) -> Self {
        let structure = Arc::new(pipeline.structure().clone());
        Self {
            operators: GenomeOperators::new(Arc::clone(&structure), config),
            structure,
            sampling: config.sampling,
            pipeline,
            context,
            observer: Mutex::new(Box::new(LoggingObserver)),
            history: EvolutionHistory::new(),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn GenerationObserver>) -> Self {
        self.observer = Mutex::new(observer);
        self
    }

    pub fn structure(&self) -> &StructureModel {
        &self.structure
    }

    pub fn num_variables(&self) -> usize {
        self.structure.genome_length()
    }

    pub fn num_objectives(&self) -> usize {
        OBJECTIVES
    }

    pub fn num_constraints(&self) -> usize {
        CONSTRAINTS
    }

    /// Per-gene lower and upper bounds
    pub fn bounds(&self) -> (Vec<Gene>, Vec<Gene>) {
        let n = self.num_variables();
        (vec![GENE_LOW; n], vec![GENE_HIGH; n])
    }

    pub fn sample(&mut self, n: usize) -> Vec<Genome> {
        self.sampling
            .initial_population(&self.structure, n, &mut self.context)
    }

    /// Two children per mating, flattened in mating order
    pub fn crossover(&mut self, matings: &[(Genome, Genome)]) -> Result<Vec<Genome>> {
        let mut offspring = Vec::with_capacity(matings.len() * 2);
        for (parent1, parent2) in matings {
            let (child1, child2) = self.operators.crossover(parent1, parent2, &mut self.context)?;
            offspring.push(child1);
            offspring.push(child2);
        }
        Ok(offspring)
    }

    pub fn mutate(&mut self, population: &[Genome]) -> Result<Vec<Genome>> {
        population
            .iter()
            .map(|genome| self.operators.mutate(genome, &mut self.context))
            .collect()
    }

    pub fn evaluate(&mut self, population: &[Genome]) -> Result<(ObjectiveMatrix, ConstraintMatrix)> {
        Ok(self.evaluate_detailed(population)?.into_matrices())
    }

    /// Like `evaluate`, keeping digests and raw results
    pub fn evaluate_detailed(&mut self, population: &[Genome]) -> Result<PopulationEvaluation> {
        self.lock_observer()
            .on_generation_start(self.context.generation(), population.len());

        let evaluation = self
            .pipeline
            .evaluate_observed(population, &self.context, Some(&self.observer))?;

        self.lock_observer().on_generation_complete(
            evaluation.generation,
            &evaluation.objectives,
            evaluation.cache_hits,
        );
        self.history.record(evaluation.objectives.clone());
        Ok(evaluation)
    }

    pub fn history(&self) -> &EvolutionHistory {
        &self.history
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    fn lock_observer(&self) -> std::sync::MutexGuard<'_, Box<dyn GenerationObserver>> {
        self.observer.lock().unwrap_or_else(|e| e.into_inner())
    }
}
