use crate::config::EvolutionConfig;
use crate::engines::generation::context::RunContext;
use crate::engines::generation::genome::Genome;
use crate::engines::structure::StructureModel;
use crate::error::Result;
use crate::types::{Gene, GENE_HIGH, GENE_LOW};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// Per unit, flip the multiplier gene, the adder gene, or both
    Unit,
    /// Per genome, rewrite one whole stage
    Stage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverKind {
    /// Exchange the genes between two unit boundaries
    UnitTwoPoint,
    /// Exchange one stage's gene block
    StageExchange,
}

/// Edit applied to a single unit by unit-level mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitEdit {
    FlipPrimary,
    FlipSecondary,
    FlipBoth,
}

impl UnitEdit {
    const ALL: [UnitEdit; 3] = [UnitEdit::FlipPrimary, UnitEdit::FlipSecondary, UnitEdit::FlipBoth];

    fn choose<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Edit applied to every gene of a stage by stage-level mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEdit {
    ForceLow,
    ForceHigh,
    FlipAll,
    Resample,
}

impl StageEdit {
    const ALL: [StageEdit; 4] = [
        StageEdit::ForceLow,
        StageEdit::ForceHigh,
        StageEdit::FlipAll,
        StageEdit::Resample,
    ];

    fn choose<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

fn flip(gene: Gene) -> Gene {
    if gene == GENE_LOW {
        GENE_HIGH
    } else {
        GENE_LOW
    }
}

/// Apply a unit edit in place to the unit owning genes `2u` and `2u + 1`
pub fn apply_unit_edit(genome: &mut [Gene], structure: &StructureModel, unit: usize, edit: UnitEdit) {
    let genes = structure.unit_genes(unit);
    let (primary, secondary) = (genes.start, genes.start + 1);
    match edit {
        UnitEdit::FlipPrimary => genome[primary] = flip(genome[primary]),
        UnitEdit::FlipSecondary => genome[secondary] = flip(genome[secondary]),
        UnitEdit::FlipBoth => {
            genome[primary] = flip(genome[primary]);
            genome[secondary] = flip(genome[secondary]);
        }
    }
}

/// Apply a stage edit in place to every gene of `stage`
pub fn apply_stage_edit<R: Rng + ?Sized>(
    genome: &mut [Gene],
    structure: &StructureModel,
    stage: usize,
    edit: StageEdit,
    rng: &mut R,
) {
    let block = &mut genome[structure.stage_genes(stage)];
    match edit {
        StageEdit::ForceLow => block.fill(GENE_LOW),
        StageEdit::ForceHigh => block.fill(GENE_HIGH),
        StageEdit::FlipAll => block.iter_mut().for_each(|g| *g = flip(*g)),
        StageEdit::Resample => block
            .iter_mut()
            .for_each(|g| *g = rng.gen_range(GENE_LOW..=GENE_HIGH)),
    }
}

/// Swap genes `[2 * first_unit, 2 * last_unit)` between two children
pub fn exchange_units(
    child1: &mut [Gene],
    child2: &mut [Gene],
    structure: &StructureModel,
    first_unit: usize,
    last_unit: usize,
) {
    let start = structure.unit_genes(first_unit).start;
    let end = structure.unit_genes(last_unit).start;
    child1[start..end].swap_with_slice(&mut child2[start..end]);
}

/// Swap one stage's gene block between two children
pub fn exchange_stage(child1: &mut [Gene], child2: &mut [Gene], structure: &StructureModel, stage: usize) {
    let range = structure.stage_genes(stage);
    child1[range.clone()].swap_with_slice(&mut child2[range]);
}

/// Mutation and crossover bound to a structure, acting on unit and stage
/// boundaries. Parents are never modified; children are fresh copies.
#[derive(Debug, Clone)]
pub struct GenomeOperators {
    structure: Arc<StructureModel>,
    mutation: MutationKind,
    crossover: CrossoverKind,
    mutation_rate: f64,
    crossover_rate: f64,
    anneal_mutation: bool,
}

impl GenomeOperators {
    pub fn new(structure: Arc<StructureModel>, config: &EvolutionConfig) -> Self {
        Self {
            structure,
            mutation: config.mutation,
            crossover: config.crossover,
            mutation_rate: config.mutation_rate,
            crossover_rate: config.crossover_rate,
            anneal_mutation: config.anneal_mutation,
        }
    }

    pub fn structure(&self) -> &StructureModel {
        &self.structure
    }

    /// Unit mutation rate after linear annealing, never below zero
    pub fn effective_mutation_rate(&self, generation: usize, total_generations: usize) -> f64 {
        if !self.anneal_mutation || total_generations == 0 {
            return self.mutation_rate;
        }
        let progress = generation as f64 / total_generations as f64;
        (self.mutation_rate * (1.0 - progress)).max(0.0)
    }

    pub fn mutate(&self, parent: &[Gene], ctx: &mut RunContext) -> Result<Genome> {
        self.structure.validate(parent)?;
        let mut child = parent.to_vec();

        match self.mutation {
            MutationKind::Unit => {
                let rate = self.effective_mutation_rate(ctx.generation(), ctx.total_generations());
                let rng = ctx.rng();
                for unit in 0..self.structure.total_units() {
                    if rng.gen::<f64>() < rate {
                        let edit = UnitEdit::choose(rng);
                        apply_unit_edit(&mut child, &self.structure, unit, edit);
                    }
                }
            }
            MutationKind::Stage => {
                let rng = ctx.rng();
                if rng.gen::<f64>() < self.mutation_rate {
                    let stage = rng.gen_range(0..self.structure.num_stages());
                    let edit = StageEdit::choose(rng);
                    apply_stage_edit(&mut child, &self.structure, stage, edit, rng);
                }
            }
        }

        Ok(child)
    }

    pub fn crossover(
        &self,
        parent1: &[Gene],
        parent2: &[Gene],
        ctx: &mut RunContext,
    ) -> Result<(Genome, Genome)> {
        self.structure.validate(parent1)?;
        self.structure.validate(parent2)?;

        let mut child1 = parent1.to_vec();
        let mut child2 = parent2.to_vec();

        let rng = ctx.rng();
        if rng.gen::<f64>() >= self.crossover_rate {
            return Ok((child1, child2));
        }

        match self.crossover {
            CrossoverKind::UnitTwoPoint => {
                let units = self.structure.total_units();
                let first = rng.gen_range(0..units);
                let last = rng.gen_range(first..units);
                exchange_units(&mut child1, &mut child2, &self.structure, first, last);
            }
            CrossoverKind::StageExchange => {
                let stage = rng.gen_range(0..self.structure.num_stages());
                exchange_stage(&mut child1, &mut child2, &self.structure, stage);
            }
        }

        Ok((child1, child2))
    }
}
