use super::phenotype::{Phenotype, StageConfig, UnitConfig};
use crate::engines::generation::genome::Genome;
use crate::error::{MixfftError, Result};
use crate::precision::PrecisionFormat;
use crate::types::Gene;
use serde::{Deserialize, Serialize};
use std::ops::Range;

pub const MIN_SIZE: usize = 2;
pub const MAX_SIZE: usize = 1024;
/// Primary (multiplier) and secondary (adder) choice per unit
pub const GENES_PER_UNIT: usize = 2;

/// Layout of a radix-2 butterfly network: stages of parallel units, each
/// unit controlled by a gene pair.
///
/// Units are numbered stage-major, so unit `u` lives in stage
/// `u / units_per_stage` and owns genes `2u` and `2u + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureModel {
    size: usize,
    num_stages: usize,
    units_per_stage: usize,
    total_units: usize,
}

impl StructureModel {
    pub fn build(size: usize) -> Result<Self> {
        if !size.is_power_of_two() || !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(MixfftError::InvalidSize(size));
        }

        let num_stages = size.trailing_zeros() as usize;
        let units_per_stage = size / 2;

        Ok(Self {
            size,
            num_stages,
            units_per_stage,
            total_units: units_per_stage * num_stages,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn num_stages(&self) -> usize {
        self.num_stages
    }

    pub fn units_per_stage(&self) -> usize {
        self.units_per_stage
    }

    pub fn total_units(&self) -> usize {
        self.total_units
    }

    pub fn genome_length(&self) -> usize {
        GENES_PER_UNIT * self.total_units
    }

    pub fn genes_per_stage(&self) -> usize {
        GENES_PER_UNIT * self.units_per_stage
    }

    /// Flat gene range owned by a unit
    pub fn unit_genes(&self, unit: usize) -> Range<usize> {
        let start = unit * GENES_PER_UNIT;
        start..start + GENES_PER_UNIT
    }

    /// Flat gene range owned by a stage
    pub fn stage_genes(&self, stage: usize) -> Range<usize> {
        let start = stage * self.genes_per_stage();
        start..start + self.genes_per_stage()
    }

    /// Check length and gene alphabet
    pub fn validate(&self, genome: &[Gene]) -> Result<()> {
        if genome.len() != self.genome_length() {
            return Err(MixfftError::MalformedGenome {
                expected: self.genome_length(),
                actual: genome.len(),
            });
        }
        if let Some((index, &value)) = genome
            .iter()
            .enumerate()
            .find(|&(_, &g)| PrecisionFormat::from_gene(g).is_none())
        {
            return Err(MixfftError::InvalidGene { index, value });
        }
        Ok(())
    }

    /// Interpret a flat genome as per-stage, per-unit precision choices with
    /// radix-2 DIT wiring.
    pub fn decode(&self, genome: &[Gene]) -> Result<Phenotype> {
        self.validate(genome)?;

        let mut stages = Vec::with_capacity(self.num_stages);

        for stage in 0..self.num_stages {
            let group_size = 1usize << (stage + 1);
            let num_groups = self.size / group_size;
            let units_per_group = group_size / 2;

            let mut units = Vec::with_capacity(self.units_per_stage);
            for unit_in_stage in 0..self.units_per_stage {
                let global_index = stage * self.units_per_stage + unit_in_stage;
                let group = unit_in_stage / units_per_group;
                let unit_in_group = unit_in_stage % units_per_group;
                let input_a = group * group_size + unit_in_group;
                let genes = self.unit_genes(global_index);

                units.push(UnitConfig {
                    unit_in_stage,
                    global_index,
                    group,
                    unit_in_group,
                    primary: format_of(genome[genes.start]),
                    secondary: format_of(genome[genes.start + 1]),
                    input_a,
                    input_b: input_a + units_per_group,
                    twiddle_index: (unit_in_group * num_groups) % self.size,
                });
            }

            stages.push(StageConfig {
                stage,
                group_size,
                num_groups,
                units,
            });
        }

        Ok(Phenotype {
            size: self.size,
            stages,
        })
    }

    /// Flatten a phenotype back into its genome
    pub fn encode(&self, phenotype: &Phenotype) -> Result<Genome> {
        if phenotype.size != self.size {
            return Err(MixfftError::InvalidSize(phenotype.size));
        }

        let mut genome = Vec::with_capacity(self.genome_length());
        for unit in phenotype.units() {
            genome.push(unit.primary.gene());
            genome.push(unit.secondary.gene());
        }

        if genome.len() != self.genome_length() {
            return Err(MixfftError::MalformedGenome {
                expected: self.genome_length(),
                actual: genome.len(),
            });
        }
        Ok(genome)
    }
}

// Genes are validated before this is reached
fn format_of(gene: Gene) -> PrecisionFormat {
    PrecisionFormat::from_gene(gene).unwrap_or(PrecisionFormat::Fp4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genome_length_for_every_valid_size() {
        for log2 in 1..=10u32 {
            let size = 1usize << log2;
            let model = StructureModel::build(size).unwrap();
            assert_eq!(model.num_stages(), log2 as usize);
            assert_eq!(model.units_per_stage(), size / 2);
            assert_eq!(model.genome_length(), 2 * (size / 2) * log2 as usize);
        }
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        for size in [0, 1, 3, 6, 12, 100, 2048, 4096] {
            assert!(
                matches!(StructureModel::build(size), Err(MixfftError::InvalidSize(s)) if s == size),
                "size {} should be rejected",
                size
            );
        }
    }

    #[test]
    fn test_wrong_length_is_malformed() {
        let model = StructureModel::build(8).unwrap();
        let result = model.decode(&vec![0; 23]);
        assert!(matches!(
            result,
            Err(MixfftError::MalformedGenome { expected: 24, actual: 23 })
        ));
    }

    #[test]
    fn test_non_binary_gene_rejected() {
        let model = StructureModel::build(4).unwrap();
        let mut genome = vec![0; model.genome_length()];
        genome[5] = 2;
        assert!(matches!(
            model.decode(&genome),
            Err(MixfftError::InvalidGene { index: 5, value: 2 })
        ));
    }

    #[test]
    fn test_decode_is_deterministic() {
        let model = StructureModel::build(16).unwrap();
        let genome: Vec<u8> = (0..model.genome_length()).map(|i| ((i * 7) % 3 == 0) as u8).collect();
        assert_eq!(model.decode(&genome).unwrap(), model.decode(&genome).unwrap());
    }

    #[test]
    fn test_dit_wiring_for_size_8() {
        let model = StructureModel::build(8).unwrap();
        let phenotype = model.decode(&vec![0; 24]).unwrap();

        let stage0: Vec<(usize, usize, usize)> = phenotype.stages[0]
            .units
            .iter()
            .map(|u| (u.input_a, u.input_b, u.twiddle_index))
            .collect();
        assert_eq!(stage0, vec![(0, 1, 0), (2, 3, 0), (4, 5, 0), (6, 7, 0)]);

        let stage1: Vec<(usize, usize, usize)> = phenotype.stages[1]
            .units
            .iter()
            .map(|u| (u.input_a, u.input_b, u.twiddle_index))
            .collect();
        assert_eq!(stage1, vec![(0, 2, 0), (1, 3, 2), (4, 6, 0), (5, 7, 2)]);

        let stage2: Vec<(usize, usize, usize)> = phenotype.stages[2]
            .units
            .iter()
            .map(|u| (u.input_a, u.input_b, u.twiddle_index))
            .collect();
        assert_eq!(stage2, vec![(0, 4, 0), (1, 5, 1), (2, 6, 2), (3, 7, 3)]);
    }

    #[test]
    fn test_gene_pair_maps_to_unit() {
        let model = StructureModel::build(4).unwrap();
        // unit 2 is stage 1, unit 0 in that stage
        let genome = vec![0, 0, 0, 0, 1, 0, 0, 1];
        let phenotype = model.decode(&genome).unwrap();
        let unit = &phenotype.stages[1].units[0];
        assert_eq!(unit.global_index, 2);
        assert_eq!(unit.primary, PrecisionFormat::Fp8);
        assert_eq!(unit.secondary, PrecisionFormat::Fp4);
        assert_eq!(phenotype.stages[1].units[1].secondary, PrecisionFormat::Fp8);
        assert_eq!(model.encode(&phenotype).unwrap(), genome);
    }

    #[test]
    fn test_smallest_structure() {
        let model = StructureModel::build(2).unwrap();
        assert_eq!(model.total_units(), 1);
        assert_eq!(model.genome_length(), 2);
        let phenotype = model.decode(&[1, 0]).unwrap();
        assert_eq!(phenotype.stages.len(), 1);
        assert_eq!(phenotype.stages[0].units[0].input_b, 1);
    }
}
