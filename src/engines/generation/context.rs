use crate::data::cache::{InMemoryResultCache, ResultCache};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// State shared by one exploration run: the generation counter, the result
/// cache and the random source.
///
/// Threaded explicitly through sampling, operators and evaluation.
pub struct RunContext {
    generation: AtomicUsize,
    total_generations: usize,
    cache: Arc<dyn ResultCache>,
    rng: StdRng,
}

impl RunContext {
    pub fn new(seed: Option<u64>, total_generations: usize, cache: Arc<dyn ResultCache>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            generation: AtomicUsize::new(0),
            total_generations,
            cache,
            rng,
        }
    }

    /// Seeded context with an unbounded in-memory cache
    pub fn seeded(seed: u64, total_generations: usize) -> Self {
        Self::new(
            Some(seed),
            total_generations,
            Arc::new(InMemoryResultCache::unbounded()),
        )
    }

    /// Claim the number of the evaluation about to run and advance the counter
    pub fn begin_generation(&self) -> usize {
        self.generation.fetch_add(1, Ordering::SeqCst)
    }

    /// Number of population evaluations started so far
    pub fn generation(&self) -> usize {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn total_generations(&self) -> usize {
        self.total_generations
    }

    pub fn cache(&self) -> &Arc<dyn ResultCache> {
        &self.cache
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}
