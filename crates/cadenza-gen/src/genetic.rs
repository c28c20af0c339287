//! Genetic algorithm melody breeder.
//!
//! A population of 16-note genomes evolves under a fitness function with
//! simple musical prejudices: stepwise motion is good, wide leaps are
//! bad, ending on the tonic is very good, and wandering out of the
//! comfortable register costs. Tournament selection, single-point
//! crossover, and small random mutations do the rest.

use cadenza_core::Xorshift32;

/// Population size.
pub const POPULATION: usize = 32;

/// Notes per genome.
pub const GENOME_LEN: usize = 16;

/// One candidate melody.
#[derive(Debug, Clone, Copy)]
pub struct Genome {
    /// MIDI notes.
    pub notes: [i32; GENOME_LEN],
    /// Fitness from the last evaluation.
    pub fitness: f32,
}

impl Genome {
    fn empty() -> Self {
        Self {
            notes: [0; GENOME_LEN],
            fitness: 0.0,
        }
    }
}

/// Evolving melody population.
///
/// ## Parameters
///
/// - `mutation_rate`: per-note mutation probability, default 0.1
/// - `crossover_rate`: probability of crossover vs. cloning, default 0.7
/// - `root_note`: tonic for the fitness bonus, default 60
///
/// # Example
///
/// ```rust
/// use cadenza_gen::GeneticMelody;
///
/// let mut ga = GeneticMelody::new(1337);
/// for _ in 0..100 {
///     ga.evolve();
/// }
/// let best = ga.best();
/// assert!(best.fitness > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct GeneticMelody {
    population: [Genome; POPULATION],
    best: Genome,
    mutation_rate: f32,
    crossover_rate: f32,
    root_note: i32,
    generation: u64,
    rng: Xorshift32,
}

/// Major scale degrees used to seed the initial population.
const MAJOR_SCALE: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

impl GeneticMelody {
    /// Create a population seeded from major-scale notes around middle C.
    pub fn new(seed: u32) -> Self {
        let mut rng = Xorshift32::new(seed);
        let root_note = 60;

        let mut population = [Genome::empty(); POPULATION];
        for genome in &mut population {
            for note in &mut genome.notes {
                let degree = rng.next_range_i32(0, MAJOR_SCALE.len() as i32 - 1) as usize;
                let octave = rng.next_range_i32(-1, 1);
                *note = root_note + MAJOR_SCALE[degree] + octave * 12;
            }
        }

        Self {
            population,
            best: Genome::empty(),
            mutation_rate: 0.1,
            crossover_rate: 0.7,
            root_note,
            generation: 0,
            rng,
        }
    }

    /// Set the per-note mutation probability, clamped to [0, 1].
    pub fn set_mutation_rate(&mut self, rate: f32) {
        self.mutation_rate = rate.clamp(0.0, 1.0);
    }

    /// Set the crossover probability, clamped to [0, 1].
    pub fn set_crossover_rate(&mut self, rate: f32) {
        self.crossover_rate = rate.clamp(0.0, 1.0);
    }

    /// Set the tonic note used by the fitness function.
    pub fn set_root_note(&mut self, note: i32) {
        self.root_note = note.clamp(0, 127);
    }

    /// Generations evolved so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The best genome seen across all generations.
    pub fn best(&self) -> &Genome {
        &self.best
    }

    /// Score a melody.
    ///
    /// Starts at 100 and applies, per interval: +1 for steps ≤ 2, −2 for
    /// leaps in (7, 12], −5 for leaps > 12; +10 when the last note's
    /// pitch class matches the root; −3 per note outside [48, 84].
    /// Clamped at zero.
    fn evaluate(&self, genome: &Genome) -> f32 {
        let mut fitness = 100.0f32;

        for i in 1..GENOME_LEN {
            let interval = (genome.notes[i] - genome.notes[i - 1]).abs();
            if interval > 12 {
                fitness -= 5.0;
            } else if interval > 7 {
                fitness -= 2.0;
            } else if interval <= 2 {
                fitness += 1.0;
            }
        }

        if genome.notes[GENOME_LEN - 1].rem_euclid(12) == self.root_note.rem_euclid(12) {
            fitness += 10.0;
        }

        for &note in &genome.notes {
            if !(48..=84).contains(&note) {
                fitness -= 3.0;
            }
        }

        fitness.max(0.0)
    }

    /// Pick the fitter of two random genomes.
    fn tournament(&mut self) -> usize {
        let a = self.rng.next_range_i32(0, POPULATION as i32 - 1) as usize;
        let b = self.rng.next_range_i32(0, POPULATION as i32 - 1) as usize;
        if self.population[a].fitness > self.population[b].fitness {
            a
        } else {
            b
        }
    }

    /// Run one generation: evaluate, track the best-ever, then breed a
    /// full replacement population.
    pub fn evolve(&mut self) {
        for i in 0..POPULATION {
            self.population[i].fitness = self.evaluate(&self.population[i]);
            if self.population[i].fitness > self.best.fitness {
                self.best = self.population[i];
            }
        }

        let mut next = [Genome::empty(); POPULATION];

        for child in &mut next {
            let parent1 = self.tournament();
            let parent2 = self.tournament();

            if self.rng.next_f32() < self.crossover_rate {
                let point = self.rng.next_range_i32(1, GENOME_LEN as i32 - 2) as usize;
                for n in 0..GENOME_LEN {
                    child.notes[n] = if n < point {
                        self.population[parent1].notes[n]
                    } else {
                        self.population[parent2].notes[n]
                    };
                }
            } else {
                child.notes = self.population[parent1].notes;
            }

            for note in &mut child.notes {
                if self.rng.next_f32() < self.mutation_rate {
                    *note += self.rng.next_range_i32(-3, 3);
                }
            }
        }

        self.population = next;
        self.generation += 1;
    }
}
