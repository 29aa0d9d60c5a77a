//! The day-stepped simulation engine.
//!
//! A [`Simulation`] owns its population, its random source and the time series of the run.
//! Each call to [`Simulation::step_day`] ticks every agent once, in population order, then
//! records the day's counts. Ticking is sequential on purpose: an agent infected by an
//! earlier agent in the pass starts counting its infection days in the same pass.
//!
//! A run ends when no agent is infected or no agent is alive, or when a caller-supplied day
//! limit is reached:
//!
//! ```
//! use episim::{ParametersBuilder, Simulation};
//!
//! let parameters = ParametersBuilder::default()
//!     .population_size(100)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//! let mut simulation = Simulation::new(parameters).unwrap();
//! let series = simulation.run(None);
//! let last = series.last().unwrap();
//! assert!(last.num_infected == 0 || last.num_alive == 0);
//! ```

use log::{debug, info};

use crate::agent::{tick, Agent, Traits};
use crate::error::EpiError;
use crate::parameters::Parameters;
use crate::random::{draw_seed, rng_from_seed, SimRng};
use crate::time_series::{DayRecord, TimeSeries};

pub struct Simulation {
    population: Vec<Agent>,
    rng: SimRng,
    day: usize,
    should_continue: bool,
    time_series: TimeSeries,
}

impl Simulation {
    /// Creates a population of `population_size` agents, the first of which is infected.
    /// Uses `parameters.seed` when present and otherwise draws and records a new seed.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::InvalidParameter` if the parameters fail validation.
    pub fn new(parameters: Parameters) -> Result<Simulation, EpiError> {
        parameters.validate()?;
        let seed = parameters.seed.unwrap_or_else(draw_seed);
        let mut rng = rng_from_seed(seed);

        let population: Vec<Agent> = (0..parameters.population_size)
            .map(|index| Agent::new(&parameters, Traits::sample(&mut rng), index == 0))
            .collect();

        info!(
            "new simulation: seed={}, population_size={}, virulence={}, incubation_days={}, \
             infectious_duration={}, mortality_rate={}",
            seed,
            parameters.population_size,
            parameters.virulence,
            parameters.incubation_days,
            parameters.infectious_duration,
            parameters.mortality_rate,
        );

        Ok(Simulation {
            population,
            rng,
            day: 0,
            should_continue: true,
            time_series: TimeSeries::new(seed, parameters),
        })
    }

    /// Advances the simulation by one day and returns that day's record.
    pub fn step_day(&mut self) -> DayRecord {
        for index in 0..self.population.len() {
            tick(&mut self.population, index, &mut self.rng);
        }

        let record = self.count();
        debug!(
            "day {}: infected={}, infectious={}, immune={}, alive={}, dead={}, susceptible={}",
            record.day,
            record.num_infected,
            record.num_infectious,
            record.num_immune,
            record.num_alive,
            record.num_dead,
            record.num_susceptible,
        );
        self.time_series.push(record);

        if record.num_infected == 0 || record.num_alive == 0 {
            self.should_continue = false;
        }
        self.day += 1;
        record
    }

    /// Steps until the epidemic burns out, the population dies out, or `max_days` days have
    /// been simulated in total. `None` places no limit on the number of days.
    pub fn run(&mut self, max_days: Option<usize>) -> &TimeSeries {
        while self.should_continue && max_days.map_or(true, |max| self.day < max) {
            self.step_day();
        }

        if let Some(last) = self.time_series.last() {
            info!(
                "simulation stopped after {} days: infected={}, immune={}, dead={}",
                self.day, last.num_infected, last.num_immune, last.num_dead,
            );
        }
        &self.time_series
    }

    fn count(&self) -> DayRecord {
        let mut num_infected = 0;
        let mut num_infectious = 0;
        let mut num_immune = 0;
        let mut num_alive = 0;
        for agent in &self.population {
            if agent.is_infected() {
                num_infected += 1;
            }
            if agent.is_infectious() {
                num_infectious += 1;
            }
            if agent.is_immune() {
                num_immune += 1;
            }
            if !agent.is_dead() {
                num_alive += 1;
            }
        }
        DayRecord::from_counts(
            self.day,
            self.population.len(),
            num_infected,
            num_infectious,
            num_immune,
            num_alive,
        )
    }

    /// Number of completed days.
    #[must_use]
    pub fn get_current_day(&self) -> usize {
        self.day
    }

    /// Whether the epidemic can still progress.
    #[must_use]
    pub fn should_continue(&self) -> bool {
        self.should_continue
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.time_series.seed()
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        self.time_series.parameters()
    }

    #[must_use]
    pub fn population(&self) -> &[Agent] {
        &self.population
    }

    #[must_use]
    pub fn time_series(&self) -> &TimeSeries {
        &self.time_series
    }

    #[must_use]
    pub fn into_time_series(self) -> TimeSeries {
        self.time_series
    }
}
