//! A single simulated individual.
//!
//! An [`Agent`] carries the simulation-wide epidemic parameters, three traits drawn once at
//! creation, and its disease state. Agents move through
//!
//! ```text
//! Susceptible -> Infected -> Infectious -> Immune
//!                   |            |
//!                   +----> Dead <+
//! ```
//!
//! where `Immune` and `Dead` are terminal. There is no reinfection.
//!
//! The daily update lives in the free function [`tick`] rather than on `Agent` because an
//! infectious agent exposes other members of the population it belongs to.

use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::parameters::Parameters;
use crate::random::sample_single_from_known_length;

/// Per-agent traits, each drawn uniformly from [0, 1).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Traits {
    pub natural_immunity: f64,
    pub hygiene: f64,
    pub sociability: f64,
}

impl Traits {
    /// Draws a fresh set of traits. Called once per agent so no two agents share a draw.
    pub fn sample<R: Rng>(rng: &mut R) -> Traits {
        Traits {
            natural_immunity: rng.random::<f64>(),
            hygiene: rng.random::<f64>(),
            sociability: rng.random::<f64>(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum DiseaseState {
    Susceptible,
    /// Infected but still incubating.
    Infected,
    Infectious,
    Immune,
    Dead,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    virulence: f64,
    incubation_days: u32,
    infectious_duration: u32,
    mortality_rate: f64,
    traits: Traits,

    infected: bool,
    infectious: bool,
    immune: bool,
    dead: bool,
    days_infected: u32,
}

impl Agent {
    #[must_use]
    pub fn new(parameters: &Parameters, traits: Traits, infected: bool) -> Agent {
        Agent {
            virulence: parameters.virulence,
            incubation_days: parameters.incubation_days,
            infectious_duration: parameters.infectious_duration,
            mortality_rate: parameters.mortality_rate,
            traits,
            infected,
            infectious: false,
            immune: false,
            dead: false,
            days_infected: 0,
        }
    }

    #[must_use]
    pub fn traits(&self) -> &Traits {
        &self.traits
    }

    #[must_use]
    pub fn is_infected(&self) -> bool {
        self.infected
    }

    #[must_use]
    pub fn is_infectious(&self) -> bool {
        self.infectious
    }

    #[must_use]
    pub fn is_immune(&self) -> bool {
        self.immune
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    #[must_use]
    pub fn days_infected(&self) -> u32 {
        self.days_infected
    }

    #[must_use]
    pub fn state(&self) -> DiseaseState {
        if self.dead {
            DiseaseState::Dead
        } else if self.immune {
            DiseaseState::Immune
        } else if self.infectious {
            DiseaseState::Infectious
        } else if self.infected {
            DiseaseState::Infected
        } else {
            DiseaseState::Susceptible
        }
    }

    /// Chance that a single contact with an infectious agent infects this agent. May be zero
    /// or negative for hygienic agents, in which case exposure never infects.
    #[must_use]
    pub fn infection_probability(&self) -> f64 {
        self.virulence * (1.0 - self.traits.natural_immunity) - self.traits.hygiene * 0.1
    }

    /// Chance of dying on any one day of infection.
    #[must_use]
    pub fn daily_death_probability(&self) -> f64 {
        (self.mortality_rate / 4.0) * self.traits.natural_immunity
    }

    /// Contact with an infectious agent. Immune and dead agents are unaffected; an agent that
    /// is already infected stays infected and keeps its infection day count.
    pub fn expose<R: Rng>(&mut self, rng: &mut R) {
        if self.immune || self.dead {
            return;
        }
        if rng.random::<f64>() < self.infection_probability() {
            if !self.infected {
                trace!("infection (p={:.3})", self.infection_probability());
            }
            self.infected = true;
        }
    }

    /// Number of contacts an infectious agent attempts today.
    pub fn sample_contact_count<R: Rng>(&self, rng: &mut R) -> usize {
        let base: usize = rng.random_range(3..=5);
        // `sociability` lies in [0, 1), so the bonus is 0, 1 or 2.
        let bonus = (self.traits.sociability * 2.0).round_ties_even() as usize;
        base + bonus
    }

    /// Advances this agent's own disease course by one day. Returns whether the agent is
    /// infectious afterwards and so should go on to contact others.
    fn progress<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.dead || !self.infected {
            return false;
        }

        self.days_infected += 1;
        if rng.random::<f64>() < self.daily_death_probability() {
            self.dead = true;
            self.infectious = false;
            self.infected = false;
            return false;
        }

        if self.days_infected == self.incubation_days {
            self.infectious = true;
        }

        if self.days_infected == self.incubation_days.saturating_add(self.infectious_duration) {
            self.immune = true;
            self.infectious = false;
            self.infected = false;
        }

        self.infectious
    }
}

/// Advances the agent at `index` by one day.
///
/// If the agent is infectious after its own update it contacts a random draw of living
/// agents, exposing each one that is not itself. The pool of living agents is taken as it
/// stands when this agent ticks, so deaths earlier in the same day are already excluded.
pub fn tick<R: Rng>(population: &mut [Agent], index: usize, rng: &mut R) {
    let before = population[index].state();
    let infectious = population[index].progress(rng);
    let after = population[index].state();
    if before != after {
        trace!("agent {index}: {before:?} -> {after:?}");
    }
    if !infectious {
        return;
    }

    let contacts = population[index].sample_contact_count(rng);
    let alive: Vec<usize> = population
        .iter()
        .enumerate()
        .filter(|(_, agent)| !agent.is_dead())
        .map(|(i, _)| i)
        .collect();

    for _ in 0..contacts {
        let Some(target) = sample_single_from_known_length(rng, alive.iter().copied()) else {
            trace!("agent {index}: no living contacts");
            return;
        };
        if target != index {
            population[target].expose(rng);
        }
    }
}
