//! Per-day summary records and the time series a run produces.
//!
//! A [`TimeSeries`] is append-only while a simulation runs; once handed out it is read-only.
//! It records the seed and the parameters of the run alongside the daily
//! [`DayRecord`]s so it can be persisted, reloaded and re-plotted later.
//!
//! Any two of the seven record fields can be pulled out as a pair of columns:
//!
//! ```
//! use episim::{Field, ParametersBuilder, Simulation};
//!
//! let parameters = ParametersBuilder::default().population_size(20).seed(1).build().unwrap();
//! let mut simulation = Simulation::new(parameters).unwrap();
//! let series = simulation.run(Some(5));
//! let (days, infected) = series.get_series(Field::Day, Field::NumInfected);
//! assert_eq!(days.len(), infected.len());
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::EpiError;
use crate::parameters::Parameters;

/// The named columns of a [`DayRecord`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Day,
    NumInfected,
    NumInfectious,
    NumImmune,
    NumAlive,
    NumDead,
    NumSusceptible,
}

impl Field {
    /// Parses a field name such as `"num_infected"`.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::UnknownField` if the name matches no field.
    pub fn parse(name: &str) -> Result<Field, EpiError> {
        Field::from_str(name).map_err(|_| EpiError::UnknownField(name.to_string()))
    }
}

/// Population counts at the end of one day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: usize,
    pub num_infected: usize,
    pub num_infectious: usize,
    pub num_immune: usize,
    pub num_alive: usize,
    pub num_dead: usize,
    pub num_susceptible: usize,
}

impl DayRecord {
    /// Builds the record for `day` from raw counts. The susceptible count is the living agents
    /// that are neither infectious nor immune, floored at zero. Agents still incubating are
    /// counted as susceptible.
    #[must_use]
    pub fn from_counts(
        day: usize,
        population_size: usize,
        num_infected: usize,
        num_infectious: usize,
        num_immune: usize,
        num_alive: usize,
    ) -> DayRecord {
        DayRecord {
            day,
            num_infected,
            num_infectious,
            num_immune,
            num_alive,
            num_dead: population_size - num_alive,
            num_susceptible: num_alive.saturating_sub(num_infectious + num_immune),
        }
    }

    #[must_use]
    pub fn get(&self, field: Field) -> usize {
        match field {
            Field::Day => self.day,
            Field::NumInfected => self.num_infected,
            Field::NumInfectious => self.num_infectious,
            Field::NumImmune => self.num_immune,
            Field::NumAlive => self.num_alive,
            Field::NumDead => self.num_dead,
            Field::NumSusceptible => self.num_susceptible,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    seed: u64,
    parameters: Parameters,
    days: Vec<DayRecord>,
}

impl TimeSeries {
    #[must_use]
    pub fn new(seed: u64, parameters: Parameters) -> TimeSeries {
        TimeSeries {
            seed,
            parameters,
            days: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, record: DayRecord) {
        debug_assert_eq!(record.day, self.days.len());
        self.days.push(record);
    }

    /// The seed the run's random source was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn population_size(&self) -> usize {
        self.parameters.population_size
    }

    /// Number of recorded days.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&DayRecord> {
        self.days.last()
    }

    /// All records in day order, one row per day.
    #[must_use]
    pub fn to_table(&self) -> &[DayRecord] {
        &self.days
    }

    /// Returns the `x` and `y` columns of every record, in day order.
    #[must_use]
    pub fn get_series(&self, x: Field, y: Field) -> (Vec<usize>, Vec<usize>) {
        self.days
            .iter()
            .map(|record| (record.get(x), record.get(y)))
            .unzip()
    }

    /// Largest number of simultaneously infected agents and the first day it was reached.
    #[must_use]
    pub fn peak_infected(&self) -> Option<(usize, usize)> {
        self.days
            .iter()
            .max_by(|a, b| a.num_infected.cmp(&b.num_infected).then(b.day.cmp(&a.day)))
            .map(|record| (record.day, record.num_infected))
    }
}
