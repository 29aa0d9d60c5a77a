//! Epidemic parameters shared by every agent of a simulation.
//!
//! Parameters can be built in code with [`ParametersBuilder`] or loaded from a JSON file with
//! [`Parameters::from_json_file`]. Fields left out of a file (or not set on the builder) take
//! the defaults below:
//!
//! ```json
//! {
//!     "population_size": 30,
//!     "virulence": 0.8,
//!     "incubation_days": 3,
//!     "infectious_duration": 20,
//!     "mortality_rate": 0.1,
//!     "seed": null
//! }
//! ```
use std::fs;
use std::path::Path;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::EpiError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Builder)]
#[builder(default)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    /// Number of agents, including the single seed infection.
    pub population_size: usize,

    /// Baseline transmission probability of a single contact.
    pub virulence: f64,

    /// Days from infection until an agent becomes infectious.
    pub incubation_days: u32,

    /// Days an agent stays infectious before it recovers.
    pub infectious_duration: u32,

    /// Scales the daily death hazard of an infected agent.
    pub mortality_rate: f64,

    /// Fixed seed for the random source. A fresh seed is drawn when absent.
    #[builder(setter(strip_option))]
    pub seed: Option<u64>,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            population_size: 30,
            virulence: 0.8,
            incubation_days: 3,
            infectious_duration: 20,
            mortality_rate: 0.1,
            seed: None,
        }
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), EpiError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(EpiError::invalid_parameter(
            name,
            format!("must lie in [0, 1], got {value}"),
        ));
    }
    Ok(())
}

impl Parameters {
    /// Reads parameters from a JSON file. Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns an `EpiError` if the file cannot be read or parsed, or if the resulting
    /// parameters fail [`Parameters::validate`].
    pub fn from_json_file(path: &Path) -> Result<Parameters, EpiError> {
        let contents = fs::read_to_string(path)?;
        let parameters: Parameters = serde_json::from_str(&contents)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Checks the parameters against their documented ranges. Nothing is clamped.
    ///
    /// # Errors
    ///
    /// Returns `EpiError::InvalidParameter` naming the first offending parameter.
    pub fn validate(&self) -> Result<(), EpiError> {
        if self.population_size == 0 {
            return Err(EpiError::invalid_parameter(
                "population_size",
                "must be positive",
            ));
        }
        if !self.virulence.is_finite() || self.virulence < 0.0 {
            return Err(EpiError::invalid_parameter(
                "virulence",
                format!("must be finite and non-negative, got {}", self.virulence),
            ));
        }
        check_probability("mortality_rate", self.mortality_rate)?;
        // An infection must resolve on some day or a run without deaths never ends.
        if self.incubation_days == 0 && self.infectious_duration == 0 {
            return Err(EpiError::invalid_parameter(
                "infectious_duration",
                "incubation_days + infectious_duration must be at least 1",
            ));
        }
        Ok(())
    }

    /// Day of infection on which an agent recovers.
    #[must_use]
    pub fn recovery_day(&self) -> u32 {
        self.incubation_days.saturating_add(self.infectious_duration)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let parameters = Parameters::default();
        assert!(parameters.validate().is_ok());
        assert_eq!(parameters.recovery_day(), 23);
    }

    #[test]
    fn builder_overrides_defaults() {
        let parameters = ParametersBuilder::default()
            .population_size(10)
            .seed(7)
            .build()
            .unwrap();
        assert_eq!(parameters.population_size, 10);
        assert_eq!(parameters.seed, Some(7));
        assert_eq!(parameters.virulence, 0.8);
    }

    #[test]
    fn zero_population_is_rejected() {
        let parameters = ParametersBuilder::default()
            .population_size(0)
            .build()
            .unwrap();
        let result = parameters.validate();
        assert!(matches!(
            result,
            Err(EpiError::InvalidParameter {
                name: "population_size",
                ..
            })
        ));
    }

    #[test]
    fn probabilities_out_of_range_are_rejected() {
        let parameters = ParametersBuilder::default()
            .mortality_rate(1.5)
            .build()
            .unwrap();
        assert!(matches!(
            parameters.validate(),
            Err(EpiError::InvalidParameter {
                name: "mortality_rate",
                ..
            })
        ));

        let parameters = ParametersBuilder::default()
            .virulence(-0.1)
            .build()
            .unwrap();
        assert!(matches!(
            parameters.validate(),
            Err(EpiError::InvalidParameter {
                name: "virulence",
                ..
            })
        ));

        let parameters = ParametersBuilder::default()
            .virulence(f64::NAN)
            .build()
            .unwrap();
        assert!(parameters.validate().is_err());
    }

    #[test]
    fn virulence_above_one_is_accepted() {
        let parameters = ParametersBuilder::default()
            .virulence(2.5)
            .build()
            .unwrap();
        assert!(parameters.validate().is_ok());

        let parameters = ParametersBuilder::default()
            .virulence(f64::INFINITY)
            .build()
            .unwrap();
        assert!(parameters.validate().is_err());
    }

    #[test]
    fn infection_must_resolve() {
        let parameters = ParametersBuilder::default()
            .incubation_days(0)
            .infectious_duration(0)
            .build()
            .unwrap();
        assert!(parameters.validate().is_err());

        let parameters = ParametersBuilder::default()
            .incubation_days(0)
            .infectious_duration(1)
            .build()
            .unwrap();
        assert!(parameters.validate().is_ok());
    }

    #[test]
    fn load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "population_size": 100, "seed": 42 }}"#).unwrap();
        let parameters = Parameters::from_json_file(file.path()).unwrap();
        assert_eq!(parameters.population_size, 100);
        assert_eq!(parameters.seed, Some(42));
        assert_eq!(parameters.infectious_duration, 20);
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "population": 100 }}"#).unwrap();
        let result = Parameters::from_json_file(file.path());
        assert!(matches!(result, Err(EpiError::JsonError(_))));
    }

    #[test]
    fn load_validates() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "mortality_rate": 2.0 }}"#).unwrap();
        let result = Parameters::from_json_file(file.path());
        assert!(matches!(result, Err(EpiError::InvalidParameter { .. })));
    }

    #[test]
    fn load_missing_file() {
        let result = Parameters::from_json_file(Path::new("/no/such/parameters.json"));
        assert!(matches!(result, Err(EpiError::IoError(_))));
    }
}
