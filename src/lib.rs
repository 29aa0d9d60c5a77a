//! A day-stepped agent-based epidemic simulator
//!
//! Episim models a single infectious disease spreading through an unstructured population of
//! agents. Every agent carries the same epidemic parameters (virulence, incubation period,
//! infectious period and mortality) and three traits drawn at random when it is created:
//! natural immunity, hygiene and sociability.
//!
//! A run starts with one infected agent. Each simulated day every agent is ticked once, in
//! population order:
//! * infected agents count their days of infection and may die,
//! * agents become infectious once their incubation period is over and recover (for good)
//!   after their infectious period,
//! * infectious agents meet a handful of random living agents and may infect them.
//!
//! After all agents have been ticked the [`Simulation`] appends a [`DayRecord`] with the
//! day's counts to its [`TimeSeries`]. The run ends when nobody is infected any more, when
//! nobody is alive, or when a day limit is reached.
//!
//! Runs are reproducible: the seed of the random source is either taken from the
//! [`Parameters`] or drawn and recorded in the time series.
//!
//! The [`report`] module writes time series to CSV and JSON, and the [`runner`] module
//! provides the `episim` command line.
pub mod agent;
pub use agent::{tick, Agent, DiseaseState, Traits};

pub mod error;
pub use error::EpiError;

pub mod log;

pub mod parameters;
pub use parameters::{Parameters, ParametersBuilder};

pub mod random;

pub mod report;
pub use report::ReportOptions;

pub mod runner;

pub mod simulation;
pub use simulation::Simulation;

pub mod time_series;
pub use time_series::{DayRecord, Field, TimeSeries};
