use std::path::PathBuf;

use clap::{ArgAction, Args, Command, FromArgMatches as _};

use crate::error::EpiError;
use crate::log::{
    disable_logging, parse_log_levels, set_log_level, set_module_filters, LevelFilter,
};
use crate::parameters::Parameters;
use crate::report::{save_json, write_csv, ReportOptions};
use crate::simulation::Simulation;
use crate::time_series::TimeSeries;

/// Default cli arguments for the episim runner
#[derive(Args, Debug, Default)]
pub struct BaseArgs {
    /// Random seed. A seed is drawn and reported when absent
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Optional path for a JSON parameters file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Optional path for report output
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Optional prefix for report files
    #[arg(long, default_value = "")]
    pub file_prefix: String,

    /// Overwrite existing report files
    #[arg(short, long)]
    pub force_overwrite: bool,

    /// Stop after this many days even if the epidemic is still running
    #[arg(short, long)]
    pub max_days: Option<usize>,

    /// Enable logging: a global level ("debug") or module filters ("episim::agent=trace")
    #[arg(long)]
    pub log_level: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub parameters: ParameterArgs,
}

/// Overrides for individual values of the parameters file
#[derive(Args, Debug, Default)]
pub struct ParameterArgs {
    /// Number of agents
    #[arg(long)]
    pub population_size: Option<usize>,

    /// Baseline transmission chance of a single contact, at least 0
    #[arg(long)]
    pub virulence: Option<f64>,

    /// Days from infection until an agent becomes infectious
    #[arg(long)]
    pub incubation_days: Option<u32>,

    /// Days an agent stays infectious before recovering
    #[arg(long)]
    pub infectious_duration: Option<u32>,

    /// Scales the daily death hazard of infected agents
    #[arg(long)]
    pub mortality_rate: Option<f64>,
}

fn create_episim_cli() -> Command {
    let cli = Command::new("episim")
        .about("Runs a day-stepped agent-based epidemic simulation")
        .version(env!("CARGO_PKG_VERSION"));
    BaseArgs::augment_args(cli)
}

/// Runs a simulation configured from the command line.
///
/// # Errors
/// Returns an error if argument parsing fails, the parameters are invalid or a report cannot
/// be written
pub fn run_with_args() -> Result<TimeSeries, Box<dyn std::error::Error>> {
    let matches = create_episim_cli().get_matches();
    let args = BaseArgs::from_arg_matches(&matches)?;
    run_with_args_internal(args)
}

fn run_with_args_internal(args: BaseArgs) -> Result<TimeSeries, Box<dyn std::error::Error>> {
    configure_logging(args.log_level.as_deref(), args.verbose)?;

    let parameters = build_parameters(&args)?;
    let mut simulation = Simulation::new(parameters)?;
    simulation.run(args.max_days);
    let time_series = simulation.into_time_series();

    // Optionally write reports to the output dir
    if let Some(output_dir) = &args.output_dir {
        let mut report_options = ReportOptions::new();
        report_options
            .directory(output_dir.clone())
            .file_prefix(&args.file_prefix)
            .overwrite(args.force_overwrite);
        let csv_path = write_csv(&time_series, &report_options, "time_series")?;
        let json_path = save_json(&time_series, &report_options, "simulation")?;
        println!("Wrote {}", csv_path.display());
        println!("Wrote {}", json_path.display());
    }

    println!("{}", summary(&time_series));
    Ok(time_series)
}

/// Applies `--log-level` and `-v` flags. A global level given with `--log-level` wins over
/// the verbosity count.
fn configure_logging(log_level: Option<&str>, verbose: u8) -> Result<(), EpiError> {
    let (global, modules) = match log_level {
        Some(spec) => parse_log_levels(spec)?,
        None => (None, Vec::new()),
    };

    let verbosity = match verbose {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    };
    match global.or(verbosity) {
        Some(LevelFilter::Off) => {
            disable_logging();
            println!("Logging disabled");
        }
        Some(level) => {
            set_log_level(level);
            println!("Logging enabled at level {level}");
        }
        None => {}
    }

    let module_filters: Vec<(&String, LevelFilter)> = modules
        .iter()
        .map(|(module, level)| (module, *level))
        .collect();
    set_module_filters(&module_filters);
    for (module, level) in &modules {
        println!("Logging enabled for {module} at level {level}");
    }
    Ok(())
}

/// Starts from the config file (or defaults) and applies command-line overrides.
fn build_parameters(args: &BaseArgs) -> Result<Parameters, EpiError> {
    let mut parameters = match &args.config {
        Some(path) => {
            println!("Loading parameters from: {}", path.display());
            Parameters::from_json_file(path)?
        }
        None => Parameters::default(),
    };

    let overrides = &args.parameters;
    if let Some(population_size) = overrides.population_size {
        parameters.population_size = population_size;
    }
    if let Some(virulence) = overrides.virulence {
        parameters.virulence = virulence;
    }
    if let Some(incubation_days) = overrides.incubation_days {
        parameters.incubation_days = incubation_days;
    }
    if let Some(infectious_duration) = overrides.infectious_duration {
        parameters.infectious_duration = infectious_duration;
    }
    if let Some(mortality_rate) = overrides.mortality_rate {
        parameters.mortality_rate = mortality_rate;
    }
    if args.random_seed.is_some() {
        parameters.seed = args.random_seed;
    }

    parameters.validate()?;
    Ok(parameters)
}

fn summary(time_series: &TimeSeries) -> String {
    let mut line = format!(
        "seed {}: {} days simulated",
        time_series.seed(),
        time_series.len()
    );
    if let Some(last) = time_series.last() {
        line.push_str(&format!(
            ", {} alive, {} dead, {} immune, {} still infected",
            last.num_alive, last.num_dead, last.num_immune, last.num_infected
        ));
    }
    if let Some((day, count)) = time_series.peak_infected() {
        line.push_str(&format!(", peak of {count} infected on day {day}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn seeded_args(seed: u64) -> BaseArgs {
        BaseArgs {
            random_seed: Some(seed),
            ..BaseArgs::default()
        }
    }

    #[test]
    fn test_cli_definition() {
        create_episim_cli().debug_assert();
    }

    #[test]
    fn test_parse_all_flags() {
        let matches = create_episim_cli().get_matches_from([
            "episim",
            "-r",
            "7",
            "-c",
            "params.json",
            "-o",
            "out",
            "--file-prefix",
            "a_",
            "-f",
            "-m",
            "30",
            "--population-size",
            "12",
            "--virulence",
            "0.5",
            "--incubation-days",
            "2",
            "--infectious-duration",
            "9",
            "--mortality-rate",
            "0.0",
            "-vv",
        ]);
        let args = BaseArgs::from_arg_matches(&matches).unwrap();
        assert_eq!(args.random_seed, Some(7));
        assert_eq!(args.config, Some(PathBuf::from("params.json")));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert_eq!(args.file_prefix, "a_");
        assert!(args.force_overwrite);
        assert_eq!(args.max_days, Some(30));
        assert_eq!(args.verbose, 2);
        assert_eq!(args.parameters.population_size, Some(12));
        assert_eq!(args.parameters.virulence, Some(0.5));
        assert_eq!(args.parameters.incubation_days, Some(2));
        assert_eq!(args.parameters.infectious_duration, Some(9));
        assert_eq!(args.parameters.mortality_rate, Some(0.0));
    }

    #[test]
    fn test_run_with_random_seed() {
        let first = run_with_args_internal(seeded_args(42)).unwrap();
        let second = run_with_args_internal(seeded_args(42)).unwrap();
        assert_eq!(first.seed(), 42);
        assert_eq!(first, second);
    }

    #[test]
    fn test_run_with_config_path() {
        let test_args = BaseArgs {
            config: Some(PathBuf::from("tests/data/parameters.json")),
            ..seeded_args(42)
        };
        let series = run_with_args_internal(test_args).unwrap();
        assert_eq!(series.population_size(), 50);
        assert_eq!(series.parameters().incubation_days, 2);
    }

    #[test]
    fn test_command_line_overrides_config() {
        let mut test_args = BaseArgs {
            config: Some(PathBuf::from("tests/data/parameters.json")),
            ..seeded_args(42)
        };
        test_args.parameters.population_size = Some(15);
        test_args.parameters.mortality_rate = Some(0.0);
        let parameters = build_parameters(&test_args).unwrap();
        assert_eq!(parameters.population_size, 15);
        assert_eq!(parameters.mortality_rate, 0.0);
        // Untouched values come from the file
        assert_eq!(parameters.incubation_days, 2);
        assert_eq!(parameters.seed, Some(42));
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let mut test_args = seeded_args(1);
        test_args.parameters.virulence = Some(-0.5);
        assert!(matches!(
            build_parameters(&test_args),
            Err(EpiError::InvalidParameter {
                name: "virulence",
                ..
            })
        ));
        assert!(run_with_args_internal(test_args).is_err());
    }

    #[test]
    fn test_run_with_max_days() {
        let test_args = BaseArgs {
            max_days: Some(2),
            ..seeded_args(3)
        };
        let series = run_with_args_internal(test_args).unwrap();
        assert!(series.len() <= 2);
    }

    #[test]
    fn test_run_with_output_dir() {
        let temp_dir = tempdir().unwrap();
        let test_args = BaseArgs {
            output_dir: Some(temp_dir.path().to_path_buf()),
            file_prefix: "run_".to_string(),
            ..seeded_args(42)
        };
        run_with_args_internal(test_args).unwrap();
        assert!(temp_dir.path().join("run_time_series.csv").exists());
        assert!(temp_dir.path().join("run_simulation.json").exists());
    }

    #[test]
    fn test_existing_reports_need_force_overwrite() {
        let temp_dir = tempdir().unwrap();
        let csv = temp_dir.path().join("time_series.csv");
        fs::write(&csv, "PREEXISTING").unwrap();

        let args = || BaseArgs {
            output_dir: Some(temp_dir.path().to_path_buf()),
            ..seeded_args(42)
        };
        assert!(run_with_args_internal(args()).is_err());

        let forced = BaseArgs {
            force_overwrite: true,
            ..args()
        };
        run_with_args_internal(forced).unwrap();
        assert_ne!(fs::read_to_string(&csv).unwrap(), "PREEXISTING");
    }

    #[test]
    fn test_bad_log_level_is_rejected() {
        assert!(configure_logging(Some("chatty"), 0).is_err());
    }

    #[test]
    fn test_summary_mentions_seed() {
        let series = run_with_args_internal(seeded_args(9)).unwrap();
        let line = summary(&series);
        assert!(line.starts_with("seed 9: "));
        assert!(line.contains(&format!("{} days simulated", series.len())));
    }
}
