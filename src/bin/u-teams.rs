use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use u_teams::balancer::TeamBalancer;
use u_teams::config::BalanceConfig;
use u_teams::constraints::ConstraintSet;
use u_teams::exact::{GoodLpBackend, MipBackend};
use u_teams::model::Roster;

#[derive(Parser, Debug)]
#[command(name = "u-teams", about = "Split a rated roster into balanced teams")]
struct Cli {
    /// CSV roster with `Name` and `Rating` columns.
    roster: PathBuf,
    /// TOML file with a `BalanceConfig`; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of teams.
    #[arg(long, short = 'k')]
    teams: Option<usize>,
    /// Comma-separated names that must share a team. Repeatable.
    #[arg(long, value_name = "A,B,...")]
    together: Vec<String>,
    /// Comma-separated names: the first must not share a team with any of
    /// the others. Repeatable.
    #[arg(long, value_name = "A,B,...")]
    apart: Vec<String>,
    /// Seed for the initializer and the annealer.
    #[arg(long)]
    seed: Option<u64>,
    /// Exact solver time limit in seconds (0 = no limit).
    #[arg(long)]
    time_limit: Option<f64>,
    /// Also run the exact solver.
    #[arg(long)]
    exact: bool,
    /// Skip simulated annealing.
    #[arg(long)]
    no_anneal: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BalanceConfig::from_toml_file(path)?,
        None => BalanceConfig::default(),
    };
    if let Some(k) = cli.teams {
        config.num_teams = k;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(secs) = cli.time_limit {
        config.solver_time_limit = secs;
    }

    let roster = Roster::from_csv_path(&cli.roster)?;
    let constraints = parse_constraints(&roster, &cli.together, &cli.apart)?;
    let balancer = TeamBalancer::new(&roster, &constraints, config)?;

    if !cli.no_anneal {
        let annealed = balancer.anneal()?;
        println!("SA Best Teams Configuration:");
        println!("{}", annealed.partition.report(&roster));
        println!();
    }

    if cli.exact {
        let exact = balancer.solve_exact(backend())?;
        if exact.optimal {
            println!("ILP Optimal Teams Configuration:");
        } else {
            println!("ILP Teams Configuration (time limit reached):");
        }
        println!("{}", exact.partition.report(&roster));
    }
    Ok(())
}

fn parse_constraints(
    roster: &Roster,
    together: &[String],
    apart: &[String],
) -> Result<ConstraintSet, Box<dyn Error>> {
    let mut constraints = ConstraintSet::new();
    for arg in together {
        let names = split_names(arg);
        constraints.together_by_name(roster, &names)?;
    }
    for arg in apart {
        let names = split_names(arg);
        match names.split_first() {
            Some((first, others)) if !others.is_empty() => {
                constraints.apart_by_name(roster, first, others)?;
            }
            _ => return Err(format!("--apart needs at least two names, got {arg:?}").into()),
        }
    }
    Ok(constraints)
}

fn split_names(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn backend() -> impl MipBackend {
    GoodLpBackend::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::from_pairs([
            ("Ann", 9),
            ("Bo", 7),
            ("Cy", 6),
            ("Di", 5),
            ("Ed", 4),
            ("Flo", 3),
            ("Gus", 2),
            ("Hal", 1),
        ])
        .unwrap()
    }

    #[test]
    fn test_split_names_trims_and_skips_empty() {
        assert_eq!(split_names(" Ann, Bo ,,Cy"), vec!["Ann", "Bo", "Cy"]);
        assert!(split_names(" , ").is_empty());
    }

    #[test]
    fn test_parse_constraints() {
        let roster = roster();
        let cs = parse_constraints(
            &roster,
            &["ann,bo".to_string()],
            &["Cy,Di,Ed".to_string()],
        )
        .unwrap();
        assert_eq!(cs.groups().len(), 1);
        assert_eq!(cs.apart_pairs().len(), 2);

        let err = parse_constraints(&roster, &[], &["Cy".to_string()]);
        assert!(err.is_err());
    }

    #[test]
    fn test_exact_backend_is_lp() {
        let roster = roster();
        let constraints = ConstraintSet::new();
        let config = BalanceConfig::default().with_num_teams(2).with_seed(1);
        let balancer = TeamBalancer::new(&roster, &constraints, config).unwrap();

        let outcome = balancer.solve_exact(backend()).unwrap();
        assert!(outcome.optimal);
        assert_eq!(outcome.partition.imbalance(), 1);
        assert_eq!(outcome.partition.team_sizes(), vec![4, 4]);
    }
}
