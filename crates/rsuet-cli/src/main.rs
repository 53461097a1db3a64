//! Command-line driver: load a TNTP network, run the RSUET solver, write the
//! CSV report set.

mod cli;
mod observer;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rsuet_choice::{RandomUtilityModel, ReferenceCost};
use rsuet_io::{load_network, ReportWriter};
use rsuet_solver::{RsuetSolverBuilder, SolveStatus};

use cli::{Cli, RumKind};
use observer::TracingObserver;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "rsuet=debug,info" } else { "rsuet=info,warn" };
    tracing_subscriber::fmt().with_env_filter(EnvFilter::new(filter)).init();

    let graph = load_network(&cli.network_dir, &cli.network_name, cli.is_network_bidirectional, cli.demand_scale)
        .with_context(|| format!("loading network {:?} from {:?}", cli.network_name, cli.network_dir))?;
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        ods = graph.od_count(),
        "network loaded"
    );

    let rum = match cli.rum {
        RumKind::Mnl => RandomUtilityModel::Mnl { theta: cli.theta, beta_time: cli.beta_time, beta_length: cli.beta_length },
        RumKind::Tmnl => RandomUtilityModel::Tmnl {
            theta: cli.theta,
            beta_time: cli.beta_time,
            beta_length: cli.beta_length,
            omega: ReferenceCost::TauMin { kappa: cli.omega_cost_ratio },
        },
        RumKind::Psl => RandomUtilityModel::Psl {
            theta: cli.theta,
            beta_time: cli.beta_time,
            beta_length: cli.beta_length,
            gamma: cli.gamma,
        },
    };

    let mut builder = RsuetSolverBuilder::new(graph, rum)
        .phi(ReferenceCost::TauMin { kappa: cli.maximum_cost_ratio })
        .omega(ReferenceCost::TauMin { kappa: cli.omega_cost_ratio })
        .epsilon(cli.epsilon)
        .outer_max(cli.outer_max)
        .inner_max(cli.inner_max);
    if let Some(local_kappa) = cli.local_maximum_cost_ratio {
        builder = builder.local_cost_ratio(ReferenceCost::TauMin { kappa: local_kappa });
    }
    let mut solver = builder.build().context("building solver")?;

    let mut observer = TracingObserver;
    let outcome = solver.run(&mut observer).context("running solver")?;

    match outcome.status {
        SolveStatus::Converged => tracing::info!("converged"),
        SolveStatus::NonConvergence => {
            let last = outcome.last_record();
            tracing::warn!(
                rel_gap_used = last.map(|r| r.rel_gap_used),
                outer_max = cli.outer_max,
                "outer loop hit outerMax without converging; writing the best-available flows anyway"
            );
        }
    }

    let report = ReportWriter::new(&cli.output_dir)
        .with_context(|| format!("creating output directory {:?}", cli.output_dir))?;
    report.write_flow(&solver.graph).context("writing flow.csv")?;
    report
        .write_parameters(&solver.rum, &solver.phi, &solver.omega, cli.epsilon, cli.outer_max, cli.inner_max)
        .context("writing parameters.csv")?;
    report
        .write_choice_sets(&solver.graph, &solver.choice_sets, cli.minimum_flow_to_be_considered_used)
        .context("writing choice-sets.csv")?;
    let last = outcome.last_record();
    report
        .write_choice_set_summary(
            last.map(|r| r.max_choice_set_size).unwrap_or(0),
            last.map(|r| r.avg_choice_set_size).unwrap_or(0.0),
        )
        .context("writing choice-set-summary.csv")?;
    report.write_convergence(&outcome.history).context("writing convergence.csv")?;

    tracing::info!(output_dir = %cli.output_dir.display(), "report written");
    Ok(())
}
