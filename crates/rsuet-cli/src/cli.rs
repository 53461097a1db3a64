//! Command-line argument surface.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Run the RSUET solver on a TNTP network and write the CSV report set.
#[derive(Parser, Debug)]
#[command(name = "rsuet", version, about)]
pub struct Cli {
    /// Directory containing `{name}_net.tntp`, `{name}_node.tntp`, `{name}_trips.tntp`.
    #[arg(long)]
    pub network_dir: PathBuf,

    /// Filename prefix shared by the three TNTP files.
    #[arg(long)]
    pub network_name: String,

    /// Materialise every net edge in both directions with identical parameters.
    #[arg(long)]
    pub is_network_bidirectional: bool,

    /// Multiplier applied to every trip-table demand entry on load.
    #[arg(long, default_value_t = 1.0)]
    pub demand_scale: f64,

    /// Random utility model variant.
    #[arg(long, value_enum, default_value_t = RumKind::Mnl)]
    pub rum: RumKind,

    /// RUM scale parameter, theta > 0.
    #[arg(long, default_value_t = 1.0)]
    pub theta: f64,

    /// Generalised-cost weight on travel time.
    #[arg(long, default_value_t = 1.0)]
    pub beta_time: f64,

    /// Generalised-cost weight on link length.
    #[arg(long, default_value_t = 0.0)]
    pub beta_length: f64,

    /// Path-size overlap exponent, used only by `--rum psl`.
    #[arg(long, default_value_t = 1.0)]
    pub gamma: f64,

    /// Outer pruning threshold multiplier: `phi(od) = maximum_cost_ratio * od.minimum_cost`.
    #[arg(long, default_value_t = 1.3)]
    pub maximum_cost_ratio: f64,

    /// Tighter inner-loop path admission cutoff; unset means no additional cut.
    #[arg(long)]
    pub local_maximum_cost_ratio: Option<f64>,

    /// Upper reference cost multiplier for truncating RUM variants and the outer gap check.
    #[arg(long, default_value_t = 1.3)]
    pub omega_cost_ratio: f64,

    /// Convergence tolerance on the relative gap over used routes.
    #[arg(long, default_value_t = 1e-4)]
    pub epsilon: f64,

    /// Safety cap on outer iterations.
    #[arg(long, default_value_t = 100)]
    pub outer_max: u32,

    /// Safety cap on inner iterations per outer iteration.
    #[arg(long, default_value_t = 1000)]
    pub inner_max: u32,

    /// Paths with flow below this are omitted from `choice-sets.csv`.
    #[arg(long, default_value_t = 1e-6)]
    pub minimum_flow_to_be_considered_used: f64,

    /// Output directory for the CSV report set; created if missing.
    #[arg(long, default_value = "./output")]
    pub output_dir: PathBuf,

    /// Emit per-iteration convergence logging.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum RumKind {
    Mnl,
    Tmnl,
    Psl,
}
