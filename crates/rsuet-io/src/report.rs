//! Semicolon-delimited CSV report writer.
//!
//! Writes the five-file output set into a caller-chosen directory:
//! `flow.csv`, `parameters.csv`, `choice-sets.csv`, `choice-set-summary.csv`,
//! `convergence.csv`.

use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use rsuet_choice::{ChoiceSetManager, RandomUtilityModel, ReferenceCost};
use rsuet_core::OdIdx;
use rsuet_network::Graph;
use rsuet_solver::ConvergenceRecord;

use crate::error::IoResult;

/// Writes the RSUET report set to one directory.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Create `dir` (and any missing parents) if it doesn't already exist.
    pub fn new(dir: &Path) -> IoResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self { dir: dir.to_path_buf() })
    }

    fn writer(&self, filename: &str) -> IoResult<csv::Writer<std::fs::File>> {
        Ok(WriterBuilder::new().delimiter(b';').from_path(self.dir.join(filename))?)
    }

    /// `flow.csv`: `EdgeID; Flow; Time`, one row per edge. `EdgeID` is
    /// 1-based to match the node numbering in `choice-sets.csv` and the
    /// TNTP source files, so the two reports can be joined on a common id
    /// space.
    pub fn write_flow(&self, graph: &Graph) -> IoResult<()> {
        let mut w = self.writer("flow.csv")?;
        w.write_record(["EdgeID", "Flow", "Time"])?;
        for i in 0..graph.edge_count() {
            let edge = graph.edge(rsuet_core::EdgeIdx::from_index(i));
            w.write_record([(i + 1).to_string(), edge.flow.to_string(), edge.time.to_string()])?;
        }
        w.flush()?;
        Ok(())
    }

    /// `parameters.csv`: key/value pairs describing the RUM and solver setup.
    pub fn write_parameters(
        &self,
        rum: &RandomUtilityModel,
        phi: &ReferenceCost,
        omega: &ReferenceCost,
        epsilon: f64,
        outer_max: u32,
        inner_max: u32,
    ) -> IoResult<()> {
        let mut w = self.writer("parameters.csv")?;
        w.write_record(["Key", "Value"])?;

        let (variant, theta, beta_time, beta_length) = match rum {
            RandomUtilityModel::Mnl { theta, beta_time, beta_length } => ("MNL", *theta, *beta_time, *beta_length),
            RandomUtilityModel::Tmnl { theta, beta_time, beta_length, .. } => {
                ("TMNL", *theta, *beta_time, *beta_length)
            }
            RandomUtilityModel::Psl { theta, beta_time, beta_length, .. } => ("PSL", *theta, *beta_time, *beta_length),
        };
        w.write_record(["rumVariant", variant])?;
        w.write_record(["theta", theta.to_string().as_str()])?;
        w.write_record(["betaTime", beta_time.to_string().as_str()])?;
        w.write_record(["betaLength", beta_length.to_string().as_str()])?;
        if let RandomUtilityModel::Psl { gamma, .. } = rum {
            w.write_record(["pathSizeGamma", gamma.to_string().as_str()])?;
        }
        if let RandomUtilityModel::Tmnl { omega, .. } = rum {
            write_reference_cost(&mut w, "omega (rum)", omega)?;
        }

        write_reference_cost(&mut w, "phi", phi)?;
        write_reference_cost(&mut w, "omega", omega)?;
        w.write_record(["epsilon", epsilon.to_string().as_str()])?;
        w.write_record(["outerMax", outer_max.to_string().as_str()])?;
        w.write_record(["innerMax", inner_max.to_string().as_str()])?;

        w.flush()?;
        Ok(())
    }

    /// `choice-sets.csv`: `O;D;Path;Choice-P;Flow;Generalized-cost`. Only
    /// paths with `flow >= minimum_flow_to_be_considered_used` are written.
    pub fn write_choice_sets(
        &self,
        graph: &Graph,
        choice_sets: &ChoiceSetManager,
        minimum_flow_to_be_considered_used: f64,
    ) -> IoResult<()> {
        let mut w = self.writer("choice-sets.csv")?;
        w.write_record(["O", "D", "Path", "Choice-P", "Flow", "Generalized-cost"])?;

        for od_index in 0..graph.od_count() {
            let od_idx = OdIdx(od_index as u32);
            let od = graph.od(od_idx);
            for path in choice_sets.paths(od_idx) {
                if path.flow < minimum_flow_to_be_considered_used {
                    continue;
                }
                let node_path = path_node_sequence(graph, &path.edges, od.origin.index() as u32 + 1);
                w.write_record([
                    (od.origin.index() + 1).to_string(),
                    (od.destination.index() + 1).to_string(),
                    node_path,
                    path.p.to_string(),
                    path.flow.to_string(),
                    path.gen_cost.to_string(),
                ])?;
            }
        }
        w.flush()?;
        Ok(())
    }

    /// `choice-set-summary.csv`: average and maximum restricted-set size.
    pub fn write_choice_set_summary(&self, max_size: usize, avg_size: f64) -> IoResult<()> {
        let mut w = self.writer("choice-set-summary.csv")?;
        w.write_record(["MaxChoiceSetSize", "AvgChoiceSetSize"])?;
        w.write_record([max_size.to_string(), avg_size.to_string()])?;
        w.flush()?;
        Ok(())
    }

    /// `convergence.csv`: one row per outer iteration.
    pub fn write_convergence(&self, history: &[ConvergenceRecord]) -> IoResult<()> {
        let mut w = self.writer("convergence.csv")?;
        w.write_record(["OuterIter", "InnerIter", "RelGapUsed", "MaxChoiceSetSize", "AvgChoiceSetSize"])?;
        for record in history {
            w.write_record([
                record.outer_iter.to_string(),
                record.inner_iter.to_string(),
                record.rel_gap_used.to_string(),
                record.max_choice_set_size.to_string(),
                record.avg_choice_set_size.to_string(),
            ])?;
        }
        w.flush()?;
        Ok(())
    }
}

fn write_reference_cost(w: &mut csv::Writer<std::fs::File>, label: &str, rc: &ReferenceCost) -> IoResult<()> {
    match rc {
        ReferenceCost::TauMin { kappa } => w.write_record([format!("{label}Kappa"), kappa.to_string()])?,
        ReferenceCost::MinPlusDelta { delta } => w.write_record([format!("{label}Delta"), delta.to_string()])?,
    }
    Ok(())
}

/// 1-based node-id sequence along an edge chain, space-separated.
fn path_node_sequence(graph: &Graph, edges: &[rsuet_core::EdgeIdx], origin_id: u32) -> String {
    if edges.is_empty() {
        return origin_id.to_string();
    }
    let mut ids = vec![(graph.edge(edges[0]).tail.index() + 1).to_string()];
    for &e in edges {
        ids.push((graph.edge(e).head.index() + 1).to_string());
    }
    ids.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsuet_core::Point;
    use rsuet_network::GraphBuilder;

    fn tiny_graph() -> Graph {
        let mut b = GraphBuilder::new();
        let n0 = b.add_node(Point::ORIGIN);
        let n1 = b.add_node(Point::ORIGIN);
        b.add_edge(n0, n1, 100.0, 1.0, 1.0, 0.15, 4.0);
        b.add_od(n0, n1, 10.0).unwrap();
        b.build()
    }

    #[test]
    fn write_flow_creates_a_row_per_edge() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();
        let graph = tiny_graph();
        writer.write_flow(&graph).unwrap();

        let contents = std::fs::read_to_string(dir.path().join("flow.csv")).unwrap();
        assert_eq!(contents.lines().count(), 2); // header + one edge
        assert!(contents.contains(';'));
    }

    #[test]
    fn write_parameters_includes_rum_fields() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();
        let rum = RandomUtilityModel::Mnl { theta: 0.5, beta_time: 1.0, beta_length: 0.0 };
        let phi = ReferenceCost::TauMin { kappa: 1.3 };
        let omega = ReferenceCost::TauMin { kappa: 1.3 };
        writer.write_parameters(&rum, &phi, &omega, 1e-4, 100, 1000).unwrap();

        let contents = std::fs::read_to_string(dir.path().join("parameters.csv")).unwrap();
        assert!(contents.contains("MNL"));
        assert!(contents.contains("theta"));
    }

    #[test]
    fn write_choice_sets_filters_below_minimum_flow() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();
        let mut graph = tiny_graph();
        let mut mgr = ChoiceSetManager::new(1);
        mgr.add_path(OdIdx(0), vec![rsuet_core::EdgeIdx(0)]);
        mgr.update_path_costs(&mut graph);
        mgr.paths_mut(OdIdx(0))[0].flow = 0.0001;

        writer.write_choice_sets(&graph, &mgr, 0.01).unwrap();
        let contents = std::fs::read_to_string(dir.path().join("choice-sets.csv")).unwrap();
        assert_eq!(contents.lines().count(), 1); // header only, path filtered out
    }
}
