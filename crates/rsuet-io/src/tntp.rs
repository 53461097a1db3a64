//! Reader for the TNTP network/trip table triplet.
//!
//! A network is three files sharing a `name` prefix in one directory:
//!
//! - `{name}_net.tntp` — metadata block terminated by `<END OF METADATA>`, a
//!   `~`-marked column header, then whitespace-separated rows of
//!   `tail head capacity length freeFlowTime b power`. Edge ids run 1..N in
//!   file order.
//! - `{name}_node.tntp` — optional; rows of `id x y`. Absent means every node
//!   is synthesised at `(0,0)`.
//! - `{name}_trips.tntp` — metadata block, then blocks of `Origin <o>`
//!   followed by semicolon-separated `d : demand` entries, possibly spread
//!   across several lines before the next `Origin` block.
//!
//! Node ids in the files are 1-based; internally they become `NodeIdx(id - 1)`.

use std::path::Path;
use std::str::FromStr;

use rsuet_core::{NodeIdx, Point};
use rsuet_network::{Graph, GraphBuilder};

use crate::error::{IoError, IoResult};

struct NetRow {
    tail: u32,
    head: u32,
    capacity: f64,
    length: f64,
    free_flow_time: f64,
    b: f64,
    power: f64,
}

/// Load the `{name}_net`/`{name}_node`/`{name}_trips` triplet from `dir` into
/// a [`Graph`]. When `bidirectional` is set, every net row is materialised in
/// both directions with identical parameters. `demand_scale` multiplies every
/// trip table entry before it is added as OD demand.
pub fn load_network(dir: &Path, name: &str, bidirectional: bool, demand_scale: f64) -> IoResult<Graph> {
    let net_rows = parse_net(&dir.join(format!("{name}_net.tntp")))?;

    let node_path = dir.join(format!("{name}_node.tntp"));
    let positions = if node_path.exists() { parse_node(&node_path)? } else { Vec::new() };

    let mut max_id = net_rows.iter().map(|r| r.tail.max(r.head)).max().unwrap_or(0);
    for &(id, _, _) in &positions {
        max_id = max_id.max(id);
    }

    let mut builder = GraphBuilder::with_capacity(max_id as usize, net_rows.len(), 0);
    for id in 1..=max_id {
        let pos = positions
            .iter()
            .find(|(pid, _, _)| *pid == id)
            .map(|(_, x, y)| Point::new(*x, *y))
            .unwrap_or(Point::ORIGIN);
        builder.add_node(pos);
    }

    for row in &net_rows {
        let tail = NodeIdx(row.tail - 1);
        let head = NodeIdx(row.head - 1);
        builder.add_edge(tail, head, row.capacity, row.length, row.free_flow_time, row.b, row.power);
        if bidirectional {
            builder.add_edge(head, tail, row.capacity, row.length, row.free_flow_time, row.b, row.power);
        }
    }

    let trips_path = dir.join(format!("{name}_trips.tntp"));
    for (origin, destination, demand) in parse_trips(&trips_path)? {
        builder.add_od(NodeIdx(origin - 1), NodeIdx(destination - 1), demand * demand_scale)?;
    }

    Ok(builder.build())
}

fn parse_num<T: FromStr>(s: &str, what: &str) -> IoResult<T> {
    s.trim()
        .parse()
        .map_err(|_| IoError::NetworkRead(format!("expected {what}, got {s:?}")))
}

/// Skip lines up to and including `<END OF METADATA>`.
fn skip_metadata<'a>(lines: &mut impl Iterator<Item = &'a str>) -> IoResult<()> {
    for line in lines.by_ref() {
        if line.trim().eq_ignore_ascii_case("<END OF METADATA>") {
            return Ok(());
        }
    }
    Err(IoError::NetworkRead("missing <END OF METADATA> marker".into()))
}

fn parse_net(path: &Path) -> IoResult<Vec<NetRow>> {
    let text = std::fs::read_to_string(path)?;
    let mut lines = text.lines();
    skip_metadata(&mut lines)?;

    let mut rows = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.contains('~') {
            continue;
        }
        let tokens: Vec<&str> = line.trim_end_matches(';').split_whitespace().collect();
        if tokens.len() < 7 {
            return Err(IoError::NetworkRead(format!("malformed net row: {line:?}")));
        }
        rows.push(NetRow {
            tail: parse_num(tokens[0], "tail node id")?,
            head: parse_num(tokens[1], "head node id")?,
            capacity: parse_num(tokens[2], "capacity")?,
            length: parse_num(tokens[3], "length")?,
            free_flow_time: parse_num(tokens[4], "freeFlowTime")?,
            b: parse_num(tokens[5], "b")?,
            power: parse_num(tokens[6], "power")?,
        });
    }
    Ok(rows)
}

fn parse_node(path: &Path) -> IoResult<Vec<(u32, f64, f64)>> {
    let text = std::fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || i == 0 && line.to_ascii_lowercase().starts_with("node") {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(IoError::NetworkRead(format!("malformed node row: {line:?}")));
        }
        rows.push((
            parse_num(tokens[0], "node id")?,
            parse_num(tokens[1], "x coordinate")?,
            parse_num(tokens[2], "y coordinate")?,
        ));
    }
    Ok(rows)
}

fn parse_trips(path: &Path) -> IoResult<Vec<(u32, u32, f64)>> {
    let text = std::fs::read_to_string(path)?;
    let mut lines = text.lines();
    skip_metadata(&mut lines)?;

    let mut rows = Vec::new();
    let mut origin: Option<u32> = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("Origin") {
            origin = Some(parse_num(rest.trim().trim_end_matches(':').trim(), "origin id")?);
            continue;
        }
        let Some(o) = origin else {
            return Err(IoError::NetworkRead(format!("trip entry before any Origin block: {line:?}")));
        };
        for entry in line.split(';') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let mut parts = entry.splitn(2, ':');
            let dest = parts
                .next()
                .ok_or_else(|| IoError::NetworkRead(format!("malformed trip entry: {entry:?}")))?;
            let demand = parts
                .next()
                .ok_or_else(|| IoError::NetworkRead(format!("malformed trip entry: {entry:?}")))?;
            let d: u32 = parse_num(dest, "destination id")?;
            let demand: f64 = parse_num(demand, "demand")?;
            if demand <= 0.0 {
                continue;
            }
            rows.push((o, d, demand));
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn parses_a_minimal_triplet() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "t_net.tntp",
            "<NUMBER OF NODES> 3\n<END OF METADATA>\n~\ttail\thead\tcapacity\tlength\tfft\tb\tpower\t;\n1\t2\t100.0\t1.0\t1.0\t0.15\t4.0\t;\n2\t3\t100.0\t1.0\t1.0\t0.15\t4.0\t;\n",
        );
        write(dir.path(), "t_trips.tntp", "<END OF METADATA>\nOrigin 1\n3 : 50.0 ;\n");

        let graph = load_network(dir.path(), "t", false, 1.0).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.od_count(), 1);
        assert_eq!(graph.od(rsuet_core::OdIdx(0)).demand, 50.0);
    }

    #[test]
    fn bidirectional_flag_doubles_edge_count() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "t_net.tntp",
            "<END OF METADATA>\n~\t;\n1\t2\t100.0\t1.0\t1.0\t0.15\t4.0\t;\n",
        );
        write(dir.path(), "t_trips.tntp", "<END OF METADATA>\nOrigin 1\n2 : 10.0 ;\n");

        let graph = load_network(dir.path(), "t", true, 1.0).unwrap();
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn demand_scale_multiplies_trips() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "t_net.tntp",
            "<END OF METADATA>\n~\t;\n1\t2\t100.0\t1.0\t1.0\t0.15\t4.0\t;\n",
        );
        write(dir.path(), "t_trips.tntp", "<END OF METADATA>\nOrigin 1\n2 : 10.0 ;\n");

        let graph = load_network(dir.path(), "t", false, 2.0).unwrap();
        assert_eq!(graph.od(rsuet_core::OdIdx(0)).demand, 20.0);
    }
}
