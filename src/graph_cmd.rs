//! Graph command: print the state transition table.

use std::io::{self, Write};

use anyhow::{Context, Result};

use ergosim_chain::{StateGraph, StateKind, Transition};

use crate::cli::GraphArgs;
use crate::convert;

/// Build the state graph and print one row per state.
pub fn run(args: GraphArgs) -> Result<()> {
    let config = convert::load_config(args.queue.config.as_deref())?;
    let queue = convert::build_queue_config(&config.queue, &args.queue)?;
    let graph = StateGraph::build(&queue).context("failed to build chain")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_table(&mut out, &graph.transitions())?;
    out.flush()?;
    Ok(())
}

fn kind_label(kind: StateKind) -> &'static str {
    match kind {
        StateKind::Empty => "empty",
        StateKind::Ordinary => "ordinary",
        StateKind::Full => "full",
        StateKind::Buffering => "buffering",
        StateKind::ServiceInit => "service-init",
    }
}

fn write_table(out: &mut impl Write, transitions: &[Transition]) -> io::Result<()> {
    writeln!(out, "State\tType\tP(up)\tArrival\tService")?;
    for t in transitions {
        let service = t
            .next_on_service
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        writeln!(
            out,
            "{}\t{}\t{:.3}\t{}\t{}",
            t.index,
            kind_label(t.kind),
            t.up_probability,
            t.next_on_arrival,
            service
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ergosim_chain::QueueConfig;

    #[test]
    fn table_rows() {
        let queue = QueueConfig::new(2)
            .with_threshold(2)
            .with_arrival_rate(1.0)
            .with_service_rate(3.0);
        let graph = StateGraph::build(&queue).unwrap();
        let mut buf = Vec::new();
        write_table(&mut buf, &graph.transitions()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "State\tType\tP(up)\tArrival\tService",
                "0\tempty\t1.000\t3\t-",
                "1\tordinary\t0.250\t2\t0",
                "2\tfull\t0.250\t2\t1",
                "3\tservice-init\t1.000\t2\t-",
            ]
        );
    }
}
