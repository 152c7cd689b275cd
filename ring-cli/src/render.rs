//! Report rendering.

use ring_types::{Direction, NodeId, NodeReport, Outcome};
use std::io::{self, Write};

const SEPARATOR: &str = "-------------------------";

/// Write the human-readable report, one block per node.
pub fn render_text<W: Write>(
    out: &mut W,
    reports: &[NodeReport],
    root: &NodeId,
    domain: &str,
) -> io::Result<()> {
    let root_host = root.fqdn(domain);
    writeln!(out)?;
    for report in reports {
        let host = report.node.fqdn(domain);
        writeln!(out, "{}", SEPARATOR)?;
        writeln!(out, "Node: {}", host)?;
        writeln!(out)?;

        writeln!(out, "MTR inbound : from {} to {} :", host, root_host)?;
        writeln!(out)?;
        render_outcome(out, Direction::Inbound, &report.inbound)?;

        writeln!(out, "MTR outbound : from {} to {} :", root_host, host)?;
        writeln!(out)?;
        render_outcome(out, Direction::Outbound, &report.outbound)?;
    }
    Ok(())
}

fn render_outcome<W: Write>(out: &mut W, direction: Direction, outcome: &Outcome) -> io::Result<()> {
    match &outcome.error {
        Some(error) => {
            let heading = match direction {
                Direction::Inbound => "Encountered an error for inbound MTR:",
                Direction::Outbound => "Encountered an error for outbound MTR :",
            };
            writeln!(out, "    {}", heading)?;
            writeln!(out, "    {}", error)?;
        }
        None => {
            for line in &outcome.stdout {
                writeln!(out, "   {}", line)?;
            }
        }
    }
    if let Some(code) = outcome.failed_exit_code() {
        writeln!(out)?;
        writeln!(out, "----")?;
        writeln!(out, "    Exit code was: {}", code)?;
        writeln!(out, "    StdErr:")?;
        for line in &outcome.stderr {
            writeln!(out, "   {}", line)?;
        }
        writeln!(out, "----")?;
    }
    writeln!(out)
}

/// Write the reports as pretty-printed JSON.
pub fn render_json<W: Write>(out: &mut W, reports: &[NodeReport]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, reports)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ring_exec::RawOutput;

    const DOMAIN: &str = "ring.nlnog.net";

    fn ok(host: &str, lines: &[&str]) -> Outcome {
        Outcome::completed(
            host,
            lines.iter().map(|l| l.to_string()).collect(),
            vec![],
            0,
        )
    }

    fn text(reports: &[NodeReport]) -> String {
        let mut buf = Vec::new();
        render_text(&mut buf, reports, &NodeId::new("root01"), DOMAIN).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn successful_node_block() {
        let report = NodeReport {
            node: NodeId::new("a01"),
            inbound: ok("a01.ring.nlnog.net", &["HOST: a01", "  1.|-- gw"]),
            outbound: ok("root01.ring.nlnog.net", &["HOST: root01"]),
        };

        let expected = [
            "",
            "-------------------------",
            "Node: a01.ring.nlnog.net",
            "",
            "MTR inbound : from a01.ring.nlnog.net to root01.ring.nlnog.net :",
            "",
            "   HOST: a01",
            "     1.|-- gw",
            "",
            "MTR outbound : from root01.ring.nlnog.net to a01.ring.nlnog.net :",
            "",
            "   HOST: root01",
            "",
            "",
        ]
        .join("\n");
        assert_eq!(text(&[report]), expected);
    }

    #[test]
    fn transport_error_is_reported() {
        let report = NodeReport {
            node: NodeId::new("b01"),
            inbound: Outcome::failed("b01.ring.nlnog.net", "connection refused"),
            outbound: ok("root01.ring.nlnog.net", &[]),
        };
        let out = text(&[report]);
        assert!(out.contains("    Encountered an error for inbound MTR:\n    connection refused\n"));
        assert!(!out.contains("Exit code was"));
    }

    #[test]
    fn outbound_error_heading_keeps_its_classic_spacing() {
        let report = NodeReport {
            node: NodeId::new("b01"),
            inbound: ok("b01.ring.nlnog.net", &[]),
            outbound: Outcome::failed("root01.ring.nlnog.net", "connection refused"),
        };
        let out = text(&[report]);
        assert!(out.contains("    Encountered an error for outbound MTR :\n    connection refused\n"));
    }

    #[test]
    fn killed_command_renders_error_without_partial_output() {
        let killed = RawOutput {
            stdout: "HOST: d01\n  1.|-- partial\n".to_string(),
            stderr: String::new(),
            exit_code: None,
        };
        let report = NodeReport {
            node: NodeId::new("d01"),
            inbound: killed.into_outcome("d01.ring.nlnog.net"),
            outbound: ok("root01.ring.nlnog.net", &[]),
        };
        let out = text(&[report]);
        assert!(out.contains(
            "    Encountered an error for inbound MTR:\n    remote command terminated without an exit status\n\n"
        ));
        assert!(!out.contains("partial"));
        assert!(!out.contains("HOST: d01"));
    }

    #[test]
    fn error_suppresses_stdout_lines() {
        let mut failed = Outcome::failed("e01.ring.nlnog.net", "timed out");
        failed.stdout = vec!["stale".to_string()];
        let report = NodeReport {
            node: NodeId::new("e01"),
            inbound: failed,
            outbound: ok("root01.ring.nlnog.net", &[]),
        };
        assert!(!text(&[report]).contains("stale"));
    }

    #[test]
    fn nonzero_exit_shows_stderr_block() {
        let report = NodeReport {
            node: NodeId::new("c01"),
            inbound: ok("c01.ring.nlnog.net", &[]),
            outbound: Outcome::completed(
                "root01.ring.nlnog.net",
                vec!["HOST: root01".to_string()],
                vec!["mtr: Failure to start".to_string()],
                1,
            ),
        };
        let out = text(&[report]);
        assert!(out.contains(
            "   HOST: root01\n\n----\n    Exit code was: 1\n    StdErr:\n   mtr: Failure to start\n----\n"
        ));
    }

    #[test]
    fn nodes_are_rendered_in_report_order() {
        let reports: Vec<NodeReport> = ["z01", "a01"]
            .iter()
            .map(|n| NodeReport {
                node: NodeId::new(*n),
                inbound: ok("x", &[]),
                outbound: ok("y", &[]),
            })
            .collect();
        let out = text(&reports);
        let z = out.find("Node: z01").unwrap();
        let a = out.find("Node: a01").unwrap();
        assert!(z < a);
    }

    #[test]
    fn empty_report_is_a_blank_line() {
        assert_eq!(text(&[]), "\n");
    }

    #[test]
    fn json_is_an_array_of_reports() {
        let report = NodeReport {
            node: NodeId::new("a01"),
            inbound: ok("a01.ring.nlnog.net", &["HOST: a01"]),
            outbound: Outcome::failed("root01.ring.nlnog.net", "timed out"),
        };
        let mut buf = Vec::new();
        render_json(&mut buf, &[report]).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["node"], "a01");
        assert_eq!(value[0]["inbound"]["stdout"][0], "HOST: a01");
        assert_eq!(value[0]["inbound"]["exit_code"], 0);
        assert_eq!(value[0]["outbound"]["error"], "timed out");
        assert!(value[0]["outbound"]["exit_code"].is_null());
    }
}
