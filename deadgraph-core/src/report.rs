//! Output formatting - plaintext and JSON.

use serde::Serialize;

use crate::detect::DeadDeclaration;

/// Findings for one analyzed program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeadCodeReport {
    pub program: String,
    pub roots: Vec<String>,
    pub missing_roots: Vec<String>,
    pub total_nodes: usize,
    pub reachable: usize,
    pub dead: Vec<DeadDeclaration>,
}

/// Renders a report in plain text format.
pub fn render_plain(report: &DeadCodeReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}: {} nodes, {} reachable\n",
        report.program, report.total_nodes, report.reachable
    ));
    for root in &report.missing_roots {
        out.push_str(&format!("[WARN] entry point not found: {}\n", root));
    }
    if report.dead.is_empty() {
        out.push_str("No dead declarations found.\n");
    } else {
        out.push_str(&format!("DEAD DECLARATIONS ({}):\n", report.dead.len()));
        for dead in &report.dead {
            match &dead.position {
                Some(pos) => out.push_str(&format!("- {} {} ({})\n", dead.kind, dead.name, pos)),
                None => out.push_str(&format!("- {} {}\n", dead.kind, dead.name)),
            }
        }
    }
    out
}

/// Prints a report in plain text format.
pub fn print_plain(report: &DeadCodeReport) {
    print!("{}", render_plain(report));
}

/// Serializes reports to a JSON value.
pub fn reports_to_json(reports: &[DeadCodeReport]) -> serde_json::Value {
    let dead_count: usize = reports.iter().map(|r| r.dead.len()).sum();
    serde_json::json!({
        "programs": reports,
        "dead_count": dead_count,
    })
}

/// Prints reports in JSON format.
///
/// Falls back to a minimal document if serialization fails.
pub fn print_json(reports: &[DeadCodeReport]) {
    match serde_json::to_string_pretty(&reports_to_json(reports)) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            let names: Vec<&str> = reports
                .iter()
                .flat_map(|r| r.dead.iter().map(|d| d.name.as_str()))
                .collect();
            println!("{{\"dead\": {:?}}}", names);
        }
    }
}
