use std::io::Write;

use ilpbb_search::{BnbOutcome, TerminationReason};
use serde::{Serialize, Serializer};

/// One row of the results table.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRow {
    #[serde(rename = "File")]
    pub file: String,
    #[serde(rename = "LP Relaxation", serialize_with = "finite_or_inf")]
    pub best_bound: f64,
    #[serde(rename = "Best Objective", serialize_with = "finite_or_inf")]
    pub best_objective: f64,
    #[serde(rename = "Nodes Explored")]
    pub nodes_explored: u64,
    #[serde(rename = "Gap (%)", serialize_with = "finite_or_inf")]
    pub gap_percent: f64,
    #[serde(rename = "Time Taken (seconds)")]
    pub time_taken: f64,
}

impl ResultRow {
    pub fn new(file: impl Into<String>, outcome: &BnbOutcome) -> Self {
        let (best_bound, best_objective, time_taken, gap_percent, nodes_explored) = outcome.as_tuple();
        Self {
            file: file.into(),
            best_bound,
            best_objective,
            nodes_explored,
            gap_percent,
            time_taken,
        }
    }
}

/// JSON has no infinity; write it as the string `"inf"`.
fn finite_or_inf<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_str(&format_number(*value))
    }
}

pub fn format_number(value: f64) -> String {
    if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{:.4}", value)
    }
}

pub fn table(rows: &[ResultRow]) -> String {
    let width = rows.iter().map(|r| r.file.len()).max().unwrap_or(0).max(4);
    let mut out = format!(
        "{:width$}  {:>14}  {:>14}  {:>10}  {:>10}  {:>10}\n",
        "File",
        "LP Relaxation",
        "Best Objective",
        "Nodes",
        "Gap (%)",
        "Time (s)",
        width = width
    );
    for r in rows {
        out.push_str(&format!(
            "{:width$}  {:>14}  {:>14}  {:>10}  {:>10}  {:>10.3}\n",
            r.file,
            format_number(r.best_bound),
            format_number(r.best_objective),
            r.nodes_explored,
            format_number(r.gap_percent),
            r.time_taken,
            width = width
        ));
    }
    out
}

/// Writes `rows` as a results file with a header line.
pub fn write_csv<W: Write>(writer: W, rows: &[ResultRow]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn status_label(termination: TerminationReason, has_solution: bool) -> &'static str {
    match (termination, has_solution) {
        (TerminationReason::StackExhausted, true) => "OPTIMAL",
        (TerminationReason::StackExhausted, false) => "INFEASIBLE",
        (TerminationReason::TimeLimit, true) => "FEASIBLE (time limit)",
        (TerminationReason::TimeLimit, false) => "NO SOLUTION (time limit)",
        (TerminationReason::Incomplete, true) => "FEASIBLE (relaxations timed out)",
        (TerminationReason::Incomplete, false) => "UNKNOWN (relaxations timed out)",
    }
}
