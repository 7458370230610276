//! Serializable summaries of solved partitions.

use ps_core::NodeId;
use ps_solver::PartitionSolution;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct NodeValue {
    pub node: NodeId,
    pub index: usize,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct ResidualSummary {
    pub max_abs: f64,
    pub norm: f64,
    pub passed: bool,
}

#[derive(Debug, Serialize)]
pub struct SolveReport {
    pub name: Option<String>,
    pub reference: NodeId,
    pub nnz: usize,
    pub nodes: Vec<NodeValue>,
    pub residual: ResidualSummary,
}

impl SolveReport {
    pub fn new(name: Option<String>, solution: &PartitionSolution<f64>) -> Self {
        let nodes = solution
            .index
            .iter()
            .map(|(node, idx)| NodeValue {
                node,
                index: idx.get(),
                value: solution.x[idx.get()],
            })
            .collect();
        Self {
            name,
            reference: solution.index.reference(),
            nnz: solution.matrix.nnz(),
            nodes,
            residual: ResidualSummary {
                max_abs: solution.residual.max_abs,
                norm: solution.residual.norm,
                passed: solution.residual.passed,
            },
        }
    }

    pub fn print_text(&self) {
        if let Some(name) = &self.name {
            println!("Partition: {name}");
        }
        println!("Reference node: {}", self.reference);
        println!("Unknowns: {} ({} stored entries)", self.nodes.len(), self.nnz);
        println!("  {:>10}  {:>6}  {:>16}", "node", "index", "value");
        for n in &self.nodes {
            println!("  {:>10}  {:>6}  {:>16.9e}", n.node, n.index, n.value);
        }
        let mark = if self.residual.passed { "✓" } else { "✗" };
        println!(
            "{mark} Residual: max {:.3e}, norm {:.3e}",
            self.residual.max_abs, self.residual.norm
        );
    }
}

#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<SolveReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
