//! Error type for the partsolve binary.

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Project error: {0}")]
    Project(#[from] ps_project::ProjectError),

    #[error("Solver error: {0}")]
    Solver(#[from] ps_solver::SolverError),

    #[error("Assembly error: {0}")]
    Assembly(#[from] ps_assembly::AssemblyError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),

    #[error("{failed} of {total} partitions failed")]
    BatchFailed { failed: usize, total: usize },
}
