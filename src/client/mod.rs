//! Query execution and provisioning capabilities
//!
//! The driver never talks to a target service directly. It is handed a
//! [`QueryExecutor`] (one per driver, used for every iteration) and calls a
//! [`Provisioner`] once while configuring. Both are plain traits so agents in the
//! same process each get their own client and tests can substitute mocks.
//!
//! # Implementations
//!
//! - [`query_log::QueryLog`]: writes each query as a line to any writer
//! - [`query_log::NullExecutor`]: accepts and discards every query
//! - [`mock::MockExecutor`] / [`mock::MockProvisioner`]: recording test doubles
//!   with injectable failures

pub mod mock;
pub mod query_log;

use crate::driver::RunContext;
use crate::Result;

/// Response from the target service
///
/// The driver only cares whether a query succeeded; the body is kept for
/// executors and tests that want to inspect it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResponse {
    pub body: String,
}

/// Executes one query against the target service
///
/// # Thread Safety
///
/// Executors must be `Send` so a driver can be moved onto its agent thread. Each
/// driver owns its executor; executors are not shared between drivers.
///
/// # Errors
///
/// Any error is fatal to the driver's run: it stops, reports the error and does
/// not retry.
pub trait QueryExecutor: Send {
    /// Run `query` against `index`
    ///
    /// `allow_redirect` lets the service forward the query to the node that owns
    /// the data instead of rejecting it.
    fn execute(
        &mut self,
        ctx: &RunContext,
        index: &str,
        query: &str,
        allow_redirect: bool,
    ) -> Result<QueryResponse>;

    /// Called once after the last query of a run, including cancelled runs
    ///
    /// Executors that buffer output flush it here. An error fails the run.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Creates the index and frame a workload writes into
pub trait Provisioner {
    fn provision_index(&self, host: &str, index: &str, frame: &str) -> Result<()>;
}

/// Provisioner for targets that are set up out of band
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProvisioner;

impl Provisioner for NoopProvisioner {
    fn provision_index(&self, _host: &str, _index: &str, _frame: &str) -> Result<()> {
        Ok(())
    }
}
