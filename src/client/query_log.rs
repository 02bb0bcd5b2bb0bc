//! Offline executors
//!
//! Without a network client the generator is still useful: [`QueryLog`] streams
//! the exact query sequence a run would send, one per line, so it can be replayed
//! later or diffed between runs to check determinism.

use super::{QueryExecutor, QueryResponse};
use crate::driver::RunContext;
use crate::Result;
use anyhow::Context;
use std::io::Write;

/// Writes every query to a writer as `<index>\t<query>\n`
pub struct QueryLog<W: Write + Send> {
    writer: W,
    lines: u64,
}

impl<W: Write + Send> QueryLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> QueryExecutor for QueryLog<W> {
    fn execute(
        &mut self,
        _ctx: &RunContext,
        index: &str,
        query: &str,
        _allow_redirect: bool,
    ) -> Result<QueryResponse> {
        writeln!(self.writer, "{}\t{}", index, query).context("Failed to write query log")?;
        self.lines += 1;
        Ok(QueryResponse::default())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush query log")
    }
}

/// Accepts every query and does nothing with it
///
/// Useful for measuring the generator's own overhead.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullExecutor;

impl QueryExecutor for NullExecutor {
    fn execute(
        &mut self,
        _ctx: &RunContext,
        _index: &str,
        _query: &str,
        _allow_redirect: bool,
    ) -> Result<QueryResponse> {
        Ok(QueryResponse::default())
    }
}
