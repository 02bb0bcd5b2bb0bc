//! Mock executor and provisioner for testing
//!
//! These doubles record every call instead of talking to a service, which keeps
//! driver tests fast and deterministic.
//!
//! # Features
//!
//! - Records every executed query (index, text, redirect flag)
//! - Fails a chosen call number, or every call
//! - Simulates service latency with a configurable delay
//! - Clones share state, so a test can keep a handle after boxing one into a driver
//!
//! # Example
//!
//! ```
//! use zipfbench::client::QueryExecutor;
//! use zipfbench::client::mock::MockExecutor;
//! use zipfbench::driver::RunContext;
//!
//! let mock = MockExecutor::new();
//! let mut executor = mock.clone();
//! let ctx = RunContext::background();
//!
//! executor.execute(&ctx, "i", "SetBit(frame='f', rowID=1, columnID=2)", true).unwrap();
//! assert_eq!(mock.call_count(), 1);
//! assert_eq!(mock.executed_queries()[0].index, "i");
//! ```

use super::{Provisioner, QueryExecutor, QueryResponse};
use crate::driver::RunContext;
use crate::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Record of an executed query for testing verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedQuery {
    pub index: String,
    pub query: String,
    pub allow_redirect: bool,
}

/// Recording query executor
#[derive(Clone)]
pub struct MockExecutor {
    /// Every call, including the ones that failed
    executed: Arc<Mutex<Vec<ExecutedQuery>>>,

    /// 1-based call number that fails
    fail_on_call: Arc<Mutex<Option<u64>>>,

    /// Whether every call fails
    should_fail: Arc<Mutex<bool>>,

    error_message: Arc<Mutex<String>>,

    /// Sleep inside every call
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockExecutor {
    /// Create a mock that succeeds every call immediately
    pub fn new() -> Self {
        Self {
            executed: Arc::new(Mutex::new(Vec::new())),
            fail_on_call: Arc::new(Mutex::new(None)),
            should_fail: Arc::new(Mutex::new(false)),
            error_message: Arc::new(Mutex::new("Mock query error".to_string())),
            delay: Arc::new(Mutex::new(None)),
        }
    }

    /// Fail the `n`th call (1-based); later calls succeed again
    pub fn set_fail_on_call(&self, n: u64) {
        *self.fail_on_call.lock().unwrap() = Some(n);
    }

    /// Fail every call
    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    pub fn set_error_message(&self, message: String) {
        *self.error_message.lock().unwrap() = message;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Number of calls made, successful or not
    pub fn call_count(&self) -> u64 {
        self.executed.lock().unwrap().len() as u64
    }

    pub fn executed_queries(&self) -> Vec<ExecutedQuery> {
        self.executed.lock().unwrap().clone()
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryExecutor for MockExecutor {
    fn execute(
        &mut self,
        _ctx: &RunContext,
        index: &str,
        query: &str,
        allow_redirect: bool,
    ) -> Result<QueryResponse> {
        let call = {
            let mut executed = self.executed.lock().unwrap();
            executed.push(ExecutedQuery {
                index: index.to_string(),
                query: query.to_string(),
                allow_redirect,
            });
            executed.len() as u64
        };

        if let Some(delay) = *self.delay.lock().unwrap() {
            std::thread::sleep(delay);
        }

        let fail = *self.should_fail.lock().unwrap() || *self.fail_on_call.lock().unwrap() == Some(call);
        if fail {
            let message = self.error_message.lock().unwrap().clone();
            anyhow::bail!("{} (call {})", message, call);
        }

        Ok(QueryResponse {
            body: "{\"results\":[true]}".to_string(),
        })
    }
}

/// Record of a provisioning call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionCall {
    pub host: String,
    pub index: String,
    pub frame: String,
}

/// Recording provisioner
#[derive(Clone, Default)]
pub struct MockProvisioner {
    calls: Arc<Mutex<Vec<ProvisionCall>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    pub fn calls(&self) -> Vec<ProvisionCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Provisioner for MockProvisioner {
    fn provision_index(&self, host: &str, index: &str, frame: &str) -> Result<()> {
        self.calls.lock().unwrap().push(ProvisionCall {
            host: host.to_string(),
            index: index.to_string(),
            frame: frame.to_string(),
        });
        if *self.should_fail.lock().unwrap() {
            anyhow::bail!("Mock provisioning error: index {} already exists", index);
        }
        Ok(())
    }
}
