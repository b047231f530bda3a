//! A local fake model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use concierge_model::{
    ErrorKind, ModelProvider, ModelProviderError, ModelReply, ModelRequest,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Script {
    steps: VecDeque<PresetStep>,
    requests: Vec<ModelRequest>,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how
/// the model should respond to each request, in order. Every request
/// consumes one step, no matter whether it's a tool-call round or a
/// final reply. If the script runs out of steps, an error is returned.
///
/// Cloned providers share the same script, so a test can keep a clone
/// around to inspect the requests after handing the provider over.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Arc<Mutex<Script>>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    /// Appends a reply step.
    #[inline]
    pub fn add_reply_step(&mut self, preset: PresetReply) {
        self.push_step(PresetStep::Reply(preset));
    }

    /// Appends a failure step.
    #[inline]
    pub fn add_failure_step(&mut self, failure: PresetFailure) {
        self.push_step(PresetStep::Failure(failure));
    }

    /// Appends an arbitrary step.
    pub fn push_step(&mut self, step: PresetStep) {
        self.lock().steps.push_back(step);
    }

    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    /// Returns all requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.lock().requests.clone()
    }

    /// Returns the number of steps not consumed yet.
    pub fn remaining_steps(&self) -> usize {
        self.lock().steps.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // A panicking test thread may poison the lock, the script itself
        // is still consistent.
        self.script.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl Debug for TestModelProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestModelProvider")
            .field("remaining_steps", &self.remaining_steps())
            .field("delay", &self.delay)
            .finish()
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelReply, Self::Error>> + Send + 'static
    {
        let step = {
            let mut script = self.lock();
            script.requests.push(req.clone());
            script.steps.pop_front()
        };
        let delay = self.delay.unwrap_or(Duration::from_millis(1));

        async move {
            sleep(delay).await;
            match step {
                Some(PresetStep::Reply(reply)) => Ok(reply.to_reply()),
                Some(PresetStep::Failure(failure)) => Err(Error {
                    kind: failure.error_kind(),
                    message: failure.message,
                }),
                None => Err(Error {
                    message: "no enough steps".to_owned(),
                    kind: ErrorKind::Other,
                }),
            }
        }
    }
}
