//! Shared stubs standing in for the external execution engine.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;
use hydra::domain::{Content, Event};
use hydra::engine::{
    AgentSpec, ArtifactStore, Engine, EngineError, MemoryStore, Runner, RunnerEventStream,
    SessionStore,
};

/// One scripted run attempt: items emitted in order, where an `Err`
/// terminates the attempt as a stream failure.
pub type Attempt = Vec<Result<Event, String>>;

/// Runner that replays scripted attempts.
pub struct ScriptedRunner {
    attempts: Mutex<VecDeque<Attempt>>,
    /// Behavior once the script is exhausted: fail every further attempt
    /// (true) or complete immediately (false).
    fail_when_exhausted: bool,
    pub calls: AtomicUsize,
    pub messages: Mutex<Vec<Option<Content>>>,
    pub cleanups: AtomicUsize,
}

impl ScriptedRunner {
    pub fn new(attempts: Vec<Attempt>) -> Self {
        Self {
            attempts: Mutex::new(attempts.into()),
            fail_when_exhausted: false,
            calls: AtomicUsize::new(0),
            messages: Mutex::new(Vec::new()),
            cleanups: AtomicUsize::new(0),
        }
    }

    /// Runner whose every attempt fails with a stream error.
    pub fn always_failing() -> Self {
        Self {
            fail_when_exhausted: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn recorded_messages(&self) -> Vec<Option<Content>> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Runner for ScriptedRunner {
    fn run_async(
        &self,
        _user_id: &str,
        _session_id: &str,
        new_message: Option<Content>,
    ) -> RunnerEventStream {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.messages.lock().unwrap().push(new_message);

        let attempt = self.attempts.lock().unwrap().pop_front();
        match attempt {
            Some(items) => Box::pin(stream::iter(
                items.into_iter().map(|r| r.map_err(EngineError::Stream)),
            )),
            None if self.fail_when_exhausted => Box::pin(stream::iter(vec![Err(
                EngineError::Stream("scripted failure".to_string()),
            )])),
            None => Box::pin(stream::empty()),
        }
    }

    async fn cleanup(&self) -> Result<(), EngineError> {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Runner that completes every attempt with a single text event.
pub struct EchoRunner {
    author: String,
    pub calls: AtomicUsize,
}

impl EchoRunner {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Runner for EchoRunner {
    fn run_async(
        &self,
        _user_id: &str,
        _session_id: &str,
        _new_message: Option<Content>,
    ) -> RunnerEventStream {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(stream::iter(vec![Ok(Event::text(&self.author, "ok"))]))
    }

    async fn cleanup(&self) -> Result<(), EngineError> {
        Ok(())
    }
}

type RunnerFactory = dyn Fn(&AgentSpec) -> Arc<dyn Runner> + Send + Sync;

/// Engine stub that counts runner builds.
pub struct StubEngine {
    pub built: AtomicUsize,
    make_runner: Box<RunnerFactory>,
}

impl StubEngine {
    /// Engine whose runners complete every attempt with one text event.
    pub fn new() -> Self {
        Self::with_runner_factory(|spec| Arc::new(EchoRunner::new(&spec.name)))
    }

    pub fn with_runner_factory<F>(make_runner: F) -> Self
    where
        F: Fn(&AgentSpec) -> Arc<dyn Runner> + Send + Sync + 'static,
    {
        Self {
            built: AtomicUsize::new(0),
            make_runner: Box::new(make_runner),
        }
    }

    pub fn build_count(&self) -> usize {
        self.built.load(Ordering::SeqCst)
    }
}

impl Engine for StubEngine {
    fn build_runner(
        &self,
        _app_name: &str,
        spec: AgentSpec,
        _sessions: Arc<dyn SessionStore>,
        _artifacts: Arc<dyn ArtifactStore>,
        _memory: Arc<dyn MemoryStore>,
    ) -> Arc<dyn Runner> {
        self.built.fetch_add(1, Ordering::SeqCst);
        (self.make_runner)(&spec)
    }
}
