//! In-memory stand-ins for GitHub, git and the logger, shared by the unit tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use github_client::{Error, GitHubApi};
use serde_json::Value;

use crate::git::{RepoCredentials, VersionControl, WorkingCopy};
use crate::logger::{LogLevel, LogProperties, Logger};
use crate::module_repo::Collaborators;
use crate::ModuleCreatorError;

type FailureRule = Box<dyn Fn(&str, &Value) -> Option<Error> + Send + Sync>;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub route: String,
    pub params: Value,
}

/// Records every request and answers with `{}` unless a failure rule matches.
#[derive(Default)]
pub(crate) struct MockGitHub {
    calls: Mutex<Vec<RecordedCall>>,
    rules: Vec<FailureRule>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps every request pending for `latency` before it answers.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fails every request to `route` with an API error.
    pub fn fail_route(mut self, route: &'static str, status: u16, message: &'static str) -> Self {
        self.rules.push(Box::new(move |r: &str, _: &Value| {
            (r == route).then(|| api_error(status, message, &[]))
        }));
        self
    }

    /// Fails branch protection requests for `branch`.
    pub fn fail_branch(mut self, branch: &'static str, status: u16, message: &'static str) -> Self {
        self.rules.push(Box::new(move |r: &str, params: &Value| {
            (r.contains("/protection") && params["branch"] == branch)
                .then(|| api_error(status, message, &[]))
        }));
        self
    }

    /// Fails label creation for the label called `name`.
    pub fn fail_label(mut self, name: &'static str, status: u16, message: &'static str) -> Self {
        self.rules.push(Box::new(move |r: &str, params: &Value| {
            (r.ends_with("/labels") && params["name"] == name)
                .then(|| api_error(status, message, &[]))
        }));
        self
    }

    /// Makes repository generation report that the repository already exists.
    pub fn repo_already_exists(mut self) -> Self {
        self.rules.push(Box::new(|r: &str, _: &Value| {
            r.ends_with("/generate").then(|| {
                api_error(
                    422,
                    "Repository creation failed.",
                    &["name already exists on this account"],
                )
            })
        }));
        self
    }

    /// Highest number of requests that were pending at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Parameters of every call made to `route`, in call order.
    pub fn params_for(&self, route: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|call| call.route == route)
            .map(|call| call.params)
            .collect()
    }
}

#[async_trait]
impl GitHubApi for MockGitHub {
    async fn request(&self, route: &str, params: &Value) -> Result<Value, Error> {
        self.calls.lock().unwrap().push(RecordedCall {
            route: route.to_string(),
            params: params.clone(),
        });
        let pending = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(pending, Ordering::SeqCst);
        // Let the other futures of a batch interleave like real requests would.
        match self.latency {
            Some(latency) => tokio::time::sleep(latency).await,
            None => tokio::task::yield_now().await,
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.rules.iter().find_map(|rule| rule(route, params)) {
            Some(error) => Err(error),
            None => Ok(serde_json::json!({})),
        }
    }
}

pub(crate) fn api_error(status: u16, message: &str, errors: &[&str]) -> Error {
    Error::ApiError {
        status,
        message: message.to_string(),
        errors: errors.iter().map(|e| e.to_string()).collect(),
    }
}

#[derive(Default)]
pub(crate) struct RecordingLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: LogLevel, message: &str, _properties: LogProperties<'_>) {
        self.entries
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

/// What the fake git implementation observed.
#[derive(Debug, Default)]
pub(crate) struct GitState {
    /// Operations in call order, e.g. `clone <url>`, `commit <message>`.
    pub operations: Vec<String>,
    /// Descriptor contents at the time of the commit.
    pub committed_descriptor: Option<String>,
    /// Directory the repository was cloned into.
    pub clone_path: Option<PathBuf>,
}

/// Materializes a working tree holding `descriptor` as `module.yaml` instead of cloning.
#[derive(Clone, Default)]
pub(crate) struct FakeVersionControl {
    pub descriptor: Option<String>,
    pub fail_push: bool,
    pub state: Arc<Mutex<GitState>>,
}

impl FakeVersionControl {
    pub fn with_descriptor(descriptor: &str) -> Self {
        Self {
            descriptor: Some(descriptor.to_string()),
            ..Default::default()
        }
    }

    pub fn operations(&self) -> Vec<String> {
        self.state.lock().unwrap().operations.clone()
    }

    pub fn committed_descriptor(&self) -> Option<String> {
        self.state.lock().unwrap().committed_descriptor.clone()
    }

    pub fn clone_path(&self) -> Option<PathBuf> {
        self.state.lock().unwrap().clone_path.clone()
    }
}

impl VersionControl for FakeVersionControl {
    fn clone_repository(
        &self,
        url: &str,
        _credentials: &RepoCredentials,
        path: &Path,
    ) -> Result<Box<dyn WorkingCopy>, ModuleCreatorError> {
        fs::create_dir_all(path)?;
        if let Some(descriptor) = &self.descriptor {
            fs::write(path.join("module.yaml"), descriptor)?;
        }

        let mut state = self.state.lock().unwrap();
        state.operations.push(format!("clone {}", url));
        state.clone_path = Some(path.to_path_buf());

        Ok(Box::new(FakeWorkingCopy {
            path: path.to_path_buf(),
            fail_push: self.fail_push,
            state: self.state.clone(),
        }))
    }
}

struct FakeWorkingCopy {
    path: PathBuf,
    fail_push: bool,
    state: Arc<Mutex<GitState>>,
}

impl WorkingCopy for FakeWorkingCopy {
    fn path(&self) -> &Path {
        &self.path
    }

    fn current_branch(&self) -> Result<String, ModuleCreatorError> {
        Ok("main".to_string())
    }

    fn add_all(&self) -> Result<(), ModuleCreatorError> {
        self.state.lock().unwrap().operations.push("add_all".to_string());
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<(), ModuleCreatorError> {
        let descriptor = fs::read_to_string(self.path.join("module.yaml")).ok();
        let mut state = self.state.lock().unwrap();
        state.operations.push(format!("commit {}", message));
        state.committed_descriptor = descriptor;
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str) -> Result<(), ModuleCreatorError> {
        if self.fail_push {
            return Err(ModuleCreatorError::GitOperation(
                "remote rejected the push".to_string(),
            ));
        }
        self.state
            .lock()
            .unwrap()
            .operations
            .push(format!("push {} {}", remote, branch));
        Ok(())
    }
}

pub(crate) struct Fixture {
    pub github: Arc<MockGitHub>,
    pub git: FakeVersionControl,
    pub logger: Arc<RecordingLogger>,
}

impl Fixture {
    pub fn new(github: MockGitHub, git: FakeVersionControl) -> Self {
        Self {
            github: Arc::new(github),
            git,
            logger: Arc::new(RecordingLogger::default()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            client: self.github.clone(),
            version_control: Arc::new(self.git.clone()),
            logger: self.logger.clone(),
        }
    }
}
