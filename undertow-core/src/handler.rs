//! Host-facing operations.
//!
//! A host runtime hands a handler typed input and receives typed output or an
//! error; nothing here depends on any particular host mechanism.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::daemon::{AddOptions, DaemonError, RemoteClient, TorrentId, TorrentRecord};
use crate::fetch::TorrentFetcher;
use crate::status::{StatusSelector, filter_by_status};
use crate::workflow::{AddError, AddOutcome, AddRequest, AddWorkflow};

/// A host-facing operation: typed input in, typed output or error out.
#[async_trait]
pub trait Handler: Send + Sync {
    type Input: Send;
    type Output;
    type Error;

    async fn handle(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;
}

/// One source or many; many triggers batch semantics downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddSource {
    Single(String),
    Many(Vec<String>),
}

/// Input to the add operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddInput {
    pub sources: AddSource,
    #[serde(default)]
    pub download_dir: Option<String>,
    #[serde(default)]
    pub download_group: Option<String>,
    #[serde(default)]
    pub fetch_before_add: bool,
}

/// Output of the add operation.
///
/// A single-source input yields `Single` rather than a one-element batch so
/// downstream consumers can tell the two apart.
#[derive(Debug)]
pub enum AddReport {
    Single(AddOutcome),
    Batch(Vec<Result<AddOutcome, AddError>>),
}

/// Handles add requests by dispatching to the workflow engine.
pub struct AddHandler<C: RemoteClient, F: TorrentFetcher> {
    workflow: AddWorkflow<C, F>,
}

impl<C: RemoteClient, F: TorrentFetcher> AddHandler<C, F> {
    pub fn new(workflow: AddWorkflow<C, F>) -> Self {
        Self { workflow }
    }
}

#[async_trait]
impl<C: RemoteClient, F: TorrentFetcher> Handler for AddHandler<C, F> {
    type Input = AddInput;
    type Output = AddReport;
    type Error = AddError;

    /// Runs one add or a whole batch, per the input's source shape.
    ///
    /// # Errors
    /// - `AddError` - a single-source add reached its failed state; batch
    ///   failures are reported per item inside the report instead
    async fn handle(&self, input: AddInput) -> Result<AddReport, AddError> {
        let options = AddOptions {
            download_dir: input.download_dir,
            download_group: input.download_group,
        };

        match input.sources {
            AddSource::Single(source) => {
                let outcome = self
                    .workflow
                    .run(AddRequest {
                        source,
                        options,
                        fetch_before_add: input.fetch_before_add,
                    })
                    .await?;
                Ok(AddReport::Single(outcome))
            }
            AddSource::Many(sources) => {
                let requests = sources
                    .into_iter()
                    .map(|source| AddRequest {
                        source,
                        options: options.clone(),
                        fetch_before_add: input.fetch_before_add,
                    })
                    .collect();
                Ok(AddReport::Batch(self.workflow.run_batch(requests).await))
            }
        }
    }
}

/// Input to the get operation.
#[derive(Debug, Clone, Default)]
pub struct GetInput {
    /// Narrow the lookup to specific ids; `None` fetches everything
    pub ids: Option<Vec<TorrentId>>,
    /// Status filter applied to the fetched records
    pub selector: StatusSelector,
}

/// Output of the get operation.
#[derive(Debug)]
pub struct GetOutput {
    pub torrents: Vec<TorrentRecord>,
}

/// Handles get requests: fetch records, then narrow by status.
pub struct GetHandler<C: RemoteClient> {
    client: C,
}

impl<C: RemoteClient> GetHandler<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: RemoteClient> Handler for GetHandler<C> {
    type Input = GetInput;
    type Output = GetOutput;
    type Error = DaemonError;

    async fn handle(&self, input: GetInput) -> Result<GetOutput, DaemonError> {
        let records = self.client.torrents(input.ids.as_deref()).await?;
        Ok(GetOutput {
            torrents: filter_by_status(records, input.selector),
        })
    }
}
