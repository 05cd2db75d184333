//! Batch fan-out over independent add runs

use futures::future;

use super::AddError;
use super::add::{AddOutcome, AddRequest, AddWorkflow};
use crate::daemon::RemoteClient;
use crate::fetch::TorrentFetcher;

impl<C: RemoteClient, F: TorrentFetcher> AddWorkflow<C, F> {
    /// Runs every request concurrently and joins the outcomes in input order.
    ///
    /// Items are independent: one failure never aborts siblings, every run
    /// reaches a terminal state before the batch completes, and the joined
    /// output is index-aligned with the input regardless of completion order.
    pub async fn run_batch(
        &self,
        requests: Vec<AddRequest>,
    ) -> Vec<Result<AddOutcome, AddError>> {
        tracing::debug!("Running add batch of {} items", requests.len());
        future::join_all(requests.into_iter().map(|request| self.run(request))).await
    }
}
