//! Typed tracker API calls on top of the request multiplexer.

use super::{RequestMultiplexer, SyncError, SyncResult};
use crate::tracker::{
    domain::{
        ConnectionSettings, IssueKey, IssuePayload, IssueSearchResult, RequestDescriptor,
        TrackerUser, TransitionDescriptor, TransitionList, WorklogEntry,
    },
    ports::TrackerTransport,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Tracker API surface used by the services.
pub struct TrackerClient<T>
where
    T: TrackerTransport,
{
    multiplexer: Arc<RequestMultiplexer<T>>,
}

impl<T> Clone for TrackerClient<T>
where
    T: TrackerTransport,
{
    fn clone(&self) -> Self {
        Self {
            multiplexer: Arc::clone(&self.multiplexer),
        }
    }
}

impl<T> TrackerClient<T>
where
    T: TrackerTransport,
{
    /// Creates a client sending through `multiplexer`.
    #[must_use]
    pub const fn new(multiplexer: Arc<RequestMultiplexer<T>>) -> Self {
        Self { multiplexer }
    }

    async fn call(&self, descriptor: RequestDescriptor) -> SyncResult<Value> {
        Ok(self.multiplexer.send(descriptor).await?)
    }

    async fn call_decoded<D>(&self, descriptor: RequestDescriptor) -> SyncResult<D>
    where
        D: DeserializeOwned,
    {
        let method = descriptor.api_method();
        let payload = self.call(descriptor).await?;
        serde_json::from_value(payload).map_err(|source| SyncError::Payload { method, source })
    }

    /// Fetches an issue with its change history.
    ///
    /// # Errors
    ///
    /// Returns request failures and [`SyncError::Payload`] for malformed
    /// issues.
    pub async fn find_issue(
        &self,
        config: &ConnectionSettings,
        key: &IssueKey,
    ) -> SyncResult<IssuePayload> {
        self.call_decoded(RequestDescriptor::find_issue(config, key))
            .await
    }

    /// Lists the transitions currently available for an issue.
    ///
    /// # Errors
    ///
    /// Returns request failures and [`SyncError::Payload`] for malformed
    /// transition lists.
    pub async fn list_transitions(
        &self,
        config: &ConnectionSettings,
        key: &IssueKey,
    ) -> SyncResult<Vec<TransitionDescriptor>> {
        let list: TransitionList = self
            .call_decoded(RequestDescriptor::list_transitions(config, key))
            .await?;
        Ok(list.transitions)
    }

    /// Applies a transition.
    ///
    /// # Errors
    ///
    /// Returns request failures.
    pub async fn transition_issue(
        &self,
        config: &ConnectionSettings,
        issue_id: &str,
        transition_id: &str,
    ) -> SyncResult<()> {
        self.call(RequestDescriptor::transition_issue(
            config,
            issue_id,
            transition_id,
        ))
        .await
        .map(drop)
    }

    /// Submits a worklog.
    ///
    /// # Errors
    ///
    /// Returns request failures.
    pub async fn add_worklog(
        &self,
        config: &ConnectionSettings,
        key: &IssueKey,
        entry: &WorklogEntry,
    ) -> SyncResult<()> {
        self.call(RequestDescriptor::add_worklog(config, key, entry))
            .await
            .map(drop)
    }

    /// Updates issue fields.
    ///
    /// # Errors
    ///
    /// Returns request failures.
    pub async fn update_issue(
        &self,
        config: &ConnectionSettings,
        key: &IssueKey,
        fields: Value,
    ) -> SyncResult<()> {
        self.call(RequestDescriptor::update_issue(config, key, fields))
            .await
            .map(drop)
    }

    /// Runs an issue search.
    ///
    /// # Errors
    ///
    /// Returns request failures and [`SyncError::Payload`] for malformed
    /// results.
    pub async fn search(
        &self,
        config: &ConnectionSettings,
        query: &str,
    ) -> SyncResult<Vec<IssuePayload>> {
        let result: IssueSearchResult = self
            .call_decoded(RequestDescriptor::search(config, query))
            .await?;
        Ok(result.issues)
    }

    /// Searches users by name.
    ///
    /// # Errors
    ///
    /// Returns request failures and [`SyncError::Payload`] for malformed
    /// user lists.
    pub async fn search_users(
        &self,
        config: &ConnectionSettings,
        query: &str,
    ) -> SyncResult<Vec<TrackerUser>> {
        self.call_decoded(RequestDescriptor::search_users(config, query))
            .await
    }
}
