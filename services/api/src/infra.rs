use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use crime_forms::workflows::nsm::{Claim, ClaimId, ClaimRepository};
use crime_forms::workflows::prior_authority::{
    ApplicationId, PriorAuthorityApplication, PriorAuthorityRepository,
};
use crime_forms::workflows::steps::ports::{
    ErrorReporter, QueueError, RepositoryError, SubmissionJob, SubmissionQueue,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryClaimRepository {
    records: Arc<Mutex<HashMap<ClaimId, Claim>>>,
}

impl ClaimRepository for InMemoryClaimRepository {
    fn insert(&self, claim: Claim) -> Result<Claim, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&claim.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(claim.id.clone(), claim.clone());
        Ok(claim)
    }

    fn update(&self, claim: Claim) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&claim.id) {
            guard.insert(claim.id.clone(), claim);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &ClaimId) -> Result<Option<Claim>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<Claim>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPriorAuthorityRepository {
    records: Arc<Mutex<HashMap<ApplicationId, PriorAuthorityApplication>>>,
}

impl PriorAuthorityRepository for InMemoryPriorAuthorityRepository {
    fn insert(
        &self,
        application: PriorAuthorityApplication,
    ) -> Result<PriorAuthorityApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(application.id.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: PriorAuthorityApplication) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&application.id) {
            guard.insert(application.id.clone(), application);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<PriorAuthorityApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<PriorAuthorityApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn delete(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// Bounded hand-off to the app store worker. Never blocks a request.
#[derive(Clone)]
pub(crate) struct ChannelSubmissionQueue {
    sender: mpsc::Sender<SubmissionJob>,
}

impl ChannelSubmissionQueue {
    pub(crate) fn new(depth: usize) -> (Self, mpsc::Receiver<SubmissionJob>) {
        let (sender, receiver) = mpsc::channel(depth);
        (Self { sender }, receiver)
    }
}

impl SubmissionQueue for ChannelSubmissionQueue {
    fn enqueue(&self, job: SubmissionJob) -> Result<(), QueueError> {
        self.sender.try_send(job).map_err(|err| match err {
            TrySendError::Full(_) => QueueError::Full,
            TrySendError::Closed(_) => QueueError::Closed,
        })
    }
}

/// Drain submitted documents. There is no app store client here, so each
/// job is logged and dropped.
pub(crate) fn spawn_submission_worker(
    mut receiver: mpsc::Receiver<SubmissionJob>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(job) = receiver.recv().await {
            info!(
                application_id = %job.application_id,
                application_type = job.application_type,
                application_state = job.payload["application_state"].as_str().unwrap_or_default(),
                "submission forwarded to the app store"
            );
        }
        info!("submission queue closed");
    })
}

/// Collects jobs in memory for the demo command.
#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionQueue {
    jobs: Arc<Mutex<Vec<SubmissionJob>>>,
}

impl SubmissionQueue for InMemorySubmissionQueue {
    fn enqueue(&self, job: SubmissionJob) -> Result<(), QueueError> {
        let mut guard = self.jobs.lock().expect("queue mutex poisoned");
        guard.push(job);
        Ok(())
    }
}

impl InMemorySubmissionQueue {
    pub(crate) fn jobs(&self) -> Vec<SubmissionJob> {
        self.jobs.lock().expect("queue mutex poisoned").clone()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, context: &str, error: &(dyn std::error::Error + 'static)) {
        error!(context, error = %error, "error reported");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(id: &str) -> SubmissionJob {
        SubmissionJob {
            application_id: id.to_string(),
            application_type: "crm7",
            payload: json!({ "application_state": "submitted" }),
        }
    }

    #[tokio::test]
    async fn a_full_channel_reports_full() {
        let (queue, mut receiver) = ChannelSubmissionQueue::new(1);

        queue.enqueue(job("claim-1")).expect("first job fits");
        match queue.enqueue(job("claim-2")) {
            Err(QueueError::Full) => {}
            other => panic!("expected full queue, got {other:?}"),
        }

        let received = receiver.recv().await.expect("job received");
        assert_eq!(received.application_id, "claim-1");
    }

    #[tokio::test]
    async fn a_dropped_receiver_reports_closed() {
        let (queue, receiver) = ChannelSubmissionQueue::new(4);
        drop(receiver);

        match queue.enqueue(job("claim-3")) {
            Err(QueueError::Closed) => {}
            other => panic!("expected closed queue, got {other:?}"),
        }
    }

    #[test]
    fn updates_require_an_existing_record() {
        let repository = InMemoryPriorAuthorityRepository::default();
        let application = PriorAuthorityApplication::new(
            ApplicationId("pa-infra-1".to_string()),
            "provider@firm.test",
            chrono::Utc::now(),
        );

        match repository.update(application.clone()) {
            Err(RepositoryError::NotFound) => {}
            other => panic!("expected not found, got {other:?}"),
        }
        repository.insert(application).expect("inserted");
        repository
            .delete(&ApplicationId("pa-infra-1".to_string()))
            .expect("deleted");
        assert!(repository.all().expect("all").is_empty());
    }
}
