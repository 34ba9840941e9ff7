//! Submission lifecycle for research requests.
//!
//! The controller is the only writer of [`SubmissionState`]. Each accepted
//! submission is tagged with a monotonically increasing sequence number and
//! only the completion carrying the latest number is applied; anything older
//! is a superseded request and gets dropped.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::ResearchService;
use crate::error::ResearchError;
use crate::models::{ResearchRequest, ResearchResult};

/// Raw form values at the moment the user hits submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionInput {
    pub query: String,
    pub api_key: String,
    pub max_iterations: u32,
    /// Live web search key, only passed on when the toggle is on.
    pub search_key: Option<String>,
}

impl SubmissionInput {
    /// Turns form values into a wire request, rejecting blank query or key.
    ///
    /// `max_iterations` is passed through untouched; the service owns that bound.
    pub fn validate(&self) -> Result<ResearchRequest, ResearchError> {
        let query = self.query.trim();
        let api_key = self.api_key.trim();
        if query.is_empty() || api_key.is_empty() {
            return Err(ResearchError::Validation);
        }

        let tavily_api_key = self
            .search_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        Ok(ResearchRequest {
            query: query.to_string(),
            max_iterations: self.max_iterations,
            api_key: api_key.to_string(),
            tavily_api_key,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Loading,
    Succeeded(Arc<ResearchResult>),
    Failed(ResearchError),
}

impl SubmissionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SubmissionState::Loading)
    }

    pub fn result(&self) -> Option<&ResearchResult> {
        match self {
            SubmissionState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        match self {
            SubmissionState::Failed(err) => Some(err.user_message()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Finished(Result<ResearchResult, ResearchError>),
    /// A newer submission (or a clear) superseded this one before it finished.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub seq: u64,
    pub outcome: Outcome,
}

/// One accepted submission, ready to be driven to completion on the runtime.
pub struct PendingRequest {
    seq: u64,
    request: ResearchRequest,
    service: Arc<dyn ResearchService>,
    cancel: CancellationToken,
}

impl PendingRequest {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &ResearchRequest {
        &self.request
    }

    /// Issues the single outbound request for this submission.
    pub async fn run(self) -> Completion {
        let PendingRequest {
            seq,
            request,
            service,
            cancel,
        } = self;

        // Cancellation wins when both sides are ready.
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Outcome::Cancelled,
            result = service.research(request) => Outcome::Finished(result),
        };

        Completion { seq, outcome }
    }
}

pub struct RequestController {
    service: Arc<dyn ResearchService>,
    state: SubmissionState,
    latest_seq: u64,
    in_flight: Option<CancellationToken>,
}

impl RequestController {
    pub fn new(service: Arc<dyn ResearchService>) -> Self {
        Self::with_start_seq(service, 0)
    }

    /// Continues numbering after `start_seq`, so completions tagged by an
    /// earlier controller can never match a submission made on this one.
    pub fn with_start_seq(service: Arc<dyn ResearchService>, start_seq: u64) -> Self {
        RequestController {
            service,
            state: SubmissionState::Idle,
            latest_seq: start_seq,
            in_flight: None,
        }
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Validates and, when valid, moves to `Loading` and hands back the
    /// request to run. Invalid input fails synchronously with no I/O.
    ///
    /// Any earlier request still in flight is superseded either way.
    pub fn submit(&mut self, input: SubmissionInput) -> Option<PendingRequest> {
        self.supersede();

        let request = match input.validate() {
            Ok(request) => request,
            Err(err) => {
                debug!("submission rejected: {}", err);
                self.state = SubmissionState::Failed(err);
                return None;
            }
        };

        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());
        self.state = SubmissionState::Loading;

        info!(
            seq = self.latest_seq,
            max_iterations = request.max_iterations,
            "dispatching research request"
        );

        Some(PendingRequest {
            seq: self.latest_seq,
            request,
            service: self.service.clone(),
            cancel,
        })
    }

    /// Applies a completion if it belongs to the latest submission.
    ///
    /// Returns whether the state changed.
    pub fn resolve(&mut self, completion: Completion) -> bool {
        if completion.seq != self.latest_seq {
            debug!(
                seq = completion.seq,
                latest = self.latest_seq,
                "discarding stale research response"
            );
            return false;
        }

        let result = match completion.outcome {
            Outcome::Finished(result) => result,
            Outcome::Cancelled => return false,
        };

        self.in_flight = None;
        self.state = match result {
            Ok(result) => {
                info!(
                    seq = completion.seq,
                    confidence = result.confidence,
                    references = result.references.len(),
                    "research finished"
                );
                SubmissionState::Succeeded(Arc::new(result))
            }
            Err(err) => {
                warn!(seq = completion.seq, "research failed: {}", err);
                SubmissionState::Failed(err)
            }
        };
        true
    }

    /// Drops any result or error and returns to `Idle`, superseding a
    /// request that is still running.
    pub fn clear(&mut self) {
        self.supersede();
        self.state = SubmissionState::Idle;
    }

    fn supersede(&mut self) {
        self.latest_seq += 1;
        if let Some(token) = self.in_flight.take() {
            debug!(latest = self.latest_seq, "superseding in-flight request");
            token.cancel();
        }
    }
}
