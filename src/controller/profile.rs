use crate::backend::{
    BackendClient, ClientDirectory, ClientRecordFetcher, HttpClientDirectory,
    HttpClientRecordFetcher,
};
use crate::config::Config;
use crate::controller::state::{DirectoryState, LoadPhase, SessionState};
use crate::controller::view::ProfileView;
use crate::enrichment::{build_invoker, ContextBuilder, EnrichmentConfig, EnrichmentInvoker};
use crate::error::{AppError, Result};
use crate::models::{ClientListEntry, ClientRecord};
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Result of a selection request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The identifier was already selected; nothing was started
    Unchanged,
    /// The cycle ran to completion and settled in this phase
    Completed(LoadPhase),
    /// A newer selection took over before this cycle finished
    Superseded,
}

/// Client list with its own load generation
#[derive(Debug, Default)]
struct DirectoryCell {
    generation: u64,
    state: DirectoryState,
}

/// Orchestrates directory listing, record fetch and enrichment for the
/// selected client
///
/// Every selection runs under a fresh epoch. Outstanding calls for an older
/// epoch are dropped as soon as the epoch moves, and results are applied only
/// while their epoch is still current.
pub struct ClientProfileController {
    directory: Arc<dyn ClientDirectory>,
    fetcher: Arc<dyn ClientRecordFetcher>,
    invoker: Arc<dyn EnrichmentInvoker>,
    context_builder: ContextBuilder,
    config: EnrichmentConfig,

    session: RwLock<SessionState>,
    directory_state: RwLock<DirectoryCell>,
    /// Published under the session write lock so it never lags the state
    epoch: watch::Sender<u64>,
}

impl ClientProfileController {
    /// Create a controller from its collaborators
    pub fn new(
        directory: Arc<dyn ClientDirectory>,
        fetcher: Arc<dyn ClientRecordFetcher>,
        invoker: Arc<dyn EnrichmentInvoker>,
        config: EnrichmentConfig,
    ) -> Result<Self> {
        let context_builder = ContextBuilder::with_max_chars(config.max_context_chars)?;
        let (epoch, _) = watch::channel(0);

        Ok(Self {
            directory,
            fetcher,
            invoker,
            context_builder,
            config,
            session: RwLock::new(SessionState::default()),
            directory_state: RwLock::new(DirectoryCell::default()),
            epoch,
        })
    }

    /// Wire the HTTP collaborators and the configured invoker
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let backend = Arc::new(BackendClient::new(&config.backend)?);
        let directory = Arc::new(HttpClientDirectory::new(Arc::clone(&backend)));
        let fetcher = Arc::new(HttpClientRecordFetcher::new(backend));
        let invoker = build_invoker(&config.enrichment)?;

        Self::new(directory, fetcher, invoker, config.enrichment.clone())
    }

    /// Check if enrichment runs after a successful base fetch
    pub fn enrichment_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Snapshot of the session state
    pub fn session(&self) -> SessionState {
        self.session.read().clone()
    }

    /// Render the profile view for the current state
    pub fn view(&self) -> ProfileView {
        ProfileView::from_session(&self.session.read())
    }

    /// Snapshot of the client list lifecycle
    pub fn directory(&self) -> DirectoryState {
        self.directory_state.read().state.clone()
    }

    /// Load the list of selectable clients
    ///
    /// Failures are recorded in [`DirectoryState`] only and never touch the
    /// selected client's session.
    pub async fn load_directory(&self) -> Result<Vec<ClientListEntry>> {
        let generation = {
            let mut cell = self.directory_state.write();
            cell.generation += 1;
            cell.state = DirectoryState::Loading;
            cell.generation
        };

        let result = self.directory.list_clients().await;

        let mut cell = self.directory_state.write();
        if cell.generation != generation {
            debug!(generation, "Discarding superseded client list");
            return result;
        }

        match &result {
            Ok(entries) => {
                info!(count = entries.len(), "Client list loaded");
                cell.state = DirectoryState::Loaded(entries.clone());
            }
            Err(e) => {
                warn!(error = %e, "Client list unavailable");
                cell.state = DirectoryState::Failed(e.detail());
            }
        }

        result
    }

    /// Select a client and run its fetch and enrichment cycle
    ///
    /// Re-selecting the current identifier is a no-op.
    pub async fn select(&self, identifier: &str) -> Result<SelectOutcome> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(AppError::Validation(
                "client identifier must not be empty".to_string(),
            ));
        }

        let epoch = {
            let mut session = self.session.write();
            if session.selected_identifier.as_deref() == Some(identifier) {
                debug!(identifier = %identifier, "Client already selected");
                return Ok(SelectOutcome::Unchanged);
            }
            let epoch = session.begin(identifier.to_string());
            self.epoch.send_replace(epoch);
            epoch
        };

        info!(identifier = %identifier, epoch, "Client selected");
        self.run_cycle(identifier, epoch).await
    }

    /// Run a fresh cycle for the currently selected client
    pub async fn reload(&self) -> Result<SelectOutcome> {
        let (identifier, epoch) = {
            let mut session = self.session.write();
            let identifier = session.selected_identifier.clone().ok_or_else(|| {
                AppError::Validation("no client selected".to_string())
            })?;
            let epoch = session.begin(identifier.clone());
            self.epoch.send_replace(epoch);
            (identifier, epoch)
        };

        info!(identifier = %identifier, epoch, "Reloading client");
        self.run_cycle(&identifier, epoch).await
    }

    /// Drop the selection and cancel outstanding work
    pub fn clear(&self) {
        let mut session = self.session.write();
        let epoch = session.reset();
        self.epoch.send_replace(epoch);
        debug!(epoch, "Selection cleared");
    }

    async fn run_cycle(&self, identifier: &str, epoch: u64) -> Result<SelectOutcome> {
        let record = match self
            .until_superseded(epoch, self.fetcher.fetch_record(identifier))
            .await
        {
            None => return Ok(self.superseded(identifier, epoch, "record fetch")),
            Some(Ok(record)) => record,
            Some(Err(e)) => {
                error!(identifier = %identifier, epoch, error = %e, "Failed to load client record");
                let detail = e.detail();
                return self.settle(identifier, epoch, |session| session.base_failed(detail));
            }
        };

        if record.identifier() != identifier {
            let detail = format!(
                "received record for '{}' instead of '{}'",
                record.identifier(),
                identifier
            );
            error!(identifier = %identifier, epoch, detail = %detail, "Mismatched client record");
            return self.settle(identifier, epoch, |session| session.base_failed(detail));
        }

        let enrich = self.config.enabled;
        let applied = self.apply(epoch, |session| session.base_loaded(record.clone(), enrich))?;
        if !applied {
            return Ok(self.superseded(identifier, epoch, "record fetch"));
        }

        info!(
            identifier = %identifier,
            epoch,
            accounts = record.accounts.len(),
            "Client record loaded"
        );

        if !enrich {
            return Ok(SelectOutcome::Completed(LoadPhase::Ready));
        }

        self.enrich(identifier, epoch, &record).await
    }

    async fn enrich(
        &self,
        identifier: &str,
        epoch: u64,
        record: &ClientRecord,
    ) -> Result<SelectOutcome> {
        let context = self.context_builder.build_context(record);
        let start = Instant::now();

        debug!(
            identifier = %identifier,
            epoch,
            context_chars = context.chars().count(),
            "Invoking enrichment"
        );

        let invocation = timeout(self.enrichment_timeout(), self.invoker.invoke(&context));

        match self.until_superseded(epoch, invocation).await {
            None => Ok(self.superseded(identifier, epoch, "enrichment")),
            Some(Ok(Ok(result))) => {
                info!(
                    identifier = %identifier,
                    epoch,
                    fields = result.present_fields(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Enrichment completed"
                );
                self.settle(identifier, epoch, |session| session.enrichment_ready(result))
            }
            Some(Ok(Err(e))) => {
                warn!(identifier = %identifier, epoch, error = %e, "Enrichment failed");
                let detail = e.detail();
                self.settle(identifier, epoch, |session| session.enrichment_failed(detail))
            }
            Some(Err(_)) => {
                let detail = format!(
                    "enrichment timed out after {} seconds",
                    self.config.timeout_secs
                );
                warn!(identifier = %identifier, epoch, "Enrichment timed out");
                self.settle(identifier, epoch, |session| session.enrichment_failed(detail))
            }
        }
    }

    fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Drive `future` until it completes or the selection epoch moves on
    ///
    /// A superseded future is dropped, which cancels the underlying call.
    async fn until_superseded<F>(&self, epoch: u64, future: F) -> Option<F::Output>
    where
        F: Future,
    {
        let mut current = self.epoch.subscribe();

        tokio::select! {
            output = future => Some(output),
            _ = current.wait_for(|value| *value != epoch) => None,
        }
    }

    /// Apply a transition if `epoch` is still current
    fn apply<F>(&self, epoch: u64, transition: F) -> Result<bool>
    where
        F: FnOnce(&mut SessionState) -> Result<()>,
    {
        let mut session = self.session.write();
        if session.epoch() != epoch {
            return Ok(false);
        }
        transition(&mut session)?;
        Ok(true)
    }

    /// Apply a final transition and report the settled phase
    fn settle<F>(&self, identifier: &str, epoch: u64, transition: F) -> Result<SelectOutcome>
    where
        F: FnOnce(&mut SessionState) -> Result<()>,
    {
        let mut session = self.session.write();
        if session.epoch() != epoch {
            drop(session);
            return Ok(self.superseded(identifier, epoch, "settle"));
        }
        transition(&mut session)?;
        Ok(SelectOutcome::Completed(session.load_phase))
    }

    fn superseded(&self, identifier: &str, epoch: u64, stage: &str) -> SelectOutcome {
        debug!(
            identifier = %identifier,
            epoch,
            stage,
            "Discarding result of superseded selection"
        );
        SelectOutcome::Superseded
    }
}
