//! Operations context for dependency injection

use smrv_config::Config;
use smrv_errors::Error;
use smrv_events::EventSender;
use smrv_net::{NetClient, NetConfig, RetryPolicy};
use smrv_registry::{GraphqlRegistry, Registry};
use smrv_scanner::{FileScanner, RateLimit, RequestQueue, ScanSettings, VirusTotalTransport};
use smrv_verify::{VerifySettings, VersionCheck, VersionVerifier};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Operations context providing access to all service components
pub struct OpsCtx {
    /// Mod registry
    pub registry: Arc<dyn Registry>,
    /// Version verification pipeline
    pub verifier: Arc<dyn VersionCheck>,
    /// Event sender for progress reporting
    pub tx: EventSender,
    /// Service configuration
    pub config: Config,
    /// Drainer of the scanner request queue, when this context started one
    pub queue_task: Option<JoinHandle<()>>,
}

impl Drop for OpsCtx {
    fn drop(&mut self) {
        if let Some(task) = self.queue_task.take() {
            task.abort();
        }
    }
}

/// Builder for the operations context
///
/// Components that are not injected are built from the configuration.
pub struct OpsContextBuilder {
    registry: Option<Arc<dyn Registry>>,
    verifier: Option<Arc<dyn VersionCheck>>,
    tx: Option<EventSender>,
    config: Option<Config>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: None,
            verifier: None,
            tx: None,
            config: None,
        }
    }

    /// Set the registry
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<dyn Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the verifier
    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn VersionCheck>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the context
    ///
    /// Building the default verifier spawns the scanner queue drainer, so
    /// this must run inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the event sender is missing or an HTTP client
    /// cannot be created.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let tx = self
            .tx
            .ok_or_else(|| Error::internal("missing component: event_sender"))?;
        let config = self.config.unwrap_or_default();

        let registry = match self.registry {
            Some(registry) => registry,
            None => Arc::new(GraphqlRegistry::new(
                config.registry.graphql_url(),
                config.registry.token.clone().unwrap_or_default(),
                config.download.timeout(),
            )?),
        };

        let (verifier, queue_task) = match self.verifier {
            Some(verifier) => (verifier, None),
            None => {
                let (verifier, task) = default_verifier(&config, &tx)?;
                (verifier, Some(task))
            }
        };

        Ok(OpsCtx {
            registry,
            verifier,
            tx,
            config,
            queue_task,
        })
    }
}

impl Default for OpsContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_verifier(
    config: &Config,
    tx: &EventSender,
) -> Result<(Arc<dyn VersionCheck>, JoinHandle<()>), Error> {
    let transport = VirusTotalTransport::new(
        config.scanner.api_url.clone(),
        config.scanner.api_key.clone().unwrap_or_default(),
        config.download.timeout(),
    )?;
    let (queue, queue_task) = RequestQueue::spawn(
        Arc::new(transport),
        RateLimit::new(config.scanner.rate_limit, config.scanner.rate_window()),
        tx.clone(),
    );

    let scanner = FileScanner::new(
        queue,
        ScanSettings {
            results_dir: config.general.results_dir.clone(),
            first_poll_delay: config.scanner.first_poll_delay(),
            poll_delay: config.scanner.poll_delay(),
        },
        tx.clone(),
    );

    let client = NetClient::new(NetConfig {
        timeout: config.download.timeout(),
        ..NetConfig::default()
    })?;

    let verifier = VersionVerifier::new(
        client,
        Arc::new(scanner),
        VerifySettings {
            registry_api_url: config.registry.api_url.clone(),
            retry: RetryPolicy {
                max_attempts: config.download.max_attempts,
                delay: config.download.retry_delay(),
            },
            policy: config.candidates.policy(),
        },
        tx.clone(),
    );

    Ok((Arc::new(verifier), queue_task))
}
