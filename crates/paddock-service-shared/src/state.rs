//! Application state shared by the axum handlers.
//!
//! The state owns the session provider and the replay interval policy.
//! Provider calls block on I/O, so handlers go through
//! [`AppState::with_provider`], which runs them on tokio's blocking pool and
//! maps failures into [`ApiError`].

use std::path::Path;
use std::sync::Arc;

use paddock_lib::{DiskProvider, Error as LibError, IntervalPolicy, SessionProvider};

use crate::error::{from_lib_error, ApiError};
use crate::metrics::record_provider_failure;

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// The session data directory does not exist.
    DataDirNotFound(String),

    /// The provider could not be opened.
    Provider(LibError),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataDirNotFound(path) => write!(f, "session data directory not found: {}", path),
            Self::Provider(e) => write!(f, "failed to open session provider: {}", e),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Provider(e) => Some(e),
            Self::DataDirNotFound(_) => None,
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        match err {
            LibError::DataDirNotFound { path } => Self::DataDirNotFound(path.display().to_string()),
            other => Self::Provider(other),
        }
    }
}

/// Shared application state. Cheap to clone.
///
/// ```ignore
/// use axum::{extract::State, routing::get, Router};
/// use paddock_service_shared::AppState;
///
/// async fn seasons(State(state): State<AppState>) {
///     let seasons = state.with_provider(|p| p.available_seasons()).await;
/// }
///
/// let state = AppState::load("/var/lib/paddock/sessions")?;
/// let app = Router::new().route("/seasons", get(seasons)).with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    provider: Arc<dyn SessionProvider>,
    interval_policy: IntervalPolicy,
}

impl AppState {
    /// Open a [`DiskProvider`] rooted at `data_dir`.
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self, AppStateError> {
        let data_dir = data_dir.as_ref();
        tracing::info!(path = %data_dir.display(), "opening session data directory");

        let provider = DiskProvider::open(data_dir)?;
        let seasons = provider.available_seasons()?;
        if seasons.is_empty() {
            tracing::warn!(path = %data_dir.display(), "no seasons found in data directory");
        } else {
            tracing::info!(?seasons, "session provider ready");
        }

        Ok(Self::from_provider(provider))
    }

    /// Wrap an already constructed provider.
    pub fn from_provider(provider: impl SessionProvider + 'static) -> Self {
        Self::from_parts(Arc::new(provider), IntervalPolicy::default())
    }

    pub fn from_parts(provider: Arc<dyn SessionProvider>, interval_policy: IntervalPolicy) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                provider,
                interval_policy,
            }),
        }
    }

    /// Same provider, different interval policy.
    pub fn with_interval_policy(self, interval_policy: IntervalPolicy) -> Self {
        Self::from_parts(Arc::clone(&self.inner.provider), interval_policy)
    }

    pub fn provider(&self) -> &dyn SessionProvider {
        self.inner.provider.as_ref()
    }

    pub fn interval_policy(&self) -> IntervalPolicy {
        self.inner.interval_policy
    }

    /// Run a provider call on the blocking pool.
    ///
    /// Library errors go through [`from_lib_error`] and are counted in
    /// `paddock_provider_failures_total`.
    pub async fn with_provider<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&dyn SessionProvider) -> paddock_lib::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let provider = Arc::clone(&self.inner.provider);
        match tokio::task::spawn_blocking(move || f(provider.as_ref())).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => {
                let api = from_lib_error(&error);
                record_provider_failure(&api.code);
                Err(api)
            }
            Err(join_error) => {
                tracing::error!(error = %join_error, "provider task failed");
                record_provider_failure("internal_error");
                Err(ApiError::internal())
            }
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("interval_policy", &self.inner.interval_policy)
            .finish_non_exhaustive()
    }
}
