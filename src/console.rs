//! Wiring for one running console: transport, token storage, session,
//! interceptor and route table, built once from a [`ConsoleConfig`].

use std::sync::Arc;

use tracing::info;

use crate::client::{ApiClient, AuthInterceptor, ReqwestTransport, Transport};
use crate::config::ConsoleConfig;
use crate::error::AppResult;
use crate::identity::{FileTokenStore, MemoryTokenStore, SessionManager, TokenStore};
use crate::routes::{GuardDecision, RouteGuard, RouteTable};

pub struct Console {
    config: ConsoleConfig,
    session: Arc<SessionManager>,
    client: ApiClient,
    routes: RouteTable,
}

impl Console {
    pub fn from_config(config: ConsoleConfig) -> AppResult<Self> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(config.api_base_url.clone(), config.request_timeout)?);
        let store: Arc<dyn TokenStore> = match &config.token_file {
            Some(path) => Arc::new(FileTokenStore::open(path)?),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Ok(Self::with_parts(config, transport, store))
    }

    /// Assemble from an explicit transport and store.
    pub fn with_parts(config: ConsoleConfig, transport: Arc<dyn Transport>, store: Arc<dyn TokenStore>) -> Self {
        let session = Arc::new(SessionManager::new(Arc::clone(&transport), store, &config));
        let interceptor = Arc::new(AuthInterceptor::new(transport, Arc::clone(&session)));
        let client = ApiClient::new(interceptor);
        info!(
            target: "nyc360::console",
            "console ready: api={}, signed_in={}",
            config.api_base_url,
            session.is_logged_in()
        );
        Self { config, session, client, routes: RouteTable::console() }
    }

    pub fn config(&self) -> &ConsoleConfig { &self.config }

    pub fn session(&self) -> &Arc<SessionManager> { &self.session }

    pub fn client(&self) -> &ApiClient { &self.client }

    pub fn routes(&self) -> &RouteTable { &self.routes }

    /// Run the route guard for `path`.
    pub fn navigate(&self, path: &str) -> GuardDecision {
        RouteGuard::new(&self.session, &self.routes).check(path)
    }
}
