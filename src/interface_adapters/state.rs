use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::ports::{Clock, HttpTransport, Navigator, SessionStore};
use crate::frameworks::config::ClientConfig;
use crate::interface_adapters::clients::ReqwestTransport;
use crate::interface_adapters::session_store::{FileSessionStore, InMemorySessionStore};
use crate::use_cases::{AppointmentGateway, AuthInterceptor, AuthService, Dashboard, RouteGuard};

// System clock adapter used by the session use cases.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

// Wired client: one session, one authorizing transport, and the views on top.
#[derive(Clone)]
pub struct ClientState {
    pub auth: AuthService,
    // Authorizing transport for every protected call.
    pub interceptor: AuthInterceptor,
    pub guard: RouteGuard,
    pub gateway: AppointmentGateway,
    pub dashboard: Dashboard,
}

impl ClientState {
    // Auth endpoints use the raw transport; everything else goes through the
    // interceptor.
    pub fn assemble(
        config: &ClientConfig,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let auth = AuthService::new(transport.clone(), clock, store);
        let interceptor = AuthInterceptor::new(auth.clone(), transport, config.unauthorized_policy);
        let guard = RouteGuard::new(auth.clone(), navigator).with_login_route(config.login_route.clone());
        let gateway = AppointmentGateway::new(Arc::new(interceptor.clone()));
        let dashboard = Dashboard::new(gateway.clone());

        Self {
            auth,
            interceptor,
            guard,
            gateway,
            dashboard,
        }
    }

    // Production wiring: reqwest transport, system clock and the configured
    // session store.
    pub fn from_config(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self, reqwest::Error> {
        let transport = ReqwestTransport::new(config.base_url.clone(), config.request_timeout())?;
        let store: Arc<dyn SessionStore> = match &config.session_file {
            Some(path) => Arc::new(FileSessionStore::open(path.clone())),
            None => Arc::new(InMemorySessionStore::new()),
        };
        tracing::debug!(
            base_url = %config.base_url,
            persistent_session = config.session_file.is_some(),
            "client state assembled."
        );

        Ok(Self::assemble(
            config,
            Arc::new(transport),
            Arc::new(SystemClock),
            store,
            navigator,
        ))
    }
}
