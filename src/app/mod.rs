use std::{net::SocketAddr, sync::Arc};

use derive_more::Deref;
use tokio::net::TcpListener;
use tracing::info;

use crate::{
    config::{AppConfig, ConfigError},
    store::Store,
    Result,
};

// ###################################
// ->  Structs
// ###################################
pub struct App {
    pub app_state: AppState,
    pub listener: TcpListener,
}
impl App {
    pub fn new(app_state: AppState, listener: TcpListener) -> Self {
        App {
            app_state,
            listener,
        }
    }

    /// Builds the store and binds the listener.
    /// With `require_credential` set, a missing store credential fails here instead of per request.
    pub async fn build_from_config(config: AppConfig) -> Result<Self> {
        let store_config = &config.store_config;
        if store_config.require_credential && !store_config.has_credential() {
            return Err(ConfigError::MissingCredential(store_config.backend.to_string()).into());
        }

        let store = Store::init(store_config).await?;
        let app_state = AppState::new(store);

        let addr = SocketAddr::from((config.net_config.host, config.net_config.app_port));
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        info!("{:<20} - {}", "Listening on:", addr);

        let app = App::new(app_state, listener);
        Ok(app)
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }
}

pub struct InternalState {
    pub store: Store,
}

/// Application state containing all global data.
/// It implements `Deref` to easily access the fields on `InternalState`
/// Uses an `Arc` so it can be cloned around.
#[derive(Clone, Deref)]
pub struct AppState(Arc<InternalState>);

impl AppState {
    pub fn new(store: Store) -> Self {
        AppState(Arc::new(InternalState { store }))
    }
}
