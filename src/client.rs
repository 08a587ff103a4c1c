//! High-level client
//!
//! [`BlazeClient`] wires one [`SessionManager`] to the poller, history and
//! wager components so they share a transport and the session state.

use crate::{
    Result,
    config::Settings,
    game::{GamePoller, HistoryClient, WagerClient},
    session::{SessionManager, VerificationTokenProvider},
    transport::{ReqwestTransport, Transport},
};
use std::sync::Arc;

/// Session, polling, history and wagers for one account
#[derive(Debug, Clone)]
pub struct BlazeClient {
    session: Arc<SessionManager>,
    poller: GamePoller,
    history: HistoryClient,
    wagers: WagerClient,
}

impl BlazeClient {
    /// Build a client talking to the site over reqwest
    pub fn new(settings: Settings) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::from_settings(&settings)?);
        let verifier = VerificationTokenProvider::from_settings(&settings, transport.clone());
        Ok(Self::with_session(SessionManager::with_transport(
            settings, transport, verifier,
        )))
    }

    /// Build the remaining components around an existing session manager
    pub fn with_session(session: SessionManager) -> Self {
        let session = Arc::new(session);
        let settings = Arc::new(session.settings().clone());
        let transport = session.transport();

        Self {
            poller: GamePoller::new(settings.clone(), transport.clone()).with_session(session.clone()),
            history: HistoryClient::new(settings, transport),
            wagers: WagerClient::new(session.clone()),
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn poller(&self) -> &GamePoller {
        &self.poller
    }

    pub fn history(&self) -> &HistoryClient {
        &self.history
    }

    pub fn wagers(&self) -> &WagerClient {
        &self.wagers
    }
}
