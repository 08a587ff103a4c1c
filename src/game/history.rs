//! Recent and paginated game history

use crate::{
    Result,
    config::Settings,
    transport::{HttpRequest, Transport},
    types::{
        GameKind, HistoryPage, HistoryRecord,
        history::{normalize, page_records},
    },
};
use serde_json::Value;
use std::sync::Arc;

/// Reads finished rounds from the public history endpoints
#[derive(Debug, Clone)]
pub struct HistoryClient {
    settings: Arc<Settings>,
    transport: Arc<dyn Transport>,
}

impl HistoryClient {
    pub fn new(settings: Arc<Settings>, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    /// Latest finished rounds, normalized.
    ///
    /// `Ok(None)` when the site could not be reached or refused the request.
    pub async fn recent(&self, kind: GameKind) -> Result<Option<HistoryPage>> {
        let url = format!(
            "{}/api/{}_games/recent",
            self.settings.site_base(),
            kind.path_segment()
        );
        let request = HttpRequest::get(url).with_referer(self.settings.referer(kind.referer_page()));

        let response = match self.transport.send(request).await {
            Ok(response) if response.is_truthy() => response,
            Ok(response) => {
                tracing::debug!("Recent {} history answered {}", kind, response.status);
                return Ok(None);
            }
            Err(e) => {
                tracing::debug!("Recent {} history unavailable: {}", kind, e);
                return Ok(None);
            }
        };

        let games: Vec<Value> = response.json()?;
        Ok(Some(HistoryPage {
            items: normalize(kind, &games)?,
        }))
    }

    pub async fn recent_doubles(&self) -> Result<Option<HistoryPage>> {
        self.recent(GameKind::Double).await
    }

    pub async fn recent_crashes(&self) -> Result<Option<HistoryPage>> {
        self.recent(GameKind::Crash).await
    }

    /// Raw history page, 1-based
    pub async fn history(&self, kind: GameKind, page: u32) -> Result<Value> {
        let url = format!(
            "{}/api/{}_games/history",
            self.settings.site_base(),
            kind.path_segment()
        );
        let request = HttpRequest::get(url).with_query("page", page);
        let response = self.transport.send(request).await?;
        response.json()
    }

    /// History page normalized into records, in page order
    pub async fn history_records(&self, kind: GameKind, page: u32) -> Result<Vec<HistoryRecord>> {
        let payload = self.history(kind, page).await?;
        normalize(kind, page_records(&payload)?)
    }
}
