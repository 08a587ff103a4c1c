//! Game round polling
//!
//! The site only exposes pull endpoints for round state, so outcomes are
//! awaited by polling. Each poll reads the latest round, which keeps
//! observed outcomes in remote chronological order; a round shorter than
//! the poll interval can still be missed entirely.

use crate::{
    Result,
    config::{PollingSettings, Settings},
    session::SessionManager,
    transport::{HttpRequest, Transport},
    types::{
        CrashOutcome, CrashRound, DoubleOutcome, GameKind, RouletteRound,
        game::round_status,
    },
};
use serde::Deserialize;
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Knobs for [`GamePoller::await_outcome`]
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Delay between iterations
    pub interval: Duration,
    /// Print a `STATUS: ...` progress line on stderr
    pub verbose: bool,
    /// Give up after this long
    pub deadline: Option<Duration>,
    /// Report a stall after this many failed iterations in a row
    pub max_consecutive_failures: Option<u32>,
    /// Cancelled once the channel holds `true`
    pub cancel: Option<watch::Receiver<bool>>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::from_settings(&PollingSettings::default())
    }
}

impl PollOptions {
    pub fn from_settings(settings: &PollingSettings) -> Self {
        Self {
            interval: settings.interval(),
            verbose: false,
            deadline: None,
            max_consecutive_failures: (settings.max_consecutive_failures > 0)
                .then_some(settings.max_consecutive_failures),
            cancel: None,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// `None` polls forever through failures
    pub fn with_max_consecutive_failures(mut self, max: Option<u32>) -> Self {
        self.max_consecutive_failures = max;
        self
    }
}

/// Reads round state for the roulette and crash streams
#[derive(Debug, Clone)]
pub struct GamePoller {
    settings: Arc<Settings>,
    transport: Arc<dyn Transport>,
    session: Option<Arc<SessionManager>>,
    options: PollOptions,
}

impl GamePoller {
    /// Unauthenticated poller over public round state
    pub fn new(settings: Arc<Settings>, transport: Arc<dyn Transport>) -> Self {
        let options = PollOptions::from_settings(&settings.polling);
        Self {
            settings,
            transport,
            session: None,
            options,
        }
    }

    /// Attach the session's bearer token to round requests when one is held
    pub fn with_session(mut self, session: Arc<SessionManager>) -> Self {
        self.session = Some(session);
        self
    }

    /// Default options used by [`GamePoller::await_double`] and [`GamePoller::await_crash`]
    pub fn options(&self) -> &PollOptions {
        &self.options
    }

    /// Single fetch of the current round; `None` on any failure or an empty round
    pub async fn fetch_current(&self, kind: GameKind) -> Option<Value> {
        let url = format!(
            "{}/api/{}_games/current",
            self.settings.site_base(),
            kind.path_segment()
        );
        let request = self.authorize(HttpRequest::get(url)).await;

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Current {} round unavailable: {}", kind, e);
                return None;
            }
        };
        if !response.is_truthy() {
            return None;
        }

        match response.json::<Value>() {
            Ok(Value::Null) => None,
            Ok(Value::Object(map)) if map.is_empty() => None,
            Ok(round) => Some(round),
            Err(e) => {
                tracing::debug!("Current {} round did not parse: {}", kind, e);
                None
            }
        }
    }

    /// Current round, or the companion server's last completed round when
    /// the site has no current one
    pub async fn fetch_result(&self, kind: GameKind) -> Result<Value> {
        if let Some(round) = self.fetch_current(kind).await {
            return Ok(round);
        }

        let url = format!("{}/api/v1/{}/result", self.settings.server.base_url(), kind);
        let response = self.transport.send(HttpRequest::get(url)).await?;
        if !response.is_truthy() {
            return Err(crate::Error::transport(format!(
                "{} result endpoint answered {}",
                kind, response.status
            )));
        }
        response.json()
    }

    /// Status of the latest round, `"unknown"` when it cannot be read
    pub async fn status(&self, kind: GameKind) -> String {
        match self.fetch_result(kind).await {
            Ok(round) => round_status(&round).to_string(),
            Err(_) => "unknown".to_string(),
        }
    }

    /// Poll until a round with a terminal outcome appears.
    ///
    /// Failed iterations are skipped. The wait ends with an error only when
    /// the options bound it: cancellation, deadline, or too many failures
    /// in a row. Cancellation and the deadline also cut short a request
    /// that is still in flight.
    pub async fn await_outcome(&self, kind: GameKind, options: &PollOptions) -> Result<Value> {
        let started = Instant::now();
        let deadline_at = options.deadline.map(|deadline| started + deadline);
        let mut cancel = options.cancel.clone();
        let mut failures: u32 = 0;

        loop {
            if is_cancelled(&cancel) {
                return Err(crate::Error::PollingCancelled {
                    game: kind.to_string(),
                });
            }

            let polled = tokio::select! {
                polled = self.poll_once(kind) => polled,
                _ = cancelled(&mut cancel) => {
                    return Err(crate::Error::PollingCancelled { game: kind.to_string() });
                }
                _ = deadline_reached(deadline_at) => {
                    return Err(crate::Error::PollingDeadline {
                        game: kind.to_string(),
                        waited: started.elapsed(),
                    });
                }
            };

            match polled {
                Ok((round, terminal)) => {
                    failures = 0;
                    if options.verbose {
                        progress(round_status(&round), terminal);
                    }
                    if terminal {
                        tracing::debug!("{} outcome after {:?}", kind, started.elapsed());
                        return Ok(round);
                    }
                }
                Err(e) => {
                    failures += 1;
                    tracing::debug!("Poll of {} failed ({} in a row): {}", kind, failures, e);
                    if let Some(max) = options.max_consecutive_failures
                        && failures >= max
                    {
                        tracing::warn!("Polling {} stalled after {} failures", kind, failures);
                        return Err(crate::Error::PollingStalled {
                            game: kind.to_string(),
                            failures,
                        });
                    }
                }
            }

            if deadline_at.is_some_and(|at| Instant::now() >= at) {
                return Err(crate::Error::PollingDeadline {
                    game: kind.to_string(),
                    waited: started.elapsed(),
                });
            }

            tokio::select! {
                _ = tokio::time::sleep(options.interval) => {}
                _ = cancelled(&mut cancel) => {
                    return Err(crate::Error::PollingCancelled { game: kind.to_string() });
                }
                _ = deadline_reached(deadline_at) => {
                    return Err(crate::Error::PollingDeadline {
                        game: kind.to_string(),
                        waited: started.elapsed(),
                    });
                }
            }
        }
    }

    /// Next roulette outcome, `{roll, color}`
    pub async fn await_double(&self) -> Result<DoubleOutcome> {
        self.await_double_with(&self.options).await
    }

    pub async fn await_double_with(&self, options: &PollOptions) -> Result<DoubleOutcome> {
        let round = RouletteRound::deserialize(self.await_outcome(GameKind::Double, options).await?)?;
        Ok(DoubleOutcome {
            roll: round.roll.ok_or_else(|| crate::Error::lookup("roll"))?,
            color: round.color.ok_or_else(|| crate::Error::lookup("color"))?,
        })
    }

    /// Next crash outcome, `{point}`
    pub async fn await_crash(&self) -> Result<CrashOutcome> {
        self.await_crash_with(&self.options).await
    }

    pub async fn await_crash_with(&self, options: &PollOptions) -> Result<CrashOutcome> {
        let round = CrashRound::deserialize(self.await_outcome(GameKind::Crash, options).await?)?;
        Ok(CrashOutcome {
            point: round
                .crash_point
                .ok_or_else(|| crate::Error::lookup("crash_point"))?,
        })
    }

    async fn poll_once(&self, kind: GameKind) -> Result<(Value, bool)> {
        let round = self.fetch_result(kind).await?;
        let terminal = kind.is_terminal(&round)?;
        Ok((round, terminal))
    }

    async fn authorize(&self, request: HttpRequest) -> HttpRequest {
        let Some(session) = &self.session else {
            return request;
        };
        match session.snapshot().await.bearer_token {
            Some(token) => request.with_bearer(&token),
            None => request,
        }
    }
}

fn is_cancelled(cancel: &Option<watch::Receiver<bool>>) -> bool {
    cancel.as_ref().is_some_and(|rx| *rx.borrow())
}

/// Resolves once the channel holds `true`; never when there is no
/// channel or its sender is gone
async fn cancelled(cancel: &mut Option<watch::Receiver<bool>>) {
    let Some(rx) = cancel.as_mut() else {
        return std::future::pending().await;
    };
    let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
    if closed {
        *cancel = None;
        std::future::pending::<()>().await;
    }
}

async fn deadline_reached(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn progress(status: &str, terminal: bool) {
    let mut stderr = std::io::stderr().lock();
    let _ = write!(stderr, "\rSTATUS: {}", status);
    if terminal {
        let _ = writeln!(stderr);
    }
    let _ = stderr.flush();
}
