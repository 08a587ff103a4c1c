//! Verification token acquisition
//!
//! The login endpoint sits behind a human-verification gate. Tokens are
//! obtained through an ordered chain of [`TokenSource`] tiers: a remote
//! solving service as the fast path, then an external solver program as
//! the authoritative fallback. Each tier can be substituted independently.

use crate::{
    Result,
    config::Settings,
    transport::{HttpRequest, Transport},
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

/// JSON field carrying the token in the solving service response
pub const TOKEN_FIELD: &str = "x-captcha-response";

/// One tier of the acquisition chain
#[async_trait]
pub trait TokenSource: Send + Sync + std::fmt::Debug {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// `Ok(None)` when the tier answered without a usable token
    async fn fetch_token(&self, target_url: &str, site_key: &str) -> Result<Option<String>>;
}

/// Remote solving service exposing `GET /hcaptcha/token`
#[derive(Debug)]
pub struct SolvingServiceSource {
    transport: Arc<dyn Transport>,
    service_url: String,
    timeout: Duration,
}

impl SolvingServiceSource {
    pub fn new(transport: Arc<dyn Transport>, service_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport,
            service_url: service_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl TokenSource for SolvingServiceSource {
    fn name(&self) -> &str {
        "solving-service"
    }

    async fn fetch_token(&self, _target_url: &str, _site_key: &str) -> Result<Option<String>> {
        let request = HttpRequest::get(format!("{}/hcaptcha/token", self.service_url))
            .with_timeout(self.timeout);
        let response = self.transport.send(request).await?;
        if !response.is_truthy() {
            tracing::debug!("Solving service answered {}", response.status);
            return Ok(None);
        }

        let token = response
            .json::<Value>()?
            .get(TOKEN_FIELD)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        Ok(token)
    }
}

/// External solver program, invoked as `<program> <args..> <target_url> <site_key>`.
///
/// The program may drive a browser or ask a human; it prints the token on stdout.
#[derive(Debug, Clone)]
pub struct CommandSolverSource {
    program: String,
    args: Vec<String>,
}

impl CommandSolverSource {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a `[program, args..]` list; `None` when the list is empty
    pub fn from_command_line(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

#[async_trait]
impl TokenSource for CommandSolverSource {
    fn name(&self) -> &str {
        "solver-command"
    }

    async fn fetch_token(&self, target_url: &str, site_key: &str) -> Result<Option<String>> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(target_url)
            .arg(site_key)
            .output()
            .await?;

        if !output.status.success() {
            tracing::warn!(
                "Solver command {} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!token.is_empty()).then_some(token))
    }
}

/// Token handed in up front, e.g. solved by hand in a browser
#[derive(Debug, Clone)]
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_token(&self, _target_url: &str, _site_key: &str) -> Result<Option<String>> {
        Ok(Some(self.token.clone()))
    }
}

/// Ordered fallback chain of token sources. Stateless across calls.
#[derive(Debug, Clone)]
pub struct VerificationTokenProvider {
    tiers: Vec<Arc<dyn TokenSource>>,
}

impl VerificationTokenProvider {
    /// Two-step strategy: `primary` first, `fallback` when it yields nothing
    pub fn new(primary: Arc<dyn TokenSource>, fallback: Arc<dyn TokenSource>) -> Self {
        Self {
            tiers: vec![primary, fallback],
        }
    }

    /// Chain with an arbitrary list of tiers
    pub fn with_tiers(tiers: Vec<Arc<dyn TokenSource>>) -> Self {
        Self { tiers }
    }

    /// Solving service, plus the solver command when one is configured
    pub fn from_settings(settings: &Settings, transport: Arc<dyn Transport>) -> Self {
        let mut tiers: Vec<Arc<dyn TokenSource>> = vec![Arc::new(SolvingServiceSource::new(
            transport,
            settings.verification.service_url.clone(),
            settings.verification.timeout(),
        ))];

        match CommandSolverSource::from_command_line(&settings.verification.solver_command) {
            Some(solver) => tiers.push(Arc::new(solver)),
            None => tracing::warn!(
                "No solver command configured, login has no fallback when the solving service fails"
            ),
        }

        Self { tiers }
    }

    /// Number of tiers in the chain
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Walk the chain until a tier yields a token
    pub async fn obtain_token(&self, target_url: &str, site_key: &str) -> Result<String> {
        for tier in &self.tiers {
            match tier.fetch_token(target_url, site_key).await {
                Ok(Some(token)) => {
                    tracing::info!("Verification token obtained from {}", tier.name());
                    return Ok(token);
                }
                Ok(None) => {
                    tracing::warn!("{} returned no verification token", tier.name());
                }
                Err(e) => {
                    tracing::warn!("{} failed: {}", tier.name(), e);
                }
            }
        }

        Err(crate::Error::VerificationUnavailable {
            attempts: self.tiers.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Method, testing::ScriptedTransport};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct FixedSource {
        token: Option<&'static str>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn yielding(token: &'static str) -> Arc<Self> {
            Arc::new(Self {
                token: Some(token),
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn empty() -> Arc<Self> {
            Arc::new(Self {
                token: None,
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                token: None,
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TokenSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch_token(&self, _target_url: &str, _site_key: &str) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(crate::Error::transport("timed out"));
            }
            Ok(self.token.map(str::to_string))
        }
    }

    #[tokio::test]
    async fn test_primary_short_circuits() {
        let primary = FixedSource::yielding("fast-token");
        let fallback = FixedSource::yielding("slow-token");
        let provider = VerificationTokenProvider::new(primary.clone(), fallback.clone());

        let token = provider.obtain_token("https://blaze.com/api/auth/password", "key").await;
        assert_eq!(token.unwrap(), "fast-token");
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_on_primary_error() {
        let primary = FixedSource::failing();
        let fallback = FixedSource::yielding("slow-token");
        let provider = VerificationTokenProvider::new(primary.clone(), fallback.clone());

        let token = provider.obtain_token("url", "key").await.unwrap();
        assert_eq!(token, "slow-token");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_on_missing_token() {
        let provider =
            VerificationTokenProvider::new(FixedSource::empty(), FixedSource::yielding("slow"));
        assert_eq!(provider.obtain_token("url", "key").await.unwrap(), "slow");
    }

    #[tokio::test]
    async fn test_both_tiers_exhausted() {
        let provider = VerificationTokenProvider::new(FixedSource::failing(), FixedSource::empty());
        let err = provider.obtain_token("url", "key").await.unwrap_err();
        assert!(matches!(err, crate::Error::VerificationUnavailable { attempts: 2 }));
    }

    #[tokio::test]
    async fn test_solving_service_reads_token_field() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(
            Method::Get,
            "/hcaptcha/token",
            200,
            json!({"x-captcha-response": "P1_token"}),
        );
        let source = SolvingServiceSource::new(
            transport.clone(),
            "http://solver.local:63098/",
            Duration::from_secs(15),
        );

        let token = source.fetch_token("url", "key").await.unwrap();
        assert_eq!(token.as_deref(), Some("P1_token"));

        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://solver.local:63098/hcaptcha/token");
        assert_eq!(request.timeout, Some(Duration::from_secs(15)));
    }

    #[tokio::test]
    async fn test_solving_service_without_field() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(Method::Get, "/hcaptcha/token", 200, json!({"status": "busy"}));
        let source = SolvingServiceSource::new(transport, "http://solver.local", Duration::from_secs(15));
        assert!(source.fetch_token("url", "key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_solving_service_error_status() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on(Method::Get, "/hcaptcha/token", 503, json!({}));
        let source = SolvingServiceSource::new(transport, "http://solver.local", Duration::from_secs(15));
        assert!(source.fetch_token("url", "key").await.unwrap().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_solver_receives_target_and_key() {
        let solver = CommandSolverSource::from_command_line(&[
            "sh".to_string(),
            "-c".to_string(),
            "echo \"tok-$1-$2\"".to_string(),
            "solver".to_string(),
        ])
        .unwrap();

        let token = solver.fetch_token("target", "sitekey").await.unwrap();
        assert_eq!(token.as_deref(), Some("tok-target-sitekey"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_solver_failure_yields_none() {
        let solver = CommandSolverSource::new("sh", vec!["-c".to_string(), "exit 3".to_string()]);
        assert!(solver.fetch_token("target", "key").await.unwrap().is_none());
    }

    #[test]
    fn test_from_settings_tiers() {
        let transport = Arc::new(ScriptedTransport::new());
        let mut settings = Settings::default();
        assert_eq!(
            VerificationTokenProvider::from_settings(&settings, transport.clone()).tier_count(),
            1
        );

        settings.verification.solver_command = vec!["solve-captcha".to_string()];
        assert_eq!(
            VerificationTokenProvider::from_settings(&settings, transport).tier_count(),
            2
        );
    }
}
