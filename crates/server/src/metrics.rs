//! Prometheus counters for sign-up / sign-in outcomes.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use service::auth::AuthError;

pub struct AuthMetrics {
    registry: Registry,
    signups: IntCounterVec,
    signins: IntCounterVec,
}

impl AuthMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let signups = IntCounterVec::new(
            Opts::new("auth_signups_total", "Sign-up attempts by outcome"),
            &["outcome"],
        )?;
        let signins = IntCounterVec::new(
            Opts::new("auth_signins_total", "Sign-in attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(signups.clone()))?;
        registry.register(Box::new(signins.clone()))?;
        Ok(Self { registry, signups, signins })
    }

    pub fn record_signup<T>(&self, res: &Result<T, AuthError>) {
        self.signups.with_label_values(&[outcome(res)]).inc();
    }

    pub fn record_signin<T>(&self, res: &Result<T, AuthError>) {
        self.signins.with_label_values(&[outcome(res)]).inc();
    }

    /// Text exposition format.
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            tracing::warn!(error = %e, "metrics encode failed");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}

fn outcome<T>(res: &Result<T, AuthError>) -> &'static str {
    match res {
        Ok(_) => "success",
        Err(AuthError::DuplicateUsername) => "duplicate",
        Err(AuthError::InvalidCredentials) => "invalid_credentials",
        Err(AuthError::Validation(_)) => "rejected",
        Err(_) => "error",
    }
}
