//! Existence Prober
//!
//! Determines whether a candidate document exists without downloading it.
//!
//! Ordered fallback, first conclusive answer wins:
//! 1. HEAD. Exactly 200 is inspected; client/server errors and transport
//!    failures fall through to step 2.
//! 2. GET with a small `Range`. 200 or 206 is inspected; anything else is
//!    not found.
//!
//! Inspection accepts a missing or empty `Content-Type`, or any content type
//! mentioning "pdf". Some servers omit the header on static files.

pub mod http;

pub use http::HttpProber;

use async_trait::async_trait;
use reqwest::StatusCode;

/// Tri-state probe result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Exists,
    NotFound,
    /// Nothing conclusive (transport failure, ambiguous status).
    Inconclusive,
}

impl ProbeOutcome {
    /// Call-site policy: only a positive answer confirms. Inability to
    /// confirm is never treated as confirmation.
    pub fn confirms_existence(self) -> bool {
        matches!(self, ProbeOutcome::Exists)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeOutcome::Exists => "exists",
            ProbeOutcome::NotFound => "not_found",
            ProbeOutcome::Inconclusive => "inconclusive",
        }
    }
}

#[async_trait]
pub trait DocumentProber: Send + Sync {
    /// Never fails: transport problems surface as `Inconclusive`.
    async fn probe(&self, location: &str) -> ProbeOutcome;
}

/// Content-type acceptance rule shared by both probe steps.
pub fn accepts_content_type(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(ct) => {
            let ct = ct.trim().to_ascii_lowercase();
            ct.is_empty() || ct.contains("pdf")
        }
    }
}

fn inspect(content_type: Option<&str>) -> ProbeOutcome {
    if accepts_content_type(content_type) {
        ProbeOutcome::Exists
    } else {
        ProbeOutcome::NotFound
    }
}

/// Step 1. `Inconclusive` means "try the ranged GET".
pub fn classify_head(status: StatusCode, content_type: Option<&str>) -> ProbeOutcome {
    if status == StatusCode::OK {
        inspect(content_type)
    } else if status.is_client_error() || status.is_server_error() {
        ProbeOutcome::Inconclusive
    } else {
        ProbeOutcome::NotFound
    }
}

/// Step 2. Final answer for any HTTP response.
pub fn classify_range(status: StatusCode, content_type: Option<&str>) -> ProbeOutcome {
    if status == StatusCode::OK || status == StatusCode::PARTIAL_CONTENT {
        inspect(content_type)
    } else {
        ProbeOutcome::NotFound
    }
}
