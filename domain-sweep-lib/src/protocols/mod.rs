//! Protocol implementations for availability lookups.
//!
//! The sweep only depends on the [`WhoisLookup`] trait; [`WhoisClient`] is
//! the network implementation used by the CLI.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::DomainSweepError;
use crate::types::WhoisRecord;

/// WHOIS protocol implementation
pub mod whois;

/// TLD to WHOIS server mappings and referral discovery
pub mod registry;

pub use registry::{builtin_whois_server, get_whois_server};
pub use whois::{parse_iana_refer_response, parse_whois_response, query_whois, WhoisClient};

/// Something that can fetch a structured WHOIS record for a domain.
#[async_trait]
pub trait WhoisLookup: Send + Sync {
    /// Fetch and parse the registry record for `domain`.
    ///
    /// `timeout` is the budget for network operations of this call.
    async fn lookup(&self, domain: &str, timeout: Duration) -> Result<WhoisRecord, DomainSweepError>;
}
