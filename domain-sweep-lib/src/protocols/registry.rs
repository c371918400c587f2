//! WHOIS server registry.
//!
//! Maps TLDs to their authoritative WHOIS servers. Common TLDs come from a
//! built-in table; anything else is discovered through an IANA referral
//! query and remembered for the rest of the process.

use crate::error::DomainSweepError;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::whois::{parse_iana_refer_response, query_whois};

/// IANA's WHOIS server, used for referral discovery.
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

/// TLD -> WHOIS server discovered at runtime. An empty string records a
/// TLD that IANA has no server for.
struct ReferralCache {
    whois_servers: HashMap<String, String>,
}

impl ReferralCache {
    fn new() -> Self {
        Self {
            whois_servers: HashMap::new(),
        }
    }
}

lazy_static::lazy_static! {
    static ref REFERRAL_CACHE: Mutex<ReferralCache> = Mutex::new(ReferralCache::new());

    /// One async lock per TLD so concurrent lookups share a single IANA query.
    static ref DISCOVERY_LOCKS: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>> = Mutex::new(HashMap::new());
}

/// Built-in WHOIS servers for high-usage TLDs.
pub fn builtin_whois_server(tld: &str) -> Option<&'static str> {
    let server = match tld {
        "com" | "net" => "whois.verisign-grs.com",
        "org" => "whois.pir.org",
        "info" => "whois.nic.info",
        "biz" => "whois.nic.biz",
        "io" => "whois.nic.io",
        "ai" => "whois.nic.ai",
        "co" => "whois.nic.co",
        "me" => "whois.nic.me",
        "xyz" => "whois.nic.xyz",
        "app" | "dev" | "page" => "whois.nic.google",
        "tech" => "whois.nic.tech",
        "cc" => "ccwhois.verisign-grs.com",
        "tv" => "whois.nic.tv",
        "uk" => "whois.nic.uk",
        "de" => "whois.denic.de",
        "fr" => "whois.nic.fr",
        "nl" => "whois.domain-registry.nl",
        "eu" => "whois.eu",
        "us" => "whois.nic.us",
        "ca" => "whois.cira.ca",
        "au" => "whois.auda.org.au",
        "jp" => "whois.jprs.jp",
        "cn" => "whois.cnnic.cn",
        _ => return None,
    };
    Some(server)
}

/// Cache a discovered WHOIS server for a TLD.
///
/// An empty `server` records that IANA has no server for the TLD.
pub fn cache_whois_server(tld: &str, server: &str) -> Result<(), DomainSweepError> {
    let mut cache = REFERRAL_CACHE
        .lock()
        .map_err(|_| DomainSweepError::internal("Failed to acquire referral cache lock for writing"))?;

    cache
        .whois_servers
        .insert(tld.to_lowercase(), server.to_string());
    Ok(())
}

/// Look up a TLD in the referral cache.
///
/// `None` means discovery has not run yet, `Some(None)` that it ran and
/// found no server.
pub fn cached_whois_server(tld: &str) -> Option<Option<String>> {
    let cache = REFERRAL_CACHE.lock().ok()?;
    let server = cache.whois_servers.get(&tld.to_lowercase())?;
    if server.is_empty() {
        Some(None)
    } else {
        Some(Some(server.clone()))
    }
}

fn discovery_lock(tld: &str) -> Result<Arc<tokio::sync::Mutex<()>>, DomainSweepError> {
    let mut locks = DISCOVERY_LOCKS
        .lock()
        .map_err(|_| DomainSweepError::internal("Failed to acquire referral discovery lock"))?;
    Ok(locks.entry(tld.to_string()).or_default().clone())
}

/// Get the WHOIS server for a TLD.
///
/// Lookup flow:
/// 1. Built-in table
/// 2. Referral cache (positive or negative)
/// 3. IANA referral discovery, cached either way
///
/// `Ok(None)` means IANA knows no server for the TLD. A failed IANA query is
/// returned as the error and not cached, so a transient network problem
/// does not poison the TLD for the rest of the sweep.
pub async fn get_whois_server(tld: &str, timeout: Duration) -> Result<Option<String>, DomainSweepError> {
    let tld_lower = tld.to_lowercase();

    if let Some(server) = builtin_whois_server(&tld_lower) {
        return Ok(Some(server.to_string()));
    }

    discover_whois_server(&tld_lower, || query_whois(IANA_WHOIS_SERVER, &tld_lower, timeout)).await
}

/// Resolve `tld` through the cache, running `query` at most once at a time
/// per TLD.
async fn discover_whois_server<F, Fut>(tld: &str, query: F) -> Result<Option<String>, DomainSweepError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<String, DomainSweepError>>,
{
    if let Some(known) = cached_whois_server(tld) {
        return Ok(known);
    }

    let lock = discovery_lock(tld)?;
    let _guard = lock.lock().await;

    // Someone else may have finished discovery while we waited
    if let Some(known) = cached_whois_server(tld) {
        return Ok(known);
    }

    let response = query().await.map_err(|e| {
        tracing::debug!(tld = %tld, error = %e, "IANA referral query failed");
        e
    })?;

    match parse_iana_refer_response(&response) {
        Some(server) => {
            tracing::debug!(tld = %tld, server = %server, "Discovered WHOIS server");
            cache_whois_server(tld, &server)?;
            Ok(Some(server))
        }
        None => {
            cache_whois_server(tld, "")?;
            Ok(None)
        }
    }
}
