//! WHOIS protocol implementation.
//!
//! Queries go straight to the registry over TCP port 43 (no external
//! `whois` binary required) and the free-text answer is reduced to a
//! [`WhoisRecord`]. A record without a domain name means the registry has
//! nothing on file for the query.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::registry::get_whois_server;
use super::WhoisLookup;
use crate::error::DomainSweepError;
use crate::types::WhoisRecord;
use crate::utils::extract_tld;

/// Standard WHOIS port.
pub const WHOIS_PORT: u16 = 43;

/// Responses larger than this are cut off; real records are a few KiB.
const MAX_RESPONSE_BYTES: u64 = 256 * 1024;

/// WHOIS client talking directly to registry servers.
#[derive(Debug, Clone, Default)]
pub struct WhoisClient;

impl WhoisClient {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WhoisLookup for WhoisClient {
    async fn lookup(&self, domain: &str, timeout: Duration) -> Result<WhoisRecord, DomainSweepError> {
        let start_time = Instant::now();

        let tld = extract_tld(domain)
            .ok_or_else(|| DomainSweepError::whois(domain, "domain has no TLD"))?;

        let server = get_whois_server(&tld, timeout)
            .await?
            .ok_or_else(|| DomainSweepError::whois(domain, format!("no WHOIS server known for .{}", tld)))?;

        let raw = query_whois(&server, domain, timeout).await?;
        let record = parse_whois_response(domain, &server, &raw)?;

        tracing::debug!(
            domain = %domain,
            server = %server,
            registered = record.is_registered(),
            duration_ms = %start_time.elapsed().as_millis(),
            "WHOIS lookup completed"
        );

        Ok(record)
    }
}

/// Send one query to `server` and read the full answer.
///
/// `timeout` bounds each of connect, write and read separately.
pub async fn query_whois(server: &str, query: &str, timeout: Duration) -> Result<String, DomainSweepError> {
    let addr = format!("{}:{}", server, WHOIS_PORT);

    let mut stream = tokio::time::timeout(timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| DomainSweepError::timeout(format!("WHOIS connect to {}", addr), timeout))?
        .map_err(|e| DomainSweepError::network_with_source(format!("WHOIS connect to {} failed", addr), e.to_string()))?;

    tokio::time::timeout(timeout, stream.write_all(format!("{}\r\n", query).as_bytes()))
        .await
        .map_err(|_| DomainSweepError::timeout(format!("WHOIS write to {}", addr), timeout))?
        .map_err(|e| DomainSweepError::network_with_source(format!("WHOIS write to {} failed", addr), e.to_string()))?;

    let mut buf = Vec::new();
    tokio::time::timeout(timeout, (&mut stream).take(MAX_RESPONSE_BYTES).read_to_end(&mut buf))
        .await
        .map_err(|_| DomainSweepError::timeout(format!("WHOIS read from {}", addr), timeout))?
        .map_err(|e| DomainSweepError::network_with_source(format!("WHOIS read from {} failed", addr), e.to_string()))?;

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

const DOMAIN_KEYS: &[&str] = &["domain name", "domain"];
const REGISTRAR_KEYS: &[&str] = &["registrar", "sponsoring registrar", "registrar name"];
const CREATION_KEYS: &[&str] = &["creation date", "created", "created on", "registered on", "registration time"];
const EXPIRATION_KEYS: &[&str] = &[
    "registry expiry date",
    "registrar registration expiration date",
    "expiration date",
    "expiry date",
    "expires",
    "expires on",
    "paid-till",
];
const STATUS_KEYS: &[&str] = &["domain status", "status"];
const NAME_SERVER_KEYS: &[&str] = &["name server", "nameserver", "nserver", "name servers"];

/// Registry phrases for "nothing on file".
const NOT_FOUND_PATTERNS: &[&str] = &[
    "no match",
    "not found",
    "no data found",
    "no entries found",
    "domain not found",
    "status: available",
    "status: free",
    "not registered",
    "no matching record",
    "no object found",
    "object does not exist",
    "no matching entry",
    "this domain name has not been registered",
];

const INVALID_TLD_PATTERNS: &[&str] = &[
    "no whois server is known",
    "invalid tld",
    "unknown tld",
    "tld not found",
    "no such tld",
];

const RATE_LIMIT_PATTERNS: &[&str] = &[
    "rate limit exceeded",
    "too many requests",
    "query rate",
    "quota exceeded",
    "limit exceeded",
    "throttled",
    "try again later",
    "rate-limited",
];

/// Turn a raw WHOIS answer into a record.
///
/// An answer with a domain-name field is a registration, unless the
/// registry marks it free. An answer without one counts as "nothing on
/// file" only when it also carries a recognised not-found phrase; anything
/// else is a parse error, so an unfamiliar response never reads as an
/// available domain.
pub fn parse_whois_response(domain: &str, server: &str, raw: &str) -> Result<WhoisRecord, DomainSweepError> {
    if raw.trim().is_empty() {
        return Err(DomainSweepError::parse(domain, "empty WHOIS response"));
    }

    let lower = raw.to_lowercase();
    let fields = collect_fields(raw);
    let lookup = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .find_map(|key| fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone()))
    };
    let lookup_all = |keys: &[&str]| -> Vec<String> {
        let mut values: Vec<String> = fields
            .iter()
            .filter(|(k, _)| keys.contains(&k.as_str()))
            .filter_map(|(_, v)| v.split_whitespace().next().map(str::to_string))
            .collect();
        values.dedup();
        values
    };

    let status = lookup_all(STATUS_KEYS);

    // Some registries echo the queried name even when it is unregistered.
    let free_status = status
        .iter()
        .any(|s| s.eq_ignore_ascii_case("free") || s.eq_ignore_ascii_case("available"));
    let domain_name = lookup(DOMAIN_KEYS)
        .filter(|name| name.contains('.'))
        .filter(|_| !free_status);

    if domain_name.is_none() {
        if is_rate_limited(&lower) {
            return Err(DomainSweepError::rate_limited(server, first_meaningful_line(raw)));
        }
        if INVALID_TLD_PATTERNS.iter().any(|p| lower.contains(p)) {
            return Err(DomainSweepError::whois(domain, "TLD not supported by WHOIS server"));
        }
        if !NOT_FOUND_PATTERNS.iter().any(|p| lower.contains(p)) {
            return Err(DomainSweepError::parse(
                domain,
                "unable to determine domain status from WHOIS response",
            ));
        }
    }

    Ok(WhoisRecord {
        domain_name: domain_name.map(|name| name.to_lowercase()),
        registrar: lookup(REGISTRAR_KEYS),
        creation_date: lookup(CREATION_KEYS),
        expiration_date: lookup(EXPIRATION_KEYS),
        status,
        name_servers: lookup_all(NAME_SERVER_KEYS)
            .into_iter()
            .map(|ns| ns.to_lowercase())
            .collect(),
        whois_server: Some(server.to_string()),
    })
}

/// Collect `key: value` pairs, lowercasing keys.
///
/// Some registries put the value on the line after the key (e.g.
/// "Domain name:\n    example.co.uk"); those are folded into one pair.
fn collect_fields(raw: &str) -> Vec<(String, String)> {
    let lines: Vec<&str> = raw.lines().collect();
    let mut fields = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') || trimmed.starts_with('#') || trimmed.starts_with(">>>") {
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };

        let key = key.trim().to_lowercase();
        let mut value = value.trim().to_string();

        if value.is_empty() {
            if let Some(next) = lines.get(idx + 1).map(|l| l.trim()) {
                if !next.is_empty() && !next.contains(':') {
                    value = next.to_string();
                }
            }
        }

        if !value.is_empty() {
            fields.push((key, value));
        }
    }

    fields
}

/// Check if the WHOIS output indicates rate limiting.
fn is_rate_limited(output_lower: &str) -> bool {
    RATE_LIMIT_PATTERNS.iter().any(|pattern| output_lower.contains(pattern))
}

fn first_meaningful_line(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('%') && !line.starts_with('#'))
        .unwrap_or_default()
        .to_string()
}

/// Parse an IANA WHOIS response for the authoritative WHOIS server.
///
/// The IANA response may use either `refer:` or `whois:`; `refer:` wins
/// when both are present.
///
/// ```text
/// whois:        whois.verisign-grs.com
/// refer:        whois.verisign-grs.com
/// ```
pub fn parse_iana_refer_response(response: &str) -> Option<String> {
    let mut whois_server = None;

    for line in response.lines() {
        let line_trimmed = line.trim();
        if let Some(server) = line_trimmed.strip_prefix("refer:") {
            let server = server.trim();
            if !server.is_empty() {
                return Some(server.to_string());
            }
        } else if let Some(server) = line_trimmed.strip_prefix("whois:") {
            let server = server.trim();
            if !server.is_empty() {
                whois_server = Some(server.to_string());
            }
        }
    }

    whois_server
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERISIGN_TAKEN: &str = "   Domain Name: GOOGLE.COM
   Registry Domain ID: 2138514_DOMAIN_COM-VRSN
   Registrar WHOIS Server: whois.markmonitor.com
   Registrar URL: http://www.markmonitor.com
   Updated Date: 2019-09-09T15:39:04Z
   Creation Date: 1997-09-15T04:00:00Z
   Registry Expiry Date: 2028-09-14T04:00:00Z
   Registrar: MarkMonitor Inc.
   Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited
   Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited
   Name Server: NS1.GOOGLE.COM
   Name Server: NS2.GOOGLE.COM
>>> Last update of whois database: 2024-01-01T00:00:00Z <<<
";

    const VERISIGN_FREE: &str = "No match for \"QXZQ.COM\".
>>> Last update of whois database: 2024-01-01T00:00:00Z <<<

NOTICE: The expiration date displayed in this record is the date the
registrar's sponsorship of the domain name registration in the registry is
currently set to expire.
";

    #[test]
    fn test_parse_registered_record() {
        let record = parse_whois_response("google.com", "whois.verisign-grs.com", VERISIGN_TAKEN).unwrap();
        assert_eq!(record.domain_name.as_deref(), Some("google.com"));
        assert_eq!(record.registrar.as_deref(), Some("MarkMonitor Inc."));
        assert_eq!(record.creation_date.as_deref(), Some("1997-09-15T04:00:00Z"));
        assert_eq!(record.expiration_date.as_deref(), Some("2028-09-14T04:00:00Z"));
        assert_eq!(
            record.status,
            vec!["clientDeleteProhibited", "clientTransferProhibited"]
        );
        assert_eq!(record.name_servers, vec!["ns1.google.com", "ns2.google.com"]);
        assert_eq!(record.whois_server.as_deref(), Some("whois.verisign-grs.com"));
        assert!(record.is_registered());
    }

    #[test]
    fn test_parse_unregistered_record() {
        let record = parse_whois_response("qxzq.com", "whois.verisign-grs.com", VERISIGN_FREE).unwrap();
        assert_eq!(record.domain_name, None);
        assert!(!record.is_registered());
    }

    #[test]
    fn test_parse_value_on_next_line() {
        let nominet = "\n    Domain name:\n        example.co.uk\n\n    Registrar:\n        Example Ltd\n";
        let record = parse_whois_response("example.co.uk", "whois.nic.uk", nominet).unwrap();
        assert_eq!(record.domain_name.as_deref(), Some("example.co.uk"));
    }

    #[test]
    fn test_parse_denic_style() {
        let denic = "Domain: example.de\nNserver: a.iana-servers.net\nStatus: connect\n";
        let record = parse_whois_response("example.de", "whois.denic.de", denic).unwrap();
        assert_eq!(record.domain_name.as_deref(), Some("example.de"));
        assert_eq!(record.name_servers, vec!["a.iana-servers.net"]);

        let free = "Domain: qxzq.de\nStatus: free\n";
        let record = parse_whois_response("qxzq.de", "whois.denic.de", free).unwrap();
        assert_eq!(record.domain_name, None);
    }

    #[test]
    fn test_empty_response_is_parse_error() {
        let err = parse_whois_response("ab.com", "whois.verisign-grs.com", "  \n").unwrap_err();
        assert!(matches!(err, DomainSweepError::Parse { .. }));
    }

    #[test]
    fn test_rate_limit_is_an_error() {
        let err = parse_whois_response(
            "ab.io",
            "whois.nic.io",
            "Query rate limit exceeded. Try again later.\n",
        )
        .unwrap_err();
        assert!(matches!(err, DomainSweepError::RateLimited { .. }));
    }

    #[test]
    fn test_unrecognised_response_is_not_available() {
        let err = parse_whois_response(
            "ab.xyz",
            "whois.nic.xyz",
            "Welcome to the registry service. Please read our terms of use carefully before continuing.",
        )
        .unwrap_err();
        assert!(matches!(err, DomainSweepError::Parse { .. }));
    }

    #[test]
    fn test_invalid_tld_response() {
        let err = parse_whois_response("ab.zz", "whois.iana.org", "No whois server is known for this kind of object.")
            .unwrap_err();
        assert!(matches!(err, DomainSweepError::Whois { .. }));
    }

    #[test]
    fn test_parse_iana_refer_response() {
        let response = "% IANA WHOIS server\n% for more information on IANA, visit http://www.iana.org\n\nrefer:        whois.verisign-grs.com\n\ndomain:       COM\n";
        assert_eq!(
            parse_iana_refer_response(response),
            Some("whois.verisign-grs.com".to_string())
        );

        let no_refer = "% IANA WHOIS server\ndomain: TEST\nstatus: ACTIVE\n";
        assert_eq!(parse_iana_refer_response(no_refer), None);

        let whois_field = "whois:        whois.nic.io\n\ndomain:       IO\n";
        assert_eq!(
            parse_iana_refer_response(whois_field),
            Some("whois.nic.io".to_string())
        );

        let both_fields = "whois:        whois.old-server.com\nrefer:        whois.correct-server.com\n";
        assert_eq!(
            parse_iana_refer_response(both_fields),
            Some("whois.correct-server.com".to_string())
        );

        assert_eq!(parse_iana_refer_response("refer:        \n"), None);
    }

    #[tokio::test]
    async fn test_query_unreachable_server_fails() {
        // TEST-NET-1 is unroutable: connect either times out or is refused.
        let result = query_whois("192.0.2.1", "ab.com", Duration::from_millis(200)).await;
        assert!(result.is_err());
    }
}
