use crate::error::{GenError, Result};
use crate::parse::{AddressParser, MailboxParser, envelope_address, resolve_domain};
use crate::random::{OsRandom, RandomSource, random_hex};
use chrono::{DateTime, Datelike, Duration, Utc};
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;

pub const DEFAULT_HELO: &str = "smtp-client.example.net";
pub const DEFAULT_HOPS: usize = 3;
/// Upper bound on a chain's length; real trails rarely exceed a dozen hops.
pub const MAX_HOPS: usize = 64;
/// Rejected draws tolerated per relay address before giving up.
pub const MAX_IP_DRAWS: usize = 10_000;

const HOP_SPACING_MINUTES: i64 = 2;
const ESMTP_ID_BYTES: usize = 6;

/// Construction-time defaults of a [`ReceivedChainBuilder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedConfig {
    pub helo: String,
    pub hops: usize,
}

impl ReceivedConfig {
    pub fn new(helo: impl Into<String>, hops: i64) -> Result<Self> {
        Ok(Self {
            helo: helo.into(),
            hops: validate_hops(hops)?,
        })
    }
}

impl Default for ReceivedConfig {
    fn default() -> Self {
        Self {
            helo: DEFAULT_HELO.to_string(),
            hops: DEFAULT_HOPS,
        }
    }
}

/// Hop counts arrive from user input, so they are signed until checked.
pub fn validate_hops(hops: i64) -> Result<usize> {
    match usize::try_from(hops) {
        Ok(n) if n <= MAX_HOPS => Ok(n),
        Ok(n) => Err(GenError::InvalidArgument(format!(
            "hop count {n} exceeds the maximum of {MAX_HOPS}"
        ))),
        Err(_) => Err(GenError::InvalidArgument(format!(
            "hop count must not be negative, got {hops}"
        ))),
    }
}

/// One relay step of the synthesized delivery trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub from_host: String,
    pub by_host: String,
    pub helo: String,
    pub ip: Ipv4Addr,
    pub timestamp: DateTime<Utc>,
    pub esmtp_id: String,
}

impl Hop {
    /// `Received:` value with TABs marking where the writer folds.
    pub fn header_value(&self, recipient: &str) -> String {
        format!(
            "from {} ({} [{}])\tby {} with ESMTP id {}\tfor <{}>;\t{}",
            self.helo,
            self.from_host,
            self.ip,
            self.by_host,
            self.esmtp_id,
            recipient,
            self.timestamp.to_rfc2822()
        )
    }
}

/// Fabricates the `Received:` headers a message collects on its way from the
/// sender's outbound relays to the recipient's mail server.
///
/// The builder keeps no state between calls; every [`build`](Self::build)
/// draws fresh addresses, ids and timestamps.
#[derive(Clone)]
pub struct ReceivedChainBuilder {
    config: ReceivedConfig,
    random: Arc<dyn RandomSource>,
    parser: Arc<dyn AddressParser>,
}

impl Default for ReceivedChainBuilder {
    fn default() -> Self {
        Self::new(ReceivedConfig::default())
    }
}

impl ReceivedChainBuilder {
    pub fn new(config: ReceivedConfig) -> Self {
        Self::with_parts(config, Arc::new(OsRandom), Arc::new(MailboxParser))
    }

    pub fn with_parts(
        config: ReceivedConfig,
        random: Arc<dyn RandomSource>,
        parser: Arc<dyn AddressParser>,
    ) -> Self {
        Self {
            config,
            random,
            parser,
        }
    }

    pub fn config(&self) -> &ReceivedConfig {
        &self.config
    }

    /// Header values, newest hop first, as MTAs prepend them.
    pub fn build(
        &self,
        sender: &str,
        recipient: &str,
        start_time: Option<DateTime<Utc>>,
        hops: Option<i64>,
    ) -> Result<Vec<String>> {
        let (hop_count, start) = self.checked_inputs(start_time, hops)?;
        if hop_count == 0 {
            return Ok(Vec::new());
        }
        let route = self.route(sender, recipient);
        let chain = self.chain(&route, start, hop_count)?;
        Ok(chain
            .iter()
            .rev()
            .map(|hop| hop.header_value(&route.rcpt))
            .collect())
    }

    /// Structured hops, oldest first.
    pub fn build_hops(
        &self,
        sender: &str,
        recipient: &str,
        start_time: Option<DateTime<Utc>>,
        hops: Option<i64>,
    ) -> Result<Vec<Hop>> {
        let (hop_count, start) = self.checked_inputs(start_time, hops)?;
        if hop_count == 0 {
            return Ok(Vec::new());
        }
        let route = self.route(sender, recipient);
        self.chain(&route, start, hop_count)
    }

    /// Every timestamp of the chain must render as an RFC 2822 date.
    fn checked_inputs(
        &self,
        start_time: Option<DateTime<Utc>>,
        hops: Option<i64>,
    ) -> Result<(usize, DateTime<Utc>)> {
        let hop_count = match hops {
            Some(n) => validate_hops(n)?,
            None => self.config.hops,
        };
        let start = start_time.unwrap_or_else(Utc::now);
        let span = Duration::minutes(HOP_SPACING_MINUTES * hop_count as i64);
        let in_range = |t: DateTime<Utc>| (0..=9999).contains(&t.year());
        match start.checked_sub_signed(span) {
            Some(first) if in_range(first) && in_range(start) => Ok((hop_count, start)),
            _ => Err(GenError::InvalidArgument(format!(
                "start time {start} puts a {hop_count} hop chain outside years 0 to 9999"
            ))),
        }
    }

    fn route(&self, sender: &str, recipient: &str) -> Route {
        let sender_domain = resolve_domain(self.parser.as_ref(), sender, &self.config.helo);
        let bare = envelope_address(recipient);
        let parsed_domain = bare.and_then(|b| self.parser.extract_domain(b));
        let recipient_domain = parsed_domain
            .clone()
            .unwrap_or_else(|| sender_domain.clone());
        let rcpt = match (bare, parsed_domain) {
            (Some(b), Some(_)) => b.to_string(),
            _ => {
                let local = bare
                    .and_then(|b| b.split('@').next())
                    .filter(|l| !l.is_empty())
                    .unwrap_or("postmaster");
                format!("{local}@{recipient_domain}")
            }
        };
        Route {
            sender_domain,
            recipient_domain,
            rcpt,
        }
    }

    fn chain(&self, route: &Route, start: DateTime<Utc>, hop_count: usize) -> Result<Vec<Hop>> {
        let hosts = host_chain(&route.sender_domain, &route.recipient_domain, hop_count);
        let ips = ip_chain(self.random.as_ref(), hop_count)?;

        let mut timestamp = start - Duration::minutes(HOP_SPACING_MINUTES * hop_count as i64);
        let mut chain = Vec::with_capacity(hop_count);
        for (i, ip) in ips.into_iter().enumerate() {
            timestamp += Duration::minutes(HOP_SPACING_MINUTES);
            let from_host = hosts[i].clone();
            let helo = if from_host.is_empty() {
                self.config.helo.clone()
            } else {
                from_host.clone()
            };
            chain.push(Hop {
                from_host,
                by_host: hosts[i + 1].clone(),
                helo,
                ip,
                timestamp,
                esmtp_id: random_hex(self.random.as_ref(), ESMTP_ID_BYTES),
            });
        }

        log::debug!(
            "Built {} hop chain {} -> {} for <{}>: {:?}",
            hop_count,
            route.sender_domain,
            route.recipient_domain,
            route.rcpt,
            hosts
        );
        Ok(chain)
    }
}

/// Domains and envelope recipient shared by every hop of one chain.
struct Route {
    sender_domain: String,
    recipient_domain: String,
    rcpt: String,
}

/// Relay hostnames from the sender's outbound servers to `mail.<recipient>`.
///
/// Always `max(2, hops + 1)` names: the first half are `smtpN.<sender>`, the
/// rest of the interior `mxN.<recipient>` with `N` restarting at 1.
pub fn host_chain(sender_domain: &str, recipient_domain: &str, hops: usize) -> Vec<String> {
    let total = (hops + 1).max(2);
    let half = (total / 2).max(1);
    let mut hosts: Vec<String> = (0..total - 1)
        .map(|idx| {
            if idx < half {
                format!("smtp{}.{}", idx + 1, sender_domain)
            } else {
                format!("mx{}.{}", idx - half + 1, recipient_domain)
            }
        })
        .collect();
    hosts.push(format!("mail.{recipient_domain}"));
    hosts
}

/// `count` distinct globally routable addresses drawn by rejection sampling.
pub fn ip_chain(random: &dyn RandomSource, count: usize) -> Result<Vec<Ipv4Addr>> {
    let mut chosen = Vec::with_capacity(count);
    let mut seen = HashSet::with_capacity(count);
    while chosen.len() < count {
        let mut attempts = 0;
        let ip = loop {
            if attempts == MAX_IP_DRAWS {
                return Err(GenError::IpSpaceExhausted { attempts });
            }
            attempts += 1;
            let candidate = Ipv4Addr::from(random.next_u32());
            if is_global(candidate) && !seen.contains(&candidate) {
                break candidate;
            }
        };
        seen.insert(ip);
        chosen.push(ip);
    }
    Ok(chosen)
}

/// Whether `ip` lies outside every IANA special-purpose IPv4 block.
pub fn is_global(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    !(a == 0
        || ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_multicast()
        || ip.is_broadcast()
        || ip.is_documentation()
        // shared address space, RFC 6598
        || (a == 100 && (b & 0xc0) == 64)
        // IETF protocol assignments
        || (a == 192 && b == 0 && c == 0)
        // 6to4 relay anycast
        || (a == 192 && b == 88 && c == 99)
        // benchmarking
        || (a == 198 && (b & 0xfe) == 18)
        // reserved
        || a >= 240)
}
