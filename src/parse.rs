use idna::domain_to_ascii;
use lettre::Address;
use mailparse::{MailHeaderMap, ParsedMail, parse_mail};

/// Domain used when neither the address nor the HELO name yields one.
pub const DEFAULT_DOMAIN: &str = "example.net";

/// Pulls the domain out of a free-form address string.
pub trait AddressParser: Send + Sync {
    fn extract_domain(&self, address: &str) -> Option<String>;
}

/// Parser accepting `Name <local@domain>`, `<local@domain>` and bare addresses.
///
/// The addr-spec is validated with `lettre::Address`; anything it rejects is
/// treated as having no domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct MailboxParser;

impl AddressParser for MailboxParser {
    fn extract_domain(&self, address: &str) -> Option<String> {
        extract_domain(address)
    }
}

/// Extracts domain from an email address, normalized to lowercase ASCII
pub fn extract_domain(address: &str) -> Option<String> {
    let addr_spec = addr_spec(address)?;
    let parsed: Address = addr_spec.parse().ok()?;
    let domain = parsed.domain().trim_end_matches('.');
    // Domain literals like `[192.0.2.1]` cannot prefix a relay hostname.
    if domain.is_empty() || domain.starts_with('[') {
        return None;
    }
    let ascii = domain_to_ascii(domain).ok()?;
    Some(ascii.to_ascii_lowercase())
}

/// The `local@domain` part of an address, without display name or brackets.
pub fn addr_spec(address: &str) -> Option<&str> {
    let trimmed = address.trim();
    let inner = match (trimmed.rfind('<'), trimmed.rfind('>')) {
        (Some(start), Some(end)) if start < end => &trimmed[start + 1..end],
        (None, None) => trimmed,
        _ => return None,
    };
    let inner = inner.trim();
    (!inner.is_empty()).then_some(inner)
}

/// Best-effort addr-spec for an envelope clause.
///
/// Unlike [`addr_spec`] this tolerates a stray `<` or `>` and drops any
/// display-name words left in front of the address.
pub fn envelope_address(address: &str) -> Option<&str> {
    let inner = addr_spec(address).unwrap_or_else(|| {
        let tail = address.rsplit('<').next().unwrap_or_default();
        tail.split('>').next().unwrap_or_default()
    });
    inner.split_whitespace().last()
}

/// Domain portion of a HELO hostname.
///
/// `smtp-client.example.net` gives `example.net`, a two-label name is used as
/// is, and anything shorter falls back to [`DEFAULT_DOMAIN`].
pub fn helo_domain(helo: &str) -> String {
    let labels: Vec<&str> = helo
        .trim()
        .trim_end_matches('.')
        .split('.')
        .filter(|l| !l.is_empty())
        .collect();
    match labels.len() {
        0 | 1 => DEFAULT_DOMAIN.to_string(),
        2 => labels.join(".").to_ascii_lowercase(),
        _ => labels[1..].join(".").to_ascii_lowercase(),
    }
}

/// Domain of `address`, or the HELO-derived domain when it has none.
pub fn resolve_domain(parser: &dyn AddressParser, address: &str, helo: &str) -> String {
    parser.extract_domain(address).unwrap_or_else(|| {
        let fallback = helo_domain(helo);
        log::warn!("No domain in {address:?}, falling back to {fallback}");
        fallback
    })
}

/// What came back when re-reading a written `.eml` file
#[derive(Debug)]
pub struct EmlSummary {
    pub headers: Vec<(String, String)>,
    pub received: Vec<String>,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
}

impl EmlSummary {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

pub fn parse_eml(raw: &[u8]) -> anyhow::Result<EmlSummary> {
    let parsed = parse_mail(raw)?;
    let headers = parsed
        .headers
        .iter()
        .map(|h| (h.get_key(), h.get_value()))
        .collect();
    let received = parsed.headers.get_all_values("Received");

    let mut text_body = None;
    let mut html_body = None;
    collect_bodies(&parsed, &mut text_body, &mut html_body)?;

    Ok(EmlSummary {
        headers,
        received,
        text_body,
        html_body,
    })
}

fn collect_bodies(
    part: &ParsedMail<'_>,
    text: &mut Option<String>,
    html: &mut Option<String>,
) -> anyhow::Result<()> {
    if part.subparts.is_empty() {
        match part.ctype.mimetype.as_str() {
            "text/plain" if text.is_none() => *text = Some(part.get_body()?),
            "text/html" if html.is_none() => *html = Some(part.get_body()?),
            _ => {}
        }
        return Ok(());
    }
    for sub in &part.subparts {
        collect_bodies(sub, text, html)?;
    }
    Ok(())
}
