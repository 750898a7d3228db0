use crate::content::MessageContent;
use crate::parse::{AddressParser, MailboxParser, addr_spec, resolve_domain};
use crate::random::{OsRandom, RandomSource, random_hex};
use crate::received::DEFAULT_HELO;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A header as it will appear in the file, before encoding and folding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub name: String,
    pub value: String,
}

/// Assembled message: ordered headers plus the alternative bodies.
#[derive(Debug, Clone)]
pub struct SyntheticMessage {
    pub headers: Vec<HeaderField>,
    pub text_body: String,
    pub html_body: String,
}

impl SyntheticMessage {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers_named(name).next()
    }

    pub fn headers_named<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
        self.headers
            .iter()
            .filter(move |h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// Everything needed to put one message together.
pub struct MessageRequest<'a> {
    pub sender: &'a str,
    pub recipient: &'a str,
    pub content: &'a MessageContent,
    /// Received values, newest first.
    pub received: &'a [String],
    pub date: DateTime<Utc>,
}

/// Which optional headers the assembler emits.
#[derive(Debug, Clone)]
pub struct AssemblerOptions {
    pub helo: String,
    pub return_path: bool,
    pub reply_to: bool,
    pub x_mailer: Option<String>,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            helo: DEFAULT_HELO.to_string(),
            return_path: true,
            reply_to: false,
            x_mailer: None,
        }
    }
}

#[derive(Clone)]
pub struct MessageAssembler {
    options: AssemblerOptions,
    random: Arc<dyn RandomSource>,
    parser: Arc<dyn AddressParser>,
}

impl MessageAssembler {
    pub fn new(options: AssemblerOptions) -> Self {
        Self::with_parts(options, Arc::new(OsRandom), Arc::new(MailboxParser))
    }

    pub fn with_parts(
        options: AssemblerOptions,
        random: Arc<dyn RandomSource>,
        parser: Arc<dyn AddressParser>,
    ) -> Self {
        Self {
            options,
            random,
            parser,
        }
    }

    /// Headers in delivery order: originator fields, identification, MIME,
    /// then the Received trail with the newest hop on top.
    pub fn assemble(&self, request: &MessageRequest<'_>) -> SyntheticMessage {
        let mut headers = Vec::with_capacity(10 + request.received.len());
        let mut push = |name: &str, value: String| {
            headers.push(HeaderField {
                name: name.to_string(),
                value: single_line(&value),
            })
        };

        push("From", request.sender.to_string());
        push("To", request.recipient.to_string());
        if self.options.return_path {
            if let Some(bare) = addr_spec(request.sender).filter(|s| s.contains('@')) {
                push("Return-Path", format!("<{bare}>"));
            }
        }
        if self.options.reply_to {
            push("Reply-To", request.sender.to_string());
        }
        push("Subject", request.content.subject.clone());
        push("Date", request.date.to_rfc2822());
        push("Message-ID", self.message_id(request.sender, request.date));
        push("MIME-Version", "1.0".to_string());
        if let Some(mailer) = &self.options.x_mailer {
            push("X-Mailer", mailer.clone());
        }
        for value in request.received {
            push("Received", value.clone());
        }

        SyntheticMessage {
            headers,
            text_body: request.content.text.clone(),
            html_body: request.content.html.clone(),
        }
    }

    /// `<random.epoch@domain>`, with the domain resolved like the Received chain's.
    pub fn message_id(&self, sender: &str, date: DateTime<Utc>) -> String {
        let domain = resolve_domain(self.parser.as_ref(), sender, &self.options.helo);
        format!(
            "<{}.{}@{}>",
            random_hex(self.random.as_ref(), 10),
            date.timestamp(),
            domain
        )
    }
}

/// Header values may keep TABs (fold hints) but never raw line breaks.
fn single_line(value: &str) -> String {
    if !value.contains(['\r', '\n']) {
        return value.to_string();
    }
    value
        .split(['\r', '\n'])
        .filter(|part| !part.trim().is_empty())
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::testing::SeededRandom;
    use chrono::TimeZone;

    fn content() -> MessageContent {
        MessageContent::new("Raport", "tekst\n", "<p>tekst</p>")
    }

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 12, 0, 0).unwrap()
    }

    fn names(message: &SyntheticMessage) -> Vec<&str> {
        message.headers.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn test_header_order_with_all_options() {
        let assembler = MessageAssembler::new(AssemblerOptions {
            reply_to: true,
            x_mailer: Some("Synth 1.0".into()),
            ..Default::default()
        });
        let received = vec!["newest".to_string(), "oldest".to_string()];
        let content = content();
        let message = assembler.assemble(&MessageRequest {
            sender: "Jan <jan@foo.pl>",
            recipient: "ewa@bar.pl",
            content: &content,
            received: &received,
            date: date(),
        });
        assert_eq!(
            names(&message),
            [
                "From",
                "To",
                "Return-Path",
                "Reply-To",
                "Subject",
                "Date",
                "Message-ID",
                "MIME-Version",
                "X-Mailer",
                "Received",
                "Received"
            ]
        );
        assert_eq!(message.headers_named("Received").collect::<Vec<_>>(), ["newest", "oldest"]);
        assert_eq!(message.header("Return-Path"), Some("<jan@foo.pl>"));
        assert_eq!(message.header("Date"), Some("Fri, 17 May 2024 12:00:00 +0000"));
    }

    #[test]
    fn test_optional_headers_omitted() {
        let assembler = MessageAssembler::new(AssemblerOptions {
            return_path: false,
            ..Default::default()
        });
        let content = content();
        let message = assembler.assemble(&MessageRequest {
            sender: "jan@foo.pl",
            recipient: "ewa@bar.pl",
            content: &content,
            received: &[],
            date: date(),
        });
        assert_eq!(
            names(&message),
            ["From", "To", "Subject", "Date", "Message-ID", "MIME-Version"]
        );
    }

    #[test]
    fn test_message_id_uses_sender_domain_or_helo_fallback() {
        let assembler = MessageAssembler::with_parts(
            AssemblerOptions {
                helo: "out.relay.test".into(),
                ..Default::default()
            },
            Arc::new(SeededRandom::new(1)),
            Arc::new(MailboxParser),
        );
        assert!(assembler.message_id("a@foo.com", date()).ends_with("@foo.com>"));
        let fallback = assembler.message_id("garbage", date());
        assert!(fallback.starts_with('<') && fallback.ends_with("@relay.test>"));
        assert!(fallback.contains(&format!(".{}@", date().timestamp())));
    }

    #[test]
    fn test_header_lookup_outlives_name() {
        let assembler = MessageAssembler::new(AssemblerOptions::default());
        let content = content();
        let message = assembler.assemble(&MessageRequest {
            sender: "jan@foo.pl",
            recipient: "ewa@bar.pl",
            content: &content,
            received: &[],
            date: date(),
        });
        let subject = {
            let name = String::from("subject");
            message.header(&name)
        };
        assert_eq!(subject, Some("Raport"));
    }

    #[test]
    fn test_header_values_are_single_line() {
        assert_eq!(single_line("a\r\n b\nc"), "a b c");
        assert_eq!(single_line("x\ty"), "x\ty");
    }
}
