use crate::address::AddressGenerator;
use crate::config::GeneratorConfig;
use crate::content::{ContentGenerator, MessageContent};
use crate::error::Result;
use crate::faker::Faker;
use crate::message::{AssemblerOptions, MessageAssembler, MessageRequest, SyntheticMessage};
use crate::parse::{AddressParser, MailboxParser};
use crate::random::{OsRandom, RandomSource};
use crate::received::{ReceivedChainBuilder, ReceivedConfig};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Per-message overrides; anything left `None` is generated.
#[derive(Debug, Clone, Default)]
pub struct MessageOptions {
    pub from: Option<String>,
    pub to: Option<String>,
    pub content: Option<MessageContent>,
    pub hops: Option<i64>,
    pub start_time: Option<DateTime<Utc>>,
}

/// Wires fake addresses and content, the Received chain and the assembler.
pub struct EmailGenerator {
    faker: Faker,
    received: ReceivedChainBuilder,
    assembler: MessageAssembler,
}

impl EmailGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self> {
        let faker = match config.seed {
            Some(seed) => Faker::with_seed(config.locale, seed),
            None => Faker::new(config.locale),
        };
        Self::with_parts(config, faker, Arc::new(OsRandom), Arc::new(MailboxParser))
    }

    pub fn with_parts(
        config: &GeneratorConfig,
        faker: Faker,
        random: Arc<dyn RandomSource>,
        parser: Arc<dyn AddressParser>,
    ) -> Result<Self> {
        config.validate()?;
        let received = ReceivedChainBuilder::with_parts(
            ReceivedConfig::new(config.helo.clone(), config.hops)?,
            random.clone(),
            parser.clone(),
        );
        let assembler = MessageAssembler::with_parts(
            AssemblerOptions {
                helo: config.helo.clone(),
                return_path: config.return_path,
                reply_to: config.reply_to,
                x_mailer: config.x_mailer.clone(),
            },
            random,
            parser,
        );
        Ok(Self {
            faker,
            received,
            assembler,
        })
    }

    pub fn create_message(&mut self, options: MessageOptions) -> Result<SyntheticMessage> {
        let (sender, recipient) = self.resolve_addresses(options.from, options.to);
        let content = match options.content {
            Some(content) => content,
            None => ContentGenerator::new(&mut self.faker).generate(),
        };
        let start = options.start_time.unwrap_or_else(Utc::now);
        let received = self
            .received
            .build(&sender, &recipient, Some(start), options.hops)?;

        log::debug!(
            "Assembling message {} -> {} with {} Received headers",
            sender,
            recipient,
            received.len()
        );
        Ok(self.assembler.assemble(&MessageRequest {
            sender: &sender,
            recipient: &recipient,
            content: &content,
            received: &received,
            date: start,
        }))
    }

    fn resolve_addresses(&mut self, from: Option<String>, to: Option<String>) -> (String, String) {
        let mut addresses = AddressGenerator::new(&mut self.faker);
        let sender = from.unwrap_or_else(|| addresses.sender());
        let recipient = to.unwrap_or_else(|| addresses.recipient());
        (sender, recipient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenError;
    use crate::faker::Locale;
    use crate::random::testing::SeededRandom;
    use chrono::TimeZone;

    fn generator(config: &GeneratorConfig) -> EmailGenerator {
        EmailGenerator::with_parts(
            config,
            Faker::with_seed(config.locale, 1),
            Arc::new(SeededRandom::new(1)),
            Arc::new(MailboxParser),
        )
        .unwrap()
    }

    #[test]
    fn test_generated_message_has_chain_and_content() {
        let mut generator = generator(&GeneratorConfig::default());
        let message = generator.create_message(MessageOptions::default()).unwrap();
        assert_eq!(message.headers_named("Received").count(), 3);
        assert!(message.header("From").is_some());
        assert!(message.header("Subject").is_some());
        assert!(!message.text_body.is_empty());
        assert!(message.html_body.contains("<p>"));
    }

    #[test]
    fn test_explicit_addresses_and_hops() {
        let mut generator = generator(&GeneratorConfig::default());
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let message = generator
            .create_message(MessageOptions {
                from: Some("A <a@foo.com>".into()),
                to: Some("b@bar.org".into()),
                content: Some(MessageContent::new("s", "t", "h")),
                hops: Some(2),
                start_time: Some(start),
            })
            .unwrap();
        let received: Vec<&str> = message.headers_named("Received").collect();
        assert_eq!(received.len(), 2);
        assert!(received[0].starts_with("from mx1.bar.org (mx1.bar.org ["));
        assert!(received[0].contains("by mail.bar.org with ESMTP id"));
        assert!(received[1].starts_with("from smtp1.foo.com"));
        assert_eq!(message.header("Date"), Some(start.to_rfc2822().as_str()));
        assert!(message.header("Message-ID").unwrap().ends_with("@foo.com>"));
    }

    #[test]
    fn test_negative_hops_rejected_without_output() {
        let mut generator = generator(&GeneratorConfig::default());
        let err = generator
            .create_message(MessageOptions {
                hops: Some(-1),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, GenError::InvalidArgument(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GeneratorConfig {
            hops: -5,
            ..Default::default()
        };
        assert!(EmailGenerator::new(&config).is_err());
    }

    #[test]
    fn test_seeded_content_is_reproducible() {
        let config = GeneratorConfig {
            locale: Locale::EnUs,
            seed: Some(77),
            ..Default::default()
        };
        let a = EmailGenerator::new(&config)
            .unwrap()
            .create_message(MessageOptions::default())
            .unwrap();
        let b = EmailGenerator::new(&config)
            .unwrap()
            .create_message(MessageOptions::default())
            .unwrap();
        assert_eq!(a.header("From"), b.header("From"));
        assert_eq!(a.text_body, b.text_body);
        assert_ne!(a.header("Message-ID"), b.header("Message-ID"));
    }

    #[test]
    fn test_written_message_round_trips() {
        let mut generator = generator(&GeneratorConfig::default());
        let message = generator
            .create_message(MessageOptions {
                from: Some("Łukasz Wiśniewski <lukasz@transpol.pl>".into()),
                to: Some("ewa@wp.pl".into()),
                content: Some(MessageContent::new(
                    "Faktura za bieżący miesiąc",
                    "Dzień dobry,\n\nW załączeniu faktura.\n",
                    "<p>Dzień dobry,</p>\n<p>W załączeniu faktura.</p>\n",
                )),
                hops: Some(4),
                ..Default::default()
            })
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = crate::EmlWriter::default()
            .write(&message, dir.path().join("m.eml"))
            .unwrap();
        let parsed = crate::parse_eml(&std::fs::read(path).unwrap()).unwrap();

        let squash = |v: &str| v.split_whitespace().collect::<Vec<_>>().join(" ");
        for name in ["From", "To", "Return-Path", "Subject", "Date", "Message-ID", "MIME-Version"] {
            assert_eq!(
                parsed.header(name).map(squash),
                message.header(name).map(squash),
                "{name}"
            );
        }
        let expected: Vec<String> = message.headers_named("Received").map(squash).collect();
        let actual: Vec<String> = parsed.received.iter().map(|v| squash(v)).collect();
        assert_eq!(actual, expected);

        let normalize = |v: Option<&str>| v.map(|s| s.replace("\r\n", "\n").trim_end().to_string());
        assert_eq!(normalize(parsed.text_body.as_deref()), normalize(Some(&message.text_body)));
        assert_eq!(normalize(parsed.html_body.as_deref()), normalize(Some(&message.html_body)));
    }
}
