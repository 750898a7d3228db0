pub mod address;
pub mod config;
pub mod content;
pub mod eml_writer;
pub mod error;
pub mod faker;
pub mod generator;
pub mod message;
pub mod parse;
pub mod random;
pub mod received;

pub use config::GeneratorConfig;
pub use eml_writer::EmlWriter;
pub use error::{GenError, Result};
pub use generator::{EmailGenerator, MessageOptions};
pub use parse::{AddressParser, MailboxParser, extract_domain, parse_eml};
pub use received::{Hop, ReceivedChainBuilder, ReceivedConfig};
