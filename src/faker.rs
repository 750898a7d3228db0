//! Locale-aware fake names, domains and text.
//!
//! `en_US`, `fr_FR` and `pt_BR` come from the `fake` crate; `pl_PL` uses the
//! word lists in [`polish`].

mod polish;

use crate::error::GenError;
use fake::Fake;
use fake::faker::company::raw::{CatchPhrase, CompanyName};
use fake::faker::internet::raw::{DomainSuffix, FreeEmailProvider, Username};
use fake::faker::lorem::raw::Sentences;
use fake::faker::name::raw::Name;
use fake::locales::{EN, FR_FR, PT_BR};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use serde::Deserialize;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Locale {
    #[default]
    PlPl,
    EnUs,
    FrFr,
    PtBr,
}

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::PlPl => "pl_PL",
            Locale::EnUs => "en_US",
            Locale::FrFr => "fr_FR",
            Locale::PtBr => "pt_BR",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_lowercase();
        match normalized.as_str() {
            "pl" | "pl_pl" => Ok(Locale::PlPl),
            "en" | "en_us" => Ok(Locale::EnUs),
            "fr" | "fr_fr" => Ok(Locale::FrFr),
            "pt" | "pt_br" => Ok(Locale::PtBr),
            _ => Err(GenError::InvalidArgument(format!("unsupported locale {s:?}"))),
        }
    }
}

impl TryFrom<String> for Locale {
    type Error = GenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Dispatches a `fake` raw faker to the locale's data set.
macro_rules! fake_in {
    ($locale:expr, $rng:expr, $faker:ident($($arg:expr),*)) => {
        match $locale {
            Locale::FrFr => $faker(FR_FR, $($arg),*).fake_with_rng($rng),
            Locale::PtBr => $faker(PT_BR, $($arg),*).fake_with_rng($rng),
            _ => $faker(EN, $($arg),*).fake_with_rng($rng),
        }
    };
}

/// Fake data generator bound to one locale and its own RNG.
///
/// Content randomness is separate from the header
/// [`RandomSource`](crate::random::RandomSource) so a seed can make bodies reproducible
/// without weakening relay IPs and ids.
pub struct Faker {
    locale: Locale,
    rng: StdRng,
}

impl Faker {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(locale: Locale, seed: u64) -> Self {
        Self {
            locale,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn name(&mut self) -> String {
        match self.locale {
            Locale::PlPl => polish::name(&mut self.rng),
            locale => fake_in!(locale, &mut self.rng, Name()),
        }
    }

    pub fn user_name(&mut self) -> String {
        let raw: String = match self.locale {
            Locale::PlPl => polish::user_name(&mut self.rng),
            locale => fake_in!(locale, &mut self.rng, Username()),
        };
        let cleaned = sanitize_local_part(&raw);
        if cleaned.is_empty() { "user".to_string() } else { cleaned }
    }

    /// Company-style domain, e.g. `transpol.com.pl`.
    pub fn domain_name(&mut self) -> String {
        match self.locale {
            Locale::PlPl => polish::domain_name(&mut self.rng),
            locale => {
                let company: String = fake_in!(locale, &mut self.rng, CompanyName());
                let suffix: String = fake_in!(locale, &mut self.rng, DomainSuffix());
                let label = domain_label(&company);
                format!("{}.{}", if label.is_empty() { "company" } else { &label }, suffix)
            }
        }
    }

    pub fn free_email_domain(&mut self) -> String {
        match self.locale {
            Locale::PlPl => polish::free_email_domain(&mut self.rng),
            locale => fake_in!(locale, &mut self.rng, FreeEmailProvider()),
        }
    }

    pub fn subject(&mut self) -> String {
        match self.locale {
            Locale::PlPl => polish::subject(&mut self.rng),
            locale => fake_in!(locale, &mut self.rng, CatchPhrase()),
        }
    }

    pub fn paragraphs(&mut self, count: Range<usize>) -> Vec<String> {
        let count = if count.is_empty() { 1 } else { self.rng.gen_range(count).max(1) };
        match self.locale {
            Locale::PlPl => polish::paragraphs(&mut self.rng, count),
            locale => (0..count)
                .map(|_| {
                    let sentences: Vec<String> = fake_in!(locale, &mut self.rng, Sentences(2..5));
                    sentences.join(" ")
                })
                .collect(),
        }
    }
}

/// Keeps only characters that survive as an unquoted local part.
fn sanitize_local_part(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    kept.split('.')
        .map(|part| part.trim_matches(|c: char| c == '_' || c == '-'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// `Acme & Sons, Inc.` becomes `acme-sons-inc`.
fn domain_label(company: &str) -> String {
    let mut label = String::new();
    for c in company.chars() {
        if c.is_ascii_alphanumeric() {
            label.push(c.to_ascii_lowercase());
        } else if !label.is_empty() && !label.ends_with('-') {
            label.push('-');
        }
    }
    label.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_parsing() {
        assert_eq!("pl_PL".parse::<Locale>().unwrap(), Locale::PlPl);
        assert_eq!("en-us".parse::<Locale>().unwrap(), Locale::EnUs);
        assert_eq!("FR".parse::<Locale>().unwrap(), Locale::FrFr);
        assert!(matches!("xx_YY".parse::<Locale>(), Err(GenError::InvalidArgument(_))));
        assert_eq!(Locale::default().to_string(), "pl_PL");
    }

    #[test]
    fn test_domain_label() {
        assert_eq!(domain_label("Acme & Sons, Inc."), "acme-sons-inc");
        assert_eq!(domain_label("Émile SA"), "mile-sa");
        assert_eq!(domain_label("!!!"), "");
    }

    #[test]
    fn test_every_locale_produces_usable_addresses() {
        for locale in [Locale::PlPl, Locale::EnUs, Locale::FrFr, Locale::PtBr] {
            let mut faker = Faker::with_seed(locale, 42);
            for _ in 0..20 {
                let address = format!("{}@{}", faker.user_name(), faker.domain_name());
                assert!(
                    address.parse::<lettre::Address>().is_ok(),
                    "{locale}: {address}"
                );
                assert!(faker.free_email_domain().contains('.'));
                assert!(!faker.name().is_empty());
            }
        }
    }

    #[test]
    fn test_seeded_faker_is_reproducible() {
        let mut a = Faker::with_seed(Locale::EnUs, 9);
        let mut b = Faker::with_seed(Locale::EnUs, 9);
        assert_eq!(a.name(), b.name());
        assert_eq!(a.paragraphs(2..3), b.paragraphs(2..3));
    }

    #[test]
    fn test_subjects_for_every_locale() {
        for locale in [Locale::PlPl, Locale::EnUs, Locale::FrFr, Locale::PtBr] {
            let mut faker = Faker::with_seed(locale, 11);
            assert!(!faker.subject().trim().is_empty(), "{locale}");
        }
    }

    #[test]
    fn test_paragraphs_not_empty() {
        let mut faker = Faker::with_seed(Locale::FrFr, 3);
        let paras = faker.paragraphs(2..4);
        assert!(!paras.is_empty());
        assert!(paras.iter().all(|p| !p.trim().is_empty()));
    }
}
