use crate::faker::Faker;

/// Produces `Display Name <local@domain>` strings for senders and recipients.
///
/// Senders get company-style domains, recipients free-mail providers.
pub struct AddressGenerator<'a> {
    faker: &'a mut Faker,
}

impl<'a> AddressGenerator<'a> {
    pub fn new(faker: &'a mut Faker) -> Self {
        Self { faker }
    }

    pub fn sender(&mut self) -> String {
        let domain = self.faker.domain_name();
        self.build_address(&domain)
    }

    pub fn recipient(&mut self) -> String {
        let domain = self.faker.free_email_domain();
        self.build_address(&domain)
    }

    pub fn pair(&mut self) -> (String, String) {
        (self.sender(), self.recipient())
    }

    fn build_address(&mut self, domain: &str) -> String {
        let name = self.faker.name();
        let local_part = self.faker.user_name();
        format!("{name} <{local_part}@{domain}>")
    }
}
