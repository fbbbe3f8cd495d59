//! Invoice parties.

use serde::{Deserialize, Serialize};

/// A seller or buyer named on an invoice.
///
/// Companies are plain values embedded in the invoice record; they have no
/// identity of their own in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Company {
    /// Registered name.
    pub name: String,
    /// Postal address.
    pub address: String,
    /// Tax identification number.
    pub tax_id: String,
    /// Bank account number.
    pub account_number: String,
    /// Contact phone number.
    pub phone_number: String,
    /// Contact email address.
    pub email: String,
}

impl Company {
    /// Creates a company with only a name set.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the address.
    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Sets the tax id.
    #[must_use]
    pub fn tax_id(mut self, tax_id: impl Into<String>) -> Self {
        self.tax_id = tax_id.into();
        self
    }

    /// Sets the account number.
    #[must_use]
    pub fn account_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = account_number.into();
        self
    }

    /// Sets the phone number.
    #[must_use]
    pub fn phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = phone_number.into();
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }
}
