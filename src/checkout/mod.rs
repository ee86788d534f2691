//! Checkout
//!
//! Converts a mutable, price-volatile cart into an immutable order. The
//! request types and their field validation live here; the pure pricing pass
//! is in [`pricing`] and the atomic orchestration in [`coordinator`].

use thiserror::Error;

pub mod coordinator;
pub mod pricing;

/// Errors from malformed checkout input.
///
/// Recoverable by re-prompting the form; validation happens before any read
/// or write, so a rejected request has no effect at all.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The customer name is empty.
    #[error("customer name must not be empty")]
    MissingName,

    /// The customer email is not plausibly an email address.
    #[error("invalid customer email: {0}")]
    InvalidEmail(String),

    /// The street line of the shipping address is empty.
    #[error("shipping street must not be empty")]
    MissingStreet,

    /// The city of the shipping address is empty.
    #[error("shipping city must not be empty")]
    MissingCity,

    /// The region of the shipping address is empty.
    #[error("shipping region must not be empty")]
    MissingRegion,

    /// The postal code of the shipping address is empty.
    #[error("shipping postal code must not be empty")]
    MissingPostalCode,

    /// The country of the shipping address is empty.
    #[error("shipping country must not be empty")]
    MissingCountry,

    /// The payment method label is empty.
    #[error("payment method must not be empty")]
    MissingPaymentMethod,
}

/// Customer contact details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInfo {
    /// Full name.
    pub name: String,

    /// Contact email.
    pub email: String,

    /// Optional contact phone number.
    pub phone: Option<String>,
}

/// Shipping address captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    /// Street and number.
    pub street: String,

    /// City.
    pub city: String,

    /// Region.
    pub region: String,

    /// Postal code.
    pub postal_code: String,

    /// Country code or name.
    pub country: String,

    /// Optional delivery notes (apartment, gate code, ...).
    pub additional_info: Option<String>,
}

/// A checkout request.
///
/// The payment method is a free-form label at this layer; gateway
/// integration happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// Customer contact details.
    pub customer: CustomerInfo,

    /// Where to ship the order.
    pub shipping_address: ShippingAddress,

    /// Payment method label.
    pub payment_method: String,
}

impl CheckoutRequest {
    /// Checks the request fields.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, field by field in
    /// declaration order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.customer.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        let email = self.customer.email.trim();
        let plausible_email = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !plausible_email {
            return Err(ValidationError::InvalidEmail(self.customer.email.clone()));
        }
        if self.shipping_address.street.trim().is_empty() {
            return Err(ValidationError::MissingStreet);
        }
        if self.shipping_address.city.trim().is_empty() {
            return Err(ValidationError::MissingCity);
        }
        if self.shipping_address.region.trim().is_empty() {
            return Err(ValidationError::MissingRegion);
        }
        if self.shipping_address.postal_code.trim().is_empty() {
            return Err(ValidationError::MissingPostalCode);
        }
        if self.shipping_address.country.trim().is_empty() {
            return Err(ValidationError::MissingCountry);
        }
        if self.payment_method.trim().is_empty() {
            return Err(ValidationError::MissingPaymentMethod);
        }
        Ok(())
    }
}
