//! # Offering Types
//!
//! The single paid offering sold by the landing page, its price and the
//! presentational price card derived from it.
//! Loaded once at startup from `config/offering.toml`.

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};

/// Currencies accepted by the checkout widget (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    COP,
    USD,
}

impl Currency {
    /// Returns the ISO 4217 currency code as the widget expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::COP => "COP",
            Currency::USD => "USD",
        }
    }

    /// Parse an ISO code, case-insensitive
    pub fn parse(code: &str) -> PaymentResult<Self> {
        match code.trim().to_uppercase().as_str() {
            "COP" => Ok(Currency::COP),
            "USD" => Ok(Currency::USD),
            other => Err(PaymentError::UnsupportedCurrency {
                currency: other.to_string(),
            }),
        }
    }

    /// Number of minor-unit decimals. The widget takes both currencies in cents.
    pub fn decimal_places(&self) -> u8 {
        2
    }

    /// Convert from smallest unit back to decimal
    pub fn from_smallest_unit(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in cents
    pub amount: i64,
    pub currency: Currency,
}

impl Price {
    /// Create a price from smallest unit (cents)
    pub fn from_cents(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Get the decimal (major unit) amount
    pub fn as_decimal(&self) -> f64 {
        self.currency.from_smallest_unit(self.amount)
    }

    /// Reject zero and negative amounts
    pub fn validate(&self) -> PaymentResult<()> {
        if self.amount <= 0 {
            return Err(PaymentError::InvalidPrice {
                message: format!("amount must be positive, got {}", self.amount),
            });
        }
        Ok(())
    }

    /// Format for display (e.g., "450.000 COP")
    pub fn display(&self) -> String {
        format!("{} {}", format_grouped(self.as_decimal()), self.currency)
    }
}

/// Promotional discount shown on the price card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promo {
    /// Discount already applied to the offering price, in percent
    pub percentage: u8,
    /// Corner badge text
    #[serde(default)]
    pub label: Option<String>,
}

/// The paid offering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offering {
    /// Stable identifier (e.g., "experiencia-completa")
    pub id: String,

    /// Display name, also reported as the conversion `content_name`
    pub name: String,

    /// Conversion `content_category`
    #[serde(default = "default_category")]
    pub category: String,

    /// Conversion `content_type`
    #[serde(default = "default_content_type")]
    pub content_type: String,

    pub price: Price,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo: Option<Promo>,

    /// Seat cap shown on the card
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,

    /// Payment note (e.g., "Pago único")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_note: Option<String>,

    /// Bonus copy for the first buyers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus: Option<String>,
}

fn default_category() -> String {
    "experience".to_string()
}

fn default_content_type() -> String {
    "product".to_string()
}

impl Offering {
    /// Create an offering with default category and content type
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: default_category(),
            content_type: default_content_type(),
            price,
            promo: None,
            seats: None,
            payment_note: None,
            bonus: None,
        }
    }

    /// Builder: set promo
    pub fn with_promo(mut self, percentage: u8, label: Option<String>) -> Self {
        self.promo = Some(Promo { percentage, label });
        self
    }

    /// Builder: set seat cap
    pub fn with_seats(mut self, seats: u32) -> Self {
        self.seats = Some(seats);
        self
    }

    /// Validate price and promo
    pub fn validate(&self) -> PaymentResult<()> {
        self.price.validate()?;
        if let Some(promo) = &self.promo {
            if promo.percentage >= 100 {
                return Err(PaymentError::Configuration(format!(
                    "promo percentage must be below 100, got {}",
                    promo.percentage
                )));
            }
        }
        Ok(())
    }

    /// Price before the promo, rounded to the nearest thousand
    pub fn list_price(&self) -> Option<f64> {
        let promo = self.promo.as_ref()?;
        let undiscounted = self.price.as_decimal() / (1.0 - f64::from(promo.percentage) / 100.0);
        Some(round_to_magnitude(undiscounted, 3))
    }

    /// Build the presentational price card
    pub fn price_card(&self) -> PriceCard {
        PriceCard {
            name: self.name.clone(),
            amount_in_cents: self.price.amount,
            price: format_grouped(self.price.as_decimal()),
            currency: self.price.currency,
            list_price: self.list_price().map(format_grouped),
            discount_percentage: self.promo.as_ref().map(|p| p.percentage),
            promo_label: self.promo.as_ref().and_then(|p| p.label.clone()),
            seats: self.seats,
            payment_note: self.payment_note.clone(),
            bonus: self.bonus.clone(),
        }
    }
}

/// Price card copy as rendered on the landing page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceCard {
    pub name: String,
    pub amount_in_cents: i64,
    pub price: String,
    pub currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus: Option<String>,
}

/// WhatsApp contact used by the "reserve your seat" button
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsappContact {
    /// Number in international format without "+" (e.g., "573001234567")
    pub number: String,
    #[serde(default)]
    pub message: String,
}

/// Landing page configuration file (`config/offering.toml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingConfig {
    pub offering: Offering,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<WhatsappContact>,
}

impl LandingConfig {
    /// Load and validate from a TOML string
    pub fn from_toml(toml_str: &str) -> PaymentResult<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| PaymentError::Configuration(format!("invalid offering config: {}", e)))?;
        config.offering.validate()?;
        Ok(config)
    }
}

/// Group the integer part with "." and append "," decimals when non-zero (es-CO)
pub fn format_grouped(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let digits = (cents.abs() / 100).to_string();
    let frac = cents.abs() % 100;

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if cents < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if frac != 0 {
        grouped.push_str(&format!(",{:02}", frac));
    }
    grouped
}

/// Round to the nearest 10^magnitude
pub fn round_to_magnitude(value: f64, magnitude: i32) -> f64 {
    let factor = 10_f64.powi(magnitude);
    (value / factor).round() * factor
}
