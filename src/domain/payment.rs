use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gateway surcharge applied on top of fee + donation.
pub const GATEWAY_CHARGE_RATE: f64 = 0.02;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    /// Null for standalone donation payments.
    pub member_id: Option<Uuid>,
    pub amount: f64,
    pub membership_fee: f64,
    pub gateway_charges: f64,
    pub donation_amount: f64,
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Registration,
    Renewal,
    Donation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// Fee breakdown fixed at payment creation. Amounts are rupees with paise
/// precision; the gateway itself is always quoted in integer paise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeBreakdown {
    pub membership_fee: f64,
    pub gateway_charges: f64,
    pub donation_amount: f64,
    pub total: f64,
}

impl FeeBreakdown {
    pub fn quote(membership_fee: f64, donation_amount: f64) -> Self {
        let gateway_charges = round2(GATEWAY_CHARGE_RATE * (membership_fee + donation_amount));
        let total = round2(membership_fee + gateway_charges + donation_amount);
        Self {
            membership_fee,
            gateway_charges,
            donation_amount,
            total,
        }
    }

    /// Total in minor currency units, as the gateway expects.
    pub fn total_paise(&self) -> i64 {
        (self.total * 100.0).round() as i64
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn rupees_to_paise(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_adds_two_percent_surcharge() {
        let quote = FeeBreakdown::quote(500.0, 0.0);
        assert!((quote.gateway_charges - 10.0).abs() < 0.01);
        assert!((quote.total - 510.0).abs() < 0.01);
        assert_eq!(quote.total_paise(), 51000);
    }

    #[test]
    fn quote_includes_donation_in_surcharge_base() {
        let quote = FeeBreakdown::quote(500.0, 250.0);
        assert!((quote.gateway_charges - 15.0).abs() < 0.01);
        assert!((quote.total - 765.0).abs() < 0.01);
    }

    #[test]
    fn quote_rounds_to_paise() {
        // 2% of 500.55 = 10.011, rounds to 10.01
        let quote = FeeBreakdown::quote(500.55, 0.0);
        assert!((quote.gateway_charges - 10.01).abs() < 0.001);
        assert!((quote.total - (500.55 + 10.01)).abs() < 0.001);
    }

    #[test]
    fn breakdown_components_sum_to_total() {
        for donation in [0.0, 1.0, 99.99, 1234.56] {
            let quote = FeeBreakdown::quote(500.0, donation);
            let sum = quote.membership_fee + quote.gateway_charges + quote.donation_amount;
            assert!((quote.total - sum).abs() < 0.01);
        }
    }
}
