pub mod razorpay;
pub mod signature;

pub use razorpay::{
    DisabledGateway, PaymentCallback, PaymentGateway, RazorpayGateway, MIN_ORDER_AMOUNT_PAISE,
};
pub use signature::{sign_payment, verify_payment_signature, VerificationError};
