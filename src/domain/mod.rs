pub mod member;
pub mod payment;
pub mod donation;
pub mod certificate;

pub use member::*;
pub use payment::*;
pub use donation::*;
pub use certificate::*;
