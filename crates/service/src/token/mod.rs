pub mod clock;
pub mod errors;
pub mod service;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::TokenError;
pub use service::{Claims, TokenService};
