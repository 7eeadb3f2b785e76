//! Domain models for the PackTrace supply-chain platform

mod batch;
mod crates;
mod reconciliation;
mod session;
mod user;

pub use batch::*;
pub use crates::*;
pub use reconciliation::*;
pub use session::*;
pub use user::*;
