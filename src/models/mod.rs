pub mod analysis;
pub mod patient;
pub mod session;
pub mod user;

pub use analysis::*;
pub use patient::*;
pub use session::*;
pub use user::*;
