pub mod error;
pub mod feature_flags;

// eVault domain modules
pub mod case;
pub mod notification;
pub mod user;

pub use error::*;
pub use feature_flags::*;

pub use case::*;
pub use notification::*;
pub use user::*;
