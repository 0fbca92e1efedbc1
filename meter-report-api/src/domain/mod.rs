pub mod attachment;
pub mod auth;
pub mod envelope;
pub mod enums;
pub mod request;

pub use attachment::*;
pub use auth::*;
pub use envelope::*;
pub use enums::*;
pub use request::*;
