pub mod app;
pub mod certificate;
pub mod user;

pub use app::*;
pub use certificate::*;
pub use user::*;
