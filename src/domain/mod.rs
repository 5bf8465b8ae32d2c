pub mod furniture;
pub mod order;
pub mod timestamp;
pub mod user;

pub use furniture::*;
pub use order::*;
pub use user::*;
