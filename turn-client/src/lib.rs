#![warn(rust_2018_idioms)]
#![allow(dead_code)]

pub mod error;
pub mod proto;
pub mod session;

pub use error::Error;
pub use session::subscription::{Indication, Subscriber};
pub use session::{Session, SessionConfig};
