pub mod http;
mod relay;

pub use relay::*;
