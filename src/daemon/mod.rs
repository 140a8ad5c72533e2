mod service;

pub use service::{check, run};
