pub mod base;
pub mod configs;
pub mod dashscope;
pub mod factory;
pub mod utils;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
