pub mod agent;
pub mod assembler;
pub mod catalog;
pub mod errors;
pub mod models;
pub mod prompt;
pub mod prompt_template;
pub mod providers;
pub mod session;
