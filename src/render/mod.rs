pub mod assembler;
pub mod messages;
pub mod orchestrator;
pub mod ports;
pub mod session;
pub mod worker_pool;
