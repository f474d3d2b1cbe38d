pub mod cli;
pub mod configuration;
pub mod console;
pub mod probe;
pub mod rpc;
pub mod telemetry;
pub mod validation;
