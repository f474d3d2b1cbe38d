use crate::console::commands::{load_settings, CallableTrait};
use crate::console::render;

/// `nodeprobe endpoints [--config FILE]`
///
/// Prints the endpoint chain the probe would walk.
pub struct EndpointsCommand {
    pub config: Option<String>,
}

impl EndpointsCommand {
    pub fn new(config: Option<String>) -> Self {
        Self { config }
    }
}

impl CallableTrait for EndpointsCommand {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>> {
        let settings = load_settings(self.config.as_deref())?;
        println!("{}", render::render_endpoints(&settings));
        println!(
            "   Timeout: {} ms, interval: {} ms",
            settings.monitoring.timeout_ms, settings.monitoring.block_interval_ms
        );
        Ok(())
    }
}
