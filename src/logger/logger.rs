use anyhow::{Result, anyhow};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

pub struct LogConfig {
    pub filter: String,
}

pub struct Logger {
    reload_handle: reload::Handle<EnvFilter, Registry>,
}

impl Logger {
    /// Installs the global subscriber with an `info` filter until settings are
    /// loaded. Logs go to stderr; stdout carries command output.
    pub fn new_bootstrap() -> Result<Self> {
        let filter = EnvFilter::new("info");
        let (filter, reload_handle) = reload::Layer::new(filter);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow!(e))?;

        Ok(Self { reload_handle })
    }

    pub fn reload_from_config(&self, config: &LogConfig) -> Result<()> {
        let filter = EnvFilter::try_new(&config.filter).map_err(|e| anyhow!(e))?;
        self.reload_handle.reload(filter).map_err(|e| anyhow!(e))?;
        Ok(())
    }
}
