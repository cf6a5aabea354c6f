use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use wrapp_startup::{
    Context, Initializer, StartupBuilder, StartupError, StartupHandle, StartupRegistry,
    StaticMetadata, TypeInfo, DEFAULT_MARKER,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let registry = StartupRegistry::get_instance(|| {
        let mut context = Context::new();
        context
            .insert(AppConfig {
                app_name: "wrapp-startup demo".to_string(),
            })
            .unwrap();

        StartupBuilder::new()
            .register::<ConfigInit>()
            .register::<GreeterInit>()
            .alias::<GreeterInit>("demo.Greeter")
            .context(context)
            .metadata(StaticMetadata::new().entry("demo.Greeter", DEFAULT_MARKER))
    })
    .unwrap();

    registry.discover_and_initialize().unwrap();
    println!("{:?}", registry);

    let greeter = registry.initialize::<GreeterInit>().unwrap();
    println!("{} (config: {})", greeter.greeting, greeter.config.name)
}

struct AppConfig {
    app_name: String,
}

#[derive(Debug)]
struct Config {
    name: String,
}

#[derive(Default)]
struct ConfigInit;
impl Initializer for ConfigInit {
    type Output = Config;

    fn create(&self, handle: &mut StartupHandle<'_>) -> Result<Self::Output, &'static str> {
        let app_config = handle
            .context()
            .get::<AppConfig>()
            .ok_or("AppConfig missing in context")?;
        Ok(Config {
            name: app_config.app_name.clone(),
        })
    }
}

#[derive(Debug)]
struct Greeter {
    config: Arc<Config>,
    greeting: String,
}

#[derive(Default)]
struct GreeterInit;
impl Initializer for GreeterInit {
    type Output = Greeter;

    fn dependencies(&self) -> Vec<TypeInfo> {
        vec![ConfigInit::key()]
    }

    fn create(&self, handle: &mut StartupHandle<'_>) -> Result<Self::Output, StartupError> {
        let config = handle.initialize::<ConfigInit>()?;
        Ok(Greeter {
            greeting: format!("Hello from {}", config.name),
            config,
        })
    }
}
