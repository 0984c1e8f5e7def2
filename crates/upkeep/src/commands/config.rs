//! Config command: print the effective configuration

use anyhow::Result;
use camino::Utf8Path;
use upkeep_core::RuntimeConfig;

use crate::cli::ConfigArgs;
use crate::output;

const MASK: &str = "********";

pub fn run(args: ConfigArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let config = super::load_config(config_path)?;

    output::kv("package", &config.registry.package_id());
    output::kv("resource", &config.host.resource_id);
    println!();
    print!("{}", render(config, args.show_secrets)?);

    Ok(())
}

fn render(mut config: RuntimeConfig, show_secrets: bool) -> Result<String> {
    if !show_secrets {
        if let Some(token) = config.host.token.as_mut() {
            *token = MASK.to_string();
        }
    }
    Ok(serde_yaml_ng::to_string(&config)?)
}
