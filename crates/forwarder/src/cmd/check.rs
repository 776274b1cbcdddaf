//! Check command - validate the configuration and describe what would run

use std::path::Path;

use anyhow::Result;
use sysfwd_filter::FilterEngine;
use sysfwd_pipeline::PipelineState;

use super::load_config;

/// Run the check command
pub fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    println!("config:   {}", config_path.display());
    println!("state:    {}", PipelineState::for_config(&config));
    if !config.enabled {
        println!("forwarding disabled, nothing would run");
        return Ok(());
    }

    let filter = FilterEngine::load(&config.filter.rules)?;

    println!(
        "drain:    {} ({}, {:?})",
        config.drain.address,
        config.drain.transport.as_str(),
        config.drain.framing
    );
    println!("sources:  {}", config.enabled_sources().join(", "));
    println!("instance: {}", config.instance.element_id());
    println!("filters:  {} rule(s)", filter.len());
    println!("ok");
    Ok(())
}
