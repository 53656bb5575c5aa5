//! The `studybuddy list-models` command.

use std::path::PathBuf;

use anyhow::Result;

use studybuddy_providers::config::load_config_from;
use studybuddy_providers::create_provider;

pub fn execute(provider_filter: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();

    if let Some(filter) = &provider_filter {
        anyhow::ensure!(
            names.iter().any(|n| *n == filter),
            "provider '{filter}' not found in config. Available: {names:?}"
        );
    }

    let mut found_any = false;

    for name in names {
        if provider_filter.as_ref().is_some_and(|f| f != name) {
            continue;
        }

        let provider = create_provider(&config.providers[name])?;
        let models = provider.available_models();

        if !models.is_empty() {
            found_any = true;
            let marker = if *name == config.default_provider {
                " (default)"
            } else {
                ""
            };
            println!("Provider: {name}{marker}");
            for model in &models {
                let vision = if model.vision { " [vision]" } else { "" };
                println!("  {} - {}{vision}", model.id, model.name);
            }
            println!();
        }
    }

    if !found_any {
        println!("No providers configured. Run `studybuddy init` to create a config file.");
    }

    Ok(())
}
