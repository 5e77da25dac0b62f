//! Config subcommand handlers.

use std::collections::HashMap;

use gocoax_config::{Config, config_path, render_config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::resolve_profile;
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // Defaults plus the one profile in effect, overrides applied.
        ConfigCommand::Show => {
            let resolved = resolve_profile(global, cfg)?;
            let shown = Config {
                default_profile: Some(resolved.name.clone()),
                defaults: cfg.defaults.clone(),
                profiles: HashMap::from([(resolved.name, resolved.profile.redacted())]),
            };
            output::print_output(&render_config(&shown)?, global.quiet);
            Ok(())
        }
    }
}
