//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::{Input, Select};

use prepwise_api::Service;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const SERVICES: [Service; 4] = [
    Service::OpenWeather,
    Service::Gemini,
    Service::ImageSearch,
    Service::AirQuality,
];

const MASK: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

fn parse_service(raw: &str) -> Result<Service, CliError> {
    let raw = raw.trim();
    SERVICES
        .into_iter()
        .find(|s| s.key_name().eq_ignore_ascii_case(raw))
        .ok_or_else(|| {
            CliError::validation(
                "service",
                format!("unknown service '{raw}' (weather, gemini, search, maps)"),
            )
        })
}

/// Mask every plaintext key so the config can be shown safely.
fn redacted(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        for service in SERVICES {
            if profile.keys.get(service).is_some() {
                profile.keys.set(service, Some(MASK.into()));
            }
        }
    }
    cfg
}

fn require_terminal(action: &str) -> Result<(), CliError> {
    if std::io::stdin().is_terminal() {
        Ok(())
    } else {
        Err(CliError::validation(
            "interactive",
            format!("{action} needs an interactive terminal"),
        ))
    }
}

fn optional_coordinate(prompt: &str, range: f64) -> Result<Option<f64>, CliError> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), String> {
            if input.trim().is_empty() {
                return Ok(());
            }
            match input.trim().parse::<f64>() {
                Ok(v) if (-range..=range).contains(&v) => Ok(()),
                _ => Err(format!("enter a number between -{range} and {range}")),
            }
        })
        .interact_text()
        .map_err(prompt_err)?;
    Ok(raw.trim().parse().ok())
}

fn store_key(
    cfg: &mut Config,
    profile_name: &str,
    service: Service,
    secret: String,
    plaintext: bool,
) -> Result<(), CliError> {
    if plaintext {
        cfg.profiles
            .entry(profile_name.to_owned())
            .or_default()
            .keys
            .set(service, Some(secret));
    } else {
        config::store_service_key(profile_name, service, &secret)?;
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            require_terminal("config init")?;
            let config_path = config::config_path();
            eprintln!("prepwise configuration");
            eprintln!("   Config path: {}\n", config_path.display());

            let mut cfg = config::load_config_or_default();

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Backend
            let backend: String = Input::new()
                .with_prompt("Backend API URL")
                .default(Profile::default().backend)
                .validate_with(|input: &String| -> Result<(), String> {
                    url::Url::parse(input.trim())
                        .map(|_| ())
                        .map_err(|e| format!("not a URL: {e}"))
                })
                .interact_text()
                .map_err(prompt_err)?;

            // 3. Home location
            let latitude = optional_coordinate("Home latitude (blank to skip)", 90.0)?;
            let longitude = match latitude {
                Some(_) => optional_coordinate("Home longitude", 180.0)?,
                None => None,
            };
            if latitude.is_some() != longitude.is_some() {
                return Err(CliError::validation(
                    "location",
                    "set both latitude and longitude, or neither",
                ));
            }

            // 4. Where keys go
            let store_choices = &[
                "Store keys in system keyring (recommended)",
                "Save keys to config file (plaintext)",
            ];
            let plaintext = Select::new()
                .with_prompt("Where to store service API keys?")
                .items(store_choices)
                .default(usize::from(!cfg.defaults.keyring))
                .interact()
                .map_err(prompt_err)?
                == 1;

            let profile = Profile {
                backend: backend.trim().to_owned(),
                latitude,
                longitude,
                ..cfg.profiles.get(&profile_name).cloned().unwrap_or_default()
            };
            cfg.profiles.insert(profile_name.clone(), profile);

            // 5. Service keys
            for service in SERVICES {
                let secret = rpassword::prompt_password(format!(
                    "{} API key (blank to skip): ",
                    service.display_name()
                ))
                .map_err(prompt_err)?;
                if secret.trim().is_empty() {
                    continue;
                }
                store_key(&mut cfg, &profile_name, service, secret, plaintext)?;
                eprintln!("   ✓ {} key saved", service.display_name());
            }

            if cfg.profiles.len() == 1 || cfg.default_profile.is_none() {
                cfg.default_profile = Some(profile_name.clone());
            }

            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: prepwise status");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(config::load_config_or_default());
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| serde_yaml::to_string(c).unwrap_or_else(|e| format!("<unprintable: {e}>")),
                |c| c.default_profile.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── SetKey ──────────────────────────────────────────────────
        ConfigCommand::SetKey { service, plaintext } => {
            let service = parse_service(&service)?;
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let secret = match std::env::var(prepwise_config::key_env_var(service)) {
                Ok(value) if !value.is_empty() && !std::io::stdin().is_terminal() => value,
                _ => {
                    require_terminal("config set-key")?;
                    rpassword::prompt_password(format!("{} API key: ", service.display_name()))
                        .map_err(prompt_err)?
                }
            };
            if secret.trim().is_empty() {
                return Err(CliError::validation("key", "value cannot be empty"));
            }

            let plaintext = plaintext || !cfg.defaults.keyring;
            store_key(&mut cfg, &profile_name, service, secret, plaintext)?;
            if plaintext {
                config::save_config(&cfg)?;
                eprintln!(
                    "✓ {} key written to {} for profile '{profile_name}'",
                    service.display_name(),
                    config::config_path().display()
                );
            } else {
                eprintln!(
                    "✓ {} key stored in system keyring for profile '{profile_name}'",
                    service.display_name()
                );
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = config::active_profile_name(global, &cfg);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: prepwise config init");
            } else {
                let lines: Vec<String> = cfg
                    .profile_names()
                    .into_iter()
                    .map(|name| {
                        let marker = if name == default { " *" } else { "" };
                        format!("{name}{marker}")
                    })
                    .collect();
                output::print_output(&lines.join("\n"), global.quiet);
            }
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: config::available_profiles(&cfg),
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }
    }
}
