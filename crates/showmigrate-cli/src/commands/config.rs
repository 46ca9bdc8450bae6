use super::prompts;
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use showmigrate_config::{Config, CredentialStore, PathManager, SerializdConfig, TraktConfig};
use showmigrate_sources::{trakt_authenticate, SerializdClient};

pub async fn run_config(cmd: crate::ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        crate::ConfigCommands::Show { full } => show_config(full, output),
        crate::ConfigCommands::Trakt { client_id, client_secret } => configure_trakt(client_id, client_secret, output).await,
        crate::ConfigCommands::Serializd { email } => configure_serializd(email, output).await,
        crate::ConfigCommands::Migration { delay_ms } => configure_migration(delay_ms, output),
    }
}

fn load_config(path_manager: &PathManager) -> Result<Config> {
    let config_file = path_manager.config_file();
    Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))
}

fn save_config(config: &Config, path_manager: &PathManager) -> Result<()> {
    let config_file = path_manager.config_file();
    config.save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))
}

pub fn load_credentials(path_manager: &PathManager) -> Result<CredentialStore> {
    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store.load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
    Ok(cred_store)
}

pub fn save_credentials(cred_store: &CredentialStore, path_manager: &PathManager) -> Result<()> {
    cred_store.save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials to {}: {}", path_manager.credentials_file().display(), e))
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Configuration will be created automatically when you run 'showmigrate config trakt' or 'showmigrate config serializd'.");
        return Ok(());
    }

    let config = load_config(&path_manager)?;
    let cred_store = load_credentials(&path_manager)?;
    let reveal = |s: &str| if full { s.to_string() } else { mask_string(s) };

    let token_expires = cred_store
        .get_trakt_token_expires()
        .map(|t| t.to_rfc3339());
    let has_password = cred_store.get_serializd_password().map_or(false, |p| !p.is_empty());

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            println!("\n{}", "╔════════════════════════════════════════════════════════════╗".bright_white());
            println!("{} {}", "║".bright_white(), "Configuration".bright_cyan().bold());
            println!("{}", "╚════════════════════════════════════════════════════════════╝".bright_white());
            println!();

            let mut info_table = styled_table();
            info_table.set_header(vec![
                Cell::new("Config File").add_attribute(comfy_table::Attribute::Bold),
                Cell::new(config_file.display().to_string()),
            ]);
            info_table.add_row(vec![
                Cell::new("Credentials File"),
                Cell::new(path_manager.credentials_file().display().to_string()),
            ]);
            println!("{}\n", info_table);

            if let Some(trakt) = &config.trakt {
                let mut trakt_table = section_table("Trakt Configuration");
                trakt_table.add_row(vec![Cell::new("Client ID"), Cell::new(reveal(&trakt.client_id))]);
                trakt_table.add_row(vec![Cell::new("Client Secret"), Cell::new(reveal(&trakt.client_secret))]);
                trakt_table.add_row(vec![Cell::new("API URL"), Cell::new(&trakt.base_url)]);
                trakt_table.add_row(vec![
                    Cell::new("Access Token"),
                    Cell::new(match cred_store.get_trakt_access_token() {
                        Some(token) => reveal(token),
                        None => "<not authorized>".to_string(),
                    }),
                ]);
                if let Some(expires) = &token_expires {
                    trakt_table.add_row(vec![Cell::new("Token Expires"), Cell::new(expires)]);
                }
                println!("{}\n", trakt_table);
            } else {
                println!("{}\n", "Trakt: Not configured".bright_black());
            }

            if let Some(serializd) = &config.serializd {
                let mut serializd_table = section_table("Serializd Configuration");
                serializd_table.add_row(vec![Cell::new("Email"), Cell::new(reveal(&serializd.email))]);
                serializd_table.add_row(vec![Cell::new("API URL"), Cell::new(&serializd.base_url)]);
                serializd_table.add_row(vec![
                    Cell::new("Password"),
                    Cell::new(if has_password { "✓".green().to_string() } else { "✗".red().to_string() }),
                ]);
                println!("{}\n", serializd_table);
            } else {
                println!("{}\n", "Serializd: Not configured".bright_black());
            }

            let mut migration_table = section_table("Migration Options");
            migration_table.add_row(vec![
                Cell::new("Delay Between Requests"),
                Cell::new(format!("{} ms", config.migration.delay_ms)),
            ]);
            migration_table.add_row(vec![
                Cell::new("Log File"),
                Cell::new(
                    config.migration.log_file
                        .clone()
                        .unwrap_or_else(|| path_manager.migration_log_file())
                        .display()
                        .to_string(),
                ),
            ]);
            println!("{}", migration_table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let json_config = json!({
                "config_file": config_file.display().to_string(),
                "trakt": config.trakt.as_ref().map(|t| json!({
                    "client_id": reveal(&t.client_id),
                    "client_secret": reveal(&t.client_secret),
                    "base_url": t.base_url,
                    "authorized": cred_store.get_trakt_access_token().is_some(),
                    "token_expires": token_expires,
                })),
                "serializd": config.serializd.as_ref().map(|s| json!({
                    "email": reveal(&s.email),
                    "base_url": s.base_url,
                    "password_saved": has_password,
                })),
                "migration": {
                    "delay_ms": config.migration.delay_ms,
                    "log_file": config.migration.log_file.as_ref().map(|p| p.display().to_string()),
                },
            });
            output.json(&json_config);
        }
    }

    Ok(())
}

/// Ask for the Trakt application credentials, keeping existing values as defaults
fn prompt_trakt_app(
    existing: Option<&TraktConfig>,
    client_id_arg: Option<String>,
    client_secret_arg: Option<String>,
    output: &Output,
) -> Result<(String, String)> {
    let existing_id = existing
        .map(|t| t.client_id.as_str())
        .filter(|id| !id.is_empty() && *id != "YOUR_CLIENT_ID");
    let client_id = match client_id_arg {
        Some(id) => id,
        None => loop {
            let input = prompts::prompt_string("Trakt Client ID", existing_id)?;
            match validate_client_id(input.trim()) {
                Ok(()) => break input.trim().to_string(),
                Err(e) => {
                    output.error(format!("Validation error: {}", e));
                    output.info("You can find your Client ID at: https://trakt.tv/oauth/applications");
                }
            }
        },
    };

    let has_secret = existing.map_or(false, |t| !t.client_secret.is_empty() && t.client_secret != "YOUR_CLIENT_SECRET");
    let client_secret = match client_secret_arg {
        Some(secret) => secret,
        None => loop {
            let input = prompts::prompt_password("Trakt Client Secret", !has_secret)?;
            if input.is_empty() && has_secret {
                if let Some(trakt) = existing {
                    break trakt.client_secret.clone();
                }
            }
            match validate_secret(&input) {
                Ok(()) => break input,
                Err(e) => {
                    output.error(format!("Validation error: {}", e));
                    output.info("The Client Secret will be hidden as you type.");
                }
            }
        },
    };

    if client_id.is_empty() || client_secret.is_empty() {
        return Err(color_eyre::eyre::eyre!("Client ID and Client Secret are required"));
    }

    Ok((client_id, client_secret))
}

async fn configure_trakt(client_id_arg: Option<String>, client_secret_arg: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager.ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let mut config = load_config(&path_manager)?;

    print_section_header("Trakt API Setup", output);
    output.println("");
    output.println("Follow the instructions to setup your Trakt API application:");
    print_instruction_list(&[
        "Login to Trakt and navigate to your API apps page: https://trakt.tv/oauth/applications",
        "Create a new API application named 'showmigrate'",
        "Use 'urn:ietf:wg:oauth:2.0:oob' as the Redirect URI",
    ], output);
    output.println("");

    let (client_id, client_secret) = prompt_trakt_app(config.trakt.as_ref(), client_id_arg, client_secret_arg, output)?;

    let trakt_config = config
        .trakt
        .get_or_insert_with(|| TraktConfig::new(String::new(), String::new()));
    trakt_config.client_id = client_id.clone();
    trakt_config.client_secret = client_secret.clone();
    let base_url = trakt_config.base_url.clone();
    save_config(&config, &path_manager)?;

    let mut cred_store = load_credentials(&path_manager)?;
    // New application credentials invalidate any token issued to the old ones
    cred_store.clear_trakt_tokens();

    output.println("");
    print_oauth_progress("Starting Trakt device authorization...", output);
    let token_info = trakt_authenticate(&base_url, &client_id, &client_secret).await
        .map_err(|e| color_eyre::eyre::eyre!("Trakt authentication failed: {}", e))?;
    print_oauth_progress("Authentication successful! Saving credentials...", output);

    cred_store.set_trakt_access_token(token_info.access_token);
    cred_store.set_trakt_token_expires(token_info.expires_at);
    save_credentials(&cred_store, &path_manager)?;

    output.println("");
    output.success("Trakt authentication successful!");
    output.println(format!("  Access token expires at: {}", token_info.expires_at.to_rfc3339().bright_green()));

    Ok(())
}

fn prompt_serializd_email(existing: Option<&str>, output: &Output) -> Result<String> {
    loop {
        let input = prompts::prompt_string("Serializd Email", existing)?;
        match validate_email(input.trim()) {
            Ok(()) => return Ok(input.trim().to_string()),
            Err(e) => output.error(format!("Validation error: {}", e)),
        }
    }
}

fn prompt_serializd_password(output: &Output) -> Result<String> {
    loop {
        let input = prompts::prompt_password("Serializd Password", false)?;
        if input.is_empty() {
            output.error("Validation error: Password cannot be empty");
            continue;
        }
        return Ok(input);
    }
}

async fn configure_serializd(email_arg: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager.ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let mut config = load_config(&path_manager)?;

    print_section_header("Serializd Credentials Setup", output);
    output.println("");

    let email = match email_arg {
        Some(email) => email,
        None => prompt_serializd_email(config.serializd.as_ref().map(|s| s.email.as_str()), output)?,
    };
    if email.trim().is_empty() {
        return Err(color_eyre::eyre::eyre!("Email is required"));
    }
    let password = prompt_serializd_password(output)?;

    let serializd_config = config
        .serializd
        .get_or_insert_with(|| SerializdConfig::new(String::new()));
    serializd_config.email = email.clone();
    let base_url = serializd_config.base_url.clone();

    print_oauth_progress("Verifying Serializd login...", output);
    let mut client = SerializdClient::new().with_base_url(base_url);
    client.login(&email, &password).await
        .map_err(|e| color_eyre::eyre::eyre!("Serializd login failed: {}", e))?;

    save_config(&config, &path_manager)?;
    let mut cred_store = load_credentials(&path_manager)?;
    cred_store.set_serializd_password(password);
    save_credentials(&cred_store, &path_manager)?;

    output.success("Serializd credentials saved!");
    output.println(format!("  Email: {}", email));

    Ok(())
}

fn configure_migration(delay_ms_arg: Option<u64>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let mut config = load_config(&path_manager)?;

    print_section_header("Migration Options", output);
    output.println("");
    output.println("Requests are paced with a fixed pause to stay within the services' rate limits.");
    output.println("");

    config.migration.delay_ms = match delay_ms_arg {
        Some(ms) => ms,
        None => prompts::prompt_number(
            "Pause between requests (milliseconds)",
            Some(config.migration.delay_ms),
            output,
        )?,
    };
    save_config(&config, &path_manager)?;

    output.success(format!("Migration delay set to {} ms", config.migration.delay_ms));
    Ok(())
}

/// Load the config for a migration, prompting for whatever is missing.
///
/// The Serializd password is only prompted for when the credential store has none.
pub fn load_config_or_prompt(
    path_manager: &PathManager,
    cred_store: &mut CredentialStore,
    output: &Output,
) -> Result<Config> {
    let mut config = load_config(path_manager)?;
    let mut changed = false;

    if !config.is_trakt_configured() {
        output.warn("Trakt API credentials are not configured.");
        let (client_id, client_secret) = prompt_trakt_app(config.trakt.as_ref(), None, None, output)?;
        let trakt_config = config
            .trakt
            .get_or_insert_with(|| TraktConfig::new(String::new(), String::new()));
        trakt_config.client_id = client_id;
        trakt_config.client_secret = client_secret;
        changed = true;
    }

    if !config.is_serializd_configured() {
        output.warn("Serializd account is not configured.");
        let email = prompt_serializd_email(None, output)?;
        config
            .serializd
            .get_or_insert_with(|| SerializdConfig::new(String::new()))
            .email = email;
        changed = true;
    }

    if changed {
        path_manager.ensure_directories()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;
        save_config(&config, path_manager)?;
        output.info("Configuration saved.");
    }

    if cred_store.get_serializd_password().map_or(true, |p| p.is_empty()) {
        let password = prompt_serializd_password(output)?;
        cred_store.set_serializd_password(password);
        save_credentials(cred_store, path_manager)?;
    }

    config.validate()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration validation failed: {}", e))?;

    Ok(config)
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s == "YOUR_CLIENT_ID" || s == "YOUR_CLIENT_SECRET" {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    format!(
        "{}***{}",
        chars[..2].iter().collect::<String>(),
        chars[chars.len() - 2..].iter().collect::<String>()
    )
}

// Validation helpers

/// Validates Trakt Client ID format
fn validate_client_id(input: &str) -> Result<(), &'static str> {
    if input.is_empty() {
        return Err("Client ID cannot be empty");
    }
    if input.len() < 10 {
        return Err("Client ID seems too short. Please verify it's correct.");
    }
    Ok(())
}

fn validate_secret(input: &str) -> Result<(), &'static str> {
    if input.is_empty() {
        return Err("Client Secret cannot be empty");
    }
    if input.len() < 6 {
        return Err("Client Secret must be at least 6 characters long");
    }
    Ok(())
}

fn validate_email(input: &str) -> Result<(), &'static str> {
    if input.is_empty() {
        return Err("Email cannot be empty");
    }
    match input.split_once('@') {
        Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(()),
        _ => Err("Please enter a valid email address"),
    }
}

// Formatting helpers

fn styled_table() -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn section_table(title: &str) -> Table {
    let mut table = styled_table();
    table.set_header(vec![
        Cell::new(title).fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
    ]);
    table
}

/// Print a formatted section header
fn print_section_header(title: &str, output: &Output) {
    output.println("");
    output.println(format!("{}", title.bold().bright_cyan()));
    output.println(format!("{}", "─".repeat(title.len()).bright_cyan()));
}

/// Print a numbered instruction list
fn print_instruction_list(items: &[&str], output: &Output) {
    for (idx, item) in items.iter().enumerate() {
        output.println(format!("  {}. {}", idx + 1, item));
    }
}

fn print_oauth_progress(message: &str, output: &Output) {
    output.println(format!("{} {}", "→".bright_blue(), message.bright_white()));
}
