use crate::output::Output;
use color_eyre::Result;
use dialoguer::{Confirm, Input, Password};

/// Prompt for a string value with optional default
pub fn prompt_string(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input_builder = Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true);

    if let Some(default_value) = default {
        input_builder = input_builder.default(default_value.to_string());
    }

    input_builder.interact().map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
}

/// Prompt for a password (masked input), optionally asking for it twice
pub fn prompt_password(prompt: &str, confirm: bool) -> Result<String> {
    let mut password_prompt = Password::new().with_prompt(prompt);
    if confirm {
        password_prompt = password_prompt.with_confirmation(format!("Confirm {}", prompt), "Passwords do not match");
    }

    password_prompt
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read password: {}", e))
}

/// Prompt for yes/no with optional default
pub fn prompt_yes_no(prompt: &str, default: Option<bool>, output: &Output) -> Result<bool> {
    let mut confirm_builder = Confirm::new().with_prompt(prompt);

    if let Some(default_value) = default {
        confirm_builder = confirm_builder.default(default_value);
    }

    confirm_builder.interact().map_err(|e| {
        output.error(format!("Failed to read confirmation: {}", e));
        color_eyre::eyre::eyre!("Failed to read confirmation: {}", e)
    })
}

/// Prompt for a number, re-asking until the input parses
pub fn prompt_number(prompt: &str, default: Option<u64>, output: &Output) -> Result<u64> {
    loop {
        let mut input_builder = Input::<String>::new().with_prompt(prompt);

        if let Some(default_value) = default {
            input_builder = input_builder.default(default_value.to_string());
        }

        let input_str = input_builder.interact().map_err(|e| {
            output.error(format!("Failed to read input: {}", e));
            color_eyre::eyre::eyre!("Failed to read input: {}", e)
        })?;

        let trimmed = input_str.trim();
        if trimmed.is_empty() {
            if let Some(default_value) = default {
                return Ok(default_value);
            }
        } else if let Ok(num) = trimmed.parse::<u64>() {
            return Ok(num);
        }

        output.error("Invalid input. Please enter a valid number.");
    }
}
