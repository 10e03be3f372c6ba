//! Documented config template written by `chefjunior config init`.

use crate::schema::{
    DEFAULT_CHAT_MODEL, DEFAULT_OPENAI_BASE_URL, DEFAULT_TEMPERATURE, DEFAULT_WHISPER_MODEL,
};

/// Render the default config template for the given port.
pub fn default_config_template(port: u16) -> String {
    format!(
        r##"# ChefJunior Configuration
# ========================
# Changes require a restart to take effect.
#
# Environment variable substitution is supported: ${{ENV_VAR}}
# Example: api_key = "${{OPENAI_API_KEY}}"

[server]
bind = "127.0.0.1"          # "0.0.0.0" to listen on all interfaces
port = {port}
ws_request_logs = false     # Log inbound chat frame sizes (debugging)

[assistant]
model = "{DEFAULT_CHAT_MODEL}"
temperature = {DEFAULT_TEMPERATURE}
# persona_prompt = "You are 'Dwane', ..."
# greeting = "Hello! I'm Dwane, your personal cooking assistant. What would you like to cook today?"
# fallback_reply = "I'm sorry, something went wrong. Can you please ask me again?"
# transcription_fallback = "Sorry, I couldn't understand that recording. Can you try again?"

[providers.openai]
# api_key = "${{OPENAI_API_KEY}}"   # Defaults to the OPENAI_API_KEY env var
base_url = "{DEFAULT_OPENAI_BASE_URL}"

[voice.whisper]
model = "{DEFAULT_WHISPER_MODEL}"
# language = "en"
"##
    )
}
