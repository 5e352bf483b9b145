use lawdesk_core::FirmProfile;
use std::path::Path;
use tokio::fs;

pub const INSTRUCTIONS_FILE: &str = "system_instructions.md";
pub const TRAINING_FILE: &str = "training_script.md";
const TRAINING_SEPARATOR: &str = "\n\n--- Additional Training Context ---\n";

/// Compose the system prompt from the prompt directory. Both documents must
/// be readable; otherwise the firm's default prompt is used.
pub async fn load_system_prompt(prompt_dir: &Path, firm: &FirmProfile) -> String {
    let instructions = fs::read_to_string(prompt_dir.join(INSTRUCTIONS_FILE)).await;
    let training = fs::read_to_string(prompt_dir.join(TRAINING_FILE)).await;

    match (instructions, training) {
        (Ok(instructions), Ok(training)) => {
            format!("{instructions}{TRAINING_SEPARATOR}{training}")
        }
        (Err(e), _) | (_, Err(e)) => {
            log::info!(
                "Using default system prompt ({}: {})",
                prompt_dir.display(),
                e
            );
            firm.default_system_prompt()
        }
    }
}
