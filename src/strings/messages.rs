//! # Messages
//!
//! Sentences the robot speaks. Dialogue prompts can be overridden in `config.yaml`.

pub const REPEAT_PROMPT: &str = "Sorry, I didn't catch that. Could you please repeat that?";
pub const APOLOGY: &str =
    "Sorry, it was not possible to understand you. I will go to standby mode now.";
pub const ASK_NAME: &str = "What's your name?";

pub fn greeting(name: &str) -> String {
    format!("Oh hi {name}")
}
