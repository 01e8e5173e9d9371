//! # Greet Command
//!
//! Asks the user's name and greets them. A failed conversation ends with an
//! apology and is restarted, a bounded number of times.

use anyhow::Result;
use tracing::{info, warn};

use crate::application::dialogue::Dialogue;
use crate::domain::config::DialogueConfig;
use crate::domain::error::DialogueError;
use crate::strings::{logs, messages};

pub const NAME_CONTEXT: &str = "answer_name";

/// Returns the understood name, or `None` when every conversation failed or
/// the session shut down.
pub async fn handle_greet(dialogue: &Dialogue, config: &DialogueConfig) -> Result<Option<String>> {
    let mut restarts = 0;
    loop {
        let answer = dialogue
            .ask(messages::ASK_NAME, NAME_CONTEXT, config.attempts, config.timeout())
            .await;

        match answer {
            Ok(args) => {
                let name = args.join(" ");
                info!(%name, "user introduced themselves");
                dialogue.robot().say(&messages::greeting(&name)).await?;
                return Ok(Some(name));
            }
            Err(DialogueError::TurnFailed { .. }) => {
                dialogue.robot().speak(&config.apology, None, true).await?;
                if restarts >= config.restarts {
                    return Ok(None);
                }
                restarts += 1;
                warn!("{}", logs::turn_restart(restarts, config.restarts));
            }
            Err(DialogueError::Cancelled) => {
                info!("greeting interrupted by shutdown");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        }
    }
}
