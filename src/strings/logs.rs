pub const STARTING: &str = "Starting Marionette...";
pub const SHUTDOWN: &str = "Shutting down...";
pub const CONFIG_PARSE_ERROR: &str = "Failed to parse YAML";

pub fn config_read_fail(path: &str) -> String {
    format!("Failed to read {path}")
}

pub fn bus_connecting(url: &str) -> String {
    format!("Connecting to bus at {url}...")
}

pub const BUS_SIMULATED: &str = "Using in-memory bus with a simulated robot backend";

pub fn subscribed(count: usize) -> String {
    format!("Subscribed to {count} topics, dispatch loop running")
}

pub const DISPATCH_STOPPED: &str = "Dispatch loop stopped";
pub const DISPATCH_FAILED: &str = "Dispatch loop failed";

pub fn dispatch_failed(err: &str) -> String {
    format!("Dispatch loop stopped on bus failure: {err}")
}

pub fn language_timeout(key: &str) -> String {
    format!("Language change to {key} was not confirmed in time, continuing")
}

pub fn key_file_read_fail(path: &str) -> String {
    format!("Failed to read Dialogflow key file {path}")
}

pub fn turn_restart(attempt: u32, max: u32) -> String {
    format!("Conversation failed, restarting ({attempt}/{max})")
}
