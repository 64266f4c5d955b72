use std::sync::{Arc, Mutex};

use uplink_server::{CommandMessage, SessionId, UplinkError, UplinkLane};

/// Lane double recording forwarded commands, closures & failures
#[derive(Default)]
pub struct TestLane {
    commands: Mutex<Vec<CommandMessage>>,
    closed: Mutex<Vec<SessionId>>,
    failures: Mutex<Vec<UplinkError>>,
    messages: Mutex<Vec<String>>,
}

impl TestLane {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn commands(&self) -> Vec<CommandMessage> {
        self.commands.lock().unwrap().clone()
    }

    pub fn closed(&self) -> Vec<SessionId> {
        self.closed.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<UplinkError> {
        self.failures.lock().unwrap().clone()
    }

    /// Messages logged through the `info` sink
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl UplinkLane for TestLane {
    fn push_up_command(&self, command: &CommandMessage) {
        self.commands.lock().unwrap().push(command.clone());
    }

    fn close_uplink(&self, identity: SessionId) {
        self.closed.lock().unwrap().push(identity);
    }

    fn did_fail(&self, error: UplinkError) {
        self.failures.lock().unwrap().push(error);
    }

    fn info(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
