#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use console_engine::{ApiSettings, EngineEvent, EventSink, ReqwestApi};
use wiremock::MockServer;

#[derive(Default, Clone)]
pub struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn api_for(server: &MockServer) -> ReqwestApi {
    ReqwestApi::new(ApiSettings {
        base_url: format!("{}/api", server.uri()),
        ..ApiSettings::default()
    })
    .expect("valid base url")
}
