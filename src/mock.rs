#![allow(dead_code)]

//! Scripted generator for unit tests.

use crate::error::{AdvisorError, Result};
use crate::traits::{GenerationOptions, GenerationResult, GeneratorModel};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail,
}

/// Generator that replays a fixed script, then repeats a fallback reply.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Reply>>,
    then: Reply,
    delay: Option<Duration>,
    call_count: AtomicU32,
    prompts: Mutex<Vec<String>>,
    last_options: Mutex<Option<GenerationOptions>>,
}

impl ScriptedGenerator {
    pub fn new(script: Vec<Reply>, then: Reply) -> Self {
        Self {
            script: Mutex::new(script.into()),
            then,
            delay: None,
            call_count: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
            last_options: Mutex::new(None),
        }
    }

    pub fn always(text: &str) -> Self {
        Self::new(Vec::new(), Reply::Text(text.to_string()))
    }

    pub fn failing() -> Self {
        Self::new(Vec::new(), Reply::Fail)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn last_options(&self) -> Option<GenerationOptions> {
        self.last_options.lock().unwrap().clone()
    }
}

#[async_trait]
impl GeneratorModel for ScriptedGenerator {
    async fn generate(
        &self,
        messages: &[String],
        options: GenerationOptions,
    ) -> Result<GenerationResult> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().extend(messages.iter().cloned());
        *self.last_options.lock().unwrap() = Some(options);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.then.clone());

        match reply {
            Reply::Text(text) => Ok(GenerationResult { text, usage: None }),
            Reply::Fail => Err(AdvisorError::ApiError(
                "Scripted generator failure".to_string(),
            )),
        }
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}
