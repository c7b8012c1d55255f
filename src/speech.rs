//! Narration of recommendations through a hosted text-to-speech service
//!
//! [`Narrator`] owns the one utterance that may be active at a time. Callers
//! keep a single narrator (the HTTP state wraps it in a mutex) instead of
//! reaching for a global.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, instrument};

use crate::backend::http_client;
use crate::config::SpeechConfig;
use crate::{Result, WalkError};

/// Turns text into encoded audio
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// Key-gated REST speech synthesis (Google Cloud TTS wire format)
pub struct HostedSpeechEngine {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    language_code: String,
    voice: String,
    speaking_rate: f64,
}

impl HostedSpeechEngine {
    /// Fails when no API key is configured
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| WalkError::config("Speech API key is not configured"))?;

        Ok(Self {
            client: http_client(config.timeout_seconds, 1, concat!("walkpath/", env!("CARGO_PKG_VERSION")))?,
            base_url: config.base_url.clone(),
            api_key,
            language_code: config.language_code.clone(),
            voice: config.voice.clone(),
            speaking_rate: config.speaking_rate,
        })
    }
}

#[async_trait]
impl SpeechEngine for HostedSpeechEngine {
    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let url = format!("{}?key={}", self.base_url, urlencoding::encode(&self.api_key));
        let body = json!({
            "input": { "text": text },
            "voice": { "languageCode": self.language_code, "name": self.voice },
            "audioConfig": { "audioEncoding": "MP3", "speakingRate": self.speaking_rate },
        });

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| WalkError::speech(format!("Speech request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Speech service returned {}: {}", status, error_text);
            return Err(WalkError::speech(format!("Speech service returned {status}")));
        }

        let payload: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| WalkError::speech(format!("Invalid speech response: {e}")))?;

        STANDARD
            .decode(payload.audio_content)
            .map_err(|e| WalkError::speech(format!("Invalid audio payload: {e}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NarrationState {
    Idle,
    Speaking,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// Short message reporting a narration transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub state: NarrationState,
}

#[derive(Debug)]
struct Utterance {
    id: u64,
    text: String,
    audio: Vec<u8>,
}

/// Single owner of the current utterance
pub struct Narrator {
    engine: Arc<dyn SpeechEngine>,
    state: NarrationState,
    current: Option<Utterance>,
    next_id: u64,
}

impl Narrator {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            state: NarrationState::Idle,
            current: None,
            next_id: 1,
        }
    }

    #[must_use]
    pub fn state(&self) -> NarrationState {
        self.state
    }

    /// Audio of the active utterance
    #[must_use]
    pub fn current_audio(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|u| u.audio.as_slice())
    }

    #[must_use]
    pub fn current_text(&self) -> Option<&str> {
        self.current.as_ref().map(|u| u.text.as_str())
    }

    fn notice(&self, kind: NoticeKind, message: impl Into<String>) -> Notice {
        Notice {
            kind,
            message: message.into(),
            state: self.state,
        }
    }

    /// Cancel whatever is playing and speak `text`
    pub async fn speak(&mut self, text: &str) -> Notice {
        let text = text.trim();
        if text.is_empty() {
            return self.notice(NoticeKind::Error, "읽을 내용이 없습니다.");
        }

        if let Some(previous) = self.current.take() {
            debug!("Cancelling utterance {}", previous.id);
        }
        self.state = NarrationState::Idle;

        match self.engine.synthesize(text).await {
            Ok(audio) => {
                let id = self.next_id;
                self.next_id += 1;
                info!("Speaking utterance {} ({} bytes of audio)", id, audio.len());
                self.current = Some(Utterance {
                    id,
                    text: text.to_string(),
                    audio,
                });
                self.state = NarrationState::Speaking;
                self.notice(NoticeKind::Success, "음성 안내를 시작합니다.")
            }
            Err(e) => {
                error!("Speech synthesis failed: {}", e);
                self.notice(NoticeKind::Error, e.user_message())
            }
        }
    }

    pub fn pause(&mut self) -> Notice {
        if self.state != NarrationState::Speaking {
            return self.notice(NoticeKind::Info, "재생 중인 음성이 없습니다.");
        }
        self.state = NarrationState::Paused;
        self.notice(NoticeKind::Info, "음성 안내를 일시정지했습니다.")
    }

    pub fn resume(&mut self) -> Notice {
        if self.state != NarrationState::Paused {
            return self.notice(NoticeKind::Info, "일시정지된 음성이 없습니다.");
        }
        self.state = NarrationState::Speaking;
        self.notice(NoticeKind::Info, "음성 안내를 다시 시작합니다.")
    }

    pub fn stop(&mut self) -> Notice {
        if self.state == NarrationState::Idle {
            return self.notice(NoticeKind::Info, "재생 중인 음성이 없습니다.");
        }
        self.current = None;
        self.state = NarrationState::Idle;
        self.notice(NoticeKind::Info, "음성 안내를 중지했습니다.")
    }

    /// Playback reached the end of the utterance
    pub fn finish(&mut self) -> Notice {
        self.current = None;
        self.state = NarrationState::Idle;
        self.notice(NoticeKind::Success, "음성 안내가 끝났습니다.")
    }
}
