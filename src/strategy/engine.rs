use log::warn;
use rand::Rng;

use crate::race::RaceState;

use super::{ModelClient, ResponseSource, StrategyModel, StrategyResponse, fallback};

/// Reply used when the model answered with nothing.
const ACK_REPLY: &str = "Copy that.";
/// Reply used when the chat request failed outright.
const RETRY_REPLY: &str = "Say again?";

/// Dual-path strategy recommender.
///
/// The primary path asks the external generative model; any failure -
/// transport, status, empty or malformed payload - degrades silently to the
/// deterministic local generator. `recommend` therefore never fails and
/// never surfaces an error to the caller; the two paths are distinguished
/// only by the response's source tag.
pub struct StrategyEngine {
    model: Option<Box<dyn StrategyModel + Send + Sync>>,
}

impl StrategyEngine {
    pub fn new(model: Option<Box<dyn StrategyModel + Send + Sync>>) -> Self {
        Self { model }
    }

    /// Build an engine from the environment. Without an API key every
    /// request goes straight to the local generator.
    pub fn from_env() -> Self {
        Self::new(
            ModelClient::from_env().map(|client| Box::new(client) as Box<dyn StrategyModel + Send + Sync>),
        )
    }

    /// Produce a recommendation for a race snapshot.
    pub fn recommend(&self, state: &RaceState, rng: &mut impl Rng) -> StrategyResponse {
        if let Some(model) = &self.model {
            match model.request_strategy(state) {
                Ok(mut response) => {
                    response.source = ResponseSource::Model;
                    return response;
                }
                Err(e) => warn!("Strategy model unavailable, using local generator: {}", e),
            }
        }
        fallback::generate(state, rng)
    }

    /// Answer a driver question. Always returns a string: the model's reply,
    /// an acknowledgement when the model had nothing to say, or a fixed
    /// placeholder when the request failed.
    pub fn answer_query(&self, query: &str, state: &RaceState) -> String {
        let Some(model) = &self.model else {
            return RETRY_REPLY.to_string();
        };
        match model.answer_query(query, state) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => ACK_REPLY.to_string(),
            Err(e) => {
                warn!("Chat query failed: {}", e);
                RETRY_REPLY.to_string()
            }
        }
    }

    /// Best-effort speech synthesis; `None` on any failure.
    pub fn synthesize_speech(&self, text: &str) -> Option<String> {
        let model = self.model.as_ref()?;
        match model.synthesize_speech(text) {
            Ok(audio) => Some(audio),
            Err(e) => {
                warn!("Speech synthesis failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::SmallRng};

    use crate::PitwallError;
    use crate::strategy::CommandType;

    use super::*;

    struct FailingModel;

    impl StrategyModel for FailingModel {
        fn request_strategy(&self, _: &RaceState) -> Result<StrategyResponse, PitwallError> {
            Err(PitwallError::ModelEmptyResponse)
        }

        fn answer_query(&self, _: &str, _: &RaceState) -> Result<String, PitwallError> {
            Err(PitwallError::ModelEmptyResponse)
        }

        fn synthesize_speech(&self, _: &str) -> Result<String, PitwallError> {
            Err(PitwallError::ModelEmptyResponse)
        }
    }

    struct CannedModel {
        reply: String,
    }

    impl StrategyModel for CannedModel {
        fn request_strategy(&self, state: &RaceState) -> Result<StrategyResponse, PitwallError> {
            let mut rng = SmallRng::seed_from_u64(0);
            Ok(fallback::generate(state, &mut rng))
        }

        fn answer_query(&self, _: &str, _: &RaceState) -> Result<String, PitwallError> {
            Ok(self.reply.clone())
        }

        fn synthesize_speech(&self, _: &str) -> Result<String, PitwallError> {
            Ok("data:audio/wav;base64,UklGRg==".to_string())
        }
    }

    #[test]
    fn test_model_failure_degrades_to_simulation_tag() {
        let engine = StrategyEngine::new(Some(Box::new(FailingModel)));
        let mut rng = SmallRng::seed_from_u64(4);
        let response = engine.recommend(&RaceState::default(), &mut rng);
        assert_eq!(response.source, ResponseSource::Simulation);
    }

    #[test]
    fn test_model_success_is_stamped_with_model_tag() {
        let engine = StrategyEngine::new(Some(Box::new(CannedModel {
            reply: String::new(),
        })));
        let mut rng = SmallRng::seed_from_u64(4);
        let response = engine.recommend(&RaceState::default(), &mut rng);
        assert_eq!(response.source, ResponseSource::Model);
    }

    #[test]
    fn test_no_model_uses_local_generator() {
        let engine = StrategyEngine::new(None);
        let mut rng = SmallRng::seed_from_u64(4);
        let mut state = RaceState::default();
        state.tire_wear = 80.;
        let response = engine.recommend(&state, &mut rng);
        assert_eq!(response.primary_command, CommandType::MandatoryPit);
        assert_eq!(response.source, ResponseSource::Simulation);
    }

    #[test]
    fn test_chat_placeholder_on_failure() {
        let engine = StrategyEngine::new(Some(Box::new(FailingModel)));
        let reply = engine.answer_query("box this lap?", &RaceState::default());
        assert_eq!(reply, RETRY_REPLY);
    }

    #[test]
    fn test_chat_acknowledges_empty_reply() {
        let engine = StrategyEngine::new(Some(Box::new(CannedModel {
            reply: "  ".to_string(),
        })));
        let reply = engine.answer_query("box this lap?", &RaceState::default());
        assert_eq!(reply, ACK_REPLY);
    }

    #[test]
    fn test_speech_synthesis_is_best_effort() {
        let engine = StrategyEngine::new(Some(Box::new(FailingModel)));
        assert!(engine.synthesize_speech("BOX NOW").is_none());

        let engine = StrategyEngine::new(Some(Box::new(CannedModel {
            reply: String::new(),
        })));
        assert!(engine.synthesize_speech("BOX NOW").is_some());
    }
}
