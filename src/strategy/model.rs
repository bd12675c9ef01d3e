use std::time::Duration;

use log::info;
use serde_json::{Value, json};

use crate::PitwallError;
use crate::race::RaceState;

use super::StrategyResponse;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_STRATEGY_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
const DEFAULT_TTS_VOICE: &str = "Fenrir";
const REQUEST_TIMEOUT_S: u64 = 30;

pub const API_KEY_ENV: &str = "PITWALL_API_KEY";
pub const BASE_URL_ENV: &str = "PITWALL_API_BASE";

const SYSTEM_INSTRUCTION: &str = "
You are the race strategy agent for a one-make GR Cup team. You perform three key roles:

1. Chief Strategist (Real-Time Analytics): Analyze telemetry to output high-confidence strategy commands (BOX_NOW, HOLD_STINT). React immediately to Safety Cars.
2. Driver Coach (Training & Insights): Analyze Sector 1, 2, and 3 times against benchmarks. Identify specific corner complexes where time is lost.
3. Data Scientist (Prediction): Forecast future race outcomes, tire degradation curves, and predicted finishing positions based on current trends.

Your output must be a strict JSON object minimizing conversational filler.
";

/// Narrow contract to the external generative service.
///
/// The engine only ever talks to this trait so tests can substitute failing
/// or canned implementations, the same way producers are swapped for mocks.
pub trait StrategyModel {
    /// Request a structured strategy recommendation for a race snapshot.
    fn request_strategy(&self, state: &RaceState) -> Result<StrategyResponse, PitwallError>;

    /// Ask a freeform question with a compact race context. An empty string
    /// means the model had nothing to say; that is not an error.
    fn answer_query(&self, query: &str, state: &RaceState) -> Result<String, PitwallError>;

    /// Synthesize a short line of speech, returned as a base64 audio data
    /// URL.
    fn synthesize_speech(&self, text: &str) -> Result<String, PitwallError>;
}

/// HTTP client for the generative-model endpoint.
///
/// Call sites are synchronous (UI worker threads), so requests block on a
/// private current-thread runtime rather than infecting the app with async.
pub struct ModelClient {
    http: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    base_url: String,
    api_key: String,
    strategy_model: String,
    tts_model: String,
}

impl ModelClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self, PitwallError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PitwallError::ModelRuntimeError { source: e })?;
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_S))
                .build()
                .map_err(|e| PitwallError::ModelTransportError { source: e })?,
            runtime,
            base_url,
            api_key,
            strategy_model: DEFAULT_STRATEGY_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
        })
    }

    /// Build a client from the environment, or `None` when no API key is
    /// configured and every request should go straight to the local
    /// generator.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty())?;
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        match Self::new(api_key, base_url) {
            Ok(client) => Some(client),
            Err(e) => {
                log::error!("Could not build strategy model client: {}", e);
                None
            }
        }
    }

    fn generate_content(&self, model: &str, body: Value) -> Result<Value, PitwallError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            model,
            self.api_key
        );

        let response = self
            .runtime
            .block_on(self.http.post(&url).json(&body).send())
            .map_err(|e| PitwallError::ModelTransportError { source: e })?;

        if !response.status().is_success() {
            return Err(PitwallError::ModelStatusError {
                status: response.status().as_u16(),
            });
        }

        self.runtime
            .block_on(response.json::<Value>())
            .map_err(|e| PitwallError::ModelTransportError { source: e })
    }
}

impl StrategyModel for ModelClient {
    fn request_strategy(&self, state: &RaceState) -> Result<StrategyResponse, PitwallError> {
        let body = json!({
            "system_instruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": [{ "parts": [{ "text": build_strategy_prompt(state) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": strategy_response_schema(),
            },
        });

        let payload = self.generate_content(&self.strategy_model, body)?;
        let text = candidate_text(&payload).ok_or(PitwallError::ModelEmptyResponse)?;
        if text.trim().is_empty() {
            return Err(PitwallError::ModelEmptyResponse);
        }
        info!("Strategy model returned {} bytes of JSON", text.len());

        serde_json::from_str::<StrategyResponse>(text)
            .map_err(|e| PitwallError::ModelDecodeError { source: e })
    }

    fn answer_query(&self, query: &str, state: &RaceState) -> Result<String, PitwallError> {
        let context = format!(
            "Context: Lap {}, Tire {:.1}%, Gap {:.2}s.\nUser asks: \"{}\"\nAnswer briefly as a race engineer.",
            state.current_lap, state.tire_wear, state.rival_gap, query
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": context }] }],
        });

        let payload = self.generate_content(&self.strategy_model, body)?;
        Ok(candidate_text(&payload).unwrap_or_default().to_string())
    }

    fn synthesize_speech(&self, text: &str) -> Result<String, PitwallError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": { "prebuiltVoiceConfig": { "voiceName": DEFAULT_TTS_VOICE } },
                },
            },
        });

        let payload = self.generate_content(&self.tts_model, body)?;
        let audio = payload["candidates"][0]["content"]["parts"][0]["inlineData"]["data"]
            .as_str()
            .ok_or(PitwallError::ModelEmptyResponse)?;
        Ok(format!("data:audio/wav;base64,{audio}"))
    }
}

fn candidate_text(payload: &Value) -> Option<&str> {
    payload["candidates"][0]["content"]["parts"][0]["text"].as_str()
}

fn build_strategy_prompt(state: &RaceState) -> String {
    format!(
        "Current Race State:
Lap {}/{}.
Tire Wear: {:.1}%.
Fuel Remaining: {:.1}L.
Rival Gap: {}{:.2}s.
Rival Pace Delta: {}{:.2}s.
Safety Car: {}.

Raw Telemetry:
nmot: {}
pbrake_f: {}
pbrake_r: {}
ath: {}
aps: {}

Sector Times (Current vs Benchmark):
S1: {:.3} (Ideal: {:.3})
S2: {:.3} (Ideal: {:.3})
S3: {:.3} (Ideal: {:.3})

Track Conditions:
Track Temp: {:.1}C
Air Temp: {:.1}C

Determine strategy, sector analysis for driver coaching, and race predictions.",
        state.current_lap,
        state.total_laps,
        state.tire_wear,
        state.fuel_remaining,
        if state.rival_gap > 0. { "+" } else { "" },
        state.rival_gap,
        if state.rival_pace_delta > 0. { "+" } else { "" },
        state.rival_pace_delta,
        if state.is_safety_car { "DEPLOYED" } else { "NO" },
        state.telemetry.rpm,
        state.telemetry.brake_pressure_front,
        state.telemetry.brake_pressure_rear,
        state.telemetry.throttle_blade,
        state.telemetry.throttle_pedal,
        state.sectors.s1,
        state.sectors.s1_benchmark,
        state.sectors.s2,
        state.sectors.s2_benchmark,
        state.sectors.s3,
        state.sectors.s3_benchmark,
        state.weather.track_temp_c,
        state.weather.air_temp_c,
    )
}

/// JSON schema the model is constrained to. Mirrors `StrategyResponse` so a
/// compliant reply deserializes directly.
fn strategy_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "primary_command": {
                "type": "STRING",
                "enum": ["BOX_NOW", "HOLD_STINT", "MANDATORY_PIT"],
            },
            "strategy_rationale": { "type": "STRING" },
            "pit_parameters": {
                "type": "OBJECT",
                "properties": {
                    "tire_compound": { "type": "STRING" },
                    "fuel_liters": { "type": "NUMBER" },
                },
            },
            "rejoin_analysis": {
                "type": "OBJECT",
                "properties": {
                    "pra_score": { "type": "NUMBER", "description": "0 to 100 probability" },
                    "rival_exit_gap": { "type": "STRING" },
                },
            },
            "pit_window": {
                "type": "OBJECT",
                "properties": {
                    "start_lap": { "type": "NUMBER" },
                    "end_lap": { "type": "NUMBER" },
                },
            },
            "driver_execution": { "type": "STRING", "description": "Specific corner advice" },
            "debrief_summary": { "type": "STRING", "description": "Analysis of current stint performance" },
            "sector_analysis": {
                "type": "OBJECT",
                "properties": {
                    "problem_sector": { "type": "STRING", "enum": ["S1", "S2", "S3"] },
                    "time_loss": { "type": "NUMBER" },
                    "advice": { "type": "STRING" },
                },
            },
            "race_prediction": {
                "type": "OBJECT",
                "properties": {
                    "predicted_finish_pos": { "type": "NUMBER" },
                    "tire_life_remaining_laps": { "type": "NUMBER" },
                    "degradation_curve": { "type": "STRING", "enum": ["Low", "Medium", "High"] },
                    "predicted_qualifying_pace": { "type": "STRING" },
                },
            },
        },
        "required": [
            "primary_command",
            "strategy_rationale",
            "pit_parameters",
            "rejoin_analysis",
            "driver_execution",
            "pit_window",
            "debrief_summary",
            "sector_analysis",
            "race_prediction",
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_race_snapshot() {
        let mut state = RaceState::default();
        state.current_lap = 22;
        state.tire_wear = 55.;
        state.is_safety_car = true;

        let prompt = build_strategy_prompt(&state);
        assert!(prompt.contains("Lap 22/65"));
        assert!(prompt.contains("Tire Wear: 55.0%"));
        assert!(prompt.contains("Safety Car: DEPLOYED"));
        assert!(prompt.contains("S1: 32.800 (Ideal: 32.600)"));
    }

    #[test]
    fn test_candidate_text_extraction() {
        let payload = json!({
            "candidates": [{ "content": { "parts": [{ "text": "copy" }] } }]
        });
        assert_eq!(candidate_text(&payload), Some("copy"));

        let empty = json!({ "candidates": [] });
        assert_eq!(candidate_text(&empty), None);
    }

    #[test]
    fn test_schema_requires_every_top_level_field() {
        let schema = strategy_response_schema();
        let required = schema["required"].as_array().unwrap();
        for field in [
            "primary_command",
            "pit_parameters",
            "rejoin_analysis",
            "pit_window",
            "sector_analysis",
            "race_prediction",
        ] {
            assert!(
                required.iter().any(|v| v.as_str() == Some(field)),
                "missing {field}"
            );
        }
        let properties = schema["properties"].as_object().unwrap();
        for field in required {
            assert!(properties.contains_key(field.as_str().unwrap()));
        }
    }

    #[test]
    fn test_schema_compliant_payload_deserializes() {
        let reply = json!({
            "primary_command": "BOX_NOW",
            "strategy_rationale": "Undercut window open.",
            "pit_parameters": { "tire_compound": "Soft", "fuel_liters": 42 },
            "rejoin_analysis": { "pra_score": 81, "rival_exit_gap": "-20.5s" },
            "pit_window": { "start_lap": 23, "end_lap": 27 },
            "driver_execution": "Sector 2 Attack.",
            "debrief_summary": "Stint on target.",
            "sector_analysis": { "problem_sector": "S2", "time_loss": 0.4, "advice": "Brake later into T4." },
            "race_prediction": {
                "predicted_finish_pos": 2,
                "tire_life_remaining_laps": 14,
                "degradation_curve": "Medium",
                "predicted_qualifying_pace": "1:34.218"
            }
        });

        let parsed: StrategyResponse = serde_json::from_value(reply).unwrap();
        assert_eq!(parsed.primary_command, crate::strategy::CommandType::BoxNow);
        assert_eq!(parsed.source, crate::strategy::ResponseSource::Simulation);
    }
}
