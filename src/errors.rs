// Error types for pitwall

use crate::race::SessionOutput;
use snafu::Snafu;
use std::{io, sync::mpsc::SendError};

#[derive(Debug, Snafu)]
pub enum PitwallError {
    // Errors for the race session producers
    #[snafu(display("Race producer error: {description}"))]
    ProducerError { description: String },
    #[snafu(display("Invalid session file: {path}"))]
    InvalidSessionFile { path: String },
    #[snafu(display("Error loading session file"))]
    SessionLoaderError { source: io::Error },
    #[snafu(display("Error broadcasting race snapshot"))]
    SnapshotBroadcastError {
        source: Box<SendError<SessionOutput>>,
    },

    // Errors for the strategy model client
    #[snafu(display("Could not start async runtime for model request"))]
    ModelRuntimeError { source: io::Error },
    #[snafu(display("Error calling strategy model endpoint"))]
    ModelTransportError { source: reqwest::Error },
    #[snafu(display("Strategy model endpoint returned status {status}"))]
    ModelStatusError { status: u16 },
    #[snafu(display("Strategy model returned no usable candidate text"))]
    ModelEmptyResponse,
    #[snafu(display("Error parsing strategy model payload"))]
    ModelDecodeError { source: serde_json::Error },

    // Errors for the session writer
    #[snafu(display("Error writing session file"))]
    WriterError { source: io::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },
}

impl From<SendError<SessionOutput>> for PitwallError {
    fn from(value: SendError<SessionOutput>) -> Self {
        PitwallError::SnapshotBroadcastError {
            source: Box::new(value),
        }
    }
}
