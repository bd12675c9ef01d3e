use std::{sync::mpsc::Sender, thread, time::Duration};

use log::{error, info};

use crate::PitwallError;

use super::{SessionOutput, producer::RaceProducer, simulator::TICK_MS};

/// Drive a producer at the fixed tick rate, fanning each snapshot out to the
/// UI channel and, when recording, to the writer channel.
///
/// Returns cleanly when the producer is exhausted (end of a replay); send
/// errors mean every receiver is gone and the session is over.
pub fn run_session(
    mut producer: impl RaceProducer,
    snapshot_sender: Sender<SessionOutput>,
    writer_sender: Option<Sender<SessionOutput>>,
) -> Result<(), PitwallError> {
    producer.start()?;

    let meta = producer.session_meta()?;
    snapshot_sender.send(SessionOutput::SessionChange(meta.clone()))?;
    if let Some(ref writer) = writer_sender {
        writer.send(SessionOutput::SessionChange(meta))?;
    }

    loop {
        thread::sleep(Duration::from_millis(TICK_MS));
        let state = match producer.next_state() {
            Ok(state) => state,
            Err(e) => {
                info!("Session producer finished: {}", e);
                return Ok(());
            }
        };

        snapshot_sender
            .send(SessionOutput::Snapshot(Box::new(state.clone())))
            .map_err(|e| {
                error!("Could not send race snapshot: {}", e);
                PitwallError::from(e)
            })?;
        if let Some(ref writer) = writer_sender {
            writer
                .send(SessionOutput::Snapshot(Box::new(state.clone())))
                .map_err(|e| {
                    error!("Could not send race snapshot to writer: {}", e);
                    PitwallError::from(e)
                })?;
        }
    }
}
