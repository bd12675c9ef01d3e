use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    sync::mpsc::Receiver,
};

use log::error;

use crate::{PitwallError, race::SessionOutput};

/// Record session output to a JSON Lines file until the sending side hangs
/// up. Runs on its own thread during a recorded live session.
pub fn write_session(
    file: &PathBuf,
    session_receiver: Receiver<SessionOutput>,
) -> Result<(), PitwallError> {
    let session_file = File::create(file).map_err(|e| PitwallError::WriterError { source: e })?;
    let mut session_writer = BufWriter::new(session_file);
    for record in &session_receiver {
        match serde_json::to_string(&record) {
            Ok(line) => {
                if let Err(e) = writeln!(session_writer, "{}", line) {
                    error!("Error while writing session record to output file: {}", e);
                }
            }
            Err(e) => error!("Could not serialize session record: {}", e),
        }
    }
    session_writer
        .flush()
        .map_err(|e| PitwallError::WriterError { source: e })?;
    Ok(())
}
