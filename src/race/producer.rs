use std::path::Path;

use log::info;
use rand::{SeedableRng, rngs::SmallRng};

use crate::PitwallError;

use super::{RaceState, SessionMeta, SessionOutput, simulator};

/// A source of race-state snapshots.
///
/// The trait abstracts where snapshots come from so the rest of the
/// application does not care whether it is watching a live simulated session
/// or replaying a recorded one.
///
/// # Lifecycle
///
/// 1. Call `start()` to initialize the producer
/// 2. Call `session_meta()` to retrieve session-scoped metadata
/// 3. Call `next_state()` once per tick until it reports exhaustion
pub trait RaceProducer {
    /// Initialize the producer.
    fn start(&mut self) -> Result<(), PitwallError>;

    /// Retrieve session metadata. Static for the duration of a session.
    fn session_meta(&mut self) -> Result<SessionMeta, PitwallError>;

    /// Produce the next race-state snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error when the producer is exhausted (replay reached the
    /// end of its file). The simulated producer never fails.
    fn next_state(&mut self) -> Result<RaceState, PitwallError>;
}

/// Produces snapshots by advancing a seeded simulation one tick per call.
pub struct SimulatedRaceProducer {
    state: RaceState,
    rng: SmallRng,
    meta: SessionMeta,
}

impl SimulatedRaceProducer {
    /// Create a producer from an optional seed. A fixed seed replays the
    /// exact same session; `None` seeds from the OS entropy pool.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            state: RaceState::default(),
            rng,
            meta: SessionMeta::default(),
        }
    }

}

impl RaceProducer for SimulatedRaceProducer {
    fn start(&mut self) -> Result<(), PitwallError> {
        Ok(())
    }

    fn session_meta(&mut self) -> Result<SessionMeta, PitwallError> {
        Ok(self.meta.clone())
    }

    fn next_state(&mut self) -> Result<RaceState, PitwallError> {
        self.state = simulator::advance(&self.state, &mut self.rng);
        Ok(self.state.clone())
    }
}

/// Replays a session previously recorded by the writer.
pub struct ReplayProducer {
    cur_tick: usize,
    points: Vec<RaceState>,
    meta: SessionMeta,
}

impl ReplayProducer {
    /// Load a recorded session from a JSON Lines file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or a line does not
    /// parse as a session record.
    pub fn from_file(file: impl AsRef<Path>) -> Result<Self, PitwallError> {
        let records = serde_jsonlines::json_lines(&file)
            .map_err(|e| PitwallError::SessionLoaderError { source: e })?
            .collect::<Result<Vec<SessionOutput>, _>>()
            .map_err(|e| PitwallError::SessionLoaderError { source: e })?;

        let mut points = Vec::new();
        let mut meta = SessionMeta::default();
        for record in records {
            match record {
                SessionOutput::Snapshot(state) => points.push(*state),
                SessionOutput::SessionChange(session) => meta = session,
            }
        }
        info!("Loaded {} recorded snapshots", points.len());

        Ok(Self {
            cur_tick: 0,
            points,
            meta,
        })
    }

    #[allow(dead_code)]
    pub fn from_points(points: Vec<RaceState>) -> Self {
        Self {
            cur_tick: 0,
            points,
            meta: SessionMeta::default(),
        }
    }
}

impl RaceProducer for ReplayProducer {
    fn start(&mut self) -> Result<(), PitwallError> {
        Ok(())
    }

    fn session_meta(&mut self) -> Result<SessionMeta, PitwallError> {
        Ok(self.meta.clone())
    }

    fn next_state(&mut self) -> Result<RaceState, PitwallError> {
        if self.cur_tick >= self.points.len() {
            return Err(PitwallError::ProducerError {
                description: "End of recorded session".to_string(),
            });
        }

        let point = self.points[self.cur_tick].clone();
        self.cur_tick += 1;

        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_producer_is_deterministic_for_a_seed() {
        let mut a = SimulatedRaceProducer::new(Some(12));
        let mut b = SimulatedRaceProducer::new(Some(12));
        a.start().unwrap();
        b.start().unwrap();
        for _ in 0..20 {
            let sa = a.next_state().unwrap();
            let sb = b.next_state().unwrap();
            assert_eq!(sa.tire_wear, sb.tire_wear);
            assert_eq!(sa.telemetry.rpm, sb.telemetry.rpm);
        }
    }

    #[test]
    fn test_replay_producer_exhausts() {
        let mut producer = ReplayProducer::from_points(vec![RaceState::default()]);
        producer.start().unwrap();
        assert!(producer.next_state().is_ok());
        assert!(producer.next_state().is_err());
    }

    #[test]
    fn test_replay_producer_preserves_order() {
        let mut first = RaceState::default();
        first.current_lap = 1;
        let mut second = RaceState::default();
        second.current_lap = 2;

        let mut producer = ReplayProducer::from_points(vec![first, second]);
        producer.start().unwrap();
        assert_eq!(producer.next_state().unwrap().current_lap, 1);
        assert_eq!(producer.next_state().unwrap().current_lap, 2);
    }
}
