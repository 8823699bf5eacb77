//! Episode recording schema and its binary codec.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const LOG_VERSION: u16 = 1;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported log version {found} (expected {expected})")]
    Version { expected: u16, found: u16 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunHeader {
    pub version: u16,
    pub run_id: Uuid,
    pub num_envs: u32,
    /// Physics step (s).
    pub dt: f32,
    pub seed: u64,
    /// Task variant name, e.g. `go_to_pose`.
    pub task: String,
    /// Environment whose steps are recorded.
    pub env: u32,
}

impl RunHeader {
    pub fn new(num_envs: u32, dt: f32, seed: u64, task: impl Into<String>, env: u32) -> Self {
        Self {
            version: LOG_VERSION,
            run_id: Uuid::new_v4(),
            num_envs,
            dt,
            seed,
            task: task.into(),
            env,
        }
    }
}

/// One physics step of the recorded environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: u64,
    pub position: [f32; 3],
    /// `(w, x, y, z)`
    pub orientation: [f32; 4],
    pub linear_velocity: [f32; 3],
    pub angular_velocity: [f32; 3],
    pub actions: [f32; 2],
    pub thruster_forces: [f32; 2],
    /// Body-frame force and torque applied to the hull this step.
    pub hull_wrench: [f32; 6],
    pub reward: f32,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeLog {
    pub header: RunHeader,
    pub steps: Vec<StepRecord>,
}

impl EpisodeLog {
    pub fn new(header: RunHeader) -> Self {
        Self {
            header,
            steps: Vec::new(),
        }
    }

    pub fn push(&mut self, record: StepRecord) {
        self.steps.push(record);
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), TelemetryError> {
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: R) -> Result<Self, TelemetryError> {
        let log: Self = bincode::deserialize_from(reader)?;
        if log.header.version != LOG_VERSION {
            return Err(TelemetryError::Version {
                expected: LOG_VERSION,
                found: log.header.version,
            });
        }
        Ok(log)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TelemetryError> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write_to(&mut w)?;
        w.flush()?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TelemetryError> {
        Self::read_from(BufReader::new(File::open(path)?))
    }
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, TelemetryError> {
    Ok(bincode::serialize(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, TelemetryError> {
    Ok(bincode::deserialize(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log() -> EpisodeLog {
        let mut log = EpisodeLog::new(RunHeader::new(4, 0.02, 7, "go_to_pose", 0));
        for k in 0..3 {
            log.push(StepRecord {
                step: k,
                position: [k as f32, 0.0, 0.1],
                orientation: [1.0, 0.0, 0.0, 0.0],
                linear_velocity: [0.5, 0.0, 0.0],
                angular_velocity: [0.0, 0.0, 0.1],
                actions: [0.3, -0.3],
                thruster_forces: [1.0, -0.5],
                hull_wrench: [0.5, 0.0, 0.0, 0.0, 0.0, -0.3],
                reward: 0.25,
                done: k == 2,
            });
        }
        log
    }

    #[test]
    fn log_survives_writer_and_reader() {
        let log = sample_log();
        let mut buf = Vec::new();
        log.write_to(&mut buf).unwrap();
        let back = EpisodeLog::read_from(buf.as_slice()).unwrap();
        assert_eq!(back, log);
    }

    #[test]
    fn foreign_version_is_rejected() {
        let mut log = sample_log();
        log.header.version = LOG_VERSION + 1;
        let bytes = encode(&log).unwrap();
        match EpisodeLog::read_from(bytes.as_slice()) {
            Err(TelemetryError::Version { found, .. }) => assert_eq!(found, LOG_VERSION + 1),
            other => panic!("expected version error, got {other:?}"),
        }
    }

    #[test]
    fn truncated_bytes_fail_to_decode() {
        let bytes = encode(&sample_log()).unwrap();
        let err = decode::<EpisodeLog>(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, TelemetryError::Codec(_)));
    }
}
