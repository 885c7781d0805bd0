use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::domain::value_objects::CameraFacing;

/// Encoded camera image (JPEG) as handed out by a frame source.
#[derive(Debug, Clone)]
pub struct Frame {
    data: Bytes,
    facing: CameraFacing,
    captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(data: impl Into<Bytes>, facing: CameraFacing) -> Self {
        Self {
            data: data.into(),
            facing,
            captured_at: Utc::now(),
        }
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
