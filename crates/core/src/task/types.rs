//! Intercept task records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::StampedPose;

/// Inbound target descriptor: the four tool poses of one intercept job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetPoses {
    /// Pre-grasp pose reached by the transport group.
    pub approach: StampedPose,
    /// Grasp pose; its stamp is the object's predicted arrival time.
    pub pick: StampedPose,
    /// Lift-off pose reached by the manipulator after the grasp.
    pub retreat: StampedPose,
    /// Deposit pose reached by the transport group.
    pub place: StampedPose,
}

impl TargetPoses {
    /// Name of the first pose that is not a usable target, if any.
    pub fn invalid_pose(&self) -> Option<&'static str> {
        [
            ("approach", &self.approach),
            ("pick", &self.pick),
            ("retreat", &self.retreat),
            ("place", &self.place),
        ]
        .into_iter()
        .find(|(_, pose)| !pose.pose.is_valid())
        .map(|(name, _)| name)
    }
}

/// One intercept job, as held by the queue.
///
/// Immutable once enqueued; consumed exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetTask {
    pub id: Uuid,
    pub received_at: DateTime<Utc>,
    #[serde(flatten)]
    pub poses: TargetPoses,
}

impl TargetTask {
    pub fn new(poses: TargetPoses) -> Self {
        Self::received(poses, Utc::now())
    }

    pub fn received(poses: TargetPoses, received_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            received_at,
            poses,
        }
    }

    /// Predicted arrival of the object at the grasp point.
    pub fn pick_deadline(&self) -> DateTime<Utc> {
        self.poses.pick.stamp
    }
}
