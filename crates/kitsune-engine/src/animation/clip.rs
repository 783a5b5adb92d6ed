use glam::{Quat, Vec3};

use crate::scene::NodeId;

/// Keyframe values of one track.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackValues {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

impl TrackValues {
    pub fn len(&self) -> usize {
        match self {
            TrackValues::Translation(v) | TrackValues::Scale(v) => v.len(),
            TrackValues::Rotation(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A track's value at one instant.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Sample {
    Translation(Vec3),
    Rotation(Quat),
    Scale(Vec3),
}

/// Which transform component a track drives.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Translation,
    Rotation,
    Scale,
}

/// Keyframes driving one transform component of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack {
    pub target: NodeId,
    /// Strictly increasing, seconds.
    pub times: Vec<f32>,
    pub values: TrackValues,
}

impl KeyframeTrack {
    pub fn channel(&self) -> Channel {
        match self.values {
            TrackValues::Translation(_) => Channel::Translation,
            TrackValues::Rotation(_) => Channel::Rotation,
            TrackValues::Scale(_) => Channel::Scale,
        }
    }

    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Value at `time`: linear between keyframes (slerp for rotations), held
    /// constant before the first and after the last keyframe.
    pub fn sample(&self, time: f32) -> Option<Sample> {
        let n = self.times.len().min(self.values.len());
        if n == 0 {
            return None;
        }

        let (i0, i1, alpha) = if n == 1 || time.is_nan() || time <= self.times[0] {
            (0, 0, 0.0)
        } else if time >= self.times[n - 1] {
            (n - 1, n - 1, 0.0)
        } else {
            // First keyframe strictly after `time`.
            let i1 = self.times[..n].partition_point(|&t| t <= time).clamp(1, n - 1);
            let i0 = i1 - 1;
            let span = self.times[i1] - self.times[i0];
            let alpha = if span > 0.0 { (time - self.times[i0]) / span } else { 0.0 };
            (i0, i1, alpha)
        };

        let sample = match &self.values {
            TrackValues::Translation(v) => Sample::Translation(v[i0].lerp(v[i1], alpha)),
            TrackValues::Scale(v) => Sample::Scale(v[i0].lerp(v[i1], alpha)),
            TrackValues::Rotation(v) => Sample::Rotation(v[i0].slerp(v[i1], alpha).normalize()),
        };
        Some(sample)
    }
}

/// Named timeline of keyframe tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Seconds. The latest keyframe of any track.
    pub duration: f32,
    pub tracks: Vec<KeyframeTrack>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, tracks: Vec<KeyframeTrack>) -> Self {
        let duration = tracks.iter().map(KeyframeTrack::end_time).fold(0.0, f32::max);
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }
}
