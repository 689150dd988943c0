use crate::{error::Error, geometry::Point};
use num_traits::{FromPrimitive, ToPrimitive};
use std::{convert::TryFrom, str::FromStr};

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive, num_derive::ToPrimitive,
)]
pub(crate) enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

pub(crate) const NUM_KEYPOINTS: usize = 17;

impl KeypointKind {
    pub(crate) fn idx(self) -> Result<usize, Error> {
        self.to_usize().ok_or(Error::KeypointVariantToUSize(self))
    }

    /// The PoseNet part name, e.g. `leftShoulder`.
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "leftEye",
            Self::RightEye => "rightEye",
            Self::LeftEar => "leftEar",
            Self::RightEar => "rightEar",
            Self::LeftShoulder => "leftShoulder",
            Self::RightShoulder => "rightShoulder",
            Self::LeftElbow => "leftElbow",
            Self::RightElbow => "rightElbow",
            Self::LeftWrist => "leftWrist",
            Self::RightWrist => "rightWrist",
            Self::LeftHip => "leftHip",
            Self::RightHip => "rightHip",
            Self::LeftKnee => "leftKnee",
            Self::RightKnee => "rightKnee",
            Self::LeftAnkle => "leftAnkle",
            Self::RightAnkle => "rightAnkle",
        }
    }

    pub(crate) fn all() -> impl Iterator<Item = Self> {
        (0..NUM_KEYPOINTS).filter_map(Self::from_usize)
    }
}

impl TryFrom<usize> for KeypointKind {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::from_usize(value).ok_or(Error::ConvertUSizeToKeypointKind(value))
    }
}

impl FromStr for KeypointKind {
    type Err = Error;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|kind| kind.label() == label)
            .ok_or_else(|| Error::UnknownKeypointLabel(label.to_owned()))
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Keypoint {
    pub(crate) kind: KeypointKind,
    pub(crate) point: Point,
    pub(crate) score: f32,
}

impl Keypoint {
    /// Strictly above `threshold`; a score equal to the threshold does not count.
    pub(crate) fn is_confident(&self, threshold: f32) -> bool {
        self.score > threshold
    }
}

pub(crate) type Keypoints = [Option<Keypoint>; NUM_KEYPOINTS];

/// One detected person.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Pose {
    keypoints: Keypoints,
    /// Repeated parts. Drawn as markers but never used for lookups.
    duplicates: Vec<Keypoint>,
    pub(crate) score: f32,
}

impl Pose {
    /// Build a pose from keypoints in detection order. If a part shows up more
    /// than once, the first one is used for lookups.
    pub(crate) fn from_keypoints<I>(keypoints: I, score: f32) -> Result<Self, Error>
    where
        I: IntoIterator<Item = Keypoint>,
    {
        let mut slots: Keypoints = Default::default();
        let mut duplicates = Vec::new();
        for keypoint in keypoints {
            let slot = &mut slots[keypoint.kind.idx()?];
            if slot.is_none() {
                *slot = Some(keypoint);
            } else {
                duplicates.push(keypoint);
            }
        }
        Ok(Self {
            keypoints: slots,
            duplicates,
            score,
        })
    }

    pub(crate) fn get(&self, kind: KeypointKind) -> Option<&Keypoint> {
        self.keypoints.get(kind.to_usize()?)?.as_ref()
    }

    /// Position of `kind`, if it was detected with a score above `threshold`.
    pub(crate) fn confident(&self, kind: KeypointKind, threshold: f32) -> Option<Point> {
        self.get(kind)
            .filter(|keypoint| keypoint.is_confident(threshold))
            .map(|keypoint| keypoint.point)
    }

    /// Every detected keypoint, duplicates included.
    pub(crate) fn keypoints(&self) -> impl Iterator<Item = &Keypoint> {
        self.keypoints.iter().flatten().chain(self.duplicates.iter())
    }

    pub(crate) fn keypoints_mut(&mut self) -> impl Iterator<Item = &mut Keypoint> {
        self.keypoints
            .iter_mut()
            .flatten()
            .chain(self.duplicates.iter_mut())
    }
}

pub(crate) mod constants {
    use crate::pose::KeypointKind::{self, *};

    pub(crate) const CONFIDENCE_THRESHOLD: f32 = 0.5;

    pub(crate) const SKELETON_CONNECTIONS: [(KeypointKind, KeypointKind); 16] = [
        (Nose, LeftEye),
        (Nose, RightEye),
        (LeftEye, LeftEar),
        (RightEye, RightEar),
        (LeftShoulder, RightShoulder),
        (LeftShoulder, LeftElbow),
        (LeftElbow, LeftWrist),
        (RightShoulder, RightElbow),
        (RightElbow, RightWrist),
        (RightShoulder, RightHip),
        (LeftShoulder, LeftHip),
        (LeftHip, RightHip),
        (LeftHip, LeftKnee),
        (LeftKnee, LeftAnkle),
        (RightHip, RightKnee),
        (RightKnee, RightAnkle),
    ];

    pub(crate) const BACK_ANGLE_PARTS: [KeypointKind; 6] = [
        LeftShoulder,
        RightShoulder,
        LeftHip,
        RightHip,
        LeftKnee,
        RightKnee,
    ];
}
