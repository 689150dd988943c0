use crate::{camera::FrameSize, error::Error, geometry::Point, pose::Pose};
use ordered_float::OrderedFloat;

mod replay;

pub(crate) use replay::Replay;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Decoding {
    /// Keep only the strongest detection.
    SinglePerson,
    MultiPerson,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct EstimateOptions {
    pub(crate) flip_horizontal: bool,
    pub(crate) decoding: Decoding,
    pub(crate) max_detections: usize,
}

impl Default for EstimateOptions {
    fn default() -> Self {
        Self {
            flip_horizontal: false,
            decoding: Decoding::MultiPerson,
            max_detections: 5,
        }
    }
}

impl EstimateOptions {
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.max_detections == 0 {
            Err(Error::ZeroMaxDetections)
        } else {
            Ok(())
        }
    }

    /// Bound, select and mirror raw detections according to these options.
    pub(crate) fn apply<F>(&self, mut poses: Vec<Pose>, frame: &F) -> Result<Vec<Pose>, Error>
    where
        F: FrameSize,
    {
        match self.decoding {
            Decoding::SinglePerson => {
                poses = poses
                    .into_iter()
                    .max_by_key(|pose| OrderedFloat(pose.score))
                    .into_iter()
                    .collect();
            }
            Decoding::MultiPerson => poses.truncate(self.max_detections),
        }

        if self.flip_horizontal {
            // pixel columns run 0..width, so column x maps to width - 1 - x
            let last_column = frame.width() as f32 - 1.0;
            for keypoint in poses.iter_mut().flat_map(|pose| pose.keypoints_mut()) {
                let point = keypoint.point;
                keypoint.point = Point::new(last_column - point.x(), point.y())?;
            }
        }
        Ok(poses)
    }
}

/// Something that finds people in a frame.
pub(crate) trait PoseEstimator<F> {
    fn estimate_poses(&mut self, frame: &F, options: &EstimateOptions) -> Result<Vec<Pose>, Error>;
}
