use super::{EstimateOptions, PoseEstimator};
use crate::{
    camera::FrameSize,
    error::Error,
    geometry::Point,
    pose::{Keypoint, KeypointKind, Pose},
};
use serde::Deserialize;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct RecordedPosition {
    x: f32,
    y: f32,
}

#[derive(Debug, Deserialize)]
struct RecordedKeypoint {
    part: String,
    position: RecordedPosition,
    score: f32,
}

#[derive(Debug, Deserialize)]
struct RecordedPose {
    #[serde(default)]
    score: f32,
    keypoints: Vec<RecordedKeypoint>,
}

impl RecordedPose {
    fn into_pose(self) -> Result<Pose, Error> {
        let keypoints = self
            .keypoints
            .into_iter()
            .map(|RecordedKeypoint { part, position, score }| {
                Ok(Keypoint {
                    kind: part.parse::<KeypointKind>()?,
                    point: Point::new(position.x, position.y)?,
                    score,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Pose::from_keypoints(keypoints, self.score)
    }
}

/// Plays back PoseNet output recorded as JSON lines, one frame per line.
///
/// Each line is an array of `{"score", "keypoints": [{"part", "position": {"x", "y"}, "score"}]}`
/// objects. Playback wraps around at the end of the recording. Lines are parsed
/// as they are played, so a bad line fails only its own frame.
pub(crate) struct Replay {
    path: PathBuf,
    frames: Vec<(usize, String)>,
    next: usize,
}

impl Replay {
    pub(crate) fn open<P>(path: P) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| Error::OpenRecording(e, path.clone()))?;

        let mut frames = Vec::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line_number = i + 1;
            let line = line.map_err(|e| Error::ReadRecording(e, line_number))?;
            if !line.trim().is_empty() {
                frames.push((line_number, line));
            }
        }

        if frames.is_empty() {
            return Err(Error::EmptyRecording(path));
        }

        info!(message = "loaded pose recording", path = ?path, frames = frames.len());
        Ok(Self {
            path,
            frames,
            next: 0,
        })
    }

    fn next_frame(&mut self) -> Result<Vec<Pose>, Error> {
        let (line_number, line) = &self.frames[self.next];
        self.next += 1;
        if self.next == self.frames.len() {
            debug!(message = "rewinding pose recording", path = ?self.path);
            self.next = 0;
        }

        serde_json::from_str::<Vec<RecordedPose>>(line)
            .map_err(|e| Error::ParseRecordedFrame(e, *line_number))?
            .into_iter()
            .map(RecordedPose::into_pose)
            .collect()
    }
}

impl<F> PoseEstimator<F> for Replay
where
    F: FrameSize,
{
    fn estimate_poses(&mut self, frame: &F, options: &EstimateOptions) -> Result<Vec<Pose>, Error> {
        let poses = self.next_frame()?;
        options.apply(poses, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::Replay;
    use crate::{
        camera::{Blank, FrameSource},
        estimate::{EstimateOptions, PoseEstimator},
        pose::KeypointKind,
    };
    use std::{fs, path::PathBuf};

    /// Write `contents` to a fresh file under the temp dir.
    fn recording(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "pose-overlay-{}-{}.jsonl",
            std::process::id(),
            name
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    const TWO_FRAMES: &str = r#"
[{"score": 0.8, "keypoints": [{"part": "nose", "position": {"x": 10.0, "y": 20.0}, "score": 0.9}, {"part": "leftHip", "position": {"x": 30.0, "y": 40.0}, "score": 0.4}]}]

[]
"#;

    #[test]
    fn plays_frames_in_order_and_wraps() {
        let path = recording("wraps", TWO_FRAMES);
        let mut replay = Replay::open(&path).unwrap();
        let mut source = Blank::new(640, 480);
        let frame = *source.grab().unwrap();
        let options = EstimateOptions::default();

        let first = replay.estimate_poses(&frame, &options).unwrap();
        assert_eq!(first.len(), 1);
        let nose = first[0].get(KeypointKind::Nose).unwrap();
        assert_eq!((nose.point.x(), nose.point.y(), nose.score), (10.0, 20.0, 0.9));
        assert_eq!(first[0].get(KeypointKind::LeftHip).unwrap().score, 0.4);
        assert!(first[0].get(KeypointKind::RightHip).is_none());

        assert!(replay.estimate_poses(&frame, &options).unwrap().is_empty());
        assert_eq!(replay.estimate_poses(&frame, &options).unwrap(), first);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn bad_lines_fail_only_their_frame() {
        let path = recording(
            "bad-line",
            "not json\n[{\"keypoints\": [{\"part\": \"tail\", \"position\": {\"x\": 1, \"y\": 2}, \"score\": 1}]}]\n[]\n",
        );
        let mut replay = Replay::open(&path).unwrap();
        let frame = *Blank::new(640, 480).grab().unwrap();
        let options = EstimateOptions::default();

        assert!(replay.estimate_poses(&frame, &options).is_err());
        assert!(replay.estimate_poses(&frame, &options).is_err());
        assert!(replay.estimate_poses(&frame, &options).unwrap().is_empty());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn empty_or_missing_recordings_are_rejected() {
        let path = recording("empty", "\n\n");
        assert!(Replay::open(&path).is_err());
        fs::remove_file(&path).unwrap();
        assert!(Replay::open(&path).is_err());
    }
}
