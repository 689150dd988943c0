use crate::error::Error;

/// Pixel dimensions of a video frame.
pub(crate) trait FrameSize {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Where video frames come from.
pub(crate) trait FrameSource {
    type Frame: FrameSize;

    /// Grab the latest frame. The frame is only valid until the next grab.
    fn grab(&mut self) -> Result<&Self::Frame, Error>;
}

/// An empty frame of fixed size, for running without a capture device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct BlankFrame {
    width: u32,
    height: u32,
}

impl FrameSize for BlankFrame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

/// Produces blank frames forever.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Blank {
    frame: BlankFrame,
}

impl Blank {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            frame: BlankFrame { width, height },
        }
    }
}

impl FrameSource for Blank {
    type Frame = BlankFrame;

    fn grab(&mut self) -> Result<&Self::Frame, Error> {
        Ok(&self.frame)
    }
}

#[cfg(feature = "gui")]
pub(crate) use self::capture::Camera;

#[cfg(feature = "gui")]
mod capture {
    use super::{FrameSize, FrameSource};
    use crate::error::Error;
    use num_traits::ToPrimitive;
    use opencv::{
        core::{Mat, CV_8UC3},
        prelude::*,
        videoio::{VideoCapture, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH, CAP_V4L2},
    };
    use tracing::info;

    impl FrameSize for Mat {
        fn width(&self) -> u32 {
            self.cols().to_u32().unwrap_or_default()
        }

        fn height(&self) -> u32 {
            self.rows().to_u32().unwrap_or_default()
        }
    }

    /// A V4L2 webcam.
    pub(crate) struct Camera {
        capture: VideoCapture,
        frame: Mat,
    }

    impl Camera {
        pub(crate) fn open(device: i32, width: u32, height: u32) -> Result<Self, Error> {
            let mut capture =
                VideoCapture::new(device, CAP_V4L2).map_err(|_| Error::OpenCamera(device))?;
            if !capture
                .is_opened()
                .map_err(|_| Error::OpenCamera(device))?
            {
                return Err(Error::OpenCamera(device));
            }

            capture
                .set(CAP_PROP_FRAME_WIDTH, f64::from(width))
                .map_err(Error::ConfigureCamera)?;
            capture
                .set(CAP_PROP_FRAME_HEIGHT, f64::from(height))
                .map_err(Error::ConfigureCamera)?;

            info!(
                message = "opened video capture",
                device,
                width = capture.get(CAP_PROP_FRAME_WIDTH).map_err(Error::ConfigureCamera)?,
                height = capture.get(CAP_PROP_FRAME_HEIGHT).map_err(Error::ConfigureCamera)?,
            );

            let frame = Mat::zeros(
                height.to_i32().ok_or(Error::ConvertToI32)?,
                width.to_i32().ok_or(Error::ConvertToI32)?,
                CV_8UC3,
            )
            .and_then(|zeros| zeros.to_mat())
            .map_err(Error::ConfigureCamera)?;

            Ok(Self { capture, frame })
        }
    }

    impl FrameSource for Camera {
        type Frame = Mat;

        fn grab(&mut self) -> Result<&Self::Frame, Error> {
            if !self.capture.read(&mut self.frame).map_err(Error::ReadFrame)? {
                return Err(Error::EmptyFrame);
            }
            Ok(&self.frame)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Blank, FrameSize, FrameSource};

    #[test]
    fn blank_frames_keep_their_size() {
        let mut source = Blank::new(640, 480);
        let frame = source.grab().unwrap();
        assert_eq!((frame.width(), frame.height()), (640, 480));
        let frame = *frame;
        assert_eq!(*source.grab().unwrap(), frame);
    }
}
