#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("failed to construct NotNan from f32: {1}")]
    NanCoordinate(#[source] ordered_float::FloatIsNan, f32),

    #[error("failed to convert usize value to keypoint kind: {0}")]
    ConvertUSizeToKeypointKind(usize),

    #[error("failed to convert keypoint variant to usize: {0:?}")]
    KeypointVariantToUSize(crate::pose::KeypointKind),

    #[error("unknown keypoint label: {0:?}")]
    UnknownKeypointLabel(String),

    #[error("failed to convert value to i32")]
    ConvertToI32,

    #[error("max detections must be positive")]
    ZeroMaxDetections,

    #[error("failed to open pose recording: {1:?}")]
    OpenRecording(#[source] std::io::Error, std::path::PathBuf),

    #[error("failed to read pose recording line {1}")]
    ReadRecording(#[source] std::io::Error, usize),

    #[error("pose recording is empty: {0:?}")]
    EmptyRecording(std::path::PathBuf),

    #[error("failed to parse recorded frame on line {1}")]
    ParseRecordedFrame(#[source] serde_json::Error, usize),

    #[cfg(feature = "gui")]
    #[error("failed to open video capture device {0}")]
    OpenCamera(i32),

    #[cfg(feature = "gui")]
    #[error("failed to configure video capture")]
    ConfigureCamera(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("failed to read frame")]
    ReadFrame(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("video capture returned no frame")]
    EmptyFrame,

    #[cfg(feature = "gui")]
    #[error("failed to allocate canvas")]
    AllocateCanvas(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("failed to clear rectangle")]
    ClearRect(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("failed to draw image")]
    DrawImage(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("failed to draw line")]
    DrawLine(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("failed to draw circle")]
    DrawCircle(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("failed to draw text")]
    PutText(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("failed to show image")]
    ImShow(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("failed to wait for key press")]
    WaitKey(#[source] opencv::Error),

    #[cfg(feature = "gui")]
    #[error("failed to convert {0:?} to an integer pixel coordinate")]
    ConvertPointToPoint2i(crate::geometry::Point),

    #[cfg(test)]
    #[error("scripted failure: {0}")]
    Scripted(&'static str),
}
