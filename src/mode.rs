use std::{fmt, str::FromStr};

/// Which visual aid is drawn on top of the skeleton.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum DisplayMode {
    /// Shoulder line plus a perpendicular through its midpoint.
    CenterLine,
    /// Shoulder-hip-knee angle readout.
    BackAngle,
}

impl Default for DisplayMode {
    fn default() -> Self {
        Self::CenterLine
    }
}

impl DisplayMode {
    fn other(self) -> Self {
        match self {
            Self::CenterLine => Self::BackAngle,
            Self::BackAngle => Self::CenterLine,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CenterLine => "center-line",
            Self::BackAngle => "back-angle",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown display mode {0:?}, expected one of: center-line, back-angle")]
pub(crate) struct ParseDisplayModeError(String);

impl FromStr for DisplayMode {
    type Err = ParseDisplayModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center-line" => Ok(Self::CenterLine),
            "back-angle" => Ok(Self::BackAngle),
            _ => Err(ParseDisplayModeError(s.to_owned())),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct ModeController {
    mode: DisplayMode,
}

impl ModeController {
    pub(crate) fn new(mode: DisplayMode) -> Self {
        Self { mode }
    }

    pub(crate) fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Flip to the other mode and return it.
    pub(crate) fn toggle(&mut self) -> DisplayMode {
        self.mode = self.mode.other();
        self.mode
    }
}
