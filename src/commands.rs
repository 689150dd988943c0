use crate::error::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    ToggleMode,
    Quit,
}

/// Source of user commands, polled once per frame.
pub(crate) trait Commands {
    fn poll(&mut self) -> Result<Option<Command>, Error>;
}

/// Never issues a command.
#[derive(Debug, Default)]
pub(crate) struct Idle;

impl Commands for Idle {
    fn poll(&mut self) -> Result<Option<Command>, Error> {
        Ok(None)
    }
}

#[cfg(any(feature = "gui", test))]
fn command_for_key(key: i32) -> Option<Command> {
    const ESC: i32 = 27;
    match key {
        k if k == i32::from(b'm') || k == i32::from(b' ') => Some(Command::ToggleMode),
        k if k == i32::from(b'q') || k == ESC => Some(Command::Quit),
        _ => None,
    }
}

/// Reads keys from the highgui window: `m` or space toggles the mode, `q` or
/// escape quits.
#[cfg(feature = "gui")]
pub(crate) struct Keyboard {
    wait_key_ms: i32,
}

#[cfg(feature = "gui")]
impl Keyboard {
    pub(crate) fn new(wait_key_ms: i32) -> Self {
        Self { wait_key_ms }
    }
}

#[cfg(feature = "gui")]
impl Commands for Keyboard {
    fn poll(&mut self) -> Result<Option<Command>, Error> {
        let key = opencv::highgui::wait_key(self.wait_key_ms).map_err(Error::WaitKey)?;
        Ok(command_for_key(key))
    }
}
