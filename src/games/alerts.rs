//! Audible/visual alert port
//!
//! Alerts are fire-and-forget. The engine logs a failed alert at debug level
//! and carries on; no game logic depends on an alert being delivered.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    /// Short beep during the last seconds of a countdown
    CountdownWarning,
    /// A betting or answer window ran out
    WindowClosed,
    RoundSettled,
    GameOver,
}

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("alert device unavailable: {0}")]
    Unavailable(String),
}

pub trait AlertPort {
    fn alert(&self, alert: Alert) -> Result<(), AlertError>;
}

/// Alert port for environments without sound
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAlerts;

impl AlertPort for SilentAlerts {
    fn alert(&self, _alert: Alert) -> Result<(), AlertError> {
        Ok(())
    }
}

/// Rings the terminal bell by writing BEL characters
pub struct TerminalBell<W: Write> {
    out: RefCell<W>,
}

impl TerminalBell<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    fn pattern(alert: Alert) -> &'static [u8] {
        match alert {
            Alert::CountdownWarning | Alert::WindowClosed | Alert::RoundSettled => b"\x07",
            Alert::GameOver => b"\x07\x07",
        }
    }
}

impl<W: Write> AlertPort for TerminalBell<W> {
    fn alert(&self, alert: Alert) -> Result<(), AlertError> {
        let mut out = self
            .out
            .try_borrow_mut()
            .map_err(|e| AlertError::Unavailable(e.to_string()))?;
        out.write_all(Self::pattern(alert))
            .and_then(|_| out.flush())
            .map_err(|e| AlertError::Unavailable(e.to_string()))
    }
}

/// Keeps every alert it receives; clones share the record
#[derive(Debug, Clone, Default)]
pub struct RecordingAlerts {
    seen: Rc<RefCell<Vec<Alert>>>,
}

impl RecordingAlerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> Vec<Alert> {
        self.seen.borrow().clone()
    }

    pub fn count(&self, alert: Alert) -> usize {
        self.seen.borrow().iter().filter(|a| **a == alert).count()
    }
}

impl AlertPort for RecordingAlerts {
    fn alert(&self, alert: Alert) -> Result<(), AlertError> {
        self.seen.borrow_mut().push(alert);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_bell_writes_bel() {
        let bell = TerminalBell::new(Vec::new());
        bell.alert(Alert::CountdownWarning).unwrap();
        bell.alert(Alert::GameOver).unwrap();
        assert_eq!(bell.out.borrow().as_slice(), b"\x07\x07\x07");
    }

    #[test]
    fn test_bell_reports_unavailable_device() {
        let bell = TerminalBell::new(BrokenPipe);
        assert!(matches!(
            bell.alert(Alert::WindowClosed),
            Err(AlertError::Unavailable(_))
        ));
    }

    #[test]
    fn test_recording_alerts() {
        let alerts = RecordingAlerts::new();
        let shared = alerts.clone();
        alerts.alert(Alert::RoundSettled).unwrap();
        SilentAlerts.alert(Alert::GameOver).unwrap();
        assert_eq!(shared.seen(), vec![Alert::RoundSettled]);
        assert_eq!(shared.count(Alert::GameOver), 0);
    }
}
