use std::fmt::Display;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use strum::{AsRefStr, Display, EnumString};

pub const ALERT_TIMEOUT: Duration = Duration::from_millis(5000);
pub const TOAST_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(AsRefStr, EnumString, Debug, Display, PartialEq, Eq, Copy, Clone)]
#[strum(serialize_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Danger,
    Warning,
    Info,
}

impl NoticeKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NoticeKind::Success => "check-circle",
            NoticeKind::Danger => "exclamation-triangle",
            NoticeKind::Warning => "exclamation-triangle",
            NoticeKind::Info => "info-circle",
        }
    }

    /// Success and info notices are cleared when a page finishes loading
    pub fn is_transient(&self) -> bool {
        matches!(self, NoticeKind::Success | NoticeKind::Info)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeStyle {
    Alert,
    Toast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub style: NoticeStyle,
    pub message: String,
    pub expires_at: Instant,
}

/// Transient user-facing messages, newest first.
#[derive(Debug)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
    next_id: u64,
    alert_timeout: Duration,
    toast_timeout: Duration,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(ALERT_TIMEOUT, TOAST_TIMEOUT)
    }
}

impl NoticeBoard {
    pub fn new(alert_timeout: Duration, toast_timeout: Duration) -> Self {
        Self {
            notices: Vec::new(),
            next_id: 1,
            alert_timeout,
            toast_timeout,
        }
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.first()
    }

    pub fn alert(&mut self, kind: NoticeKind, message: &str, now: Instant) -> u64 {
        let timeout = self.alert_timeout;
        self.push(kind, NoticeStyle::Alert, message, now + timeout)
    }

    pub fn toast(&mut self, kind: NoticeKind, message: &str, duration: Duration, now: Instant) -> u64 {
        self.push(kind, NoticeStyle::Toast, message, now + duration)
    }

    fn push(&mut self, kind: NoticeKind, style: NoticeStyle, message: &str, expires_at: Instant) -> u64 {
        match kind {
            NoticeKind::Danger => error!("[{}] {}", kind, message),
            NoticeKind::Warning => warn!("[{}] {}", kind, message),
            NoticeKind::Success | NoticeKind::Info => info!("[{}] {}", kind, message),
        }

        let id = self.next_id;
        self.next_id += 1;
        self.notices.insert(
            0,
            Notice {
                id,
                kind,
                style,
                message: message.to_string(),
                expires_at,
            },
        );
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Drops every notice whose time is up. Returns how many were dropped.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.notices.len();
        self.notices.retain(|n| n.expires_at > now);
        before - self.notices.len()
    }

    /// Success and info notices go away at `deadline`. Problems stay until
    /// their own expiry.
    pub fn hide_transient_after(&mut self, deadline: Instant) {
        for notice in self.notices.iter_mut().filter(|n| n.kind.is_transient()) {
            notice.expires_at = deadline;
        }
    }

    /// Unexpected failures are always logged; a toast is only shown in a
    /// development context.
    pub fn report_unexpected(&mut self, err: &dyn Display, dev_context: bool, now: Instant) {
        error!("Unexpected error: {}", err);
        if dev_context {
            let timeout = self.toast_timeout;
            self.toast(
                NoticeKind::Danger,
                "An unexpected error occurred. Check the log.",
                timeout,
                now,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icons() {
        assert_eq!(NoticeKind::Success.icon(), "check-circle");
        assert_eq!(NoticeKind::Danger.icon(), "exclamation-triangle");
        assert_eq!(NoticeKind::Warning.icon(), "exclamation-triangle");
        assert_eq!(NoticeKind::Info.icon(), "info-circle");
    }

    #[test]
    fn test_kind_strings() {
        assert_eq!(NoticeKind::Danger.to_string(), "danger");
        assert_eq!("warning".parse::<NoticeKind>().unwrap(), NoticeKind::Warning);
    }

    #[test]
    fn test_newest_first() {
        let now = Instant::now();
        let mut board = NoticeBoard::default();
        board.alert(NoticeKind::Info, "first", now);
        board.alert(NoticeKind::Success, "second", now);
        assert_eq!(board.latest().unwrap().message, "second");
        assert_eq!(board.notices().len(), 2);
    }

    #[test]
    fn test_alerts_and_toasts_expire() {
        let now = Instant::now();
        let mut board = NoticeBoard::default();
        board.alert(NoticeKind::Success, "saved", now);
        board.toast(NoticeKind::Info, "copied", TOAST_TIMEOUT, now);

        assert_eq!(board.expire(now + Duration::from_millis(2999)), 0);
        assert_eq!(board.expire(now + Duration::from_millis(3000)), 1);
        assert_eq!(board.latest().unwrap().message, "saved");
        assert_eq!(board.expire(now + ALERT_TIMEOUT), 1);
        assert!(board.notices().is_empty());
    }

    #[test]
    fn test_hide_transient_keeps_problems() {
        let now = Instant::now();
        let mut board = NoticeBoard::default();
        board.alert(NoticeKind::Success, "ok", now);
        board.alert(NoticeKind::Danger, "failed", now);
        board.alert(NoticeKind::Info, "fyi", now);
        board.alert(NoticeKind::Warning, "careful", now);

        board.hide_transient_after(now + Duration::from_millis(1000));
        assert_eq!(board.expire(now + Duration::from_millis(999)), 0);
        assert_eq!(board.expire(now + Duration::from_millis(1000)), 2);
        let kinds: Vec<_> = board.notices().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NoticeKind::Warning, NoticeKind::Danger]);
    }

    #[test]
    fn test_dismiss_by_id() {
        let now = Instant::now();
        let mut board = NoticeBoard::default();
        let id = board.alert(NoticeKind::Info, "x", now);
        assert!(board.dismiss(id));
        assert!(!board.dismiss(id));
    }

    #[test]
    fn test_report_unexpected_only_shows_in_dev() {
        let now = Instant::now();
        let mut board = NoticeBoard::default();

        board.report_unexpected(&"boom", false, now);
        assert!(board.notices().is_empty());

        board.report_unexpected(&"boom", true, now);
        let notice = board.latest().unwrap();
        assert_eq!(notice.kind, NoticeKind::Danger);
        assert_eq!(notice.style, NoticeStyle::Toast);
        assert_eq!(notice.expires_at, now + TOAST_TIMEOUT);
    }
}
