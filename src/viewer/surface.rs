//! Rendering targets for notifications.

use std::io::Write;

use crate::viewer::presenter::ActiveNotification;

/// Where the viewer draws. Implementations must be cheap; they are called
/// while the presenter holds its state lock.
pub trait NotificationSurface: Send + Sync {
    /// Connection indicator.
    fn set_connected(&self, connected: bool);

    /// Show `notification`, replacing whatever is on screen.
    fn render(&self, notification: &ActiveNotification);

    /// Start the fade-out transition.
    fn fade_out(&self);

    /// Remove the notification.
    fn hide(&self);

    /// Show a transient error.
    fn show_error(&self, message: &str);

    /// Remove the transient error.
    fn clear_error(&self) {}
}

/// Plain stdout rendering for `tip-cli watch`.
#[derive(Debug, Default)]
pub struct TerminalSurface;

impl TerminalSurface {
    fn line(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }
}

impl NotificationSurface for TerminalSurface {
    fn set_connected(&self, connected: bool) {
        self.line(if connected { "🟢 Connected" } else { "🔴 Offline" });
    }

    fn render(&self, n: &ActiveNotification) {
        let from: String = n.from_address.chars().take(8).collect();
        self.line(&format!(
            "🎉 New Tip Received! {} AR (≈ ${} USD) from {}...  [until {}]",
            n.amount,
            n.usd_value,
            from,
            n.expires_at.format("%H:%M:%S")
        ));
    }

    fn fade_out(&self) {
        self.line("   ...fading");
    }

    fn hide(&self) {
        self.line("   (cleared)");
    }

    fn show_error(&self, message: &str) {
        self.line(&format!("⚠️  Error: {message}"));
    }
}
