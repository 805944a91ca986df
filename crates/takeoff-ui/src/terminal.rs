//! Terminal detection utilities.

use std::env;

/// Returns `true` if stdout is connected to a terminal (TTY).
pub fn is_tty() -> bool {
    crossterm::tty::IsTty::is_tty(&std::io::stdout())
}

/// Determines if ANSI color codes should be used.
///
/// Honours `NO_COLOR` (any value), `CLICOLOR=0`, `TERM=dumb`, and
/// `CLICOLOR_FORCE` (any value), in that order, then falls back to TTY
/// detection.
pub fn supports_color() -> bool {
    color_decision(
        env::var_os("NO_COLOR").is_some(),
        env::var("CLICOLOR").ok().as_deref(),
        env::var("TERM").ok().as_deref(),
        env::var_os("CLICOLOR_FORCE").is_some(),
        is_tty,
    )
}

fn color_decision(
    no_color: bool,
    clicolor: Option<&str>,
    term: Option<&str>,
    force: bool,
    tty: impl FnOnce() -> bool,
) -> bool {
    if no_color || clicolor == Some("0") || term == Some("dumb") {
        return false;
    }
    force || tty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_color_beats_force() {
        assert!(!color_decision(true, None, None, true, || true));
        assert!(!color_decision(false, Some("0"), None, true, || true));
        assert!(!color_decision(false, None, Some("dumb"), true, || true));
    }

    #[test]
    fn force_beats_tty_detection() {
        assert!(color_decision(false, None, Some("xterm"), true, || false));
        assert!(color_decision(false, Some("1"), None, false, || true));
        assert!(!color_decision(false, None, None, false, || false));
    }
}
