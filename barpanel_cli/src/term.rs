//! Terminal rendering of panel state.

use barpanel_traits::{ControlKind, Presentation};

/// Render a fixed-width progress bar like `[#####---------------] 25%`.
pub fn render_progress_bar(percent: u8, width: usize) -> String {
    let pct = usize::from(percent.min(100));
    let filled = pct * width / 100;
    let mut bar = String::with_capacity(width + 8);
    bar.push('[');
    for i in 0..width {
        bar.push(if i < filled { '#' } else { '-' });
    }
    bar.push(']');
    bar.push_str(&format!(" {pct}%"));
    bar
}

fn kind_name(kind: ControlKind) -> &'static str {
    match kind {
        ControlKind::Calibrate => "calibration",
        ControlKind::Prime => "priming",
    }
}

/// Presentation sink that writes panel updates to stdout.
#[derive(Debug)]
pub struct TermPresentation {
    bar_width: usize,
}

impl Default for TermPresentation {
    fn default() -> Self {
        Self::new()
    }
}

impl TermPresentation {
    pub fn new() -> Self {
        Self { bar_width: 20 }
    }
}

impl Presentation for TermPresentation {
    fn show_progress_overlay(&mut self, drink_name: &str) {
        println!("=== Mixing: {drink_name} ===");
    }

    fn update_progress(&mut self, percent: u8) {
        print!("\r{}", render_progress_bar(percent, self.bar_width));
        use std::io::Write;
        let _ = std::io::stdout().flush();
    }

    fn hide_progress_overlay(&mut self) {
        println!();
    }

    fn show_success(&mut self) {
        println!("Mixing complete. (`dismiss` to clear)");
    }

    fn hide_success(&mut self) {
        println!("--");
    }

    fn show_error(&mut self, message: &str) {
        println!("ERROR: {message} (`ack` to clear)");
    }

    fn hide_error(&mut self) {
        println!("--");
    }

    fn set_pump_selected(&mut self, pump_id: u8) {
        println!("pump {pump_id} selected");
    }

    fn set_control_active(&mut self, kind: ControlKind, active: bool) {
        let state = if active { "running" } else { "stopped" };
        println!("{} {state}", kind_name(kind));
    }

    fn set_elapsed_seconds(&mut self, kind: ControlKind, seconds: f32) {
        println!("{} ran for {seconds:.2} s", kind_name(kind));
    }

    fn set_hose_level(&mut self, hose_id: u8, percent: f32, low: bool) {
        let marker = if low { "  LOW" } else { "" };
        println!("hose {hose_id}: {percent:>5.1}%{marker}");
    }

    fn navigate(&mut self, path: &str) {
        tracing::debug!(path, "server redirect acknowledged");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(render_progress_bar(0, 10), "[----------] 0%");
        assert_eq!(render_progress_bar(50, 10), "[#####-----] 50%");
        assert_eq!(render_progress_bar(100, 10), "[##########] 100%");
    }

    #[test]
    fn progress_bar_clamps_above_hundred() {
        assert_eq!(render_progress_bar(250, 10), "[##########] 100%");
    }
}
