//! Terminal presentation adapter.
//!
//! Text mode redraws a single countdown line per tick; JSON mode writes one
//! object per line so other programs can follow the routine.

use std::io::Write;
use std::path::PathBuf;

use brushbuddy_core::presentation::{dispatch_event, format_clock, PortResult};
use brushbuddy_core::{
    AudioSource, AvatarAssets, Event, PresentationError, PresentationPort, ProgressRing, Screen,
    Setup, StepView,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

const BAR_WIDTH: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

/// Non-event notices emitted in JSON mode.
#[derive(Serialize)]
#[serde(tag = "type")]
enum Notice<'a> {
    ScreenChanged { screen: Screen },
    Audio { action: &'a str, source: Option<String> },
}

pub struct TerminalPort<W: Write> {
    out: W,
    mode: OutputMode,
    assets: AvatarAssets,
    ring: ProgressRing,
    track_dir: PathBuf,
    step_count: usize,
    /// Offer the restart key on the completion screen.
    restart_hint: bool,
}

impl<W: Write> TerminalPort<W> {
    pub fn new(
        out: W,
        mode: OutputMode,
        assets: AvatarAssets,
        ring: ProgressRing,
        track_dir: PathBuf,
        step_count: usize,
    ) -> Self {
        Self {
            out,
            mode,
            assets,
            ring,
            track_dir,
            step_count,
            restart_hint: true,
        }
    }

    pub fn restart_hint(mut self, show: bool) -> Self {
        self.restart_hint = show;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_json<T: Serialize>(&mut self, value: &T) -> PortResult {
        let line = serde_json::to_string(value)
            .map_err(|e| PresentationError::new("serialize", e.to_string()))?;
        writeln!(self.out, "{line}").map_err(|e| PresentationError::new("write", e.to_string()))
    }

    fn write_text(&mut self, text: &str) -> PortResult {
        self.out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|e| PresentationError::new("write", e.to_string()))
    }

    fn countdown_line(&self, remaining: u32, total: u32) -> String {
        let circumference = self.ring.circumference();
        let elapsed = if circumference > 0.0 {
            self.ring.dash_offset(remaining, total) / circumference
        } else {
            1.0
        };
        let filled = BAR_WIDTH - ((elapsed * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
        format!(
            "\r    {:>5} [{}{}]",
            format_clock(u64::from(remaining)),
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled)
        )
    }
}

impl<W: Write> PresentationPort for TerminalPort<W> {
    fn present(&mut self, event: &Event, setup: &Setup) -> PortResult {
        match self.mode {
            OutputMode::Json => self.write_json(event),
            OutputMode::Text => dispatch_event(self, event, setup),
        }
    }

    fn on_step_started(&mut self, step: StepView<'_>, setup: &Setup) -> PortResult {
        let mut text = format!(
            "\n[{}/{}] {}\n    {}\n",
            step.step_index + 1,
            self.step_count,
            step.title,
            step.description
        );
        if let Some(identity) = setup.identity() {
            let image = self.assets.image(identity, step.visual_stage);
            text.push_str(&format!("    avatar: {}\n", image.path.display()));
        }
        text.push_str(&self.countdown_line(step.duration_secs, step.duration_secs));
        self.write_text(&text)
    }

    fn on_tick(&mut self, remaining_secs: u32, total_secs: u32) -> PortResult {
        let line = self.countdown_line(remaining_secs, total_secs);
        self.write_text(&line)
    }

    fn on_paused_changed(&mut self, is_paused: bool) -> PortResult {
        if is_paused {
            self.write_text("  (paused, press p to resume)")
        } else {
            self.write_text("\n")
        }
    }

    fn on_routine_completed(&mut self, at: DateTime<Utc>, setup: &Setup) -> PortResult {
        let mut text = format!(
            "\n\nAll done at {}! Your hair is super shiny.\n",
            at.with_timezone(&chrono::Local).format("%H:%M")
        );
        if let Some(identity) = setup.identity() {
            let image = self.assets.completion_image(identity);
            text.push_str(&format!("    avatar: {} (glowing)\n", image.path.display()));
        }
        if self.restart_hint {
            text.push_str("Press r to brush again or q to quit.\n");
        }
        self.write_text(&text)
    }

    fn on_routine_stopped(&mut self) -> PortResult {
        self.write_text("\nRoutine stopped.\n")
    }

    fn show_screen(&mut self, screen: Screen) -> PortResult {
        match self.mode {
            OutputMode::Json => self.write_json(&Notice::ScreenChanged { screen }),
            OutputMode::Text if screen == Screen::Active => {
                self.write_text("Let's brush! Keys: p pause/resume, s skip, x stop, q quit.\n")
            }
            OutputMode::Text => Ok(()),
        }
    }

    fn play_audio(&mut self, source: &AudioSource) -> PortResult {
        let location = source.location(&self.track_dir);
        match self.mode {
            OutputMode::Json => self.write_json(&Notice::Audio {
                action: "play",
                source: Some(location.display().to_string()),
            }),
            OutputMode::Text => {
                let line = format!("    music: {} ({})\n", source.label(), location.display());
                self.write_text(&line)
            }
        }
    }

    fn pause_audio(&mut self) -> PortResult {
        match self.mode {
            OutputMode::Json => self.write_json(&Notice::Audio {
                action: "pause",
                source: None,
            }),
            OutputMode::Text => Ok(()),
        }
    }
}
