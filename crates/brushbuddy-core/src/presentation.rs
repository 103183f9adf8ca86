//! Presentation port and display helpers.
//!
//! The routine core talks to whatever renders it (a terminal, a window, a
//! test recorder) only through [`PresentationPort`]. Adapters decide how to
//! draw text, the progress ring and the avatar; the helpers here compute the
//! values every adapter needs.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PresentationError;
use crate::events::Event;
use crate::setup::{AudioSource, Identity, Setup};

/// Avatar stage shown on the completion screen.
pub const COMPLETION_STAGE: u8 = 5;

pub type PortResult = Result<(), PresentationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Setup,
    Active,
    Completion,
}

/// The step a `StepStarted` event announces, borrowed from the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepView<'a> {
    pub step_index: usize,
    pub title: &'a str,
    pub description: &'a str,
    pub visual_stage: u8,
    pub duration_secs: u32,
}

/// Every rendering adapter implements this trait.
///
/// Each routine event has its own hook and every method defaults to a
/// no-op, so an adapter only overrides what it draws. Errors are reported
/// back to the session, which logs and ignores them.
pub trait PresentationPort {
    /// A step began; its countdown is full. `setup` carries the avatar.
    fn on_step_started(&mut self, _step: StepView<'_>, _setup: &Setup) -> PortResult {
        Ok(())
    }

    fn on_tick(&mut self, _remaining_secs: u32, _total_secs: u32) -> PortResult {
        Ok(())
    }

    fn on_paused_changed(&mut self, _is_paused: bool) -> PortResult {
        Ok(())
    }

    fn on_routine_completed(&mut self, _at: DateTime<Utc>, _setup: &Setup) -> PortResult {
        Ok(())
    }

    fn on_routine_stopped(&mut self) -> PortResult {
        Ok(())
    }

    /// Entry point used by the session for every event. Routes to the hook
    /// for that event; adapters that handle events wholesale (a JSON
    /// stream, say) may override it.
    fn present(&mut self, event: &Event, setup: &Setup) -> PortResult {
        dispatch_event(self, event, setup)
    }

    fn show_screen(&mut self, _screen: Screen) -> PortResult {
        Ok(())
    }

    fn play_audio(&mut self, _source: &AudioSource) -> PortResult {
        Ok(())
    }

    fn pause_audio(&mut self) -> PortResult {
        Ok(())
    }

    /// Seek the audio back to the beginning.
    fn rewind_audio(&mut self) -> PortResult {
        Ok(())
    }
}

/// Route `event` to the matching per-event hook of `port`. Snapshots have
/// no hook and are ignored.
pub fn dispatch_event<P>(port: &mut P, event: &Event, setup: &Setup) -> PortResult
where
    P: PresentationPort + ?Sized,
{
    match event {
        Event::StepStarted {
            step_index,
            title,
            description,
            visual_stage,
            duration_secs,
            ..
        } => port.on_step_started(
            StepView {
                step_index: *step_index,
                title,
                description,
                visual_stage: *visual_stage,
                duration_secs: *duration_secs,
            },
            setup,
        ),
        Event::Tick {
            remaining_secs,
            total_secs,
            ..
        } => port.on_tick(*remaining_secs, *total_secs),
        Event::PausedChanged { is_paused, .. } => port.on_paused_changed(*is_paused),
        Event::RoutineCompleted { at } => port.on_routine_completed(*at, setup),
        Event::RoutineStopped { .. } => port.on_routine_stopped(),
        Event::StateSnapshot { .. } => Ok(()),
    }
}

/// `m:ss`, e.g. `1:05`.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Circular countdown indicator drawn as a dashed stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressRing {
    pub radius: f64,
}

impl ProgressRing {
    pub const DEFAULT_RADIUS: f64 = 52.0;

    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub fn circumference(&self) -> f64 {
        self.radius * 2.0 * PI
    }

    /// Stroke offset for the remaining fraction: 0 when full, the whole
    /// circumference when empty.
    pub fn dash_offset(&self, remaining_secs: u32, total_secs: u32) -> f64 {
        let c = self.circumference();
        if total_secs == 0 {
            return c;
        }
        let fraction = f64::from(remaining_secs.min(total_secs)) / f64::from(total_secs);
        c - fraction * c
    }
}

impl Default for ProgressRing {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RADIUS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarImage {
    pub path: PathBuf,
    pub glowing: bool,
}

/// Maps an identity and visual stage to an image under `asset_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarAssets {
    asset_dir: PathBuf,
}

impl AvatarAssets {
    pub fn new(asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            asset_dir: asset_dir.into(),
        }
    }

    pub fn asset_dir(&self) -> &Path {
        &self.asset_dir
    }

    pub fn image(&self, identity: &Identity, stage: u8) -> AvatarImage {
        AvatarImage {
            path: self
                .asset_dir
                .join(format!("avatar_{}_stage{}.png", identity.as_str(), stage)),
            glowing: false,
        }
    }

    /// Final, glowing image for the completion screen.
    pub fn completion_image(&self, identity: &Identity) -> AvatarImage {
        AvatarImage {
            glowing: true,
            ..self.image(identity, COMPLETION_STAGE)
        }
    }
}

impl Default for AvatarAssets {
    fn default() -> Self {
        Self::new("assets")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(9), "0:09");
        assert_eq!(format_clock(30), "0:30");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(600), "10:00");
    }

    #[test]
    fn clock_formatting_past_u32() {
        let secs = u64::from(u32::MAX) + 61;
        assert_eq!(format_clock(secs), format!("{}:{:02}", secs / 60, secs % 60));
        assert_eq!(format_clock(secs), "71582789:16");
    }

    #[derive(Default)]
    struct Hooks {
        seen: Vec<String>,
    }

    impl PresentationPort for Hooks {
        fn on_step_started(&mut self, step: StepView<'_>, setup: &Setup) -> PortResult {
            let who = setup.identity().map(Identity::as_str).unwrap_or("-");
            self.seen.push(format!("step:{}:{}:{who}", step.step_index, step.title));
            Ok(())
        }

        fn on_tick(&mut self, remaining_secs: u32, total_secs: u32) -> PortResult {
            self.seen.push(format!("tick:{remaining_secs}/{total_secs}"));
            Ok(())
        }

        fn on_paused_changed(&mut self, is_paused: bool) -> PortResult {
            self.seen.push(format!("paused:{is_paused}"));
            Ok(())
        }

        fn on_routine_stopped(&mut self) -> PortResult {
            Err(PresentationError::new("on_routine_stopped", "display gone"))
        }
    }

    #[test]
    fn present_routes_events_to_hooks() {
        let mut setup = Setup::new();
        setup.select_identity("kitty").unwrap();
        let at = Utc::now();
        let mut port = Hooks::default();

        port.present(
            &Event::StepStarted {
                step_index: 2,
                title: "From the Top".into(),
                description: String::new(),
                visual_stage: 3,
                duration_secs: 30,
                at,
            },
            &setup,
        )
        .unwrap();
        port.present(&Event::Tick { remaining_secs: 29, total_secs: 30, at }, &setup)
            .unwrap();
        port.present(&Event::PausedChanged { is_paused: true, at }, &setup)
            .unwrap();
        // No override: the default hook accepts it.
        port.present(&Event::RoutineCompleted { at }, &setup).unwrap();

        assert_eq!(
            port.seen,
            vec!["step:2:From the Top:kitty", "tick:29/30", "paused:true"]
        );
        let err = port
            .present(&Event::RoutineStopped { at }, &setup)
            .unwrap_err();
        assert_eq!(err.operation, "on_routine_stopped");
    }

    #[test]
    fn default_hooks_accept_everything() {
        struct Silent;
        impl PresentationPort for Silent {}

        let at = Utc::now();
        let setup = Setup::new();
        let mut port = Silent;
        assert!(port.present(&Event::RoutineStopped { at }, &setup).is_ok());
        assert!(port.on_tick(1, 2).is_ok());
        assert!(port.show_screen(Screen::Completion).is_ok());
    }

    #[test]
    fn ring_offsets() {
        let ring = ProgressRing::default();
        let c = ring.circumference();
        assert!((c - 326.725).abs() < 0.01);
        assert_eq!(ring.dash_offset(30, 30), 0.0);
        assert!((ring.dash_offset(15, 30) - c / 2.0).abs() < 1e-9);
        assert!((ring.dash_offset(0, 30) - c).abs() < 1e-9);
        assert!((ring.dash_offset(5, 0) - c).abs() < 1e-9);
    }

    #[test]
    fn avatar_paths() {
        let assets = AvatarAssets::default();
        let id = Identity::new("kitty").unwrap();
        let img = assets.image(&id, 3);
        assert_eq!(img.path, PathBuf::from("assets/avatar_kitty_stage3.png"));
        assert!(!img.glowing);

        let done = assets.completion_image(&id);
        assert_eq!(done.path, PathBuf::from("assets/avatar_kitty_stage5.png"));
        assert!(done.glowing);
    }
}
