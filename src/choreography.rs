//! The scripted sequences of the experience.
//!
//! [`Choreography`] knows every animated target (portal scale, camera depth,
//! light reach, exposure, flash overlay, UI element styles) through weak
//! handles and builds the enter, return and intro sequences from them.
//! Timings scale with the configured expand duration `E`:
//!
//! | offset        | enter                                             |
//! |---------------|---------------------------------------------------|
//! | 0.0 / 0.1     | intro title and enter button fade out             |
//! | 0.5 (for E)   | progress, portal scale, camera push, light reach  |
//! | E - 1.5       | flash overlay in                                  |
//! | E - 1.0       | download section, sound toggle, audio fade in     |
//! | E - 0.5       | exposure spike                                    |
//! | E - 0.3       | exposure settles, flash fades out                 |
//! | E - 0.2       | download items revealed, staggered                |

use crate::audio::AudioCue;
use crate::config::PortalConfig;
use crate::easing::Ease;
use crate::interaction::TransitionScript;
use crate::param::ParamRef;
use crate::timeline::{Cue, Sequence};
use crate::ui::{ElementTargets, UiCue, UiElement, UiOverlay};

/// Point light reach while entered.
const LIGHT_DISTANCE_ENTERED: f32 = 60.0;
/// Point light reach at rest.
pub const LIGHT_DISTANCE_REST: f32 = 30.0;
/// Exposure peak during the flash.
const EXPOSURE_SPIKE: f32 = 5.0;
/// Exposure once through the portal.
const EXPOSURE_ENTERED: f32 = 1.1;
/// Exposure at rest.
pub const EXPOSURE_REST: f32 = 0.9;
/// Length of the collapse phase of the return sequence.
const RETURN_DURATION: f32 = 3.5;

/// Scene and camera params the sequences animate.
#[derive(Debug, Clone)]
pub struct ChoreographyTargets {
    pub portal_scale: ParamRef,
    pub camera_z: ParamRef,
    pub light_distance: ParamRef,
    pub exposure: ParamRef,
    pub flash: ParamRef,
}

/// Builds the transition, intro and reveal sequences.
#[derive(Debug, Clone)]
pub struct Choreography {
    targets: ChoreographyTargets,
    ui: Vec<ElementTargets>,
    expand_duration: f32,
    expand_scale: f32,
    base_scale: f32,
    camera_rest: f32,
    camera_push: f32,
}

impl Choreography {
    pub fn new(
        config: &PortalConfig,
        base_scale: f32,
        targets: ChoreographyTargets,
        overlay: &UiOverlay,
    ) -> Self {
        Self {
            targets,
            ui: UiElement::ALL.iter().map(|&e| overlay.targets(e)).collect(),
            expand_duration: config.expand_duration.max(1.5),
            expand_scale: config.portal_expand_scale,
            base_scale,
            camera_rest: config.camera_z,
            camera_push: config.camera_push,
        }
    }

    /// Portal scale the return sequence collapses back to.
    pub fn set_base_scale(&mut self, scale: f32) {
        self.base_scale = scale;
    }

    pub fn base_scale(&self) -> f32 {
        self.base_scale
    }

    pub fn expand_duration(&self) -> f32 {
        self.expand_duration
    }

    /// Played once assets are loaded: drop the loading screen, then show
    /// the intro title and enter button.
    pub fn intro_sequence(&self) -> Sequence {
        Sequence::new("intro")
            .cue(0.5, UiCue::HideLoadingScreen)
            .to(&self.ui(UiElement::Title).opacity, 2.0, 0.0, 1.0, Ease::Linear)
            .to(&self.ui(UiElement::EnterButton).opacity, 2.0, 0.0, 1.0, Ease::Linear)
    }

    fn ui(&self, element: UiElement) -> &ElementTargets {
        &self.ui[element.index()]
    }

    fn intro_fade_out(&self) -> Sequence {
        let title = self.ui(UiElement::Title);
        let button = self.ui(UiElement::EnterButton);
        let ease = Ease::PowerInOut(2);
        Sequence::new("intro fade out")
            .to(&title.opacity, 0.0, 1.2, 0.0, ease)
            .to(&title.offset_y, 0.0, 1.2, -40.0, ease)
            .to(&button.opacity, 0.1, 1.0, 0.0, ease)
            .to(&button.scale, 0.1, 1.0, 0.95, ease)
            .to(&button.offset_y, 0.1, 1.0, 10.0, ease)
            .on_complete([Cue::Ui(UiCue::HideIntro)])
    }

    fn download_reveal(&self) -> Sequence {
        let items = [
            UiElement::DownloadTitle,
            UiElement::DownloadSubtitle,
            UiElement::DownloadButton,
        ];
        let back = self.ui(UiElement::BackButton);
        Sequence::new("download reveal")
            .stagger(0.0, 0.3, &items, |seq, at, &element| {
                let el = self.ui(element);
                seq.from_to(&el.opacity, at, 1.5, 0.0, 1.0, Ease::PowerOut(3))
                    .from_to(&el.offset_y, at, 1.5, 30.0, 0.0, Ease::PowerOut(3))
            })
            .from_to(&back.opacity, 1.2, 1.2, 0.0, 1.0, Ease::PowerOut(3))
            .from_to(&back.offset_y, 1.2, 1.2, 20.0, 0.0, Ease::PowerOut(3))
    }
}

impl TransitionScript for Choreography {
    fn enter_sequence(&self, progress: ParamRef) -> Sequence {
        let e = self.expand_duration;
        let t = &self.targets;

        Sequence::new("enter")
            .nest(0.0, self.intro_fade_out())
            // Crossing
            .to(&progress, 0.5, e, 1.0, Ease::PowerInOut(4))
            .to(&t.portal_scale, 0.5, e, self.expand_scale, Ease::ExpoInOut)
            .to(&t.camera_z, 0.5, e, self.camera_rest - self.camera_push, Ease::ExpoInOut)
            .to(&t.light_distance, 0.5, e, LIGHT_DISTANCE_ENTERED, Ease::PowerInOut(2))
            // Flash at the threshold
            .to(&t.flash, e - 1.5, 1.0, 1.0, Ease::PowerIn(2))
            .to(&t.exposure, e - 0.5, 0.2, EXPOSURE_SPIKE, Ease::PowerIn(2))
            .to(&t.exposure, e - 0.3, 2.0, EXPOSURE_ENTERED, Ease::PowerOut(2))
            .to(&t.flash, e - 0.3, 2.5, 0.0, Ease::PowerOut(2))
            // Second phase
            .cue(e - 1.0, UiCue::ShowDownload)
            .cue(e - 1.0, UiCue::ShowSoundToggle)
            .cue(e - 1.0, AudioCue::FadeIn { duration: e })
            .nest(e - 0.2, self.download_reveal())
    }

    fn return_sequence(&self, progress: ParamRef) -> Sequence {
        let t = &self.targets;
        let title = self.ui(UiElement::Title);
        let button = self.ui(UiElement::EnterButton);
        let collapse = Ease::PowerInOut(2);

        Sequence::new("return")
            .stagger(0.0, 0.05, &UiElement::DOWNLOAD_ITEMS, |seq, at, &element| {
                let el = self.ui(element);
                seq.to(&el.opacity, at, 0.8, 0.0, Ease::PowerInOut(2))
                    .to(&el.offset_y, at, 0.8, 20.0, Ease::PowerInOut(2))
            })
            .cue(0.0, AudioCue::FadeOut { duration: 2.5 })
            .cue(0.8, UiCue::HideDownload)
            // Collapse
            .to(&t.portal_scale, 0.5, RETURN_DURATION, self.base_scale, Ease::ExpoInOut)
            .to(&progress, 0.5, RETURN_DURATION, 0.0, collapse)
            .to(&t.light_distance, 0.5, RETURN_DURATION, LIGHT_DISTANCE_REST, collapse)
            .to(&t.exposure, 0.5, RETURN_DURATION, EXPOSURE_REST, collapse)
            .to(&t.camera_z, 0.5, RETURN_DURATION, self.camera_rest, Ease::ExpoInOut)
            // Intro comes back
            .cue(1.5, UiCue::RestoreIntro)
            .to(&title.opacity, 2.0, 1.5, 1.0, Ease::PowerOut(3))
            .to(&title.offset_y, 2.0, 1.5, 0.0, Ease::PowerOut(3))
            .to(&button.opacity, 2.3, 1.2, 1.0, Ease::PowerOut(3))
            .to(&button.scale, 2.3, 1.2, 1.0, Ease::PowerOut(3))
            .to(&button.offset_y, 2.3, 1.2, 0.0, Ease::PowerOut(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Param;
    use crate::timeline::{SchedulerEvent, TimelineScheduler};

    struct Rig {
        portal_scale: Param,
        camera_z: Param,
        light_distance: Param,
        exposure: Param,
        flash: Param,
        progress: Param,
        overlay: UiOverlay,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                portal_scale: Param::new(1.0),
                camera_z: Param::new(7.5),
                light_distance: Param::new(LIGHT_DISTANCE_REST),
                exposure: Param::new(EXPOSURE_REST),
                flash: Param::bounded(0.0, 0.0, 1.0),
                progress: Param::bounded(0.0, 0.0, 1.0),
                overlay: UiOverlay::new(),
            }
        }

        fn choreography(&self) -> Choreography {
            let targets = ChoreographyTargets {
                portal_scale: self.portal_scale.handle(),
                camera_z: self.camera_z.handle(),
                light_distance: self.light_distance.handle(),
                exposure: self.exposure.handle(),
                flash: self.flash.handle(),
            };
            Choreography::new(&PortalConfig::default(), 1.0, targets, &self.overlay)
        }
    }

    fn run(scheduler: &mut TimelineScheduler, seconds: f32) -> Vec<SchedulerEvent> {
        let frames = (seconds * 60.0).round() as usize;
        (0..frames).flat_map(|_| scheduler.tick(1.0 / 60.0)).collect()
    }

    #[test]
    fn test_enter_sequence_lands_on_targets() {
        let rig = Rig::new();
        let seq = rig.choreography().enter_sequence(rig.progress.handle());
        // Back button reveal and flash fade both end at E + 2.2
        assert!((seq.duration() - 6.7).abs() < 1e-4);

        let mut scheduler = TimelineScheduler::new();
        scheduler.play(seq);
        run(&mut scheduler, 7.0);

        assert!(scheduler.is_empty());
        assert_eq!(rig.progress.get(), 1.0);
        assert_eq!(rig.portal_scale.get(), 5.5);
        assert_eq!(rig.camera_z.get(), 3.0);
        assert_eq!(rig.light_distance.get(), LIGHT_DISTANCE_ENTERED);
        assert_eq!(rig.exposure.get(), EXPOSURE_ENTERED);
        assert_eq!(rig.flash.get(), 0.0);

        for element in UiElement::DOWNLOAD_ITEMS {
            let style = rig.overlay.style(element);
            assert_eq!(style.opacity.get(), 1.0);
            assert_eq!(style.offset_y.get(), 0.0);
        }
        assert_eq!(rig.overlay.style(UiElement::Title).opacity.get(), 0.0);
    }

    #[test]
    fn test_enter_cues_fire_in_order() {
        let rig = Rig::new();
        let mut scheduler = TimelineScheduler::new();
        scheduler.play(rig.choreography().enter_sequence(rig.progress.handle()));

        let cues: Vec<Cue> = run(&mut scheduler, 7.0)
            .into_iter()
            .filter_map(|e| match e {
                SchedulerEvent::Cue(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(
            cues,
            vec![
                Cue::Ui(UiCue::HideIntro),
                Cue::Ui(UiCue::ShowDownload),
                Cue::Ui(UiCue::ShowSoundToggle),
                Cue::Audio(AudioCue::FadeIn { duration: 4.5 }),
            ]
        );
    }

    #[test]
    fn test_flash_peaks_before_download_reveal() {
        let rig = Rig::new();
        let mut scheduler = TimelineScheduler::new();
        scheduler.play(rig.choreography().enter_sequence(rig.progress.handle()));

        // E - 0.5: flash tween has just finished
        run(&mut scheduler, 4.0);
        assert!(rig.flash.get() > 0.99);
        assert_eq!(rig.overlay.style(UiElement::DownloadTitle).opacity.get(), 0.0);
        // E - 0.3: exposure spike reached
        run(&mut scheduler, 0.2);
        assert!(rig.exposure.get() > 4.9);
    }

    #[test]
    fn test_return_restores_rest_values() {
        let rig = Rig::new();
        let choreography = rig.choreography();
        let mut scheduler = TimelineScheduler::new();
        scheduler.play(choreography.enter_sequence(rig.progress.handle()));
        run(&mut scheduler, 7.0);

        let seq = choreography.return_sequence(rig.progress.handle());
        assert!((seq.duration() - 4.0).abs() < 1e-4);
        scheduler.play(seq);
        let events = run(&mut scheduler, 4.2);

        assert!(events.contains(&SchedulerEvent::Cue(Cue::Audio(AudioCue::FadeOut {
            duration: 2.5
        }))));
        assert!(events.contains(&SchedulerEvent::Cue(Cue::Ui(UiCue::RestoreIntro))));
        assert_eq!(rig.progress.get(), 0.0);
        assert_eq!(rig.portal_scale.get(), 1.0);
        assert_eq!(rig.camera_z.get(), 7.5);
        assert_eq!(rig.exposure.get(), EXPOSURE_REST);
        assert_eq!(rig.overlay.style(UiElement::Title).opacity.get(), 1.0);
        assert_eq!(rig.overlay.style(UiElement::EnterButton).scale.get(), 1.0);
        assert_eq!(rig.overlay.style(UiElement::BackButton).opacity.get(), 0.0);
    }

    #[test]
    fn test_return_uses_current_base_scale() {
        let rig = Rig::new();
        let mut choreography = rig.choreography();
        choreography.set_base_scale(0.5);
        rig.portal_scale.set(3.5);

        let mut scheduler = TimelineScheduler::new();
        scheduler.play(choreography.return_sequence(rig.progress.handle()));
        run(&mut scheduler, 4.2);
        assert_eq!(rig.portal_scale.get(), 0.5);
    }

    #[test]
    fn test_intro_reveal() {
        let rig = Rig::new();
        let mut scheduler = TimelineScheduler::new();
        scheduler.play(rig.choreography().intro_sequence());

        let events = run(&mut scheduler, 1.0);
        assert_eq!(events, vec![SchedulerEvent::Cue(Cue::Ui(UiCue::HideLoadingScreen))]);
        assert_eq!(rig.overlay.style(UiElement::Title).opacity.get(), 0.0);

        run(&mut scheduler, 1.1);
        assert_eq!(rig.overlay.style(UiElement::Title).opacity.get(), 1.0);
        assert_eq!(rig.overlay.style(UiElement::EnterButton).opacity.get(), 1.0);
    }
}
