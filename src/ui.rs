//! Boundary to the external UI layer.
//!
//! The core never touches UI widgets directly. It exposes two things:
//!
//! - [`UiOverlay`]: animated style params (opacity, vertical offset, scale)
//!   per element, tweened by the timeline and read by the host every frame.
//! - [`UiCue`]: discrete visibility toggles fired from timelines. They are
//!   delivered to a [`UiBoundary`] as fire-and-forget calls.

use crate::param::{Param, ParamRef};

/// UI elements the choreography animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiElement {
    Title,
    EnterButton,
    DownloadTitle,
    DownloadSubtitle,
    DownloadButton,
    BackButton,
}

impl UiElement {
    /// Every element, in overlay order.
    pub const ALL: [UiElement; 6] = [
        UiElement::Title,
        UiElement::EnterButton,
        UiElement::DownloadTitle,
        UiElement::DownloadSubtitle,
        UiElement::DownloadButton,
        UiElement::BackButton,
    ];

    /// The revealed-after-entry items, in stagger order.
    pub const DOWNLOAD_ITEMS: [UiElement; 4] = [
        UiElement::DownloadTitle,
        UiElement::DownloadSubtitle,
        UiElement::DownloadButton,
        UiElement::BackButton,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Discrete UI side effects scheduled by timelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiCue {
    /// Loading finished; fade out the loading screen.
    HideLoadingScreen,
    /// Remove the intro title and enter button, stop capturing pointer events.
    HideIntro,
    /// Put the intro title and enter button back, capture pointer events.
    RestoreIntro,
    /// Show the download section.
    ShowDownload,
    /// Hide the download section.
    HideDownload,
    /// Show the sound toggle.
    ShowSoundToggle,
}

/// Receiver for UI toggles. Implemented by the host.
pub trait UiBoundary {
    /// Apply a toggle. Fire-and-forget; there is no result.
    fn apply(&mut self, cue: UiCue);
}

/// Style params for one element.
#[derive(Debug, Clone)]
pub struct ElementStyle {
    pub opacity: Param,
    pub offset_y: Param,
    pub scale: Param,
}

impl ElementStyle {
    fn hidden() -> Self {
        Self {
            opacity: Param::bounded(0.0, 0.0, 1.0),
            offset_y: Param::new(0.0),
            scale: Param::new(1.0),
        }
    }
}

/// Weak handles to one element's style, for the choreography.
#[derive(Debug, Clone)]
pub struct ElementTargets {
    pub opacity: ParamRef,
    pub offset_y: ParamRef,
    pub scale: ParamRef,
}

/// Animated styles of every choreographed element.
///
/// Every element starts fully transparent; the intro reveal fades the title
/// and enter button in once assets are loaded.
#[derive(Debug, Clone)]
pub struct UiOverlay {
    styles: Vec<ElementStyle>,
}

impl UiOverlay {
    pub fn new() -> Self {
        Self {
            styles: UiElement::ALL.iter().map(|_| ElementStyle::hidden()).collect(),
        }
    }

    /// Style params of an element.
    pub fn style(&self, element: UiElement) -> &ElementStyle {
        &self.styles[element.index()]
    }

    /// Weak handles for an element's style.
    pub fn targets(&self, element: UiElement) -> ElementTargets {
        let style = self.style(element);
        ElementTargets {
            opacity: style.opacity.handle(),
            offset_y: style.offset_y.handle(),
            scale: style.scale.handle(),
        }
    }
}

impl Default for UiOverlay {
    fn default() -> Self {
        Self::new()
    }
}

/// Visibility flags driven by [`UiCue`]s.
///
/// A ready-made [`UiBoundary`] for hosts that poll state instead of reacting
/// to callbacks, and for headless runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiFlags {
    pub loading_screen_visible: bool,
    pub intro_displayed: bool,
    pub captures_pointer: bool,
    pub download_visible: bool,
    pub sound_toggle_visible: bool,
}

impl Default for UiFlags {
    fn default() -> Self {
        Self {
            loading_screen_visible: true,
            intro_displayed: true,
            captures_pointer: true,
            download_visible: false,
            sound_toggle_visible: false,
        }
    }
}

impl UiBoundary for UiFlags {
    fn apply(&mut self, cue: UiCue) {
        match cue {
            UiCue::HideLoadingScreen => self.loading_screen_visible = false,
            UiCue::HideIntro => {
                self.intro_displayed = false;
                self.captures_pointer = false;
            }
            UiCue::RestoreIntro => {
                self.intro_displayed = true;
                self.captures_pointer = true;
            }
            UiCue::ShowDownload => self.download_visible = true,
            UiCue::HideDownload => self.download_visible = false,
            UiCue::ShowSoundToggle => self.sound_toggle_visible = true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_starts_hidden() {
        let overlay = UiOverlay::new();
        for element in UiElement::ALL {
            assert_eq!(overlay.style(element).opacity.get(), 0.0);
            assert_eq!(overlay.style(element).scale.get(), 1.0);
        }
    }

    #[test]
    fn test_targets_write_through() {
        let overlay = UiOverlay::new();
        let targets = overlay.targets(UiElement::BackButton);
        assert!(targets.opacity.set(0.4));
        assert_eq!(overlay.style(UiElement::BackButton).opacity.get(), 0.4);
        assert_eq!(overlay.style(UiElement::Title).opacity.get(), 0.0);
    }

    #[test]
    fn test_flags_follow_cues() {
        let mut flags = UiFlags::default();
        flags.apply(UiCue::HideIntro);
        flags.apply(UiCue::ShowDownload);
        assert!(!flags.intro_displayed);
        assert!(!flags.captures_pointer);
        assert!(flags.download_visible);

        flags.apply(UiCue::HideDownload);
        flags.apply(UiCue::RestoreIntro);
        assert!(flags.intro_displayed);
        assert!(flags.captures_pointer);
        assert!(!flags.download_visible);
    }
}
