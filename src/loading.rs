use crate::frames::store::LoadProgress;

/// Display collaborator for load progress (bar width, label, accessible value).
pub trait ProgressIndicator {
    /// Set the bar ratio and the accessible numeric value, `0..=100`.
    fn set_percentage(&mut self, percent: u8);
    fn set_label_text(&mut self, text: &str);
    fn hide(&mut self);
}

/// Projects [`LoadProgress`] onto a [`ProgressIndicator`].
pub struct LoadProgressReporter {
    indicator: Box<dyn ProgressIndicator>,
    last_percent: Option<u8>,
    hidden: bool,
}

impl LoadProgressReporter {
    pub fn new(indicator: Box<dyn ProgressIndicator>) -> Self {
        Self {
            indicator,
            last_percent: None,
            hidden: false,
        }
    }

    pub fn last_percent(&self) -> Option<u8> {
        self.last_percent
    }

    /// Push the current percentage; hide the indicator once loading is complete.
    pub fn report(&mut self, progress: LoadProgress) {
        if self.hidden {
            return;
        }
        let percent = progress.percent();
        debug_assert!(self.last_percent.is_none_or(|last| percent >= last));

        self.indicator.set_percentage(percent);
        self.indicator.set_label_text(&format!("Loading {percent}%"));
        self.last_percent = Some(percent);

        if progress.is_complete() {
            self.indicator.hide();
            self.hidden = true;
        }
    }
}
