use tracing::{debug, info};

use crate::error::{NavError, Result};
use crate::index::NodeIndex;
use crate::viewport::{Camera, Flight};

/// Labels tried, in order, when choosing the node to frame first.
pub const DEFAULT_PREFERRED_LABELS: [&str; 6] = [
    "case",
    "Case",
    "patient",
    "Patient",
    "participant",
    "Participant",
];

/// Node selection list: sorted labels and the current selection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selector {
    options: Vec<String>,
    selected: Option<String>,
}

impl Selector {
    /// One option per indexed label, in ascending order.
    pub fn populate(index: &NodeIndex) -> Self {
        Self::from_options(index.labels())
    }

    pub fn from_options<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options: Vec<String> = labels.into_iter().map(Into::into).collect();
        options.sort();
        options.dedup();
        Self {
            options,
            selected: None,
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// First preferred label present among the options (exact,
    /// case-sensitive), else the first option.
    pub fn default_choice<S: AsRef<str>>(&self, preferred: &[S]) -> Result<&str> {
        preferred
            .iter()
            .find_map(|label| {
                self.options
                    .iter()
                    .find(|option| option.as_str() == label.as_ref())
            })
            .or_else(|| self.options.first())
            .map(String::as_str)
            .ok_or(NavError::NoNodes)
    }

    /// Select `value` and fly `camera` to its bounds.
    pub fn change<C: Camera>(
        &mut self,
        value: &str,
        index: &NodeIndex,
        camera: &mut C,
    ) -> Result<Flight> {
        let node = index
            .get(value)
            .ok_or_else(|| NavError::UnknownNode(value.to_string()))?;
        let bounds = node.lat_lng_bounds()?;
        self.selected = Some(value.to_string());
        debug!(node = value, "selection changed");
        Ok(camera.fly_to_bounds(&bounds))
    }

    /// Pick the default node, mark it selected and fly to it.
    pub fn select_default<C: Camera, S: AsRef<str>>(
        &mut self,
        preferred: &[S],
        index: &NodeIndex,
        camera: &mut C,
    ) -> Result<(String, Flight)> {
        let choice = self.default_choice(preferred)?.to_string();
        info!(node = %choice, "default node");
        let flight = self.change(&choice, index, camera)?;
        Ok((choice, flight))
    }
}
