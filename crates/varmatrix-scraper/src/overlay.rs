//! Best-effort dismissal of region pickers, promo popups and cookie banners.
//!
//! Every click attempt is an independent step with its own outcome. Outcomes
//! are logged and collected into a report; nothing here ever fails the
//! caller.

use std::time::Duration;

use crate::renderer::{Locator, Renderer};

/// Result of one dismiss attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DismissOutcome {
    Dismissed,
    NotFound,
    Failed(String),
}

/// Alternative targets for one kind of overlay; the first one dismissed wins.
#[derive(Debug, Clone)]
pub struct DismissGroup {
    pub name: &'static str,
    pub targets: Vec<Locator>,
}

#[derive(Debug, Clone)]
pub struct DismissStep {
    pub group: &'static str,
    pub target: Locator,
    pub outcome: DismissOutcome,
}

#[derive(Debug, Clone, Default)]
pub struct DismissReport {
    pub steps: Vec<DismissStep>,
}

impl DismissReport {
    #[must_use]
    pub fn dismissed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.outcome == DismissOutcome::Dismissed)
            .count()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, DismissOutcome::Failed(_)))
            .count()
    }
}

fn group(name: &'static str, targets: &[Locator]) -> DismissGroup {
    DismissGroup {
        name,
        targets: targets.to_vec(),
    }
}

/// Region selector, promo popup, cookie consent and a generic close button,
/// in the order they usually stack on storefront pages.
#[must_use]
pub fn default_groups() -> Vec<DismissGroup> {
    vec![
        group(
            "region",
            &[
                Locator::text("United States"),
                Locator::css(".modal-close"),
                Locator::css("[aria-label=\"Close\"]"),
            ],
        ),
        group(
            "promo",
            &[
                Locator::text("No Thank You"),
                Locator::text("No thanks"),
                Locator::css(".popup-close"),
                Locator::css("button[aria-label=\"Close dialog\"]"),
            ],
        ),
        group(
            "consent",
            &[
                Locator::text("I accept"),
                Locator::text("Accept"),
                Locator::text("Accept All"),
                Locator::text("Accept All Cookies"),
                Locator::css("#onetrust-accept-btn-handler"),
                Locator::css("#accept-cookies"),
                Locator::css(".cookie-accept"),
            ],
        ),
        group("close", &[Locator::css(".modal-header .close")]),
    ]
}

/// Runs the dismiss groups against a renderer.
#[derive(Debug, Clone)]
pub struct OverlayDismisser {
    groups: Vec<DismissGroup>,
    initial_wait: Duration,
    click_timeout: Duration,
    after_click_wait: Duration,
}

impl OverlayDismisser {
    #[must_use]
    pub fn new(initial_wait: Duration, click_timeout: Duration, after_click_wait: Duration) -> Self {
        Self {
            groups: default_groups(),
            initial_wait,
            click_timeout,
            after_click_wait,
        }
    }

    /// Timings from runtime settings; the post-click pause is a quarter of
    /// the initial overlay wait.
    #[must_use]
    pub fn from_config(config: &varmatrix_core::AppConfig) -> Self {
        Self::new(
            Duration::from_millis(config.overlay_wait_ms),
            Duration::from_millis(config.overlay_click_timeout_ms),
            Duration::from_millis(config.overlay_wait_ms / 4),
        )
    }

    #[must_use]
    pub fn with_groups(mut self, groups: Vec<DismissGroup>) -> Self {
        self.groups = groups;
        self
    }

    /// One click attempt, mapped to a tri-state outcome.
    pub async fn try_dismiss<R: Renderer>(&self, renderer: &mut R, target: &Locator) -> DismissOutcome {
        match renderer.locate_and_click(target, self.click_timeout).await {
            Ok(true) => DismissOutcome::Dismissed,
            Ok(false) => DismissOutcome::NotFound,
            Err(e) => DismissOutcome::Failed(e.to_string()),
        }
    }

    /// Tries every group in order; within a group, stops at the first target
    /// that was dismissed.
    pub async fn dismiss_all<R: Renderer>(&self, renderer: &mut R) -> DismissReport {
        if !self.initial_wait.is_zero() {
            tokio::time::sleep(self.initial_wait).await;
        }

        let mut report = DismissReport::default();
        for group in &self.groups {
            for target in &group.targets {
                let outcome = self.try_dismiss(renderer, target).await;
                match &outcome {
                    DismissOutcome::Dismissed => {
                        tracing::debug!(group = group.name, %target, "dismissed overlay");
                    }
                    DismissOutcome::NotFound => {}
                    DismissOutcome::Failed(reason) => {
                        tracing::debug!(group = group.name, %target, reason, "overlay dismiss attempt failed");
                    }
                }
                let dismissed = outcome == DismissOutcome::Dismissed;
                report.steps.push(DismissStep {
                    group: group.name,
                    target: target.clone(),
                    outcome,
                });
                if dismissed {
                    if !self.after_click_wait.is_zero() {
                        tokio::time::sleep(self.after_click_wait).await;
                    }
                    break;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRenderer;

    fn instant() -> OverlayDismisser {
        OverlayDismisser::new(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn stops_group_at_first_dismissed_target() {
        let mut renderer = FakeRenderer::new();
        renderer.clickable(&Locator::text("Accept"));
        renderer.clickable(&Locator::css("#accept-cookies"));

        let report = instant().dismiss_all(&mut renderer).await;

        assert_eq!(report.dismissed_count(), 1);
        assert_eq!(renderer.clicks, vec!["text=\"Accept\"".to_string()]);
        let consent: Vec<_> = report.steps.iter().filter(|s| s.group == "consent").collect();
        // "I accept" misses, "Accept" hits, the rest are never tried.
        assert_eq!(consent.len(), 2);
        assert_eq!(consent[0].outcome, DismissOutcome::NotFound);
    }

    #[tokio::test]
    async fn failures_are_reported_not_propagated() {
        let mut renderer = FakeRenderer::new();
        renderer.broken_click(&Locator::css(".popup-close"));
        renderer.clickable(&Locator::css(".modal-header .close"));

        let report = instant().dismiss_all(&mut renderer).await;

        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.dismissed_count(), 1);
        assert_eq!(report.steps.last().unwrap().group, "close");
    }

    #[tokio::test]
    async fn every_target_tried_when_nothing_is_visible() {
        let mut renderer = FakeRenderer::new();
        let report = instant().dismiss_all(&mut renderer).await;
        let total: usize = default_groups().iter().map(|g| g.targets.len()).sum();
        assert_eq!(report.steps.len(), total);
        assert_eq!(report.dismissed_count(), 0);
    }

    #[tokio::test]
    async fn custom_groups_replace_defaults() {
        let mut renderer = FakeRenderer::new();
        renderer.clickable(&Locator::css("#region-us"));
        let dismisser = instant().with_groups(vec![DismissGroup {
            name: "region",
            targets: vec![Locator::css("#region-us")],
        }]);
        let report = dismisser.dismiss_all(&mut renderer).await;
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.dismissed_count(), 1);
    }
}
