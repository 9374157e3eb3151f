//! Status tabs and select options for list pages.
//!
//! Orders, custom requests, reviews and testimonials all render a row of tabs
//! ("All 12 | Pending 3 | ...") above their table. Each tab is a plain link
//! that keeps the other active query parameters.

use hearth_core::{AdminRole, CustomRequestStatus, ModerationStatus, OrderStatus};

/// A status enum that can drive a tab row.
pub trait TabStatus: Copy + PartialEq {
    /// Query-string value.
    fn value(self) -> &'static str;
    /// Human label.
    fn label(self) -> &'static str;
}

macro_rules! impl_tab_status {
    ($($ty:ty),+) => {
        $(
            impl TabStatus for $ty {
                fn value(self) -> &'static str {
                    self.as_str()
                }

                fn label(self) -> &'static str {
                    <$ty>::label(self)
                }
            }
        )+
    };
}

impl_tab_status!(OrderStatus, CustomRequestStatus, ModerationStatus, AdminRole);

/// One tab in the row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTab {
    pub label: &'static str,
    pub count: usize,
    pub href: String,
    pub active: bool,
}

/// Build the tab row for `path`, with an "All" tab first.
///
/// `keep` lists other query parameters to carry over; empty values are
/// dropped.
#[must_use]
pub fn status_tabs<S: TabStatus>(
    path: &str,
    counts: &[(S, usize)],
    selected: Option<S>,
    keep: &[(&str, &str)],
) -> Vec<StatusTab> {
    let total = counts.iter().map(|(_, n)| n).sum();

    let mut tabs = Vec::with_capacity(counts.len() + 1);
    tabs.push(StatusTab {
        label: "All",
        count: total,
        href: build_href(path, None, keep),
        active: selected.is_none(),
    });
    tabs.extend(counts.iter().map(|&(status, count)| StatusTab {
        label: status.label(),
        count,
        href: build_href(path, Some(status.value()), keep),
        active: selected == Some(status),
    }));
    tabs
}

fn build_href(path: &str, status: Option<&str>, keep: &[(&str, &str)]) -> String {
    let params: Vec<String> = status
        .map(|s| ("status", s))
        .into_iter()
        .chain(keep.iter().copied())
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v.trim())))
        .collect();

    if params.is_empty() {
        path.to_owned()
    } else {
        format!("{path}?{}", params.join("&"))
    }
}

/// Option in a `<select>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl SelectOption {
    /// Options for every status in `all`, marking `current`.
    #[must_use]
    pub fn for_statuses<S: TabStatus>(all: &[S], current: Option<S>) -> Vec<Self> {
        all.iter()
            .map(|&s| Self {
                value: s.value(),
                label: s.label(),
                selected: current == Some(s),
            })
            .collect()
    }

    /// Statuses an order may move to from `current`.
    #[must_use]
    pub fn order_transitions(current: OrderStatus) -> Vec<Self> {
        let allowed: Vec<OrderStatus> = OrderStatus::ALL
            .iter()
            .copied()
            .filter(|&s| current.can_transition_to(s))
            .collect();
        Self::for_statuses(&allowed, None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tab_totals_counts() {
        let counts = [(OrderStatus::Pending, 2), (OrderStatus::Baking, 3)];
        let tabs = status_tabs("/orders", &counts, None, &[]);

        assert_eq!(tabs.len(), 3);
        assert_eq!(tabs[0].label, "All");
        assert_eq!(tabs[0].count, 5);
        assert!(tabs[0].active);
        assert_eq!(tabs[0].href, "/orders");
        assert!(!tabs[1].active);
    }

    #[test]
    fn test_selected_tab_keeps_search() {
        let counts = [(ModerationStatus::Pending, 1), (ModerationStatus::Approved, 4)];
        let tabs = status_tabs(
            "/reviews",
            &counts,
            Some(ModerationStatus::Approved),
            &[("q", "lemon tart"), ("from", "")],
        );

        let approved = tabs.iter().find(|t| t.active).unwrap();
        assert_eq!(approved.label, "Approved");
        assert_eq!(approved.href, "/reviews?status=approved&q=lemon%20tart");
        assert_eq!(tabs[0].href, "/reviews?q=lemon%20tart");
    }

    #[test]
    fn test_order_transitions_exclude_current() {
        let options = SelectOption::order_transitions(OrderStatus::Confirmed);
        assert!(options.iter().all(|o| o.value != "confirmed"));
        assert!(options.iter().any(|o| o.value == "baking"));
        assert!(SelectOption::order_transitions(OrderStatus::Delivered).is_empty());
    }
}
