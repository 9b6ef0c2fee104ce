//! Category selection for new plans.
//!
//! Picks a primary muscle category and, where possible, a complementary
//! secondary one:
//! - Primary: most-trained category outside the avoid set
//! - Fallback: the most neglected category, even if avoided
//! - Secondary: complementary table first, then any other category

use crate::aggregate::HistoryStats;
use crate::catalog::complements;
use crate::{Category, CategoryStat};
use chrono::{Days, NaiveDate};
use std::collections::HashSet;

/// Categories trained within this many days count as recently trained
pub const RECENT_CATEGORY_DAYS: i64 = 3;

/// Outcome of category selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategorySelection {
    pub primary: Category,
    pub secondary: Option<Category>,
}

/// First day of a `window_days`-long window ending on `today`
///
/// Negative windows start after `today` and match nothing; windows reaching
/// past the start of the calendar cover every date.
pub(crate) fn window_start(today: NaiveDate, window_days: i64) -> NaiveDate {
    match u64::try_from(window_days) {
        Ok(days) => today
            .checked_sub_days(Days::new(days))
            .unwrap_or(NaiveDate::MIN),
        Err(_) => today
            .checked_add_days(Days::new(window_days.unsigned_abs()))
            .unwrap_or(NaiveDate::MAX),
    }
}

/// Categories whose last session falls inside the recency window
pub fn recently_trained(
    stats: &HistoryStats,
    today: NaiveDate,
    window_days: i64,
) -> HashSet<Category> {
    let cutoff = window_start(today, window_days);
    stats
        .categories
        .iter()
        .filter(|c| c.last_used >= cutoff)
        .map(|c| c.category)
        .collect()
}

/// Highest set count among `candidates`; ties go to the first encountered
fn most_trained<'a, I>(candidates: I) -> Option<Category>
where
    I: IntoIterator<Item = &'a CategoryStat>,
{
    let mut best: Option<&CategoryStat> = None;
    for stat in candidates {
        if best.map_or(true, |b| stat.total_set_count > b.total_set_count) {
            best = Some(stat);
        }
    }
    best.map(|s| s.category)
}

/// Earliest `last_used`; ties go to the first encountered
fn least_recent<'a, I>(candidates: I) -> Option<Category>
where
    I: IntoIterator<Item = &'a CategoryStat>,
{
    let mut best: Option<&CategoryStat> = None;
    for stat in candidates {
        if best.map_or(true, |b| stat.last_used < b.last_used) {
            best = Some(stat);
        }
    }
    best.map(|s| s.category)
}

/// Choose primary and secondary categories
///
/// Returns `None` only when the stats contain no categories at all.
pub fn select_categories(
    stats: &HistoryStats,
    avoid: &HashSet<Category>,
    want_secondary: bool,
) -> Option<CategorySelection> {
    let primary = match most_trained(
        stats.categories.iter().filter(|c| !avoid.contains(&c.category)),
    ) {
        Some(category) => category,
        None => {
            let fallback = least_recent(&stats.categories)?;
            tracing::debug!(
                "Every category is avoided, falling back to least recent: {:?}",
                fallback
            );
            fallback
        }
    };

    let secondary = if want_secondary || stats.categories.len() > 1 {
        select_secondary(stats, primary, avoid)
    } else {
        None
    };

    tracing::debug!("Selected categories: {:?} + {:?}", primary, secondary);
    Some(CategorySelection { primary, secondary })
}

fn select_secondary(
    stats: &HistoryStats,
    primary: Category,
    avoid: &HashSet<Category>,
) -> Option<Category> {
    let partners = complements(primary);
    let paired = most_trained(stats.categories.iter().filter(|c| {
        partners.contains(&c.category) && !avoid.contains(&c.category)
    }));
    if paired.is_some() {
        return paired;
    }

    let others = stats.categories.iter().filter(|c| c.category != primary);
    most_trained(others.clone().filter(|c| !avoid.contains(&c.category)))
        .or_else(|| least_recent(others))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn stat(category: Category, count: usize, days_ago: i64) -> CategoryStat {
        CategoryStat {
            category,
            total_set_count: count,
            last_used: today() - Duration::days(days_ago),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn stats(categories: Vec<CategoryStat>) -> HistoryStats {
        HistoryStats {
            categories,
            ..Default::default()
        }
    }

    fn avoid(categories: &[Category]) -> HashSet<Category> {
        categories.iter().copied().collect()
    }

    #[test]
    fn test_recently_trained_window() {
        let s = stats(vec![
            stat(Category::Chest, 10, 1),
            stat(Category::Back, 10, 3),
            stat(Category::Legs, 10, 4),
        ]);
        let recent = recently_trained(&s, today(), RECENT_CATEGORY_DAYS);
        assert_eq!(recent, avoid(&[Category::Chest, Category::Back]));
    }

    #[test]
    fn test_oversized_window_covers_all_history() {
        let s = stats(vec![
            stat(Category::Chest, 10, 1),
            stat(Category::Back, 10, 400),
        ]);
        let recent = recently_trained(&s, today(), i64::MAX);
        assert_eq!(recent, avoid(&[Category::Chest, Category::Back]));
        assert!(recently_trained(&s, today(), -5).is_empty());
        assert_eq!(window_start(today(), 100_000_000_000), NaiveDate::MIN);
    }

    #[test]
    fn test_recency_avoidance_picks_rested_category() {
        let s = stats(vec![
            stat(Category::Chest, 12, 1),
            stat(Category::Back, 12, 10),
        ]);
        let recent = recently_trained(&s, today(), RECENT_CATEGORY_DAYS);
        let selection = select_categories(&s, &recent, false).unwrap();
        assert_eq!(selection.primary, Category::Back);
    }

    #[test]
    fn test_primary_is_most_trained() {
        let s = stats(vec![
            stat(Category::Legs, 5, 20),
            stat(Category::Chest, 30, 20),
            stat(Category::Back, 30, 20),
        ]);
        let selection = select_categories(&s, &HashSet::new(), false).unwrap();
        // Tie between chest and back goes to the first encountered
        assert_eq!(selection.primary, Category::Chest);
    }

    #[test]
    fn test_all_avoided_falls_back_to_least_recent() {
        let s = stats(vec![
            stat(Category::Chest, 30, 5),
            stat(Category::Back, 10, 12),
        ]);
        let all = avoid(&[Category::Chest, Category::Back]);
        let selection = select_categories(&s, &all, false).unwrap();
        assert_eq!(selection.primary, Category::Back);
        assert_eq!(selection.secondary, Some(Category::Chest));
    }

    #[test]
    fn test_secondary_prefers_complement() {
        let s = stats(vec![
            stat(Category::Chest, 40, 10),
            stat(Category::Legs, 35, 10),
            stat(Category::Shoulders, 8, 10),
            stat(Category::Triceps, 12, 10),
        ]);
        let selection = select_categories(&s, &HashSet::new(), true).unwrap();
        assert_eq!(selection.primary, Category::Chest);
        assert_eq!(selection.secondary, Some(Category::Triceps));
    }

    #[test]
    fn test_secondary_skips_avoided_complement() {
        let s = stats(vec![
            stat(Category::Chest, 40, 10),
            stat(Category::Legs, 35, 10),
            stat(Category::Triceps, 12, 10),
        ]);
        let selection =
            select_categories(&s, &avoid(&[Category::Triceps]), true).unwrap();
        assert_eq!(selection.secondary, Some(Category::Legs));
    }

    #[test]
    fn test_single_category_has_no_secondary() {
        let s = stats(vec![stat(Category::Core, 4, 8)]);
        let selection = select_categories(&s, &HashSet::new(), true).unwrap();
        assert_eq!(selection.primary, Category::Core);
        assert_eq!(selection.secondary, None);
    }

    #[test]
    fn test_empty_stats() {
        assert!(select_categories(&HistoryStats::default(), &HashSet::new(), true).is_none());
    }
}
