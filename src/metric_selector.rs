use crate::aggregator::{Aggregator, PlayerAggregate};
use crate::analysis_types::{Category, RankedEntry, ValuePrecision};
use crate::ranker::rank;
use crate::stat_tables::{Class, Metric, StatTables};
use log::info;
use num_traits::ToPrimitive;

/// Entries under this many damage per minute are left out of the report.
pub const DAPM_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// Divide by the number of matches the player appeared in.
    #[default]
    Average,
    /// Report the raw cumulative totals.
    Total,
}

impl Normalization {
    fn label(self) -> &'static str {
        match self {
            Normalization::Average => "Average",
            Normalization::Total => "Total",
        }
    }

    fn count_precision(self) -> ValuePrecision {
        match self {
            Normalization::Average => ValuePrecision::Float,
            Normalization::Total => ValuePrecision::Integer,
        }
    }

    /// `None` when the player never appeared in a match or the value is not
    /// a finite number.
    pub fn apply<T: ToPrimitive>(self, total: T, matches: u32) -> Option<f64> {
        if matches == 0 {
            return None;
        }
        let total = total.to_f64()?;
        let value = match self {
            Normalization::Average => total / f64::from(matches),
            Normalization::Total => total,
        };
        value.is_finite().then_some(value)
    }
}

/// Builds the ranked report categories for the aggregator's metric.
pub fn select(
    aggregator: &Aggregator,
    tables: &StatTables,
    normalization: Normalization,
) -> Vec<Category> {
    let metric = aggregator.metric();
    let categories = match metric {
        Metric::Kills => per_class(aggregator, tables, normalization),
        Metric::Damage => {
            let mut categories = per_class(aggregator, tables, normalization);
            categories.push(damage_per_heal(aggregator, normalization));
            categories
        }
        Metric::DamagePerMinute => vec![damage_per_minute(aggregator, tables, normalization)],
        Metric::Airshots => vec![airshots(aggregator, tables, normalization)],
    };

    for category in categories.iter() {
        info!("{}: {} players", category.title, category.entries.len());
    }
    categories
}

fn per_class(
    aggregator: &Aggregator,
    tables: &StatTables,
    normalization: Normalization,
) -> Vec<Category> {
    let metric = aggregator.metric();
    tables
        .ranked_classes
        .iter()
        .map(|&class| {
            let title = format!(
                "{} {} {}",
                normalization.label(),
                tables.class_title(class),
                tables.metric_title(metric)
            );
            ranked_category(title, normalization.count_precision(), aggregator, |player| {
                class_value(player, class, metric, normalization)
            })
        })
        .collect()
}

fn class_value(
    player: &PlayerAggregate,
    class: Class,
    metric: Metric,
    normalization: Normalization,
) -> Option<f64> {
    let total = player.class_total(class, metric);
    if total == 0 {
        return None;
    }
    normalization.apply(total, player.matches)
}

fn airshots(
    aggregator: &Aggregator,
    tables: &StatTables,
    normalization: Normalization,
) -> Category {
    let title = format!(
        "{} Player {}",
        normalization.label(),
        tables.metric_title(Metric::Airshots)
    );
    ranked_category(title, normalization.count_precision(), aggregator, |player| {
        let total = player.scalar_total(Metric::Airshots);
        if total == 0.0 {
            return None;
        }
        normalization.apply(total, player.matches)
    })
}

fn damage_per_minute(
    aggregator: &Aggregator,
    tables: &StatTables,
    normalization: Normalization,
) -> Category {
    let title = format!(
        "{} Player {}",
        normalization.label(),
        tables.metric_title(Metric::DamagePerMinute)
    );
    let mut category = ranked_category(title, ValuePrecision::Float, aggregator, |player| {
        normalization.apply(player.scalar_total(Metric::DamagePerMinute), player.matches)
    });
    // ranked first, filtered after
    category.entries.retain(|entry| entry.value >= DAPM_THRESHOLD);
    category
}

fn damage_per_heal(aggregator: &Aggregator, normalization: Normalization) -> Category {
    let title = format!("{} Damage Per Heal", normalization.label());
    ranked_category(title, ValuePrecision::Float, aggregator, |player| {
        if player.damage_per_heal == 0.0 {
            return None;
        }
        normalization.apply(player.damage_per_heal, player.matches)
    })
}

fn ranked_category<F>(
    title: String,
    precision: ValuePrecision,
    aggregator: &Aggregator,
    value_of: F,
) -> Category
where
    F: Fn(&PlayerAggregate) -> Option<f64>,
{
    let mut category = Category::new(title, precision);
    category.entries = aggregator
        .players
        .iter()
        .filter_map(|(steamid, player)| {
            Some(RankedEntry {
                name: aggregator.name(steamid).to_string(),
                value: value_of(player)?,
            })
        })
        .collect();
    rank(&mut category.entries);
    category
}
