use crate::match_processor::MatchFacts;
use crate::stat_tables::{Class, Metric};
use std::collections::BTreeMap;

/// Running totals for one player across every match folded so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerAggregate {
    pub matches: u32,
    pub class_totals: BTreeMap<Class, BTreeMap<&'static str, u64>>,
    pub scalar_totals: BTreeMap<&'static str, f64>,
    pub damage_per_heal: f64,
}

impl PlayerAggregate {
    pub fn class_total(&self, class: Class, metric: Metric) -> u64 {
        self.class_totals
            .get(&class)
            .and_then(|totals| totals.get(metric.key()))
            .copied()
            .unwrap_or(0)
    }

    pub fn scalar_total(&self, metric: Metric) -> f64 {
        self.scalar_totals.get(metric.key()).copied().unwrap_or(0.0)
    }
}

/// Folds per-match facts into per-player totals keyed by steamid.
#[derive(Debug, Clone)]
pub struct Aggregator {
    metric: Metric,
    pub players: BTreeMap<String, PlayerAggregate>,
    pub names: BTreeMap<String, String>,
}

impl Aggregator {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            players: BTreeMap::new(),
            names: BTreeMap::new(),
        }
    }

    pub fn add_match(&mut self, facts: &MatchFacts) {
        let key = self.metric.key();
        for player in facts.players.iter() {
            self.names.insert(player.steamid.clone(), player.name.clone());
            let aggregate = self.players.entry(player.steamid.clone()).or_default();
            // once per match, however many classes were played
            aggregate.matches += 1;

            for &(class, value) in player.class_values.iter() {
                let total = aggregate
                    .class_totals
                    .entry(class)
                    .or_default()
                    .entry(key)
                    .or_insert(0);
                *total = total.saturating_add(value);
            }
            if let Some(value) = player.scalar {
                *aggregate.scalar_totals.entry(key).or_insert(0.0) += value;
            }
        }

        // Sums the per-pair ratios rather than taking one ratio of sums.
        for (target, ratio) in facts.damage_per_heal.iter() {
            self.players.entry(target.clone()).or_default().damage_per_heal += ratio;
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn name(&self, steamid: &str) -> &str {
        self.names.get(steamid).map(String::as_str).unwrap_or("")
    }
}
