use crate::error::StatsError;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Class {
    Scout,
    Soldier,
    Pyro,
    Demoman,
    Heavyweapons,
    Engineer,
    Medic,
    Sniper,
    Spy,
}

/// A statistic the report can rank players by.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Metric {
    Kills,
    Damage,
    DamagePerMinute,
    Airshots,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Kills,
        Metric::Damage,
        Metric::DamagePerMinute,
        Metric::Airshots,
    ];

    /// Field name used for this metric in the match log json.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Kills => "kills",
            Metric::Damage => "dmg",
            Metric::DamagePerMinute => "dapm",
            Metric::Airshots => "as",
        }
    }

    /// Whether the metric is summed per class from `class_stats` rather than
    /// read off the player as a whole.
    pub fn is_per_class(self) -> bool {
        matches!(self, Metric::Kills | Metric::Damage)
    }
}

impl FromStr for Metric {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Metric::ALL
            .into_iter()
            .find(|metric| metric.key() == trimmed)
            .ok_or_else(|| StatsError::UnsupportedMetric(trimmed.to_string()))
    }
}

/// Lookup tables for class and metric names. Built once at startup and handed
/// to the stages that need them.
#[derive(Debug, Clone)]
pub struct StatTables {
    pub ranked_classes: Vec<Class>,
    class_names: HashMap<&'static str, Class>,
    class_titles: HashMap<Class, &'static str>,
    metric_titles: HashMap<Metric, &'static str>,
}

const CLASSES: &[(&str, Class, &str)] = &[
    ("scout", Class::Scout, "Scout"),
    ("soldier", Class::Soldier, "Soldier"),
    ("pyro", Class::Pyro, "Pyro"),
    ("demoman", Class::Demoman, "Demoman"),
    ("heavyweapons", Class::Heavyweapons, "Heavyweapons"),
    ("engineer", Class::Engineer, "Engineer"),
    ("medic", Class::Medic, "Medic"),
    ("sniper", Class::Sniper, "Sniper"),
    ("spy", Class::Spy, "Spy"),
];

impl StatTables {
    pub fn new() -> Self {
        Self {
            ranked_classes: vec![Class::Scout, Class::Soldier, Class::Demoman],
            class_names: CLASSES.iter().map(|&(name, class, _)| (name, class)).collect(),
            class_titles: CLASSES.iter().map(|&(_, class, title)| (class, title)).collect(),
            metric_titles: HashMap::from([
                (Metric::Kills, "Kills"),
                (Metric::Damage, "Damage"),
                (Metric::DamagePerMinute, "Damage Per Minute"),
                (Metric::Airshots, "Airshots"),
            ]),
        }
    }

    pub fn class(&self, name: &str) -> Option<Class> {
        self.class_names.get(name).copied()
    }

    pub fn class_title(&self, class: Class) -> &'static str {
        self.class_titles.get(&class).copied().unwrap_or("")
    }

    pub fn metric_title(&self, metric: Metric) -> &'static str {
        self.metric_titles.get(&metric).copied().unwrap_or("")
    }
}

impl Default for StatTables {
    fn default() -> Self {
        Self::new()
    }
}
