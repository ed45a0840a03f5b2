use crate::log_reader::MatchLog;
use crate::stat_tables::{Class, Metric, StatTables};
use log::{debug, warn};

/// What one match says about one player, for the requested metric.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerFacts {
    pub steamid: String,
    pub name: String,
    pub class_values: Vec<(Class, u64)>,
    pub scalar: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchFacts {
    pub players: Vec<PlayerFacts>,
    /// `(target, damage dealt / heals received)` for every healer/target
    /// pair with healing above zero.
    pub damage_per_heal: Vec<(String, f64)>,
}

pub fn process_match(match_log: &MatchLog, metric: Metric, tables: &StatTables) -> MatchFacts {
    let players = match_log
        .names
        .iter()
        .map(|(steamid, name)| {
            let player = match_log.players.get(steamid);
            if player.is_none() {
                debug!("{} ({}) has no player stats in this log", name, steamid);
            }

            let class_values = match (metric.is_per_class(), player) {
                (true, Some(player)) => player
                    .class_stats
                    .iter()
                    .filter_map(|record| {
                        let Some(class) = tables.class(&record.class) else {
                            debug!("Ignoring unknown class {:?} for {}", record.class, steamid);
                            return None;
                        };
                        Some((class, record.counter(metric.key())?))
                    })
                    .collect(),
                _ => Vec::new(),
            };
            let scalar = if metric.is_per_class() {
                None
            } else {
                player.and_then(|p| p.scalar(metric.key()))
            };

            PlayerFacts {
                steamid: steamid.clone(),
                name: name.clone(),
                class_values,
                scalar,
            }
        })
        .collect();

    MatchFacts {
        players,
        damage_per_heal: damage_per_heal(match_log),
    }
}

fn damage_per_heal(match_log: &MatchLog) -> Vec<(String, f64)> {
    let mut contributions = Vec::new();
    for targets in match_log.healspread.values() {
        for (target, &heals) in targets.iter().filter(|&(_, &heals)| heals > 0.0) {
            let Some(damage) = match_log.players.get(target).and_then(|p| p.dmg) else {
                warn!("Heal target {} has no damage value, skipping", target);
                continue;
            };
            let ratio = damage / heals;
            if ratio.is_finite() {
                contributions.push((target.clone(), ratio));
            } else {
                debug!("Damage per heal for {} is not finite, skipping", target);
            }
        }
    }
    contributions
}
