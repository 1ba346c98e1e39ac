use std::collections::{BTreeMap, HashMap};

use cyberwar_core::snapshot::{Owner, Snapshot, secs_to_millis};

use super::SnapshotUnit;
use crate::context::ClientContext;
use crate::render::{RenderSink, ViewUpdate, present};
use crate::scheduler::{Scheduler, TimerSet, TimerTask};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ShieldEntry {
    end_ms: i64,
    last_secs: Option<u64>,
}

/// Node cards plus locally ticked shield countdowns.
///
/// Snapshots refresh each shield's end time; the 100 ms tick derives the
/// countdown from that cached end time alone and drops the shield as soon as
/// it reaches zero, without waiting for the server to confirm.
pub struct ShieldBoard {
    expiring_secs: u64,
    entries: BTreeMap<String, ShieldEntry>,
    statuses: HashMap<String, (Owner, String)>,
    timers: TimerSet,
}

impl ShieldBoard {
    pub fn new(scheduler: &Scheduler, now_ms: u64, tick_ms: u64, expiring_secs: u64) -> Self {
        let mut timers = TimerSet::new(scheduler);
        timers.every(now_ms + tick_ms, tick_ms, TimerTask::ShieldTick);
        Self {
            expiring_secs,
            entries: BTreeMap::new(),
            statuses: HashMap::new(),
            timers,
        }
    }

    pub fn is_shielded(&self, node: &str) -> bool {
        self.entries.contains_key(node)
    }

    pub fn shielded_nodes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Whole seconds last shown for a node's shield.
    pub fn displayed_secs(&self, node: &str) -> Option<u64> {
        self.entries.get(node).and_then(|e| e.last_secs)
    }

    pub fn tick(&mut self, now_ms: u64, sink: &mut dyn RenderSink) {
        let now = now_ms as i64;
        let expiring_secs = self.expiring_secs;
        let mut expired = Vec::new();
        for (node, entry) in &mut self.entries {
            let remaining = entry.end_ms - now;
            if remaining <= 0 {
                expired.push(node.clone());
                continue;
            }
            let secs = (remaining as u64).div_ceil(1000);
            if entry.last_secs != Some(secs) {
                entry.last_secs = Some(secs);
                present(
                    sink,
                    ViewUpdate::ShieldCountdown {
                        node: node.clone(),
                        secs,
                        expiring: secs <= expiring_secs,
                    },
                );
            }
        }
        for node in expired {
            tracing::trace!(node = %node, "Shield expired locally");
            self.lower(&node, sink);
        }
    }

    pub fn teardown(&mut self) {
        self.timers.cancel_all();
    }

    fn lower(&mut self, node: &str, sink: &mut dyn RenderSink) {
        if self.entries.remove(node).is_some() {
            present(
                sink,
                ViewUpdate::ShieldLowered {
                    node: node.to_string(),
                },
            );
        }
    }
}

impl SnapshotUnit for ShieldBoard {
    fn name(&self) -> &'static str {
        "shields"
    }

    fn apply(
        &mut self,
        snapshot: &Snapshot,
        now_ms: u64,
        _ctx: &ClientContext,
        sink: &mut dyn RenderSink,
    ) {
        let Some(nodes) = &snapshot.nodes else {
            return;
        };

        // The node map is complete; anything missing has no shield.
        let gone: Vec<String> = self
            .entries
            .keys()
            .filter(|id| !nodes.contains_key(*id))
            .cloned()
            .collect();
        for node in gone {
            self.lower(&node, sink);
        }
        self.statuses.retain(|id, _| nodes.contains_key(id));

        let now = now_ms as i64;
        for (id, node) in nodes {
            let status = (node.owner, node.status_label());
            if self.statuses.get(id) != Some(&status) {
                present(
                    sink,
                    ViewUpdate::NodeStatus {
                        node: id.clone(),
                        owner: status.0,
                        label: status.1.clone(),
                    },
                );
                self.statuses.insert(id.clone(), status);
            }

            let end_ms = secs_to_millis(node.shield_end);
            if node.shield_end > 0.0 && end_ms > now {
                match self.entries.get_mut(id) {
                    Some(entry) => entry.end_ms = end_ms,
                    None => {
                        self.entries.insert(
                            id.clone(),
                            ShieldEntry {
                                end_ms,
                                last_secs: None,
                            },
                        );
                        present(sink, ViewUpdate::ShieldRaised { node: id.clone() });
                    },
                }
            } else {
                self.lower(id, sink);
            }
        }
        self.tick(now_ms, sink);
    }

    fn resync(&mut self) {
        self.statuses.clear();
        for entry in self.entries.values_mut() {
            entry.last_secs = None;
        }
    }
}
