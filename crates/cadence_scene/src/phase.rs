//! Phase tables
//!
//! A scene divides its frames into named phases with explicit `[start, end)`
//! boundaries. Phases are sorted and never overlap; construction rejects any
//! table that breaks either rule, so lookup is a single binary search and a
//! frame can never fall into two phases at once. Gaps between phases are
//! allowed.

use cadence_core::{ConfigError, Result};
use rustc_hash::FxHashMap;

/// A named frame range `[start, end)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phase {
    name: String,
    start: u32,
    end: u32,
}

impl Phase {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    /// First frame after the phase
    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn duration(&self) -> u32 {
        self.end - self.start
    }

    pub fn contains(&self, frame: u32) -> bool {
        (self.start..self.end).contains(&frame)
    }

    /// Fraction of the phase elapsed at `frame`, clamped to `0.0..=1.0`
    pub fn progress(&self, frame: f32) -> f32 {
        ((frame - self.start as f32) / self.duration() as f32).clamp(0.0, 1.0)
    }
}

/// A phase looked up for a specific frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivePhase<'a> {
    pub index: usize,
    pub name: &'a str,
    /// Frames since the phase started
    pub local_frame: u32,
    /// `local_frame / duration`, clamped to 1 once the phase has ended
    pub progress: f32,
}

/// Sorted, non-overlapping phases
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PhaseTable {
    phases: Vec<Phase>,
    by_name: FxHashMap<String, usize>,
}

impl PhaseTable {
    pub fn builder() -> PhaseTableBuilder {
        PhaseTableBuilder::new()
    }

    /// A table with no phases
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn get(&self, name: &str) -> Option<&Phase> {
        self.by_name.get(name).map(|&index| &self.phases[index])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// End of the last phase, if any
    pub fn end(&self) -> Option<u32> {
        self.phases.last().map(Phase::end)
    }

    /// The phase containing `frame`; `None` in gaps and after the last phase
    pub fn active(&self, frame: u32) -> Option<ActivePhase<'_>> {
        self.latest(frame)
            .filter(|active| self.phases[active.index].contains(frame))
    }

    /// The last phase that started at or before `frame`, even if it has ended
    pub fn latest(&self, frame: u32) -> Option<ActivePhase<'_>> {
        let index = self
            .phases
            .partition_point(|phase| phase.start <= frame)
            .checked_sub(1)?;
        let phase = &self.phases[index];
        Some(ActivePhase {
            index,
            name: &phase.name,
            local_frame: frame - phase.start,
            progress: phase.progress(frame as f32),
        })
    }

    /// Progress through the named phase at `frame`: 0 before, 1 after
    pub fn progress(&self, name: &str, frame: f32) -> Option<f32> {
        self.get(name).map(|phase| phase.progress(frame))
    }
}

/// Builder for [`PhaseTable`]
#[derive(Default)]
pub struct PhaseTableBuilder {
    phases: Vec<Phase>,
}

impl PhaseTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a phase covering `[start, end)`
    pub fn phase(mut self, name: impl Into<String>, start: u32, end: u32) -> Self {
        self.phases.push(Phase {
            name: name.into(),
            start,
            end,
        });
        self
    }

    /// Add a phase starting where the previous one ended (or at frame 0)
    pub fn then(self, name: impl Into<String>, duration: u32) -> Self {
        let start = self.phases.last().map_or(0, |phase| phase.end);
        let end = start.saturating_add(duration);
        self.phase(name, start, end)
    }

    pub fn build(self) -> Result<PhaseTable> {
        let mut by_name = FxHashMap::default();

        for (index, phase) in self.phases.iter().enumerate() {
            if phase.end <= phase.start {
                return Err(ConfigError::EmptyPhase {
                    name: phase.name.clone(),
                    start: phase.start,
                    end: phase.end,
                });
            }
            if let Some(previous) = index.checked_sub(1).map(|i| &self.phases[i]) {
                if phase.start < previous.end {
                    return Err(ConfigError::PhaseOverlap {
                        previous: previous.name.clone(),
                        previous_end: previous.end,
                        next: phase.name.clone(),
                        next_start: phase.start,
                    });
                }
            }
            if by_name.insert(phase.name.clone(), index).is_some() {
                return Err(ConfigError::DuplicateName {
                    kind: "phase",
                    name: phase.name.clone(),
                });
            }
        }

        Ok(PhaseTable {
            phases: self.phases,
            by_name,
        })
    }
}
