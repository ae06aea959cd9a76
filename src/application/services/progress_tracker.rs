/// Share of the 0-100 progress range each phase of a batch run owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseWeights {
    pub startup: u8,
    pub translation: u8,
    pub assembly: u8,
}

impl Default for PhaseWeights {
    fn default() -> Self {
        Self {
            startup: 5,
            translation: 85,
            assembly: 10,
        }
    }
}

/// Progress at the end of the translation phase after `completed` of `total`
/// tasks. Monotone in `completed`; clamps `completed` to `total`.
pub fn compute_progress(completed: usize, total: usize, weights: &PhaseWeights) -> u8 {
    let base = u32::from(weights.startup);
    let span = u32::from(weights.translation);
    let earned = if total == 0 {
        span
    } else {
        let done = completed.min(total) as u64;
        (u64::from(span) * done / total as u64) as u32
    };
    (base + earned).min(100) as u8
}

fn assembly_progress(assembled: usize, languages: usize, weights: &PhaseWeights) -> u8 {
    let base = u32::from(weights.startup) + u32::from(weights.translation);
    let span = u32::from(weights.assembly);
    let earned = if languages == 0 {
        span
    } else {
        let done = assembled.min(languages) as u64;
        (u64::from(span) * done / languages as u64) as u32
    };
    (base + earned).min(100) as u8
}

/// Phase bookkeeping for one run. Every value it hands out is at least the
/// previous one, and it reports whether the value moved so callers only
/// write real changes.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    weights: PhaseWeights,
    translation_total: usize,
    languages: usize,
    translated: usize,
    assembled: usize,
    high_water: u8,
}

impl ProgressTracker {
    pub fn new(weights: PhaseWeights, translation_total: usize, languages: usize) -> Self {
        Self {
            weights,
            translation_total,
            languages,
            translated: 0,
            assembled: 0,
            high_water: 0,
        }
    }

    pub fn current(&self) -> u8 {
        self.high_water
    }

    pub fn start(&mut self) -> Option<u8> {
        self.raise(self.weights.startup.min(100))
    }

    pub fn task_completed(&mut self) -> Option<u8> {
        self.translated += 1;
        self.raise(compute_progress(
            self.translated,
            self.translation_total,
            &self.weights,
        ))
    }

    /// Last assembled language leaves the tracker at 100 only if the weights
    /// add up to 100. Completion itself always writes 100.
    pub fn language_assembled(&mut self) -> Option<u8> {
        self.assembled += 1;
        let value = assembly_progress(self.assembled, self.languages, &self.weights);
        // Keep 100 for the completion write.
        self.raise(value.min(99))
    }

    fn raise(&mut self, value: u8) -> Option<u8> {
        if value > self.high_water {
            self.high_water = value;
            Some(value)
        } else {
            None
        }
    }
}
