//! Training statistics: the observability sink read by the host.

use serde::{Deserialize, Serialize};

/// Score summary for one completed generation
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: u64,
    pub best: f32,
    pub mean: f32,
    pub worst: f32,
}

/// Rolling statistics for a training run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Generation currently being evaluated
    pub generation: u64,
    /// Index of the candidate under evaluation
    pub candidate: usize,
    /// Best score seen across the whole run
    pub best_score: f32,
    /// Per-generation score summaries, oldest first
    pub history: Vec<GenerationRecord>,
}

impl TrainingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note which candidate is being evaluated
    pub fn begin_candidate(&mut self, generation: u64, candidate: usize) {
        self.generation = generation;
        self.candidate = candidate;
    }

    /// Fold one completed generation's scores into the history
    pub fn record_generation(&mut self, generation: u64, scores: &[f32]) {
        if scores.is_empty() {
            return;
        }

        let best = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let worst = scores.iter().cloned().fold(f32::INFINITY, f32::min);
        let mean = scores.iter().sum::<f32>() / scores.len() as f32;

        if best > self.best_score {
            self.best_score = best;
        }

        self.history.push(GenerationRecord {
            generation,
            best,
            mean,
            worst,
        });
    }

    /// One-line summary for logs and the host HUD
    pub fn summary(&self) -> String {
        match self.history.last() {
            Some(last) => format!(
                "gen {:>5} | best {:.3} | mean {:.3} | worst {:.3} | all-time best {:.3}",
                last.generation, last.best, last.mean, last.worst, self.best_score
            ),
            None => "no completed generations yet".to_string(),
        }
    }

    /// Save the full history as JSON
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}
