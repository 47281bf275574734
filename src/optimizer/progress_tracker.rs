//! # Progress Tracking Module
//!
//! Definisce il collaboratore che riceve gli eventi del batch (`Reporter`)
//! e il contatore che calcola la frazione di avanzamento.
//! Il batch chiama il reporter in modo sincrono dopo ogni file:
//! `on_outcome`, poi `on_log` con il messaggio, poi `on_progress`.

use crate::outcome::CompressionOutcome;

/// Receives batch notifications
pub trait Reporter {
    /// Fraction of files processed, in `0.0..=1.0`, never decreasing within a run
    fn on_progress(&mut self, fraction: f64);
    fn on_log(&mut self, message: &str);
    fn on_outcome(&mut self, outcome: &CompressionOutcome);
}

/// A reporter call captured as a value
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Progress(f64),
    Log(String),
    Outcome(CompressionOutcome),
}

/// Collects every event in order
impl Reporter for Vec<BatchEvent> {
    fn on_progress(&mut self, fraction: f64) {
        self.push(BatchEvent::Progress(fraction));
    }

    fn on_log(&mut self, message: &str) {
        self.push(BatchEvent::Log(message.to_string()));
    }

    fn on_outcome(&mut self, outcome: &CompressionOutcome) {
        self.push(BatchEvent::Outcome(outcome.clone()));
    }
}

/// Counts processed files against the total
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    pub total_files: usize,
    processed: usize,
}

impl ProgressTracker {
    pub fn new(total_files: usize) -> Self {
        Self { total_files, processed: 0 }
    }

    /// Mark one more file as processed and return the new fraction
    pub fn advance(&mut self) -> f64 {
        self.processed = (self.processed + 1).min(self.total_files);
        self.fraction()
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn fraction(&self) -> f64 {
        if self.total_files == 0 {
            1.0
        } else {
            self.processed as f64 / self.total_files as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_reaches_one() {
        let mut tracker = ProgressTracker::new(3);
        assert_eq!(tracker.fraction(), 0.0);

        let fractions: Vec<f64> = (0..3).map(|_| tracker.advance()).collect();
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(fractions.last(), Some(&1.0));
        assert_eq!(tracker.processed(), 3);

        // extra calls never overshoot
        assert_eq!(tracker.advance(), 1.0);
    }

    #[test]
    fn test_empty_tracker_is_complete() {
        assert_eq!(ProgressTracker::new(0).fraction(), 1.0);
    }

    #[test]
    fn test_vec_reporter_records_in_order() {
        let mut events: Vec<BatchEvent> = Vec::new();
        events.on_log("hello");
        events.on_progress(0.5);

        assert_eq!(events, vec![BatchEvent::Log("hello".to_string()), BatchEvent::Progress(0.5)]);
    }
}
