//! Statistics collected over a run.

/// Counters accumulated across every path of a run.
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    /// Paths completed.
    pub paths: u64,
    /// Paths whose outcome satisfied the liveness/failure predicate.
    pub live_paths: u64,
    /// Paths that violated a safety property.
    pub unsafe_paths: u64,
    /// Simulation steps across all paths.
    pub steps: u64,
    /// Decisions resolved across all paths.
    pub decisions: u64,
    /// Decisions replayed from the fixed prefix.
    pub prefix_decisions: u64,
    /// Decisions supplied by the search strategy.
    pub search_decisions: u64,
    /// Decisions drawn from the uniform tail.
    pub random_decisions: u64,
    /// Paths ended per cause, indexed by [`wander_core::EndCause::index`].
    pub paths_by_cause: [u64; 4],
    /// Search levels completed (depth growths, frontier swaps, prefix-length
    /// moves).
    pub levels: u64,
    /// Path files written.
    pub paths_saved: u64,
}

impl RunStats {
    /// Live-path rate over the whole run.
    pub fn live_rate(&self) -> f64 {
        if self.paths == 0 {
            return 0.0;
        }
        self.live_paths as f64 / self.paths as f64
    }

    /// Mean decisions per path.
    pub fn decisions_per_path(&self) -> f64 {
        if self.paths == 0 {
            return 0.0;
        }
        self.decisions as f64 / self.paths as f64
    }

    /// Print a human-readable end-of-run report.
    pub fn print_summary(&self) {
        println!("=== Run summary ===");
        println!("Paths:     {}", self.paths);
        println!(
            "  live:    {} ({:.1}%)",
            self.live_paths,
            self.live_rate() * 100.0
        );
        println!("  unsafe:  {}", self.unsafe_paths);
        for cause in wander_core::EndCause::ALL {
            println!(
                "  {:<20} {}",
                format!("{}:", cause.label()),
                self.paths_by_cause[cause.index()]
            );
        }
        println!("Steps:     {}", self.steps);
        println!(
            "Decisions: {} ({:.1}/path; {} prefix, {} search, {} random)",
            self.decisions,
            self.decisions_per_path(),
            self.prefix_decisions,
            self.search_decisions,
            self.random_decisions
        );
        println!("Levels:    {}", self.levels);
        println!("Saved:     {} path file(s)", self.paths_saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_with_no_paths() {
        let stats = RunStats::default();
        assert_eq!(stats.live_rate(), 0.0);
        assert_eq!(stats.decisions_per_path(), 0.0);
    }

    #[test]
    fn test_live_rate() {
        let stats = RunStats {
            paths: 4,
            live_paths: 1,
            ..RunStats::default()
        };
        assert!((stats.live_rate() - 0.25).abs() < f64::EPSILON);
    }
}
