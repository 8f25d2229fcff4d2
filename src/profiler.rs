//! Lightweight frame profiler.
//!
//! Records wall-clock time per named section (`motion`, `collision`) when
//! `SimConfig::profile` is set, and reports through `log`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Aggregated timings for one named section.
#[derive(Debug, Default, Clone)]
pub struct SectionStats {
    pub total_time: Duration,
    pub call_count: u64,
    pub min_time: Option<Duration>,
    pub max_time: Option<Duration>,
}

impl SectionStats {
    pub fn avg_time(&self) -> Duration {
        if self.call_count == 0 {
            Duration::ZERO
        } else {
            self.total_time.div_f64(self.call_count as f64)
        }
    }

    fn record(&mut self, elapsed: Duration) {
        self.total_time += elapsed;
        self.call_count += 1;
        self.min_time = Some(self.min_time.map_or(elapsed, |m| m.min(elapsed)));
        self.max_time = Some(self.max_time.map_or(elapsed, |m| m.max(elapsed)));
    }
}

#[derive(Debug, Default)]
pub struct Profiler {
    sections: HashMap<&'static str, SectionStats>,
    frames: u64,
}

impl Profiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` and charge its duration to `name`.
    pub fn time_section<F, R>(&mut self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        self.sections.entry(name).or_default().record(start.elapsed());
        result
    }

    pub fn end_frame(&mut self) {
        self.frames += 1;
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn get_section(&self, name: &str) -> Option<&SectionStats> {
        self.sections.get(name)
    }

    pub fn section_names(&self) -> Vec<&'static str> {
        self.sections.keys().copied().collect()
    }

    /// Write one line per section, slowest first, at info level.
    pub fn log_summary(&self) {
        let mut sections: Vec<_> = self.sections.iter().collect();
        sections.sort_by(|a, b| b.1.total_time.cmp(&a.1.total_time));

        log::info!("profile over {} frames", self.frames);
        for (name, stats) in sections {
            log::info!(
                "  {:<10} total {:>10.2?} avg {:>10.2?} min {:>10.2?} max {:>10.2?}",
                name,
                stats.total_time,
                stats.avg_time(),
                stats.min_time.unwrap_or(Duration::ZERO),
                stats.max_time.unwrap_or(Duration::ZERO),
            );
        }
    }

    pub fn reset(&mut self) {
        self.sections.clear();
        self.frames = 0;
    }
}
