//! Progress display module
//!
//! Provides styled terminal output and run statistics for the filtering
//! pipeline.

use bytesize::ByteSize;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Print the application banner
pub fn print_banner() {
    let banner = r#"
╔══════════════════════════════════════════════════════════════╗
║   LOG-FILTER                                        v1.0.0   ║
║   High-Performance Log Record Filtering                      ║
║   For Incident Response                                      ║
╚══════════════════════════════════════════════════════════════╝
"#;

    println!("{}", banner.green());
}

/// Print a section header
pub fn print_header(text: &str) {
    println!("\n{} {}", "▶".green(), text.green().bold());
}

/// Print an info message
pub fn print_info(text: &str) {
    println!("  {} {}", "ℹ".cyan(), text);
}

/// Print a success message
pub fn print_success(text: &str) {
    println!("  {} {}", "✔".green(), text.green());
}

/// Print a warning message
pub fn print_warning(text: &str) {
    println!("  {} {}", "⚠".yellow(), text.yellow());
}

/// Print an error message
pub fn print_error(text: &str) {
    eprintln!("  {} {}", "✖".red(), text.red());
}

/// Print a bullet point
pub fn print_bullet(text: &str) {
    println!("  {} {}", "•".green(), text);
}

/// Create a styled progress bar over the discovered sources
pub fn create_progress_bar(total: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);

    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.green/dim}] {pos}/{len} ({percent}%) {msg}")
            .unwrap()
            .progress_chars("█▓░")
    );

    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    pb
}

/// Run statistics, shared read-only across every processing task.
#[derive(Debug)]
pub struct ProcessingStats {
    pub sources_total: AtomicU64,
    pub sources_processed: AtomicU64,
    pub records_scanned: AtomicU64,
    pub records_emitted: AtomicU64,
    pub bytes_emitted: AtomicU64,
    pub failures: AtomicU64,
    pub start_time: Instant,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self {
            sources_total: AtomicU64::new(0),
            sources_processed: AtomicU64::new(0),
            records_scanned: AtomicU64::new(0),
            records_emitted: AtomicU64::new(0),
            bytes_emitted: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn add_sources(&self, count: u64) {
        self.sources_total.fetch_add(count, Ordering::Relaxed);
    }

    pub fn complete_source(&self) {
        self.sources_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_record(&self) {
        self.records_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_emission(&self, bytes: u64) {
        self.records_emitted.fetch_add(1, Ordering::Relaxed);
        self.bytes_emitted.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn add_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_sources_total(&self) -> u64 {
        self.sources_total.load(Ordering::Relaxed)
    }

    pub fn get_sources_processed(&self) -> u64 {
        self.sources_processed.load(Ordering::Relaxed)
    }

    pub fn get_records_scanned(&self) -> u64 {
        self.records_scanned.load(Ordering::Relaxed)
    }

    pub fn get_records_emitted(&self) -> u64 {
        self.records_emitted.load(Ordering::Relaxed)
    }

    pub fn get_bytes_emitted(&self) -> u64 {
        self.bytes_emitted.load(Ordering::Relaxed)
    }

    pub fn get_failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn records_per_second(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.get_records_scanned() as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Print final statistics
    pub fn print_summary(&self) {
        let elapsed = self.elapsed();
        let failures = self.get_failures();

        println!();
        println!("{}", "═".repeat(60).green());
        println!("{}", "                    FILTERING COMPLETE".green().bold());
        println!("{}", "═".repeat(60).green());
        println!();

        println!("  {} {}", "Sources:        ".green(),
            format!("{}/{}", self.get_sources_processed(), self.get_sources_total()));
        println!("  {} {}", "Records scanned:".green(),
            format_number(self.get_records_scanned()));
        println!("  {} {}", "Records emitted:".green().bold(),
            format_number(self.get_records_emitted()).green().bold());
        println!("  {} {}", "Data emitted:   ".green(),
            ByteSize(self.get_bytes_emitted()));

        if failures > 0 {
            println!("  {} {}", "Failures:       ".red(),
                format_number(failures).red());
        }

        println!();
        println!("  {} {:?}", "Duration:       ".green(), elapsed);
        println!("  {} {:.2} records/sec", "Throughput:     ".green(),
            self.records_per_second());
        println!();
        println!("{}", "═".repeat(60).green());
    }
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousand separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(123), "123");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_stats() {
        let stats = ProcessingStats::new();

        stats.add_sources(3);
        stats.add_record();
        stats.add_record();
        stats.add_emission(9);
        stats.add_emission(5);
        stats.add_failure();

        assert_eq!(stats.get_sources_total(), 3);
        assert_eq!(stats.get_records_scanned(), 2);
        assert_eq!(stats.get_records_emitted(), 2);
        assert_eq!(stats.get_bytes_emitted(), 14);
        assert_eq!(stats.get_failures(), 1);
    }
}
