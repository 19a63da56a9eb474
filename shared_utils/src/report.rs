//! End-of-run summary report.

use crate::batch::BatchResult;
use crate::progress::{format_bytes, format_duration};
use std::time::Duration;

pub fn print_summary_report(result: &BatchResult, duration: Duration, operation_name: &str) {
    let saved = result.bytes_in as i128 - result.bytes_out as i128;
    let saved_pct = if result.bytes_in > 0 {
        (saved as f64 / result.bytes_in as f64) * 100.0
    } else {
        0.0
    };

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║  📊 {} Summary", operation_name);
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  📁 Files processed:   {:>10}", result.total);
    println!("║  ✅ Converted:         {:>10}", result.converted);
    println!("║  📌 Forced:            {:>10}", result.forced);
    println!("║  📄 Copied unchanged:  {:>10}", result.copied);
    println!("║  ⏭️  Skipped:           {:>10}", result.skipped);
    println!("║  ❌ Failed:            {:>10}", result.failed);
    println!("║  📈 Success rate:      {:>9.1}%", result.success_rate());
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  💾 Input size:        {:>10}", format_bytes(result.bytes_in));
    println!("║  💾 Output size:       {:>10}", format_bytes(result.bytes_out));
    println!("║  📉 Space saved:       {:>9.1}%", saved_pct);
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║  ⏱️  Total time:        {:>10}", format_duration(duration));
    if result.total > 0 {
        let avg = duration.as_secs_f64() / result.total as f64;
        println!("║  ⏱️  Avg per file:      {:>9.2}s", avg);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");

    if !result.errors.is_empty() {
        println!();
        println!("❌ Errors:");
        for (path, error) in &result.errors {
            println!("   {} → {}", path.display(), error);
        }
    }
}

pub fn print_simple_summary(result: &BatchResult) {
    println!(
        "\n✅ Complete: {} converted, {} forced, {} copied, {} skipped, {} failed (total: {})",
        result.converted, result.forced, result.copied, result.skipped, result.failed, result.total
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_print_summary_report_no_panic() {
        let mut result = BatchResult::new();
        result.converted(1000, 500);
        result.failed(PathBuf::from("bad.heic"), "decode failed".to_string());

        print_summary_report(&result, Duration::from_secs(10), "img-jxl");
    }

    #[test]
    fn test_print_summary_report_empty_batch() {
        let result = BatchResult::new();
        print_summary_report(&result, Duration::from_secs(1), "img-jxl");
    }

    #[test]
    fn test_print_simple_summary_no_panic() {
        let mut result = BatchResult::new();
        result.converted(10, 5);
        result.skipped();
        print_simple_summary(&result);
    }

    #[test]
    fn test_space_saved_formula() {
        let mut result = BatchResult::new();
        result.converted(1000, 250);
        let saved = result.bytes_in as i128 - result.bytes_out as i128;
        let pct = (saved as f64 / result.bytes_in as f64) * 100.0;
        assert!((pct - 75.0).abs() < 0.01);

        // forced files contribute their larger outputs to the totals
        result.forced(100, 400);
        assert_eq!(result.bytes_in, 1100);
        assert_eq!(result.bytes_out, 650);
    }
}
