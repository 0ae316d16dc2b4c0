pub mod histogram;
pub mod intervals;
pub mod rate;

pub use histogram::{rr_histogram, RrHistogram, RR_HISTOGRAM_BINS};
pub use intervals::{interval_stats, IntervalStats};
pub use rate::{heart_rate, AnalysisResult, RateAnalyzer, RateStatus};
