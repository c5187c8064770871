// src/config/consts.rs

// Result shape
pub const TOP_N: usize = 20;

// Quality gate: accepted records needed to stop trying lower strategies
pub const SUFFICIENT_ROWS: usize = 10;

// Payload scoring
pub const PAYLOAD_SAMPLE: usize = 30;
pub const PAYLOAD_MIN_ARRAY: usize = 10;
pub const PAYLOAD_MIN_SCORE: usize = 3;
pub const PLAUSIBLE_VOLUME: f64 = 1000.0;
pub const PAYLOAD_MAX_DEPTH: usize = 12;

// DOM rows
pub const MIN_CELLS: usize = 4;
pub const MIN_TABLE_ROWS: usize = 10;

// Text proximity (lines around an address line)
pub const WINDOW_BEFORE: usize = 4;
pub const WINDOW_AFTER: usize = 8;
pub const MAX_TEXT_LINES: usize = 5000;
pub const TOTAL_LABEL_REACH: usize = 3;

// OCR chrome: whole lines that are UI labels, never data
pub const OCR_CHROME: &[&str] = &[
    "leaderboard", "top 20", "top traders", "rank", "address", "wallet", "level",
    "volume", "volume traded", "connect wallet", "trade",
    "earn", "portfolio", "referrals", "docs", "more", "search", "view all", "load more",
    "daily", "weekly", "all time", "epoch",
];

// Local store
pub const STORE_DIR: &str = ".store";
pub const SNAPSHOT_FILE: &str = "leaderboard_snapshot.json";
pub const LOG_FILE: &str = "debug.log";
pub const DEBUG_HTML: &str = "debug_page.html";
pub const DEBUG_TEXT: &str = "debug_text.txt";

// Export
pub const DEFAULT_FILE: &str = "top20";
