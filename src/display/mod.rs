pub mod format;
pub mod links;
pub mod swipe;
pub mod time;

pub use format::{escape_html, format_money, format_pct, format_raw, MONEY_MONIKER};
pub use links::{contract_path, contract_url, group_path, group_url};
pub use swipe::{build_swipe_card, fallback_image_url, SwipeCard, SwipeCardOptions};
pub use time::from_now;
