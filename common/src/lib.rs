//! Tokenscan common
//!
//! Các thành phần dùng chung cho workspace: phân loại lỗi, khởi tạo logging
//! và vài hàm tiện ích nhỏ.

pub mod error;
pub mod logger;
pub mod utils;

// Re-exports
pub use error::{AnalysisError, AnalysisResultOf};
pub use logger::{init_logging, LogConfig};
pub use utils::{format_address, parse_token_list, DEFAULT_MAX_TOKENS};
