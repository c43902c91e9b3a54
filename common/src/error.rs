// Third party imports
use thiserror::Error;

/// Lỗi của một lượt phân tích token
///
/// Chỉ các lỗi làm mất danh tính token mới được trả về cho caller.
/// Mọi nguồn tín hiệu khác (risk report, reasoning model) được hạ cấp
/// về giá trị mặc định trong pipeline và không xuất hiện ở đây.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Nhà cung cấp dữ liệu thị trường không có token này
    #[error("Token not found: {0}")]
    TokenNotFound(String),
    /// Địa chỉ token rỗng hoặc không hợp lệ
    #[error("Invalid token address: {0:?}")]
    InvalidAddress(String),
    /// Không lấy được dữ liệu thị trường (lỗi mạng, timeout)
    #[error("Market data unavailable for {token}: {reason}")]
    MarketData {
        token: String,
        reason: String,
    },
    /// Lỗi cấu hình
    #[error("Config error: {0}")]
    Config(String),
}

impl AnalysisError {
    /// Token không tồn tại ở nhà cung cấp
    pub fn is_not_found(&self) -> bool {
        matches!(self, AnalysisError::TokenNotFound(_))
    }

    /// Mã ngắn dùng khi serialize kết quả lỗi
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::TokenNotFound(_) => "token_not_found",
            AnalysisError::InvalidAddress(_) => "invalid_address",
            AnalysisError::MarketData { .. } => "market_data_unavailable",
            AnalysisError::Config(_) => "config",
        }
    }
}

/// Kiểu kết quả chung
pub type AnalysisResultOf<T> = Result<T, AnalysisError>;
