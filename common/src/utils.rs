/// Số token tối đa cho một yêu cầu phân tích
pub const DEFAULT_MAX_TOKENS: usize = 3;

/// Tách danh sách địa chỉ token phân cách bằng dấu phẩy
///
/// Bỏ khoảng trắng, bỏ phần tử rỗng và giới hạn `max` phần tử đầu tiên.
pub fn parse_token_list(raw: &str, max: usize) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .take(max)
        .map(str::to_string)
        .collect()
}

/// Định dạng địa chỉ thành chuỗi ngắn gọn
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() < 12 {
        return address.to_string();
    }

    let start: String = chars[..6].iter().collect();
    let end: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", start, end)
}
