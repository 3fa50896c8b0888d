// ==========================================
// 出勤登记系统 - 会员领域模型
// ==========================================
// 会员名册由外部会员管理模块维护, 本模块只读
// ==========================================

use crate::domain::types::MemberType;
use serde::{Deserialize, Serialize};

// ==========================================
// Member - 会员名册条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,                 // 会员ID
    pub name: String,            // 姓名
    pub mobile: String,          // 手机号 (10 位)
    pub village: String,         // 村
    pub taluk: String,           // 乡/县
    pub district: String,        // 区
    pub state: String,           // 邦
    pub member_type: MemberType, // GENERAL / NAMDAN
}

/// 手机号必须为 10 位数字
pub fn is_valid_mobile(mobile: &str) -> bool {
    let trimmed = mobile.trim();
    trimmed.len() == 10 && trimmed.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_mobile() {
        assert!(is_valid_mobile("9876543210"));
        assert!(is_valid_mobile(" 9876543210 "));
        assert!(!is_valid_mobile("987654321"));
        assert!(!is_valid_mobile("98765432ab"));
    }
}
