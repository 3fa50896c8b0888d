// ==========================================
// 出勤登记系统 - 作用域领域模型
// ==========================================
// 作用域: 登记出勤所针对的地点 (access 地点 / namdan 中心)
// ==========================================

use crate::domain::types::ScopeKind;
use serde::{Deserialize, Serialize};

// ==========================================
// Scope - 出勤作用域
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub id: i64,         // access.id 或 namdan.centre_id
    pub kind: ScopeKind, // LOCATION / CENTRE
    pub name: String,    // 地点名 (area) 或中心名 (centre_name)
    pub area: String,
    pub taluk: String,
    pub district: String,
    pub state: String,
}

impl Scope {
    /// 导出文件名中作用域名为空时的回退值
    pub fn fallback_name(&self) -> &'static str {
        match self.kind {
            ScopeKind::Location => "Access",
            ScopeKind::Centre => "Namdan",
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.fallback_name()
        } else {
            &self.name
        }
    }
}
