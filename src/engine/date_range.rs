// ==========================================
// 出勤登记系统 - 日期序列生成
// ==========================================
// 闭区间 [from, to] 按日历日展开, 不做小数天运算
// ==========================================

use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;

pub struct DateRangeGenerator;

impl DateRangeGenerator {
    /// 生成 [from, to] 的升序日期序列
    ///
    /// # 错误
    /// - `to < from` 时返回 InvalidRange
    pub fn generate(from: NaiveDate, to: NaiveDate) -> EngineResult<Vec<NaiveDate>> {
        if to < from {
            return Err(EngineError::InvalidRange { from, to });
        }
        Ok(from.iter_days().take_while(|day| *day <= to).collect())
    }
}
