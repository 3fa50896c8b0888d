// ==========================================
// 出勤登记系统 - 活动计划 API
// ==========================================
// 职责: 计划登记、列表筛选、计划出勤导出
// ==========================================

use crate::api::error::{require_id, ApiError, ApiResult};
use crate::config::report_config_trait::ReportConfigReader;
use crate::domain::plan::{NewPlan, Plan, PlanFilter, TAG_SEPARATOR};
use crate::exporter::plan_export::PlanAttendanceExporter;
use crate::exporter::report_exporter::ExportArtifact;
use crate::exporter::writer::writer_for;
use crate::repository::plan_repo::PlanRepository;
use crate::repository::regular_attendance_repo::RegularAttendanceRepository;
use crate::repository::scope_repo::ScopeRepository;
use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub struct PlanApi {
    plans: Arc<dyn PlanRepository>,
    scopes: Arc<dyn ScopeRepository>,
    regular: Arc<dyn RegularAttendanceRepository>,
    config: Arc<dyn ReportConfigReader>,
}

impl PlanApi {
    pub fn new(
        plans: Arc<dyn PlanRepository>,
        scopes: Arc<dyn ScopeRepository>,
        regular: Arc<dyn RegularAttendanceRepository>,
        config: Arc<dyn ReportConfigReader>,
    ) -> Self {
        Self {
            plans,
            scopes,
            regular,
            config,
        }
    }

    /// 登记新计划
    ///
    /// # 校验
    /// - 说明非空
    /// - valid_to >= valid_from
    /// - 至少一个标签, 标签内不得含分隔符 '-'
    /// - access 地点存在
    pub async fn create_plan(&self, plan: NewPlan) -> ApiResult<Plan> {
        require_id("access_id", plan.access_id)?;
        let description = plan.description.trim().to_string();
        if description.is_empty() {
            return Err(ApiError::validation("计划说明不能为空"));
        }
        if plan.valid_to < plan.valid_from {
            return Err(ApiError::InvalidRange {
                from: plan.valid_from,
                to: plan.valid_to,
            });
        }
        let tags: Vec<String> = plan
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.is_empty() {
            return Err(ApiError::validation("至少选择一个标签"));
        }
        if let Some(bad) = tags.iter().find(|t| t.contains(TAG_SEPARATOR)) {
            return Err(ApiError::validation(format!("标签不能包含 '{}': {}", TAG_SEPARATOR, bad)));
        }

        if self.scopes.find_location(plan.access_id).await?.is_none() {
            return Err(ApiError::validation(format!("地点不存在: {}", plan.access_id)));
        }

        let normalized = NewPlan {
            description,
            tags,
            ..plan
        };
        let created_at = Utc::now().naive_utc();
        let id = self.plans.insert(&normalized, created_at).await?;
        info!(plan_id = id, access_id = normalized.access_id, "计划已创建");

        self.plans
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::PersistenceError(format!("计划写入后无法读取: {}", id)))
    }

    /// 按条件列出计划 (最新在前)
    pub async fn list_plans(&self, filter: &PlanFilter) -> ApiResult<Vec<Plan>> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if to < from {
                return Err(ApiError::InvalidRange { from, to });
            }
        }
        Ok(self.plans.list(filter).await?)
    }

    /// 导出计划下全部出勤
    pub async fn export_plan_attendance(&self, plan_id: i64, dir: &Path) -> ApiResult<ExportArtifact> {
        require_id("plan_id", plan_id)?;
        let plan = self
            .plans
            .find_by_id(plan_id)
            .await?
            .ok_or_else(|| ApiError::validation(format!("计划不存在: {}", plan_id)))?;

        let area = self
            .scopes
            .find_location(plan.access_id)
            .await?
            .map(|scope| scope.display_name().to_string())
            .unwrap_or_else(|| "Access".to_string());

        let rows = self.regular.find_by_plan(plan_id).await?;
        let format = self.config.get_export_format().await?;
        let max_width = self.config.get_max_column_width().await?;

        let exporter = PlanAttendanceExporter::new(writer_for(format, max_width));
        Ok(exporter.export(&plan, &area, &rows, dir)?)
    }
}
