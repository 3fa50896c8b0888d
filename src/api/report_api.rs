// ==========================================
// 出勤登记系统 - 出勤报表 API
// ==========================================
// 职责: 区间报表生成、导出、中心列表
// 说明: 新请求通过 begin_request() 取代旧请求, 旧请求结果被丢弃
// ==========================================

use crate::api::error::{require_id, require_range, ApiError, ApiResult};
use crate::config::report_config_trait::ReportConfigReader;
use crate::domain::report::{AttendanceReport, MemberAttendanceSummary};
use crate::domain::scope::Scope;
use crate::domain::types::RankMetric;
use crate::engine::aggregator::{rank_by, AggregateRequest, AttendanceAggregator};
use crate::engine::cancel::{CancellationToken, ReportSupersession};
use crate::exporter::report_exporter::{ExportArtifact, ReportExporter};
use crate::exporter::writer::writer_for;
use crate::repository::member_repo::MemberRepository;
use crate::repository::namdan_attendance_repo::NamdanAttendanceRepository;
use crate::repository::scope_repo::ScopeRepository;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// 报表请求 (字段缺失在校验阶段拒绝)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub centre_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReportRequest {
    pub fn new(centre_id: i64, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            centre_id: Some(centre_id),
            from: Some(from),
            to: Some(to),
        }
    }
}

// ==========================================
// ReportApi
// ==========================================
pub struct ReportApi {
    scopes: Arc<dyn ScopeRepository>,
    config: Arc<dyn ReportConfigReader>,
    aggregator: AttendanceAggregator,
    supersession: ReportSupersession,
}

impl ReportApi {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        scopes: Arc<dyn ScopeRepository>,
        records: Arc<dyn NamdanAttendanceRepository>,
        config: Arc<dyn ReportConfigReader>,
    ) -> Self {
        Self {
            scopes,
            config,
            aggregator: AttendanceAggregator::new(members, records),
            supersession: ReportSupersession::new(),
        }
    }

    /// 开始一次新的报表请求, 上一次未完成的请求被取消
    pub fn begin_request(&self) -> CancellationToken {
        self.supersession.begin()
    }

    /// 生成区间报表
    ///
    /// # 错误
    /// - ValidationError: 缺少中心/日期, 或中心不存在
    /// - InvalidRange: to < from (不触发任何查询)
    /// - Cancelled: 请求已被取代
    /// - PersistenceError: 名册或记录拉取失败
    #[instrument(skip(self, token))]
    pub async fn generate_report(
        &self,
        request: &ReportRequest,
        token: &CancellationToken,
    ) -> ApiResult<AttendanceReport> {
        let centre_id = request
            .centre_id
            .ok_or_else(|| ApiError::validation("缺少中心"))?;
        require_id("centre_id", centre_id)?;
        let (from, to) = require_range(request.from, request.to)?;

        if self.scopes.find_centre(centre_id).await?.is_none() {
            return Err(ApiError::validation(format!("中心不存在: {}", centre_id)));
        }

        let aggregate = AggregateRequest {
            scope_id: centre_id,
            member_type: self.config.get_roster_member_type().await?,
            from,
            to,
            basis: self.config.get_percentage_basis().await?,
        };
        Ok(self.aggregator.aggregate(&aggregate, token).await?)
    }

    /// 取代之前的请求并生成报表
    pub async fn generate_latest(&self, request: &ReportRequest) -> ApiResult<AttendanceReport> {
        let token = self.begin_request();
        self.generate_report(request, &token).await
    }

    /// 导出报表到目录 dir
    pub async fn export_report(&self, report: &AttendanceReport, dir: &Path) -> ApiResult<ExportArtifact> {
        if report.is_empty() {
            return Err(ApiError::NothingToExport);
        }

        let scope_name = match self.scopes.find_centre(report.scope_id).await? {
            Some(scope) => scope.display_name().to_string(),
            None => return Err(ApiError::validation(format!("中心不存在: {}", report.scope_id))),
        };

        let format = self.config.get_export_format().await?;
        let max_width = self.config.get_max_column_width().await?;
        let include_matrix = self.config.get_include_matrix().await?;

        let exporter = ReportExporter::new(writer_for(format, max_width), include_matrix);
        let artifact = exporter.export(report, &scope_name, dir)?;
        info!(file = %artifact.file_name, "报表已导出");
        Ok(artifact)
    }

    /// 按指标排行 (图表数据)
    pub fn rank(&self, report: &AttendanceReport, metric: RankMetric) -> Vec<MemberAttendanceSummary> {
        rank_by(&report.summaries, metric)
    }

    /// 全部中心 (按 state, centre_name)
    pub async fn list_centres(&self) -> ApiResult<Vec<Scope>> {
        Ok(self.scopes.list_centres().await?)
    }
}
