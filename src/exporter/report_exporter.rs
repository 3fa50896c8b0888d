// ==========================================
// 出勤登记系统 - 出勤报表导出
// ==========================================
// 两个视图:
// - Summary: 每人一行, 身份字段 + 出勤/缺勤/未登记/出勤率
// - Final Report: 每人一行, 每日一列, 单元格为 P / A / NF
// 文件名: Attendance_<中心名>_<from dd-MM-yyyy>_to_<to dd-MM-yyyy>.<ext>
// ==========================================

use crate::domain::report::{AttendanceReport, MemberAttendanceSummary};
use crate::exporter::error::{ExportError, ExportResult};
use crate::exporter::workbook::{sanitize_file_part, CellValue, Sheet, Workbook};
use crate::exporter::writer::WorkbookWriter;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const SUMMARY_SHEET: &str = "Summary";
pub const MATRIX_SHEET: &str = "Final Report";

const SUMMARY_HEADERS: [&str; 10] = [
    "Name",
    "Mobile",
    "Village",
    "Taluk",
    "District",
    "State",
    "Present",
    "Absent",
    "Not Filled",
    "Attendance %",
];
const MATRIX_IDENTITY_HEADERS: [&str; 3] = ["Name", "Mobile", "Village"];

/// 导出结果
///
/// file_name 为实际写出的文件名, 多个文件 (CSV) 以 ", " 连接
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub paths: Vec<PathBuf>,
}

impl ExportArtifact {
    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        let file_name = paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        Self { file_name, paths }
    }
}

pub fn report_file_stem(scope_name: &str, from: NaiveDate, to: NaiveDate) -> String {
    format!(
        "Attendance_{}_{}_to_{}",
        sanitize_file_part(scope_name),
        from.format("%d-%m-%Y"),
        to.format("%d-%m-%Y")
    )
}

pub fn build_summary_sheet(summaries: &[MemberAttendanceSummary]) -> Sheet {
    let mut sheet = Sheet::new(
        SUMMARY_SHEET,
        SUMMARY_HEADERS.iter().map(|h| h.to_string()).collect(),
    );
    for s in summaries {
        let m = &s.member;
        sheet.push_row(vec![
            CellValue::text(&m.name),
            CellValue::text(&m.mobile),
            CellValue::text(&m.village),
            CellValue::text(&m.taluk),
            CellValue::text(&m.district),
            CellValue::text(&m.state),
            CellValue::number(s.present_days),
            CellValue::number(s.absent_days),
            CellValue::number(s.not_filled_days),
            CellValue::number(s.attendance_percentage),
        ]);
    }
    sheet
}

pub fn build_matrix_sheet(days: &[NaiveDate], summaries: &[MemberAttendanceSummary]) -> Sheet {
    let headers = MATRIX_IDENTITY_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain(days.iter().map(|d| d.format("%d/%m/%Y").to_string()))
        .collect();
    let mut sheet = Sheet::new(MATRIX_SHEET, headers);

    for s in summaries {
        let mut row = vec![
            CellValue::text(&s.member.name),
            CellValue::text(&s.member.mobile),
            CellValue::text(&s.member.village),
        ];
        row.extend(s.daily_attendance.iter().map(|d| CellValue::text(d.status.code())));
        sheet.push_row(row);
    }
    sheet
}

/// 构建报表工作簿
///
/// # 错误
/// - 无汇总行时返回 NothingToExport
pub fn build_report_workbook(report: &AttendanceReport, include_matrix: bool) -> ExportResult<Workbook> {
    if report.summaries.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut workbook = Workbook::new();
    workbook.add_sheet(build_summary_sheet(&report.summaries));
    if include_matrix {
        workbook.add_sheet(build_matrix_sheet(&report.days, &report.summaries));
    }
    Ok(workbook)
}

// ==========================================
// ReportExporter
// ==========================================
pub struct ReportExporter {
    writer: Box<dyn WorkbookWriter>,
    include_matrix: bool,
}

impl ReportExporter {
    pub fn new(writer: Box<dyn WorkbookWriter>, include_matrix: bool) -> Self {
        Self {
            writer,
            include_matrix,
        }
    }

    pub fn export(
        &self,
        report: &AttendanceReport,
        scope_name: &str,
        dir: &Path,
    ) -> ExportResult<ExportArtifact> {
        let workbook = build_report_workbook(report, self.include_matrix)?;
        let stem = report_file_stem(scope_name, report.from, report.to);
        let paths = self.writer.write(&workbook, dir, &stem)?;

        info!(
            scope_id = report.scope_id,
            rows = report.summaries.len(),
            format = %self.writer.format(),
            file = %stem,
            "出勤报表导出完成"
        );
        Ok(ExportArtifact::from_paths(paths))
    }
}
