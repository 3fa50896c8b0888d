// ==========================================
// 出勤登记系统 - 计划出勤导出
// ==========================================
// 单 sheet "Attendance", 按 date, time 升序
// 文件名: Attendance_<地点>_<valid_from dd-MM-yyyy>.<ext>
// ==========================================

use crate::domain::plan::Plan;
use crate::domain::report::PlanAttendanceRow;
use crate::exporter::error::{ExportError, ExportResult};
use crate::exporter::report_exporter::ExportArtifact;
use crate::exporter::workbook::{sanitize_file_part, CellValue, Sheet, Workbook};
use crate::exporter::writer::WorkbookWriter;
use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

pub const PLAN_SHEET: &str = "Attendance";

const PLAN_HEADERS: [&str; 9] = [
    "Date",
    "Time",
    "Member Name",
    "Mobile",
    "Village",
    "Taluk",
    "District",
    "State",
    "Type",
];

pub fn plan_file_stem(area: &str, valid_from: NaiveDate) -> String {
    format!(
        "Attendance_{}_{}",
        sanitize_file_part(area),
        valid_from.format("%d-%m-%Y")
    )
}

pub fn build_plan_workbook(rows: &[PlanAttendanceRow]) -> ExportResult<Workbook> {
    if rows.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut sheet = Sheet::new(PLAN_SHEET, PLAN_HEADERS.iter().map(|h| h.to_string()).collect());
    for row in rows {
        let m = &row.member;
        sheet.push_row(vec![
            CellValue::text(row.date.format("%d/%m/%Y").to_string()),
            CellValue::text(row.time.format("%H:%M:%S").to_string()),
            CellValue::text(&m.name),
            CellValue::text(&m.mobile),
            CellValue::text(&m.village),
            CellValue::text(&m.taluk),
            CellValue::text(&m.district),
            CellValue::text(&m.state),
            CellValue::text(m.member_type.as_str()),
        ]);
    }

    let mut workbook = Workbook::new();
    workbook.add_sheet(sheet);
    Ok(workbook)
}

pub struct PlanAttendanceExporter {
    writer: Box<dyn WorkbookWriter>,
}

impl PlanAttendanceExporter {
    pub fn new(writer: Box<dyn WorkbookWriter>) -> Self {
        Self { writer }
    }

    pub fn export(
        &self,
        plan: &Plan,
        area: &str,
        rows: &[PlanAttendanceRow],
        dir: &Path,
    ) -> ExportResult<ExportArtifact> {
        let workbook = build_plan_workbook(rows)?;
        let stem = plan_file_stem(area, plan.valid_from);
        let paths = self.writer.write(&workbook, dir, &stem)?;

        info!(plan_id = plan.id, rows = rows.len(), file = %stem, "计划出勤导出完成");
        Ok(ExportArtifact::from_paths(paths))
    }
}
