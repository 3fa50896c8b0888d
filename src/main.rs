// ==========================================
// 出勤登记系统 - 命令行入口
// ==========================================
// 用法:
//   namdan-attendance centres
//   namdan-attendance report <centre_id> <from YYYY-MM-DD> <to YYYY-MM-DD> [out_dir]
// ==========================================

use anyhow::{bail, Context};
use chrono::NaiveDate;
use namdan_attendance::app::{get_default_db_path, AppState};
use namdan_attendance::config::ReportConfigReader;
use namdan_attendance::{i18n, logging, ApiError, ReportRequest};
use std::path::PathBuf;

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("日期格式错误: {}", raw))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 出勤登记与报表", namdan_attendance::APP_NAME);
    tracing::info!("系统版本: {}", namdan_attendance::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;
    i18n::set_locale(&state.config_manager.get_locale().await?);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("centres") => {
            for centre in state.report_api.list_centres().await? {
                println!("{}\t{}\t{}", centre.id, centre.state, centre.display_name());
            }
        }
        Some("report") => {
            if args.len() < 4 {
                bail!("用法: report <centre_id> <from> <to> [out_dir]");
            }
            let centre_id: i64 = args[1].parse().with_context(|| format!("中心ID无效: {}", args[1]))?;
            let request = ReportRequest::new(centre_id, parse_date(&args[2])?, parse_date(&args[3])?);

            let report = match state.report_api.generate_latest(&request).await {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("{}", e.user_message());
                    return Err(e.into());
                }
            };
            for s in &report.summaries {
                println!(
                    "{}\tP={}\tA={}\tNF={}\t{}%",
                    s.member.name, s.present_days, s.absent_days, s.not_filled_days, s.attendance_percentage
                );
            }

            if let Some(dir) = args.get(4) {
                match state.report_api.export_report(&report, &PathBuf::from(dir)).await {
                    Ok(artifact) => println!("已导出: {}", artifact.file_name),
                    Err(ApiError::NothingToExport) => println!("{}", ApiError::NothingToExport.user_message()),
                    Err(e) => return Err(e.into()),
                }
            }
        }
        _ => {
            println!("用法:");
            println!("  namdan-attendance centres");
            println!("  namdan-attendance report <centre_id> <from YYYY-MM-DD> <to YYYY-MM-DD> [out_dir]");
        }
    }

    Ok(())
}
