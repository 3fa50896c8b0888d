// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 默认值、覆写、格式错误回落、快照
// ==========================================

mod test_helpers;

use namdan_attendance::config::{config_keys, ConfigManager, ReportConfigReader};
use namdan_attendance::exporter::ExportFormat;
use namdan_attendance::repository::RepositoryError;
use namdan_attendance::{MemberType, PercentageBasis};
use test_helpers::{create_test_db, insert_config};

#[tokio::test]
async fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[tokio::test]
async fn test_config_manager_unreachable_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("missing").join("attendance.db");

    let result = ConfigManager::new(db_path.to_str().expect("utf-8 path"));
    assert!(matches!(
        result,
        Err(RepositoryError::DatabaseConnectionError(_))
    ));
}

#[tokio::test]
async fn test_defaults_when_unset() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert_eq!(
        config_manager.get_percentage_basis().await.expect("basis"),
        PercentageBasis::TotalDays
    );
    assert_eq!(
        config_manager.get_roster_member_type().await.expect("type"),
        MemberType::Namdan
    );
    assert_eq!(config_manager.get_max_column_width().await.expect("width"), 50);
    assert!(config_manager.get_include_matrix().await.expect("matrix"));
    assert_eq!(
        config_manager.get_export_format().await.expect("format"),
        ExportFormat::Xlsx
    );
    assert_eq!(config_manager.get_locale().await.expect("locale"), "en");
}

#[tokio::test]
async fn test_set_config_value_overrides() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config_manager
        .set_config_value(config_keys::PERCENTAGE_BASIS, "FILLED_DAYS")
        .expect("set basis");
    config_manager
        .set_config_value(config_keys::MAX_COLUMN_WIDTH, "30")
        .expect("set width");
    config_manager
        .set_config_value(config_keys::MAX_COLUMN_WIDTH, "40")
        .expect("overwrite width");

    assert_eq!(
        config_manager.get_percentage_basis().await.expect("basis"),
        PercentageBasis::FilledDays
    );
    assert_eq!(config_manager.get_max_column_width().await.expect("width"), 40);
}

#[tokio::test]
async fn test_malformed_values_fall_back_to_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    insert_config(&conn, config_keys::PERCENTAGE_BASIS, "HALF_DAYS");
    insert_config(&conn, config_keys::MAX_COLUMN_WIDTH, "wide");
    insert_config(&conn, config_keys::INCLUDE_MATRIX, "maybe");
    insert_config(&conn, config_keys::EXPORT_FORMAT, "pdf");
    insert_config(&conn, config_keys::ROSTER_MEMBER_TYPE, "VIP");

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert_eq!(
        config_manager.get_percentage_basis().await.expect("basis"),
        PercentageBasis::TotalDays
    );
    assert_eq!(config_manager.get_max_column_width().await.expect("width"), 50);
    assert!(config_manager.get_include_matrix().await.expect("matrix"));
    assert_eq!(
        config_manager.get_export_format().await.expect("format"),
        ExportFormat::Xlsx
    );
    assert_eq!(
        config_manager.get_roster_member_type().await.expect("type"),
        MemberType::Namdan
    );
}

#[tokio::test]
async fn test_zero_column_width_uses_default() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    insert_config(&conn, config_keys::MAX_COLUMN_WIDTH, "0");

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    assert_eq!(config_manager.get_max_column_width().await.expect("width"), 50);
}

#[tokio::test]
async fn test_config_snapshot() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = test_helpers::open_test_connection(&db_path).expect("Failed to open db");
    insert_config(&conn, config_keys::EXPORT_FORMAT, "CSV");
    insert_config(&conn, config_keys::LOCALE, "zh-CN");

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    let snapshot = config_manager.get_config_snapshot().expect("snapshot");
    let parsed: serde_json::Value = serde_json::from_str(&snapshot).expect("valid json");

    assert_eq!(parsed["export.format"], "CSV");
    assert_eq!(parsed["ui.locale"], "zh-CN");
    assert_eq!(parsed.as_object().map(|o| o.len()), Some(2));
}
