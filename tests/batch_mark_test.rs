// ==========================================
// 计划制批量登记集成测试
// ==========================================
// 覆盖: 部分跳过、无有效计划、重复选择、计划优先级、手机号查询
// ==========================================

mod test_helpers;

use namdan_attendance::api::{outcome_message, skipped_message, ApiError};
use namdan_attendance::domain::{PlanResolution, RegularMarkOutcome};
use namdan_attendance::i18n::set_locale;
use test_helpers::{
    count_rows, create_test_state, d, dt, insert_location, insert_member, insert_member_at, insert_plan,
    insert_regular_attendance, open_test_connection,
};

#[tokio::test]
async fn test_batch_skips_already_marked_member() {
    let (_tmp, db_path, state) = create_test_state();
    let conn = open_test_connection(&db_path).expect("open");
    let access = insert_location(&conn, "Rampur");
    let plan = insert_plan(&conn, access, d(2024, 3, 1), d(2024, 3, 31), dt(2024, 2, 20, 9, 0));
    let asha = insert_member(&conn, "Asha", "9000000001", "GENERAL");
    let bhim = insert_member(&conn, "Bhim", "9000000002", "GENERAL");
    let chetan = insert_member(&conn, "Chetan", "9000000003", "GENERAL");
    insert_regular_attendance(&conn, bhim, access, plan, d(2024, 3, 4));

    let outcome = state
        .attendance_api
        .submit_regular_attendance(access, &[asha, bhim, chetan], dt(2024, 3, 5, 10, 30))
        .await
        .expect("submit");

    let RegularMarkOutcome::Marked { plan_id, outcome } = outcome else {
        panic!("expected Marked outcome");
    };
    assert_eq!(plan_id, plan);
    assert_eq!(outcome.inserted_names(), vec!["Asha", "Chetan"]);
    assert_eq!(outcome.skipped_names(), vec!["Bhim"]);
    assert!(outcome.has_conflicts());
    assert_eq!(count_rows(&conn, "SELECT COUNT(*) FROM attendance"), 3);

    let stamped: (String, String) = conn
        .query_row(
            "SELECT date, time FROM attendance WHERE member_id = ?1",
            [asha],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("stamped row");
    assert_eq!(stamped, ("2024-03-05".to_string(), "10:30:00".to_string()));
}

#[tokio::test]
async fn test_no_active_plan_writes_nothing() {
    let (_tmp, db_path, state) = create_test_state();
    let conn = open_test_connection(&db_path).expect("open");
    let access = insert_location(&conn, "Rampur");
    insert_plan(&conn, access, d(2024, 3, 1), d(2024, 3, 31), dt(2024, 2, 20, 9, 0));
    let asha = insert_member(&conn, "Asha", "9000000001", "GENERAL");

    let outcome = state
        .attendance_api
        .submit_regular_attendance(access, &[asha], dt(2024, 4, 1, 8, 0))
        .await
        .expect("submit");

    assert_eq!(outcome, RegularMarkOutcome::NoActivePlan);
    assert_eq!(count_rows(&conn, "SELECT COUNT(*) FROM attendance"), 0);

    let resolution = state
        .attendance_api
        .active_plan(access, d(2024, 4, 1))
        .await
        .expect("resolve");
    assert_eq!(resolution, PlanResolution::NoActivePlan);
}

#[tokio::test]
async fn test_empty_selection_is_rejected() {
    let (_tmp, db_path, state) = create_test_state();
    let conn = open_test_connection(&db_path).expect("open");
    let access = insert_location(&conn, "Rampur");

    let err = state
        .attendance_api
        .submit_regular_attendance(access, &[], dt(2024, 3, 5, 10, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError(_)));

    let err = state
        .attendance_api
        .submit_regular_attendance(access, &[1, 0], dt(2024, 3, 5, 10, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError(_)));
}

#[tokio::test]
async fn test_duplicate_selection_marks_once() {
    let (_tmp, db_path, state) = create_test_state();
    let conn = open_test_connection(&db_path).expect("open");
    let access = insert_location(&conn, "Rampur");
    insert_plan(&conn, access, d(2024, 3, 1), d(2024, 3, 31), dt(2024, 2, 20, 9, 0));
    let asha = insert_member(&conn, "Asha", "9000000001", "GENERAL");

    let outcome = state
        .attendance_api
        .submit_regular_attendance(access, &[asha, asha, 987_654], dt(2024, 3, 5, 10, 0))
        .await
        .expect("submit");

    let RegularMarkOutcome::Marked { outcome, .. } = outcome else {
        panic!("expected Marked outcome");
    };
    assert_eq!(outcome.inserted.len(), 1);
    assert!(outcome.skipped.is_empty());
    assert_eq!(count_rows(&conn, "SELECT COUNT(*) FROM attendance"), 1);

    // 再次提交: 全部跳过
    let again = state
        .attendance_api
        .submit_regular_attendance(access, &[asha], dt(2024, 3, 6, 10, 0))
        .await
        .expect("submit again");
    let RegularMarkOutcome::Marked { outcome, .. } = again else {
        panic!("expected Marked outcome");
    };
    assert!(outcome.inserted.is_empty());
    assert_eq!(outcome.skipped_names(), vec!["Asha"]);
    assert_eq!(count_rows(&conn, "SELECT COUNT(*) FROM attendance"), 1);
}

#[tokio::test]
async fn test_newest_overlapping_plan_wins() {
    let (_tmp, db_path, state) = create_test_state();
    let conn = open_test_connection(&db_path).expect("open");
    let access = insert_location(&conn, "Rampur");
    let _older = insert_plan(&conn, access, d(2024, 3, 1), d(2024, 3, 31), dt(2024, 2, 1, 9, 0));
    let newer = insert_plan(&conn, access, d(2024, 3, 4), d(2024, 3, 10), dt(2024, 3, 1, 9, 0));
    let other_access = insert_location(&conn, "Sitapur");
    insert_plan(&conn, other_access, d(2024, 3, 1), d(2024, 3, 31), dt(2024, 3, 2, 9, 0));

    let resolution = state
        .attendance_api
        .active_plan(access, d(2024, 3, 5))
        .await
        .expect("resolve");
    assert_eq!(resolution.active().map(|p| p.id), Some(newer));

    let asha = insert_member(&conn, "Asha", "9000000001", "GENERAL");
    let outcome = state
        .attendance_api
        .submit_regular_attendance(access, &[asha], dt(2024, 3, 5, 11, 0))
        .await
        .expect("submit");
    assert!(matches!(outcome, RegularMarkOutcome::Marked { plan_id, .. } if plan_id == newer));
}

#[tokio::test]
async fn test_skipped_message_lists_names() {
    let (_tmp, db_path, state) = create_test_state();
    let conn = open_test_connection(&db_path).expect("open");
    let access = insert_location(&conn, "Rampur");
    let plan = insert_plan(&conn, access, d(2024, 3, 1), d(2024, 3, 31), dt(2024, 2, 20, 9, 0));
    let asha = insert_member(&conn, "Asha", "9000000001", "GENERAL");
    let bhim = insert_member(&conn, "Bhim", "9000000002", "GENERAL");
    insert_regular_attendance(&conn, asha, access, plan, d(2024, 3, 2));
    insert_regular_attendance(&conn, bhim, access, plan, d(2024, 3, 2));

    let RegularMarkOutcome::Marked { outcome, .. } = state
        .attendance_api
        .submit_regular_attendance(access, &[asha, bhim], dt(2024, 3, 5, 10, 0))
        .await
        .expect("submit")
    else {
        panic!("expected Marked outcome");
    };

    set_locale("en");
    assert_eq!(
        skipped_message(&outcome).as_deref(),
        Some("Skipped: Asha, Bhim (already marked)")
    );
    assert_eq!(
        outcome_message(&RegularMarkOutcome::Marked { plan_id: plan, outcome }),
        "Marked 0 member(s) Skipped: Asha, Bhim (already marked)"
    );
    assert_eq!(
        outcome_message(&RegularMarkOutcome::NoActivePlan),
        "No active plan for this location today. Attendance cannot be marked."
    );
}

#[tokio::test]
async fn test_find_members_by_mobile() {
    let (_tmp, db_path, state) = create_test_state();
    let conn = open_test_connection(&db_path).expect("open");
    let older = insert_member_at(&conn, "Asha", "9876543210", "2024-01-01T08:00:00.000Z");
    let newer = insert_member_at(&conn, "Asha's son", "9876543210", "2024-02-01T08:00:00.000Z");
    insert_member_at(&conn, "Other", "9123456789", "2024-03-01T08:00:00.000Z");

    let found = state
        .attendance_api
        .find_members_by_mobile(" 9876543210 ")
        .await
        .expect("lookup");
    let ids: Vec<i64> = found.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![newer, older]);

    for bad in ["12345", "98765432101", "98765abcde", ""] {
        let err = state.attendance_api.find_members_by_mobile(bad).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)), "mobile {:?}", bad);
    }
}
