// ==========================================
// 命令行分发集成测试
// ==========================================
// 通过 AppState + dispatch 走完整调用链（不启动子进程）
// ==========================================


use siglab_aviario::app::{dispatch, wants_help, AppState, CliArgs};
use test_helpers::*;

fn args(line: &[&str]) -> CliArgs {
    CliArgs::parse(line.iter().map(|s| s.to_string()))
}

fn app_state() -> (tempfile::NamedTempFile, AppState) {
    let (temp_file, db_path) = create_test_db().expect("无法创建测试数据库");
    let state = AppState::new(db_path).expect("无法创建AppState");
    (temp_file, state)
}

#[test]
fn test_wants_help() {
    assert!(wants_help(&args(&[])));
    assert!(wants_help(&args(&["help"])));
    assert!(wants_help(&args(&["production", "--help"])));
    assert!(!wants_help(&args(&["production", "list"])));
}

#[tokio::test]
async fn test_config_set_and_get() {
    let (_temp, state) = app_state();

    let out = dispatch(&state, &args(&["config", "set", "sync.debounce_ms", "500"]))
        .await
        .expect("设置配置失败");
    let entry: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(entry["value"], "500");
    assert_eq!(entry["source"], "database");

    let out = dispatch(&state, &args(&["config", "get", "sync.debounce_ms"]))
        .await
        .unwrap();
    assert!(out.contains("\"500\""));

    let err = dispatch(&state, &args(&["config", "set", "sync.merge_strategy", "latest"]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CONFIG_ERROR");
}

#[tokio::test]
async fn test_batch_and_production_commands() {
    let (_temp, state) = app_state();

    let batch_json = r#"{"date":"2024-01-01","aviaryId":"2","batchId":"L-22","ageWeeks":25,
        "weight":1600,"uniformity":90,"feathering":"Bom"}"#;
    dispatch(&state, &args(&["batch", "add", "--json", batch_json]))
        .await
        .expect("登记批次失败");

    let form_json = r#"{"date":"2024-01-05","aviaryId":"2","liveBirds":20,"cleanEggs":10,
        "dirtyEggs":5,"crackedEggs":2,"floorEggs":1,"eggWeightAvg":62,"birdWeightAvg":1800,
        "mortality":0}"#;
    let out = dispatch(&state, &args(&["production", "add", "--json", form_json]))
        .await
        .expect("保存日产记录失败");
    let record: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(record["batchId"], "L-22");
    assert_eq!(record["metrics"]["totalEggs"], 18);

    let out = dispatch(
        &state,
        &args(&["production", "list", "--aviary", "2", "--today", "2024-01-31"]),
    )
    .await
    .unwrap();
    let list: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    assert_eq!(list.len(), 1);

    let out = dispatch(&state, &args(&["batch", "list"])).await.unwrap();
    let groups: Vec<serde_json::Value> = serde_json::from_str(&out).unwrap();
    assert_eq!(groups.len(), 4);
    assert_eq!(groups[1]["currentBirds"], 20);

    let svg = dispatch(
        &state,
        &args(&["dashboard", "chart", "rate", "--today", "2024-01-31"]),
    )
    .await
    .unwrap();
    assert!(svg.starts_with("<svg"));
}

#[tokio::test]
async fn test_production_add_without_batch() {
    let (_temp, state) = app_state();
    let form_json = r#"{"date":"2024-01-05","aviaryId":"1","liveBirds":20,"cleanEggs":10,
        "dirtyEggs":0,"crackedEggs":0,"floorEggs":0,"eggWeightAvg":0,"birdWeightAvg":0,
        "mortality":0}"#;

    let err = dispatch(&state, &args(&["production", "add", "--json", form_json]))
        .await
        .unwrap_err();
    assert_eq!(err.to_response().code, "BATCH_NOT_REGISTERED");
}

#[tokio::test]
async fn test_invalid_input() {
    let (_temp, state) = app_state();

    let err = dispatch(&state, &args(&["fly"])).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");

    let err = dispatch(&state, &args(&["production", "list", "--month", "13"]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");

    let err = dispatch(&state, &args(&["production", "add", "--json", "{"]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
}

#[tokio::test]
async fn test_sync_commands_local_provider() {
    let (_temp, state) = app_state();

    let out = dispatch(&state, &args(&["sync", "key", "fazenda-norte"]))
        .await
        .unwrap();
    assert!(out.contains("FAZENDA-NORTE"));

    let out = dispatch(&state, &args(&["sync", "pull"])).await.unwrap();
    let outcome: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(outcome["applied"], false);

    dispatch(&state, &args(&["sync", "push"])).await.expect("推送失败");
    let out = dispatch(&state, &args(&["sync", "status"])).await.unwrap();
    let status: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(status["provider"], "local");
    assert_eq!(status["status"], "success");
}
