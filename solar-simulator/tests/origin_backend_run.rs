use chrono::{TimeZone, Utc};
use meter_client::Device;
use mockito::{Matcher, Server};
use serde_json::json;
use solar_simulator::{
    config::{OriginBackendConfig, StoreConfig},
    dataset::parse_row,
    runner,
    store::ConfiguredStore,
    PersistOutcome, SeasonalDataset, WorkerSettings,
};

fn store_config(base_url: String) -> StoreConfig {
    StoreConfig::OriginBackend(OriginBackendConfig {
        base_url,
        username: "admin@mailinator.com".to_string(),
        password: "test".to_string(),
        timeout_secs: 5,
    })
}

fn device() -> Device {
    Device {
        id: 11,
        max_capacity: 100.0,
        timezone: chrono_tz::UTC,
    }
}

fn dataset() -> SeasonalDataset {
    SeasonalDataset::new(vec![parse_row(1, "14.06.2015 00:10", "0.5").unwrap()])
}

#[tokio::test]
async fn worker_seeds_from_backend_and_submits_one_batch() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/auth/login")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({ "accessToken": "t0k3n" }).to_string())
        .create_async()
        .await;
    let seed = server
        .mock("GET", "/device/11/smartMeterReading")
        .match_header("authorization", "Bearer t0k3n")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "meterReading": "1000", "timestamp": 1_718_236_800 }]).to_string())
        .create_async()
        .await;
    let save = server
        .mock("PUT", "/device/11/smartMeterReading")
        .match_header("authorization", "Bearer t0k3n")
        .match_body(Matcher::Json(json!([
            { "meterReading": "1050", "timestamp": 1_718_323_200 }
        ])))
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let cfg = store_config(server.url());
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let runs = runner::run_devices(&[device()], &dataset(), WorkerSettings::default(), now, |d| {
        ConfiguredStore::connect(&cfg, d.id)
    })
    .await;

    let report = runs.into_iter().next().unwrap().result.unwrap();
    assert_eq!(report.seed, 1000);
    assert_eq!(report.final_meter_reading, 1050);
    assert_eq!(report.status_message(), "[Device ID: 11]: Saved 1 smart meter reads");

    login.assert_async().await;
    seed.assert_async().await;
    save.assert_async().await;
}

#[tokio::test]
async fn rejected_batch_still_completes_with_failure_message() {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/auth/login")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({ "accessToken": "t0k3n" }).to_string())
        .create_async()
        .await;
    let _seed = server
        .mock("GET", "/device/11/smartMeterReading")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;
    let save = server
        .mock("PUT", "/device/11/smartMeterReading")
        .with_status(400)
        .with_body(r#"{"statusCode":400,"message":"Invalid reading"}"#)
        .expect(1)
        .create_async()
        .await;

    let cfg = store_config(server.url());
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let runs = runner::run_devices(&[device()], &dataset(), WorkerSettings::default(), now, |d| {
        ConfiguredStore::connect(&cfg, d.id)
    })
    .await;

    let report = runs.into_iter().next().unwrap().result.unwrap();
    match &report.outcome {
        PersistOutcome::Failed(failure) => {
            assert_eq!(failure.error.http_response_body(), Some(r#"{"statusCode":400,"message":"Invalid reading"}"#));
        }
        other => panic!("expected failed outcome, got {other:?}"),
    }
    assert_eq!(report.status_message(), "[Device ID: 11]: Failed to save 1 smart meter reads");
    save.assert_async().await;
}

#[tokio::test]
async fn unreachable_seed_aborts_device() {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/auth/login")
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({ "accessToken": "t0k3n" }).to_string())
        .create_async()
        .await;
    let _seed = server
        .mock("GET", "/device/11/smartMeterReading")
        .with_status(503)
        .create_async()
        .await;
    let save = server
        .mock("PUT", "/device/11/smartMeterReading")
        .expect(0)
        .create_async()
        .await;

    let cfg = store_config(server.url());
    let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    let runs = runner::run_devices(&[device()], &dataset(), WorkerSettings::default(), now, |d| {
        ConfiguredStore::connect(&cfg, d.id)
    })
    .await;

    assert!(runs[0].is_aborted());
    assert_eq!(runner::log_runs(&runs), 1);
    save.assert_async().await;
}
