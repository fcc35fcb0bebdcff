//! Integration tests for the airmap pipeline and CLI

use airmap::{
    AirMapError, AirQualityReading, AirQualitySource, AssessmentRequest, HtmlMapRenderer,
    RiskCategory, UserProfile, WaqiClient, pipeline,
};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::process::Command;
use std::thread;

/// Stands in for the WAQI API
struct StubSource {
    reading: Option<AirQualityReading>,
}

impl AirQualitySource for StubSource {
    fn fetch(&self, location: &str) -> Option<AirQualityReading> {
        self.reading.clone().map(|mut reading| {
            reading.location_name = location.to_string();
            reading
        })
    }
}

fn request(age: i32, is_pregnant: bool, nationality: &str) -> AssessmentRequest {
    AssessmentRequest {
        location: "Bangkok".to_string(),
        profile: UserProfile::new(age, is_pregnant, nationality),
    }
}

/// Serve a single HTTP 200 response with the given JSON body, returning the base URL
fn serve_once(body: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            if header == "\r\n" || header.is_empty() {
                break;
            }
        }

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
        .unwrap();
        stream.flush().unwrap();
        request_line
    });

    (base_url, handle)
}

fn airmap() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_airmap"));
    command
        .env_remove("WAQI_TOKEN")
        .env_remove("AIRMAP_WAQI__TOKEN")
        .env_remove("AIRMAP_WAQI__API_BASE_URL")
        .env_remove("RUST_LOG")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy");
    command
}

/// Senior Japanese visitor at moderate AQI ends up in the top category
#[test]
fn test_senior_japanese_moderate_aqi_renders_very_high() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map").join("air_quality_map.html");
    let source = StubSource {
        reading: Some(AirQualityReading::new(String::new(), 75, 13.75, 100.5)),
    };
    let renderer = HtmlMapRenderer::new(&path, "https://tiles.waqi.info", "test-token");
    let mut out = Vec::new();

    let report = pipeline::run(&source, &renderer, &request(65, false, "Japanese"), &mut out)
        .expect("pipeline should succeed");

    assert_eq!(report.risk, RiskCategory::VeryHigh);
    assert_eq!(report.map_path, path);

    let console = String::from_utf8(out).unwrap();
    assert!(console.contains("Bangkok AQI: 75"));
    assert!(console.contains("リスク評価: 非常に高リスク"));
    assert!(console.contains("Map generated:"));

    let html = fs::read_to_string(&path).unwrap();
    assert!(html.contains("tiles/{z}/{x}/{y}.png?token=test-token"));
    assert!(html.contains("color: yellow"));
    assert!(html.contains("非常に高リスク"));
}

/// Thai resident at good AQI stays in the lowest category
#[test]
fn test_thai_good_aqi_renders_low() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("air_quality_map.html");
    let source = StubSource {
        reading: Some(AirQualityReading::new(String::new(), 30, 13.75, 100.5)),
    };
    let renderer = HtmlMapRenderer::new(&path, "https://tiles.waqi.info", "t");
    let mut out = Vec::new();

    let report =
        pipeline::run(&source, &renderer, &request(30, false, "Thai"), &mut out).unwrap();

    assert_eq!(report.risk, RiskCategory::Low);
    assert!(fs::read_to_string(&path).unwrap().contains("color: green"));
}

/// A failed fetch neither classifies nor touches the map file
#[test]
fn test_fetch_failure_leaves_map_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map").join("air_quality_map.html");
    let source = StubSource { reading: None };
    let renderer = HtmlMapRenderer::new(&path, "https://tiles.waqi.info", "t");
    let mut out = Vec::new();

    let err = pipeline::run(&source, &renderer, &request(65, false, "Japanese"), &mut out)
        .unwrap_err();

    assert!(matches!(err, AirMapError::FetchFailure { .. }));
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Failed to retrieve air quality data.\n"
    );
    assert!(!path.exists());
    assert!(!path.parent().unwrap().exists());
}

/// A service-reported error status from the real client ends the run before rendering
#[test]
fn test_error_status_from_service_is_fetch_failure() {
    let (base_url, server) = serve_once(r#"{"status":"error","data":"Unknown station"}"#);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map").join("air_quality_map.html");

    let client = WaqiClient::new(base_url.as_str(), "test-token").unwrap();
    let renderer = HtmlMapRenderer::new(&path, "https://tiles.waqi.info", "test-token");
    let mut out = Vec::new();

    let err = pipeline::run(&client, &renderer, &request(65, false, "Japanese"), &mut out)
        .unwrap_err();

    assert!(matches!(err, AirMapError::FetchFailure { .. }));
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Failed to retrieve air quality data.\n"
    );
    assert!(!path.exists());

    let request_line = server.join().unwrap();
    assert!(request_line.starts_with("GET /feed/Bangkok/?token=test-token "));
}

/// An ok status from the real client is classified and rendered
#[test]
fn test_ok_status_from_service_renders_map() {
    let (base_url, server) = serve_once(
        r#"{"status":"ok","data":{"aqi":30,"city":{"geo":[13.75,100.5],"name":"Bangkok"}}}"#,
    );
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("air_quality_map.html");

    let client = WaqiClient::new(base_url.as_str(), "test-token").unwrap();
    let renderer = HtmlMapRenderer::new(&path, "https://tiles.waqi.info", "test-token");
    let mut out = Vec::new();

    let report =
        pipeline::run(&client, &renderer, &request(30, false, "Thai"), &mut out).unwrap();
    server.join().unwrap();

    assert_eq!(report.risk, RiskCategory::Low);
    assert_eq!(report.reading.station_name.as_deref(), Some("Bangkok"));
    assert!(fs::read_to_string(&path).unwrap().contains("観測所: Bangkok"));
}

/// Existing maps survive a failed run unchanged
#[test]
fn test_fetch_failure_keeps_previous_map() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("air_quality_map.html");
    fs::write(&path, "previous").unwrap();

    let source = StubSource { reading: None };
    let renderer = HtmlMapRenderer::new(&path, "https://tiles.waqi.info", "t");
    let mut out = Vec::new();
    assert!(pipeline::run(&source, &renderer, &request(30, false, "Thai"), &mut out).is_err());

    assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
}

/// The CLI refuses to run without a token
#[test]
fn test_cli_requires_token() {
    let dir = tempfile::tempdir().unwrap();
    let output = airmap()
        .args(["--config", dir.path().join("missing.toml").to_str().unwrap()])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No WAQI token configured"));
}

/// A token passed on the command line goes through the same checks as a configured one
#[test]
fn test_cli_rejects_token_with_whitespace() {
    let dir = tempfile::tempdir().unwrap();
    let output = airmap()
        .args([
            "--config",
            dir.path().join("missing.toml").to_str().unwrap(),
            "--token",
            "bad token",
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must not contain whitespace"));
}

/// `--pregnant false` overrides a config file that says otherwise
#[test]
fn test_cli_pregnant_flag_overrides_config() {
    let (base_url, server) =
        serve_once(r#"{"status":"ok","data":{"aqi":30,"city":{"geo":[13.75,100.5]}}}"#);
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "[waqi]\napi_base_url = \"{base_url}\"\n\n[defaults]\nage = 30\npregnant = true\nnationality = \"German\"\n"
        ),
    )
    .unwrap();
    let map_path = dir.path().join("map.html");

    let output = airmap()
        .args([
            "--config",
            config_path.to_str().unwrap(),
            "--token",
            "test-token",
            "--output",
            map_path.to_str().unwrap(),
            "--pregnant",
            "false",
        ])
        .output()
        .expect("Failed to execute command");
    server.join().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("リスク評価: 低リスク"), "got: {stdout}");
}

/// An unreachable API maps to the fetch failure exit code
#[test]
fn test_cli_fetch_failure_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let map_path = dir.path().join("map.html");
    let output = airmap()
        .env("AIRMAP_WAQI__API_BASE_URL", "http://127.0.0.1:9")
        .args([
            "--config",
            dir.path().join("missing.toml").to_str().unwrap(),
            "--token",
            "test-token",
            "--output",
            map_path.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Failed to retrieve air quality data."));
    assert!(!map_path.exists());
}

/// Help text describes the tool
#[test]
fn test_cli_help() {
    let output = airmap()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("air quality risk"));
    assert!(stdout.contains("--nationality"));
}
