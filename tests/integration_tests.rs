use async_trait::async_trait;
use coadd_harvester::fetch::CoaddSource;
use coadd_harvester::models::{CoaddTable, Column, ColumnData};
use coadd_harvester::processors::Pipeline;
use coadd_harvester::readers::CoaddReader;
use coadd_harvester::writers::{FitsTableWriter, HduKind};
use coadd_harvester::{PipelineConfig, ProcessingError};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Bytes of a spectrum-like FITS file with a COADD extension of `rows` rows
fn spectrum_bytes(dir: &Path, name: &str, rows: usize, with_model: bool) -> Vec<u8> {
    let mut columns = vec![
        Column::new(
            "flux",
            ColumnData::Float((0..rows).map(|i| i as f32).collect()),
        ),
        Column::new(
            "loglam",
            ColumnData::Float((0..rows).map(|i| 3.5 + i as f32 * 0.0001).collect()),
        ),
    ];
    if with_model {
        columns.push(Column::new(
            "model",
            ColumnData::Float((0..rows).map(|i| i as f32 * 0.5).collect()),
        ));
    }

    let table = CoaddTable::new(columns).expect("valid table");
    let file = dir.join(name);
    FitsTableWriter::new("COADD")
        .write(&table, &file)
        .expect("write fixture");
    std::fs::read(&file).expect("read fixture")
}

async fn mount(server: &MockServer, route: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

fn config_for(dir: &Path, urls: &[String]) -> PipelineConfig {
    let input = dir.join("skyserver-dump.csv");
    let mut contents = String::from("specobjid,url\n");
    for (i, url) in urls.iter().enumerate() {
        contents.push_str(&format!("{},{}\n", i, url));
    }
    std::fs::write(&input, contents).expect("write input");

    PipelineConfig {
        input,
        csv_output: dir.join("final_output.csv"),
        fits_output: dir.join("final_output.fits"),
        timeout_secs: 5,
        ..PipelineConfig::default()
    }
}

#[tokio::test]
async fn test_partial_failure_scenario() {
    let fixtures = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let server = MockServer::start().await;

    mount(&server, "/a.fits", spectrum_bytes(fixtures.path(), "a.fits", 10, true)).await;
    mount(&server, "/c.fits", spectrum_bytes(fixtures.path(), "c.fits", 5, true)).await;
    Mock::given(method("GET"))
        .and(path("/b.fits"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let urls: Vec<String> = ["a", "b", "c"]
        .iter()
        .map(|n| format!("{}/{}.fits", server.uri(), n))
        .collect();
    let config = config_for(work.path(), &urls);

    let outcome = Pipeline::new(config.clone())
        .unwrap()
        .run(true)
        .await
        .unwrap();

    assert_eq!(outcome.attempted, 3);
    assert_eq!(outcome.extracted, 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].url, urls[1]);
    assert_eq!(outcome.rows, 15);
    assert_eq!(outcome.columns, vec!["flux", "model"]);

    let csv = std::fs::read_to_string(&config.csv_output).unwrap();
    assert_eq!(csv.lines().count(), 15);
    assert_eq!(csv.lines().next(), Some("0.0,0.0"));

    let combined = CoaddReader::new().read_path(&config.fits_output).unwrap();
    assert_eq!(combined.num_rows(), 15);

    let summary = outcome.verification.expect("inspection succeeds");
    let coadd = summary.hdu("COADD").unwrap();
    assert_eq!(coadd.kind, HduKind::BinTable);
    assert_eq!(coadd.dimensions, vec![15, 2]);
}

#[tokio::test]
async fn test_rerun_overwrites_with_same_content() {
    let fixtures = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let server = MockServer::start().await;

    let mut urls = Vec::new();
    for (i, rows) in [4usize, 7, 2].iter().enumerate() {
        let name = format!("s{}.fits", i);
        mount(
            &server,
            &format!("/{}", name),
            spectrum_bytes(fixtures.path(), &name, *rows, true),
        )
        .await;
        urls.push(format!("{}/{}", server.uri(), name));
    }
    let config = config_for(work.path(), &urls);
    let pipeline = Pipeline::new(config.clone()).unwrap();

    pipeline.run(true).await.unwrap();
    let first_csv = std::fs::read(&config.csv_output).unwrap();
    let first_table = CoaddReader::new().read_path(&config.fits_output).unwrap();

    pipeline.run(true).await.unwrap();
    let second_csv = std::fs::read(&config.csv_output).unwrap();
    let second_table = CoaddReader::new().read_path(&config.fits_output).unwrap();

    assert_eq!(first_csv, second_csv);
    assert_eq!(first_table, second_table);
    assert_eq!(second_table.num_rows(), 13);
}

#[tokio::test]
async fn test_missing_model_column_is_dropped() {
    let fixtures = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let server = MockServer::start().await;

    mount(&server, "/good.fits", spectrum_bytes(fixtures.path(), "good.fits", 6, true)).await;
    mount(&server, "/bare.fits", spectrum_bytes(fixtures.path(), "bare.fits", 9, false)).await;

    let urls = vec![
        format!("{}/good.fits", server.uri()),
        format!("{}/bare.fits", server.uri()),
    ];
    let config = config_for(work.path(), &urls);

    let outcome = Pipeline::new(config).unwrap().run(true).await.unwrap();

    assert_eq!(outcome.rows, 6);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].url, urls[1]);
    assert!(outcome.failures[0].reason.contains("model"));
}

#[tokio::test]
async fn test_short_input_row_fails_only_that_item() {
    let fixtures = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let server = MockServer::start().await;

    mount(&server, "/a.fits", spectrum_bytes(fixtures.path(), "a.fits", 3, true)).await;
    mount(&server, "/c.fits", spectrum_bytes(fixtures.path(), "c.fits", 4, true)).await;

    let mut config = config_for(work.path(), &[]);
    let contents = format!(
        "specobjid,url\n0,{uri}/a.fits\n1\n2,{uri}/c.fits\n",
        uri = server.uri()
    );
    std::fs::write(&config.input, contents).unwrap();
    config.csv_header = true;

    let outcome = Pipeline::new(config.clone())
        .unwrap()
        .run(true)
        .await
        .unwrap();

    assert_eq!(outcome.attempted, 3);
    assert_eq!(outcome.rows, 7);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].index, 1);
    assert_eq!(outcome.failures[0].url, "");

    let csv = std::fs::read_to_string(&config.csv_output).unwrap();
    assert_eq!(csv.lines().next(), Some("flux,model"));
    assert_eq!(csv.lines().count(), 8);
}

/// Answers each URL with a one-row table holding the number in its path,
/// finishing later URLs first
struct CountdownSource;

#[async_trait]
impl CoaddSource for CountdownSource {
    async fn extract(&self, url: &str) -> coadd_harvester::Result<CoaddTable> {
        let n: u64 = url
            .trim_start_matches("mem://")
            .parse()
            .map_err(|_| ProcessingError::MissingExtension("COADD".to_string()))?;
        tokio::time::sleep(Duration::from_millis(40 * (4 - n))).await;
        CoaddTable::new(vec![
            Column::new("flux", ColumnData::Double(vec![n as f64])),
            Column::new("and_mask", ColumnData::Int(vec![n as i32])),
        ])
    }
}

#[tokio::test]
async fn test_custom_source_rows_follow_input_order() {
    let work = TempDir::new().unwrap();
    let urls: Vec<String> = (1..=3).map(|n| format!("mem://{}", n)).collect();
    let mut config = config_for(work.path(), &urls);
    config.columns = vec!["flux".to_string(), "and_mask".to_string()];

    let pipeline = Pipeline::with_source(config.clone(), Arc::new(CountdownSource)).unwrap();
    let outcome = pipeline.run(true).await.unwrap();

    assert_eq!(outcome.rows, 3);
    let csv = std::fs::read_to_string(&config.csv_output).unwrap();
    assert_eq!(csv, "1.0,1\n2.0,2\n3.0,3\n");

    let written = CoaddReader::new()
        .with_columns(&config.columns)
        .read_path(&config.fits_output)
        .unwrap();
    assert_eq!(
        written.columns()[1].data,
        ColumnData::Int(vec![1, 2, 3])
    );
}

#[tokio::test]
async fn test_header_only_input_is_empty_result() {
    let work = TempDir::new().unwrap();
    let config = config_for(work.path(), &[]);

    let result = Pipeline::new(config.clone()).unwrap().run(true).await;

    assert!(matches!(result, Err(ProcessingError::EmptyResultSet)));
    assert!(!config.csv_output.exists());
    assert!(!config.fits_output.exists());
}

#[tokio::test]
async fn test_missing_input_file_is_fatal() {
    let work = TempDir::new().unwrap();
    let config = PipelineConfig {
        input: work.path().join("nope.csv"),
        csv_output: work.path().join("out.csv"),
        fits_output: work.path().join("out.fits"),
        ..PipelineConfig::default()
    };

    let result = Pipeline::new(config).unwrap().run(true).await;

    assert!(matches!(result, Err(ProcessingError::Io(_))));
}

#[test]
fn test_invalid_config_rejected_before_run() {
    let config = PipelineConfig {
        max_workers: 0,
        ..PipelineConfig::default()
    };

    assert!(Pipeline::new(config).is_err());
}
