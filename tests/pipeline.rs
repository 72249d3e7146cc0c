use insight_engine::infrastructure::storage::OutputLayout;
use insight_engine::{
    ChartId, CsvParser, InsightPipeline, JsonSeriesRenderer, Metric, MetricKey, PipelineConfig,
    SchemaNormalizer, SourceEncoding, Value,
};
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

const TRACKS: &str = "\
 track_name ,artists,release_date,duration_ms,popularity,danceability,energy,valence
Intro,The xx,2009-08-17,127000,60,0.5,0.2,0.1
Intro,The xx,2009-08-17,127000,60,0.5,0.2,0.1
Crystalised,The xx,2009-08-17,201000,55,0.7,0.6,0.4
Midnight City,M83,2011,243000,80,0.5,0.7,0.3
Teardrop,Massive Attack,1998-04-20,330000,70,0.6,0.4,0.2
Angel,Massive Attack,unknown,380000,,0.4,0.3,0.1
";

fn workspace() -> PathBuf {
    let root = std::env::temp_dir().join(format!("insight_it_{}", Uuid::new_v4()));
    fs::create_dir_all(&root).unwrap();
    root
}

fn cp1252(text: &str) -> Vec<u8> {
    encoding_rs::WINDOWS_1252.encode(text).0.into_owned()
}

#[test]
fn test_full_run_produces_clean_table_metrics_and_charts() {
    let root = workspace();
    let input = root.join("spotify_tracks.csv");
    fs::write(&input, TRACKS).unwrap();

    let config = PipelineConfig {
        input_path: input,
        output_dir: root.join("output"),
        top_n: 2,
        ..Default::default()
    };
    let pipeline = InsightPipeline::new(config);
    let renderer = JsonSeriesRenderer::new(pipeline.layout().clone());
    let (report, analysis) = pipeline.run(&renderer).unwrap();

    assert_eq!(report.encoding, SourceEncoding::Utf8);
    assert_eq!(report.raw_rows, 6);
    assert_eq!(report.clean_rows, 5);

    let clean = CsvParser::new().load(&report.clean_path).unwrap().table;
    assert_eq!(
        clean.columns(),
        &[
            "track_name",
            "artist_name",
            "release_date",
            "duration_ms",
            "popularity",
            "danceability",
            "energy",
            "valence",
            "year",
            "duration_min",
        ]
    );

    let metrics = &analysis.metrics;
    assert_eq!(metrics.get(MetricKey::TotalTracks), Some(&Metric::Count(5)));
    assert_eq!(metrics.get(MetricKey::UniqueArtists), Some(&Metric::Count(3)));
    assert_eq!(
        metrics.get(MetricKey::YearsCovered),
        Some(&Metric::Range("1998 - 2011".to_string()))
    );
    assert_eq!(metrics.get(MetricKey::AvgPopularity), Some(&Metric::Number(66.25)));

    for chart in ChartId::ALL {
        let path = analysis.images.get(chart).unwrap();
        assert!(path.exists(), "{} artifact missing", chart);
    }

    let top: serde_json::Value = serde_json::from_slice(
        &fs::read(analysis.images.get(ChartId::TopArtists).unwrap()).unwrap(),
    )
    .unwrap();
    let labels: Vec<&str> = top["series"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["The xx", "Massive Attack"]);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_clean_table_is_stable_under_renormalization() {
    let root = workspace();
    let input = root.join("tracks.csv");
    fs::write(&input, TRACKS).unwrap();

    let config = PipelineConfig {
        input_path: input,
        output_dir: root.join("output"),
        ..Default::default()
    };
    let pipeline = InsightPipeline::new(config);
    let report = pipeline.preprocess().unwrap();

    let clean = CsvParser::new().load(&report.clean_path).unwrap().table;
    let again = SchemaNormalizer::new().normalize(clean.clone()).unwrap();
    assert_eq!(again, clean);

    let durations: Vec<Value> = clean.column("duration_min").unwrap().cloned().collect();
    let millis: Vec<Value> = clean.column("duration_ms").unwrap().cloned().collect();
    for (min, ms) in durations.iter().zip(&millis) {
        assert_eq!(min.as_f64(), ms.as_f64().map(|v| v / 60000.0));
    }

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_legacy_encoded_source_matches_utf8() {
    let root = workspace();
    let content = "track_name,artists,popularity\nCafé,Beyoncé,90\nNaïve Melody,Talking Heads,70\n";
    let utf8 = root.join("utf8.csv");
    let legacy = root.join("cp1252.csv");
    fs::write(&utf8, content).unwrap();
    fs::write(&legacy, cp1252(content)).unwrap();

    let reference = CsvParser::new().load(&utf8).unwrap();
    let loaded = CsvParser::new().load(&legacy).unwrap();

    assert_eq!(loaded.encoding, SourceEncoding::Cp1252);
    assert_eq!(loaded.table, reference.table);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_columns_absent_yield_absence_not_errors() {
    let root = workspace();
    let input = root.join("sparse.csv");
    fs::write(&input, "title,plays\nA,1\nB,2\n").unwrap();

    let config = PipelineConfig {
        input_path: input,
        output_dir: root.join("output"),
        ..Default::default()
    };
    let pipeline = InsightPipeline::new(config);
    let layout: &OutputLayout = pipeline.layout();
    let renderer = JsonSeriesRenderer::new(layout.clone());
    let (_, analysis) = pipeline.run(&renderer).unwrap();

    assert_eq!(analysis.metrics.get(MetricKey::TotalTracks), Some(&Metric::Count(2)));
    assert_eq!(
        analysis.metrics.get(MetricKey::UniqueArtists),
        Some(&Metric::NotApplicable)
    );
    assert_eq!(analysis.images.resolved().count(), 0);
    assert!(!layout.chart_path(ChartId::TopArtists).exists());

    fs::remove_dir_all(&root).ok();
}
