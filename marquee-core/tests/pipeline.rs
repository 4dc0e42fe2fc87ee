//! End-to-end pipeline tests over a synthetic dataset.

use std::fs;
use std::path::Path;

use marquee_core::persist::{read_movie_list, read_similarity};
use marquee_core::{Pipeline, PipelineConfig, PipelineError};
use tempfile::TempDir;

const MOVIES_CSV: &str = r#"budget,genres,id,keywords,overview,title
237000000,"[{""id"": 28, ""name"": ""Action""}, {""id"": 878, ""name"": ""Science Fiction""}]",19995,"[{""id"": 1463, ""name"": ""culture clash""}, {""id"": 3386, ""name"": ""space war""}]",A paraplegic marine is dispatched to the moon Pandora.,Avatar
300000000,"[{""id"": 12, ""name"": ""Adventure""}]",285,"[{""id"": 270, ""name"": ""ocean""}, {""id"": 726, ""name"": ""drug abuse""}]",Captain Barbossa returns from the dead.,Pirates of the Caribbean
245000000,"[{""id"": 80, ""name"": ""Crime""}]",206647,"[{""id"": 470, ""name"": ""spy""}]",A cryptic message from the past sends James Bond on a mission.,Spectre
1000,"[{""id"": 18, ""name"": ""Drama""}]",1,"[]",,No Overview
"#;

const CREDITS_CSV: &str = r#"movie_id,title,cast,crew
19995,Avatar,"[{""cast_id"": 242, ""name"": ""Sam Worthington""}, {""cast_id"": 3, ""name"": ""Zoe Saldana""}, {""cast_id"": 25, ""name"": ""Sigourney Weaver""}, {""cast_id"": 4, ""name"": ""Stephen Lang""}]","[{""job"": ""Director"", ""name"": ""James Cameron""}, {""job"": ""Editor"", ""name"": ""Stephen E. Rivkin""}]"
285,Pirates of the Caribbean,"[{""cast_id"": 4, ""name"": ""Johnny Depp""}, {""cast_id"": 5, ""name"": ""Orlando Bloom""}]","[{""job"": ""Director"", ""name"": ""Gore Verbinski""}, {""job"": ""Screenplay"", ""name"": ""Ted Elliott""}]"
206647,Spectre,"[{""cast_id"": 1, ""name"": ""Daniel Craig""}]","[{""job"": ""Director"", ""name"": ""Sam Mendes""}]"
206647,Spectre,"[{""cast_id"": 1, ""name"": ""Daniel Craig""}]","[{""job"": ""Director"", ""name"": ""Sam Mendes""}]"
1,No Overview,"[]","[]"
"#;

fn write_project(root: &Path, movies: &str, credits: &str) -> PipelineConfig {
    let data_dir = root.join("data").join("raw");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("movies.csv"), movies).unwrap();
    fs::write(data_dir.join("credits.csv"), credits).unwrap();

    let config = format!(
        r#"
[data]
local_dir = "{root}/data"
data_folder = "raw"
movie_file_name = "movies.csv"
credit_file_name = "credits.csv"
merge_column_name = "title"

[params]
movie_id = "movie_id"
title = "title"
overview = "overview"
genres = "genres"
keywords = "keywords"
cast = "cast"
crew = "crew"
tags = "tags"

[artifacts]
directory = "{root}/artifacts"
"#,
        root = root.display()
    );
    let path = root.join("config.toml");
    fs::write(&path, config).unwrap();
    PipelineConfig::load(&path).unwrap()
}

#[test]
fn test_three_movie_run() {
    let dir = TempDir::new().unwrap();
    let config = write_project(dir.path(), MOVIES_CSV, CREDITS_CSV);
    let report = Pipeline::new(config).run().unwrap();

    assert_eq!(report.movies_loaded, 4);
    assert_eq!(report.credits_loaded, 5);
    assert_eq!(report.merged_rows, 5);
    assert_eq!(report.null_rows_dropped, 1);
    assert_eq!(report.duplicate_rows_dropped, 1);
    assert_eq!(report.movies, 3);
    assert_eq!(report.similarity_size, 3);
    assert!(report.report_path.exists());

    let list = read_movie_list(&report.movie_list_path).unwrap();
    assert_eq!(list.columns, ["movie_id", "title", "tags"]);
    assert_eq!(list.len(), 3);
    let ids: Vec<i64> = list.data.iter().map(|row| row.0).collect();
    assert_eq!(ids, vec![19995, 285, 206647]);

    let avatar_tags = &list.data[0].2;
    let tokens: Vec<&str> = avatar_tags.split(' ').collect();
    assert_eq!(tokens[0], "action");
    assert!(tokens.contains(&"cultureclash"));
    assert!(tokens.contains(&"samworthington"));
    assert!(tokens.contains(&"jamescameron"));
    assert!(!avatar_tags.contains("stephenlang"));
    assert!(!avatar_tags.contains("rivkin"));

    let sim = read_similarity(&report.similarity_path).unwrap();
    assert_eq!(sim.size(), 3);
    for i in 0..3 {
        assert_eq!(sim.get(i, i), Some(1.0));
        for j in 0..3 {
            assert_eq!(sim.get(i, j), sim.get(j, i));
            assert!(sim.get(i, j).unwrap() <= 1.0);
        }
    }
}

#[test]
fn test_failed_report_write_leaves_no_artifacts() {
    let dir = TempDir::new().unwrap();
    let mut config = write_project(dir.path(), MOVIES_CSV, CREDITS_CSV);
    config.artifacts.report = "missing/report.json".to_string();
    let artifacts = config.artifacts_dir();

    let err = Pipeline::new(config).run().unwrap_err();
    assert!(matches!(err, PipelineError::PersistError { .. }));
    assert_eq!(err.stage(), "persist");

    let leftovers: Vec<_> = fs::read_dir(&artifacts).unwrap().collect();
    assert!(leftovers.is_empty(), "unexpected files: {:?}", leftovers);
}

#[test]
fn test_missing_column_aborts() {
    let dir = TempDir::new().unwrap();
    let movies = MOVIES_CSV.replacen("keywords", "tagline", 1);
    let config = write_project(dir.path(), &movies, CREDITS_CSV);
    let artifacts = config.artifacts_dir();

    let err = Pipeline::new(config).run().unwrap_err();
    assert!(matches!(err, PipelineError::SchemaError { .. }));
    assert!(err.to_string().contains("keywords"));
    assert!(!artifacts.exists());
}

#[test]
fn test_bad_encoding_aborts() {
    let dir = TempDir::new().unwrap();
    let credits = CREDITS_CSV.replace(
        r#""[{""cast_id"": 1, ""name"": ""Daniel Craig""}]""#,
        "not-a-list",
    );
    let config = write_project(dir.path(), MOVIES_CSV, &credits);

    let err = Pipeline::new(config).run().unwrap_err();
    match err {
        PipelineError::EncodingParseError { column, .. } => assert_eq!(column, "cast"),
        other => panic!("unexpected error: {other}"),
    }
}
