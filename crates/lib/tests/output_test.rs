//! # Output Materializer Tests
//!
//! Writes conversion artifacts into a temporary results directory and reads
//! them back, including the zipped dbt project.

use std::{fs, io::Read};
use talend2dbt::output::{
    materialize_artifacts, write_commented_sql, write_conversion_artifacts, zip_directory,
};
use talend2dbt_test_utils::fixtures::TWO_MODEL_COMPLETION;
use tempfile::tempdir;
use zip::ZipArchive;

#[test]
fn test_conversion_artifacts_are_written() {
    let dir = tempdir().unwrap();
    let names =
        write_conversion_artifacts(dir.path(), "job-1", "orders_load", TWO_MODEL_COMPLETION)
            .unwrap();

    assert_eq!(names.raw_txt, "job-1_llm_raw_output.txt");
    assert_eq!(names.sql, "job-1_orders_load.sql");
    assert_eq!(names.dbt_project_zip, "job-1_orders_load_dbt_project.zip");

    let raw = fs::read_to_string(dir.path().join(&names.raw_txt)).unwrap();
    assert_eq!(raw, TWO_MODEL_COMPLETION);

    let sql = fs::read_to_string(dir.path().join(&names.sql)).unwrap();
    assert!(sql.starts_with("-- dbt model #1\nselect order_id, amount\n"));
    assert!(sql.contains("\n\n-- dbt model #2\nselect o.order_id, c.customer_name\n"));
    assert!(!sql.contains("```"));

    let project_dir = dir.path().join("dbt_project_job-1");
    assert!(project_dir.join("dbt_project.yml").is_file());
    assert_eq!(
        fs::read_to_string(project_dir.join("models/orders_load.sql")).unwrap(),
        sql
    );
}

#[test]
fn test_project_archive_contents() {
    let dir = tempdir().unwrap();
    let names =
        write_conversion_artifacts(dir.path(), "job-2", "orders_load", TWO_MODEL_COMPLETION)
            .unwrap();

    let file = fs::File::open(dir.path().join(&names.dbt_project_zip)).unwrap();
    let mut archive = ZipArchive::new(file).unwrap();

    let mut entries: Vec<String> = archive.file_names().map(str::to_string).collect();
    entries.sort();
    assert_eq!(entries, vec!["dbt_project.yml", "models/orders_load.sql"]);

    let mut project_yml = String::new();
    archive
        .by_name("dbt_project.yml")
        .unwrap()
        .read_to_string(&mut project_yml)
        .unwrap();
    let project: serde_yaml::Value = serde_yaml::from_str(&project_yml).unwrap();
    assert_eq!(project["name"].as_str(), Some("talend_converted_project"));
    assert_eq!(project["version"].as_str(), Some("1.0.0"));
    assert_eq!(project["config-version"].as_u64(), Some(2));
    assert_eq!(project["profile"].as_str(), Some("default"));
    assert_eq!(project["model-paths"][0].as_str(), Some("models"));

    let mut model = String::new();
    archive
        .by_name("models/orders_load.sql")
        .unwrap()
        .read_to_string(&mut model)
        .unwrap();
    assert!(model.contains("-- dbt model #2"));
}

#[test]
fn test_unfenced_completion_becomes_single_model() {
    let dir = tempdir().unwrap();
    let names =
        write_conversion_artifacts(dir.path(), "job-3", "raw", "select * from orders").unwrap();

    let sql = fs::read_to_string(dir.path().join(names.sql)).unwrap();
    assert_eq!(sql, "-- dbt model #1\nselect * from orders\n\n");
}

#[test]
fn test_zip_directory_uses_relative_paths() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("project");
    fs::create_dir_all(source.join("models/staging")).unwrap();
    fs::write(source.join("models/staging/stg_orders.sql"), "select 1").unwrap();
    fs::write(source.join("README.md"), "readme").unwrap();

    let zip_path = dir.path().join("project.zip");
    zip_directory(&source, &zip_path).unwrap();

    let archive = ZipArchive::new(fs::File::open(zip_path).unwrap()).unwrap();
    let mut entries: Vec<String> = archive.file_names().map(str::to_string).collect();
    entries.sort();
    assert_eq!(entries, vec!["README.md", "models/staging/stg_orders.sql"]);
}

#[test]
fn test_commented_sql_is_written() {
    let dir = tempdir().unwrap();
    let name = write_commented_sql(dir.path(), "job-4", "-- orders\nselect 1").unwrap();
    assert_eq!(name, "job-4_commented.sql");
    assert_eq!(
        fs::read_to_string(dir.path().join(name)).unwrap(),
        "-- orders\nselect 1"
    );
}

#[tokio::test]
async fn test_materialize_artifacts_creates_results_dir() {
    let dir = tempdir().unwrap();
    let results_dir = dir.path().join("results");

    let names = materialize_artifacts(
        results_dir.clone(),
        "job-5".to_string(),
        "orders_load".to_string(),
        TWO_MODEL_COMPLETION.to_string(),
    )
    .await
    .unwrap();

    assert!(results_dir.join(names.raw_txt).is_file());
    assert!(results_dir.join(names.sql).is_file());
    assert!(results_dir.join(names.dbt_project_zip).is_file());
}
