// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::BTreeMap;
use tempfile::tempdir;
use yare::parameterized;

const TEMPLATE: &str = "\
# decoder template
[input-factors]
0

[feature]
PhraseDictionaryCompact path=${ENGINE_PATH}/models/phrase-table
LM0 path=${ENGINE_PATH}/models/lm

[weight]
LM0= 0.5
PhraseDictionaryCompact0= 0.2 0.2 0.2 0.2

[threads]
1
";

fn engine_at(root: &Path) -> Engine {
    Engine::new("default", root, "en".parse().unwrap(), "it".parse().unwrap())
}

fn write_template(root: &Path, content: &str) {
    let dir = root.join("models/decoder");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("decoder.ini"), content).unwrap();
}

#[test]
fn load_substitutes_engine_path() {
    let ini = DecoderIni::load(TEMPLATE, Path::new("/opt/engines/default"));

    let features = ini.section("feature").unwrap();
    assert_eq!(
        features[0],
        "PhraseDictionaryCompact path=/opt/engines/default/models/phrase-table"
    );
    assert_eq!(features[1], "LM0 path=/opt/engines/default/models/lm");
    assert!(!ini.to_string().contains(ENGINE_PATH_VAR));
}

#[test]
fn parse_keeps_preamble_and_section_order() {
    let ini = DecoderIni::parse(TEMPLATE);
    let rendered = ini.to_string();

    assert!(rendered.starts_with("# decoder template\n[input-factors]\n0\n"));
    let order: Vec<usize> = ["[input-factors]", "[feature]", "[weight]", "[threads]"]
        .iter()
        .map(|h| rendered.find(h).unwrap())
        .collect();
    assert!(order.windows(2).all(|w| w[0] < w[1]), "{rendered}");
}

#[test]
fn rendered_config_parses_back_to_the_same_sections() {
    let ini = DecoderIni::parse(TEMPLATE);
    assert_eq!(DecoderIni::parse(&ini.to_string()), ini);
}

#[test]
fn set_weights_replaces_template_weights() {
    let mut ini = DecoderIni::parse(TEMPLATE);
    let weights: DecoderWeights = BTreeMap::from([
        ("Distortion0".to_string(), vec![0.3]),
        ("LM0".to_string(), vec![0.25, -1.5]),
    ]);

    ini.set_weights(&weights);

    assert_eq!(
        ini.section("weight").unwrap(),
        ["Distortion0= 0.3", "LM0= 0.25 -1.5"]
    );
}

#[parameterized(
    existing_section = { "[threads]\n1\n", "[threads]\n6\n\n[workers]\n2\n" },
    missing_sections = { "[feature]\nLM0\n", "[feature]\nLM0\n\n[threads]\n6\n\n[workers]\n2\n" },
)]
fn sizing_sections(template: &str, expected: &str) {
    let mut ini = DecoderIni::parse(template);
    ini.set_threads(6);
    ini.set_workers(2);
    assert_eq!(ini.to_string(), expected);
}

#[test]
fn for_engine_applies_weights_and_sizing() {
    let dir = tempdir().unwrap();
    write_template(dir.path(), TEMPLATE);
    std::fs::write(
        dir.path().join("models/decoder/weights.json"),
        r#"{"LM0": [0.7]}"#,
    )
    .unwrap();

    let ini = DecoderIni::for_engine(&engine_at(dir.path()), DecoderSizing::for_cores(8)).unwrap();

    assert_eq!(ini.section("weight").unwrap(), ["LM0= 0.7"]);
    assert_eq!(ini.section("threads").unwrap(), ["6"]);
    assert_eq!(ini.section("workers").unwrap(), ["2"]);
    let root = dir.path().display().to_string();
    assert!(ini.section("feature").unwrap()[1].contains(&root));
}

#[test]
fn for_engine_keeps_template_weights_without_stored_weights() {
    let dir = tempdir().unwrap();
    write_template(dir.path(), TEMPLATE);

    let ini = DecoderIni::for_engine(&engine_at(dir.path()), DecoderSizing::for_cores(2)).unwrap();

    assert_eq!(ini.section("weight").unwrap().len(), 2);
    assert_eq!(ini.section("threads").unwrap(), ["2"]);
    assert_eq!(ini.section("workers").unwrap(), ["1"]);
}

#[test]
fn for_engine_requires_template() {
    let dir = tempdir().unwrap();
    let result = DecoderIni::for_engine(&engine_at(dir.path()), DecoderSizing::for_cores(4));
    assert!(matches!(result, Err(NodeError::Engine(_))));
}

#[test]
fn write_to_creates_runtime_dir() {
    let dir = tempdir().unwrap();
    let runtime = dir.path().join("runtime/worker");
    let ini = DecoderIni::parse("[threads]\n2\n");

    let path = ini.write_to(&runtime).unwrap();

    assert_eq!(path, runtime.join("decoder.ini"));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "[threads]\n2\n");
}
