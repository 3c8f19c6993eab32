//! Utility to create AFL fuzzing corpus data.
//!
//! Generates a set of payload collections for the aggregation fuzz target and
//! writes them into the `fuzz/corpus` directory.
use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use serde_json::{Value, json};
use udf_gateway::collection::encode_collection;

const CORPUS_DIR: &str = "fuzz/corpus";

fn batch(documents: &[Value]) -> Vec<u8> {
    encode_collection(documents.iter().map(|doc| doc.to_string().into_bytes()))
}

fn team_scores() -> Vec<u8> {
    batch(&[
        json!({"team": "A", "score": "3"}),
        json!({"team": "A", "score": "5"}),
        json!({"team": "B", "score": 2}),
    ])
}

fn authorizations() -> Vec<u8> {
    let attempts: Vec<Value> = (0..6)
        .map(|attempt| json!({"card_number": "1234", "amount": attempt}))
        .collect();
    batch(&attempts)
}

fn nested_documents() -> Vec<u8> {
    batch(&[
        json!({"team": "C", "score": 1, "meta": {"tags": ["x", null, true]}}),
        json!([1, 2, 3]),
        json!("plain string"),
    ])
}

fn malformed_item() -> Vec<u8> {
    encode_collection([b"{\"team\":\"A\",".to_vec(), vec![0xff, 0xfe]])
}

fn save(bytes: &[u8], path: &Path) -> std::io::Result<()> {
    let mut f = File::create(path)?;
    f.write_all(bytes)?;
    Ok(())
}

fn main() -> std::io::Result<()> {
    fs::create_dir_all(CORPUS_DIR)?;
    let dir = Path::new(CORPUS_DIR);
    save(&batch(&[]), &dir.join("empty.bin"))?;
    save(&team_scores(), &dir.join("team_scores.bin"))?;
    save(&authorizations(), &dir.join("authorizations.bin"))?;
    save(&nested_documents(), &dir.join("nested_documents.bin"))?;
    save(&malformed_item(), &dir.join("malformed_item.bin"))?;
    Ok(())
}
