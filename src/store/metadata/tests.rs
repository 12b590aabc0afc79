use super::*;

fn record(document_id: &str, text: &str) -> ChunkMetadata {
    ChunkMetadata {
        document_id: document_id.to_string(),
        text: text.to_string(),
    }
}

#[test]
fn append_preserves_order() {
    let mut store = MetadataStore::new();

    store.append(vec![record("doc-a", "first"), record("doc-a", "second")]);
    store.append(vec![record("doc-b", "third")]);

    assert_eq!(store.len(), 3);
    assert_eq!(store.get(0).expect("position 0 exists").text, "first");
    assert_eq!(store.get(1).expect("position 1 exists").text, "second");
    assert_eq!(store.get(2).expect("position 2 exists").document_id, "doc-b");
}

#[test]
fn get_out_of_range_is_an_error() {
    let mut store = MetadataStore::new();
    store.append(vec![record("doc-a", "only")]);

    assert!(matches!(
        store.get(1),
        Err(StoreError::OutOfRange { position: 1, len: 1 })
    ));
    assert!(matches!(
        MetadataStore::new().get(0),
        Err(StoreError::OutOfRange { position: 0, len: 0 })
    ));
}

#[test]
fn document_counts_group_by_document() {
    let mut store = MetadataStore::new();
    store.append(vec![
        record("doc-b", "one"),
        record("doc-a", "two"),
        record("doc-b", "three"),
    ]);

    assert_eq!(
        store.document_counts(),
        vec![("doc-a".to_string(), 1), ("doc-b".to_string(), 2)]
    );
}

#[test]
fn serialization_round_trips() {
    let mut store = MetadataStore::new();
    store.append(vec![record("doc-a", "some text"), record("doc-b", "more")]);

    let mut buf = Vec::new();
    store.write_to(&mut buf).expect("can serialize");
    let loaded = MetadataStore::read_from(buf.as_slice()).expect("can deserialize");

    assert_eq!(loaded, store);
}

#[test]
fn malformed_artifact_is_corrupted() {
    let result = MetadataStore::read_from(&b"{\"not\": \"a list\"}"[..]);

    assert!(matches!(result, Err(StoreError::Corrupted(_))));
}

#[test]
fn truncate_restores_prior_length() {
    let mut store = MetadataStore::new();
    store.append(vec![record("doc-a", "keep")]);
    store.append(vec![record("doc-a", "drop")]);

    store.truncate(1);

    assert_eq!(store.len(), 1);
    assert_eq!(store.get(0).expect("position 0 exists").text, "keep");
}
