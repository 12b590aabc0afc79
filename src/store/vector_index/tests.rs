use super::*;

fn index_with(vectors: &[Vec<f32>]) -> VectorIndex {
    let dimension = vectors.first().map_or(2, Vec::len);
    let mut index = VectorIndex::new(dimension).expect("can create index");
    index.add(vectors).expect("can add vectors");
    index
}

#[test]
fn rejects_zero_dimension() {
    assert!(matches!(
        VectorIndex::new(0),
        Err(StoreError::InvalidDimension(0))
    ));
}

#[test]
fn add_rejects_dimension_mismatch_without_partial_append() {
    let mut index = VectorIndex::new(3).expect("can create index");

    let result = index.add(&[vec![1.0, 2.0, 3.0], vec![1.0, 2.0]]);

    assert!(matches!(
        result,
        Err(StoreError::DimensionMismatch {
            expected: 3,
            actual: 2
        })
    ));
    // The valid leading vector must not have been applied either
    assert!(index.is_empty());
}

#[test]
fn search_orders_by_ascending_distance() {
    let index = index_with(&[
        vec![10.0, 0.0],
        vec![1.0, 0.0],
        vec![5.0, 0.0],
    ]);

    let results = index.search(&[0.0, 0.0], 3).expect("can search");

    assert_eq!(
        results.iter().map(|(pos, _)| *pos).collect::<Vec<_>>(),
        vec![1, 2, 0]
    );
    assert!(results.windows(2).all(|w| w[0].1 <= w[1].1));
}

#[test]
fn search_breaks_ties_by_insertion_order() {
    let index = index_with(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, 0.0]]);

    // All three are at distance 1 from the origin
    let results = index.search(&[0.0, 0.0], 3).expect("can search");

    assert_eq!(
        results.iter().map(|(pos, _)| *pos).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn search_never_returns_more_than_len() {
    let index = index_with(&[vec![0.0, 0.0], vec![1.0, 1.0]]);

    let results = index.search(&[0.0, 0.0], 10).expect("can search");

    assert_eq!(results.len(), 2);
}

#[test]
fn search_on_empty_index_returns_nothing() {
    let index = VectorIndex::new(4).expect("can create index");

    let results = index.search(&[0.0; 4], 5).expect("can search");

    assert!(results.is_empty());
}

#[test]
fn search_rejects_wrong_query_dimension() {
    let index = VectorIndex::new(3).expect("can create index");

    assert!(matches!(
        index.search(&[1.0, 2.0], 1),
        Err(StoreError::DimensionMismatch {
            expected: 3,
            actual: 2
        })
    ));
}

#[test]
fn distances_are_squared_euclidean() {
    let index = index_with(&[vec![3.0, 4.0]]);

    let results = index.search(&[0.0, 0.0], 1).expect("can search");

    assert_eq!(results[0].1, 25.0);
}

#[test]
fn serialization_round_trips() {
    let index = index_with(&[vec![1.5, -2.5, 0.0], vec![0.25, 0.5, -0.75]]);

    let mut buf = Vec::new();
    index.write_to(&mut buf).expect("can serialize");
    let loaded = VectorIndex::read_from(buf.as_slice()).expect("can deserialize");

    assert_eq!(loaded, index);
}

#[test]
fn truncated_artifact_is_corrupted() {
    let index = index_with(&[vec![1.0, 2.0], vec![3.0, 4.0]]);

    let mut buf = Vec::new();
    index.write_to(&mut buf).expect("can serialize");
    buf.truncate(buf.len() - 3);

    assert!(matches!(
        VectorIndex::read_from(buf.as_slice()),
        Err(StoreError::Corrupted(_))
    ));
}

#[test]
fn wrong_magic_is_corrupted() {
    let buf = b"NOPE\x01\x00\x00\x00".to_vec();

    assert!(matches!(
        VectorIndex::read_from(buf.as_slice()),
        Err(StoreError::Corrupted(_))
    ));
}

#[test]
fn trailing_bytes_are_corrupted() {
    let index = index_with(&[vec![1.0, 2.0]]);

    let mut buf = Vec::new();
    index.write_to(&mut buf).expect("can serialize");
    buf.extend_from_slice(&[0u8; 4]);

    assert!(matches!(
        VectorIndex::read_from(buf.as_slice()),
        Err(StoreError::Corrupted(_))
    ));
}

#[test]
fn truncate_restores_prior_length() {
    let mut index = index_with(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
    index.add(&[vec![5.0, 6.0]]).expect("can add");

    index.truncate(2);

    assert_eq!(index.len(), 2);
    let results = index.search(&[5.0, 6.0], 3).expect("can search");
    assert_eq!(results.len(), 2);
}
