#![allow(missing_docs)]

mod common;

use common::{CORRUPTED, Hotel, MULTICONTENT, SINGLE, Trickle};
use jsoncat::{
    Error, ReaderOptions, ScanStrategy, collect_values, collect_values_with, from_fn, read_values,
};
use rstest::rstest;

#[rstest]
#[case::single(SINGLE, 1)]
#[case::multicontent(MULTICONTENT, 6)]
#[case::corrupted(CORRUPTED, 2)]
fn enumerates_every_document(#[case] input: &str, #[case] expected: usize) {
    let hotels: Vec<Hotel> = read_values(Trickle::new(input, 100), ReaderOptions::default())
        .filter_map(Result::transpose)
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(hotels.len(), expected);
}

#[rstest]
#[case::single(SINGLE, 1)]
#[case::multicontent(MULTICONTENT, 6)]
#[case::corrupted(CORRUPTED, 2)]
fn collects_every_document(#[case] input: &str, #[case] expected: usize) {
    let hotels: Vec<Hotel> =
        collect_values(Trickle::new(input, 100), ReaderOptions::default()).unwrap();
    assert_eq!(hotels.len(), expected);
    for (i, hotel) in hotels.iter().enumerate() {
        assert_eq!(hotel.hotel_id, (i + 1).to_string());
    }
}

#[rstest]
#[case::one_byte(1)]
#[case::small(7)]
#[case::file_buffer(100)]
#[case::whole(usize::MAX)]
fn newline_strategy_reads_each_line(#[case] size: usize) {
    let hotels: Vec<Hotel> = collect_values(
        Trickle::new(MULTICONTENT, size),
        ReaderOptions::with_strategy(ScanStrategy::Newline),
    )
    .unwrap();
    assert_eq!(hotels.len(), 6);
    assert_eq!(hotels[4].hotel_name, "Gastronomic Landscape {Hotel}");
    assert_eq!(hotels[4].address.street_address, "9 Main St\nSuite 2");
    assert!(hotels[3].tags.is_empty());
}

#[test]
fn raw_lines_with_custom_decoder() {
    let lines = collect_values_with(
        Trickle::new(MULTICONTENT, 100),
        ReaderOptions::with_strategy(ScanStrategy::Newline),
        from_fn(|payload| Ok(Some(String::from_utf8(payload.to_vec()).unwrap()))),
    )
    .unwrap();
    assert_eq!(lines.len(), 6);
    for line in &lines {
        assert!(line.starts_with('{'), "{line}");
        assert!(line.ends_with('}'), "{line}");
    }
}

#[test]
fn multiline_document_fails_under_newline_strategy() {
    let err = collect_values::<Hotel, _>(
        Trickle::new(SINGLE, 100),
        ReaderOptions::with_strategy(ScanStrategy::Newline),
    )
    .unwrap_err();
    assert!(matches!(err, Error::MalformedInput { offset: 0, .. }), "{err}");
}

#[test]
fn structural_and_newline_agree_on_line_delimited_input() {
    let structural: Vec<Hotel> =
        collect_values(MULTICONTENT.as_bytes(), ReaderOptions::default()).unwrap();
    let newline: Vec<Hotel> = collect_values(
        MULTICONTENT.as_bytes(),
        ReaderOptions::with_strategy(ScanStrategy::Newline),
    )
    .unwrap();
    assert_eq!(structural, newline);
}
