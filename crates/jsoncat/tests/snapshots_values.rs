#![expect(missing_docs)]

use jsoncat::{ByteView, Error, ReaderOptions, ScanStrategy, from_fn, read_values, read_values_with};

fn render_ranges(input: &str, strategy: ScanStrategy, text: bool) -> String {
    let decoder = from_fn(|payload: ByteView<'_>| {
        let start = payload.offset();
        Ok::<_, Error>(Some(if text {
            format!("{start}:{}", String::from_utf8_lossy(&payload.to_vec()))
        } else {
            format!("{start}..{}", start + payload.len() as u64)
        }))
    });
    read_values_with(input.as_bytes(), ReaderOptions::with_strategy(strategy), decoder)
        .map(|item| item.expect("decode error").unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" | ")
}

#[test]
fn snapshot_structural_boundaries() {
    let input = "  {\"a\":1}\n\n{\"b\":[1,2]}{\"c\":{}}\n{";
    insta::assert_snapshot!(render_ranges(input, ScanStrategy::Structural, true), @r#"2:{"a":1} | 11:{"b":[1,2]} | 22:{"c":{}}"#);
    insta::assert_snapshot!(render_ranges(input, ScanStrategy::Structural, false), @"2..9 | 11..22 | 22..30");
}

#[test]
fn snapshot_newline_boundaries() {
    let input = "{\"a\":1}\r\n{\"b\":2}\n{\"c\":3}";
    insta::assert_snapshot!(render_ranges(input, ScanStrategy::Newline, false), @"0..8 | 9..16");
}

#[test]
fn snapshot_drain_stats() {
    let input = "{\"a\":1}\n{\"a\":2}\n{\"a\":3}\n{\"a\"";
    let mut values = read_values::<serde_json::Value, _>(input.as_bytes(), ReaderOptions::default());
    let rendered = values
        .by_ref()
        .map(|item| item.expect("decode error").map(|v| v.to_string()).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ");
    insta::assert_snapshot!(rendered, @r#"{"a":1} {"a":2} {"a":3}"#);
    insta::assert_snapshot!(format!("{:?}", values.stats()), @"DrainStats { bytes_read: 28, bytes_consumed: 24, reads: 1, values: 3, bytes_dropped: 4 }");
}
