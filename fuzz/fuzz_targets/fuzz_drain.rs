#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use jsoncat::{Drain, Error, JsonDecoder, ReaderOptions, ScanStrategy, SourceOptions, Step};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};

const HEADER: usize = 5; // 1 flag + 4-byte seed

thread_local! {
    static RNG: RefCell<SmallRng> =
        RefCell::new(SmallRng::from_os_rng());
}

static WS_TABLE: &[&[u8]] = &[b" ", b"\t", b"\n", b"\r", b"\r\n", b"\n\n"];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

/// Mostly well-formed input: whitespace-separated objects behind the header,
/// so the fuzzer spends its time on boundaries rather than on junk.
fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8);
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let mut prefix = HEADER;
        while prefix < size.min(max_size) {
            let limit = max_size - prefix;
            prefix += append_whitespace(&mut data[prefix..], limit);
            let limit = max_size - prefix;
            prefix += append_object(&mut data[prefix..], size, limit);
        }
        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fn append_whitespace(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }
        let n = rng.random_range(0..=limit.min(4));
        let mut written = 0;
        for _ in 0..n {
            let w = WS_TABLE[rng.random_range(0..WS_TABLE.len())];
            if written + w.len() > limit {
                break;
            }
            buf[written..written + w.len()].copy_from_slice(w);
            written += w.len();
        }
        written
    })
}

fn append_object(data: &mut [u8], size: usize, limit: usize) -> usize {
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2 + 1).min(limit));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryObject::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };
    let serialized = serde_json::to_vec(&value.0).expect("serializing an arbitrary object");
    // Truncation is deliberate: a cut-off final object must be dropped.
    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(16)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3 => Value::Number(u.arbitrary::<i64>()?.into()),
            4..=8 => Value::String(u.arbitrary()?),
            9..=11 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            _ => ArbitraryObject::arbitrary(u)?.0,
        };
        Ok(ArbitraryValue(value))
    }
}

#[derive(Debug)]
struct ArbitraryObject(Value);

impl<'a> Arbitrary<'a> for ArbitraryObject {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
        Ok(ArbitraryObject(Value::Object(Map::from_iter(
            m.into_iter().map(|(k, v)| (k, v.0)),
        ))))
    }
}

/// Everything a drain produced: rendered values, then the error offset if
/// it stopped on one.
#[derive(Debug, PartialEq)]
struct Outcome {
    values: Vec<Option<String>>,
    failed_at: Option<u64>,
}

/// How bytes reach the drain.
#[derive(Clone, Copy)]
enum Delivery {
    /// Each chunk is handed over as an owned `Vec`.
    Feed,
    /// Each chunk is copied into the arena through `spare`/`commit`, the way
    /// the blocking and async readers do it.
    Spare,
}

fn drain(options: ReaderOptions, chunks: &[&[u8]], delivery: Delivery) -> Outcome {
    let mut drain = Drain::new(options, JsonDecoder::<Value>::new());
    let mut chunks = chunks.iter().copied();
    let mut pending: &[u8] = &[];
    let mut outcome = Outcome {
        values: Vec::new(),
        failed_at: None,
    };
    loop {
        match drain.step() {
            Ok(Step::Value(value)) => outcome.values.push(value.map(|v| v.to_string())),
            Ok(Step::NeedInput) => {
                if pending.is_empty() {
                    pending = chunks.next().unwrap_or_default();
                }
                match delivery {
                    _ if pending.is_empty() => drain.finish(),
                    Delivery::Feed => {
                        drain.feed(pending.to_vec());
                        pending = &[];
                    }
                    Delivery::Spare => {
                        let spare = drain.spare();
                        let n = spare.len().min(pending.len());
                        spare[..n].copy_from_slice(&pending[..n]);
                        pending = &pending[n..];
                        drain.commit(n).expect("commit within the spare space");
                    }
                }
            }
            Ok(Step::Finished) => return outcome,
            Err(Error::MalformedInput { offset, .. }) => {
                outcome.failed_at = Some(offset);
                return outcome;
            }
            Err(err) => panic!("unexpected drain error: {err}"),
        }
    }
}

fn split(data: &[u8], split_seed: u64) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut seed = split_seed;
    while start < data.len() {
        let remaining = data.len() - start;
        let size = (seed as usize % remaining) + 1;
        chunks.push(&data[start..start + size]);
        start += size;
        seed = seed.rotate_left(7) ^ 0x9E37_79B9;
    }
    chunks
}

fn run(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }
    let flags = data[0];
    let split_seed = u64::from(u32::from_le_bytes([data[1], data[2], data[3], data[4]]));
    let data = &data[HEADER..];

    let strategy = if flags & 1 == 0 {
        ScanStrategy::Structural
    } else {
        ScanStrategy::Newline
    };
    let buffer_size = 1 + usize::from((flags >> 1) & 0x0F);
    let minimum_read_size = 1 + usize::from(flags >> 5) % buffer_size;
    let options = ReaderOptions {
        strategy,
        source: SourceOptions {
            buffer_size,
            minimum_read_size,
            ..SourceOptions::default()
        },
    };

    let whole = drain(options, &[data], Delivery::Feed);
    let chunks = split(data, split_seed);
    assert_eq!(whole, drain(options, &chunks, Delivery::Feed));
    assert_eq!(whole, drain(options, &chunks, Delivery::Spare));
}

fuzz_target!(|data: &[u8]| run(data));
