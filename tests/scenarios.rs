//! End-to-end checks through the public API, using hand-written buffers where
//! the exact bytes matter and the block builder elsewhere.

use rand::Rng;

use rawblock::kernels::{leb128, read_varint, zigzag_decode, zigzag_encode};
use rawblock::{
    decode_block, decode_block_with, decode_row, parse_envelope, ColumnDescriptor, DecoderConfig,
    Precision, RawBlock, RawBlockBuilder, RawBlockError, RawTicks, TaosDataType, Value,
};

fn header(rows: i32, cols: i32, total: i32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&1i32.to_le_bytes());
    out.extend_from_slice(&total.to_le_bytes());
    out.extend_from_slice(&rows.to_le_bytes());
    out.extend_from_slice(&cols.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes());
    out
}

/// Two rows: an int column `[1, null]` and a binary column `["ab", null]`.
fn scenario_a_bytes() -> Vec<u8> {
    let mut out = header(2, 2, 67);
    out.push(4);
    out.extend_from_slice(&4i32.to_le_bytes());
    out.push(8);
    out.extend_from_slice(&4i32.to_le_bytes());
    out.extend_from_slice(&8i32.to_le_bytes());
    out.extend_from_slice(&4i32.to_le_bytes());
    // int column: bitmap marks row 1 (MSB-first), then two values.
    out.push(0b0100_0000);
    out.extend_from_slice(&1i32.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes());
    // binary column: offsets then payload.
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&(-1i32).to_le_bytes());
    out.extend_from_slice(&[2, 0, b'a', b'b']);
    assert_eq!(out.len(), 67);
    out
}

fn scenario_a_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new(TaosDataType::Int, 4),
        ColumnDescriptor::new(TaosDataType::Binary, 4),
    ]
}

#[test]
fn scenario_a_int_and_binary_with_nulls() {
    let rows = decode_block(&scenario_a_bytes(), &scenario_a_columns(), Precision::Millisecond).unwrap();
    assert_eq!(
        rows,
        vec![
            vec![Value::Int(1), Value::Bytes(b"ab".to_vec())],
            vec![Value::Null, Value::Null],
        ]
    );
}

#[test]
fn scenario_b_envelope_with_table_name() {
    let raw = RawBlockBuilder::new()
        .column(TaosDataType::Int, vec![Value::Int(5)])
        .build()
        .unwrap();

    let mut env = vec![1u8];
    env.extend([0u8; 8]);
    env.push(3);
    env.extend([0u8; 16]);
    env.extend_from_slice(&1i32.to_le_bytes());
    env.push(1);
    env.push(0);
    leb128::encode_one((raw.len() + 18) as u64, &mut env);
    env.extend([0u8; 17]);
    env.push(0);
    env.extend_from_slice(&raw);
    env.extend_from_slice(&[3, b't', b'0']);

    let infos = parse_envelope(&env).unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].table_name.as_deref(), Some("t0"));
    assert_eq!(infos[0].region, raw.as_slice());
}

#[test]
fn scenario_c_nchar_lengths() {
    // One nchar column, two rows: "hi" (8 content bytes) and "" (0 bytes).
    let mut out = header(2, 1, 28 + 5 + 4 + 8 + 12);
    out.push(10);
    out.extend_from_slice(&10i32.to_le_bytes());
    out.extend_from_slice(&12i32.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&10i32.to_le_bytes());
    out.extend_from_slice(&[8, 0]);
    out.extend_from_slice(&('h' as u32).to_le_bytes());
    out.extend_from_slice(&('i' as u32).to_le_bytes());
    out.extend_from_slice(&[0, 0]);

    let columns = [ColumnDescriptor::new(TaosDataType::NChar, 10)];
    let rows = decode_block(&out, &columns, Precision::Millisecond).unwrap();
    assert_eq!(rows[0][0], Value::String("hi".to_string()));
    assert_eq!(rows[1][0], Value::String(String::new()));
    assert!(!rows[1][0].is_null());
}

#[test]
fn scenario_d_truncated_last_byte_fails() {
    let bytes = scenario_a_bytes();
    let err = decode_block(&bytes[..bytes.len() - 1], &scenario_a_columns(), Precision::Millisecond)
        .unwrap_err();
    assert!(err.is_malformed_buffer(), "{:?}", err);

    // Same with the total-length check disabled: the column regions still overrun.
    let config = DecoderConfig {
        validate_total_length: false,
        ..DecoderConfig::default()
    };
    let err = decode_block_with(
        &bytes[..bytes.len() - 1],
        &scenario_a_columns(),
        Precision::Millisecond,
        &config,
        &RawTicks,
    )
    .unwrap_err();
    assert!(matches!(err, RawBlockError::TruncatedBuffer { .. }), "{:?}", err);
}

#[test]
fn zero_rows_decode_to_nothing() {
    for cols in 0..4 {
        let mut builder = RawBlockBuilder::new();
        for _ in 0..cols {
            builder = builder.column(TaosDataType::Double, vec![]);
        }
        let bytes = builder.build().unwrap();
        let rows = decode_block(&bytes, &builder.descriptors(), Precision::Nanosecond).unwrap();
        assert!(rows.is_empty());
    }
}

#[test]
fn zigzag_varint_recovers_representative_values() {
    for x in [0i64, 1, -1, 63, -64, 300, -300, i32::MAX as i64, i64::MAX, i64::MIN] {
        let mut buf = Vec::new();
        leb128::encode_one(zigzag_encode(x), &mut buf);
        let (raw, used) = read_varint(&buf, 0).unwrap();
        assert_eq!(used, buf.len());
        assert_eq!(zigzag_decode(raw), x);
    }
}

#[test]
fn whole_block_and_per_row_paths_agree() {
    let mut rng = rand::rng();
    for _ in 0..20 {
        let rows = rng.random_range(1..40);
        let ints = (0..rows)
            .map(|_| if rng.random_bool(0.3) { Value::Null } else { Value::BigInt(rng.random()) })
            .collect();
        let ts = (0..rows).map(|i| Value::Timestamp(1_600_000_000_000 + i as i64)).collect();
        let text = (0..rows)
            .map(|_| {
                if rng.random_bool(0.3) {
                    Value::Null
                } else {
                    let len = rng.random_range(0..12);
                    Value::Bytes((0..len).map(|_| rng.random_range(b'a'..=b'z')).collect())
                }
            })
            .collect();
        let builder = RawBlockBuilder::new()
            .column(TaosDataType::Timestamp, ts)
            .column(TaosDataType::BigInt, ints)
            .column(TaosDataType::VarBinary, text);
        let bytes = builder.build().unwrap();
        let columns = builder.descriptors();

        let block = decode_block(&bytes, &columns, Precision::Microsecond).unwrap();
        assert_eq!(block.len(), rows);
        for (i, expected) in block.iter().enumerate() {
            let row = decode_row(&bytes, &columns, i, Precision::Microsecond).unwrap();
            assert_eq!(&row, expected);
        }

        let parsed = RawBlock::parse(&bytes, &columns, Precision::Microsecond, &DecoderConfig::default()).unwrap();
        let cursor_rows: Vec<_> = parsed.rows().collect::<Result<_, _>>().unwrap();
        assert_eq!(cursor_rows, block);
    }
}
