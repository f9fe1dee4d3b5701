use super::*;
use crate::config::DecoderConfig;
use crate::error::RawBlockError;
use crate::kernels::{leb128, zigzag};
use crate::raw_block::RawBlockBuilder;
use crate::types::{SchemaColumn, TaosDataType, Value};

//==================================================================================
// Envelope fixture writer
//==================================================================================

struct FixtureBlock {
    raw: Vec<u8>,
    precision: u8,
    schema: Option<Vec<SchemaColumn>>,
    table_name: Option<String>,
}

struct Fixture {
    head: Vec<u8>,
    with_table_name: bool,
    with_schema: bool,
    blocks: Vec<FixtureBlock>,
}

impl Fixture {
    fn new(with_table_name: bool, with_schema: bool) -> Self {
        // Tag 1 skips 8 bytes, tag 2 skips 16.
        let mut head = vec![1u8];
        head.extend([0xAA; 8]);
        head.push(2);
        head.extend([0xBB; 16]);
        Self {
            head,
            with_table_name,
            with_schema,
            blocks: Vec::new(),
        }
    }

    fn block(mut self, builder: &RawBlockBuilder, precision: u8, schema: Option<Vec<SchemaColumn>>, name: Option<&str>) -> Self {
        self.blocks.push(FixtureBlock {
            raw: builder.build().unwrap(),
            precision,
            schema,
            table_name: name.map(str::to_string),
        });
        self
    }

    fn build(&self) -> Vec<u8> {
        let mut out = self.head.clone();
        out.extend_from_slice(&(self.blocks.len() as i32).to_le_bytes());
        out.push(u8::from(self.with_table_name));
        out.push(u8::from(self.with_schema));
        for block in &self.blocks {
            leb128::encode_one((block.raw.len() + 18) as u64, &mut out);
            out.extend([0u8; 17]);
            out.push(block.precision);
            out.extend_from_slice(&block.raw);
            if let Some(schema) = &block.schema {
                write_schema(&mut out, schema);
            }
            if let Some(name) = &block.table_name {
                write_name(&mut out, name);
            }
        }
        out
    }
}

fn write_name(out: &mut Vec<u8>, name: &str) {
    leb128::encode_one((name.len() + 1) as u64, out);
    out.extend_from_slice(name.as_bytes());
}

fn write_schema(out: &mut Vec<u8>, schema: &[SchemaColumn]) {
    leb128::encode_one(zigzag::zigzag_encode(schema.len() as i64), out);
    leb128::encode_one(zigzag::zigzag_encode(1), out);
    for col in schema {
        out.push(col.type_tag);
        out.push(col.flag as u8);
        leb128::encode_one(zigzag::zigzag_encode(col.byte_size), out);
        leb128::encode_one(zigzag::zigzag_encode(col.column_id as i64), out);
        write_name(out, &col.name);
    }
}

fn ts_int_block() -> RawBlockBuilder {
    RawBlockBuilder::new()
        .column(
            TaosDataType::Timestamp,
            vec![Value::Timestamp(1_000), Value::Timestamp(2_000)],
        )
        .column(TaosDataType::Int, vec![Value::Int(10), Value::Null])
}

fn ts_int_schema() -> Vec<SchemaColumn> {
    vec![
        SchemaColumn {
            type_tag: TaosDataType::Timestamp.code(),
            flag: 1,
            byte_size: 8,
            column_id: 1,
            name: "ts".to_string(),
        },
        SchemaColumn {
            type_tag: TaosDataType::Int.code(),
            flag: 0,
            byte_size: 4,
            column_id: -2,
            name: "v".to_string(),
        },
    ]
}

//==================================================================================
// Tests
//==================================================================================

#[test]
fn test_single_block_with_table_name() {
    let bytes = Fixture::new(true, false)
        .block(&ts_int_block(), 0, None, Some("t0"))
        .build();

    // The name is stored as varint(3) then "t0".
    assert_eq!(&bytes[bytes.len() - 3..], &[3, b't', b'0']);

    let infos = parse_envelope(&bytes).unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].table_name.as_deref(), Some("t0"));
    assert!(infos[0].schema.is_none());
    assert_eq!(infos[0].region, ts_int_block().build().unwrap().as_slice());
}

#[test]
fn test_self_describing_head() {
    let fixture = Fixture::new(false, false).block(&ts_int_block(), 0, None, None);
    let body = fixture.build();
    for tag in [parser::SELF_DESCRIBING_TAG, 200] {
        let mut bytes = vec![tag];
        bytes.extend_from_slice(&5i32.to_le_bytes());
        bytes.extend([0xCC; 5]);
        bytes.extend_from_slice(&body[fixture.head.len()..]);

        let infos = parse_envelope(&bytes).unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].table_name, None);
    }
}

#[test]
fn test_unknown_head_tags() {
    let mut bytes = vec![4u8];
    bytes.extend([0u8; 32]);
    assert!(matches!(
        parse_envelope(&bytes),
        Err(RawBlockError::UnknownEnvelopeTag(4))
    ));

    // A valid first tag followed by an invalid second one.
    let mut bytes = vec![3u8];
    bytes.extend([0u8; 16]);
    bytes.push(0);
    bytes.extend([0u8; 16]);
    assert!(matches!(
        parse_envelope(&bytes),
        Err(RawBlockError::UnknownEnvelopeTag(0))
    ));
}

#[test]
fn test_schema_and_name_per_block() {
    let second = RawBlockBuilder::new()
        .column(TaosDataType::Timestamp, vec![Value::Timestamp(3)])
        .column(TaosDataType::Int, vec![Value::Int(-4)]);
    let bytes = Fixture::new(true, true)
        .block(&ts_int_block(), 0, Some(ts_int_schema()), Some("meters"))
        .block(&second, 2, Some(ts_int_schema()), Some("d1001"))
        .build();

    let infos = parse_envelope(&bytes).unwrap();
    assert_eq!(infos.len(), 2);
    assert_eq!(infos[0].schema.as_deref(), Some(ts_int_schema().as_slice()));
    assert_eq!(infos[1].table_name.as_deref(), Some("d1001"));
    assert_eq!(infos[1].schema.as_ref().unwrap()[1].column_id, -2);

    let block = infos[1].raw_block(None, &DecoderConfig::default()).unwrap();
    assert_eq!(block.precision(), crate::types::Precision::Nanosecond);
    let rows = infos[0].decode(None, &DecoderConfig::default()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][1], Value::Int(10));
    assert_eq!(rows[1][1], Value::Null);
}

#[test]
fn test_decode_without_schema_uses_embedded_columns() {
    let bytes = Fixture::new(false, false)
        .block(&ts_int_block(), 1, None, None)
        .build();
    let infos = parse_envelope(&bytes).unwrap();
    assert!(infos[0].columns().unwrap().is_none());
    let rows = infos[0].decode(None, &DecoderConfig::default()).unwrap();
    assert!(!rows[1][0].is_null());
}

#[test]
fn test_schema_byte_size_beyond_i32_fails_on_decode() {
    let mut schema = ts_int_schema();
    schema[1].byte_size = 1 << 40;
    let bytes = Fixture::new(false, true)
        .block(&ts_int_block(), 0, Some(schema), None)
        .build();
    let infos = parse_envelope(&bytes).unwrap();
    assert_eq!(infos[0].schema.as_ref().unwrap()[1].byte_size, 1 << 40);
    assert!(matches!(infos[0].columns(), Err(RawBlockError::CorruptBlock(_))));
    assert!(matches!(
        infos[0].decode(None, &DecoderConfig::default()),
        Err(RawBlockError::CorruptBlock(_))
    ));
}

#[test]
fn test_unknown_precision_surfaces_on_decode() {
    let bytes = Fixture::new(false, false)
        .block(&ts_int_block(), 9, None, None)
        .build();
    let infos = parse_envelope(&bytes).unwrap();
    assert_eq!(infos[0].precision, 9);
    assert!(matches!(
        infos[0].decode(None, &DecoderConfig::default()),
        Err(RawBlockError::UnknownPrecision(9))
    ));
}

#[test]
fn test_incomplete_name() {
    let mut bytes = Fixture::new(true, false)
        .block(&ts_int_block(), 0, None, Some("t0"))
        .build();
    // Replace the name's varint with a claim of 10 bytes.
    let at = bytes.len() - 3;
    bytes[at] = 11;
    assert!(matches!(
        parse_envelope(&bytes),
        Err(RawBlockError::IncompleteName { needed: 10, available: 2, .. })
    ));
}

#[test]
fn test_incomplete_schema() {
    let mut bytes = Fixture::new(false, true)
        .block(&ts_int_block(), 0, Some(ts_int_schema()), None)
        .build();
    // Drop the last column record's name bytes and part of its header.
    bytes.truncate(bytes.len() - 4);
    let err = parse_envelope(&bytes).unwrap_err();
    assert!(matches!(err, RawBlockError::IncompleteSchema { .. }), "{:?}", err);
}

#[test]
fn test_schema_count_above_limit() {
    let mut bytes = Fixture::new(false, true)
        .block(&ts_int_block(), 0, Some(vec![]), None)
        .build();
    // Swap the trailing empty schema (count 0, version 1) for a huge count.
    bytes.truncate(bytes.len() - 2);
    leb128::encode_one(zigzag::zigzag_encode(1 << 40), &mut bytes);
    leb128::encode_one(zigzag::zigzag_encode(1), &mut bytes);
    let config = DecoderConfig {
        max_metadata_len: 1024,
        ..DecoderConfig::default()
    };
    assert!(matches!(
        parse_envelope_with(&bytes, &config),
        Err(RawBlockError::IncompleteSchema { .. })
    ));
}

#[test]
fn test_block_shorter_than_preamble() {
    let mut bytes = Fixture::new(false, false).build();
    bytes[26..30].copy_from_slice(&1i32.to_le_bytes());
    leb128::encode_one(5u64, &mut bytes);
    assert!(matches!(
        parse_envelope(&bytes),
        Err(RawBlockError::CorruptBlock(_))
    ));
}

#[test]
fn test_truncated_envelope_never_panics() {
    let bytes = Fixture::new(true, true)
        .block(&ts_int_block(), 0, Some(ts_int_schema()), Some("meters"))
        .build();
    for cut in 0..bytes.len() {
        assert!(parse_envelope(&bytes[..cut]).is_err(), "cut {}", cut);
    }
}
