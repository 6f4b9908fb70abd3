//! WOFF2 container encoder.
//!
//! Repackages a TrueType/OpenType font (`sfnt`) as WOFF2: a 48-byte header,
//! a compact table directory, and one Brotli stream holding every table's
//! bytes back to back. Tables are stored with the null transform (version 3
//! for `glyf`/`loca`, version 0 for everything else), which every
//! conforming decoder accepts and which keeps the encoder lossless.
//!
//! ```text
//! +-----------+------------------------+-----------------------------+
//! | header 48 | directory (per table)  | brotli(table0 table1 ...)   |
//! +-----------+------------------------+-----------------------------+
//! ```

use std::io::Write;
use thiserror::Error;

const WOFF2_SIGNATURE: u32 = 0x774F_4632; // 'wOF2'
const TTC_TAG: u32 = 0x7474_6366; // 'ttcf'
const HEADER_LEN: usize = 48;
const BROTLI_QUALITY: u32 = 11;
const BROTLI_LG_WINDOW: u32 = 22;

/// Tags with a one-byte code in the WOFF2 directory, indexed by code.
const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];

/// Directory flag value meaning "arbitrary tag follows".
const ARBITRARY_TAG: u8 = 63;

#[derive(Error, Debug)]
pub enum Woff2Error {
    #[error("font is truncated: {0}")]
    Truncated(&'static str),
    #[error("unsupported font flavor {0:#010x}")]
    UnsupportedFlavor(u32),
    #[error("font collections are not supported")]
    Collection,
    #[error("table '{0}' lies outside the font data")]
    TableOutOfBounds(String),
    #[error("compression failed: {0}")]
    Compression(#[from] std::io::Error),
}

/// One table record from the input font.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TableRecord {
    tag: [u8; 4],
    offset: usize,
    length: usize,
}

fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    data.get(at..at + 2).map(|b| u16::from_be_bytes([b[0], b[1]]))
}

fn read_u32(data: &[u8], at: usize) -> Option<u32> {
    data.get(at..at + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

/// Parse the sfnt offset table and table records.
fn parse_sfnt(data: &[u8]) -> Result<(u32, Vec<TableRecord>), Woff2Error> {
    let flavor = read_u32(data, 0).ok_or(Woff2Error::Truncated("offset table"))?;
    match flavor {
        TTC_TAG => return Err(Woff2Error::Collection),
        0x0001_0000 | 0x4F54_544F | 0x7472_7565 => {} // TrueType, 'OTTO', 'true'
        other => return Err(Woff2Error::UnsupportedFlavor(other)),
    }
    let num_tables = read_u16(data, 4).ok_or(Woff2Error::Truncated("offset table"))? as usize;

    let mut tables = Vec::with_capacity(num_tables);
    for i in 0..num_tables {
        let rec = 12 + i * 16;
        let tag_bytes = data
            .get(rec..rec + 4)
            .ok_or(Woff2Error::Truncated("table record"))?;
        let tag = [tag_bytes[0], tag_bytes[1], tag_bytes[2], tag_bytes[3]];
        let offset = read_u32(data, rec + 8).ok_or(Woff2Error::Truncated("table record"))?;
        let length = read_u32(data, rec + 12).ok_or(Woff2Error::Truncated("table record"))?;
        let (offset, length) = (offset as usize, length as usize);
        if offset.checked_add(length).is_none_or(|end| end > data.len()) {
            return Err(Woff2Error::TableOutOfBounds(
                String::from_utf8_lossy(&tag).into_owned(),
            ));
        }
        tables.push(TableRecord {
            tag,
            offset,
            length,
        });
    }
    tables.sort_by_key(|t| t.tag);
    Ok((flavor, tables))
}

/// Append `value` as a WOFF2 `UIntBase128`.
fn write_base128(out: &mut Vec<u8>, value: u32) {
    let mut groups = [0u8; 5];
    let mut count = 0;
    let mut v = value;
    loop {
        groups[count] = (v & 0x7F) as u8;
        count += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    for i in (0..count).rev() {
        let continuation = if i > 0 { 0x80 } else { 0 };
        out.push(groups[i] | continuation);
    }
}

fn known_tag_index(tag: &[u8; 4]) -> Option<u8> {
    KNOWN_TAGS.iter().position(|t| *t == tag).map(|i| i as u8)
}

fn directory_entry(out: &mut Vec<u8>, table: &TableRecord) {
    // glyf and loca signal the null transform with version 3; others with 0
    let transform: u8 = if &table.tag == b"glyf" || &table.tag == b"loca" {
        3 << 6
    } else {
        0
    };
    match known_tag_index(&table.tag) {
        Some(index) => out.push(index | transform),
        None => {
            out.push(ARBITRARY_TAG | transform);
            out.extend_from_slice(&table.tag);
        }
    }
    write_base128(out, table.length as u32);
}

fn pad4(n: usize) -> usize {
    (n + 3) & !3
}

fn brotli_compress(data: &[u8]) -> Result<Vec<u8>, Woff2Error> {
    let mut compressed = Vec::new();
    {
        let mut writer =
            brotli::CompressorWriter::new(&mut compressed, 4096, BROTLI_QUALITY, BROTLI_LG_WINDOW);
        writer.write_all(data)?;
        writer.flush()?;
    }
    Ok(compressed)
}

/// Encode an sfnt font as WOFF2.
pub fn encode(font: &[u8]) -> Result<Vec<u8>, Woff2Error> {
    let (flavor, tables) = parse_sfnt(font)?;

    let mut directory = Vec::new();
    let mut stream = Vec::new();
    for table in &tables {
        directory_entry(&mut directory, table);
        stream.extend_from_slice(&font[table.offset..table.offset + table.length]);
    }
    let compressed = brotli_compress(&stream)?;

    let total_sfnt_size: usize =
        12 + 16 * tables.len() + tables.iter().map(|t| pad4(t.length)).sum::<usize>();
    let unpadded = HEADER_LEN + directory.len() + compressed.len();
    let length = pad4(unpadded);

    let (major, minor) = font_revision(font, &tables);

    let mut out = Vec::with_capacity(length);
    out.extend_from_slice(&WOFF2_SIGNATURE.to_be_bytes());
    out.extend_from_slice(&flavor.to_be_bytes());
    out.extend_from_slice(&(length as u32).to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // reserved
    out.extend_from_slice(&(total_sfnt_size as u32).to_be_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.extend_from_slice(&major.to_be_bytes());
    out.extend_from_slice(&minor.to_be_bytes());
    out.extend_from_slice(&[0u8; 20]); // no metadata, no private block
    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    out.resize(length, 0);
    Ok(out)
}

/// Font revision from the `head` table as (major, minor), defaulting to 1.0.
fn font_revision(font: &[u8], tables: &[TableRecord]) -> (u16, u16) {
    tables
        .iter()
        .find(|t| &t.tag == b"head" && t.length >= 8)
        .and_then(|head| {
            Some((
                read_u16(font, head.offset + 4)?,
                read_u16(font, head.offset + 6)?,
            ))
        })
        .unwrap_or((1, 0))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a minimal sfnt with the given tables (tag, payload).
    pub(crate) fn build_sfnt(tables: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
        out.extend_from_slice(&[0u8; 6]); // searchRange, entrySelector, rangeShift
        let mut offset = 12 + 16 * tables.len();
        let mut records = Vec::new();
        let mut data = Vec::new();
        for (tag, payload) in tables {
            records.extend_from_slice(*tag);
            records.extend_from_slice(&0u32.to_be_bytes()); // checksum
            records.extend_from_slice(&(offset as u32).to_be_bytes());
            records.extend_from_slice(&(payload.len() as u32).to_be_bytes());
            data.extend_from_slice(payload);
            let padded = pad4(payload.len());
            data.resize(data.len() + padded - payload.len(), 0);
            offset += padded;
        }
        out.extend_from_slice(&records);
        out.extend_from_slice(&data);
        out
    }

    fn head_table() -> Vec<u8> {
        let mut head = vec![0u8; 54];
        head[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes()); // version
        head[4..6].copy_from_slice(&2u16.to_be_bytes()); // fontRevision major
        head[6..8].copy_from_slice(&5u16.to_be_bytes());
        head
    }

    fn brotli_decompress(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        brotli::BrotliDecompress(&mut std::io::Cursor::new(data), &mut out).unwrap();
        out
    }

    #[test]
    fn base128_encoding() {
        let enc = |v| {
            let mut out = Vec::new();
            write_base128(&mut out, v);
            out
        };
        assert_eq!(enc(0), vec![0x00]);
        assert_eq!(enc(127), vec![0x7F]);
        assert_eq!(enc(128), vec![0x81, 0x00]);
        assert_eq!(enc(63), vec![0x3F]);
        assert_eq!(enc(16384), vec![0x81, 0x80, 0x00]);
    }

    #[test]
    fn known_tags_have_expected_codes() {
        assert_eq!(known_tag_index(b"cmap"), Some(0));
        assert_eq!(known_tag_index(b"glyf"), Some(10));
        assert_eq!(known_tag_index(b"loca"), Some(11));
        assert_eq!(known_tag_index(b"Sill"), Some(62));
        assert_eq!(known_tag_index(b"DSIG"), None);
    }

    #[test]
    fn encode_writes_header() {
        let font = build_sfnt(&[
            (b"head", head_table()),
            (b"glyf", vec![1, 2, 3, 4, 5]),
            (b"loca", vec![0, 0, 0, 5]),
        ]);
        let woff = encode(&font).unwrap();

        assert_eq!(&woff[0..4], b"wOF2");
        assert_eq!(read_u32(&woff, 4), Some(0x0001_0000));
        assert_eq!(read_u32(&woff, 8), Some(woff.len() as u32));
        assert_eq!(woff.len() % 4, 0);
        assert_eq!(read_u16(&woff, 12), Some(3));
        // 12 + 3*16 + pad4(54) + pad4(5) + pad4(4)
        assert_eq!(read_u32(&woff, 16), Some(12 + 48 + 56 + 8 + 4));
        assert_eq!(read_u16(&woff, 24), Some(2));
        assert_eq!(read_u16(&woff, 26), Some(5));
    }

    #[test]
    fn encode_directory_uses_null_transforms() {
        let font = build_sfnt(&[
            (b"loca", vec![0, 0, 0, 5]),
            (b"glyf", vec![1, 2, 3, 4, 5]),
            (b"DSIG", vec![9; 8]),
        ]);
        let woff = encode(&font).unwrap();
        let dir = &woff[HEADER_LEN..];

        // Tables are sorted by tag: DSIG, glyf, loca
        assert_eq!(dir[0], ARBITRARY_TAG);
        assert_eq!(&dir[1..5], b"DSIG");
        assert_eq!(dir[5], 8);
        assert_eq!(dir[6], 10 | (3 << 6));
        assert_eq!(dir[7], 5);
        assert_eq!(dir[8], 11 | (3 << 6));
        assert_eq!(dir[9], 4);
    }

    #[test]
    fn encode_stream_holds_tables_back_to_back() {
        let font = build_sfnt(&[(b"cmap", vec![1, 2, 3]), (b"name", vec![4, 5])]);
        let woff = encode(&font).unwrap();

        let compressed_len = read_u32(&woff, 20).unwrap() as usize;
        let dir_len = 2 + 2; // two known tags, one-byte lengths
        let start = HEADER_LEN + dir_len;
        let stream = brotli_decompress(&woff[start..start + compressed_len]);
        assert_eq!(stream, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn encode_defaults_revision_without_head() {
        let font = build_sfnt(&[(b"cmap", vec![0; 4])]);
        let woff = encode(&font).unwrap();
        assert_eq!(read_u16(&woff, 24), Some(1));
        assert_eq!(read_u16(&woff, 26), Some(0));
    }

    #[test]
    fn rejects_collections() {
        let mut font = b"ttcf".to_vec();
        font.extend_from_slice(&[0; 12]);
        assert!(matches!(encode(&font), Err(Woff2Error::Collection)));
    }

    #[test]
    fn rejects_unknown_flavor() {
        let font = b"GIF89a\0\0\0\0\0\0".to_vec();
        assert!(matches!(encode(&font), Err(Woff2Error::UnsupportedFlavor(_))));
    }

    #[test]
    fn rejects_truncated_input() {
        assert!(matches!(encode(&[0, 1]), Err(Woff2Error::Truncated(_))));
    }

    #[test]
    fn rejects_table_past_end() {
        let mut font = build_sfnt(&[(b"cmap", vec![1, 2, 3, 4])]);
        // Inflate the recorded length beyond the data
        font[12 + 12..12 + 16].copy_from_slice(&1000u32.to_be_bytes());
        assert!(matches!(encode(&font), Err(Woff2Error::TableOutOfBounds(_))));
    }
}
