//! Compact tagged binary encoding.
//!
//! Every value is written as a one-byte tag followed by its little-endian
//! body, so a decoder positioned on corrupt data fails on the tag instead
//! of misreading field boundaries. Strings are interned per frame: the
//! first occurrence is written inline and assigned a table index, later
//! occurrences are written as a two-byte back-reference.

use crate::error::WireError;
use crate::event::{Event, Heartbeat, Payload, SourceStatus};
use crate::registry::TypeRegistry;
use bookflow_core::{BookId, BookSnapshot, ConnectionStatus, FeedId, PriceLevel, Side, Trade};
use bytes::{BufMut, BytesMut};
use std::collections::HashMap;

/// First byte of every binary frame body.
pub const FORMAT_BINARY: u8 = 0xB1;

const TAG_I64: u8 = 0x01;
const TAG_U64: u8 = 0x02;
const TAG_U32: u8 = 0x03;
const TAG_BOOL: u8 = 0x04;
const TAG_STR: u8 = 0x05;
const TAG_STR_REF: u8 = 0x06;
const TAG_ENUM: u8 = 0x07;
const TAG_NONE: u8 = 0x08;
const TAG_SOME: u8 = 0x09;
const TAG_LIST: u8 = 0x0A;

/// Tagged writer over a frame body.
///
/// Strings longer than `u16::MAX` bytes are not supported.
pub struct FrameWriter<'a> {
    buf: &'a mut BytesMut,
    strings: HashMap<String, u16>,
}

impl<'a> FrameWriter<'a> {
    /// Creates a writer appending to `buf`.
    #[must_use]
    pub fn new(buf: &'a mut BytesMut) -> Self {
        Self {
            buf,
            strings: HashMap::new(),
        }
    }

    /// Writes a tagged i64.
    pub fn put_i64(&mut self, value: i64) {
        self.buf.put_u8(TAG_I64);
        self.buf.put_i64_le(value);
    }

    /// Writes a tagged u64.
    pub fn put_u64(&mut self, value: u64) {
        self.buf.put_u8(TAG_U64);
        self.buf.put_u64_le(value);
    }

    /// Writes a tagged u32.
    pub fn put_u32(&mut self, value: u32) {
        self.buf.put_u8(TAG_U32);
        self.buf.put_u32_le(value);
    }

    /// Writes a tagged bool.
    pub fn put_bool(&mut self, value: bool) {
        self.buf.put_u8(TAG_BOOL);
        self.buf.put_u8(u8::from(value));
    }

    /// Writes a tagged enum discriminant.
    pub fn put_enum(&mut self, discriminant: u8) {
        self.buf.put_u8(TAG_ENUM);
        self.buf.put_u8(discriminant);
    }

    /// Writes a string, interning repeats as back-references.
    pub fn put_str(&mut self, value: &str) {
        debug_assert!(value.len() <= usize::from(u16::MAX));
        if let Some(&index) = self.strings.get(value) {
            self.buf.put_u8(TAG_STR_REF);
            self.buf.put_u16_le(index);
        } else {
            let index = self.strings.len() as u16;
            self.strings.insert(value.to_owned(), index);
            self.buf.put_u8(TAG_STR);
            self.buf.put_u16_le(value.len() as u16);
            self.buf.put_slice(value.as_bytes());
        }
    }

    /// Writes an absent optional value.
    pub fn put_none(&mut self) {
        self.buf.put_u8(TAG_NONE);
    }

    /// Marks a present optional value; the value itself follows.
    pub fn put_some(&mut self) {
        self.buf.put_u8(TAG_SOME);
    }

    /// Writes a list header; `len` tagged elements follow.
    pub fn put_list_len(&mut self, len: usize) {
        self.buf.put_u8(TAG_LIST);
        self.buf.put_u32_le(len as u32);
    }
}

/// Tagged reader over a frame body.
pub struct FrameReader<'a> {
    buf: &'a [u8],
    pos: usize,
    strings: Vec<String>,
}

impl<'a> FrameReader<'a> {
    /// Creates a reader over a complete frame body.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            strings: Vec::new(),
        }
    }

    /// Returns the number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns the current read offset.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < count {
            return Err(WireError::Truncated {
                required: count,
                available: self.remaining(),
                offset: self.pos,
            });
        }
        let slice = &self.buf[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    /// Reads one untagged byte.
    pub fn read_raw_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    fn expect_tag(&mut self, expected: u8) -> Result<(), WireError> {
        let offset = self.pos;
        let actual = self.read_raw_u8()?;
        if actual != expected {
            return Err(WireError::UnexpectedTag {
                expected,
                actual,
                offset,
            });
        }
        Ok(())
    }

    /// Reads a tagged i64.
    pub fn read_i64(&mut self) -> Result<i64, WireError> {
        self.expect_tag(TAG_I64)?;
        let b = self.take(8)?;
        Ok(i64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Reads a tagged u64.
    pub fn read_u64(&mut self) -> Result<u64, WireError> {
        self.expect_tag(TAG_U64)?;
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Reads a tagged u32.
    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        self.expect_tag(TAG_U32)?;
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads a tagged bool.
    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        self.expect_tag(TAG_BOOL)?;
        Ok(self.read_raw_u8()? != 0)
    }

    /// Reads a tagged enum discriminant.
    pub fn read_enum(&mut self) -> Result<u8, WireError> {
        self.expect_tag(TAG_ENUM)?;
        self.read_raw_u8()
    }

    /// Reads a string, resolving back-references against the frame's table.
    pub fn read_str(&mut self) -> Result<String, WireError> {
        let offset = self.pos;
        let tag = self.read_raw_u8()?;
        match tag {
            TAG_STR => {
                let b = self.take(2)?;
                let len = usize::from(u16::from_le_bytes([b[0], b[1]]));
                let start = self.pos;
                let bytes = self.take(len)?;
                let value = std::str::from_utf8(bytes)
                    .map_err(|_| WireError::InvalidUtf8 { offset: start })?
                    .to_owned();
                self.strings.push(value.clone());
                Ok(value)
            }
            TAG_STR_REF => {
                let b = self.take(2)?;
                let index = u16::from_le_bytes([b[0], b[1]]);
                self.strings
                    .get(usize::from(index))
                    .cloned()
                    .ok_or(WireError::BadBackReference {
                        index,
                        table_len: self.strings.len(),
                    })
            }
            actual => Err(WireError::UnexpectedTag {
                expected: TAG_STR,
                actual,
                offset,
            }),
        }
    }

    /// Reads an optional-value marker; the value follows when true.
    pub fn read_option(&mut self) -> Result<bool, WireError> {
        let offset = self.pos;
        match self.read_raw_u8()? {
            TAG_SOME => Ok(true),
            TAG_NONE => Ok(false),
            actual => Err(WireError::UnexpectedTag {
                expected: TAG_SOME,
                actual,
                offset,
            }),
        }
    }

    /// Reads a list header, returning the element count.
    pub fn read_list_len(&mut self) -> Result<usize, WireError> {
        self.expect_tag(TAG_LIST)?;
        Ok(self.read_u32_body()? as usize)
    }

    fn read_u32_body(&mut self) -> Result<u32, WireError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

const fn side_to_u8(side: Side) -> u8 {
    match side {
        Side::Bid => 0,
        Side::Offer => 1,
    }
}

fn side_from_u8(value: u8, offset: usize) -> Result<Side, WireError> {
    match value {
        0 => Ok(Side::Bid),
        1 => Ok(Side::Offer),
        _ => Err(WireError::InvalidEnumValue { value, offset }),
    }
}

const fn status_to_u8(status: ConnectionStatus) -> u8 {
    match status {
        ConnectionStatus::Connected => 0,
        ConnectionStatus::Disconnected => 1,
    }
}

fn status_from_u8(value: u8, offset: usize) -> Result<ConnectionStatus, WireError> {
    match value {
        0 => Ok(ConnectionStatus::Connected),
        1 => Ok(ConnectionStatus::Disconnected),
        _ => Err(WireError::InvalidEnumValue { value, offset }),
    }
}

/// Encodes a whole event into `buf` as one binary frame body.
pub fn encode_event(event: &Event, buf: &mut BytesMut) {
    buf.put_u8(FORMAT_BINARY);
    let mut writer = FrameWriter::new(buf);
    writer.put_str(&event.source);
    writer.put_str(event.payload.alias());
    match &event.payload {
        Payload::Book(snapshot) => encode_snapshot(snapshot, &mut writer),
        Payload::Trade(trade) => encode_trade(trade, &mut writer),
        Payload::Heartbeat(hb) => writer.put_u64(hb.sent_time_ns),
        Payload::SourceStatus(status) => {
            writer.put_str(status.feed.as_str());
            writer.put_enum(status_to_u8(status.status));
        }
    }
}

/// Decodes one binary frame body into an event.
///
/// # Errors
/// Returns `WireError` for format mismatches, unregistered aliases, and any
/// structural defect in the frame.
pub fn decode_event(frame: &[u8], registry: &TypeRegistry) -> Result<Event, WireError> {
    let mut reader = FrameReader::new(frame);
    let format = reader.read_raw_u8()?;
    if format != FORMAT_BINARY {
        return Err(WireError::FormatMismatch {
            expected: "binary",
            actual: format,
        });
    }

    let source = reader.read_str()?;
    let alias = reader.read_str()?;
    let decoder = registry
        .get(&alias)
        .ok_or(WireError::UnknownAlias { alias })?;
    let payload = (decoder.binary)(&mut reader)?;

    if reader.remaining() > 0 {
        return Err(WireError::TrailingBytes {
            remaining: reader.remaining(),
        });
    }
    Ok(Event { source, payload })
}

fn encode_snapshot(snapshot: &BookSnapshot, writer: &mut FrameWriter<'_>) {
    writer.put_str(snapshot.book.feed.as_str());
    writer.put_enum(side_to_u8(snapshot.book.side));
    writer.put_list_len(snapshot.levels.len());
    for level in &snapshot.levels {
        encode_level(level, writer);
    }
    match &snapshot.last_trade {
        Some(trade) => {
            writer.put_some();
            encode_trade(trade, writer);
        }
        None => writer.put_none(),
    }
    writer.put_i64(snapshot.update_id);
    writer.put_u64(snapshot.source_time_ns);
}

fn encode_level(level: &PriceLevel, writer: &mut FrameWriter<'_>) {
    writer.put_i64(level.price);
    writer.put_u64(level.size);
    writer.put_enum(side_to_u8(level.side));
    writer.put_u64(level.seq);
    writer.put_u64(level.source_time_ns);
    writer.put_bool(level.dealable);
}

fn encode_trade(trade: &Trade, writer: &mut FrameWriter<'_>) {
    writer.put_i64(trade.price);
    writer.put_u64(trade.size);
    writer.put_enum(side_to_u8(trade.aggressor));
    writer.put_u64(trade.source_time_ns);
}

/// Binary decoder for [`Payload::Book`].
pub fn decode_book(reader: &mut FrameReader<'_>) -> Result<Payload, WireError> {
    let feed = FeedId::new(reader.read_str()?);
    let offset = reader.pos();
    let side = side_from_u8(reader.read_enum()?, offset)?;

    let count = reader.read_list_len()?;
    let mut levels = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        levels.push(read_level(reader)?);
    }

    let last_trade = if reader.read_option()? {
        Some(read_trade(reader)?)
    } else {
        None
    };

    let update_id = reader.read_i64()?;
    let source_time_ns = reader.read_u64()?;

    Ok(Payload::Book(BookSnapshot {
        book: BookId { feed, side },
        levels,
        last_trade,
        update_id,
        source_time_ns,
    }))
}

fn read_level(reader: &mut FrameReader<'_>) -> Result<PriceLevel, WireError> {
    let price = reader.read_i64()?;
    let size = reader.read_u64()?;
    let offset = reader.pos();
    let side = side_from_u8(reader.read_enum()?, offset)?;
    let seq = reader.read_u64()?;
    let source_time_ns = reader.read_u64()?;
    let dealable = reader.read_bool()?;
    Ok(PriceLevel {
        price,
        size,
        side,
        seq,
        source_time_ns,
        dealable,
    })
}

fn read_trade(reader: &mut FrameReader<'_>) -> Result<Trade, WireError> {
    let price = reader.read_i64()?;
    let size = reader.read_u64()?;
    let offset = reader.pos();
    let aggressor = side_from_u8(reader.read_enum()?, offset)?;
    let source_time_ns = reader.read_u64()?;
    Ok(Trade {
        price,
        size,
        aggressor,
        source_time_ns,
    })
}

/// Binary decoder for [`Payload::Trade`].
pub fn decode_trade(reader: &mut FrameReader<'_>) -> Result<Payload, WireError> {
    Ok(Payload::Trade(read_trade(reader)?))
}

/// Binary decoder for [`Payload::Heartbeat`].
pub fn decode_heartbeat(reader: &mut FrameReader<'_>) -> Result<Payload, WireError> {
    Ok(Payload::Heartbeat(Heartbeat {
        sent_time_ns: reader.read_u64()?,
    }))
}

/// Binary decoder for [`Payload::SourceStatus`].
pub fn decode_source_status(reader: &mut FrameReader<'_>) -> Result<Payload, WireError> {
    let feed = FeedId::new(reader.read_str()?);
    let offset = reader.pos();
    let status = status_from_u8(reader.read_enum()?, offset)?;
    Ok(Payload::SourceStatus(SourceStatus { feed, status }))
}
