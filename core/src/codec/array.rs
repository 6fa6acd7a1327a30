use super::{validate_postings, StorageCodec};
use crate::{IndexError, Postings, Result};
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use std::io::Write;
use std::str::FromStr;

/// Width of posting counts and document ids in the array layout.
///
/// `Narrow` caps ids to `i16`, which real corpora outgrow quickly; `Wide`
/// lifts that ceiling while keeping the narrow layout readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdWidth {
    Narrow,
    Wide,
}

impl IdWidth {
    fn count_len(self) -> usize {
        match self {
            IdWidth::Narrow => 2,
            IdWidth::Wide => 4,
        }
    }

    fn id_len(self) -> usize {
        match self {
            IdWidth::Narrow => 2,
            IdWidth::Wide => 8,
        }
    }
}

/// Layout, all integers big-endian:
///
/// ```text
/// i32            number of terms
/// per term:
///   u8           term length in UTF-8 bytes
///   [u8]         term
///   i16 | i32    posting count
///   [i16 | i64]  document ids
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ArrayCodec {
    width: IdWidth,
}

impl ArrayCodec {
    pub fn new(width: IdWidth) -> Self { Self { width } }

    fn write_count(&self, writer: &mut dyn Write, term: &str, count: usize) -> Result<()> {
        let too_many = || IndexError::encoding(format!("term {term:?} has {count} postings, too many for {:?} layout", self.width));
        match self.width {
            IdWidth::Narrow => writer.write_i16::<BigEndian>(i16::try_from(count).map_err(|_| too_many())?)?,
            IdWidth::Wide => writer.write_i32::<BigEndian>(i32::try_from(count).map_err(|_| too_many())?)?,
        }
        Ok(())
    }

    fn write_doc_id(&self, writer: &mut dyn Write, doc_id: &str) -> Result<()> {
        match self.width {
            IdWidth::Narrow => writer.write_i16::<BigEndian>(parse_canonical(doc_id, "16-bit")?)?,
            IdWidth::Wide => writer.write_i64::<BigEndian>(parse_canonical(doc_id, "64-bit")?)?,
        }
        Ok(())
    }

    fn read_count(&self, reader: &mut ByteReader<'_>) -> Result<usize> {
        let count = match self.width {
            IdWidth::Narrow => BigEndian::read_i16(reader.take(2, "posting count")?) as i64,
            IdWidth::Wide => BigEndian::read_i32(reader.take(4, "posting count")?) as i64,
        };
        if count <= 0 {
            return Err(IndexError::decoding(format!(
                "posting count {count} at offset {} must be positive",
                reader.pos - self.width.count_len()
            )));
        }
        Ok(count as usize)
    }

    fn read_doc_id(&self, reader: &mut ByteReader<'_>) -> Result<String> {
        let id = match self.width {
            IdWidth::Narrow => BigEndian::read_i16(reader.take(2, "document id")?).to_string(),
            IdWidth::Wide => BigEndian::read_i64(reader.take(8, "document id")?).to_string(),
        };
        Ok(id)
    }
}

impl StorageCodec for ArrayCodec {
    fn encode(&self, postings: &Postings, writer: &mut dyn Write) -> Result<()> {
        let num_terms = i32::try_from(postings.len())
            .map_err(|_| IndexError::encoding(format!("{} terms do not fit a 32-bit count", postings.len())))?;
        writer.write_i32::<BigEndian>(num_terms)?;
        for (term, doc_ids) in postings {
            let bytes = term.as_bytes();
            let len = u8::try_from(bytes.len()).map_err(|_| {
                IndexError::encoding(format!("term {term:?} is {} bytes long, the limit is 255", bytes.len()))
            })?;
            writer.write_u8(len)?;
            writer.write_all(bytes)?;
            self.write_count(writer, term, doc_ids.len())?;
            for doc_id in doc_ids {
                self.write_doc_id(writer, doc_id)?;
            }
        }
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Postings> {
        let mut reader = ByteReader::new(bytes);
        let num_terms = BigEndian::read_i32(reader.take(4, "term count")?);
        let num_terms = usize::try_from(num_terms)
            .map_err(|_| IndexError::decoding(format!("negative term count {num_terms}")))?;
        // every term needs at least its length byte and its posting count
        let min_term_len = 1 + self.width.count_len();
        if num_terms > reader.remaining() / min_term_len {
            return Err(IndexError::decoding(format!(
                "header declares {num_terms} terms but only {} bytes follow",
                reader.remaining()
            )));
        }

        let mut postings = Postings::with_capacity(num_terms);
        for _ in 0..num_terms {
            let len = reader.take(1, "term length")?[0] as usize;
            let offset = reader.pos;
            let term = std::str::from_utf8(reader.take(len, "term")?)
                .map_err(|e| IndexError::decoding(format!("term at offset {offset} is not UTF-8: {e}")))?
                .to_string();
            let count = self.read_count(&mut reader)?;
            if count > reader.remaining() / self.width.id_len() {
                return Err(IndexError::decoding(format!(
                    "term {term:?} declares {count} postings but only {} bytes follow",
                    reader.remaining()
                )));
            }
            let mut doc_ids = Vec::with_capacity(count);
            for _ in 0..count {
                doc_ids.push(self.read_doc_id(&mut reader)?);
            }
            if postings.insert(term, doc_ids).is_some() {
                return Err(IndexError::decoding(format!("duplicate term at offset {offset}")));
            }
        }
        if reader.remaining() != 0 {
            return Err(IndexError::decoding(format!(
                "{} trailing bytes after the last term",
                reader.remaining()
            )));
        }
        validate_postings(&postings)?;
        Ok(postings)
    }
}

/// Ids are stored as integers and read back in canonical form, so `007` or
/// `+7` would come back as `7` and may collide with a real `7`.
fn parse_canonical<T>(doc_id: &str, bits: &str) -> Result<T>
where
    T: FromStr + ToString,
{
    let id: T = doc_id
        .parse()
        .map_err(|_| IndexError::encoding(format!("document id {doc_id:?} is not a {bits} signed integer")))?;
    if id.to_string() != doc_id {
        return Err(IndexError::encoding(format!(
            "document id {doc_id:?} is not in canonical integer form"
        )));
    }
    Ok(id)
}

/// Bounds-checked forward reader over the whole file.
struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8]) -> Self { Self { buf, pos: 0 } }

    fn remaining(&self) -> usize { self.buf.len() - self.pos }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(IndexError::decoding(format!(
                "truncated {what} at offset {}: need {n} bytes, {} left",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }
}
