//! Reading every record, a merge of all records, or only the next record
//! from a text buffer or a seekable source.
//!
//! | access        | text                 | `Read + Seek` |
//! |---------------|----------------------|---------------|
//! | all (lazy)    | [`parse_ads`]        | [`read_ads`]  |
//! | merged        | [`parse_one`]        | [`read_one`]  |
//! | next only     | [`parse_next_ad`]    | [`read_next`] |
//!
//! All of them drive an [`AdCursor`], a plain value holding the parser mode
//! and the byte offset reached so far.
//!
//! Seekable sources are drained into memory and then repositioned just past
//! the text actually consumed, so another reader picking up the same source
//! sees only the unread records.

use std::io::{Read, Seek, SeekFrom};

use tracing::{debug, warn};

use crate::error::{Error, ParseError, Result};
use crate::incremental::{parse_next, ParserMode};
use crate::record::{AttributeMap, ClassAd};

/// Position of a reader within a buffer of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdCursor {
    pub mode: ParserMode,
    /// Bytes of the buffer already consumed.
    pub offset: usize,
}

impl AdCursor {
    pub fn new(mode: ParserMode) -> Self {
        AdCursor { mode, offset: 0 }
    }

    /// Parse the next record of `text` from this cursor's offset.
    ///
    /// On success returns the record, or `None` at the end of the input,
    /// along with the advanced cursor. Errors are positioned relative to the
    /// whole of `text`; the cursor itself is unchanged, being a copy.
    pub fn step(self, text: &str) -> std::result::Result<(Option<ClassAd>, AdCursor), ParseError> {
        let rest = text.get(self.offset..).unwrap_or("");
        let (ad, consumed) =
            parse_next(rest, self.mode).map_err(|e| e.relocate(text, self.offset))?;
        let next = AdCursor {
            offset: self.offset + consumed,
            ..self
        };
        if ad.is_some() {
            debug!(from = self.offset, to = next.offset, "extracted ad");
        }
        Ok((ad, next))
    }
}

/// Lazy sequence of the records in a buffer.
///
/// Ends at the end of the input. A parse error is yielded once, after which
/// the iterator is exhausted.
pub struct Ads<'a> {
    text: &'a str,
    cursor: AdCursor,
    done: bool,
}

impl<'a> Ads<'a> {
    pub fn cursor(&self) -> AdCursor {
        self.cursor
    }

    /// The text not consumed yet.
    pub fn remainder(&self) -> &'a str {
        self.text.get(self.cursor.offset..).unwrap_or("")
    }
}

impl Iterator for Ads<'_> {
    type Item = std::result::Result<ClassAd, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.step(self.text) {
            Ok((Some(ad), cursor)) => {
                self.cursor = cursor;
                Some(Ok(ad))
            }
            Ok((None, _)) => {
                self.done = true;
                None
            }
            Err(e) => {
                warn!(offset = self.cursor.offset, error = %e, "abandoning ad stream");
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for Ads<'_> {}

/// Every record in `text`, parsed as the iterator advances.
///
/// ```
/// use classad_lang::{parse_ads, ParserMode};
///
/// let ads: Vec<_> = parse_ads("[a = 1]\n\n[b = 2]", ParserMode::Auto)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(ads.len(), 2);
/// ```
pub fn parse_ads(text: &str, mode: ParserMode) -> Ads<'_> {
    Ads {
        text,
        cursor: AdCursor::new(mode),
        done: false,
    }
}

/// All records in `text` merged into one; later attributes win.
///
/// Input with no records gives an empty record.
pub fn parse_one(text: &str, mode: ParserMode) -> std::result::Result<ClassAd, ParseError> {
    let mut merged = ClassAd::new();
    for ad in parse_ads(text, mode) {
        merged.update(&ad?);
    }
    Ok(merged)
}

/// The first record of `*input`, advancing `*input` past it.
///
/// On error `*input` is left as it was.
pub fn parse_next_ad<'a>(
    input: &mut &'a str,
    mode: ParserMode,
) -> std::result::Result<Option<ClassAd>, ParseError> {
    let text: &'a str = input;
    let (ad, consumed) = parse_next(text, mode)?;
    *input = &text[consumed..];
    Ok(ad)
}

/// Drain `source` from its current position.
fn drain<R: Read + Seek>(source: &mut R) -> Result<(u64, String)> {
    let start = source.stream_position()?;
    let mut text = String::new();
    source.read_to_string(&mut text)?;
    Ok((start, text))
}

/// Records read from a seekable source.
///
/// After each record the source is positioned just past it.
pub struct ReadAds<'r, R: Read + Seek> {
    source: &'r mut R,
    start: u64,
    text: String,
    cursor: AdCursor,
    done: bool,
}

impl<R: Read + Seek> ReadAds<'_, R> {
    fn reposition(&mut self) -> Result<()> {
        self.source
            .seek(SeekFrom::Start(self.start + self.cursor.offset as u64))?;
        Ok(())
    }
}

impl<R: Read + Seek> Iterator for ReadAds<'_, R> {
    type Item = Result<ClassAd>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let (ad, cursor) = match self.cursor.step(&self.text) {
            Ok(step) => step,
            Err(e) => {
                warn!(offset = self.cursor.offset, error = %e, "abandoning ad stream");
                self.done = true;
                return Some(self.reposition().and(Err(Error::from(e))));
            }
        };
        self.cursor = cursor;
        if let Err(e) = self.reposition() {
            self.done = true;
            return Some(Err(e));
        }
        match ad {
            Some(ad) => Some(Ok(ad)),
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Every record from the current position of `source` on.
///
/// The remaining content is read up front; records are parsed lazily.
pub fn read_ads<R: Read + Seek>(source: &mut R, mode: ParserMode) -> Result<ReadAds<'_, R>> {
    let (start, text) = drain(source)?;
    let mut ads = ReadAds {
        source,
        start,
        text,
        cursor: AdCursor::new(mode),
        done: false,
    };
    ads.reposition()?;
    Ok(ads)
}

/// All records from `source` merged into one.
pub fn read_one<R: Read + Seek>(source: &mut R, mode: ParserMode) -> Result<ClassAd> {
    let mut merged = ClassAd::new();
    for ad in read_ads(source, mode)? {
        merged.update(&ad?);
    }
    Ok(merged)
}

/// The next record from `source`, leaving it positioned just past that
/// record.
///
/// ```
/// use std::io::Cursor;
/// use classad_lang::{read_next, AttributeMap, ParserMode};
///
/// let mut source = Cursor::new("[a = 1]\n\n[b = 2]\n");
/// let first = read_next(&mut source, ParserMode::Auto).unwrap().unwrap();
/// assert!(first.contains_key("a"));
/// assert_eq!(source.position(), 9);
/// ```
pub fn read_next<R: Read + Seek>(source: &mut R, mode: ParserMode) -> Result<Option<ClassAd>> {
    let (start, text) = drain(source)?;
    let parsed = parse_next(&text, mode);
    let consumed = parsed.as_ref().map_or(0, |(_, consumed)| *consumed);
    source.seek(SeekFrom::Start(start + consumed as u64))?;
    let (ad, _) = parsed?;
    Ok(ad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_fuses_iterator() {
        let mut ads = parse_ads("[a = 1]\n\n[b = ]\n\n[c = 3]", ParserMode::New);
        assert!(ads.next().unwrap().is_ok());
        assert!(ads.next().unwrap().is_err());
        assert!(ads.next().is_none());
    }

    #[test]
    fn test_next_ad_advances_slice() {
        let mut input = "[a = 1]\n\n[b = 2]";
        let ad = parse_next_ad(&mut input, ParserMode::Auto).unwrap().unwrap();
        assert!(ad.contains_key("a"));
        assert_eq!(input, "[b = 2]");
    }

    #[test]
    fn test_step_error_is_relative_to_whole_text() {
        let text = "[a = 1]\n\n[b = ]";
        let (_, cursor) = AdCursor::new(ParserMode::New).step(text).unwrap();
        let err = cursor.step(text).unwrap_err();
        assert_eq!(err.line, 3);
    }
}
