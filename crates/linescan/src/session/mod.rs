//! Session: per-client tokenizer state.
//!
//! A session holds one line of text, the separator set used to split it, and
//! a cursor into the text. Writes replace either the text or the separator
//! set; reads hand out successive tokens.
//!
//! Write routing
//! - A session starts in [`WriteMode::Text`]. [`TokenizerSession::arm`] moves
//!   it to [`WriteMode::Separators`]; arming again changes nothing.
//! - [`TokenizerSession::write`] turns its payload into a [`WriteIntent`]
//!   tagged by the current mode and applies it. A successful separator write
//!   returns the session to text mode, so one arm covers exactly one write.
//!   A failed write leaves the mode (and everything else) untouched.
//!
//! Reads
//! - Leading separators are skipped, then the maximal run of non-separator
//!   bytes is the token. The boundary byte after a run is consumed too.
//! - Reaching the end of the text reports [`Scan::EndOfStream`] once. Any read
//!   after that fails with [`ScanError::NoMoreData`] until new text arrives.
//!
//! Invariants
//! - `cursor <= text.len()`; it only moves forward until the text is replaced.
//! - `exhausted` implies `cursor == text.len()`.
//!
//! Example
//! ```rust
//! use linescan::{Scan, ServiceOptions, SeparatorSet, TokenizerSession};
//!
//! let options = ServiceOptions::default();
//! let defaults = SeparatorSet::new(&options.default_separators, options.capacity).unwrap();
//! let mut session = TokenizerSession::new(&defaults).unwrap();
//!
//! session.write(b"cd /usr/lib").unwrap();
//! assert_eq!(session.next_token(64).unwrap(), Scan::Token("cd".into()));
//! assert_eq!(session.next_token(64).unwrap(), Scan::Token("usr".into()));
//! assert_eq!(session.next_token(64).unwrap(), Scan::Token("lib".into()));
//! assert_eq!(session.next_token(64).unwrap(), Scan::EndOfStream);
//! ```

use bstr::{BStr, BString, ByteSlice};
use tracing::{debug, trace};

use crate::{buffer::BoundedBuf, error::ScanError, separators::SeparatorSet};


/// How the next write will be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// The write replaces the text.
    #[default]
    Text,
    /// The write replaces the separator set (armed by a control command).
    Separators,
}

/// A write payload tagged with what it is meant to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteIntent<'a> {
    /// New source text; rewinds the cursor.
    SetText(&'a [u8]),
    /// New separator set; disarms the session.
    SetSeparators(&'a [u8]),
}

impl WriteIntent<'_> {
    /// The mode that produced this intent.
    #[must_use]
    pub fn mode(&self) -> WriteMode {
        match self {
            WriteIntent::SetText(_) => WriteMode::Text,
            WriteIntent::SetSeparators(_) => WriteMode::Separators,
        }
    }
}

/// Outcome of a successful read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan<'a> {
    /// The next token, possibly truncated to the caller's bound.
    Token(&'a BStr),
    /// The text has no tokens left. Reported once per text.
    EndOfStream,
}

impl<'a> Scan<'a> {
    /// The token bytes; empty for [`Scan::EndOfStream`].
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        match self {
            Scan::Token(token) => token.as_bytes(),
            Scan::EndOfStream => &[],
        }
    }
}

/// Tokenizer state owned by a single client session.
///
/// Sessions are not `Clone`: their buffers are only ever reserved fallibly.
#[derive(Debug)]
pub struct TokenizerSession {
    text: BoundedBuf,
    separators: SeparatorSet,
    cursor: usize,
    exhausted: bool,
    mode: WriteMode,
}

impl TokenizerSession {
    /// Creates a session with empty text and a private copy of `defaults`.
    ///
    /// The text buffer gets the same capacity as the separator buffer.
    ///
    /// # Errors
    ///
    /// [`ScanError::ResourceExhausted`] if either buffer cannot be allocated.
    pub fn new(defaults: &SeparatorSet) -> Result<Self, ScanError> {
        let separators = defaults.try_clone()?;
        let text = BoundedBuf::try_with_capacity(separators.capacity())?;
        Ok(Self {
            text,
            separators,
            cursor: 0,
            exhausted: false,
            mode: WriteMode::Text,
        })
    }

    /// Routes the next write to the separator set.
    ///
    /// Idempotent; text, cursor and end-of-stream state are untouched.
    pub fn arm(&mut self) {
        self.mode = WriteMode::Separators;
        debug!("armed separator update");
    }

    /// Tags `bytes` with the current write mode without applying it.
    #[must_use]
    pub fn intent<'a>(&self, bytes: &'a [u8]) -> WriteIntent<'a> {
        match self.mode {
            WriteMode::Text => WriteIntent::SetText(bytes),
            WriteMode::Separators => WriteIntent::SetSeparators(bytes),
        }
    }

    /// Applies a tagged write. Only [`write`](Self::write) calls this, so an
    /// armed session always routes its next payload to the separator set.
    fn apply(&mut self, intent: WriteIntent<'_>) -> Result<(), ScanError> {
        match intent {
            WriteIntent::SetText(bytes) => self.set_text(bytes),
            WriteIntent::SetSeparators(bytes) => self.set_separators(bytes),
        }
    }

    /// Writes `bytes` as text, or as separators if the session is armed.
    ///
    /// This is the only way to change a session's text or separators, so an
    /// arm is always consumed by exactly one successful write. Returns the
    /// mode the write was applied in.
    ///
    /// # Errors
    ///
    /// [`ScanError::CapacityExceeded`] if the payload does not fit; the
    /// session (armed state included) is left unchanged.
    pub fn write(&mut self, bytes: &[u8]) -> Result<WriteMode, ScanError> {
        let intent = self.intent(bytes);
        debug!(mode = ?intent.mode(), len = bytes.len(), "write");
        self.apply(intent)?;
        Ok(intent.mode())
    }

    /// Replaces the text and rewinds the cursor.
    fn set_text(&mut self, bytes: &[u8]) -> Result<(), ScanError> {
        self.text.replace(bytes)?;
        self.cursor = 0;
        self.exhausted = false;
        Ok(())
    }

    /// Replaces the separator set and disarms the session.
    fn set_separators(&mut self, bytes: &[u8]) -> Result<(), ScanError> {
        self.separators.replace(bytes)?;
        self.mode = WriteMode::Text;
        Ok(())
    }

    /// Extracts the next token, keeping at most `bound - 1` of its bytes.
    ///
    /// Bytes past the bound are consumed and dropped. The byte following the
    /// token is consumed as well.
    ///
    /// # Errors
    ///
    /// [`ScanError::NoMoreData`] when called again after
    /// [`Scan::EndOfStream`] without new text in between.
    pub fn next_token(&mut self, bound: usize) -> Result<Scan<'_>, ScanError> {
        trace!(line = %self.text.as_bstr(), cursor = self.cursor, "next token");

        let len = self.text.len();
        let mut pos = self.cursor;
        while self.text.get(pos).is_some_and(|b| self.separators.contains(b)) {
            pos += 1;
        }

        if pos == len {
            self.cursor = pos;
            if self.exhausted {
                return Err(ScanError::NoMoreData);
            }
            self.exhausted = true;
            return Ok(Scan::EndOfStream);
        }

        let start = pos;
        while self.text.get(pos).is_some_and(|b| !self.separators.contains(b)) {
            pos += 1;
        }
        let kept = (pos - start).min(bound.saturating_sub(1));
        self.cursor = (pos + 1).min(len);

        Ok(Scan::Token(self.text.as_bytes()[start..start + kept].as_bstr()))
    }

    /// Iterates the remaining tokens until end-of-stream, without a bound.
    ///
    /// The iterator consumes the end-of-stream signal, so the next
    /// [`next_token`](Self::next_token) fails with `NoMoreData`. If the signal
    /// was already consumed the iterator is empty.
    pub fn tokens(&mut self) -> Tokens<'_> {
        Tokens { session: self }
    }

    /// Current write mode.
    #[must_use]
    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Whether the next write replaces the separator set.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.mode == WriteMode::Separators
    }

    /// Whether end-of-stream has been reported for the current text.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Byte offset of the next unread position in the text.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The current text.
    #[must_use]
    pub fn text(&self) -> &BStr {
        self.text.as_bstr()
    }

    /// The current separator set.
    #[must_use]
    pub fn separators(&self) -> &SeparatorSet {
        &self.separators
    }

    /// Panics if the cursor or end-of-stream state is inconsistent.
    #[cfg(any(test, feature = "fuzzing"))]
    pub fn assert_invariants(&self) {
        let len = self.text.len();
        assert!(self.cursor <= len, "cursor {} past text of {len}", self.cursor);
        assert!(
            !self.exhausted || self.cursor == len,
            "exhausted with cursor {} before end {len}",
            self.cursor
        );
        assert!(len <= self.text.payload_capacity());
        assert!(!self.text.as_bytes().contains(&0));
    }

    /// Largest write the session accepts.
    #[must_use]
    pub fn payload_capacity(&self) -> usize {
        self.text.payload_capacity()
    }
}

/// Iterator returned by [`TokenizerSession::tokens`].
pub struct Tokens<'s> {
    session: &'s mut TokenizerSession,
}

impl Iterator for Tokens<'_> {
    type Item = BString;

    fn next(&mut self) -> Option<Self::Item> {
        match self.session.next_token(usize::MAX) {
            Ok(Scan::Token(token)) => Some(token.to_owned()),
            Ok(Scan::EndOfStream) | Err(_) => None,
        }
    }
}
