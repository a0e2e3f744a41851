//! # lens-highlight
//!
//! Villain term highlighting for verdict text.
//!
//! Splits a string into [`Span::Plain`] and [`Span::Match`] pieces so that
//! every case-insensitive occurrence of a villain name is marked and the
//! span texts concatenate back to the input exactly.
//!
//! Longer names take precedence over names they contain: with both
//! `"High Fructose Corn Syrup"` and `"Corn Syrup"` as terms, the full phrase
//! is matched as one span.
//!
//! ```
//! use lens_core::Villain;
//! use lens_highlight::{Span, TermIndex};
//!
//! let terms = vec![Villain::new("Corn Syrup", "refined sweetener")];
//! let index = TermIndex::new(&terms).expect("index");
//! let spans = index.spans("Contains corn syrup.");
//! assert!(matches!(spans[1], Span::Match { text: "corn syrup", .. }));
//! ```

mod error;
mod index;

pub use error::HighlightError;
pub use index::{Span, TermIndex, highlight, plain_text};
