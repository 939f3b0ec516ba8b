//! Reading and writing XLIFF documents through files, readers and strings.

use std::{
    fs::File,
    io::{BufRead, BufWriter, Cursor, Write},
    path::Path,
};

use crate::error::Error;

/// A document that can be parsed from XML and written back as XML.
///
/// Reading from a path is left to the implementor, which may need to sniff the
/// encoding first.
///
/// # Example
///
/// ```rust,no_run
/// use xliff2json::{XliffDocument, traits::Parser};
/// let document = XliffDocument::read_from("messages.fr.xlf")?;
/// document.write_to("messages_copy.fr.xlf")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser: Sized {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>;

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Reads and parses the file at `path`.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>;

    /// Creates (or truncates) the file at `path` and writes the document.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = File::create(path)?;
        self.to_writer(BufWriter::new(file))
    }

    /// Parses an in-memory XML string.
    fn from_str(xml: &str) -> Result<Self, Error> {
        Self::from_reader(Cursor::new(xml))
    }
}
